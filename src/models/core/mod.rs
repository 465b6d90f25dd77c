mod chain;
mod criteria;
mod log;
pub mod scalars;

pub use chain::{Account, AccountState, Block, CallSpec, Head, Status};
pub use criteria::{ContractFilterCriteria, Criteria, FilterCriteria, Order, Range};
pub use log::{DecodedLog, LogKind, LogMeta, LogRecord, TransferFields};
