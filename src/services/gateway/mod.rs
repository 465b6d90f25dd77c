//! Gateway resolvers: one handler per top-level query or mutation field.

mod error;
mod request;
mod resolver;

pub use error::GatewayError;
pub use request::{GatewayRequest, GatewayResponse};
pub use resolver::{Gateway, CONNEX_VERSION};
