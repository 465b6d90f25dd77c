#![no_main]

use libfuzzer_sys::fuzz_target;
use connex_gateway::services::abi::decode_revert_reason;

fuzz_target!(|data: &[u8]| {
    let _ = decode_revert_reason(data);
});
