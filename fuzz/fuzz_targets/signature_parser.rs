#![no_main]

use libfuzzer_sys::fuzz_target;
use connex_gateway::services::abi::{param_type, parse_event, parse_function};

fuzz_target!(|data: &[u8]| {
    let signature = String::from_utf8_lossy(data);
    let _ = parse_function(&signature);
    if let Ok(event) = parse_event(&signature) {
        for input in &event.inputs {
            let _ = param_type(input);
        }
    }
});
