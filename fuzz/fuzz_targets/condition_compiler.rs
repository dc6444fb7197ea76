//! Fuzz target for condition compilation.
//!
//! Parses arbitrary JSON objects into conditions and compiles them in
//! both lenient and strict mode. Neither mode may panic, and the lenient
//! compiler must never return an error.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_condition_compiler
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabula_query::{Compiler, Condition, SqlFlavor};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(map) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(input)
    else {
        return;
    };
    let condition = Condition::from(map);
    let lenient = Compiler::new(SqlFlavor::MySql).compile(&condition);
    assert!(lenient.is_ok());
    let _ = Compiler::strict(SqlFlavor::MySql).compile(&condition);
});
