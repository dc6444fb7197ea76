//! Fuzz target for the model definition parser.
//!
//! Feeds arbitrary byte sequences to `Schema::parse` to find panics and
//! other unexpected behavior.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_model_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabula_schema::Schema;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // The parser should never panic, only return errors
        let _ = Schema::parse(input);
    }
});
