// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use wirefuzz::json::ValueTree;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Valid JSON must decompose and recompose without panicking, and the
    // recomposed document must equal the parsed one.
    if let Ok(tree) = ValueTree::parse(text) {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => return,
        };
        assert_eq!(tree.recompose(), value);
        let _ = tree.to_canonical_string();
    }
});
