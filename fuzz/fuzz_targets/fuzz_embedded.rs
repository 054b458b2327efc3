// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use wirefuzz::json::embedded::{re_encode_embedded_json, try_decode_embedded_json};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Detection is best-effort and must never panic; anything it accepts
    // must survive a re-encode/decode cycle.
    if let Some(tree) = try_decode_embedded_json(text) {
        let encoded = re_encode_embedded_json(&tree);
        let again = try_decode_embedded_json(&encoded).expect("re-encoded tree must decode");
        assert_eq!(again.recompose(), tree.recompose());
    }
});
