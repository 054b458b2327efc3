// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use wirefuzz::http::request::Request;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the parser, and a parsed request
    // must always recreate without panicking.
    if let Ok(request) = Request::parse(data, 443, false, None) {
        let _ = request.recreate();
        let _ = request.host();
        let _ = request.content_type();
    }
});
