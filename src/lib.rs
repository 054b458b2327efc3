// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! wirefuzz: an HTTP request fuzzer.
//!
//! This library decomposes a raw HTTP request into independently mutable
//! components (URL directories, query parameters, cookies, form fields,
//! JSON body leaves, and JSON hidden inside base64-url-encoded values),
//! substitutes attacker-controlled payloads one leaf at a time, and
//! reconstructs a byte-exact request with a recomputed `Content-Length`.
//!
//! Parsing an unmodified request and immediately reconstructing it yields
//! the original bytes; the fuzz driver relies on that invariant to isolate
//! the effect of each single mutation.

pub mod config;
pub mod errors;
pub mod fuzzing;
pub mod http;
pub mod json;
pub mod transport;
