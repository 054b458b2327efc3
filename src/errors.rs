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

//! Error taxonomy for request parsing, reconstruction, and transport.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FuzzError {
    /// The body claims a JSON content type but is not parseable JSON.
    /// Fatal for the affected request; parsing aborts.
    #[error("malformed JSON document: {0}")]
    MalformedDocument(String),

    /// The request-target line is missing the method or target token, or
    /// the input bytes are not a recognizable HTTP request. Fatal; the
    /// affected request is dropped from the input set.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Transport-level failure while sending or receiving a single fuzz
    /// request. Recoverable: the current section continues with the next
    /// payload.
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
