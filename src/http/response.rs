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

//! Raw HTTP response wrapper.

use crate::http::DOUBLE_CRLF;
use std::time::Duration;

/// A single HTTP response, kept as raw bytes plus the wall-clock time the
/// exchange took. Never interpreted beyond the status line and the
/// header/body boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub raw: Vec<u8>,
    pub elapsed: Duration,
}

impl Response {
    pub fn new(raw: Vec<u8>, elapsed: Duration) -> Self {
        Self { raw, elapsed }
    }

    /// Header section: everything before the first blank line.
    pub fn header(&self) -> &[u8] {
        crate::http::split_first(&self.raw, DOUBLE_CRLF).0
    }

    /// Body section: everything after the first blank line.
    pub fn body(&self) -> &[u8] {
        crate::http::split_first(&self.raw, DOUBLE_CRLF)
            .1
            .unwrap_or(b"")
    }

    /// Status code from the first line, if one can be read.
    pub fn status_code(&self) -> Option<u16> {
        let first_line = self.raw.split(|&b| b == b'\n').next()?;
        let token = first_line.split(|&b| b == b' ').nth(1)?;
        std::str::from_utf8(token).ok()?.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_header_and_body() {
        let response = Response::new(
            b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nhi".to_vec(),
            Duration::from_millis(5),
        );
        assert_eq!(response.header(), b"HTTP/1.1 200 OK\r\ncontent-length: 2");
        assert_eq!(response.body(), b"hi");
        assert_eq!(response.status_code(), Some(200));
    }

    #[test]
    fn tolerates_garbage() {
        let response = Response::new(b"not http".to_vec(), Duration::ZERO);
        assert_eq!(response.status_code(), None);
        assert_eq!(response.body(), b"");
    }
}
