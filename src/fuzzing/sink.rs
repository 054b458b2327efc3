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

//! On-disk record of every exchange.
//!
//! Layout: `<root>/<section>_<field index, 4 digits>/fuzzstring_<payload
//! index, 4 digits>.txt`, each file holding the request bytes, one `\n`,
//! and the raw response (absent when the exchange failed).

use std::io::Write;
use std::path::PathBuf;

use crate::errors::FuzzError;
use crate::fuzzing::SectionKind;
use crate::http::response::Response;

#[derive(Debug, Clone)]
pub struct OutputSink {
    root: PathBuf,
}

impl OutputSink {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn record(
        &self,
        kind: SectionKind,
        field_index: usize,
        payload_index: i64,
        request_bytes: &[u8],
        response: Option<&Response>,
    ) -> Result<(), FuzzError> {
        let folder = self.root.join(format!("{}_{:04}", kind.as_str(), field_index));
        std::fs::create_dir_all(&folder)?;
        let mut file =
            std::fs::File::create(folder.join(format!("fuzzstring_{payload_index:04}.txt")))?;
        file.write_all(request_bytes)?;
        file.write_all(b"\n")?;
        if let Some(response) = response {
            file.write_all(&response.raw)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn records_request_and_response() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path().to_path_buf());
        let response = Response::new(b"HTTP/1.1 200 OK\r\n\r\n".to_vec(), Duration::ZERO);
        sink.record(SectionKind::Parameter, 3, 7, b"GET / HTTP/1.1\r\n\r\n", Some(&response))
            .unwrap();
        let content =
            std::fs::read(dir.path().join("parameter_0003").join("fuzzstring_0007.txt")).unwrap();
        assert_eq!(content, b"GET / HTTP/1.1\r\n\r\n\nHTTP/1.1 200 OK\r\n\r\n");
    }

    #[test]
    fn baseline_uses_negative_index() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path().to_path_buf());
        sink.record(SectionKind::Original, 0, -1, b"x", None).unwrap();
        let path = dir.path().join("original_0000").join("fuzzstring_-001.txt");
        assert_eq!(std::fs::read(path).unwrap(), b"x\n");
    }
}
