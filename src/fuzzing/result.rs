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

//! The per-section result table.

use std::time::Duration;

use crate::fuzzing::payloads::{collapse_hex_tokens, ORIGINAL_TOKEN};
use crate::http::response::Response;

/// Measurements of the unmodified request, used as the reference point
/// for deviation marking.
#[derive(Debug, Clone, Copy)]
pub struct Baseline {
    pub time: Duration,
    pub header_size: usize,
    pub data_size: usize,
}

impl Baseline {
    pub fn from_response(response: &Response) -> Self {
        Self {
            time: response.elapsed,
            header_size: response.header().len(),
            data_size: response.body().len(),
        }
    }
}

/// One row of the result table.
#[derive(Debug, Clone)]
pub struct FuzzResult {
    /// Row number within the current section; `-1` for the baseline.
    pub row_number: i64,
    /// The wordlist entry, tokens unexpanded.
    pub payload: String,
    pub status: Option<u16>,
    pub time: Duration,
    pub header_size: usize,
    pub data_size: usize,
}

impl FuzzResult {
    pub fn from_response(row_number: i64, payload: &str, response: &Response) -> Self {
        Self {
            row_number,
            payload: payload.to_string(),
            status: response.status_code(),
            time: response.elapsed,
            header_size: response.header().len(),
            data_size: response.body().len(),
        }
    }

    /// Print the column header that opens every section.
    pub fn print_header() {
        println!("  ID          Payload  Code       Time   Header (bytes)   Data (bytes)");
    }

    /// Print one table row. Times and sizes deviating more than
    /// `deviation` from the baseline are marked with `+` or `-`.
    pub fn print(&self, baseline: Option<&Baseline>, deviation: f64) {
        let payload = collapse_hex_tokens(&self.payload).replace(ORIGINAL_TOKEN, "\u{2026}");
        let status = self
            .status
            .map_or_else(|| "???".to_string(), |code| code.to_string());
        let time_ms = self.time.as_millis();
        let time_mark = baseline.map_or("", |b| {
            mark(self.time.as_secs_f64(), b.time.as_secs_f64(), deviation)
        });
        let header_mark = baseline.map_or("", |b| {
            mark(self.header_size as f64, b.header_size as f64, deviation)
        });
        let data_mark = baseline.map_or("", |b| {
            mark(self.data_size as f64, b.data_size as f64, deviation)
        });
        println!(
            "{:>4}  {:>15}   {}  {:>6} ms{}  {:>15}{}  {:>13}{}",
            self.row_number,
            payload,
            status,
            time_ms,
            time_mark,
            self.header_size,
            header_mark,
            self.data_size,
            data_mark,
        );
    }
}

fn mark(value: f64, original: f64, deviation: f64) -> &'static str {
    if value < original * (1.0 - deviation) {
        "-"
    } else if value > original * (1.0 + deviation) {
        "+"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deviation_marks() {
        assert_eq!(mark(50.0, 100.0, 0.1), "-");
        assert_eq!(mark(95.0, 100.0, 0.1), "");
        assert_eq!(mark(100.0, 100.0, 0.1), "");
        assert_eq!(mark(111.0, 100.0, 0.1), "+");
    }

    #[test]
    fn baseline_from_response() {
        let response = Response::new(
            b"HTTP/1.1 200 OK\r\n\r\nbody".to_vec(),
            Duration::from_millis(42),
        );
        let baseline = Baseline::from_response(&response);
        assert_eq!(baseline.header_size, 15);
        assert_eq!(baseline.data_size, 4);
        assert_eq!(baseline.time, Duration::from_millis(42));
    }
}
