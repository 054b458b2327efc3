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

//! The fuzzing driver and its supporting pieces.

pub mod fuzzer;
pub mod payloads;
pub mod result;
pub mod sink;

pub use fuzzer::{Fuzzer, SkipToken};

/// Kind of sweep a recorded exchange belongs to. Doubles as the output
/// folder name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Original,
    Parameter,
    FormData,
    JsonData,
    Directory,
    Cookie,
    JsonDataInParameter,
    JsonDataInCookie,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Original => "original",
            SectionKind::Parameter => "parameter",
            SectionKind::FormData => "form_data",
            SectionKind::JsonData => "json_data",
            SectionKind::Directory => "directory",
            SectionKind::Cookie => "cookie",
            SectionKind::JsonDataInParameter => "json_data_in_parameter",
            SectionKind::JsonDataInCookie => "json_data_in_cookie",
        }
    }
}
