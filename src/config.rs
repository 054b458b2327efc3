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

//! Runtime configuration for the fuzz driver and the network sender.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which categories of fuzzable fields the driver sweeps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SectionToggles {
    pub directories: bool,
    pub parameters: bool,
    pub cookies: bool,
    pub form_fields: bool,
    pub json_body: bool,
}

impl Default for SectionToggles {
    fn default() -> Self {
        // Cookies are opt-in: fuzzing them invalidates most sessions.
        Self {
            directories: true,
            parameters: true,
            cookies: false,
            form_fields: true,
            json_body: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port used for every connection.
    pub port: u16,
    /// Use plain HTTP instead of HTTPS.
    pub disable_https: bool,
    /// Delay between requests, excluding the duration of the request itself.
    pub delay: Duration,
    /// Abandon a connection attempt after this long.
    pub connect_timeout: Duration,
    /// A peer that stays silent this long is treated as done sending.
    pub read_timeout: Duration,
    /// Directory where the fuzzed requests and responses are stored.
    pub output_directory: PathBuf,
    pub sections: SectionToggles,
    /// Relative deviation from the baseline above/below which a response
    /// duration or size is flagged in the result table.
    pub deviation_for_highlighting: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 443,
            disable_https: false,
            delay: Duration::ZERO,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            output_directory: PathBuf::from("wirefuzz_output"),
            sections: SectionToggles::default(),
            deviation_for_highlighting: 0.1,
        }
    }
}
