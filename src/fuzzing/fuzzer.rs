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

//! The fuzzing driver for a single request.
//!
//! One field is fuzzed at a time: every sweep works on a clone of the
//! request with all other fields' fuzzing disabled, substitutes one
//! payload per exchange, and records the exchange. A failed baseline
//! exchange skips the whole request; a failed fuzz exchange is reported
//! inline and the sweep continues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SectionToggles;
use crate::errors::FuzzError;
use crate::fuzzing::payloads::{self, ORIGINAL_TOKEN};
use crate::fuzzing::result::{Baseline, FuzzResult};
use crate::fuzzing::sink::OutputSink;
use crate::fuzzing::SectionKind;
use crate::http::request::{FieldRef, Request};
use crate::transport::RequestSender;

/// Shared flag that skips the rest of the current sweep. Triggered from
/// another thread (the Enter-key listener); cleared when honored.
#[derive(Debug, Clone, Default)]
pub struct SkipToken {
    flag: Arc<AtomicBool>,
}

impl SkipToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn check_and_clear(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

pub struct Fuzzer {
    request: Request,
    payloads: Vec<String>,
    sink: OutputSink,
    skip: SkipToken,
    delay: Duration,
    sections: SectionToggles,
    deviation: f64,
    baseline: Option<Baseline>,
}

impl Fuzzer {
    pub fn new(
        request: Request,
        payloads: Vec<String>,
        sink: OutputSink,
        skip: SkipToken,
        delay: Duration,
        sections: SectionToggles,
        deviation: f64,
    ) -> Self {
        Self {
            request,
            payloads,
            sink,
            skip,
            delay,
            sections,
            deviation,
            baseline: None,
        }
    }

    /// Fuzz every enabled section of the request.
    pub fn run(&mut self, sender: &mut dyn RequestSender) -> Result<(), FuzzError> {
        self.request.force_connection_close();

        println!("Fuzzing request: {}", self.url_display());
        println!("Performing zero measurement with unmodified request:");
        FuzzResult::print_header();
        let response = match sender.send(&self.request) {
            Ok(response) => response,
            Err(FuzzError::Connection(message)) => {
                println!("  -1  ERROR FOR PAYLOAD {ORIGINAL_TOKEN} WITH MESSAGE: {message}");
                println!("Cannot perform original request. Skipping fuzzing for this request.");
                return Ok(());
            }
            Err(error) => return Err(error),
        };
        FuzzResult::from_response(-1, ORIGINAL_TOKEN, &response).print(None, self.deviation);
        self.baseline = Some(Baseline::from_response(&response));
        self.sink.record(
            SectionKind::Original,
            0,
            -1,
            &self.request.recreate(),
            Some(&response),
        )?;
        self.pause();
        println!();

        if self.sections.parameters {
            self.sweep_parameters(sender)?;
        }
        if self.sections.form_fields {
            self.sweep_form_fields(sender)?;
        }
        if self.sections.json_body {
            self.sweep_json_body(sender)?;
        }
        if self.sections.directories {
            self.sweep_directories(sender)?;
        }
        if self.sections.cookies {
            self.sweep_cookies(sender)?;
        }
        Ok(())
    }

    fn sweep_parameters(&mut self, sender: &mut dyn RequestSender) -> Result<(), FuzzError> {
        let count = self.request.url.parameters.as_ref().map_or(0, Vec::len);
        for index in 0..count {
            let parameters = self.request.url.parameters.as_ref();
            if !parameters.is_some_and(|p| p[index].fuzz) {
                continue;
            }
            println!("Parameter {index} {}", self.url_display());
            self.sweep_field(sender, FieldRef::Parameter(index), SectionKind::Parameter, index)?;
            self.sweep_embedded_parameter(sender, index)?;
        }
        Ok(())
    }

    fn sweep_embedded_parameter(
        &mut self,
        sender: &mut dyn RequestSender,
        parameter: usize,
    ) -> Result<(), FuzzError> {
        let leaves = self
            .request
            .url
            .parameters
            .as_ref()
            .and_then(|p| p[parameter].embedded.as_ref())
            .map_or(0, crate::json::ValueTree::len);
        for leaf in 0..leaves {
            let tree = self
                .request
                .url
                .parameters
                .as_ref()
                .and_then(|p| p[parameter].embedded.as_ref());
            let Some(tree) = tree else { break };
            if !tree.paths[leaf].fuzz {
                continue;
            }
            println!("JSON in parameter {leaf} {}", self.url_display());
            println!("-> base64 -> JSON data {}", tree.paths[leaf]);
            self.sweep_field(
                sender,
                FieldRef::ParameterJsonLeaf { parameter, leaf },
                SectionKind::JsonDataInParameter,
                leaf,
            )?;
        }
        Ok(())
    }

    fn sweep_form_fields(&mut self, sender: &mut dyn RequestSender) -> Result<(), FuzzError> {
        let count = self.request.form_fields.as_ref().map_or(0, Vec::len);
        for index in 0..count {
            let fields = self.request.form_fields.as_ref();
            if !fields.is_some_and(|f| f[index].fuzz) {
                continue;
            }
            let banner = fields
                .map(|f| key_value_display(&f[index].key, f[index].value.as_deref()))
                .unwrap_or_default();
            println!("Form data {index} {banner}");
            self.sweep_field(sender, FieldRef::FormField(index), SectionKind::FormData, index)?;
        }
        Ok(())
    }

    fn sweep_json_body(&mut self, sender: &mut dyn RequestSender) -> Result<(), FuzzError> {
        let count = self
            .request
            .json_body
            .as_ref()
            .map_or(0, crate::json::ValueTree::len);
        for index in 0..count {
            let Some(tree) = self.request.json_body.as_ref() else {
                break;
            };
            if !tree.paths[index].fuzz {
                continue;
            }
            println!("JSON data {index} {}", tree.paths[index]);
            self.sweep_field(sender, FieldRef::JsonLeaf(index), SectionKind::JsonData, index)?;
        }
        Ok(())
    }

    fn sweep_directories(&mut self, sender: &mut dyn RequestSender) -> Result<(), FuzzError> {
        // Deepest segment first: the shallow ones change routing the most.
        for index in (0..self.request.url.directories.len()).rev() {
            if !self.request.url.directories[index].fuzz {
                continue;
            }
            println!("Directory {index} {}", self.url_display());
            self.sweep_field(sender, FieldRef::Directory(index), SectionKind::Directory, index)?;
        }
        Ok(())
    }

    fn sweep_cookies(&mut self, sender: &mut dyn RequestSender) -> Result<(), FuzzError> {
        let count = self.request.cookies.as_ref().map_or(0, Vec::len);
        for index in 0..count {
            let cookies = self.request.cookies.as_ref();
            if !cookies.is_some_and(|c| c[index].fuzz) {
                continue;
            }
            let banner = cookies
                .map(|c| key_value_display(&c[index].key, c[index].value.as_deref()))
                .unwrap_or_default();
            println!("Cookie {index} {banner}");
            self.sweep_field(sender, FieldRef::Cookie(index), SectionKind::Cookie, index)?;
            self.sweep_embedded_cookie(sender, index)?;
        }
        Ok(())
    }

    fn sweep_embedded_cookie(
        &mut self,
        sender: &mut dyn RequestSender,
        cookie: usize,
    ) -> Result<(), FuzzError> {
        let leaves = self
            .request
            .cookies
            .as_ref()
            .and_then(|c| c[cookie].embedded.as_ref())
            .map_or(0, crate::json::ValueTree::len);
        for leaf in 0..leaves {
            let tree = self
                .request
                .cookies
                .as_ref()
                .and_then(|c| c[cookie].embedded.as_ref());
            let Some(tree) = tree else { break };
            if !tree.paths[leaf].fuzz {
                continue;
            }
            let banner = self
                .request
                .cookies
                .as_ref()
                .map(|c| key_value_display(&c[cookie].key, c[cookie].value.as_deref()))
                .unwrap_or_default();
            println!("JSON in cookie {leaf} {banner}");
            println!("-> base64 -> JSON data {}", tree.paths[leaf]);
            self.sweep_field(
                sender,
                FieldRef::CookieJsonLeaf { cookie, leaf },
                SectionKind::JsonDataInCookie,
                leaf,
            )?;
        }
        Ok(())
    }

    /// Run every payload against a single field.
    fn sweep_field(
        &self,
        sender: &mut dyn RequestSender,
        field: FieldRef,
        kind: SectionKind,
        write_index: usize,
    ) -> Result<(), FuzzError> {
        let original_value = self.request.pristine_value(field);
        FuzzResult::print_header();

        let mut copy = self.request.clone();
        copy.mark_only(field);

        for (row, payload) in self.payloads.iter().enumerate() {
            if self.skip.check_and_clear() {
                break;
            }
            let row_number = row as i64;
            let prepared = payloads::prepare(payload, &original_value);
            copy.substitute(field, &prepared);

            match sender.send(&copy) {
                Ok(response) => {
                    FuzzResult::from_response(row_number, payload, &response)
                        .print(self.baseline.as_ref(), self.deviation);
                    self.sink
                        .record(kind, write_index, row_number, &copy.recreate(), Some(&response))?;
                }
                Err(FuzzError::Connection(message)) => {
                    println!("{row_number} ERROR FOR PAYLOAD {payload} WITH MESSAGE: {message}");
                    self.sink
                        .record(kind, write_index, row_number, &copy.recreate(), None)?;
                }
                Err(error) => return Err(error),
            }
            self.pause();
        }
        println!();
        Ok(())
    }

    fn url_display(&self) -> String {
        String::from_utf8_lossy(&self.request.url.serialize()).into_owned()
    }

    fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

fn key_value_display(key: &[u8], value: Option<&[u8]>) -> String {
    format!(
        "{}={}",
        String::from_utf8_lossy(key),
        String::from_utf8_lossy(value.unwrap_or(b""))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_token_clears_when_honored() {
        let token = SkipToken::new();
        assert!(!token.check_and_clear());
        token.trigger();
        let shared = token.clone();
        assert!(shared.check_and_clear());
        assert!(!token.check_and_clear());
    }
}
