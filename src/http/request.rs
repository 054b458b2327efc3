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

//! The request model.
//!
//! A raw HTTP request is decomposed into fuzzable components (URL
//! directories, query parameters, cookies, form fields, JSON body) and
//! reconstructed byte-exactly by [`Request::recreate`] as long as no
//! component was touched.

use std::path::Path;

use tracing::{debug, warn};

use crate::errors::FuzzError;
use crate::http::fields::{Cookie, FormField};
use crate::http::url::{Directory, QueryParameter, Url};
use crate::http::{
    find_subslice, quote_path, quote_plus, split_first, starts_with_ignore_case, unquote_plus,
    CRLF, DOUBLE_CRLF,
};
use crate::json::ValueTree;

const COOKIE_PREFIX: &[u8] = b"cookie: ";
const CONTENT_TYPE_PREFIX: &[u8] = b"content-type: ";
const CONTENT_LENGTH_PREFIX: &[u8] = b"content-length:";
const HOST_PREFIX: &[u8] = b"host: ";
const COOKIE_SEPARATOR: &[u8] = b"; ";
const FORM_CONTENT_TYPE: &[u8] = b"application/x-www-form-urlencoded";
const JSON_CONTENT_TYPES: &[&[u8]] = &[b"application/json", b"application/json;charset=utf-8"];

/// A single HTTP request with its fuzzable components interpreted.
#[derive(Debug, Clone)]
pub struct Request {
    /// The raw request bytes as loaded.
    pub raw: Vec<u8>,
    /// Header section, request line included, without the blank line.
    pub header: Vec<u8>,
    /// Body section, trailing bytes included.
    pub data: Vec<u8>,
    pub method: String,
    pub url: Url,
    /// `None` when the header carries no `Cookie` line at all.
    pub cookies: Option<Vec<Cookie>>,
    /// Present only for `application/x-www-form-urlencoded` bodies.
    pub form_fields: Option<Vec<FormField>>,
    /// Present only for JSON bodies.
    pub json_body: Option<ValueTree>,
    pub port: u16,
    pub disable_https: bool,
}

/// Addresses one fuzzable leaf of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef {
    Directory(usize),
    Parameter(usize),
    Cookie(usize),
    FormField(usize),
    JsonLeaf(usize),
    ParameterJsonLeaf { parameter: usize, leaf: usize },
    CookieJsonLeaf { cookie: usize, leaf: usize },
}

impl Request {
    /// Interpret a raw request. `add_header` is appended to the header
    /// section before any component parsing.
    pub fn parse(
        raw: &[u8],
        port: u16,
        disable_https: bool,
        add_header: Option<&str>,
    ) -> Result<Self, FuzzError> {
        let (header_part, body) = split_first(raw, DOUBLE_CRLF);
        let mut header = header_part.to_vec();
        if let Some(extra) = add_header {
            header.extend_from_slice(CRLF);
            header.extend_from_slice(extra.as_bytes());
        }
        let data = body.unwrap_or(b"").to_vec();

        let request_line = split_first(&header, CRLF).0;
        let mut tokens = request_line.split(|&b| b == b' ');
        let method = tokens
            .next()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| FuzzError::UnsupportedInput("empty request line".into()))?;
        let url_token = tokens
            .next()
            .ok_or_else(|| FuzzError::UnsupportedInput("request line has no URL".into()))?;
        let method = String::from_utf8_lossy(method).into_owned();
        let url = Url::parse(url_token);

        let cookies = parse_cookies(&header);
        let content_type = content_type_of(&header);
        let form_fields = parse_form_fields(content_type.as_deref(), &data);
        let json_body = parse_json_body(content_type.as_deref(), &data)?;

        Ok(Self {
            raw: raw.to_vec(),
            header,
            data,
            method,
            url,
            cookies,
            form_fields,
            json_body,
            port,
            disable_https,
        })
    }

    /// Load a single raw request from a file. The file must contain only
    /// the request; it is padded with CRLF until it ends in a blank line.
    pub fn from_file(
        filename: &Path,
        port: u16,
        disable_https: bool,
        add_header: Option<&str>,
    ) -> Result<Self, FuzzError> {
        let mut raw = std::fs::read(filename)?;
        while !raw.ends_with(DOUBLE_CRLF) {
            raw.extend_from_slice(CRLF);
        }
        Self::parse(&raw, port, disable_https, add_header)
    }

    /// Load requests from a proxy message export: messages separated by
    /// `==== <n> ==========` marker lines, each message a request
    /// immediately followed by its response. The first line of the file is
    /// the leading marker and is skipped; responses are cut away using the
    /// request's `Content-Length`. Messages that cannot be parsed are
    /// dropped with a warning.
    pub fn from_export(
        filename: &Path,
        port: u16,
        disable_https: bool,
        add_header: Option<&str>,
    ) -> Result<Vec<Self>, FuzzError> {
        let content = std::fs::read(filename)?;
        let mut requests = Vec::new();
        let mut message: Vec<u8> = Vec::new();

        let flush = |message: &mut Vec<u8>, requests: &mut Vec<Self>| {
            match trim_response(message) {
                Some(trimmed) => match Self::parse(&trimmed, port, disable_https, add_header) {
                    Ok(request) => requests.push(request),
                    Err(error) => warn!(%error, "dropping unparseable exported message"),
                },
                None => warn!("dropping exported message without header end"),
            }
            message.clear();
        };

        for (index, line) in split_inclusive_lines(&content).enumerate() {
            if index == 0 {
                continue;
            }
            if let Some(number) = parse_marker_line(line) {
                debug!(number, "parsing message before export marker");
                flush(&mut message, &mut requests);
                continue;
            }
            message.extend_from_slice(line);
        }
        debug!("adding final exported message");
        flush(&mut message, &mut requests);
        Ok(requests)
    }

    /// Load a request from the content of Chrome DevTools'
    /// "Copy as fetch (Node.js)": a `fetch(url, {...});` call whose
    /// arguments are valid JSON. Headers a browser refuses to set
    /// (`Connection`, `Host`, `Content-Length`) are filled in here.
    pub fn from_fetch(
        filename: &Path,
        port: u16,
        disable_https: bool,
        add_header: Option<&str>,
    ) -> Result<Self, FuzzError> {
        let content = std::fs::read_to_string(filename)?;
        let inner = content
            .strip_prefix("fetch(")
            .and_then(|rest| rest.rfind(");").map(|end| &rest[..end]))
            .ok_or_else(|| {
                FuzzError::UnsupportedInput(format!(
                    "no fetch content found in file {}",
                    filename.display()
                ))
            })?;

        let (url, options): (String, serde_json::Map<String, serde_json::Value>) =
            serde_json::from_str(&format!("[{inner}]"))
                .map_err(|e| FuzzError::UnsupportedInput(format!("malformed fetch call: {e}")))?;

        let unsupported: Vec<&str> = options
            .keys()
            .map(String::as_str)
            .filter(|key| !matches!(*key, "method" | "headers" | "body"))
            .collect();
        if !unsupported.is_empty() {
            debug!(keys = ?unsupported, "ignoring unsupported keys in fetch input");
        }

        let method = options
            .get("method")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| FuzzError::UnsupportedInput("fetch call without method".into()))?;
        let body = options.get("body").and_then(serde_json::Value::as_str);

        let mut headers: serde_json::Map<String, serde_json::Value> = options
            .get("headers")
            .and_then(serde_json::Value::as_object)
            .map(|object| {
                object
                    .iter()
                    .map(|(key, value)| (key.to_ascii_lowercase(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let hostname = Url::parse(url.as_bytes())
            .hostname()
            .ok_or_else(|| FuzzError::UnsupportedInput("fetch URL without hostname".into()))?;
        headers.insert("connection".into(), "close".into());
        headers.insert("host".into(), hostname.into());
        if let Some(body) = body {
            headers.insert("content-length".into(), body.len().to_string().into());
        }

        let mut raw = format!("{method} {url} HTTP/1.1").into_bytes();
        for (key, value) in &headers {
            raw.extend_from_slice(CRLF);
            raw.extend_from_slice(key.as_bytes());
            raw.extend_from_slice(b": ");
            raw.extend_from_slice(value.as_str().unwrap_or_default().as_bytes());
        }
        if let Some(body) = body {
            raw.extend_from_slice(DOUBLE_CRLF);
            raw.extend_from_slice(body.as_bytes());
        }
        raw.extend_from_slice(DOUBLE_CRLF);
        Self::parse(&raw, port, disable_https, add_header)
    }

    /// Value of the `Host` header line.
    pub fn host(&self) -> Option<String> {
        for line in split_crlf(&self.header) {
            if starts_with_ignore_case(line, HOST_PREFIX) {
                return Some(String::from_utf8_lossy(&line[HOST_PREFIX.len()..]).into_owned());
            }
        }
        None
    }

    /// Value of the `Content-Type` header line.
    pub fn content_type(&self) -> Option<Vec<u8>> {
        content_type_of(&self.header)
    }

    /// Rewrite `Connection: keep-alive` to `Connection: close` and drop
    /// `Keep-Alive` lines, so every exchange gets its own connection.
    pub fn force_connection_close(&mut self) {
        let mut lines: Vec<Vec<u8>> = split_crlf(&self.header)
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect();
        lines.retain(|line| !starts_with_ignore_case(line, b"keep-alive:"));
        for line in &mut lines {
            if line.eq_ignore_ascii_case(b"connection: keep-alive") {
                // The header name keeps its original casing.
                line.truncate(line.iter().position(|&b| b == b':').unwrap_or(0) + 1);
                line.extend_from_slice(b" close");
            }
        }
        self.header = lines.join(CRLF);
    }

    /// Recursively disable fuzzing of every component.
    pub fn disable_all_fuzzing(&mut self) {
        self.url.disable_all_fuzzing();
        for cookie in self.cookies.iter_mut().flatten() {
            cookie.fuzz = false;
            if let Some(tree) = &mut cookie.embedded {
                tree.disable_all();
            }
        }
        for field in self.form_fields.iter_mut().flatten() {
            field.fuzz = false;
        }
        if let Some(tree) = &mut self.json_body {
            tree.disable_all();
        }
    }

    /// Disable everything, then re-enable exactly `field`.
    pub fn mark_only(&mut self, field: FieldRef) {
        self.disable_all_fuzzing();
        match field {
            FieldRef::Directory(index) => self.url.directories[index].fuzz = true,
            FieldRef::Parameter(index) => {
                if let Some(parameters) = &mut self.url.parameters {
                    parameters[index].fuzz = true;
                }
            }
            FieldRef::Cookie(index) => {
                if let Some(cookies) = &mut self.cookies {
                    cookies[index].fuzz = true;
                }
            }
            FieldRef::FormField(index) => {
                if let Some(fields) = &mut self.form_fields {
                    fields[index].fuzz = true;
                }
            }
            FieldRef::JsonLeaf(index) => {
                if let Some(tree) = &mut self.json_body {
                    tree.paths[index].fuzz = true;
                }
            }
            FieldRef::ParameterJsonLeaf { parameter, leaf } => {
                if let Some(parameters) = &mut self.url.parameters {
                    if let Some(tree) = &mut parameters[parameter].embedded {
                        tree.paths[leaf].fuzz = true;
                    }
                }
            }
            FieldRef::CookieJsonLeaf { cookie, leaf } => {
                if let Some(cookies) = &mut self.cookies {
                    if let Some(tree) = &mut cookies[cookie].embedded {
                        tree.paths[leaf].fuzz = true;
                    }
                }
            }
        }
    }

    /// The component's current value as used for the original-value
    /// payload token.
    pub fn pristine_value(&self, field: FieldRef) -> String {
        fn lossy(value: Option<&[u8]>) -> String {
            String::from_utf8_lossy(value.unwrap_or(b"")).into_owned()
        }
        match field {
            FieldRef::Directory(index) => lossy(Some(&self.url.directories[index].value)),
            FieldRef::Parameter(index) => lossy(
                self.url
                    .parameters
                    .as_ref()
                    .and_then(|p| p[index].value.as_deref()),
            ),
            FieldRef::Cookie(index) => {
                lossy(self.cookies.as_ref().and_then(|c| c[index].value.as_deref()))
            }
            FieldRef::FormField(index) => lossy(
                self.form_fields
                    .as_ref()
                    .and_then(|f| f[index].value.as_deref()),
            ),
            FieldRef::JsonLeaf(index) => self
                .json_body
                .as_ref()
                .map(|tree| tree.paths[index].leaf_text())
                .unwrap_or_default(),
            FieldRef::ParameterJsonLeaf { parameter, leaf } => self
                .url
                .parameters
                .as_ref()
                .and_then(|p| p[parameter].embedded.as_ref())
                .map(|tree| tree.paths[leaf].leaf_text())
                .unwrap_or_default(),
            FieldRef::CookieJsonLeaf { cookie, leaf } => self
                .cookies
                .as_ref()
                .and_then(|c| c[cookie].embedded.as_ref())
                .map(|tree| tree.paths[leaf].leaf_text())
                .unwrap_or_default(),
        }
    }

    /// Replace the addressed component's value with `payload`, encoded for
    /// its position. Parameter and cookie substitution rebuilds the field,
    /// so an embedded tree is re-detected from the payload.
    pub fn substitute(&mut self, field: FieldRef, payload: &str) {
        match field {
            FieldRef::Directory(index) => {
                self.url.directories[index] = Directory::new(quote_path(payload).into_bytes());
            }
            FieldRef::Parameter(index) => {
                if let Some(parameters) = &mut self.url.parameters {
                    let key = parameters[index].key.clone();
                    parameters[index] =
                        QueryParameter::new(key, Some(quote_plus(payload).into_bytes()));
                }
            }
            FieldRef::Cookie(index) => {
                if let Some(cookies) = &mut self.cookies {
                    let key = cookies[index].key.clone();
                    cookies[index] = Cookie::new(key, Some(quote_plus(payload).into_bytes()));
                }
            }
            FieldRef::FormField(index) => {
                if let Some(fields) = &mut self.form_fields {
                    // Stored decoded; encoded once by recreate().
                    fields[index].value = Some(payload.as_bytes().to_vec());
                }
            }
            FieldRef::JsonLeaf(index) => {
                if let Some(tree) = &mut self.json_body {
                    tree.paths[index].set_leaf(serde_json::Value::String(payload.into()));
                }
            }
            FieldRef::ParameterJsonLeaf { parameter, leaf } => {
                if let Some(parameters) = &mut self.url.parameters {
                    if let Some(tree) = &mut parameters[parameter].embedded {
                        tree.paths[leaf].set_leaf(serde_json::Value::String(payload.into()));
                    }
                    parameters[parameter].sync_embedded();
                }
            }
            FieldRef::CookieJsonLeaf { cookie, leaf } => {
                if let Some(cookies) = &mut self.cookies {
                    if let Some(tree) = &mut cookies[cookie].embedded {
                        tree.paths[leaf].set_leaf(serde_json::Value::String(payload.into()));
                    }
                    cookies[cookie].sync_embedded();
                }
            }
        }
    }

    /// Build the request bytes from the current component state.
    /// Unmodified components reproduce their original bytes.
    pub fn recreate(&self) -> Vec<u8> {
        let mut lines: Vec<Vec<u8>> = split_crlf(&self.header)
            .into_iter()
            .map(<[u8]>::to_vec)
            .collect();

        if let Some(first) = lines.first_mut() {
            let tokens: Vec<&[u8]> = first.split(|&b| b == b' ').collect();
            if tokens.len() >= 2 {
                let mut rebuilt = tokens[0].to_vec();
                rebuilt.push(b' ');
                rebuilt.extend_from_slice(&self.url.serialize());
                for token in &tokens[2..] {
                    rebuilt.push(b' ');
                    rebuilt.extend_from_slice(token);
                }
                *first = rebuilt;
            }
        }

        if let Some(cookies) = &self.cookies {
            for line in &mut lines {
                if !starts_with_ignore_case(line, COOKIE_PREFIX) {
                    continue;
                }
                let mut rebuilt = line[..COOKIE_PREFIX.len()].to_vec();
                for (index, cookie) in cookies.iter().enumerate() {
                    if index != 0 {
                        rebuilt.extend_from_slice(COOKIE_SEPARATOR);
                    }
                    rebuilt.extend_from_slice(&cookie.key);
                    if let Some(value) = &cookie.value {
                        rebuilt.push(b'=');
                        rebuilt.extend_from_slice(value);
                    }
                }
                *line = rebuilt;
                break;
            }
        }

        let body = if self.data.is_empty() {
            None
        } else if let Some(fields) = &self.form_fields {
            let mut data = Vec::new();
            for (index, field) in fields.iter().enumerate() {
                if index != 0 {
                    data.push(b'&');
                }
                data.extend_from_slice(&field.key);
                if let Some(value) = &field.value {
                    data.push(b'=');
                    data.extend_from_slice(
                        quote_plus(&String::from_utf8_lossy(value)).as_bytes(),
                    );
                }
            }
            rewrite_content_length(&mut lines, data.len());
            Some(data)
        } else if let Some(tree) = &self.json_body {
            let data = tree.to_canonical_string().into_bytes();
            rewrite_content_length(&mut lines, data.len());
            Some(data)
        } else {
            None
        };

        let mut out = lines.join(CRLF);
        out.extend_from_slice(DOUBLE_CRLF);
        match body {
            Some(data) => {
                out.extend_from_slice(&data);
                out.extend_from_slice(DOUBLE_CRLF);
            }
            None => out.extend_from_slice(&self.data),
        }
        out
    }
}

fn content_type_of(header: &[u8]) -> Option<Vec<u8>> {
    for line in split_crlf(header) {
        if starts_with_ignore_case(line, CONTENT_TYPE_PREFIX) {
            return Some(line[CONTENT_TYPE_PREFIX.len()..].to_vec());
        }
    }
    None
}

fn parse_cookies(header: &[u8]) -> Option<Vec<Cookie>> {
    let cookie_line = split_crlf(header)
        .into_iter()
        .find(|line| starts_with_ignore_case(line, COOKIE_PREFIX))?;
    let cookies = split_all(&cookie_line[COOKIE_PREFIX.len()..], COOKIE_SEPARATOR)
        .into_iter()
        .map(|segment| {
            let (key, value) = split_first(segment, b"=");
            Cookie::new(key.to_vec(), value.map(<[u8]>::to_vec))
        })
        .collect();
    Some(cookies)
}

fn parse_form_fields(content_type: Option<&[u8]>, data: &[u8]) -> Option<Vec<FormField>> {
    let content_type = content_type?;
    if data.is_empty() || !content_type.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        return None;
    }
    let first_line = data
        .split(|&b| b == b'\r' || b == b'\n')
        .next()
        .unwrap_or(b"");
    let fields = first_line
        .split(|&b| b == b'&')
        .map(|segment| {
            let (key, value) = split_first(segment, b"=");
            FormField::new(key.to_vec(), value.map(unquote_plus))
        })
        .collect();
    Some(fields)
}

fn parse_json_body(
    content_type: Option<&[u8]>,
    data: &[u8],
) -> Result<Option<ValueTree>, FuzzError> {
    let Some(content_type) = content_type else {
        return Ok(None);
    };
    if data.is_empty()
        || !JSON_CONTENT_TYPES
            .iter()
            .any(|candidate| content_type.eq_ignore_ascii_case(candidate))
    {
        return Ok(None);
    }
    let text = std::str::from_utf8(data)
        .map_err(|_| FuzzError::MalformedDocument("JSON body is not UTF-8".into()))?;
    ValueTree::parse(text.trim_end()).map(Some)
}

/// Cut the response off an exported message using the request's
/// `Content-Length`. `None` when the message has no header end.
fn trim_response(message: &[u8]) -> Option<Vec<u8>> {
    let header_end = find_subslice(message, DOUBLE_CRLF)? + DOUBLE_CRLF.len();
    let content_length = split_crlf(&message[..header_end])
        .into_iter()
        .find(|line| starts_with_ignore_case(line, CONTENT_LENGTH_PREFIX))
        .and_then(|line| std::str::from_utf8(&line[CONTENT_LENGTH_PREFIX.len()..]).ok())
        .and_then(|text| text.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let end = (header_end + content_length).min(message.len());
    debug!(header_end, content_length, end, "trimming exported message");
    Some(message[..end].to_vec())
}

/// `==== <n> ==========` with an optional trailing line break.
fn parse_marker_line(line: &[u8]) -> Option<u64> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let middle = line.strip_prefix(b"==== ")?.strip_suffix(b" ==========")?;
    std::str::from_utf8(middle).ok()?.parse().ok()
}

fn split_inclusive_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    content.split_inclusive(|&b| b == b'\n')
}

fn split_crlf(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut rest = bytes;
    loop {
        let (line, tail) = split_first(rest, CRLF);
        lines.push(line);
        match tail {
            Some(tail) => rest = tail,
            None => return lines,
        }
    }
}

fn split_all<'a>(bytes: &'a [u8], separator: &[u8]) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    let mut rest = bytes;
    loop {
        let (part, tail) = split_first(rest, separator);
        parts.push(part);
        match tail {
            Some(tail) => rest = tail,
            None => return parts,
        }
    }
}

/// Replace the `Content-Length` value in place, keeping the header name's
/// original casing and spacing.
fn rewrite_content_length(lines: &mut [Vec<u8>], length: usize) {
    for line in lines {
        if !starts_with_ignore_case(line, CONTENT_LENGTH_PREFIX) {
            continue;
        }
        let value_start = line[CONTENT_LENGTH_PREFIX.len()..]
            .iter()
            .position(|&b| b != b' ' && b != b'\t')
            .map_or(line.len(), |offset| CONTENT_LENGTH_PREFIX.len() + offset);
        line.truncate(value_start);
        line.extend_from_slice(length.to_string().as_bytes());
        return;
    }
}
