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

//! URL sub-model: ordered directory segments, ordered query parameters,
//! optional fragment. Serializing an unmodified URL reproduces its bytes.

use crate::json::embedded::{re_encode_embedded_json, try_decode_embedded_json};
use crate::json::ValueTree;

/// One path segment of the URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    pub value: Vec<u8>,
    pub fuzz: bool,
}

impl Directory {
    pub fn new(value: Vec<u8>) -> Self {
        Self { value, fuzz: true }
    }
}

/// One query parameter. A parameter whose value holds base64-url-encoded
/// JSON additionally owns the decoded tree, computed eagerly at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    pub key: Vec<u8>,
    /// Absent when the raw segment has no `=` at all; preserved verbatim
    /// for byte-exact reconstruction.
    pub value: Option<Vec<u8>>,
    pub fuzz: bool,
    pub embedded: Option<ValueTree>,
}

impl QueryParameter {
    pub fn new(key: Vec<u8>, value: Option<Vec<u8>>) -> Self {
        let embedded = value
            .as_deref()
            .filter(|v| !v.is_empty())
            .and_then(|v| std::str::from_utf8(v).ok())
            .and_then(try_decode_embedded_json);
        Self {
            key,
            value,
            fuzz: true,
            embedded,
        }
    }

    /// Write the (possibly mutated) embedded tree back into the value.
    pub fn sync_embedded(&mut self) {
        if let Some(tree) = &self.embedded {
            self.value = Some(re_encode_embedded_json(tree).into_bytes());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Url {
    pub raw: Vec<u8>,
    pub scheme: Option<Vec<u8>>,
    /// Kept as raw bytes: the authority is reproduced verbatim when
    /// serializing, whether or not it is valid UTF-8.
    pub authority: Option<Vec<u8>>,
    pub directories: Vec<Directory>,
    /// `None` when the URL has no `?`; `Some` with one empty-keyed entry
    /// for a bare trailing `?`.
    pub parameters: Option<Vec<QueryParameter>>,
    /// Everything after the first `#`, later `#`s included.
    pub fragment: Option<Vec<u8>>,
}

impl Url {
    pub fn parse(raw: &[u8]) -> Self {
        let (scheme, authority) = parse_scheme_authority(raw);
        let skip = scheme.as_ref().map_or(0, |s| s.len() + 1)
            + authority.as_ref().map_or(0, |a| a.len() + 2);
        let rest = &raw[skip..];

        let (pre_fragment, fragment) = crate::http::split_first(rest, b"#");
        let (path, query) = crate::http::split_first(pre_fragment, b"?");

        let parameters = query.map(|q| {
            q.split(|&b| b == b'&')
                .map(|segment| {
                    let (key, value) = crate::http::split_first(segment, b"=");
                    QueryParameter::new(key.to_vec(), value.map(<[u8]>::to_vec))
                })
                .collect::<Vec<_>>()
        });

        let mut directories = Vec::new();
        if !path.is_empty() {
            directories = path
                .split(|&b| b == b'/')
                .map(|segment| Directory::new(segment.to_vec()))
                .collect();
            // The path starts with '/', so the first segment is always the
            // empty string: there is nothing to fuzz there.
            directories[0].fuzz = false;
        }

        Self {
            raw: raw.to_vec(),
            scheme,
            authority,
            directories,
            parameters,
            fragment: fragment.map(<[u8]>::to_vec),
        }
    }

    /// Serialize the current (possibly mutated) state.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.raw.len());
        if let Some(scheme) = &self.scheme {
            out.extend_from_slice(scheme);
            out.push(b':');
        }
        if let Some(authority) = &self.authority {
            out.extend_from_slice(b"//");
            out.extend_from_slice(authority);
        }
        for (index, directory) in self.directories.iter().enumerate() {
            if index != 0 {
                out.push(b'/');
            }
            out.extend_from_slice(&directory.value);
        }
        if let Some(parameters) = &self.parameters {
            out.push(b'?');
            for (index, parameter) in parameters.iter().enumerate() {
                if index != 0 {
                    out.push(b'&');
                }
                out.extend_from_slice(&parameter.key);
                if let Some(value) = &parameter.value {
                    out.push(b'=');
                    out.extend_from_slice(value);
                }
            }
        }
        if let Some(fragment) = &self.fragment {
            out.push(b'#');
            out.extend_from_slice(fragment);
        }
        out
    }

    /// Hostname from the authority: userinfo and port stripped, lowercased.
    pub fn hostname(&self) -> Option<String> {
        let authority = String::from_utf8_lossy(self.authority.as_deref()?).into_owned();
        let host = authority.rsplit('@').next().unwrap_or(&authority);
        let host = host.split(':').next().unwrap_or(host);
        Some(host.to_ascii_lowercase())
    }

    pub fn disable_all_fuzzing(&mut self) {
        for directory in &mut self.directories {
            directory.fuzz = false;
        }
        if let Some(parameters) = &mut self.parameters {
            for parameter in parameters {
                parameter.fuzz = false;
                if let Some(tree) = &mut parameter.embedded {
                    tree.disable_all();
                }
            }
        }
    }
}

fn parse_scheme_authority(raw: &[u8]) -> (Option<Vec<u8>>, Option<Vec<u8>>) {
    let Some(scheme_end) = crate::http::find_subslice(raw, b"://") else {
        return (None, None);
    };
    if scheme_end == 0
        || !raw[..scheme_end]
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
    {
        return (None, None);
    }
    let after = &raw[scheme_end + 3..];
    let authority_end = after
        .iter()
        .position(|&b| matches!(b, b'/' | b'?' | b'#'))
        .unwrap_or(after.len());
    (
        Some(raw[..scheme_end].to_vec()),
        Some(after[..authority_end].to_vec()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND_TRIP_URLS: &[&[u8]] = &[
        b"http://www.example.com",
        b"http://www.example.com/",
        b"http://www.example.com/c",
        b"https://www.example.com/",
        b"https://a.b.example.com/c",
        b"/a/b?name1=value1&name2=val?ue2##asd#asd",
        b"/a/b?name1=value1&name2=val?ue2#",
        b"/a/b?name1=value1&name2=val?ue2",
        b"/a/b?name1=value1&&name2=val?ue2",
        b"/a/b?name1=value1",
        b"/a/b?name1=",
        b"/a/b?name1&name2=value2",
        b"/a/b?=",
        b"/a/b?",
        b"/a/b",
        b"/a",
    ];

    #[test]
    fn serialize_round_trip() {
        for url in ROUND_TRIP_URLS {
            assert_eq!(Url::parse(url).serialize(), *url, "{}", String::from_utf8_lossy(url));
        }
    }

    #[test]
    fn directory_segments() {
        let cases: &[(&[u8], &[&[u8]])] = &[
            (b"http://www.example.com", &[]),
            (b"http://www.example.com/", &[b"", b""]),
            (b"http://www.example.com/c", &[b"", b"c"]),
            (b"/a/b?name1=value1", &[b"", b"a", b"b"]),
            (b"/a", &[b"", b"a"]),
            (b"", &[]),
        ];
        for (url, expected) in cases {
            let parsed = Url::parse(url);
            let directories: Vec<&[u8]> = parsed
                .directories
                .iter()
                .map(|d| d.value.as_slice())
                .collect();
            assert_eq!(&directories, expected, "{}", String::from_utf8_lossy(url));
        }
    }

    #[test]
    fn first_directory_is_never_fuzzed() {
        let parsed = Url::parse(b"/a/b");
        assert!(!parsed.directories[0].fuzz);
        assert!(parsed.directories[1].fuzz);
        assert!(parsed.directories[2].fuzz);
    }

    #[test]
    fn parameter_without_equals_has_no_value() {
        let parsed = Url::parse(b"/a/b?name1&name2=value2");
        let parameters = parsed.parameters.unwrap();
        assert_eq!(parameters[0].key, b"name1");
        assert_eq!(parameters[0].value, None);
        assert_eq!(parameters[1].value.as_deref(), Some(&b"value2"[..]));
    }

    #[test]
    fn embedded_json_is_detected_in_parameter_values() {
        let parsed = Url::parse(b"/a?data=eyIxIjogMn0");
        let parameters = parsed.parameters.unwrap();
        let tree = parameters[0].embedded.as_ref().unwrap();
        assert_eq!(tree.to_canonical_string(), r#"{"1": 2}"#);

        let plain = Url::parse(b"/a?data=hello");
        assert!(plain.parameters.unwrap()[0].embedded.is_none());
    }

    #[test]
    fn non_utf8_authority_round_trips_without_panicking() {
        let raw: &[u8] = b"http://\xff\xfe.example/a?q=1";
        let parsed = Url::parse(raw);
        assert_eq!(parsed.authority.as_deref(), Some(&b"\xff\xfe.example"[..]));
        assert_eq!(parsed.serialize(), raw);

        // A bare non-UTF-8 authority with nothing after it.
        let bare: &[u8] = b"http://\xff";
        assert_eq!(Url::parse(bare).serialize(), bare);
    }

    #[test]
    fn hostname_strips_port_and_userinfo() {
        assert_eq!(
            Url::parse(b"https://User@Example.com:8443/x").hostname(),
            Some("example.com".to_string())
        );
        assert_eq!(Url::parse(b"/a/b").hostname(), None);
    }
}
