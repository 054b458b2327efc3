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

//! HTTP wire-format models.
//!
//! The request model and its sub-models deliberately parse the ambiguous,
//! partially specified wire format by hand: the whole point is byte-exact
//! reconstruction, which grammar-level parsers do not guarantee.

pub mod fields;
pub mod request;
pub mod response;
pub mod url;

use percent_encoding::{percent_decode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub(crate) const CRLF: &[u8] = b"\r\n";
pub(crate) const DOUBLE_CRLF: &[u8] = b"\r\n\r\n";

/// Bytes kept verbatim by form-style encoding (unreserved set).
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same, but `/` stays literal inside path segments.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Form-style percent encoding: space becomes `+`.
pub fn quote_plus(text: &str) -> String {
    utf8_percent_encode(text, FORM_ENCODE_SET)
        .to_string()
        .replace("%20", "+")
}

/// Path-style percent encoding: `/` survives, space becomes `%20`.
pub fn quote_path(text: &str) -> String {
    utf8_percent_encode(text, PATH_ENCODE_SET).to_string()
}

/// Form-style percent decoding: `+` becomes a space before `%xx` decoding.
pub fn unquote_plus(bytes: &[u8]) -> Vec<u8> {
    let mut swapped = bytes.to_vec();
    for b in &mut swapped {
        if *b == b'+' {
            *b = b' ';
        }
    }
    percent_decode(&swapped).collect()
}

pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Split at the first occurrence of `separator`. Returns the part before
/// and, when the separator occurs at all, everything after it (later
/// occurrences included).
pub(crate) fn split_first<'a>(bytes: &'a [u8], separator: &[u8]) -> (&'a [u8], Option<&'a [u8]>) {
    match find_subslice(bytes, separator) {
        Some(index) => (&bytes[..index], Some(&bytes[index + separator.len()..])),
        None => (bytes, None),
    }
}

/// Case-insensitive ASCII prefix test, used for header-name matching.
pub(crate) fn starts_with_ignore_case(bytes: &[u8], prefix: &[u8]) -> bool {
    bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_first_keeps_later_separators_in_tail() {
        let (pre, post) = split_first(b"a#b#c", b"#");
        assert_eq!(pre, b"a");
        assert_eq!(post, Some(&b"b#c"[..]));

        let (pre, post) = split_first(b"abc", b"#");
        assert_eq!(pre, b"abc");
        assert_eq!(post, None);

        let (pre, post) = split_first(b"a=", b"=");
        assert_eq!(pre, b"a");
        assert_eq!(post, Some(&b""[..]));
    }

    #[test]
    fn quote_plus_escapes_form_characters() {
        assert_eq!(quote_plus("a b&c=d"), "a+b%26c%3Dd");
        assert_eq!(quote_plus("safe-._~"), "safe-._~");
    }

    #[test]
    fn quote_path_keeps_slashes() {
        assert_eq!(quote_path("../a b"), "../a%20b");
    }

    #[test]
    fn unquote_plus_round_trip() {
        assert_eq!(unquote_plus(b"a+b%26c%3Dd"), b"a b&c=d");
        assert_eq!(unquote_plus(quote_plus("x y/z%").as_bytes()), b"x y/z%");
    }

    #[test]
    fn header_prefix_matching_is_case_insensitive() {
        assert!(starts_with_ignore_case(b"Content-Length: 5", b"content-length:"));
        assert!(!starts_with_ignore_case(b"Content", b"content-length:"));
    }
}
