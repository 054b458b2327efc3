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

//! Payload wordlists and token expansion.
//!
//! Wordlist files are line-based, so bytes that would end a line travel
//! in bracket notation: `<hex00>`, `<hex0a>`, `<hex0d>`. The
//! `<original>` token stands for the field's current value and is
//! replaced after the hex tokens, so a field value containing bracket
//! notation is never expanded by accident.

use std::path::Path;

use crate::errors::FuzzError;

/// Token that expands to the field's unmodified value.
pub const ORIGINAL_TOKEN: &str = "<original>";

const HEX_TOKENS: &[(&str, &str)] = &[
    ("<hex00>", "\x00"),
    ("<hex0a>", "\x0a"),
    ("<hex0d>", "\x0d"),
];

/// Replace bracket notation with the bytes it names.
pub fn expand_hex_tokens(payload: &str) -> String {
    let mut expanded = payload.to_string();
    for (token, replacement) in HEX_TOKENS {
        expanded = expanded.replace(token, replacement);
    }
    expanded
}

/// Replace the named bytes with bracket notation, for display.
pub fn collapse_hex_tokens(payload: &str) -> String {
    let mut collapsed = payload.to_string();
    for (token, replacement) in HEX_TOKENS {
        collapsed = collapsed.replace(replacement, token);
    }
    collapsed
}

/// Turn a wordlist entry into the string actually substituted into the
/// request.
pub fn prepare(payload: &str, original_value: &str) -> String {
    expand_hex_tokens(payload).replace(ORIGINAL_TOKEN, original_value)
}

/// Load payloads from a line-based wordlist file.
pub fn load_wordlist(filename: &Path) -> Result<Vec<String>, FuzzError> {
    let content = std::fs::read_to_string(filename)?;
    Ok(content.lines().map(str::to_string).collect())
}

/// The wordlist compiled into the binary, used when none is given.
pub fn default_wordlist() -> Vec<String> {
    include_str!("../wordlists/default.txt")
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_tokens_expand_and_collapse() {
        assert_eq!(expand_hex_tokens("a<hex00>b<hex0d><hex0a>"), "a\0b\r\n");
        assert_eq!(collapse_hex_tokens("a\0b\r\n"), "a<hex00>b<hex0d><hex0a>");
    }

    #[test]
    fn original_token_is_replaced_after_hex_expansion() {
        assert_eq!(prepare("<original>'--", "admin"), "admin'--");
        // A field value containing bracket notation stays literal.
        assert_eq!(prepare("<original>", "x<hex00>y"), "x<hex00>y");
    }

    #[test]
    fn default_wordlist_is_not_empty() {
        let payloads = default_wordlist();
        assert!(payloads.len() >= 10);
        assert!(payloads.iter().any(|p| p.contains(ORIGINAL_TOKEN)));
    }
}
