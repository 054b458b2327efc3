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

//! Value-tree codec.
//!
//! Converts a JSON document into an ordered, flat list of leaf paths and
//! back. Every other component that mutates JSON builds on this module:
//! the request body, and JSON embedded base64-url-encoded inside cookie or
//! query-parameter values.
//!
//! Invariants:
//! - every [`LeafPath`] ends in a [`Segment::Leaf`] and has length >= 1;
//! - recomposing a tree and decomposing the result yields the same tree;
//! - object keys and array indices reappear in the order in which paths
//!   first introduced them (requires serde_json's `preserve_order`).

pub mod embedded;

use crate::errors::FuzzError;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Serializer, Value};
use std::fmt;
use std::io;

/// One step on the way from the document root to a leaf.
///
/// The final segment of a path is always `Leaf` and carries the scalar
/// itself; an empty object or array is treated as an opaque leaf so that
/// it stays distinguishable from an absent container.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object member, addressed by key.
    Key(String),
    /// Array element, addressed by position.
    Index(usize),
    /// Terminal scalar (or empty container).
    Leaf(Value),
}

/// Absolute path of a single leaf in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafPath {
    pub segments: Vec<Segment>,
    /// Whether the driver may substitute a payload into this leaf.
    pub fuzz: bool,
}

impl LeafPath {
    pub fn leaf(&self) -> Option<&Value> {
        match self.segments.last() {
            Some(Segment::Leaf(value)) => Some(value),
            _ => None,
        }
    }

    /// Replace the scalar carried by the final segment.
    pub fn set_leaf(&mut self, value: Value) {
        if let Some(Segment::Leaf(slot)) = self.segments.last_mut() {
            *slot = value;
        }
    }

    /// Text form of the leaf used when a payload refers back to the
    /// original value: strings expand as-is, `null` as the empty string,
    /// everything else as canonical JSON text.
    pub fn leaf_text(&self) -> String {
        match self.leaf() {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => canonical_json(other),
        }
    }
}

impl fmt::Display for LeafPath {
    /// Renders `{"6": [7, {"8": 9}]}`'s second leaf as `6.[1].8=9`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((last, inner)) = self.segments.split_last() else {
            return Ok(());
        };
        for (index, segment) in inner.iter().enumerate() {
            if index != 0 {
                write!(f, ".")?;
            }
            match segment {
                Segment::Key(key) => write!(f, "{key}")?,
                Segment::Index(position) => write!(f, "[{position}]")?,
                Segment::Leaf(value) => write!(f, "{}", scalar_text(value))?,
            }
        }
        match last {
            Segment::Leaf(value) => write!(f, "={}", scalar_text(value)),
            Segment::Key(key) => write!(f, "={key}"),
            Segment::Index(position) => write!(f, "=[{position}]"),
        }
    }
}

/// Ordered list of leaf paths representing a whole JSON document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueTree {
    pub paths: Vec<LeafPath>,
}

impl ValueTree {
    /// Parse JSON text and decompose it.
    pub fn parse(text: &str) -> Result<Self, FuzzError> {
        let document: Value = serde_json::from_str(text)
            .map_err(|err| FuzzError::MalformedDocument(err.to_string()))?;
        Ok(Self::decompose(&document))
    }

    /// Depth-first walk of the document in key/index iteration order.
    pub fn decompose(document: &Value) -> Self {
        let mut paths = Vec::new();
        let mut prefix = Vec::new();
        walk(document, &mut prefix, &mut paths);
        Self { paths }
    }

    /// Rebuild the document by replaying paths in order, creating each
    /// container lazily the first time a path traverses it. Arrays are
    /// rebuilt by sequential append only.
    pub fn recompose(&self) -> Value {
        let Some(first) = self.paths.first().and_then(|p| p.segments.first()) else {
            return Value::Null;
        };
        let mut root = match first {
            // A top-level document that is itself a scalar.
            Segment::Leaf(scalar) => return scalar.clone(),
            Segment::Key(_) => Value::Object(Map::new()),
            Segment::Index(_) => Value::Array(Vec::new()),
        };
        for path in &self.paths {
            insert_path(&mut root, &path.segments);
        }
        root
    }

    /// Canonical text of the rebuilt document.
    pub fn to_canonical_string(&self) -> String {
        canonical_json(&self.recompose())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn disable_all(&mut self) {
        for path in &mut self.paths {
            path.fuzz = false;
        }
    }
}

fn walk(value: &Value, prefix: &mut Vec<Segment>, out: &mut Vec<LeafPath>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                prefix.push(Segment::Key(key.clone()));
                walk(child, prefix, out);
                prefix.pop();
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                prefix.push(Segment::Index(index));
                walk(child, prefix, out);
                prefix.pop();
            }
        }
        leaf => {
            let mut segments = prefix.clone();
            segments.push(Segment::Leaf(leaf.clone()));
            out.push(LeafPath {
                segments,
                fuzz: true,
            });
        }
    }
}

fn seed_for(next: &Segment) -> Value {
    match next {
        Segment::Key(_) => Value::Object(Map::new()),
        Segment::Index(_) => Value::Array(Vec::new()),
        Segment::Leaf(value) => value.clone(),
    }
}

fn insert_path(root: &mut Value, segments: &[Segment]) {
    let mut cursor = root;
    for pair in segments.windows(2) {
        let next = &pair[1];
        match &pair[0] {
            Segment::Key(key) => {
                let Value::Object(map) = cursor else { return };
                cursor = map.entry(key.clone()).or_insert_with(|| seed_for(next));
            }
            Segment::Index(index) => {
                let Value::Array(items) = cursor else { return };
                if *index == items.len() {
                    items.push(seed_for(next));
                }
                let Some(slot) = items.get_mut(*index) else {
                    return;
                };
                cursor = slot;
            }
            Segment::Leaf(_) => return,
        }
    }
}

/// Render a scalar the way it appears in path displays: strings bare,
/// everything else as canonical JSON.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => canonical_json(other),
    }
}

/// Serialize with `", "` item and `": "` key separators. This spacing is
/// the observable on-the-wire encoding the tool emits and matches what the
/// embedded-payload round trip asserts byte-for-byte.
pub fn canonical_json(value: &Value) -> String {
    let mut out = Vec::with_capacity(128);
    let mut ser = Serializer::with_formatter(&mut out, SpacedFormatter);
    if value.serialize(&mut ser).is_ok() {
        if let Ok(text) = String::from_utf8(out) {
            return text;
        }
    }
    // Serializing a Value into a Vec cannot fail in practice.
    value.to_string()
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !first {
            writer.write_all(b", ")?;
        }
        Ok(())
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !first {
            writer.write_all(b", ")?;
        }
        Ok(())
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NESTED: &str = r#"{"1": {"2": 3}, "4": 5, "6": [7, {"8": 9, "10": 11}]}"#;

    fn path(segments: Vec<Segment>) -> LeafPath {
        LeafPath {
            segments,
            fuzz: true,
        }
    }

    fn nested_paths() -> Vec<LeafPath> {
        use Segment::{Index, Key, Leaf};
        vec![
            path(vec![Key("1".into()), Key("2".into()), Leaf(json!(3))]),
            path(vec![Key("4".into()), Leaf(json!(5))]),
            path(vec![Key("6".into()), Index(0), Leaf(json!(7))]),
            path(vec![
                Key("6".into()),
                Index(1),
                Key("8".into()),
                Leaf(json!(9)),
            ]),
            path(vec![
                Key("6".into()),
                Index(1),
                Key("10".into()),
                Leaf(json!(11)),
            ]),
        ]
    }

    #[test]
    fn decompose_nested_document() {
        let tree = ValueTree::parse(NESTED).unwrap();
        assert_eq!(tree.paths, nested_paths());
    }

    #[test]
    fn decompose_empty_and_scalar_documents() {
        for (text, leaf) in [
            ("{}", json!({})),
            ("[]", json!([])),
            (r#""asd""#, json!("asd")),
        ] {
            let tree = ValueTree::parse(text).unwrap();
            assert_eq!(tree.paths.len(), 1);
            assert_eq!(tree.paths[0].segments.len(), 1);
            assert_eq!(tree.paths[0].leaf(), Some(&leaf));
        }
    }

    #[test]
    fn round_trip_matches_canonical_text() {
        for text in [NESTED, "{}", "[]", r#""asd""#] {
            let tree = ValueTree::parse(text).unwrap();
            assert_eq!(tree.to_canonical_string(), text);
        }
    }

    #[test]
    fn recompose_round_trip_is_stable() {
        let tree = ValueTree::parse(NESTED).unwrap();
        let rebuilt = ValueTree::decompose(&tree.recompose());
        assert_eq!(tree, rebuilt);
    }

    #[test]
    fn mutating_one_leaf_changes_only_that_leaf() {
        let mut tree = ValueTree::parse(NESTED).unwrap();
        tree.paths[3].set_leaf(json!("modified"));
        assert_eq!(
            tree.to_canonical_string(),
            r#"{"1": {"2": 3}, "4": 5, "6": [7, {"8": "modified", "10": 11}]}"#,
        );
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(matches!(
            ValueTree::parse("not json"),
            Err(FuzzError::MalformedDocument(_))
        ));
    }

    #[test]
    fn path_display() {
        let tree = ValueTree::parse(NESTED).unwrap();
        assert_eq!(tree.paths[3].to_string(), "6.[1].8=9");
    }

    #[test]
    fn leaf_text_stringifies_non_strings() {
        let tree = ValueTree::parse(r#"{"a": null, "b": "x", "c": true, "d": {}}"#).unwrap();
        let texts: Vec<String> = tree.paths.iter().map(LeafPath::leaf_text).collect();
        assert_eq!(texts, ["", "x", "true", "{}"]);
    }

    #[test]
    fn empty_tree_recomposes_to_null() {
        assert_eq!(ValueTree::default().recompose(), Value::Null);
    }
}
