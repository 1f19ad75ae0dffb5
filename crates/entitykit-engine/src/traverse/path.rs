use std::fmt;

use serde::Serialize;

/// One step into a nested value.
///
/// Objects are addressed by [`Key`](PathSegment::Key); an [`Index`](PathSegment::Index)
/// on an object looks up the decimal key, so `{"0": ...}` is reachable either way.
/// Arrays only answer to indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// The object key this segment addresses.
    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(i) => i.to_string(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Turns command-line keys into path segments.
///
/// A key becomes an index only when it is the canonical spelling of a
/// non-negative integer: `"12"` does, `"012"`, `"+1"` and `"-1"` stay keys.
pub fn coerce_path<S: AsRef<str>>(keys: &[S]) -> Vec<PathSegment> {
    keys.iter().map(|key| coerce(key.as_ref())).collect()
}

fn coerce(key: &str) -> PathSegment {
    match key.parse::<usize>() {
        Ok(index) if index.to_string() == key => PathSegment::Index(index),
        _ => PathSegment::Key(key.to_owned()),
    }
}

/// Renders a path as `a.b.0` for messages.
pub fn display_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return String::from("(root)");
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
