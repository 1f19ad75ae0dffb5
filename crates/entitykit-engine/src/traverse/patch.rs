//! Reading and patching nested option values.

use std::{fmt, str::FromStr};

use serde_json::Value;

use super::{PathSegment, TraverseError, Traverser, lookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchAction {
    Insert,
    Update,
    Delete,
}

impl FromStr for PatchAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(PatchAction::Insert),
            "update" => Ok(PatchAction::Update),
            "delete" => Ok(PatchAction::Delete),
            other => Err(format!("expected insert, update or delete, got {other:?}")),
        }
    }
}

impl fmt::Display for PatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatchAction::Insert => "insert",
            PatchAction::Update => "update",
            PatchAction::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
    /// The patched value, which differs from the original.
    Updated(Value),
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error(transparent)]
    Traverse(#[from] TraverseError),
    #[error("Please provide value to {0}.")]
    MissingValue(PatchAction),
}

/// Decodes a string holding a JSON object or array; anything else is returned as is.
pub fn decode_json_string(value: Value) -> Value {
    if let Value::String(s) = &value
        && s.trim_start().starts_with(['{', '['])
        && let Ok(decoded) = serde_json::from_str(s)
    {
        return decoded;
    }
    value
}

/// Reads the value at `path`, looking inside JSON-encoded strings.
pub fn pluck(value: &Value, path: &[PathSegment]) -> Result<Value, TraverseError> {
    match value {
        Value::String(_) => lookup(&decode_json_string(value.clone()), path).cloned(),
        _ => lookup(value, path).cloned(),
    }
}

/// Applies `action` at `path` and reports whether anything changed.
///
/// `patch_value` is required for inserts and updates and ignored for deletes.
pub fn patch(
    value: Value,
    action: PatchAction,
    path: &[PathSegment],
    patch_value: Option<Value>,
) -> Result<PatchOutcome, PatchError> {
    let original = decode_json_string(value);
    let mut patched = original.clone();
    let mut traverser = Traverser::new(&mut patched);

    match action {
        PatchAction::Insert => {
            traverser.insert(path, patch_value.ok_or(PatchError::MissingValue(action))?)?
        }
        PatchAction::Update => {
            traverser.update(path, patch_value.ok_or(PatchError::MissingValue(action))?)?
        }
        PatchAction::Delete => {
            traverser.delete(path)?;
        }
    }

    if patched == original {
        Ok(PatchOutcome::Unchanged)
    } else {
        Ok(PatchOutcome::Updated(patched))
    }
}
