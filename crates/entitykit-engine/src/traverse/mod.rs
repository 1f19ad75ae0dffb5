//! # Recursive Data Traverser
//!
//! Path based access into nested JSON values, used for option and meta values
//! that hold arrays and objects.
//!
//! ```
//! use entitykit_engine::traverse::{PathSegment, Traverser};
//! use serde_json::json;
//!
//! let mut data = json!({"foo": {"bar": "baz"}});
//! let path = [PathSegment::from("foo"), PathSegment::from("bar")];
//!
//! let mut traverser = Traverser::new(&mut data);
//! assert_eq!(traverser.get(&path).unwrap(), "baz");
//!
//! traverser.delete(&path).unwrap();
//! assert_eq!(data, json!({"foo": {}}));
//! ```
//!
//! Every step goes through [`Container`], which decides how a segment
//! addresses an array or an object. A lookup that runs out of data fails
//! with [`TraverseError::KeyNotFound`], naming the node where it stopped;
//! [`Traverser::insert`] uses that to create missing levels one at a time.

pub mod error;
pub mod patch;
pub mod path;

use serde_json::{Map, Value};

pub use error::{MissingKey, TraverseError};
pub use patch::{PatchAction, PatchError, PatchOutcome, decode_json_string, patch, pluck};
pub use path::{PathSegment, coerce_path, display_path};

/// Shared view of a value that can hold children.
#[derive(Debug, Clone, Copy)]
pub enum Container<'v> {
    Array(&'v Vec<Value>),
    Object(&'v Map<String, Value>),
}

impl<'v> Container<'v> {
    pub fn of(value: &'v Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Container::Array(items)),
            Value::Object(map) => Some(Container::Object(map)),
            _ => None,
        }
    }

    pub fn child(self, segment: &PathSegment) -> Option<&'v Value> {
        match (self, segment) {
            (Container::Array(items), PathSegment::Index(i)) => items.get(*i),
            (Container::Array(_), PathSegment::Key(_)) => None,
            (Container::Object(map), segment) => map.get(&segment.as_key()),
        }
    }
}

/// Mutable view of a value that can hold children.
#[derive(Debug)]
pub enum ContainerMut<'v> {
    Array(&'v mut Vec<Value>),
    Object(&'v mut Map<String, Value>),
}

impl<'v> ContainerMut<'v> {
    pub fn of(value: &'v mut Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(ContainerMut::Array(items)),
            Value::Object(map) => Some(ContainerMut::Object(map)),
            _ => None,
        }
    }

    pub fn child(self, segment: &PathSegment) -> Option<&'v mut Value> {
        match (self, segment) {
            (ContainerMut::Array(items), PathSegment::Index(i)) => items.get_mut(*i),
            (ContainerMut::Array(_), PathSegment::Key(_)) => None,
            (ContainerMut::Object(map), segment) => map.get_mut(&segment.as_key()),
        }
    }

    /// Removes a child, keeping the order of the rest.
    pub fn remove(self, segment: &PathSegment) -> Option<Value> {
        match (self, segment) {
            (ContainerMut::Array(items), PathSegment::Index(i)) if *i < items.len() => {
                Some(items.remove(*i))
            }
            (ContainerMut::Array(_), _) => None,
            (ContainerMut::Object(map), segment) => map.shift_remove(&segment.as_key()),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn missing(path: &[PathSegment], depth: usize) -> TraverseError {
    TraverseError::KeyNotFound(MissingKey {
        parent: path[..depth].to_vec(),
        key: path[depth].clone(),
    })
}

/// Error for a step from `node`, which sits at `path[..depth]`.
fn step_error(node: &Value, path: &[PathSegment], depth: usize) -> TraverseError {
    match node {
        Value::Null | Value::Array(_) | Value::Object(_) => missing(path, depth),
        scalar => TraverseError::NotAContainer {
            path: path[..depth].to_vec(),
            kind: kind_of(scalar),
        },
    }
}

/// Looks up `path` inside `root`.
pub fn lookup<'v>(root: &'v Value, path: &[PathSegment]) -> Result<&'v Value, TraverseError> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        current = Container::of(current)
            .and_then(|container| container.child(segment))
            .ok_or_else(|| step_error(current, path, depth))?;
    }
    Ok(current)
}

/// Looks up `path` inside `root` for writing.
pub fn lookup_mut<'v>(
    root: &'v mut Value,
    path: &[PathSegment],
) -> Result<&'v mut Value, TraverseError> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        if Container::of(current).and_then(|c| c.child(segment)).is_none() {
            return Err(step_error(current, path, depth));
        }
        current = ContainerMut::of(current)
            .and_then(|container| container.child(segment))
            .ok_or_else(|| missing(path, depth))?;
    }
    Ok(current)
}

/// Borrows a value for path based reads and writes.
pub struct Traverser<'a> {
    data: &'a mut Value,
}

impl<'a> Traverser<'a> {
    pub fn new(data: &'a mut Value) -> Self {
        Self { data }
    }

    /// The whole value, including any changes made so far.
    pub fn value(&self) -> &Value {
        &*self.data
    }

    pub fn get(&self, path: &[PathSegment]) -> Result<&Value, TraverseError> {
        lookup(&*self.data, path)
    }

    /// Replaces an existing value. Every segment of the path must already exist.
    pub fn update(&mut self, path: &[PathSegment], value: Value) -> Result<(), TraverseError> {
        *lookup_mut(self.data, path)? = value;
        Ok(())
    }

    /// Sets a value, creating missing levels along the way.
    ///
    /// Each missing key is added as `null` on the node where the lookup
    /// stopped, and the lookup is retried. A `null` node becomes an object,
    /// or an array when the next segment is index 0. Arrays only grow by
    /// appending.
    pub fn insert(&mut self, path: &[PathSegment], value: Value) -> Result<(), TraverseError> {
        loop {
            let missing = match lookup_mut(self.data, path) {
                Ok(slot) => {
                    *slot = value;
                    return Ok(());
                }
                Err(TraverseError::KeyNotFound(missing)) => missing,
                Err(err) => return Err(err),
            };
            self.vivify(&missing)?;
        }
    }

    /// Removes the last segment of `path` from its parent and returns it.
    pub fn delete(&mut self, path: &[PathSegment]) -> Result<Value, TraverseError> {
        let (last, parent_path) = path.split_last().ok_or(TraverseError::EmptyPath)?;
        let parent = lookup_mut(self.data, parent_path)?;

        if Container::of(parent).is_none() {
            return Err(step_error(parent, path, parent_path.len()));
        }
        ContainerMut::of(parent)
            .and_then(|container| container.remove(last))
            .ok_or_else(|| missing(path, parent_path.len()))
    }

    fn vivify(&mut self, missing: &MissingKey) -> Result<(), TraverseError> {
        let node = lookup_mut(self.data, &missing.parent)?;

        if node.is_null() {
            *node = match missing.key {
                PathSegment::Index(0) => Value::Array(Vec::new()),
                _ => Value::Object(Map::new()),
            };
        }

        match (node, &missing.key) {
            (Value::Object(map), key) => {
                map.insert(key.as_key(), Value::Null);
            }
            (Value::Array(items), PathSegment::Index(i)) if *i == items.len() => {
                items.push(Value::Null);
            }
            (Value::Array(items), PathSegment::Index(i)) => {
                return Err(TraverseError::SparseIndex {
                    index: *i,
                    len: items.len(),
                });
            }
            (Value::Array(_), PathSegment::Key(key)) => {
                return Err(TraverseError::KeyOnArray {
                    path: missing.parent.clone(),
                    key: key.clone(),
                });
            }
            (scalar, _) => {
                return Err(TraverseError::NotAContainer {
                    path: missing.parent.clone(),
                    kind: kind_of(scalar),
                });
            }
        }

        log::debug!("created {}", display_path(&missing.path()));
        Ok(())
    }
}
