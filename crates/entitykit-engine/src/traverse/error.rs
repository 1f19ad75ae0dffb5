use super::path::{PathSegment, display_path};

/// Where a lookup stopped: the node that exists and the key it lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey {
    /// Path of the node the key was looked up on.
    pub parent: Vec<PathSegment>,
    pub key: PathSegment,
}

impl MissingKey {
    /// Full path of the missing entry.
    pub fn path(&self) -> Vec<PathSegment> {
        let mut path = self.parent.clone();
        path.push(self.key.clone());
        path
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraverseError {
    #[error("No data exists for key \"{}\"", display_path(&.0.path()))]
    KeyNotFound(MissingKey),
    #[error("Cannot descend into {kind} at \"{}\"", display_path(.path))]
    NotAContainer {
        path: Vec<PathSegment>,
        kind: &'static str,
    },
    #[error("Cannot add key \"{key}\" to the array at \"{}\"", display_path(.path))]
    KeyOnArray {
        path: Vec<PathSegment>,
        key: String,
    },
    #[error("Index {index} would leave a gap in the array of length {len}")]
    SparseIndex { index: usize, len: usize },
    #[error("An empty path has no parent to delete from")]
    EmptyPath,
}
