pub mod blocks;
pub mod traverse;

// Re-export key types for easier usage
pub use blocks::*;
pub use traverse::{
    MissingKey, PatchAction, PatchError, PatchOutcome, PathSegment, TraverseError, Traverser,
    coerce_path, patch, pluck,
};

pub use entitykit_syntax::{Attributes, Block};
