//! Block type names and the implicit `core/` namespace.
//!
//! Delimiters for core blocks omit their namespace (`<!-- wp:paragraph -->`),
//! while every other block carries it (`<!-- wp:my-plugin/card -->`). Inside
//! the tokenizer all names are normalized to their fully-qualified form.

use std::borrow::Cow;

/// Namespace implied by a delimiter name without a `/`.
pub const CORE_NAMESPACE: &str = "core";

/// Filter value matching every block type.
pub const WILDCARD: &str = "*";

/// Prefixes `core/` onto any name without a namespace.
///
/// ```
/// use entitykit_syntax::normalize_block_type;
///
/// assert_eq!(normalize_block_type("paragraph"), "core/paragraph");
/// assert_eq!(normalize_block_type("core/paragraph"), "core/paragraph");
/// assert_eq!(normalize_block_type("my/block"), "my/block");
/// ```
pub fn normalize_block_type(name: &str) -> Cow<'_, str> {
    if name.contains('/') {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{CORE_NAMESPACE}/{name}"))
    }
}

/// Removes the implied `core/` namespace, as block delimiters are written.
pub fn strip_core_namespace(name: &str) -> &str {
    name.strip_prefix("core/").unwrap_or(name)
}

/// Whether a normalized block type satisfies a filter (`*`, shorthand, or full name).
pub fn matches_filter(block_type: &str, filter: &str) -> bool {
    filter == WILDCARD || normalize_block_type(filter) == block_type
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("paragraph", "core/paragraph")]
    #[case("core/paragraph", "core/paragraph")]
    #[case("my-plugin/custom-block", "my-plugin/custom-block")]
    #[case("", "core/")]
    fn normalizes_names(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_block_type(input), expected);
    }

    #[rstest]
    #[case("paragraph")]
    #[case("core/heading")]
    #[case("acme/hero")]
    #[case("a/b/c")]
    fn normalization_is_idempotent(#[case] input: &str) {
        let once = normalize_block_type(input).into_owned();
        assert_eq!(normalize_block_type(&once), once);
    }

    #[test]
    fn strips_only_core_namespace() {
        assert_eq!(strip_core_namespace("core/paragraph"), "paragraph");
        assert_eq!(strip_core_namespace("acme/hero"), "acme/hero");
        assert_eq!(strip_core_namespace("paragraph"), "paragraph");
    }

    #[rstest]
    #[case("core/paragraph", "*", true)]
    #[case("core/paragraph", "paragraph", true)]
    #[case("core/paragraph", "core/paragraph", true)]
    #[case("core/paragraph", "heading", false)]
    #[case("my-plugin/custom-block", "my-plugin/custom-block", true)]
    #[case("my-plugin/custom-block", "custom-block", false)]
    fn filters(#[case] block_type: &str, #[case] filter: &str, #[case] expected: bool) {
        assert_eq!(matches_filter(block_type, filter), expected);
    }
}
