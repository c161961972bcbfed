//! Reserved namespaces, codes and markers.
//!
//! # Code Ranges
//!
//! | Namespace  | Code  | Purpose                                      |
//! |------------|-------|----------------------------------------------|
//! | any        | `0`   | invalid, never declarable                    |
//! | `ERRCODE`  | `1`   | a template failed to parse                   |
//! | `ERRCODE`  | `2`   | a template failed to execute                 |
//! | `ERRCODE`  | `3+`  | reserved for future engine failures          |
//! | `ERR`      | `1+`  | default namespace, free for applications     |
//! | other      | `1+`  | free for applications                        |
//!
//! The `ERRCODE` namespace can be neither declared into nor overridden, so
//! a broken application template always degrades into one of the values
//! below.

use crate::ErrorKey;

// ── Namespaces ────────────────────────────────────────────────────

/// Namespace used by `Registry::declare` and by override lines without a
/// `NAMESPACE|` prefix.
pub const DEFAULT_NAMESPACE: &str = "ERR";

/// Namespace owned by the render engine itself.
pub const RESERVED_NAMESPACE: &str = "ERRCODE";

// ── Engine codes ──────────────────────────────────────────────────

pub const CODE_TEMPLATE_PARSE: u64 = 1;
pub const CODE_TEMPLATE_EXEC: u64 = 2;

/// Identity of the value produced when a template fails to parse.
pub fn template_parse_error() -> ErrorKey {
    ErrorKey::new(RESERVED_NAMESPACE, CODE_TEMPLATE_PARSE)
}

/// Identity of the value produced when a template fails to execute.
pub fn template_exec_error() -> ErrorKey {
    ErrorKey::new(RESERVED_NAMESPACE, CODE_TEMPLATE_EXEC)
}

// ── Markers ───────────────────────────────────────────────────────

/// Emitted by the renderer for a placeholder with no value. Never escapes
/// the crate: it is rewritten to the configured sentinel before a message
/// is stored.
pub(crate) const MISSING_MARKER: &str = "<no value>";

/// Default human-visible replacement for a missing value.
pub const DEFAULT_SENTINEL: &str = "[NO_VALUE]";

/// True if `namespace` belongs to the engine.
#[inline]
pub fn is_reserved(namespace: &str) -> bool {
    namespace == RESERVED_NAMESPACE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_codes_are_distinct() {
        assert_ne!(template_parse_error(), template_exec_error());
        assert_eq!(template_parse_error().namespace(), RESERVED_NAMESPACE);
    }

    #[test]
    fn default_namespace_is_not_reserved() {
        assert!(!is_reserved(DEFAULT_NAMESPACE));
        assert!(is_reserved("ERRCODE"));
        assert!(!is_reserved("errcode"));
    }

    #[test]
    fn sentinel_differs_from_marker() {
        assert_ne!(DEFAULT_SENTINEL, MISSING_MARKER);
    }
}
