use std::sync::Arc;

/// The identity of an error template: `(namespace, code)`.
///
/// Two error values are "the same error" exactly when their keys are equal.
/// The namespace alias and the rendered message never take part in
/// equality.
///
/// # Naming conventions
///
/// | Part        | Example     | Notes                                 |
/// |-------------|-------------|---------------------------------------|
/// | `namespace` | `ERR`, `DB` | subsystem name, independent code space |
/// | `code`      | `10001`     | non-zero, unique within the namespace |
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorKey {
    namespace: Arc<str>,
    code: u64,
}

impl ErrorKey {
    /// Construct a new key.
    ///
    /// ```
    /// use errtpl::ErrorKey;
    /// let key = ErrorKey::new("DB", 42);
    /// assert_eq!(key.to_string(), "DB#42");
    /// ```
    pub fn new(namespace: impl Into<Arc<str>>, code: u64) -> Self {
        Self { namespace: namespace.into(), code }
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn code(&self) -> u64 {
        self.code
    }

    /// True if `(namespace, code)` names this key.
    #[inline]
    pub fn is(&self, namespace: &str, code: u64) -> bool {
        self.code == code && &*self.namespace == namespace
    }

    pub(crate) fn namespace_arc(&self) -> &Arc<str> {
        &self.namespace
    }
}

impl core::fmt::Debug for ErrorKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.namespace, self.code)
    }
}

impl core::fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}", self.namespace, self.code)
    }
}
