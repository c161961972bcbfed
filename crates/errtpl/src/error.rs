use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::context::ErrorContext;
use crate::id::InstanceId;
use crate::stack::StackCapture;
use crate::ErrorKey;

/// One failure occurrence, rendered from a template.
///
/// Produced by [`TemplateHandle::error`](crate::TemplateHandle::error) and
/// friends. Everything is fixed at creation except the list of appended
/// notes; a later override load never changes a value that already exists.
///
/// ```
/// use errtpl::{params, Registry};
///
/// let registry = Registry::new();
/// let timeout = registry.declare(7, "request to {{.host}} timed out").unwrap();
///
/// let err = timeout
///     .error_with(params! { "host" => "db1" })
///     .append("retry 1 failed")
///     .append("retry 2 failed");
///
/// assert_eq!(
///     err.to_string(),
///     "ERR#7: request to db1 timed out, error: retry 1 failed; retry 2 failed."
/// );
/// ```
#[derive(Clone)]
pub struct ErrorValue {
    id: InstanceId,
    key: ErrorKey,
    alias: Arc<str>,
    message: String,
    stack: StackCapture,
    context: ErrorContext,
    extra: Vec<String>,
    source: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

// ── Constructors ──────────────────────────────────────────────────

impl ErrorValue {
    pub(crate) fn new(
        id: InstanceId,
        key: ErrorKey,
        alias: Arc<str>,
        message: String,
        stack: StackCapture,
        context: ErrorContext,
    ) -> Self {
        Self {
            id,
            key,
            alias,
            message,
            stack,
            context,
            extra: Vec::new(),
            source: None,
        }
    }

    /// Build a value from parts that are already known, for example when
    /// reading an error back from a log record. No template is involved and
    /// the alias equals the namespace.
    pub fn from_parts(
        id: InstanceId,
        key: ErrorKey,
        message: impl Into<String>,
        stack: StackCapture,
        context: ErrorContext,
    ) -> Self {
        let alias = Arc::clone(key.namespace_arc());
        Self::new(id, key, alias, message.into(), stack, context)
    }

    /// Append one note. Notes show up after the message in
    /// [`Display`](fmt::Display) output, in the order they were added.
    pub fn append(mut self, note: impl fmt::Display) -> Self {
        self.extra.push(note.to_string());
        self
    }

    /// Append several notes in order.
    pub fn append_all<I>(mut self, notes: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        self.extra.extend(notes.into_iter().map(|n| n.to_string()));
        self
    }

    /// In-place form of [`append`](Self::append).
    pub fn push_note(&mut self, note: impl fmt::Display) -> &mut Self {
        self.extra.push(note.to_string());
        self
    }

    /// Attach the error that caused this one. Returned by
    /// [`Error::source`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl ErrorValue {
    #[inline]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    #[inline]
    pub fn code(&self) -> u64 {
        self.key.code()
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        self.key.namespace()
    }

    /// The display name of the namespace. Differs from
    /// [`namespace`](Self::namespace) only when an override set an alias.
    #[inline]
    pub fn namespace_alias(&self) -> &str {
        &self.alias
    }

    #[inline]
    pub fn key(&self) -> &ErrorKey {
        &self.key
    }

    /// The rendered message, without appended notes.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The immediate call site, `at file:line:column`. Empty when capture
    /// is off.
    #[inline]
    pub fn stack_trace(&self) -> &str {
        &self.stack.current
    }

    /// The deeper backtrace, when one was captured.
    #[inline]
    pub fn deep_trace(&self) -> &str {
        &self.stack.context
    }

    /// The parameters the value was created with.
    #[inline]
    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    #[inline]
    pub fn extra_errors(&self) -> &[String] {
        &self.extra
    }

    /// Multi-line report for operator logs.
    ///
    /// ```text
    /// Id: ERR#10001:01J9Z3X5Q4K1V8M2N6P0R7S3T9-3FA91C2
    /// Error:
    /// ERR#10001: test error
    /// Context:
    /// {}
    /// StackTrace:
    /// at src/main.rs:12:15
    /// ```
    pub fn full_error(&self) -> String {
        let mut lines = vec![
            format!("Id: {}:{}", self.key, self.id),
            "Error:".to_string(),
            self.to_string(),
            "Context:".to_string(),
            self.context.to_string(),
            "StackTrace:".to_string(),
            self.stack.current.clone(),
        ];
        if !self.stack.context.is_empty() {
            lines.push(self.stack.context.clone());
        }
        lines.join("\n")
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl Error for ErrorValue {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

/// True if `err` is an [`ErrorValue`].
pub fn is_error_value(err: &(dyn Error + 'static)) -> bool {
    err.is::<ErrorValue>()
}

// ── Display ───────────────────────────────────────────────────────

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}: {}", self.alias, self.key.code(), self.message)?;
        if !self.extra.is_empty() {
            if self.message.trim().is_empty() {
                f.write_str("error: ")?;
            } else {
                f.write_str(", error: ")?;
            }
            write!(f, "{}.", self.extra.join("; "))?;
        }
        Ok(())
    }
}

// ── Debug ─────────────────────────────────────────────────────────

impl fmt::Debug for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorValue")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("alias", &self.alias)
            .field("message", &self.message)
            .field("stack", &self.stack.current)
            .field("context", &self.context)
            .field("extra", &self.extra)
            .field("source", &self.source)
            .finish()
    }
}

// ── Serialize ─────────────────────────────────────────────────────

impl Serialize for ErrorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ErrorValue", 7)?;
        s.serialize_field("id", &self.id.to_string())?;
        s.serialize_field("namespace", self.key.namespace())?;
        s.serialize_field("alias", &*self.alias)?;
        s.serialize_field("code", &self.key.code())?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field("context", &self.context)?;
        s.serialize_field("extra_errors", &self.extra)?;
        s.end()
    }
}

// ── Into<io::Error> ───────────────────────────────────────────────

impl From<ErrorValue> for io::Error {
    fn from(err: ErrorValue) -> Self {
        io::Error::other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params, Registry};

    fn sample() -> ErrorValue {
        ErrorValue::from_parts(
            InstanceId::generate(),
            ErrorKey::new("ERR", 10001),
            "test error",
            StackCapture { current: "at src/main.rs:1:1".into(), context: String::new() },
            ErrorContext::default(),
        )
    }

    #[test]
    fn display_without_notes() {
        assert_eq!(sample().to_string(), "ERR#10001: test error");
    }

    #[test]
    fn append_order() {
        let err = sample().append("x").append("y");
        assert_eq!(err.to_string(), "ERR#10001: test error, error: x; y.");
        assert_eq!(err.extra_errors(), ["x", "y"]);
        assert_eq!(err.message(), "test error");
    }

    #[test]
    fn append_to_blank_message() {
        let err = ErrorValue::from_parts(
            InstanceId::generate(),
            ErrorKey::new("ERR", 1),
            "  ",
            StackCapture::default(),
            ErrorContext::default(),
        )
        .append(404);
        assert_eq!(err.to_string(), "ERR#1:   error: 404.");
    }

    #[test]
    fn append_all_and_push_note() {
        let mut err = sample().append_all(["a", "b"]);
        err.push_note(3).push_note('c');
        assert_eq!(err.extra_errors(), ["a", "b", "3", "c"]);
    }

    #[test]
    fn append_keeps_identity() {
        let registry = Registry::new();
        let h = registry.declare(3, "base").unwrap();
        let err = h.error();
        let id = err.id();
        let err = err.append("note");
        assert_eq!(err.id(), id);
        assert!(h.is_equal(&err));
    }

    #[test]
    fn full_error_layout() {
        let registry = Registry::new();
        let h = registry.declare(10002, "test {{.param1}} error").unwrap();
        let err = h.error_with(params! { "param1" => "example" });
        let report = err.full_error();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], format!("Id: ERR#10002:{}", err.id()));
        assert_eq!(lines[1], "Error:");
        assert_eq!(lines[2], "ERR#10002: test example error");
        assert_eq!(lines[3], "Context:");
        assert_eq!(lines[4], r#"{"param1":"example"}"#);
        assert_eq!(lines[5], "StackTrace:");
        assert!(lines[6].starts_with("at "), "got: {}", lines[6]);
        assert!(lines[6].contains(file!()));
    }

    #[test]
    fn alias_used_for_display() {
        let registry = Registry::new();
        let h = registry.declare_namespaced("DB", 5, "x").unwrap();
        registry.load_overrides_str("DB|5=Database|connection lost").unwrap();
        let err = h.error();
        assert_eq!(err.to_string(), "Database#5: connection lost");
        assert!(err.full_error().starts_with("Id: DB#5:"));
    }

    #[test]
    fn source_chain() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = sample().with_source(io_err);
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "gone");
    }

    #[test]
    fn detects_error_values() {
        let err = sample();
        assert!(is_error_value(&err));
        let io_err = io::Error::new(io::ErrorKind::Other, "x");
        assert!(!is_error_value(&io_err));
    }

    #[test]
    fn into_io_error() {
        let io_err: io::Error = sample().into();
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
        let inner = io_err.into_inner().unwrap();
        assert!(is_error_value(inner.as_ref()));
    }

    #[test]
    fn serializes_to_json() {
        let err = sample().append("n");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["namespace"], "ERR");
        assert_eq!(json["alias"], "ERR");
        assert_eq!(json["code"], 10001);
        assert_eq!(json["message"], "test error");
        assert_eq!(json["context"], serde_json::json!({}));
        assert_eq!(json["extra_errors"], serde_json::json!(["n"]));
        assert_eq!(json["id"], err.id().to_string());
    }

    #[test]
    fn clones_share_nothing_mutable() {
        let a = sample();
        let b = a.clone().append("only on b");
        assert!(a.extra_errors().is_empty());
        assert_eq!(b.extra_errors().len(), 1);
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ErrorValue>();
    }
}
