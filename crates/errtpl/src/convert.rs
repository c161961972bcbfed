use crate::context::Params;
use crate::error::ErrorValue;
use crate::handle::TemplateHandle;

// ── ResultExt: template annotation on Results ─────────────────────

/// Extension trait turning any `Result` into a templated one.
///
/// The foreign error's text is appended as a note and the error itself is
/// kept as the [`source`](std::error::Error::source).
///
/// ```
/// use errtpl::{params, Registry, ResultExt};
///
/// let registry = Registry::new();
/// let bad_port = registry.declare(20, "invalid port {{.port}}").unwrap();
///
/// let err = "http"
///     .parse::<u16>()
///     .or_template_with(&bad_port, params! { "port" => "http" })
///     .unwrap_err();
///
/// assert!(bad_port.is_equal(&err));
/// assert_eq!(err.message(), "invalid port http");
/// assert_eq!(err.extra_errors(), ["invalid digit found in string"]);
/// ```
pub trait ResultExt<T> {
    /// Replace the error with a value from `handle`.
    fn or_template(self, handle: &TemplateHandle) -> crate::Result<T>;

    /// Replace the error with a value from `handle` rendered with `params`.
    fn or_template_with(self, handle: &TemplateHandle, params: Params) -> crate::Result<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[track_caller]
    fn or_template(self, handle: &TemplateHandle) -> crate::Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(wrap(handle.error(), e)),
        }
    }

    #[track_caller]
    fn or_template_with(self, handle: &TemplateHandle, params: Params) -> crate::Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(wrap(handle.error_with(params), e)),
        }
    }
}

fn wrap<E>(value: ErrorValue, cause: E) -> ErrorValue
where
    E: std::error::Error + Send + Sync + 'static,
{
    let note = cause.to_string();
    value.append(note).with_source(cause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;
    use std::error::Error;
    use std::io;

    fn failing() -> Result<(), io::Error> {
        Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
    }

    #[test]
    fn ok_passes_through() {
        let registry = Registry::new();
        let h = registry.declare(1, "unused").unwrap();
        let v: Result<u8, io::Error> = Ok(3);
        assert_eq!(v.or_template(&h).unwrap(), 3);
    }

    #[test]
    fn error_is_wrapped() {
        let registry = Registry::new();
        let h = registry.declare(2, "reading config failed").unwrap();
        let err = failing().or_template(&h).unwrap_err();

        assert!(h.is_equal(&err));
        assert_eq!(err.to_string(), "ERR#2: reading config failed, error: missing.");
        assert_eq!(err.source().unwrap().to_string(), "missing");
    }

    #[test]
    fn question_mark_conversion() {
        let registry = Registry::new();
        let h = registry.declare(3, "loading {{.path}}").unwrap();

        fn load(h: &TemplateHandle) -> crate::Result<()> {
            failing().or_template_with(h, crate::params! { "path" => "/etc/app" })?;
            Ok(())
        }
        let err = load(&h).unwrap_err();
        assert_eq!(err.message(), "loading /etc/app");
        assert_eq!(err.context().get("path"), Some(&serde_json::json!("/etc/app")));
    }

    #[test]
    fn call_site_is_the_caller() {
        let registry = Registry::new();
        let h = registry.declare(4, "x").unwrap();
        let (err, line) = (failing().or_template(&h).unwrap_err(), line!());
        assert!(err.stack_trace().contains(&format!("{}:{}:", file!(), line)), "got: {}", err.stack_trace());
    }
}
