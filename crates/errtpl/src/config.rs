//! Registry configuration
//!
//! Settings can be given in code with the builder methods or read from
//! the environment with [`RegistryConfig::from_env`]:
//!
//! - `ERRTPL_USE_OVERRIDES=0` - ignore loaded override templates
//! - `ERRTPL_CAPTURE=<mode>` - `off`, `caller` (default) or `full`
//! - `ERRTPL_STACK_DEPTH=<n>` - frames kept in an error's stack trace
//! - `ERRTPL_SENTINEL=<text>` - replacement for missing template values

use std::str::FromStr;

use crate::codes::DEFAULT_SENTINEL;
use crate::stack::{CaptureMode, DEFAULT_DEPTH};

pub const ENV_USE_OVERRIDES: &str = "ERRTPL_USE_OVERRIDES";
pub const ENV_CAPTURE: &str = "ERRTPL_CAPTURE";
pub const ENV_STACK_DEPTH: &str = "ERRTPL_STACK_DEPTH";
pub const ENV_SENTINEL: &str = "ERRTPL_SENTINEL";

/// Configuration for a [`Registry`](crate::Registry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Render with loaded override templates when present (default: true)
    pub use_overrides: bool,

    /// Call-site capture for new error values (default: caller only)
    pub capture: CaptureMode,

    /// Frames kept in an error's stack trace, the calling line included
    /// (default: 5)
    pub stack_depth: usize,

    /// Text substituted for missing template values (default: `[NO_VALUE]`)
    pub sentinel: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            use_overrides: true,
            capture: CaptureMode::default(),
            stack_depth: DEFAULT_DEPTH,
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `ERRTPL_*` variables, defaulting the rest
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            use_overrides: env_get_bool(ENV_USE_OVERRIDES, defaults.use_overrides),
            capture: env_get(ENV_CAPTURE, defaults.capture),
            stack_depth: env_get(ENV_STACK_DEPTH, defaults.stack_depth),
            sentinel: env_get_opt::<String>(ENV_SENTINEL)
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.sentinel),
        }
    }

    /// Enable or disable override templates
    pub fn use_overrides(mut self, enable: bool) -> Self {
        self.use_overrides = enable;
        self
    }

    /// Set call-site capture mode
    pub fn capture(mut self, mode: CaptureMode) -> Self {
        self.capture = mode;
        self
    }

    /// Set how many frames a stack trace keeps
    pub fn stack_depth(mut self, depth: usize) -> Self {
        self.stack_depth = depth;
        self
    }

    /// Set the missing-value sentinel
    pub fn sentinel(mut self, text: impl Into<String>) -> Self {
        self.sentinel = text.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.sentinel.is_empty() {
            return Err("sentinel must not be empty");
        }
        if self.stack_depth == 0 && self.capture != CaptureMode::Off {
            return Err("stack_depth must be > 0 unless capture is off");
        }
        Ok(())
    }
}

// ── Environment helpers ───────────────────────────────────────────

/// `key` parsed as `T`; `default` when unset or unparsable.
pub(crate) fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

pub(crate) fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// On/off switch. `0`, `false`, `no` and `off` turn it off, anything
/// else set turns it on; `default` when unset.
pub(crate) fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => !matches!(val.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RegistryConfig::default();
        assert!(config.use_overrides);
        assert_eq!(config.capture, CaptureMode::Caller);
        assert_eq!(config.sentinel, "[NO_VALUE]");
        assert_eq!(config.stack_depth, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder() {
        let config = RegistryConfig::new()
            .use_overrides(false)
            .capture(CaptureMode::Off)
            .stack_depth(2)
            .sentinel("<missing>");
        assert!(!config.use_overrides);
        assert_eq!(config.capture, CaptureMode::Off);
        assert_eq!(config.sentinel, "<missing>");
        assert_eq!(config.stack_depth, 2);
    }

    #[test]
    fn empty_sentinel_is_invalid() {
        assert!(RegistryConfig::new().sentinel("").validate().is_err());
    }

    #[test]
    fn zero_depth_needs_capture_off() {
        assert!(RegistryConfig::new().stack_depth(0).validate().is_err());
        let off = RegistryConfig::new().capture(CaptureMode::Off).stack_depth(0);
        assert!(off.validate().is_ok());
    }

    #[test]
    fn from_env_reads_all_settings() {
        std::env::set_var(ENV_USE_OVERRIDES, "off");
        std::env::set_var(ENV_CAPTURE, "full");
        std::env::set_var(ENV_SENTINEL, "??");
        std::env::set_var(ENV_STACK_DEPTH, "9");
        let config = RegistryConfig::from_env();
        std::env::set_var(ENV_SENTINEL, "");
        let empty_sentinel = RegistryConfig::from_env();
        std::env::remove_var(ENV_USE_OVERRIDES);
        std::env::remove_var(ENV_CAPTURE);
        std::env::remove_var(ENV_SENTINEL);
        std::env::remove_var(ENV_STACK_DEPTH);

        assert!(!config.use_overrides);
        assert_eq!(config.capture, CaptureMode::Full);
        assert_eq!(config.sentinel, "??");
        assert_eq!(config.stack_depth, 9);
        assert_eq!(empty_sentinel.sentinel, DEFAULT_SENTINEL);
    }

    #[test]
    fn env_get_default() {
        let val: usize = env_get("__ERRTPL_TEST_UNSET__", 42);
        assert_eq!(val, 42);
        assert!(env_get_bool("__ERRTPL_TEST_UNSET__", true));
        assert!(env_get_opt::<u8>("__ERRTPL_TEST_UNSET__").is_none());
    }

    #[test]
    fn env_get_invalid_parse() {
        std::env::set_var("__ERRTPL_TEST_INVALID__", "loud");
        let mode: CaptureMode = env_get("__ERRTPL_TEST_INVALID__", CaptureMode::Full);
        assert_eq!(mode, CaptureMode::Full);
        std::env::remove_var("__ERRTPL_TEST_INVALID__");
    }

    #[test]
    fn env_get_bool_variants() {
        for (val, expected) in [("1", true), ("on", true), ("anything", true), ("0", false), (" No ", false), ("OFF", false)] {
            std::env::set_var("__ERRTPL_TEST_BOOL__", val);
            assert_eq!(env_get_bool("__ERRTPL_TEST_BOOL__", !expected), expected, "value: {}", val);
        }
        std::env::remove_var("__ERRTPL_TEST_BOOL__");
    }
}
