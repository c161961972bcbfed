//! Template registry.
//!
//! # Architecture
//!
//! ```text
//! Registry::declare(ns, code, tpl)          Registry::load_overrides(path)
//!       │ write lock, once at startup              │ write lock, whole batch
//!       ▼                                          ▼
//! declared: ErrorKey → TemplateDefinition   overrides: ErrorKey → TemplateDefinition
//!       │                                          │
//!       └──────────────┐        ┌──────────────────┘
//!                      ▼        ▼
//!             TemplateHandle::error_with(params)
//!               read lock, override wins if enabled
//! ```
//!
//! The two tables never collide: declaring checks only `declared`, loading
//! checks only `overrides`. Definitions are shared as `Arc`s so a read
//! lock is held only for one hash lookup.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::codes::{self, DEFAULT_NAMESPACE};
use crate::config::RegistryConfig;
use crate::context::Params;
use crate::handle::TemplateHandle;
use crate::load::{self, LoadError, SyntaxError};
use crate::stack::CaptureMode;
use crate::template::{self, Template, TemplateError};
use crate::ErrorKey;

/// Why a template could not be declared.
///
/// Every variant is a programming error in the declaring code; startup
/// should stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    #[error("error code {0} already declared")]
    Duplicate(ErrorKey),
    #[error("error code must be greater than 0 (namespace {namespace})")]
    ZeroCode { namespace: String },
    #[error("namespace must not be empty")]
    EmptyNamespace,
    #[error("namespace {0} is reserved")]
    ReservedNamespace(String),
}

/// A declared or loaded template.
#[derive(Debug)]
pub struct TemplateDefinition {
    key: ErrorKey,
    alias: Arc<str>,
    source: String,
    compiled: Result<Template, TemplateError>,
}

impl TemplateDefinition {
    /// Build a definition, compiling its template. A template that does not
    /// compile is kept; every instantiation reports the parse error.
    pub fn new(key: ErrorKey, alias: impl Into<Arc<str>>, source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = template::compile(&source);
        Self { key, alias: alias.into(), source, compiled }
    }

    #[inline]
    pub fn key(&self) -> &ErrorKey {
        &self.key
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        self.key.namespace()
    }

    #[inline]
    pub fn code(&self) -> u64 {
        self.key.code()
    }

    /// Display name used in rendered output.
    #[inline]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The template text as written.
    #[inline]
    pub fn template(&self) -> &str {
        &self.source
    }

    /// Render with `params`, replacing missing values with `sentinel`.
    pub fn render(&self, params: &Params, sentinel: &str) -> Result<String, TemplateError> {
        match &self.compiled {
            Ok(compiled) => compiled.render(params, sentinel),
            Err(e) => Err(e.clone()),
        }
    }

    pub(crate) fn alias_arc(&self) -> &Arc<str> {
        &self.alias
    }
}

struct Inner {
    declared: RwLock<HashMap<ErrorKey, Arc<TemplateDefinition>>>,
    overrides: RwLock<HashMap<ErrorKey, Arc<TemplateDefinition>>>,
    use_overrides: AtomicBool,
    capture: CaptureMode,
    stack_depth: usize,
    sentinel: String,
}

/// The table of error templates.
///
/// Create one at startup, declare templates on it, optionally load
/// overrides, then hand it (or the handles) to the rest of the program.
/// Cloning is cheap and shares the tables.
///
/// ```
/// use errtpl::{params, Registry};
///
/// let registry = Registry::new();
/// let not_found = registry.declare(10001, "file {{.path}} not found").unwrap();
///
/// let err = not_found.error_with(params! { "path" => "/etc/app.toml" });
/// assert!(err.to_string().contains("/etc/app.toml"));
/// assert!(not_found.is_equal(&err));
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::build(RegistryConfig::default())
    }
}

impl Registry {
    /// Create a registry with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a validated configuration.
    pub fn with_config(config: RegistryConfig) -> Result<Self, &'static str> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                declared: RwLock::new(HashMap::new()),
                overrides: RwLock::new(HashMap::new()),
                use_overrides: AtomicBool::new(config.use_overrides),
                capture: config.capture,
                stack_depth: config.stack_depth,
                sentinel: config.sentinel,
            }),
        }
    }

    // ── Declaration ───────────────────────────────────────────────

    /// Declare a template in the default namespace.
    pub fn declare(&self, code: u64, template: impl Into<String>) -> Result<TemplateHandle, DeclareError> {
        self.declare_namespaced(DEFAULT_NAMESPACE, code, template)
    }

    /// Declare a template in `namespace`.
    ///
    /// Fails if `(namespace, code)` was declared before on this registry,
    /// if `code` is zero, or if `namespace` is empty or reserved.
    pub fn declare_namespaced(
        &self,
        namespace: &str,
        code: u64,
        template: impl Into<String>,
    ) -> Result<TemplateHandle, DeclareError> {
        if namespace.is_empty() {
            return Err(DeclareError::EmptyNamespace);
        }
        if codes::is_reserved(namespace) {
            return Err(DeclareError::ReservedNamespace(namespace.to_string()));
        }
        if code == 0 {
            return Err(DeclareError::ZeroCode { namespace: namespace.to_string() });
        }

        let key = ErrorKey::new(namespace, code);
        let mut declared = self.inner.declared.write();
        if declared.contains_key(&key) {
            return Err(DeclareError::Duplicate(key));
        }
        let alias = Arc::clone(key.namespace_arc());
        let definition = Arc::new(TemplateDefinition::new(key.clone(), alias, template));
        if let Err(e) = &definition.compiled {
            debug!(%key, error = %e, "declared template does not compile");
        }
        declared.insert(key.clone(), Arc::clone(&definition));
        trace!(%key, "declared error template");

        Ok(TemplateHandle::new(self.clone(), definition))
    }

    // ── Overrides ─────────────────────────────────────────────────

    /// Load override templates from a file.
    ///
    /// Returns the number of definitions loaded. On a syntax error the
    /// definitions from earlier lines stay loaded.
    pub fn load_overrides(&self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let loaded = self.load_overrides_str(&text)?;
        info!(path = %path.display(), loaded, "loaded error template overrides");
        Ok(loaded)
    }

    /// Load override templates from text. See [`load`](crate::load) for the
    /// line format.
    pub fn load_overrides_str(&self, text: &str) -> Result<usize, LoadError> {
        let mut overrides = self.inner.overrides.write();
        let mut loaded = 0;

        for (line, parsed) in load::parse_source(text) {
            let parsed = parsed.map_err(|reason| LoadError::Syntax { line, reason })?;
            if codes::is_reserved(&parsed.namespace) {
                return Err(LoadError::Syntax {
                    line,
                    reason: SyntaxError::ReservedNamespace(parsed.namespace),
                });
            }
            let key = parsed.key();
            if overrides.contains_key(&key) {
                return Err(LoadError::Syntax { line, reason: SyntaxError::Duplicate(key) });
            }
            let definition = TemplateDefinition::new(key.clone(), parsed.alias, parsed.template);
            debug!(%key, line, alias = definition.alias(), "override template");
            overrides.insert(key, Arc::new(definition));
            loaded += 1;
        }
        Ok(loaded)
    }

    /// The loaded override for `(namespace, code)`, if any.
    pub fn resolve(&self, namespace: &str, code: u64) -> Option<Arc<TemplateDefinition>> {
        self.inner.overrides.read().get(&ErrorKey::new(namespace, code)).cloned()
    }

    /// The definition an instantiation of `declared` renders with.
    pub(crate) fn active(&self, declared: &Arc<TemplateDefinition>) -> Arc<TemplateDefinition> {
        if !self.use_overrides() {
            return Arc::clone(declared);
        }
        self.inner
            .overrides
            .read()
            .get(declared.key())
            .cloned()
            .unwrap_or_else(|| Arc::clone(declared))
    }

    // ── Settings ──────────────────────────────────────────────────

    pub fn use_overrides(&self) -> bool {
        self.inner.use_overrides.load(Ordering::Acquire)
    }

    /// Turn override rendering on or off for this registry.
    pub fn set_use_overrides(&self, enable: bool) {
        self.inner.use_overrides.store(enable, Ordering::Release);
    }

    pub fn capture_mode(&self) -> CaptureMode {
        self.inner.capture
    }

    /// Frames kept in each error's stack trace.
    pub fn stack_depth(&self) -> usize {
        self.inner.stack_depth
    }

    pub fn sentinel(&self) -> &str {
        &self.inner.sentinel
    }

    // ── Introspection ─────────────────────────────────────────────

    /// The declared definition for `(namespace, code)`.
    pub fn definition(&self, namespace: &str, code: u64) -> Option<Arc<TemplateDefinition>> {
        self.inner.declared.read().get(&ErrorKey::new(namespace, code)).cloned()
    }

    /// All declared definitions, sorted by key.
    pub fn declared(&self) -> Vec<Arc<TemplateDefinition>> {
        let mut all: Vec<_> = self.inner.declared.read().values().cloned().collect();
        all.sort_by(|a, b| a.key().cmp(b.key()));
        all
    }

    pub fn is_declared(&self, namespace: &str, code: u64) -> bool {
        self.inner.declared.read().contains_key(&ErrorKey::new(namespace, code))
    }

    pub fn override_count(&self) -> usize {
        self.inner.overrides.read().len()
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("declared", &self.inner.declared.read().len())
            .field("overrides", &self.override_count())
            .field("use_overrides", &self.use_overrides())
            .field("capture", &self.inner.capture)
            .field("stack_depth", &self.inner.stack_depth)
            .finish()
    }
}
