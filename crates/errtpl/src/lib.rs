//! # errtpl: Error Templates
//!
//! Error messages declared once as templates with a stable
//! `(namespace, code)` identity, instantiated at each failure site with
//! named parameters.
//!
//! ## Design
//!
//! - A [`Registry`] owns the declared templates and an optional table of
//!   override templates loaded from a text file. Overrides change the
//!   wording (and display alias) of an error, never its identity.
//!
//! - [`Registry::declare`] returns a [`TemplateHandle`]. Call
//!   `handle.error_with(params)` where the failure happens to get an
//!   [`ErrorValue`]: a fresh instance id, the rendered message, the call
//!   site and the parameters.
//!
//! - Matching is by identity only: [`TemplateHandle::is_equal`] compares
//!   `(namespace, code)`, never the text.
//!
//! - A template that fails to parse or execute still yields an
//!   [`ErrorValue`], under the reserved `ERRCODE` namespace (see
//!   [`codes`]). Instantiation never panics.
//!
//! ## Quick Start
//!
//! ```rust
//! use errtpl::{params, Registry};
//!
//! let registry = Registry::new();
//! let not_found = registry.declare(10001, "user {{.user}} not found").unwrap();
//! let db_down = registry
//!     .declare_namespaced("DB", 1, "connection to {{.host}} lost")
//!     .unwrap();
//!
//! fn lookup(user: &str, h: &errtpl::TemplateHandle) -> errtpl::Result<u32> {
//!     errtpl::bail!(h, params! { "user" => user })
//! }
//!
//! let err = lookup("ada", &not_found).unwrap_err();
//! assert_eq!(err.to_string(), "ERR#10001: user ada not found");
//! assert!(not_found.is_equal(&err));
//! assert!(!db_down.is_equal(&err));
//!
//! // Missing parameters render as a sentinel.
//! assert_eq!(db_down.error().message(), "connection to [NO_VALUE] lost");
//! ```
//!
//! ## Overrides
//!
//! ```text
//! # [NAMESPACE|]CODE=[ALIAS|]TEMPLATE
//! 10001=no account named {{.user}}
//! DB|1=Database|lost connection to {{.host}}
//! ```
//!
//! Load with [`Registry::load_overrides`]. Rendering picks the override
//! while [`Registry::use_overrides`] is on (the default; see
//! [`RegistryConfig`]).
//!
//! ## Logging
//!
//! Events go through `tracing`: declarations at `trace`, override lines at
//! `debug`, completed loads at `info`, render failures at `warn`.

mod key;
mod id;
mod context;
mod error;
mod handle;
mod registry;
#[macro_use]
mod macros;
mod convert;

pub mod codes;
pub mod config;
pub mod load;
pub mod stack;
pub mod template;

// ── Public API ────────────────────────────────────────────────────

pub use key::ErrorKey;
pub use id::{IdError, InstanceId};
pub use context::{merge_params, to_param, ErrorContext, Params};
pub use error::{is_error_value, ErrorValue};
pub use handle::TemplateHandle;
pub use registry::{DeclareError, Registry, TemplateDefinition};
pub use load::{LoadError, SyntaxError};
pub use config::RegistryConfig;
pub use stack::{CaptureMode, StackCapture};
pub use convert::ResultExt;
pub use template::TemplateError;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, ErrorValue>;
