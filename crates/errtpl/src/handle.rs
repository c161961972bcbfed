use std::error::Error;
use std::sync::Arc;

use tracing::warn;

use crate::codes::{self, RESERVED_NAMESPACE};
use crate::context::{merge_params, ErrorContext, Params};
use crate::error::ErrorValue;
use crate::id::InstanceId;
use crate::registry::{Registry, TemplateDefinition};
use crate::stack;
use crate::template::TemplateError;
use crate::ErrorKey;

/// A declared error template.
///
/// Obtained once from [`Registry::declare`]; call one of the `error*`
/// methods at each failure site. Cloning is cheap.
#[derive(Clone)]
pub struct TemplateHandle {
    registry: Registry,
    definition: Arc<TemplateDefinition>,
}

impl TemplateHandle {
    pub(crate) fn new(registry: Registry, definition: Arc<TemplateDefinition>) -> Self {
        Self { registry, definition }
    }

    /// The declared identity.
    #[inline]
    pub fn key(&self) -> &ErrorKey {
        self.definition.key()
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        self.definition.namespace()
    }

    #[inline]
    pub fn code(&self) -> u64 {
        self.definition.code()
    }

    /// The declared template text. Overrides are not reflected here.
    #[inline]
    pub fn template(&self) -> &str {
        self.definition.template()
    }

    /// Create an error value with no parameters.
    #[track_caller]
    pub fn error(&self) -> ErrorValue {
        self.instantiate(Params::new())
    }

    /// Create an error value from one parameter map.
    #[track_caller]
    pub fn error_with(&self, params: Params) -> ErrorValue {
        self.instantiate(params)
    }

    /// Create an error value from several parameter maps, merged left to
    /// right (see [`merge_params`]).
    #[track_caller]
    pub fn error_merged<I>(&self, params: I) -> ErrorValue
    where
        I: IntoIterator<Item = Params>,
    {
        self.instantiate(merge_params(params))
    }

    /// True if `err` is an [`ErrorValue`] with this template's identity.
    ///
    /// Compares `(namespace, code)` only; the message is irrelevant.
    pub fn is_equal(&self, err: &(dyn Error + 'static)) -> bool {
        err.downcast_ref::<ErrorValue>()
            .is_some_and(|value| value.key() == self.key())
    }

    #[track_caller]
    fn instantiate(&self, params: Params) -> ErrorValue {
        let active = self.registry.active(&self.definition);
        let stack = stack::capture(self.registry.capture_mode(), self.registry.stack_depth());
        let id = InstanceId::generate();

        match active.render(&params, self.registry.sentinel()) {
            Ok(message) => ErrorValue::new(
                id,
                active.key().clone(),
                Arc::clone(active.alias_arc()),
                message,
                stack,
                ErrorContext::new(params),
            ),
            Err(e) => {
                warn!(key = %active.key(), %id, error = %e, "error template failed to render");
                let (key, message) = fallback(&active, &e);
                ErrorValue::new(
                    id,
                    key,
                    Arc::from(RESERVED_NAMESPACE),
                    message,
                    stack,
                    ErrorContext::new(params),
                )
            }
        }
    }
}

/// Identity and message for a template that could not be rendered.
fn fallback(definition: &TemplateDefinition, e: &TemplateError) -> (ErrorKey, String) {
    let (key, stage) = if e.is_parse() {
        (codes::template_parse_error(), "parse")
    } else {
        (codes::template_exec_error(), "execute")
    };
    let message = format!(
        "{} template failed, namespace: {}, code: {}, error: {}",
        stage,
        definition.alias(),
        definition.code(),
        e
    );
    (key, message)
}

impl core::fmt::Debug for TemplateHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TemplateHandle")
            .field("key", self.key())
            .field("template", &self.template())
            .finish()
    }
}

impl core::fmt::Display for TemplateHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.key())
    }
}
