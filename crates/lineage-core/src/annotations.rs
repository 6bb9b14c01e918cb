//! Method annotations
//!
//! Two inert markers consumed by external tooling: `override` flags a
//! method as intentionally overriding a superclass member, `final` flags it
//! as not meant to be overridden further. The builder records both and
//! enforces neither.

use crate::error::{ModelError, ModelResult};
use crate::value::Method;

/// Annotation name for intentional overrides
pub const OVERRIDE: &str = "override";

/// Annotation name for methods not meant to be overridden
pub const FINAL: &str = "final";

/// Tag a method with a named annotation. Unrecognized names fail with
/// `UnknownAnnotation`.
pub fn annotate(method: Method, annotation: &str) -> ModelResult<Method> {
    match annotation {
        OVERRIDE => Ok(method.mark_override()),
        FINAL => Ok(method.mark_final()),
        other => Err(ModelError::UnknownAnnotation(other.to_string())),
    }
}

/// Tag a method as an intentional override
pub fn override_method(method: Method) -> Method {
    method.mark_override()
}

/// Tag a method as final. Metadata only: nothing prevents a subclass from
/// overriding it.
pub fn final_method(method: Method) -> Method {
    method.mark_final()
}
