//! Member values and callable methods
//!
//! Everything that can appear as a class member is a [`Value`]. Plain data
//! variants carry their payload inline; callables are [`Method`]s holding a
//! reference-counted function. The abstract-member sentinel is its own
//! variant, so "is this member still abstract" is a tag check rather than a
//! comparison of function identities.

use crate::class::ClassHandle;
use crate::error::ModelResult;
use crate::instance::{CallContext, Instance};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Member-name-to-value table used for prototype members, statics, and fields
pub type MemberMap = FxHashMap<String, Value>;

/// Function type backing a [`Method`]
pub type MethodFn = Arc<dyn Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync>;

/// A value that can be stored as a class member, static, or instance field
#[derive(Clone)]
pub enum Value {
    /// Absent / no value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    Str(String),
    /// Callable member
    Method(Method),
    /// Abstract-member sentinel; invoking it fails with `NotImplemented`
    Abstract,
    /// A class embedded as a member value
    Class(ClassHandle),
    /// An instance value
    Object(Instance),
}

impl Value {
    /// Null value
    pub fn null() -> Self {
        Value::Null
    }

    /// Boolean value
    pub fn bool(v: bool) -> Self {
        Value::Bool(v)
    }

    /// Integer value
    pub fn int(v: i64) -> Self {
        Value::Int(v)
    }

    /// Float value
    pub fn float(v: f64) -> Self {
        Value::Float(v)
    }

    /// String value
    pub fn str(v: impl Into<String>) -> Self {
        Value::Str(v.into())
    }

    /// Wrap a plain function as a callable member
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        Value::Method(Method::new(f))
    }

    /// True for values that can be invoked as a method.
    ///
    /// The abstract sentinel counts as callable: invoking it is well-defined
    /// (it fails with `NotImplemented`), and a chained override may target it.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Method(_) | Value::Abstract)
    }

    /// Human-readable kind name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Method(_) => "method",
            Value::Abstract => "abstract",
            Value::Class(_) => "class",
            Value::Object(_) => "object",
        }
    }

    /// Borrow the method payload, if this is a callable member
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow the instance payload, if this is an object value
    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Borrow the class payload, if this is a class value
    pub fn as_class(&self) -> Option<&ClassHandle> {
        match self {
            Value::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Integer payload, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => a.same_fn(b),
            (Value::Abstract, Value::Abstract) => true,
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Int(v) => write!(f, "Int({v})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Str(v) => write!(f, "Str({v:?})"),
            Value::Method(m) => fmt::Debug::fmt(m, f),
            Value::Abstract => write!(f, "Abstract"),
            Value::Class(c) => write!(f, "Class({})", c.diagnostic_name()),
            Value::Object(o) => fmt::Debug::fmt(o, f),
        }
    }
}

/// Superclass-call target installed on a chained method by the builder.
///
/// Resolution is dynamic: the member is looked up on the superclass at call
/// time, so a later raw `override` patch on the superclass is observed.
#[derive(Clone)]
pub(crate) struct SuperBinding {
    pub(crate) superclass: ClassHandle,
    pub(crate) name: String,
}

/// A callable class member.
///
/// Whether a method chains to its superclass implementation is declared at
/// the binding site with [`Method::chained`]; the builder then installs the
/// superclass-call binding for it. There is no inspection of the method body.
#[derive(Clone)]
pub struct Method {
    imp: MethodFn,
    chains: bool,
    super_binding: Option<SuperBinding>,
    marked_override: bool,
    marked_final: bool,
}

impl Method {
    /// A plain method that never calls its superclass implementation
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        Method {
            imp: Arc::new(f),
            chains: false,
            super_binding: None,
            marked_override: false,
            marked_final: false,
        }
    }

    /// A method that calls its superclass implementation through
    /// [`CallContext::call_super`]. The builder verifies at build time that
    /// a superclass implementation actually exists.
    pub fn chained<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        Method {
            imp: Arc::new(f),
            chains: true,
            super_binding: None,
            marked_override: false,
            marked_final: false,
        }
    }

    /// Whether this method was declared as chaining to its superclass
    pub fn chains(&self) -> bool {
        self.chains
    }

    /// Whether the `override` annotation was applied
    pub fn is_marked_override(&self) -> bool {
        self.marked_override
    }

    /// Whether the `final` annotation was applied. Inert metadata: the
    /// builder records it but never enforces it.
    pub fn is_final(&self) -> bool {
        self.marked_final
    }

    /// Identity comparison of the underlying function
    pub fn same_fn(&self, other: &Method) -> bool {
        Arc::ptr_eq(&self.imp, &other.imp)
    }

    pub(crate) fn mark_override(mut self) -> Self {
        self.marked_override = true;
        self
    }

    pub(crate) fn mark_final(mut self) -> Self {
        self.marked_final = true;
        self
    }

    pub(crate) fn with_super_binding(mut self, superclass: ClassHandle, name: &str) -> Self {
        self.super_binding = Some(SuperBinding {
            superclass,
            name: name.to_string(),
        });
        self
    }

    pub(crate) fn has_super_binding(&self) -> bool {
        self.super_binding.is_some()
    }

    /// Invoke the method. A chained method pushes its superclass binding for
    /// the duration of the call and pops it afterwards, so nested and
    /// reentrant superclass calls resolve against the right level.
    pub(crate) fn invoke(&self, ctx: &mut CallContext, args: &[Value]) -> ModelResult<Value> {
        match &self.super_binding {
            Some(binding) => {
                ctx.push_super(binding.clone());
                let result = (self.imp)(ctx, args);
                ctx.pop_super();
                result
            }
            None => (self.imp)(ctx, args),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("chains", &self.chains)
            .field("bound", &self.super_binding.is_some())
            .finish()
    }
}
