//! Declarative class definitions
//!
//! [`ClassDef`] is the typed replacement for the original object-literal
//! definition: the reserved sections (constructor, statics, inherited
//! statics, mixins, abstract flag) are fields of their own instead of magic
//! member names, so they can never leak into the prototype member set.

use crate::class::ClassHandle;
use crate::error::ModelResult;
use crate::instance::CallContext;
use crate::value::{MemberMap, Method, Value};

/// A class definition: ordinary members plus the reserved sections consumed
/// by the builder. Assembled with chaining setters:
///
/// ```ignore
/// let animal = create_named(
///     "Animal",
///     ClassDef::new()
///         .constructor(|ctx, args| {
///             ctx.set("name", args.first().cloned().unwrap_or(Value::Null))?;
///             Ok(Value::Null)
///         })
///         .method("say_hi", |ctx, _| ctx.get("name").ok_or_else(|| ...)),
/// )?;
/// ```
#[derive(Default, Clone)]
pub struct ClassDef {
    pub(crate) members: MemberMap,
    pub(crate) constructor: Option<Method>,
    pub(crate) statics: MemberMap,
    pub(crate) inherited_statics: Option<MemberMap>,
    pub(crate) mixins: Vec<ClassHandle>,
    pub(crate) abstract_class: bool,
}

impl ClassDef {
    /// An empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ordinary member. Same-named later additions win.
    pub fn member(mut self, name: impl Into<String>, value: Value) -> Self {
        self.members.insert(name.into(), value);
        self
    }

    /// Add a plain method member
    pub fn method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.member(name, Value::Method(Method::new(f)))
    }

    /// Add a method member that chains to its superclass implementation
    /// through [`CallContext::call_super`]. The builder verifies the
    /// superclass actually provides a callable member of the same name.
    pub fn chained_method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.member(name, Value::Method(Method::chained(f)))
    }

    /// Add a pre-built method member (e.g. an annotated one)
    pub fn method_value(self, name: impl Into<String>, method: Method) -> Self {
        self.member(name, Value::Method(method))
    }

    /// Declare an abstract member: a required override point. A concrete
    /// class (own or derived) must replace it before it can be built.
    pub fn abstract_member(self, name: impl Into<String>) -> Self {
        self.member(name, Value::Abstract)
    }

    /// Supply an explicit constructor
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.constructor = Some(Method::new(f));
        self
    }

    /// Supply an explicit constructor that chains to the superclass
    /// constructor through [`CallContext::call_super`]
    pub fn chained_constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.constructor = Some(Method::chained(f));
        self
    }

    /// Add a static member, visible only on this exact class
    pub fn static_member(mut self, name: impl Into<String>, value: Value) -> Self {
        self.statics.insert(name.into(), value);
        self
    }

    /// Add a static method, visible only on this exact class
    pub fn static_method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.static_member(name, Value::Method(Method::new(f)))
    }

    /// Add an inherited static: applied to this class and propagated to
    /// every future subclass unless a descendant overrides it. Declaring
    /// any inherited static (even none beyond this call) starts the
    /// snapshot chain.
    pub fn inherited_static(mut self, name: impl Into<String>, value: Value) -> Self {
        self.inherited_statics
            .get_or_insert_with(MemberMap::default)
            .insert(name.into(), value);
        self
    }

    /// Add an inherited static method
    pub fn inherited_static_method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.inherited_static(name, Value::Method(Method::new(f)))
    }

    /// Declare a mixin. Declaration order matters: the class's own members
    /// always win, and later-declared mixins win ties over earlier ones.
    pub fn mixin(mut self, class: &ClassHandle) -> Self {
        self.mixins.push(class.clone());
        self
    }

    /// Mark this class abstract: it cannot be instantiated directly, and
    /// the abstract-member completeness check is skipped for it.
    pub fn abstract_class(mut self, flag: bool) -> Self {
        self.abstract_class = flag;
        self
    }
}
