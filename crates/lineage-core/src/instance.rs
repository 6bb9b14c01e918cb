//! Instances and the method-call context
//!
//! An [`Instance`] is per-object state keyed by its class: a field table
//! plus the class handle. Method dispatch resolves the member (instance
//! fields shadow prototype members), then runs it inside a [`CallContext`]
//! that carries the receiver and the superclass-call stack.

use crate::class::{ClassHandle, CONSTRUCTOR_MEMBER};
use crate::error::{ModelError, ModelResult};
use crate::value::{MemberMap, SuperBinding, Value};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

struct InstanceData {
    class: ClassHandle,
    fields: MemberMap,
}

/// An instance of a built class. Cheap to clone; identity equality.
#[derive(Clone)]
pub struct Instance(Arc<RwLock<InstanceData>>);

impl Instance {
    pub(crate) fn new(class: ClassHandle) -> Self {
        Instance(Arc::new(RwLock::new(InstanceData {
            class,
            fields: MemberMap::default(),
        })))
    }

    /// The run-time class of this instance
    pub fn class(&self) -> ClassHandle {
        self.0.read().class.clone()
    }

    /// Read a field, falling back to the class's member set (through the
    /// prototype chain) when the instance has no own field of that name.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.0.read().fields.get(name) {
            return Some(value.clone());
        }
        self.class().lookup_member(name)
    }

    /// Write an own field
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.write().fields.insert(name.into(), value);
    }

    /// Whether the instance has an own field of that name
    pub fn has_own(&self, name: &str) -> bool {
        self.0.read().fields.contains_key(name)
    }

    /// Invoke a member as a method with this instance as the receiver
    pub fn call(&self, name: &str, args: &[Value]) -> ModelResult<Value> {
        let mut ctx = CallContext::new(Receiver::Instance(self.clone()));
        ctx.call(name, args)
    }

    /// Extend this instance's own members in place, overwriting same-named
    /// fields. A raw patch: no superclass-call wrapping is performed.
    pub fn apply_override<I>(&self, members: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut data = self.0.write();
        for (name, value) in members {
            data.fields.insert(name, value);
        }
    }

    /// Whether this instance's class (or an ancestor of it) carries `mixin`
    pub fn has_mixin(&self, mixin: &ClassHandle) -> bool {
        self.class().has_mixin(mixin)
    }

    /// Whether this instance is an instance of `class` in the sense of
    /// [`crate::is_instance_of`]: exact class, ancestor, or carried mixin.
    pub fn is_instance_of(&self, class: &ClassHandle) -> bool {
        let runtime_class = self.class();
        runtime_class.is_subclass_of(class) || runtime_class.has_mixin(class)
    }

    /// The immediate superclass of this instance's class
    pub fn superclass(&self) -> Option<ClassHandle> {
        self.class().superclass()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class().diagnostic_name())
            .finish()
    }
}

/// What a method was invoked on
#[derive(Clone, Debug)]
pub enum Receiver {
    /// An ordinary instance method call
    Instance(Instance),
    /// A static call (including the class-creation hook)
    Class(ClassHandle),
}

/// Per-invocation context handed to every method body.
///
/// Carries the receiver and the stack of superclass-call bindings. Each
/// chained method pushes its binding on entry and pops it on exit, so
/// [`CallContext::call_super`] always resolves against the superclass of
/// the class that defined the currently executing method, across any depth
/// of nesting or reentrancy.
pub struct CallContext {
    receiver: Receiver,
    supers: Vec<SuperBinding>,
}

impl CallContext {
    pub(crate) fn new(receiver: Receiver) -> Self {
        CallContext {
            receiver,
            supers: Vec::new(),
        }
    }

    /// The receiver of the current call
    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// The receiver as an instance, or a type-mismatch error for a static
    /// call
    pub fn this(&self) -> ModelResult<Instance> {
        match &self.receiver {
            Receiver::Instance(instance) => Ok(instance.clone()),
            Receiver::Class(_) => Err(ModelError::TypeMismatch {
                expected: "instance receiver".to_string(),
                got: "class receiver".to_string(),
            }),
        }
    }

    /// The class of the receiver: the instance's run-time class, or the
    /// class itself for a static call
    pub fn class(&self) -> ClassHandle {
        match &self.receiver {
            Receiver::Instance(instance) => instance.class(),
            Receiver::Class(class) => class.clone(),
        }
    }

    /// Resolve a name on the receiver: instance fields, then the class's
    /// member set; statics for a class receiver.
    pub fn get(&self, name: &str) -> Option<Value> {
        match &self.receiver {
            Receiver::Instance(instance) => instance.get(name),
            Receiver::Class(class) => class.static_member(name),
        }
    }

    /// Write an own field on the instance receiver
    pub fn set(&self, name: impl Into<String>, value: Value) -> ModelResult<()> {
        let instance = self.this()?;
        instance.set(name, value);
        Ok(())
    }

    /// Invoke a member as a method on the current receiver, sharing this
    /// context (and therefore the superclass-call stack) with the callee.
    pub fn call(&mut self, name: &str, args: &[Value]) -> ModelResult<Value> {
        match self.get(name) {
            Some(Value::Method(method)) => method.invoke(self, args),
            Some(Value::Abstract) => Err(ModelError::NotImplemented {
                member: name.to_string(),
            }),
            Some(_) => Err(ModelError::NotCallable {
                member: name.to_string(),
            }),
            None => Err(ModelError::MissingMember {
                class: self.class().diagnostic_name(),
                member: name.to_string(),
            }),
        }
    }

    /// Invoke the superclass implementation of the currently executing
    /// chained method, with the same receiver.
    ///
    /// The target is resolved dynamically on the superclass recorded at
    /// build time: the constructor slot for constructor chaining, the
    /// member set otherwise. Fails with `NoSuperBinding` outside a chained
    /// method and with `NotImplemented` when the superclass member is still
    /// the abstract sentinel.
    pub fn call_super(&mut self, args: &[Value]) -> ModelResult<Value> {
        let binding = self.supers.last().cloned().ok_or(ModelError::NoSuperBinding)?;

        let target = if binding.name == CONSTRUCTOR_MEMBER {
            Some(Value::Method(binding.superclass.constructor()))
        } else {
            binding.superclass.lookup_member(&binding.name)
        };

        match target {
            Some(Value::Method(method)) => method.invoke(self, args),
            Some(Value::Abstract) => Err(ModelError::NotImplemented {
                member: binding.name,
            }),
            Some(_) => Err(ModelError::NotCallable {
                member: binding.name,
            }),
            None => Err(ModelError::MissingMember {
                class: binding.superclass.diagnostic_name(),
                member: binding.name,
            }),
        }
    }

    pub(crate) fn push_super(&mut self, binding: SuperBinding) {
        self.supers.push(binding);
    }

    pub(crate) fn pop_super(&mut self) {
        self.supers.pop();
    }
}
