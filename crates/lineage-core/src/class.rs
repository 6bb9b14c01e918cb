//! Class handles, the prototype chain, and inheritance queries
//!
//! A built class is an immutable [`ClassData`] behind an `Arc`; the
//! [`ClassHandle`] wrapper is the cheap, shareable reference the rest of the
//! crate (and user code) passes around. Member resolution walks the `parent`
//! back-references up to the universal root, so subclasses delegate to their
//! superclass without ever copying or aliasing its member table, so
//! mutating one class's own members can never affect a sibling or an
//! ancestor.
//!
//! The only state that changes after construction is the own member table
//! (through the raw `override` patch operation) and the lazily populated
//! mixin-membership cache.

use crate::builder;
use crate::def::ClassDef;
use crate::error::{ModelError, ModelResult};
use crate::instance::{CallContext, Instance, Receiver};
use crate::value::{MemberMap, Method, Value};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Distinguished member name for constructor chaining
pub(crate) const CONSTRUCTOR_MEMBER: &str = "constructor";

/// Placeholder used in diagnostics for classes without a display name
pub(crate) const ANONYMOUS: &str = "<anonymous>";

/// Global counter for lazily assigned mixin identities
static NEXT_MIXIN_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity assigned to a class the first time it is queried as a
/// mixin. Used as the key of each class's mixin-membership cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixinId(u64);

impl MixinId {
    fn next() -> Self {
        MixinId(NEXT_MIXIN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Built class state. Reachable only through a [`ClassHandle`].
pub(crate) struct ClassData {
    /// Optional human-readable name, used only in diagnostics
    pub(crate) display_name: Option<String>,
    /// Immutable superclass back-reference; `None` only for the root
    pub(crate) parent: Option<ClassHandle>,
    /// Own prototype members (locked only for the raw `override` patch path)
    pub(crate) members: RwLock<MemberMap>,
    /// Constructor implementation (explicit or synthesized)
    pub(crate) ctor: Method,
    /// Own abstract-class declaration; never inherited
    pub(crate) is_abstract: bool,
    /// Own statics, including applied inherited statics
    pub(crate) statics: RwLock<MemberMap>,
    /// Merged inherited-statics snapshot propagated to future subclasses
    pub(crate) inherited_statics: Option<MemberMap>,
    /// Mixins directly declared on this class, in declaration order
    pub(crate) mixins: Vec<ClassHandle>,
    /// True when this class was produced by the builder
    pub(crate) built: bool,
    /// Lazily assigned mixin identity
    pub(crate) mixin_id: OnceCell<MixinId>,
    /// Memoized "does self-or-ancestor carry this mixin" answers
    pub(crate) mixin_cache: Mutex<FxHashMap<MixinId, bool>>,
}

/// Reference to a built class
#[derive(Clone)]
pub struct ClassHandle(pub(crate) Arc<ClassData>);

/// The sentinel universal base class. Its constructor is a no-op and every
/// ancestor-chain walk terminates on it.
static UNIVERSAL_ROOT: Lazy<ClassHandle> = Lazy::new(|| {
    ClassHandle(Arc::new(ClassData {
        display_name: None,
        parent: None,
        members: RwLock::new(MemberMap::default()),
        ctor: Method::new(|_ctx, _args| Ok(Value::Null)),
        is_abstract: false,
        statics: RwLock::new(MemberMap::default()),
        inherited_statics: None,
        mixins: Vec::new(),
        built: false,
        mixin_id: OnceCell::new(),
        mixin_cache: Mutex::new(FxHashMap::default()),
    }))
});

/// The universal root class that `create` extends from
pub fn universal_root() -> ClassHandle {
    UNIVERSAL_ROOT.clone()
}

impl ClassHandle {
    /// Wrap an externally defined constructor as a class usable as an ad hoc
    /// superclass or mixin. The result carries no builder metadata: no
    /// mixins of its own, no inherited-statics snapshot, no wrapping of its
    /// members. Ancestor walks and mixin queries handle it like any other
    /// class and terminate correctly at the root.
    pub fn foreign(
        name: Option<&str>,
        parent: Option<ClassHandle>,
        ctor: Method,
        members: MemberMap,
    ) -> ClassHandle {
        ClassHandle(Arc::new(ClassData {
            display_name: name.map(str::to_owned),
            parent,
            members: RwLock::new(members),
            ctor,
            is_abstract: false,
            statics: RwLock::new(MemberMap::default()),
            inherited_statics: None,
            mixins: Vec::new(),
            built: false,
            mixin_id: OnceCell::new(),
            mixin_cache: Mutex::new(FxHashMap::default()),
        }))
    }

    /// The class's display name, if one was given at build time
    pub fn display_name(&self) -> Option<&str> {
        self.0.display_name.as_deref()
    }

    /// Display name or a placeholder, for error messages
    pub(crate) fn diagnostic_name(&self) -> String {
        self.0
            .display_name
            .clone()
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }

    /// The immediate superclass, or `None` for the universal root
    pub fn superclass(&self) -> Option<ClassHandle> {
        self.0.parent.clone()
    }

    /// Whether this is the universal root class
    pub fn is_root(&self) -> bool {
        *self == *UNIVERSAL_ROOT
    }

    /// Whether this class was produced by the builder (as opposed to a
    /// foreign constructor wrapped with [`ClassHandle::foreign`])
    pub fn is_built(&self) -> bool {
        self.0.built
    }

    /// Whether this exact class was declared abstract. The flag is never
    /// inherited: each subclass must redeclare it to stay abstract.
    pub fn is_abstract(&self) -> bool {
        self.0.is_abstract
    }

    /// Mixins directly declared on this class, in declaration order
    pub fn mixins(&self) -> Vec<ClassHandle> {
        self.0.mixins.clone()
    }

    pub(crate) fn constructor(&self) -> Method {
        self.0.ctor.clone()
    }

    pub(crate) fn inherited_statics_snapshot(&self) -> Option<MemberMap> {
        self.0.inherited_statics.clone()
    }

    /// Resolve a member through the prototype chain: own members first, then
    /// each ancestor's, terminating at the root.
    pub fn lookup_member(&self, name: &str) -> Option<Value> {
        let mut current = Some(self.clone());
        while let Some(class) = current {
            if let Some(value) = class.0.members.read().get(name) {
                return Some(value.clone());
            }
            current = class.0.parent.clone();
        }
        None
    }

    /// A member defined directly on this class, ignoring the chain
    pub fn own_member(&self, name: &str) -> Option<Value> {
        self.0.members.read().get(name).cloned()
    }

    /// Collect every member name visible on this class, including inherited
    /// ones, into `names`.
    pub(crate) fn collect_member_names(&self, names: &mut Vec<String>) {
        let mut current = Some(self.clone());
        while let Some(class) = current {
            for name in class.0.members.read().keys() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
            current = class.0.parent.clone();
        }
    }

    /// The fully resolved member table: every visible member with the
    /// nearest definition winning. Used when this class is applied as a
    /// mixin, so a mixin contributes its inherited members too.
    pub(crate) fn flattened_members(&self) -> MemberMap {
        let mut out = MemberMap::default();
        let mut current = Some(self.clone());
        while let Some(class) = current {
            for (name, value) in class.0.members.read().iter() {
                out.entry(name.clone()).or_insert_with(|| value.clone());
            }
            current = class.0.parent.clone();
        }
        out
    }

    /// A static member of this exact class. Ordinary statics never
    /// propagate; inherited statics were already applied at build time.
    pub fn static_member(&self, name: &str) -> Option<Value> {
        self.0.statics.read().get(name).cloned()
    }

    /// Invoke a static method with this class as the receiver
    pub fn call_static(&self, name: &str, args: &[Value]) -> ModelResult<Value> {
        match self.static_member(name) {
            Some(Value::Method(method)) => {
                let mut ctx = CallContext::new(Receiver::Class(self.clone()));
                method.invoke(&mut ctx, args)
            }
            Some(Value::Abstract) => Err(ModelError::NotImplemented {
                member: name.to_string(),
            }),
            Some(_) => Err(ModelError::NotCallable {
                member: name.to_string(),
            }),
            None => Err(ModelError::MissingMember {
                class: self.diagnostic_name(),
                member: name.to_string(),
            }),
        }
    }

    /// Construct an instance of this class.
    ///
    /// Fails with `AbstractInstantiation` when this exact class (not an
    /// ancestor) is declared abstract, before the constructor implementation
    /// runs. If the constructor returns an object value, that substitute is
    /// honored instead of the freshly allocated instance.
    pub fn instantiate(&self, args: &[Value]) -> ModelResult<Instance> {
        if self.0.is_abstract {
            return Err(ModelError::AbstractInstantiation {
                class: self.diagnostic_name(),
            });
        }

        let instance = Instance::new(self.clone());
        let mut ctx = CallContext::new(Receiver::Instance(instance.clone()));
        match self.0.ctor.invoke(&mut ctx, args)? {
            Value::Object(substitute) => Ok(substitute),
            _ => Ok(instance),
        }
    }

    /// Produce a subclass of this class
    pub fn extend(&self, definition: ClassDef) -> ModelResult<ClassHandle> {
        builder::build(None, self, definition)
    }

    /// Produce a named subclass of this class
    pub fn extend_named(&self, name: &str, definition: ClassDef) -> ModelResult<ClassHandle> {
        builder::build(Some(name), self, definition)
    }

    /// Patch members directly onto this class's own member table,
    /// overwriting same-named members. A raw operation: no superclass-call
    /// wrapping, no statics or mixin processing.
    pub fn apply_override<I>(&self, members: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut own = self.0.members.write();
        for (name, value) in members {
            own.insert(name, value);
        }
    }

    /// This class's lazily assigned mixin identity
    pub(crate) fn mixin_identity(&self) -> MixinId {
        *self.0.mixin_id.get_or_init(MixinId::next)
    }

    /// True when `mixin` appears in this class's own mixin list or in any
    /// ancestor's. Answers are memoized per class, keyed by the mixin's
    /// identity; the cache is never invalidated because classes are
    /// immutable once built.
    pub fn has_mixin(&self, mixin: &ClassHandle) -> bool {
        let id = mixin.mixin_identity();
        if let Some(&cached) = self.0.mixin_cache.lock().get(&id) {
            return cached;
        }

        let mut found = self.0.mixins.iter().any(|m| m == mixin);
        if !found {
            if let Some(parent) = &self.0.parent {
                found = parent.has_mixin(mixin);
            }
        }

        self.0.mixin_cache.lock().insert(id, found);
        found
    }

    /// True when `self` and `other` are the same class, or `other` appears
    /// on `self`'s ancestor chain.
    pub fn is_subclass_of(&self, other: &ClassHandle) -> bool {
        let mut current = Some(self.clone());
        while let Some(class) = current {
            if class == *other {
                return true;
            }
            current = class.0.parent.clone();
        }
        false
    }
}

impl PartialEq for ClassHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ClassHandle {}

impl fmt::Debug for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassHandle")
            .field("name", &self.diagnostic_name())
            .field("abstract", &self.0.is_abstract)
            .finish()
    }
}

/// True when `value` is an object whose run-time class is `class` or a
/// descendant of it, or when `class` is a mixin carried by the object's
/// class. Anything that is not an object value is `false`.
pub fn is_instance_of(value: &Value, class: &ClassHandle) -> bool {
    match value {
        Value::Object(instance) => {
            let runtime_class = instance.class();
            runtime_class.is_subclass_of(class) || runtime_class.has_mixin(class)
        }
        _ => false,
    }
}

/// Value-level subclass query: `false` (never an error) when either input
/// is not a class value.
pub fn is_subclass_of(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Class(a), Value::Class(b)) => a.is_subclass_of(b),
        _ => false,
    }
}
