//! The class-construction pipeline
//!
//! [`build`] turns a [`ClassDef`] plus a superclass into a finished
//! [`ClassHandle`] in a fixed sequence of passes: validate the member set,
//! bind superclass-calling methods, resolve the constructor, run the
//! abstract-member completeness check, merge statics and inherited statics,
//! apply mixins, fire the creation hook. Each pass feeds the next, so the
//! order is load-bearing; it mirrors the lifecycle a definition goes
//! through exactly once per class.
//!
//! Construction mutates bookkeeping shared with the superclass (its
//! inherited-statics snapshot is read, membership caches are populated
//! lazily), so the whole pipeline runs under one global reentrant lock.
//! Class building happens once at startup; this is not a hot path.

use crate::class::{ClassData, ClassHandle, CONSTRUCTOR_MEMBER};
use crate::def::ClassDef;
use crate::error::{ModelError, ModelResult};
use crate::instance::{CallContext, Receiver};
use crate::merge;
use crate::registry::{self, ClassRegistry};
use crate::value::{MemberMap, Method, Value};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Section names of the original definition format. The typed [`ClassDef`]
/// keeps these out of the member set structurally; a member that tries to
/// use one of them anyway is a definition error.
const RESERVED_KEYS: [&str; 5] = [
    "constructor",
    "statics",
    "inheritedStatics",
    "mixins",
    "abstractClass",
];

/// Static names probed for the creation hook, in order of preference
/// (the later two are accepted for backward compatibility).
const CREATION_HOOKS: [&str; 3] = ["onClassCreate", "onClassCreated", "onClassExtended"];

/// Build a class from `definition`, extending `superclass`.
///
/// `name` becomes the display name used in diagnostics; anonymous classes
/// are fine. The returned class is finished: prototype chain, statics,
/// inherited statics, mixins, and the creation hook have all been applied.
pub fn build(
    name: Option<&str>,
    superclass: &ClassHandle,
    definition: ClassDef,
) -> ModelResult<ClassHandle> {
    let _guard = registry::build_lock();

    let diagnostic_name = name.unwrap_or(crate::class::ANONYMOUS).to_string();

    let ClassDef {
        members,
        constructor,
        statics,
        inherited_statics,
        mixins,
        abstract_class,
    } = definition;

    for key in members.keys() {
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Err(ModelError::InvalidDefinition(format!(
                "member name '{key}' is reserved in class '{diagnostic_name}'"
            )));
        }
    }

    // Bind superclass-calling methods before anything else, so the
    // constructor can be treated the same way.
    let mut own_members = MemberMap::default();
    for (member_name, value) in members {
        let value = bind_super_call(superclass, &diagnostic_name, &member_name, value)?;
        own_members.insert(member_name, value);
    }

    let ctor = resolve_constructor(superclass, constructor);

    // A concrete class must have replaced every abstract sentinel visible
    // on it, own or inherited. Runs before mixins are applied: a mixin
    // cannot satisfy an abstract member.
    if !abstract_class {
        check_abstract_members(&diagnostic_name, superclass, &own_members)?;
    }

    // Inherited statics: merge the superclass's snapshot with this class's
    // own contributions (own wins), apply the union as real statics, and
    // keep the union as the snapshot for the next subclass. If nobody on
    // the chain ever declared any, no snapshot exists at all.
    let parent_snapshot = superclass.inherited_statics_snapshot();
    let mut statics_map = MemberMap::default();
    let snapshot = if inherited_statics.is_some() || parent_snapshot.is_some() {
        let mut merged = MemberMap::default();
        if let Some(from_parent) = &parent_snapshot {
            merge::assign(Some(&mut merged), &[from_parent]);
        }
        if let Some(own) = &inherited_statics {
            merge::assign(Some(&mut merged), &[own]);
        }
        merge::assign(Some(&mut statics_map), &[&merged]);
        Some(merged)
    } else {
        None
    };

    // Own statics win over inherited ones for this exact class, without
    // touching the snapshot further subclasses will inherit.
    merge::assign(Some(&mut statics_map), &[&statics]);

    apply_mixins(superclass, &mut own_members, &mixins);

    let class = ClassHandle(Arc::new(ClassData {
        display_name: name.map(str::to_owned),
        parent: Some(superclass.clone()),
        members: RwLock::new(own_members),
        ctor,
        is_abstract: abstract_class,
        statics: RwLock::new(statics_map),
        inherited_statics: snapshot,
        mixins,
        built: true,
        mixin_id: OnceCell::new(),
        mixin_cache: Mutex::new(FxHashMap::default()),
    }));

    fire_creation_hook(&class)?;

    if let Some(class_name) = class.display_name() {
        ClassRegistry::global().register(class_name, &class);
    }

    Ok(class)
}

/// Sugar for extending the universal root
pub fn create(definition: ClassDef) -> ModelResult<ClassHandle> {
    build(None, &crate::class::universal_root(), definition)
}

/// Sugar for extending the universal root with a display name
pub fn create_named(name: &str, definition: ClassDef) -> ModelResult<ClassHandle> {
    build(Some(name), &crate::class::universal_root(), definition)
}

/// Sugar for [`build`] without a display name
pub fn extend(superclass: &ClassHandle, definition: ClassDef) -> ModelResult<ClassHandle> {
    build(None, superclass, definition)
}

/// Sugar for [`build`] with a display name
pub fn extend_named(
    name: &str,
    superclass: &ClassHandle,
    definition: ClassDef,
) -> ModelResult<ClassHandle> {
    build(Some(name), superclass, definition)
}

/// Install the superclass-call binding on a chained method.
///
/// A method declared as chaining must find a callable member of the same
/// name on the superclass's member set; the abstract sentinel counts (the
/// chain call then fails with `NotImplemented` at call time, like invoking
/// the sentinel directly). Anything else is a definition error, caught
/// here rather than at call time. Non-method values and plain methods pass
/// through untouched: an embedded class value is never a chaining target,
/// and a plain method may shadow a superclass member freely.
fn bind_super_call(
    superclass: &ClassHandle,
    class_name: &str,
    member_name: &str,
    value: Value,
) -> ModelResult<Value> {
    match value {
        Value::Method(method) if method.chains() => {
            match superclass.lookup_member(member_name) {
                Some(target) if target.is_callable() => Ok(Value::Method(
                    method.with_super_binding(superclass.clone(), member_name),
                )),
                _ => Err(ModelError::InvalidDefinition(format!(
                    "method '{member_name}' of class '{class_name}' chains to its superclass, \
                     but the superclass has no callable member of that name"
                ))),
            }
        }
        other => Ok(other),
    }
}

/// Resolve the constructor implementation: the explicit one (bound to the
/// superclass constructor slot when it chains), or a synthesized
/// pass-through that forwards all arguments to the superclass constructor.
/// Extending the root synthesizes a no-op instead: the instance is already
/// fully formed.
fn resolve_constructor(superclass: &ClassHandle, explicit: Option<Method>) -> Method {
    match explicit {
        Some(method) if method.chains() => {
            method.with_super_binding(superclass.clone(), CONSTRUCTOR_MEMBER)
        }
        Some(method) => method,
        None => {
            if superclass.is_root() {
                Method::new(|_ctx, _args| Ok(Value::Null))
            } else {
                Method::chained(|ctx: &mut CallContext, args: &[Value]| ctx.call_super(args))
                    .with_super_binding(superclass.clone(), CONSTRUCTOR_MEMBER)
            }
        }
    }
}

/// Walk every member visible on the class under construction, own and
/// inherited, and reject any that still resolves to the abstract sentinel.
fn check_abstract_members(
    class_name: &str,
    superclass: &ClassHandle,
    own_members: &MemberMap,
) -> ModelResult<()> {
    for (member_name, value) in own_members {
        if matches!(value, Value::Abstract) {
            return Err(ModelError::AbstractMemberNotDeclared {
                class: class_name.to_string(),
                member: member_name.clone(),
            });
        }
    }

    let mut inherited_names = Vec::new();
    superclass.collect_member_names(&mut inherited_names);
    for member_name in inherited_names {
        if own_members.contains_key(&member_name) {
            continue; // overridden by an own member, already checked above
        }
        if matches!(superclass.lookup_member(&member_name), Some(Value::Abstract)) {
            return Err(ModelError::AbstractMemberUnimplemented {
                class: class_name.to_string(),
                member: member_name,
            });
        }
    }

    Ok(())
}

/// Copy mixin members into the own member set, walking the mixin list in
/// reverse declaration order so that later-declared mixins win ties, and
/// skipping every name the class already resolves (own member or anything
/// inherited through the chain): explicit members always beat mixins.
fn apply_mixins(superclass: &ClassHandle, own_members: &mut MemberMap, mixins: &[ClassHandle]) {
    for mixin in mixins.iter().rev() {
        for (member_name, value) in mixin.flattened_members() {
            if own_members.contains_key(&member_name) {
                continue;
            }
            if superclass.lookup_member(&member_name).is_some() {
                continue;
            }
            own_members.insert(member_name, value);
        }
    }
}

/// Invoke the class-creation hook if the finished class exposes one as a
/// callable static: exactly once, synchronously, with the class as both
/// the receiver and the sole argument.
fn fire_creation_hook(class: &ClassHandle) -> ModelResult<()> {
    for hook_name in CREATION_HOOKS {
        match class.static_member(hook_name) {
            Some(Value::Method(hook)) => {
                let mut ctx = CallContext::new(Receiver::Class(class.clone()));
                hook.invoke(&mut ctx, &[Value::Class(class.clone())])?;
                return Ok(());
            }
            Some(Value::Abstract) => {
                return Err(ModelError::NotImplemented {
                    member: hook_name.to_string(),
                })
            }
            _ => continue,
        }
    }
    Ok(())
}
