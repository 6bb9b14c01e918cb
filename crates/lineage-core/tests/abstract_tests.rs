//! Abstract classes and abstract members
//!
//! Instantiation-time rejection of abstract classes, the build-time
//! completeness check for concrete classes (own and inherited sentinels),
//! and the independent guard on the sentinel itself when it is somehow
//! invoked anyway.

use lineage_core::{create, create_named, ClassDef, ModelError, Value};

// ===== Instantiation of abstract classes =====

#[test]
fn test_abstract_class_cannot_be_instantiated() {
    let shape = create_named(
        "Shape",
        ClassDef::new().abstract_class(true).abstract_member("area"),
    )
    .unwrap();

    let err = shape.instantiate(&[]).unwrap_err();
    match err {
        ModelError::AbstractInstantiation { class } => assert_eq!(class, "Shape"),
        other => panic!("expected AbstractInstantiation, got {other:?}"),
    }
}

#[test]
fn test_concrete_subclass_runs_abstract_ancestor_constructor_once() {
    let shape = create_named(
        "TrackedShape",
        ClassDef::new()
            .abstract_class(true)
            .constructor(|ctx, _| {
                let runs = ctx.get("ctor_runs").and_then(|v| v.as_int()).unwrap_or(0);
                ctx.set("ctor_runs", Value::int(runs + 1))?;
                Ok(Value::Null)
            }),
    )
    .unwrap();

    // No further overrides: the synthesized constructor chains upward
    let circle = shape.extend(ClassDef::new()).unwrap();
    let instance = circle.instantiate(&[]).unwrap();
    assert_eq!(instance.get("ctor_runs"), Some(Value::int(1)));
}

#[test]
fn test_abstractness_is_not_inherited_automatically() {
    let base = create_named("AbstractBase", ClassDef::new().abstract_class(true)).unwrap();

    // A subclass that does not redeclare the flag is concrete
    let concrete = base.extend(ClassDef::new()).unwrap();
    assert!(!concrete.is_abstract());
    assert!(concrete.instantiate(&[]).is_ok());

    // One that redeclares it stays abstract
    let still_abstract = base.extend(ClassDef::new().abstract_class(true)).unwrap();
    assert!(still_abstract.instantiate(&[]).is_err());
}

// ===== Build-time completeness check =====

#[test]
fn test_own_abstract_member_requires_abstract_declaration() {
    let err = create_named("Sneaky", ClassDef::new().abstract_member("m")).unwrap_err();
    match err {
        ModelError::AbstractMemberNotDeclared { class, member } => {
            assert_eq!(class, "Sneaky");
            assert_eq!(member, "m");
        }
        other => panic!("expected AbstractMemberNotDeclared, got {other:?}"),
    }
}

#[test]
fn test_inherited_abstract_member_must_be_implemented() {
    let base = create_named(
        "NeedsImpl",
        ClassDef::new().abstract_class(true).abstract_member("run"),
    )
    .unwrap();

    let err = base.extend_named("Lazy", ClassDef::new()).unwrap_err();
    match err {
        ModelError::AbstractMemberUnimplemented { class, member } => {
            assert_eq!(class, "Lazy");
            assert_eq!(member, "run");
        }
        other => panic!("expected AbstractMemberUnimplemented, got {other:?}"),
    }
}

#[test]
fn test_implementing_all_abstract_members_builds_and_runs() {
    let base = create_named(
        "TwoHoles",
        ClassDef::new()
            .abstract_class(true)
            .abstract_member("first")
            .abstract_member("second"),
    )
    .unwrap();

    let complete = base
        .extend(
            ClassDef::new()
                .method("first", |_, _| Ok(Value::int(1)))
                .method("second", |_, _| Ok(Value::int(2))),
        )
        .unwrap();

    let instance = complete.instantiate(&[]).unwrap();
    assert_eq!(instance.call("first", &[]).unwrap(), Value::int(1));
    assert_eq!(instance.call("second", &[]).unwrap(), Value::int(2));
}

#[test]
fn test_partial_implementation_still_fails_naming_the_hole() {
    let base = create_named(
        "TwoHolesPartial",
        ClassDef::new()
            .abstract_class(true)
            .abstract_member("first")
            .abstract_member("second"),
    )
    .unwrap();

    let err = base
        .extend(ClassDef::new().method("first", |_, _| Ok(Value::int(1))))
        .unwrap_err();
    match err {
        ModelError::AbstractMemberUnimplemented { member, .. } => assert_eq!(member, "second"),
        other => panic!("expected AbstractMemberUnimplemented, got {other:?}"),
    }
}

#[test]
fn test_check_sees_sentinels_many_levels_up() {
    let root_holder = create_named(
        "DeepAbstract",
        ClassDef::new().abstract_class(true).abstract_member("deep"),
    )
    .unwrap();
    let middle = root_holder
        .extend(ClassDef::new().abstract_class(true))
        .unwrap();

    // Two levels below the declaration, the sentinel is still found
    let err = middle.extend(ClassDef::new()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::AbstractMemberUnimplemented { member, .. } if member == "deep"
    ));

    let fixed = middle
        .extend(ClassDef::new().method("deep", |_, _| Ok(Value::Null)))
        .unwrap();
    assert!(fixed.instantiate(&[]).is_ok());
}

#[test]
fn test_sentinel_assigned_after_build_keeps_literal_semantics() {
    let base = create_named("LatePatch", ClassDef::new()).unwrap();
    // The raw patch path performs no checks, so a sentinel can land on a
    // concrete class after the fact
    base.apply_override([("late".to_string(), Value::Abstract)]);

    // Invoking it trips the sentinel's own guard
    let instance = base.instantiate(&[]).unwrap();
    let err = instance.call("late", &[]).unwrap_err();
    assert!(matches!(err, ModelError::NotImplemented { member } if member == "late"));

    // And a subsequent subclass build sees it as an inherited abstract member
    let err = base.extend(ClassDef::new()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::AbstractMemberUnimplemented { member, .. } if member == "late"
    ));
}

// ===== The sentinel's independent guard =====

#[test]
fn test_invoking_sentinel_directly_fails() {
    let class = create_named("GhostHost", ClassDef::new()).unwrap();
    let instance = class.instantiate(&[]).unwrap();
    instance.apply_override([("ghost".to_string(), Value::Abstract)]);

    let err = instance.call("ghost", &[]).unwrap_err();
    assert!(matches!(err, ModelError::NotImplemented { member } if member == "ghost"));
}

#[test]
fn test_chained_override_may_target_a_sentinel() {
    let base = create_named(
        "SentinelTarget",
        ClassDef::new().abstract_class(true).abstract_member("work"),
    )
    .unwrap();

    // Chaining into the sentinel is accepted at build time (the sentinel is
    // callable); the chain call itself fails like invoking the sentinel
    let sub = base
        .extend(ClassDef::new().chained_method("work", |ctx, args| ctx.call_super(args)))
        .unwrap();

    let instance = sub.instantiate(&[]).unwrap();
    let err = instance.call("work", &[]).unwrap_err();
    assert!(matches!(err, ModelError::NotImplemented { member } if member == "work"));
}

#[test]
fn test_abstract_class_skips_completeness_check() {
    // An abstract class may leave inherited sentinels unimplemented
    let base = create(
        ClassDef::new()
            .abstract_class(true)
            .abstract_member("pending"),
    )
    .unwrap();
    let still_abstract = base.extend(ClassDef::new().abstract_class(true)).unwrap();
    assert!(still_abstract.lookup_member("pending").is_some());
}
