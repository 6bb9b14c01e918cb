//! Definition surface: names, embedded classes, and method annotations

use lineage_core::annotations::{annotate, final_method, override_method, FINAL};
use lineage_core::{create, create_named, extend, universal_root, ClassDef, Method, ModelError, Value};

#[test]
fn test_display_names_are_optional() {
    let named = create_named("HasAName", ClassDef::new()).unwrap();
    assert_eq!(named.display_name(), Some("HasAName"));

    let anonymous = create(ClassDef::new()).unwrap();
    assert_eq!(anonymous.display_name(), None);
    // Anonymous classes still instantiate and report errors without a name
    assert!(anonymous.instantiate(&[]).is_ok());
}

#[test]
fn test_everything_descends_from_the_universal_root() {
    let root = universal_root();
    let base = create(ClassDef::new()).unwrap();
    let sub = extend(&base, ClassDef::new()).unwrap();

    assert!(base.is_subclass_of(&root));
    assert!(sub.is_subclass_of(&root));
    assert_eq!(base.superclass(), Some(root));
}

#[test]
fn test_embedded_class_member_survives_as_a_value() {
    let helper = create_named("EmbeddedHelper", ClassDef::new()).unwrap();

    // A class stored as a member value is data, not a method: it is never
    // treated as a chaining target and never wrapped
    let host = create_named(
        "EmbedHost",
        ClassDef::new().member("helper", Value::Class(helper.clone())),
    )
    .unwrap();

    let found = host.lookup_member("helper").unwrap();
    assert_eq!(found.as_class(), Some(&helper));

    let sub = host.extend(ClassDef::new()).unwrap();
    assert_eq!(sub.lookup_member("helper").unwrap().as_class(), Some(&helper));
}

#[test]
fn test_annotations_survive_the_build() {
    let marked = override_method(Method::new(|_, _| Ok(Value::int(1))));
    let sealed = final_method(Method::new(|_, _| Ok(Value::int(2))));

    let class = create_named(
        "Annotated",
        ClassDef::new()
            .method_value("marked", marked)
            .method_value("sealed", sealed),
    )
    .unwrap();

    let marked = class.lookup_member("marked").unwrap();
    assert!(marked.as_method().unwrap().is_marked_override());

    let sealed = class.lookup_member("sealed").unwrap();
    assert!(sealed.as_method().unwrap().is_final());
}

#[test]
fn test_final_is_not_enforced() {
    let sealed = annotate(Method::new(|_, _| Ok(Value::int(1))), FINAL).unwrap();
    let base = create_named("SealedBase", ClassDef::new().method_value("m", sealed)).unwrap();

    // Overriding a final method builds fine: the flag is metadata only
    let sub = base
        .extend(ClassDef::new().method("m", |_, _| Ok(Value::int(2))))
        .unwrap();
    let instance = sub.instantiate(&[]).unwrap();
    assert_eq!(instance.call("m", &[]).unwrap(), Value::int(2));
}

#[test]
fn test_unknown_annotation_is_rejected() {
    let err = annotate(Method::new(|_, _| Ok(Value::Null)), "memoized").unwrap_err();
    assert!(matches!(err, ModelError::UnknownAnnotation(name) if name == "memoized"));
}

#[test]
fn test_member_values_of_every_kind_are_stored() {
    let class = create_named(
        "Grab Bag",
        ClassDef::new()
            .member("flag", Value::bool(true))
            .member("count", Value::int(7))
            .member("ratio", Value::float(0.5))
            .member("label", Value::str("tag")),
    )
    .unwrap();

    let instance = class.instantiate(&[]).unwrap();
    assert_eq!(instance.get("flag"), Some(Value::bool(true)));
    assert_eq!(instance.get("count"), Some(Value::int(7)));
    assert_eq!(instance.get("ratio"), Some(Value::float(0.5)));
    assert_eq!(instance.get("label"), Some(Value::str("tag")));

    // Plain data members are not callable
    let err = instance.call("count", &[]).unwrap_err();
    assert!(matches!(err, ModelError::NotCallable { member } if member == "count"));
}

#[test]
fn test_missing_member_call_names_the_class() {
    let class = create_named("MissingHost", ClassDef::new()).unwrap();
    let instance = class.instantiate(&[]).unwrap();

    let err = instance.call("nothing", &[]).unwrap_err();
    match err {
        ModelError::MissingMember { class, member } => {
            assert_eq!(class, "MissingHost");
            assert_eq!(member, "nothing");
        }
        other => panic!("expected MissingMember, got {other:?}"),
    }
}
