use std::{cell::Cell, rc::Rc};

use serde_json::json;

use crate::runtime::{
    environment::Environment,
    helper::Helper,
    model::{CONSTANT_REVISION, Model},
    reference::{CachedReference, EvaluatedParams, HelperInvocationReference, Reference, Validation},
    scope::Scope,
    value::Value,
};

#[test]
fn const_reference_is_pure() {
    let reference = Reference::constant("fixed");
    for _ in 0..5 {
        assert_eq!(reference.value().unwrap(), Value::from("fixed"));
        assert_eq!(reference.revision(), CONSTANT_REVISION);
    }

    let mut cached = CachedReference::compute(reference).unwrap();
    assert_eq!(cached.revalidate().unwrap(), Validation::Fresh);
}

#[test]
fn property_chain_pulls_through_the_model() {
    let model = Model::new(json!({"person": {"name": "Ada"}}));
    let name = Reference::root(model.clone()).get("person").get("name");
    assert_eq!(name.value().unwrap(), Value::from("Ada"));

    model.set_path("person.name", "Grace");
    assert_eq!(name.value().unwrap(), Value::from("Grace"));
    assert_eq!(name.revision(), model.revision());
}

#[test]
fn concat_treats_null_as_empty() {
    let model = Model::new(json!({}));
    let concat = Reference::concat(vec![
        Reference::constant("a"),
        Reference::root(model).get("missing"),
        Reference::constant("b"),
    ]);
    assert_eq!(concat.value().unwrap(), Value::from("ab"));
}

#[test]
fn cached_reference_distinguishes_unchanged_from_changed() {
    let model = Model::new(json!({"a": 1, "b": 2}));
    let mut cached = CachedReference::compute(Reference::root(model.clone()).get("a")).unwrap();

    assert_eq!(cached.revalidate().unwrap(), Validation::Fresh);

    model.set_path("b", 3);
    assert_eq!(cached.revalidate().unwrap(), Validation::Unchanged);
    assert_eq!(cached.revalidate().unwrap(), Validation::Fresh);

    model.set_path("a", 10);
    assert_eq!(cached.revalidate().unwrap(), Validation::Changed);
    assert_eq!(cached.value(), &Value::Integer(10));
}

#[test]
fn helper_invocation_recomputes_only_when_inputs_move() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let helper = Helper::simple(move |args| {
        counter.set(counter.get() + 1);
        Ok(Value::from(args.param(0).to_string_value().to_uppercase()))
    });

    let model = Model::new(json!({"name": "ada", "other": 0}));
    let env = Environment::new();
    let frame = env.push_frame(env.create_root_scope(Some(model.clone()), &[], Vec::new(), Value::Null), Vec::new());
    let params = EvaluatedParams {
        params: vec![Reference::root(model.clone()).get("name")],
        ..Default::default()
    };
    let reference = Reference::Helper(
        HelperInvocationReference::new("upper", helper, params, &frame, "inline").unwrap(),
    );

    let mut cached = CachedReference::compute(reference).unwrap();
    assert_eq!(cached.value(), &Value::from("ADA"));
    assert_eq!(calls.get(), 1);

    assert_eq!(cached.revalidate().unwrap(), Validation::Fresh);
    assert_eq!(calls.get(), 1);

    model.set_path("name", "grace");
    assert_eq!(cached.revalidate().unwrap(), Validation::Changed);
    assert_eq!(cached.value(), &Value::from("GRACE"));
    assert_eq!(calls.get(), 2);
}

#[test]
fn block_helpers_cannot_be_invoked_as_values() {
    let env = Environment::new();
    let frame = env.push_frame(env.create_root_scope(None, &[], Vec::new(), Value::Null), Vec::new());
    let helper = Helper::block(|_, _| Ok(()));

    let err = HelperInvocationReference::new("each", helper, EvaluatedParams::default(), &frame, "inline")
        .unwrap_err();
    assert_eq!(err.code.code, "L004");
    assert_eq!(err.kind, "inline");
}

#[test]
fn dynamic_var_helper_reads_the_frame_dynamic_scope() {
    let env = Environment::new();
    let theme = Model::new("dark");
    let frame = env.push_frame(
        env.create_root_scope(None, &[], Vec::new(), Value::Null),
        vec![(Rc::from("theme"), Reference::root(theme.clone()))],
    );
    let params = EvaluatedParams {
        params: vec![Reference::constant("theme")],
        ..Default::default()
    };
    let reference = Reference::Helper(
        HelperInvocationReference::new("-get-dynamic-var", Helper::DynamicVar, params, &frame, "inline")
            .unwrap(),
    );

    let mut cached = CachedReference::compute(reference).unwrap();
    assert_eq!(cached.value(), &Value::from("dark"));

    theme.set("light");
    assert_eq!(cached.revalidate().unwrap(), Validation::Changed);
    assert_eq!(cached.value(), &Value::from("light"));
}

#[test]
fn member_of_a_constant_folds_to_a_constant() {
    let object = Reference::constant(Value::from(json!({"a": {"b": 1}})));
    assert!(object.get("a").get("b").is_const());

    let model = Model::new(json!({"a": 1}));
    let root = Reference::root(model.clone());
    assert!(!root.is_const());
    assert!(!root.get("a").is_const());

    let Reference::Root(root) = root else {
        panic!("expected a root reference");
    };
    assert!(root.model().ptr_eq(&model));
}

#[test]
fn missing_block_arguments_bind_null() {
    let locals: Vec<Rc<str>> = vec![Rc::from("item"), Rc::from("index")];
    let scope = Scope::root(None, Value::Null).init_top_level(&locals, vec![Reference::constant("x")]);
    assert_eq!(scope.local_count(), 2);
    assert_eq!(scope.local("item").unwrap().value().unwrap(), Value::from("x"));
    assert_eq!(scope.local("index").unwrap().value().unwrap(), Value::Null);

    let parent = Rc::new(scope);
    let child = Scope::child(&parent, &[], Vec::new());
    assert_eq!(child.local_count(), 0);
    assert_eq!(child.local("item").unwrap().value().unwrap(), Value::from("x"));
}

#[test]
fn nan_result_is_unchanged_when_inputs_move() {
    let model = Model::new(json!({"n": 1}));
    let env = Environment::new();
    let frame = env.push_frame(env.create_root_scope(None, &[], Vec::new(), Value::Null), Vec::new());
    let params = EvaluatedParams {
        params: vec![Reference::root(model.clone()).get("n")],
        ..Default::default()
    };
    let helper = Helper::simple(|_| Ok(Value::Float(f64::NAN)));
    let reference = Reference::Helper(
        HelperInvocationReference::new("nan", helper, params, &frame, "inline").unwrap(),
    );

    let mut cached = CachedReference::compute(reference).unwrap();
    model.set_path("n", 2);
    assert_eq!(cached.revalidate().unwrap(), Validation::Unchanged);
}
