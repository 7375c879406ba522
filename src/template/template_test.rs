use std::rc::Rc;

use serde_json::json;

use crate::{
    runtime::value::Value,
    template::{
        Expression, Statement, StatementKind, Template, TemplateBuilder, TemplateCache,
        hash::Params,
    },
};

fn kinds(template: &Template) -> Vec<StatementKind> {
    template
        .statements()
        .iter()
        .map(|node| node.statement.kind())
        .collect()
}

fn boundaries(template: &Template) -> Vec<(bool, bool)> {
    template
        .statements()
        .iter()
        .map(|node| (node.front_boundary, node.back_boundary))
        .collect()
}

#[test]
fn text_around_inline_is_never_a_boundary() {
    let template = TemplateBuilder::new()
        .text("a")
        .inline("concat", Params::default(), false)
        .text("b")
        .template()
        .unwrap();

    assert_eq!(
        boundaries(&template),
        vec![(false, false), (false, false), (false, false)]
    );
}

#[test]
fn sole_dynamic_statement_is_both_boundaries() {
    let template = Template::from_json(r#"[["unknown", ["name"], false]]"#).unwrap();

    assert_eq!(boundaries(&template), vec![(true, true)]);
    assert!(template.front_boundary());
    assert!(template.back_boundary());
}

#[test]
fn first_and_last_candidates_are_flagged() {
    let template = Template::from_json(
        r#"[["unknown", "a"], ["text", " "], ["component", "x-foo", [], null, null]]"#,
    )
    .unwrap();

    assert_eq!(
        boundaries(&template),
        vec![(true, false), (false, false), (false, true)]
    );
}

#[test]
fn static_partition_is_fixed_by_kind() {
    let template = Template::from_json(
        r#"[
            ["openElement", "div"],
            ["staticAttr", "class", "box", null],
            ["dynamicAttr", "title", ["get", ["title"]], null],
            ["comment", "note"],
            ["closeElement"]
        ]"#,
    )
    .unwrap();

    let statics: Vec<bool> = template
        .statements()
        .iter()
        .map(|node| node.statement.is_static())
        .collect();
    assert_eq!(statics, vec![true, true, false, true, true]);
}

#[test]
fn program_resolves_children_by_index() {
    let template = Template::from_json_value(json!([
        { "statements": [["text", "yes"]] },
        { "statements": [["unknown", ["item"]]], "locals": ["item", "index"] },
        { "statements": [["block", ["if"], [["get", "ok"]], [], 0, null],
                         ["block", "each", [["get", "list"]], null, 1, 0]] }
    ]))
    .unwrap();

    assert_eq!(kinds(&template), vec![StatementKind::Block, StatementKind::Block]);
    let Statement::Block(each) = &template.statements()[1].statement else {
        panic!("expected a block statement");
    };
    let body = each.templates.default.as_ref().unwrap();
    assert_eq!(body.arity(), 2);
    assert_eq!(body.locals()[0].as_ref(), "item");
    assert!(each.templates.inverse.is_some());
}

#[test]
fn paths_accept_dotted_strings_and_part_arrays() {
    let template =
        Template::from_json(r#"[["unknown", "person.name"], ["unknown", ["person", "name"]]]"#)
            .unwrap();

    let paths: Vec<String> = template
        .statements()
        .iter()
        .map(|node| match &node.statement {
            Statement::Unknown(unknown) => unknown.path.to_string(),
            _ => String::new(),
        })
        .collect();
    assert_eq!(paths, vec!["person.name", "person.name"]);
}

#[test]
fn repeated_path_parts_share_one_allocation() {
    let template = Template::from_json(r#"[["unknown", "name"], ["unknown", "name"]]"#).unwrap();

    let parts: Vec<Rc<str>> = template
        .statements()
        .iter()
        .filter_map(|node| match &node.statement {
            Statement::Unknown(unknown) => Some(Rc::clone(&unknown.path.parts()[0])),
            _ => None,
        })
        .collect();
    assert!(Rc::ptr_eq(&parts[0], &parts[1]));
}

#[test]
fn non_array_expressions_are_literals() {
    let template = Template::from_json(
        r#"[["openElement", "input"], ["dynamicAttr", "size", 3, null], ["closeElement"]]"#,
    )
    .unwrap();

    let Statement::DynamicAttr(attr) = &template.statements()[1].statement else {
        panic!("expected a dynamic attribute");
    };
    assert_eq!(attr.value.static_value(), Some(&Value::Integer(3)));
}

#[test]
fn empty_document_is_an_empty_template() {
    let template = Template::from_json("[]").unwrap();
    assert!(template.is_empty());
    assert!(!template.front_boundary());
}

#[test]
fn unknown_statement_kind_is_reported_with_location() {
    let err = Template::from_json(r#"[["text", "a"], ["yield", 1]]"#).unwrap_err();
    assert_eq!(err.code.code, "T002");
    assert_eq!(err.statement, Some(1));
    assert_eq!(err.template, Some(0));
    assert_eq!(err.kind.as_deref(), Some("yield"));
}

#[test]
fn forward_child_reference_is_rejected() {
    let err = Template::from_json_value(json!([
        { "statements": [["block", "if", [true], [], 1, null]] },
        { "statements": [["text", "late"]] }
    ]))
    .unwrap_err();

    assert_eq!(err.code.code, "T005");
    assert_eq!(err.template, Some(0));
    insta::assert_snapshot!(err.to_string(), @r"
    [T005] INVALID TEMPLATE ID: template id 1 is out of range (0 templates defined so far) (template 0, statement 0, `block`)
    hint: child templates must precede the template that references them
    ");
}

#[test]
fn malformed_hash_and_expression_errors() {
    let err = Template::from_json(r#"[["component", "x-a", ["title"], null, null]]"#).unwrap_err();
    assert_eq!(err.code.code, "T006");

    let err = Template::from_json(r#"[["component", "x-a", [1, "v"], null, null]]"#).unwrap_err();
    assert_eq!(err.code.code, "T006");

    let err = Template::from_json(r#"[["inline", "f", [["call", "g"]], [], false]]"#).unwrap_err();
    assert_eq!(err.code.code, "T003");

    let err = Template::from_json(r#"[["unknown", ""]]"#).unwrap_err();
    assert_eq!(err.code.code, "T007");

    let err = Template::from_json(r#"{"statements": 3}"#).unwrap_err();
    assert_eq!(err.code.code, "T001");
}

#[test]
fn builder_matches_specification() {
    let built = TemplateBuilder::new()
        .text("Hello ")
        .unknown("name")
        .template()
        .unwrap();
    let loaded = Template::from_json(r#"[["text","Hello "],["unknown",["name"],false]]"#).unwrap();

    assert_eq!(kinds(&built), kinds(&loaded));
    assert_eq!(boundaries(&built), boundaries(&loaded));
}

#[test]
fn builder_rejects_empty_path_parts_like_the_loader() {
    let built = TemplateBuilder::new()
        .text("x")
        .unknown("a..b")
        .template()
        .unwrap_err();
    let loaded = Template::from_json(r#"[["text","x"],["unknown","a..b"]]"#).unwrap_err();

    assert_eq!(built.code.code, "T007");
    assert_eq!(built.to_string(), loaded.to_string().replace("template 0, ", ""));
    assert_eq!(built.statement, Some(1));
    assert_eq!(built.kind.as_deref(), Some("unknown"));

    let err = TemplateBuilder::new()
        .unknown("")
        .modifier("on.", Params::default())
        .template()
        .unwrap_err();
    assert_eq!(err.code.code, "T007");
    assert_eq!(err.statement, Some(0));
}

#[test]
fn builder_is_reusable_after_an_error() {
    let mut builder = TemplateBuilder::new();
    assert!(builder.block(".x", Params::default(), None, None).template().is_err());

    let template = builder.unknown("name").template().unwrap();
    assert_eq!(kinds(&template), vec![StatementKind::Unknown]);
}

#[test]
fn builder_is_reusable_after_template() {
    let mut builder = TemplateBuilder::new();
    builder.locals(&["item"]).dynamic_prop("value", Expression::get("item"));
    let first = builder.template().unwrap();
    let second = builder.text("x").template().unwrap();

    assert_eq!(first.arity(), 1);
    assert_eq!(second.arity(), 0);
    assert_eq!(kinds(&second), vec![StatementKind::Text]);
}

#[test]
fn cache_returns_shared_template_for_identical_text() {
    let mut cache = TemplateCache::new();
    let source = r#"[["text","Hello "],["unknown",["name"],false]]"#;

    let first = cache.load(source).unwrap();
    let second = cache.load(source).unwrap();

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!((cache.hits(), cache.misses(), cache.len()), (1, 1, 1));
    assert!(cache.contains(source));
}

#[test]
fn cache_does_not_keep_failed_builds() {
    let mut cache = TemplateCache::new();
    assert!(cache.load(r#"[["nope"]]"#).is_err());
    assert!(cache.is_empty());
}
