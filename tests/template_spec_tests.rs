use std::rc::Rc;

use morphic::{
    Environment, MemorySurface, Model, RenderError, RenderOptions, Template, TemplateBuilder,
    TemplateCache,
    template::{Expression, Hash, Params},
};
use serde_json::json;

const TODO_LIST: &str = r#"[
    { "statements": [
        ["openElement", "li"],
        ["dynamicAttr", "class", ["helper", "concat", [["concat", ["item ", ["get", "todo.state"]]]], []], null],
        ["unknown", "todo.title"],
        ["closeElement"]
    ], "locals": ["todo"] },
    { "statements": [["openElement", "p"], ["text", "Nothing to do"], ["closeElement"]] },
    { "statements": [
        ["openElement", "ul"],
        ["block", "each", [["get", "todos"]], [], 0, 1],
        ["closeElement"]
    ], "meta": { "moduleName": "todo-list" } }
]"#;

#[test]
fn program_renders_nested_templates() {
    let template = Template::from_json(TODO_LIST).unwrap();
    let data = Model::new(json!({ "todos": [
        { "title": "Write docs", "state": "open" },
        { "title": "Ship", "state": "done" }
    ] }));
    let mut result = template
        .render(&Environment::new(), data.clone(), MemorySurface::new(), RenderOptions::default())
        .unwrap();

    insta::assert_snapshot!(result.surface().to_html(), @r#"<ul><li class="item open">Write docs</li><li class="item done">Ship</li></ul>"#);

    data.set_path("todos", json!([]));
    result.revalidate().unwrap();
    assert_eq!(result.surface().to_html(), "<ul><p>Nothing to do</p></ul>");
}

#[test]
fn meta_is_kept_with_the_root_template() {
    let template = Template::from_json(TODO_LIST).unwrap();
    assert_eq!(template.meta(), &json!({ "moduleName": "todo-list" }));
    assert_eq!(template.arity(), 0);
}

#[test]
fn one_template_renders_many_independent_results() {
    let template = Template::from_json(r#"[["unknown", "n"]]"#).unwrap();
    let env = Environment::new();
    let a = Model::new(json!({ "n": 1 }));
    let b = Model::new(json!({ "n": 2 }));

    let mut first = template
        .render(&env, a.clone(), MemorySurface::new(), RenderOptions::default())
        .unwrap();
    let mut second = template
        .render(&env, b.clone(), MemorySurface::new(), RenderOptions::default())
        .unwrap();

    a.set_path("n", 10);
    first.revalidate().unwrap();
    let stats = second.revalidate().unwrap();

    assert_eq!(first.surface().to_html(), "10");
    assert_eq!(second.surface().to_html(), "2");
    assert_eq!(stats.recomputed, 0);
}

#[test]
fn built_templates_render_like_loaded_ones() {
    let row = TemplateBuilder::new()
        .locals(&["row"])
        .open_element("td")
        .unknown("row")
        .close_element()
        .template()
        .unwrap();
    let table = TemplateBuilder::new()
        .open_element("table")
        .dynamic_attr("data-size", Expression::get("rows.length"))
        .block(
            "each",
            Params::new(vec![Expression::get("rows")], Hash::empty()),
            Some(row),
            None,
        )
        .close_element()
        .template()
        .unwrap();

    let result = table
        .render(
            &Environment::new(),
            Model::new(json!({ "rows": ["x", "y"] })),
            MemorySurface::new(),
            RenderOptions::default(),
        )
        .unwrap();

    assert_eq!(
        result.surface().to_html(),
        r#"<table data-size="2"><td>x</td><td>y</td></table>"#
    );
}

#[test]
fn cached_templates_are_shared_between_renders() {
    let mut cache = TemplateCache::new();
    let source = r#"[["text", "hi "], ["unknown", "who"]]"#;

    let first = cache.load(source).unwrap();
    let second = cache.load(source).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!((cache.hits(), cache.misses()), (1, 1));

    let result = second
        .render(
            &Environment::new(),
            Model::new(json!({ "who": "there" })),
            MemorySurface::new(),
            RenderOptions::default(),
        )
        .unwrap();
    assert_eq!(result.surface().to_html(), "hi there");
}

#[test]
fn specification_errors_convert_into_render_errors() {
    fn load_and_render(source: &str) -> Result<String, RenderError> {
        let template = Template::from_json(source)?;
        let result = template.render(
            &Environment::new(),
            None,
            MemorySurface::new(),
            RenderOptions::default(),
        )?;
        Ok(result.surface().to_html())
    }

    assert_eq!(load_and_render(r#"[["text", "ok"]]"#).unwrap(), "ok");
    let err = load_and_render(r#"[["text"]]"#).unwrap_err();
    assert_eq!(err.code(), Some("T004"));
}
