use morphic::{
    Environment, Helper, MemorySurface, Model, RenderOptions, RevalidateStats, Template,
    TopLevelRenderResult, Value,
};
use serde_json::json;

fn render(source: &str, data: &Model) -> TopLevelRenderResult<MemorySurface> {
    Template::from_json(source)
        .unwrap()
        .render(
            &Environment::new(),
            data.clone(),
            MemorySurface::new(),
            RenderOptions::default(),
        )
        .unwrap()
}

const PROFILE: &str = r#"[
    ["openElement", "section"],
    ["staticAttr", "class", "profile", null],
    ["dynamicAttr", "title", ["get", "name"], null],
    ["comment", "card"],
    ["text", "Name: "],
    ["unknown", "name"],
    ["text", ", age "],
    ["unknown", "age"],
    ["closeElement"]
]"#;

#[test]
fn second_revalidate_is_a_no_op() {
    let data = Model::new(json!({ "name": "Ada", "age": 36 }));
    let mut result = render(PROFILE, &data);

    data.set_path("age", 37);
    let first = result.revalidate().unwrap();
    let count = result.surface().mutation_count();
    let second = result.revalidate().unwrap();

    assert_eq!(first.applied, 1);
    assert_eq!(second.applied, 0);
    assert_eq!(second.recomputed, 0);
    assert_eq!(result.surface().mutation_count(), count);
}

#[test]
fn static_output_is_written_once() {
    let data = Model::new(json!({ "name": "Ada", "age": 36 }));
    let mut result = render(PROFILE, &data);

    for age in 37..42 {
        data.set_path("age", age);
        result.revalidate().unwrap();
    }
    data.set_path("name", "Grace");
    result.revalidate().unwrap();

    let log = result.surface().log();
    let count = |entry: &str| log.iter().filter(|line| line.as_str() == entry).count();
    assert_eq!(count("append_text \"Name: \""), 1);
    assert_eq!(count("append_comment \"card\""), 1);
    assert_eq!(count("set_attribute <section> class=\"profile\""), 1);
    assert_eq!(
        result.surface().to_html(),
        r#"<section class="profile" title="Grace"><!--card-->Name: Grace, age 41</section>"#
    );
}

#[test]
fn recomputed_but_equal_values_are_not_reapplied() {
    let data = Model::new(json!({ "name": "Ada", "age": 36 }));
    let mut result = render(PROFILE, &data);
    let before = result.surface().mutation_count();

    data.set_path("age", 37);
    let stats = result.revalidate().unwrap();

    // Every binding reads the same self model, so all three recompute, but
    // only the age actually changed.
    assert_eq!(
        stats,
        RevalidateStats {
            visited: 3,
            recomputed: 3,
            applied: 1
        }
    );
    assert_eq!(result.surface().mutation_count() - before, 1);
}

#[test]
fn constant_bindings_never_recompute() {
    let data = Model::new(json!({ "n": 1 }));
    let mut result = render(
        r#"[["inline", "concat", ["a", "b"], [], false], ["unknown", "n"]]"#,
        &data,
    );

    data.set_path("n", 2);
    let stats = result.revalidate().unwrap();

    assert_eq!(stats.visited, 2);
    assert_eq!(stats.recomputed, 1);
    assert_eq!(result.surface().to_html(), "ab2");
}

#[test]
fn rerender_replaces_self() {
    let data = Model::new(json!({ "name": "World" }));
    let mut result = render(r#"[["text","Hello "],["unknown",["name"],false]]"#, &data);

    let stats = result.rerender(json!({ "name": "Venus" })).unwrap();

    assert_eq!(stats.applied, 1);
    assert_eq!(result.surface().to_html(), "Hello Venus");
    assert_eq!(data.get().get("name").as_str(), Some("Venus"));
}

#[test]
fn null_attribute_is_removed_and_restored() {
    let data = Model::new(json!({ "href": null }));
    let mut result = render(
        r#"[["openElement", "a"], ["dynamicAttr", "href", ["get", "href"], null], ["closeElement"]]"#,
        &data,
    );
    assert_eq!(result.surface().to_html(), "<a></a>");

    data.set_path("href", "/home");
    result.revalidate().unwrap();
    assert_eq!(result.surface().to_html(), r#"<a href="/home"></a>"#);

    data.set_path("href", json!(null));
    result.revalidate().unwrap();
    assert_eq!(result.surface().to_html(), "<a></a>");
    assert_eq!(
        result.surface().log().last().map(String::as_str),
        Some("remove_attribute <a> href")
    );
}

#[test]
fn updates_are_proportional_to_changed_inputs() {
    let items: Vec<String> = (0..50).map(|i| format!("item{}", i)).collect();
    let statements: Vec<serde_json::Value> = items
        .iter()
        .map(|key| json!(["unknown", ["items", key]]))
        .collect();
    let values: serde_json::Map<String, serde_json::Value> =
        items.iter().map(|key| (key.clone(), json!(key))).collect();
    let data = Model::new(json!({ "items": values }));
    let mut result = Template::from_json_value(json!(statements))
        .unwrap()
        .render(
            &Environment::new(),
            data.clone(),
            MemorySurface::new(),
            RenderOptions::default(),
        )
        .unwrap();

    data.set_path("items.item7", "changed");
    let stats = result.revalidate().unwrap();

    assert_eq!(stats.visited, 50);
    assert_eq!(stats.applied, 1);
}

#[test]
fn models_read_through_nested_paths() {
    let data = Model::new(json!({ "user": { "address": { "city": "Oslo" } } }));
    let mut result = render(r#"[["unknown", "user.address.city"]]"#, &data);

    data.set_path("user.address.city", "Bergen");
    result.revalidate().unwrap();

    assert_eq!(result.surface().to_html(), "Bergen");
}

#[test]
fn properties_are_set_again_only_when_their_value_changes() {
    let data = Model::new(json!({ "c": true, "n": 1 }));
    let mut result = render(
        r#"[
            ["openElement", "input"],
            ["dynamicProp", "checked", ["get", "c"]],
            ["closeElement"],
            ["unknown", "n"]
        ]"#,
        &data,
    );
    let set_property_count = |result: &TopLevelRenderResult<MemorySurface>| {
        result
            .surface()
            .log()
            .iter()
            .filter(|line| line.starts_with("set_property"))
            .count()
    };
    assert_eq!(set_property_count(&result), 1);

    data.set_path("n", 2);
    result.revalidate().unwrap();
    assert_eq!(set_property_count(&result), 1);

    data.set_path("c", false);
    let stats = result.revalidate().unwrap();
    assert_eq!(stats.applied, 1);
    assert_eq!(set_property_count(&result), 2);
    assert_eq!(
        result.surface().log().last().map(String::as_str),
        Some("set_property <input> checked=false")
    );
}

#[test]
fn nan_output_is_not_rewritten() {
    let mut env = Environment::new();
    env.register_helper("ratio", Helper::simple(|_| Ok(Value::Float(f64::NAN))));
    let data = Model::new(json!({ "n": 1 }));
    let mut result = Template::from_json(r#"[["inline", "ratio", [["get", "n"]], [], false]]"#)
        .unwrap()
        .render(&env, data.clone(), MemorySurface::new(), RenderOptions::default())
        .unwrap();
    let count = result.surface().mutation_count();

    data.set_path("n", 2);
    let stats = result.revalidate().unwrap();

    assert_eq!(result.surface().to_html(), "NaN");
    assert_eq!((stats.recomputed, stats.applied), (1, 0));
    assert_eq!(result.surface().mutation_count(), count);
}
