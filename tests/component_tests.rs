use morphic::{
    Environment, Helper, MemorySurface, Model, RenderOptions, Template, TopLevelRenderResult,
};
use serde_json::json;

const CARD: &str = r#"[
    { "statements": [["text", "Body of "], ["unknown", "name"]] },
    { "statements": [
        ["component", "x-card", ["class", "card", "hidden", null, "title", ["get", "title"]], 0, null]
    ] }
]"#;

fn render(env: &Environment, data: &Model) -> TopLevelRenderResult<MemorySurface> {
    Template::from_json(CARD)
        .unwrap()
        .render(env, data.clone(), MemorySurface::new(), RenderOptions::default())
        .unwrap()
}

fn card_helper() -> Helper {
    Helper::block(|args, blocks| {
        let title = args.hash_value("title").cloned().unwrap_or_default();
        blocks.yield_default(vec![title]);
        Ok(())
    })
}

#[test]
fn unregistered_tag_renders_as_an_element() {
    let data = Model::new(json!({ "name": "Ada", "title": "Profile" }));
    let result = render(&Environment::new(), &data);

    assert_eq!(
        result.surface().to_html(),
        r#"<x-card class="card" title="Profile">Body of Ada</x-card>"#
    );
}

#[test]
fn fallback_attributes_and_body_update() {
    let data = Model::new(json!({ "name": "Ada", "title": "Profile" }));
    let mut result = render(&Environment::new(), &data);

    data.set_path("title", "Account");
    data.set_path("name", "Grace");
    let stats = result.revalidate().unwrap();

    assert_eq!(
        result.surface().to_html(),
        r#"<x-card class="card" title="Account">Body of Grace</x-card>"#
    );
    assert_eq!(stats.applied, 2);
    let log = result.surface().log();
    assert_eq!(
        log.iter()
            .filter(|line| line.starts_with("set_attribute <x-card> class="))
            .count(),
        1
    );
}

#[test]
fn registered_tag_invokes_the_block_helper() {
    let mut env = Environment::new();
    env.register_helper("x-card", card_helper());
    let template = Template::from_json(
        r#"[
            { "statements": [["text", "Card: "], ["unknown", "heading"]], "locals": ["heading"] },
            { "statements": [["component", "x-card", ["title", ["get", "title"]], 0, null]] }
        ]"#,
    )
    .unwrap();
    let data = Model::new(json!({ "title": "Profile" }));
    let mut result = template
        .render(&env, data.clone(), MemorySurface::new(), RenderOptions::default())
        .unwrap();
    assert_eq!(result.surface().to_html(), "Card: Profile");
    assert!(result.surface().find_element("x-card").is_none());

    data.set_path("title", "Account");
    result.revalidate().unwrap();
    assert_eq!(result.surface().to_html(), "Card: Account");
}

#[test]
fn registration_is_fixed_for_the_lifetime_of_a_render() {
    let mut env = Environment::new();
    let data = Model::new(json!({ "name": "Ada", "title": "Profile" }));
    let mut first = render(&env, &data);

    env.register_helper("x-card", card_helper());
    data.set_path("name", "Grace");
    first.revalidate().unwrap();
    assert_eq!(
        first.surface().to_html(),
        r#"<x-card class="card" title="Profile">Body of Grace</x-card>"#
    );

    let second = render(&env, &data);
    assert_eq!(second.surface().to_html(), "Body of Grace");

    env.unregister_helper("x-card");
    let third = render(&env, &data);
    assert!(third.surface().find_element("x-card").is_some());
}

#[test]
fn component_without_body_is_an_empty_element() {
    let template =
        Template::from_json(r#"[["component", "x-icon", ["name", "star"], null, null]]"#).unwrap();
    let result = template
        .render(
            &Environment::new(),
            Model::default(),
            MemorySurface::new(),
            RenderOptions::default(),
        )
        .unwrap();

    assert_eq!(result.surface().to_html(), r#"<x-icon name="star"></x-icon>"#);
    assert!(result.surface().slots().is_empty());
}

#[test]
fn empty_body_adds_no_contents() {
    let template = Template::from_json(
        r#"[
            { "statements": [] },
            { "statements": [["component", "x-a", [], 0, null]] }
        ]"#,
    )
    .unwrap();
    let result = template
        .render(
            &Environment::new(),
            Model::default(),
            MemorySurface::new(),
            RenderOptions::default(),
        )
        .unwrap();

    assert_eq!(result.surface().to_html(), "<x-a></x-a>");
    assert!(result.surface().slots().is_empty());
    assert_eq!(result.result().morph_count(), 1);
}
