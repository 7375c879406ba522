use crate::{
    diagnostics::{
        HelperError, LookupError, RenderError, SpecificationError,
        error_codes::{INVALID_TEMPLATE_ID, UNRESOLVED_PATH},
    },
    surface::SurfaceError,
};

#[test]
fn specification_error_display_includes_location_and_hint() {
    let err = SpecificationError::new(INVALID_TEMPLATE_ID, "template id 4 is out of range")
        .at_statement(2, Some("block"))
        .in_template(1)
        .with_hint("child templates must precede their parent");

    assert_eq!(
        err.to_string(),
        "[T005] INVALID TEMPLATE ID: template id 4 is out of range \
         (template 1, statement 2, `block`)\nhint: child templates must precede their parent"
    );
}

#[test]
fn innermost_location_wins() {
    let err = SpecificationError::new(INVALID_TEMPLATE_ID, "bad")
        .at_statement(0, Some("component"))
        .at_statement(7, Some("block"));

    assert_eq!(err.statement, Some(0));
    assert_eq!(err.kind.as_deref(), Some("component"));
}

#[test]
fn lookup_error_names_statement_kind_and_path() {
    let err = LookupError::new(UNRESOLVED_PATH, "unknown", "person.name");
    assert_eq!(
        err.to_string(),
        "[L001] UNRESOLVED PATH: `person.name` in unknown statement"
    );
    assert_eq!(RenderError::from(err).code(), Some("L001"));
}

#[test]
fn helper_surface_errors_pass_through_unmodified() {
    let surface = SurfaceError::msg("element tree is detached");
    let err = RenderError::from_helper("focus", HelperError::from(surface));

    match err {
        RenderError::OutputSurface(source) => {
            assert_eq!(source.to_string(), "element tree is detached")
        }
        other => panic!("expected surface error, got {:?}", other),
    }
}

#[test]
fn helper_messages_keep_helper_path() {
    let err = RenderError::from_helper("format-date", HelperError::new("invalid date"));
    assert_eq!(err.to_string(), "helper `format-date` failed: invalid date");
    assert_eq!(err.code(), None);
}
