#![forbid(unsafe_code)]

//! Integration tests: toggle group selection through rendered markup.

use serde_json::json;
use weave_core::{Error, Params};
use weave_harness::{TestContext, init_tracing};
use weave_widgets::components::ToggleGroup;

fn mount(ctx: &TestContext, mode: &str) -> weave_harness::RenderedComponent<ToggleGroup> {
    init_tracing();
    let params = Params::new()
        .with("SelectionMode", mode)
        .with("Items", json!(["1", "2", "3"]));
    ctx.render_with(|_| ToggleGroup::from_params(&params)).unwrap()
}

fn selected(comp: &weave_harness::RenderedComponent<ToggleGroup>) -> Vec<String> {
    comp.find_all(".weave-toggle-item-selected")
        .unwrap()
        .iter()
        .map(|el| el.text_content())
        .collect()
}

#[test]
fn toggle_mode_clears_on_reclick() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, "Toggle");
    assert!(selected(&comp).is_empty());

    comp.click("button[data-value=1]").unwrap();
    assert_eq!(selected(&comp), ["1"]);
    comp.click("button[data-value=2]").unwrap();
    assert_eq!(selected(&comp), ["2"]);
    comp.click("button[data-value=2]").unwrap();
    assert!(selected(&comp).is_empty());
    assert_eq!(comp.text(".weave-toggle-group-value").unwrap(), "");
}

#[test]
fn multi_mode_displays_click_order() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, "Multi");
    for item in ["2", "1", "3"] {
        comp.click(&format!("button[data-value=\"{item}\"]")).unwrap();
    }
    assert_eq!(comp.text(".weave-toggle-group-value").unwrap(), "2, 1, 3");
    comp.click("button[data-value=\"1\"]").unwrap();
    assert_eq!(comp.text(".weave-toggle-group-value").unwrap(), "2, 3");
    // Declaration order in markup, selection order in the summary.
    assert_eq!(selected(&comp), ["2", "3"]);
}

#[test]
fn each_click_renders_once() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, "Single");
    assert_eq!(comp.render_count(), 1);
    comp.click("button[data-value=1]").unwrap();
    assert_eq!(comp.render_count(), 2);
    // Re-clicking in single mode changes nothing and does not re-render.
    comp.click("button[data-value=1]").unwrap();
    assert_eq!(comp.render_count(), 2);
}

#[test]
fn parent_value_binding_drives_markup() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, "Single");
    comp.instance().value().set(Some("3".into()));
    assert_eq!(selected(&comp), ["3"]);
    assert_eq!(
        comp.find("button[aria-pressed=true]").unwrap().get_attr("data-value").as_deref(),
        Some("3")
    );
}

#[test]
fn spacing_and_density_classes() {
    let ctx = TestContext::new();
    let params = Params::new()
        .with("Items", json!(["a"]))
        .with("Spacing", 0)
        .with("Density", "Comfortable")
        .with("Class", "toolbar");
    let comp = ctx.render_with(|_| ToggleGroup::from_params(&params)).unwrap();
    assert!(comp.exists(".weave-toggle-group.gap-0.toolbar").unwrap());
    assert!(comp.exists("div[role=group] > button.weave-toggle-item.px-4").unwrap());
}

#[test]
fn invalid_mode_fails_before_mount() {
    let ctx = TestContext::new();
    let params = Params::new()
        .with("SelectionMode", "Sideways")
        .with("Items", json!(["a"]));
    let err = ctx.render_with(|_| ToggleGroup::from_params(&params)).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidParameterType { ref property, ref source_type, ref target_type, .. }
            if property == "SelectionMode" && source_type == "string" && target_type == "SelectionMode"
    ));
    assert!(err.to_string().contains("SelectionMode"));
}

#[test]
fn unknown_selector_and_missing_handler_are_errors() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, "Single");
    assert!(matches!(comp.click(".nope"), Err(Error::ElementNotFound { .. })));
    assert!(matches!(
        comp.click(".weave-toggle-group-value"),
        Err(Error::NoHandler { ref event, .. }) if event == "click"
    ));
    assert!(matches!(comp.find("li >"), Err(Error::InvalidSelector { .. })));
}

#[test]
fn disposed_mount_stops_rendering() {
    let ctx = TestContext::new();
    let mut comp = mount(&ctx, "Multi");
    comp.click("button[data-value=1]").unwrap();
    comp.dispose();
    let before = comp.markup();
    // Handlers still exist in the last tree but act on disposed state.
    comp.click("button[data-value=2]").unwrap();
    assert_eq!(comp.markup(), before);
    assert_eq!(comp.instance().selection().selected(), ["1"]);
}
