#![forbid(unsafe_code)]

//! Integration tests: expansion panels and their exclusive group.

use serde_json::json;
use weave_core::Params;
use weave_harness::{RenderedComponent, TestContext};
use weave_widgets::components::ExpansionPanels;

fn mount(ctx: &TestContext, multi: bool) -> RenderedComponent<ExpansionPanels> {
    let params = Params::new().with("MultiExpansion", multi).with(
        "Panels",
        json!([
            { "Title": "Shipping", "Text": "Ships in two days" },
            { "Title": "Returns", "Text": "Thirty day returns" },
            { "Title": "Warranty", "Text": "One year", "Expanded": true },
        ]),
    );
    ctx.render_with(|app| ExpansionPanels::from_params(&params, app)).unwrap()
}

fn expanded_titles(comp: &RenderedComponent<ExpansionPanels>) -> Vec<String> {
    comp.find_all(".weave-panel-expanded > .weave-expand-panel-header")
        .unwrap()
        .iter()
        .map(|el| el.text_content())
        .collect()
}

#[test]
fn initially_expanded_panel_shows_content() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, false);
    assert_eq!(expanded_titles(&comp), ["Warranty"]);
    assert_eq!(comp.find_all(".weave-expand-panel-content").unwrap().len(), 1);
    assert_eq!(comp.text(".weave-expand-panel-content").unwrap(), "One year");
}

#[test]
fn expanding_one_collapses_the_rest() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, false);
    comp.click("[data-index=\"0\"] > button").unwrap();
    assert_eq!(expanded_titles(&comp), ["Shipping"]);
    comp.click("[data-index=\"1\"] > button").unwrap();
    assert_eq!(expanded_titles(&comp), ["Returns"]);
    comp.click("[data-index=\"1\"] > button").unwrap();
    assert!(expanded_titles(&comp).is_empty());
}

#[test]
fn multi_expansion_keeps_panels_open() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, true);
    comp.click("[data-index=\"0\"] > button").unwrap();
    assert_eq!(expanded_titles(&comp), ["Shipping", "Warranty"]);

    comp.instance().expand_all().unwrap();
    assert_eq!(comp.find_all(".weave-panel-expanded").unwrap().len(), 3);
    comp.instance().collapse_all();
    assert!(expanded_titles(&comp).is_empty());
    assert!(!comp.exists(".weave-expand-panel-content").unwrap());
}

#[test]
fn header_reflects_state_in_aria() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, false);
    let headers = comp.find_all(".weave-expand-panel-header").unwrap();
    let aria: Vec<_> = headers.iter().filter_map(|h| h.get_attr("aria-expanded")).collect();
    assert_eq!(aria, ["false", "false", "true"]);
}

#[test]
fn panel_state_outlives_rerender() {
    let ctx = TestContext::new();
    let comp = mount(&ctx, false);
    let warranty = comp.instance().panel(2).unwrap().clone();
    comp.click("[data-index=\"0\"] > button").unwrap();
    assert!(!warranty.is_open());
    assert_eq!(warranty.group().map(|g| g.open_index()), Some(Some(0)));
}
