#![forbid(unsafe_code)]

//! Markup tree produced by component views.
//!
//! An [`Element`] is an HTML-like node: a tag, an ordered class list, ordered
//! attributes, child nodes and event handlers. Views rebuild the tree on every
//! render; handlers are closures over the component's shared state, so the
//! harness can dispatch an event against the current tree and let the render
//! trigger produce the next one.
//!
//! # Invariants
//!
//! 1. Class names are unique within an element and keep insertion order.
//! 2. Setting an attribute twice keeps its first position and the last value.
//! 3. [`Element::to_markup`] is deterministic for a given tree.

use std::fmt;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::event::{DomEvent, EventKind};

/// Event handler attached to an element.
pub type Handler = Rc<dyn Fn(&DomEvent)>;

/// A child of an [`Element`].
#[derive(Clone, Debug)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An HTML-like element.
#[derive(Clone)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
    handlers: Vec<(EventKind, Handler)>,
}

impl Element {
    /// Create an empty element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Set the `id` attribute.
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Add one class, or several separated by whitespace.
    #[must_use]
    pub fn class(mut self, class: impl AsRef<str>) -> Self {
        for name in class.as_ref().split_whitespace() {
            if !self.classes.iter().any(|c| c == name) {
                self.classes.push(name.to_owned());
            }
        }
        self
    }

    /// Add `class` only when `cond` holds.
    #[must_use]
    pub fn class_if(self, class: impl AsRef<str>, cond: bool) -> Self {
        if cond { self.class(class) } else { self }
    }

    /// Set an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Set a boolean attribute (present with an empty value) when `on` holds.
    #[must_use]
    pub fn flag(self, name: impl Into<String>, on: bool) -> Self {
        if on { self.attr(name, "") } else { self }
    }

    /// Append a text node.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Append several child elements.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    /// Attach a handler for `kind`. A later handler for the same kind replaces it.
    #[must_use]
    pub fn on(mut self, kind: EventKind, handler: impl Fn(&DomEvent) + 'static) -> Self {
        self.handlers.retain(|(k, _)| *k != kind);
        self.handlers.push((kind, Rc::new(handler)));
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Value of an attribute. `class` is answered from the class list.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<String> {
        if name == "class" {
            return (!self.classes.is_empty()).then(|| self.classes.join(" "));
        }
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    #[must_use]
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    #[must_use]
    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Handler registered for `kind`, if any.
    #[must_use]
    pub fn handler(&self, kind: EventKind) -> Option<Handler> {
        self.handlers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, h)| Rc::clone(h))
    }

    /// Concatenated text of this element and all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Serialize to an HTML-like string.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (name, value) in &self.attrs {
            if value.is_empty() {
                let _ = write!(out, " {name}");
            } else {
                let _ = write!(out, " {name}=\"{}\"", escape(value));
            }
        }
        if self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(&escape(t)),
                Node::Element(e) => e.write_markup(out),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }

    /// Short description such as `button#save.primary` for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = self.tag.clone();
        if let Some(id) = self.get_attr("id") {
            out.push('#');
            out.push_str(&id);
        }
        for class in &self.classes {
            out.push('.');
            out.push_str(class);
        }
        out
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("classes", &self.classes)
            .field("attrs", &self.attrs)
            .field(
                "handlers",
                &self.handlers.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            )
            .field("children", &self.children)
            .finish()
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn classes_are_deduplicated_in_order() {
        let el = Element::new("div").class("a b").class("b").class_if("c", true);
        assert_eq!(el.classes(), ["a", "b", "c"]);
        assert_eq!(el.get_attr("class").as_deref(), Some("a b c"));
    }

    #[test]
    fn attr_overwrite_keeps_position() {
        let el = Element::new("input")
            .attr("type", "text")
            .attr("value", "x")
            .attr("type", "search");
        assert_eq!(
            el.attrs(),
            [
                ("type".to_string(), "search".to_string()),
                ("value".to_string(), "x".to_string())
            ]
        );
    }

    #[test]
    fn markup_serialization() {
        let el = Element::new("ul")
            .class("list")
            .child(Element::new("li").text("a < b"))
            .child(Element::new("li").flag("disabled", true));
        assert_eq!(
            el.to_markup(),
            "<ul class=\"list\"><li>a &lt; b</li><li disabled /></ul>"
        );
    }

    #[test]
    fn text_content_is_recursive() {
        let el = Element::new("p")
            .text("Hello, ")
            .child(Element::new("b").text("world"));
        assert_eq!(el.text_content(), "Hello, world");
    }

    #[test]
    fn later_handler_replaces_earlier() {
        let hits = Rc::new(Cell::new(0));
        let h1 = Rc::clone(&hits);
        let h2 = Rc::clone(&hits);
        let el = Element::new("button")
            .on(EventKind::Click, move |_| h1.set(h1.get() + 1))
            .on(EventKind::Click, move |_| h2.set(h2.get() + 10));
        let handler = el.handler(EventKind::Click).expect("handler");
        handler(&DomEvent::click());
        assert_eq!(hits.get(), 10);
        assert!(el.handler(EventKind::Blur).is_none());
    }

    #[test]
    fn describe_includes_id_and_classes() {
        let el = Element::new("button").id("save").class("primary");
        assert_eq!(el.describe(), "button#save.primary");
    }

    proptest::proptest! {
        #[test]
        fn text_and_attr_values_are_escaped(text in ".*", value in ".*") {
            let el = Element::new("p").attr("title", value.clone()).text(text.clone());
            let markup = el.to_markup();
            proptest::prop_assert_eq!(el.text_content(), text);
            proptest::prop_assert_eq!(markup.matches('<').count(), 2);
            proptest::prop_assert_eq!(markup.matches('"').count(), if value.is_empty() { 0 } else { 2 });
        }
    }
}
