#![forbid(unsafe_code)]

//! A small CSS selector subset for locating elements in rendered markup.
//!
//! Supported: `tag`, `*`, `#id`, `.class` (repeatable), `[attr]`,
//! `[attr=value]` (value optionally quoted), the descendant combinator
//! (whitespace) and the child combinator (`>`). Pseudo-classes are not
//! supported; index into [`find_all`](crate::RenderedComponent::find_all)
//! instead.

use std::fmt;
use std::str::FromStr;

use weave_core::{Element, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        if self.tag.as_deref().is_some_and(|t| t != el.tag()) {
            return false;
        }
        if self.id.is_some() && el.get_attr("id") != self.id {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| match &a.value {
            None => el.has_attr(&a.name),
            Some(v) => el.get_attr(&a.name).as_deref() == Some(v.as_str()),
        })
    }
}

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    /// Compounds left to right; the combinator links a compound to the one before it.
    parts: Vec<(Combinator, Compound)>,
}

impl Selector {
    /// Parse `input`.
    pub fn parse(input: &str) -> Result<Self> {
        Parser::new(input).parse()
    }

    /// The selector as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `el`, reached through `ancestors` (root first), matches.
    #[must_use]
    pub fn matches(&self, el: &Element, ancestors: &[&Element]) -> bool {
        self.matches_at(self.parts.len() - 1, el, ancestors)
    }

    fn matches_at(&self, index: usize, el: &Element, ancestors: &[&Element]) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(el) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => match ancestors.split_last() {
                Some((parent, rest)) => self.matches_at(index - 1, parent, rest),
                None => false,
            },
            Combinator::Descendant => (0..ancestors.len())
                .rev()
                .any(|i| self.matches_at(index - 1, ancestors[i], &ancestors[..i])),
        }
    }

    /// Every element under (and including) `root` that matches, in document order.
    #[must_use]
    pub fn select_all<'a>(&self, root: &'a Element) -> Vec<&'a Element> {
        let mut out = Vec::new();
        let mut ancestors = Vec::new();
        self.walk(root, &mut ancestors, &mut out);
        out
    }

    fn walk<'a>(&self, el: &'a Element, ancestors: &mut Vec<&'a Element>, out: &mut Vec<&'a Element>) {
        if self.matches(el, ancestors) {
            out.push(el);
        }
        ancestors.push(el);
        for child in el.child_elements() {
            self.walk(child, ancestors, out);
        }
        ancestors.pop();
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
        }
    }

    fn fail(&self, reason: impl Into<String>) -> Error {
        Error::InvalidSelector {
            selector: self.source.to_owned(),
            reason: reason.into(),
        }
    }

    fn parse(mut self) -> Result<Selector> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        loop {
            let saw_space = self.skip_whitespace();
            match self.chars.peek().copied() {
                None => break,
                Some('>') => {
                    self.chars.next();
                    if parts.is_empty() {
                        return Err(self.fail("'>' with nothing before it"));
                    }
                    combinator = Combinator::Child;
                    continue;
                }
                Some(_) => {
                    if !parts.is_empty() && !saw_space && combinator == Combinator::Descendant {
                        return Err(self.fail("expected a combinator between compounds"));
                    }
                }
            }
            let compound = self.compound()?;
            parts.push((combinator, compound));
            combinator = Combinator::Descendant;
        }
        if parts.is_empty() {
            return Err(self.fail("empty selector"));
        }
        if combinator == Combinator::Child {
            return Err(self.fail("trailing '>'"));
        }
        Ok(Selector {
            source: self.source.to_owned(),
            parts,
        })
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {
            skipped = true;
        }
        skipped
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_alphanumeric() || matches!(c, '-' | '_')) {
            out.push(c);
        }
        out
    }

    fn required_ident(&mut self, what: &str) -> Result<String> {
        let ident = self.ident();
        if ident.is_empty() {
            return Err(self.fail(format!("expected {what}")));
        }
        Ok(ident)
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        if self.chars.next_if_eq(&'*').is_none() {
            let tag = self.ident();
            if !tag.is_empty() {
                compound.tag = Some(tag.to_ascii_lowercase());
            }
        }
        loop {
            match self.chars.peek().copied() {
                Some('#') => {
                    self.chars.next();
                    compound.id = Some(self.required_ident("an id after '#'")?);
                }
                Some('.') => {
                    self.chars.next();
                    compound.classes.push(self.required_ident("a class after '.'")?);
                }
                Some('[') => {
                    self.chars.next();
                    compound.attrs.push(self.attribute()?);
                }
                Some(c) if c.is_whitespace() || c == '>' => break,
                None => break,
                Some(c) => return Err(self.fail(format!("unexpected '{c}'"))),
            }
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttrMatch> {
        self.skip_whitespace();
        let name = self.required_ident("an attribute name")?;
        self.skip_whitespace();
        let value = if self.chars.next_if_eq(&'=').is_some() {
            self.skip_whitespace();
            Some(self.attribute_value()?)
        } else {
            None
        };
        self.skip_whitespace();
        if self.chars.next_if_eq(&']').is_none() {
            return Err(self.fail("unclosed '['"));
        }
        Ok(AttrMatch { name, value })
    }

    fn attribute_value(&mut self) -> Result<String> {
        match self.chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut out = String::new();
                loop {
                    match self.chars.next() {
                        Some(c) if c == quote => return Ok(out),
                        Some(c) => out.push(c),
                        None => return Err(self.fail("unterminated quoted value")),
                    }
                }
            }
            _ => self.required_ident("an attribute value"),
        }
    }
}
