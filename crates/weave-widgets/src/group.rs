#![forbid(unsafe_code)]

//! Ordered parent-child registry.
//!
//! Radio groups, toggle groups and expansion panels register their children
//! with the parent. Registration order is the order used for "nth item"
//! addressing and for iteration.
//!
//! # Invariants
//!
//! 1. Registration is idempotent: re-registering an existing member returns
//!    `false` and keeps its original position.
//! 2. Unregistering preserves the relative order of the remaining members.

/// Ordered set of child handles.
#[derive(Debug, Clone)]
pub struct Group<H> {
    members: Vec<H>,
}

impl<H> Default for Group<H> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<H: PartialEq> Group<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `member` unless already present. Returns whether it was added.
    pub fn register(&mut self, member: H) -> bool {
        if self.members.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Remove `member`. Returns whether it was present.
    pub fn unregister(&mut self, member: &H) -> bool {
        match self.index_of(member) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every member matching `pred`.
    pub fn retain(&mut self, pred: impl FnMut(&H) -> bool) {
        self.members.retain(pred);
    }

    #[must_use]
    pub fn contains(&self, member: &H) -> bool {
        self.members.contains(member)
    }

    #[must_use]
    pub fn index_of(&self, member: &H) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }

    /// Member at registration position `index`.
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<&H> {
        self.members.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, H> {
        self.members.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

impl<'a, H: PartialEq> IntoIterator for &'a Group<H> {
    type Item = &'a H;
    type IntoIter = std::slice::Iter<'a, H>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
