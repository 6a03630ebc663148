//! Lexical scope tracking during a walk.
//!
//! The tracker keeps two parallel stacks:
//!
//! - the elements of the enclosing scope-owning declarations (an entry may
//!   be absent when a declaration has no element)
//! - one anonymous-declaration counter per scope, used to synthesize ids
//!   `"0"`, `"1"`, ... for anonymous functions
//!
//! The unit itself owns a counter but no element, so top-level anonymous
//! functions are numbered too.

use relindex_core::element::Element;

/// Stack of enclosing elements plus per-scope anonymous counters.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    elements: Vec<Option<Element>>,
    anonymous_counts: Vec<u32>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        ScopeTracker::default()
    }

    /// Open the unit-level scope.
    pub fn begin_unit(&mut self) {
        self.anonymous_counts.push(0);
    }

    /// Close the unit-level scope.
    ///
    /// Returns the number of scopes still open afterwards. Both stacks are
    /// cleared, so a non-zero result never leaks into another walk.
    pub fn end_unit(&mut self) -> usize {
        self.anonymous_counts.pop();
        let residual = self.anonymous_counts.len().max(self.elements.len());
        self.anonymous_counts.clear();
        self.elements.clear();
        residual
    }

    /// Enter a scope owned by `element`.
    pub fn enter(&mut self, element: Option<Element>) {
        self.elements.push(element);
        self.anonymous_counts.push(0);
    }

    /// Leave the innermost scope and return its element.
    pub fn exit(&mut self) -> Option<Element> {
        self.anonymous_counts.pop();
        self.elements.pop().flatten()
    }

    /// Innermost present element, or `None` at the top of the unit.
    pub fn innermost(&self) -> Option<&Element> {
        self.elements.iter().rev().find_map(Option::as_ref)
    }

    /// Next ordinal for an anonymous declaration in the current scope.
    pub fn next_anonymous_ordinal(&mut self) -> u32 {
        match self.anonymous_counts.last_mut() {
            Some(count) => {
                let ordinal = *count;
                *count += 1;
                ordinal
            }
            None => 0,
        }
    }

    /// Number of open scope-owning declarations.
    pub fn depth(&self) -> usize {
        self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relindex_core::resource::Resource;

    fn element(id: &str) -> Element {
        Element::new(Resource::new("a.dart"), id)
    }

    #[test]
    fn innermost_skips_absent_entries() {
        let mut scope = ScopeTracker::new();
        scope.begin_unit();
        assert_eq!(scope.innermost(), None);
        scope.enter(Some(element("A")));
        scope.enter(None);
        assert_eq!(scope.innermost(), Some(&element("A")));
        assert_eq!(scope.exit(), None);
        assert_eq!(scope.exit(), Some(element("A")));
        assert_eq!(scope.end_unit(), 0);
    }

    #[test]
    fn anonymous_ordinals_are_per_scope() {
        let mut scope = ScopeTracker::new();
        scope.begin_unit();
        assert_eq!(scope.next_anonymous_ordinal(), 0);
        scope.enter(Some(element("A.m")));
        assert_eq!(scope.next_anonymous_ordinal(), 0);
        assert_eq!(scope.next_anonymous_ordinal(), 1);
        scope.enter(Some(element("A.m.1")));
        assert_eq!(scope.next_anonymous_ordinal(), 0);
        scope.exit();
        assert_eq!(scope.next_anonymous_ordinal(), 2);
        scope.exit();
        assert_eq!(scope.next_anonymous_ordinal(), 1);
    }

    #[test]
    fn end_unit_reports_and_clears_residual_scopes() {
        let mut scope = ScopeTracker::new();
        scope.begin_unit();
        scope.enter(Some(element("A")));
        scope.enter(Some(element("A.m")));
        assert_eq!(scope.end_unit(), 2);
        assert_eq!(scope.depth(), 0);
        assert_eq!(scope.innermost(), None);
        scope.begin_unit();
        assert_eq!(scope.end_unit(), 0);
    }
}
