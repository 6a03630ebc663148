//! Locations of names and operator tokens.
//!
//! Name locations come straight from node spans. Operator call sites have no
//! node for the operator token, so its span is recovered by searching the
//! unit's source text between the operands. The search is purely textual:
//! a matching token inside a comment in that window is matched too.
//!
//! Source text is fetched at most once per unit. If the fetch fails, textual
//! recovery is disabled for the rest of the walk and every operator lookup
//! misses.

use relindex_ast::SourceRange;
use relindex_core::element::Element;
use relindex_core::location::Location;
use relindex_core::resource::{SourceProvider, UnitHandle};
use relindex_core::text::find_in_window;
use tracing::error;

/// State of the lazily fetched source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCache {
    Unfetched,
    Available(String),
    Missing,
}

/// Builds locations for one unit.
pub struct LocationResolver<'a> {
    unit: UnitHandle,
    sources: &'a dyn SourceProvider,
    library_element: Element,
    cache: SourceCache,
}

impl<'a> LocationResolver<'a> {
    pub fn new(unit: UnitHandle, sources: &'a dyn SourceProvider, library_element: Element) -> Self {
        LocationResolver {
            unit,
            sources,
            library_element,
            cache: SourceCache::Unfetched,
        }
    }

    /// Location of `range`, owned by `scope` or by the library element at the
    /// top of the unit.
    pub fn location(&self, scope: Option<&Element>, range: SourceRange) -> Location {
        self.at(scope, range.offset, range.length)
    }

    pub fn at(&self, scope: Option<&Element>, offset: usize, length: usize) -> Location {
        let element = scope.unwrap_or(&self.library_element).clone();
        Location::new(element, offset, length)
    }

    /// Source text of the unit, fetched on first use.
    pub fn source(&mut self) -> Option<&str> {
        if self.cache == SourceCache::Unfetched {
            self.cache = match self.sources.source(&self.unit) {
                Ok(text) => SourceCache::Available(text),
                Err(err) => {
                    error!(unit = %self.unit, error = %err, "could not access source; operator locations disabled");
                    SourceCache::Missing
                }
            };
        }
        match &self.cache {
            SourceCache::Available(text) => Some(text.as_str()),
            SourceCache::Unfetched | SourceCache::Missing => None,
        }
    }

    /// Offset of the first `token` lying entirely within `[start, end)`.
    pub fn find_token(&mut self, token: &str, start: usize, end: usize) -> Option<usize> {
        find_in_window(self.source()?, token, start, end)
    }

    /// Span from `[` to `]` of an index operator.
    ///
    /// `[` is searched between the end of the target and the key, `]`
    /// between the end of the key and the end of the expression.
    pub fn bracket_span(
        &mut self,
        target: SourceRange,
        key: SourceRange,
        expression: SourceRange,
    ) -> Option<SourceRange> {
        let open = self.find_token("[", target.end(), key.offset)?;
        let close = self.find_token("]", key.end(), expression.end())?;
        Some(SourceRange::between(open, close + 1))
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relindex_core::error::LookupError;
    use relindex_core::resource::Resource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        text: Option<&'static str>,
        fetches: AtomicUsize,
    }

    impl SourceProvider for CountingSource {
        fn source(&self, unit: &UnitHandle) -> Result<String, LookupError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.text
                .map(str::to_string)
                .ok_or_else(|| LookupError::SourceUnavailable {
                    unit: unit.clone(),
                    reason: "deleted".to_string(),
                })
        }
    }

    fn library() -> Element {
        Element::library(Resource::new("a.dart"))
    }

    fn provider(text: Option<&'static str>) -> CountingSource {
        CountingSource {
            text,
            fetches: AtomicUsize::new(0),
        }
    }

    #[test]
    fn location_falls_back_to_library_element() {
        let sources = provider(Some(""));
        let resolver = LocationResolver::new(UnitHandle::new("a.dart"), &sources, library());
        let loc = resolver.location(None, SourceRange::new(3, 2));
        assert_eq!(loc.element, library());
        let scoped = Element::new(Resource::new("a.dart"), "A");
        let loc = resolver.location(Some(&scoped), SourceRange::new(3, 2));
        assert_eq!(loc.element, scoped);
        assert_eq!((loc.offset, loc.length), (3, 2));
    }

    #[test]
    fn source_is_fetched_once() {
        let sources = provider(Some("a + b + c"));
        let mut resolver = LocationResolver::new(UnitHandle::new("a.dart"), &sources, library());
        assert_eq!(resolver.find_token("+", 1, 4), Some(2));
        assert_eq!(resolver.find_token("+", 5, 8), Some(6));
        assert_eq!(sources.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_source_disables_recovery_without_refetching() {
        let sources = provider(None);
        let mut resolver = LocationResolver::new(UnitHandle::new("a.dart"), &sources, library());
        assert_eq!(resolver.find_token("+", 0, 10), None);
        assert_eq!(resolver.find_token("+", 0, 10), None);
        assert_eq!(resolver.cache(), &SourceCache::Missing);
        assert_eq!(sources.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bracket_span_covers_key() {
        let sources = provider(Some("list[ i ]"));
        let mut resolver = LocationResolver::new(UnitHandle::new("a.dart"), &sources, library());
        let span = resolver.bracket_span(
            SourceRange::new(0, 4),
            SourceRange::new(6, 1),
            SourceRange::new(0, 9),
        );
        assert_eq!(span, Some(SourceRange::new(4, 5)));
    }
}
