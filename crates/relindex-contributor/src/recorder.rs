//! Forwarding relationships to the store.

use relindex_core::element::Element;
use relindex_core::location::Location;
use relindex_core::relationship::RelationshipKind;
use relindex_core::resource::Resource;
use relindex_core::store::IndexStore;

/// Records relationships contributed by one resource, counting them and
/// optionally keeping a human-readable trace.
pub struct RelationshipRecorder<'a> {
    store: &'a dyn IndexStore,
    resource: Resource,
    count: usize,
    trace: Option<Vec<String>>,
}

impl<'a> RelationshipRecorder<'a> {
    pub fn new(store: &'a dyn IndexStore, resource: Resource, trace: bool) -> Self {
        RelationshipRecorder {
            store,
            resource,
            count: 0,
            trace: trace.then(Vec::new),
        }
    }

    /// Record `subject --kind--> location`.
    ///
    /// An absent subject records nothing; returns whether a relationship was
    /// recorded.
    pub fn record(
        &mut self,
        subject: Option<&Element>,
        kind: RelationshipKind,
        location: Location,
    ) -> bool {
        let Some(subject) = subject else {
            return false;
        };
        if let Some(trace) = &mut self.trace {
            trace.push(format!("   {} {} {}", subject, kind, location));
        }
        self.store
            .record_relationship(&self.resource, subject, kind, location);
        self.count += 1;
        true
    }

    /// Append a line to the trace, if tracing.
    pub fn note(&mut self, line: impl FnOnce() -> String) {
        if let Some(trace) = &mut self.trace {
            trace.push(line());
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }

    pub fn into_trace(self) -> Option<Vec<String>> {
        self.trace
    }
}
