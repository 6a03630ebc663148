//! Index store contract and an in-memory implementation.
//!
//! The contributor only ever *writes* through [`IndexStore`]; persistence,
//! transactions and query planning belong to the store. [`MemoryIndex`] is
//! the store used by the CLI and the tests:
//!
//! - Per-resource contribution lists in emission order
//! - A postings list `(subject, kind) → locations` for queries
//! - Deterministic iteration (resources in sorted order)
//!
//! `MemoryIndex` is guarded by an `RwLock`, so one instance can be shared by
//! contributors running on different threads.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::element::Element;
use crate::location::Location;
use crate::relationship::{Relationship, RelationshipKind};
use crate::resource::Resource;

// ============================================================================
// Store Contract
// ============================================================================

/// Write side of the index.
///
/// A call either durably queues the relationship or, for stores that filter,
/// drops it; it never fails. Relationships for the same resource must be
/// applied in call order when the store is order-sensitive.
pub trait IndexStore: Send + Sync {
    /// Record that `element` has relationship `kind` with `location`,
    /// contributed by `resource`.
    fn record_relationship(
        &self,
        resource: &Resource,
        element: &Element,
        kind: RelationshipKind,
        location: Location,
    );
}

// ============================================================================
// MemoryIndex
// ============================================================================

#[derive(Debug, Default)]
struct MemoryIndexInner {
    /// resource → relationships contributed while indexing that resource.
    contributions: BTreeMap<Resource, Vec<Relationship>>,
    /// (subject, kind) → locations, in insertion order.
    locations: HashMap<(Element, RelationshipKind), Vec<Location>>,
    /// Total number of stored relationships.
    len: usize,
}

/// In-memory [`IndexStore`] with simple queries.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    inner: RwLock<MemoryIndexInner>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        MemoryIndex::default()
    }

    /// Number of stored relationships.
    pub fn len(&self) -> usize {
        self.read(|inner| inner.len)
    }

    /// Check if no relationships are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locations related to `element` by `kind`, in insertion order.
    pub fn locations(&self, element: &Element, kind: RelationshipKind) -> Vec<Location> {
        self.read(|inner| {
            inner
                .locations
                .get(&(element.clone(), kind))
                .cloned()
                .unwrap_or_default()
        })
    }

    /// Locations related to `element` by `kind`, each with the resource
    /// that contributed it, sorted by resource then emission order.
    pub fn contributed_locations(
        &self,
        element: &Element,
        kind: RelationshipKind,
    ) -> Vec<(Resource, Location)> {
        self.read(|inner| {
            inner
                .contributions
                .iter()
                .flat_map(|(resource, rels)| {
                    rels.iter()
                        .filter(|r| r.kind == kind && &r.subject == element)
                        .map(move |r| (resource.clone(), r.location.clone()))
                })
                .collect()
        })
    }

    /// Relationships contributed by `resource`, in emission order.
    pub fn contributions(&self, resource: &Resource) -> Vec<Relationship> {
        self.read(|inner| {
            inner
                .contributions
                .get(resource)
                .cloned()
                .unwrap_or_default()
        })
    }

    /// Resources that have contributed relationships, sorted.
    pub fn resources(&self) -> Vec<Resource> {
        self.read(|inner| inner.contributions.keys().cloned().collect())
    }

    /// Every stored relationship with its contributing resource, sorted by
    /// resource then emission order.
    pub fn all(&self) -> Vec<(Resource, Relationship)> {
        self.read(|inner| {
            inner
                .contributions
                .iter()
                .flat_map(|(resource, rels)| rels.iter().map(move |r| (resource.clone(), r.clone())))
                .collect()
        })
    }

    /// Remove everything contributed by `resource`.
    ///
    /// Returns the number of relationships removed.
    pub fn remove_resource(&self, resource: &Resource) -> usize {
        self.write(|inner| {
            let Some(removed) = inner.contributions.remove(resource) else {
                return 0;
            };
            for rel in &removed {
                let key = (rel.subject.clone(), rel.kind);
                if let Some(locations) = inner.locations.get_mut(&key) {
                    if let Some(pos) = locations.iter().position(|l| *l == rel.location) {
                        locations.remove(pos);
                    }
                    if locations.is_empty() {
                        inner.locations.remove(&key);
                    }
                }
            }
            inner.len -= removed.len();
            removed.len()
        })
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryIndexInner) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut MemoryIndexInner) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl IndexStore for MemoryIndex {
    fn record_relationship(
        &self,
        resource: &Resource,
        element: &Element,
        kind: RelationshipKind,
        location: Location,
    ) {
        self.write(|inner| {
            inner
                .locations
                .entry((element.clone(), kind))
                .or_default()
                .push(location.clone());
            inner
                .contributions
                .entry(resource.clone())
                .or_default()
                .push(Relationship::new(element.clone(), kind, location));
            inner.len += 1;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(resource: &str, id: &str) -> Element {
        Element::new(Resource::new(resource), id)
    }

    fn location(resource: &str, offset: usize) -> Location {
        Location::new(Element::library(Resource::new(resource)), offset, 1)
    }

    mod memory_index_tests {
        use super::*;

        #[test]
        fn record_and_query_by_subject() {
            let index = MemoryIndex::new();
            let a = Resource::new("a.dart");
            let m = element("a.dart", "A.m");

            index.record_relationship(&a, &m, RelationshipKind::IsInvokedByQualified, location("a.dart", 10));
            index.record_relationship(&a, &m, RelationshipKind::IsInvokedByQualified, location("a.dart", 20));
            index.record_relationship(&a, &m, RelationshipKind::IsOverriddenBy, location("a.dart", 30));

            assert_eq!(index.len(), 3);
            let calls = index.locations(&m, RelationshipKind::IsInvokedByQualified);
            assert_eq!(calls.iter().map(|l| l.offset).collect::<Vec<_>>(), vec![10, 20]);
            assert!(index
                .locations(&m, RelationshipKind::IsInvokedByUnqualified)
                .is_empty());
        }

        #[test]
        fn contributed_locations_carry_their_resource() {
            let index = MemoryIndex::new();
            let a = Resource::new("a.dart");
            let b = Resource::new("b.dart");
            let m = element("a.dart", "A.m");

            index.record_relationship(&b, &m, RelationshipKind::IsInvokedByQualified, location("a.dart", 7));
            index.record_relationship(&a, &m, RelationshipKind::IsInvokedByQualified, location("a.dart", 3));
            index.record_relationship(&a, &m, RelationshipKind::IsOverriddenBy, location("a.dart", 9));

            let found = index.contributed_locations(&m, RelationshipKind::IsInvokedByQualified);
            assert_eq!(
                found
                    .iter()
                    .map(|(resource, l)| (resource.id(), l.offset))
                    .collect::<Vec<_>>(),
                vec![("a.dart", 3), ("b.dart", 7)]
            );
        }

        #[test]
        fn contributions_keep_emission_order() {
            let index = MemoryIndex::new();
            let a = Resource::new("a.dart");
            let lib = Element::library(a.clone());
            for offset in [5, 1, 3] {
                index.record_relationship(&a, &lib, RelationshipKind::DefinesClass, location("a.dart", offset));
            }
            let offsets: Vec<_> = index
                .contributions(&a)
                .into_iter()
                .map(|r| r.location.offset)
                .collect();
            assert_eq!(offsets, vec![5, 1, 3]);
        }

        #[test]
        fn remove_resource_drops_only_its_contributions() {
            let index = MemoryIndex::new();
            let a = Resource::new("a.dart");
            let b = Resource::new("b.dart");
            let m = element("a.dart", "A.m");

            index.record_relationship(&a, &m, RelationshipKind::IsInvokedByQualified, location("a.dart", 1));
            index.record_relationship(&b, &m, RelationshipKind::IsInvokedByQualified, location("b.dart", 2));

            assert_eq!(index.remove_resource(&a), 1);
            assert_eq!(index.len(), 1);
            assert_eq!(index.resources(), vec![b.clone()]);
            let remaining = index.locations(&m, RelationshipKind::IsInvokedByQualified);
            assert_eq!(remaining.len(), 1);
            assert_eq!(remaining[0].offset, 2);
            assert_eq!(index.remove_resource(&a), 0);
        }

        #[test]
        fn shared_across_threads() {
            let index = MemoryIndex::new();
            std::thread::scope(|scope| {
                for unit in ["a.dart", "b.dart", "c.dart"] {
                    let index = &index;
                    scope.spawn(move || {
                        let resource = Resource::new(unit);
                        let lib = Element::library(resource.clone());
                        for offset in 0..10 {
                            index.record_relationship(
                                &resource,
                                &lib,
                                RelationshipKind::DefinesFunction,
                                location(unit, offset),
                            );
                        }
                    });
                }
            });
            assert_eq!(index.len(), 30);
            assert_eq!(index.resources().len(), 3);
            let offsets: Vec<_> = index
                .contributions(&Resource::new("b.dart"))
                .into_iter()
                .map(|r| r.location.offset)
                .collect();
            assert_eq!(offsets, (0..10).collect::<Vec<_>>());
        }
    }
}
