//! Mapping bindings to index elements.
//!
//! Declarations in the unit under visit get their elements from the scope
//! tracker (enclosing element id plus local name). Everything the walk only
//! *refers* to goes through an [`ElementLocator`], which may fail when the
//! declaring unit cannot be found.
//!
//! [`BindingLocator`] is the default locator: it composes the id from the
//! binding's enclosing chain (`Shape.area`) and asks a
//! [`ResourceResolver`] for the resource of the declaring unit. Both ways
//! agree on the element of any named declaration.

use std::time::{Duration, Instant};

use relindex_ast::{Binding, BindingId, BindingKind, SemanticModel};
use relindex_core::element::{Accessor, Element, ID_SEPARATOR};
use relindex_core::error::LookupError;
use relindex_core::resource::{ResourceResolver, UnitHandle};

// ============================================================================
// Element Locator
// ============================================================================

/// Maps a binding to the canonical element of the symbol it declares.
pub trait ElementLocator: Send + Sync {
    fn element(&self, model: &SemanticModel, binding: BindingId) -> Result<Element, LookupError>;
}

/// Locates elements by composing ids along the enclosing chain.
pub struct BindingLocator<'a> {
    resources: &'a dyn ResourceResolver,
}

impl<'a> BindingLocator<'a> {
    pub fn new(resources: &'a dyn ResourceResolver) -> Self {
        BindingLocator { resources }
    }
}

impl ElementLocator for BindingLocator<'_> {
    fn element(&self, model: &SemanticModel, binding: BindingId) -> Result<Element, LookupError> {
        let target = lookup(model, binding)?;
        if target.kind == BindingKind::Library {
            let unit = target
                .unit
                .clone()
                .ok_or_else(|| LookupError::DeclaringUnitUnknown {
                    name: target.name.clone(),
                })?;
            let library_unit = self.resources.library_unit(&unit)?;
            return Ok(Element::library(self.resources.resource(&library_unit)?));
        }

        let mut names: Vec<&str> = Vec::new();
        let mut declaring_unit: Option<&UnitHandle> = None;
        let mut current = Some(binding);
        let mut steps = 0;
        while let Some(id) = current {
            // The chain is at most as long as the model; a longer walk is a cycle.
            if steps > model.len() {
                return Err(LookupError::EnclosingCycle {
                    name: target.name.clone(),
                });
            }
            steps += 1;
            let b = lookup(model, id)?;
            if b.kind == BindingKind::Library {
                break;
            }
            if b.name.is_empty() {
                return Err(LookupError::AnonymousScope {
                    name: target.name.clone(),
                });
            }
            names.push(&b.name);
            declaring_unit = declaring_unit.or(b.unit.as_ref());
            current = b.enclosing;
        }

        names.reverse();
        let id = names.join(&ID_SEPARATOR.to_string());
        let unit = declaring_unit.ok_or_else(|| LookupError::DeclaringUnitUnknown { name: id.clone() })?;
        Ok(Element::new(self.resources.resource(unit)?, id))
    }
}

fn lookup(model: &SemanticModel, id: BindingId) -> Result<&Binding, LookupError> {
    model
        .get(id)
        .ok_or(LookupError::UnknownBinding { index: id.0 })
}

// ============================================================================
// Identity Resolver
// ============================================================================

/// Wraps an [`ElementLocator`], timing every lookup.
pub struct IdentityResolver<'a> {
    model: &'a SemanticModel,
    locator: &'a dyn ElementLocator,
    binding_time: Duration,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(model: &'a SemanticModel, locator: &'a dyn ElementLocator) -> Self {
        IdentityResolver {
            model,
            locator,
            binding_time: Duration::ZERO,
        }
    }

    /// Element of the symbol declared by `binding`.
    pub fn element(&mut self, binding: BindingId) -> Result<Element, LookupError> {
        let start = Instant::now();
        let result = self.locator.element(self.model, binding);
        self.binding_time += start.elapsed();
        result
    }

    /// Element of a field, or of its getter or setter view.
    ///
    /// The getter view is chosen when the field has a getter and
    /// `allow_getter` is set; otherwise the setter view when the field has a
    /// setter and `allow_setter` is set; otherwise the field itself.
    pub fn field_element(
        &mut self,
        binding: BindingId,
        allow_getter: bool,
        allow_setter: bool,
    ) -> Result<Element, LookupError> {
        let field = self.element(binding)?;
        let (has_getter, has_setter) = match lookup(self.model, binding)?.kind {
            BindingKind::Field {
                has_getter,
                has_setter,
            } => (has_getter, has_setter),
            _ => (false, false),
        };
        Ok(if has_getter && allow_getter {
            field.accessor(Accessor::Getter)
        } else if has_setter && allow_setter {
            field.accessor(Accessor::Setter)
        } else {
            field
        })
    }

    /// Total time spent in the locator.
    pub fn binding_time(&self) -> Duration {
        self.binding_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relindex_core::resource::Resource;

    /// Every unit is its own library; resources are `res:<handle>`.
    struct Resources;

    impl ResourceResolver for Resources {
        fn resource(&self, unit: &UnitHandle) -> Result<Resource, LookupError> {
            if unit.as_str() == "missing.dart" {
                return Err(LookupError::ResourceNotFound { unit: unit.clone() });
            }
            Ok(Resource::new(format!("res:{}", unit)))
        }

        fn library_unit(&self, unit: &UnitHandle) -> Result<UnitHandle, LookupError> {
            Ok(unit.clone())
        }
    }

    struct Fixture {
        model: SemanticModel,
        area: BindingId,
        name: BindingId,
        closure_local: BindingId,
        orphan: BindingId,
    }

    fn fixture() -> Fixture {
        let mut model = SemanticModel::new();
        let lib = model.add(Binding::new("shapes", BindingKind::Library).with_unit("lib/shapes.dart"));
        let shape = model.add(
            Binding::new(
                "Shape",
                BindingKind::Class {
                    is_interface: false,
                    supertype: None,
                    interfaces: vec![],
                    members: vec![],
                    constructors: vec![],
                    default_class: None,
                },
            )
            .with_enclosing(lib)
            .with_unit("lib/shape.dart"),
        );
        let area = model.add(
            Binding::new("area", BindingKind::Method { is_constructor: false }).with_enclosing(shape),
        );
        let name = model.add(
            Binding::new(
                "name",
                BindingKind::Field {
                    has_getter: true,
                    has_setter: true,
                },
            )
            .with_enclosing(shape),
        );
        let closure = model.add(
            Binding::new("", BindingKind::Method { is_constructor: false }).with_enclosing(area),
        );
        let closure_local = model.add(
            Binding::new("f", BindingKind::Method { is_constructor: false }).with_enclosing(closure),
        );
        let orphan = model.add(Binding::new("orphan", BindingKind::Method { is_constructor: false }));
        Fixture {
            model,
            area,
            name,
            closure_local,
            orphan,
        }
    }

    mod binding_locator_tests {
        use super::*;

        #[test]
        fn composes_id_along_enclosing_chain() {
            let f = fixture();
            let locator = BindingLocator::new(&Resources);
            let element = locator.element(&f.model, f.area).unwrap();
            assert_eq!(element.id, "Shape.area");
            assert_eq!(element.resource, Resource::new("res:lib/shape.dart"));
        }

        #[test]
        fn anonymous_scope_has_no_stable_id() {
            let f = fixture();
            let locator = BindingLocator::new(&Resources);
            assert_eq!(
                locator.element(&f.model, f.closure_local),
                Err(LookupError::AnonymousScope {
                    name: "f".to_string()
                })
            );
        }

        #[test]
        fn unknown_declaring_unit_fails() {
            let f = fixture();
            let locator = BindingLocator::new(&Resources);
            assert_eq!(
                locator.element(&f.model, f.orphan),
                Err(LookupError::DeclaringUnitUnknown {
                    name: "orphan".to_string()
                })
            );
            assert_eq!(
                locator.element(&f.model, BindingId(500)),
                Err(LookupError::UnknownBinding { index: 500 })
            );
        }

        #[test]
        fn library_binding_maps_to_library_element() {
            let f = fixture();
            let locator = BindingLocator::new(&Resources);
            let element = locator.element(&f.model, BindingId(0)).unwrap();
            assert_eq!(element, Element::library(Resource::new("res:lib/shapes.dart")));
        }

        #[test]
        fn enclosing_cycle_is_an_error() {
            let mut model = SemanticModel::new();
            let a = model.add(
                Binding::new("a", BindingKind::Method { is_constructor: false })
                    .with_enclosing(BindingId(1))
                    .with_unit("x.dart"),
            );
            model.add(Binding::new("b", BindingKind::Method { is_constructor: false }).with_enclosing(a));
            let locator = BindingLocator::new(&Resources);
            assert_eq!(
                locator.element(&model, a),
                Err(LookupError::EnclosingCycle { name: "a".into() })
            );
        }
    }

    mod identity_resolver_tests {
        use super::*;

        #[test]
        fn field_views_follow_allow_flags() {
            let f = fixture();
            let locator = BindingLocator::new(&Resources);
            let mut identity = IdentityResolver::new(&f.model, &locator);
            assert_eq!(
                identity.field_element(f.name, true, false).unwrap().id,
                "Shape.name#get"
            );
            assert_eq!(
                identity.field_element(f.name, false, true).unwrap().id,
                "Shape.name#set"
            );
            assert_eq!(identity.field_element(f.name, false, false).unwrap().id, "Shape.name");
        }

        #[test]
        fn lookup_failures_are_returned() {
            let f = fixture();
            let locator = BindingLocator::new(&Resources);
            let mut identity = IdentityResolver::new(&f.model, &locator);
            assert!(identity.element(f.orphan).is_err());
            assert!(identity.element(f.area).is_ok());
        }
    }
}
