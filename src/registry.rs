//! Operation and attribute kind registries
//!
//! Every operation kind gets a dense, stable identity; attribute kinds
//! additionally get a position in the attribute table, a separate numbering
//! space used to address per-model attribute arrays. Identities are assigned
//! through [`RegistryBuilder`] before any pipeline is built; the finished
//! [`Registry`] is immutable and can be shared across workers without
//! synchronization.

use std::sync::Arc;

use crate::attributes;
use crate::pipeline::{VertexAttribute, VertexOperation};

/// Identity of an operation kind. Unique within one registry; duplicate
/// identities would corrupt pipeline ordering, which the builder makes
/// impossible by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(pub(crate) u32);

impl OperationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of an attribute kind in the registry's attribute table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeIndex(pub(crate) u32);

impl AttributeIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handles to the built-in kinds every registry carries.
#[derive(Debug, Clone, Copy)]
pub struct StandardAttributes {
    pub color: AttributeIndex,
    pub lighting: AttributeIndex,
    pub normal: AttributeIndex,
    pub side: AttributeIndex,
    pub light_coord: AttributeIndex,
    /// Operation kind shared by all coordinate transforms. Not an attribute;
    /// serves as the hard-requirement target for "a transform has run".
    pub transform: OperationId,
}

/// Immutable lookup tables for operation and attribute kinds.
pub struct Registry {
    attributes: Vec<Arc<dyn VertexAttribute>>,
    operations: Vec<Option<Arc<dyn VertexOperation>>>,
    standard: StandardAttributes,
}

impl Registry {
    /// A registry with the built-in attribute kinds installed.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start a registry with the built-in kinds, ready for custom additions.
    pub fn builder() -> RegistryBuilder {
        let mut builder = RegistryBuilder {
            attributes: Vec::new(),
            operations: Vec::new(),
            standard: None,
        };
        builder.standard = Some(attributes::install_standard(&mut builder));
        builder
    }

    /// Number of operation identities issued; sizes per-build records.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Look up an attribute kind by table position.
    ///
    /// Panics if `index` was not issued by this registry's builder.
    pub fn attribute(&self, index: AttributeIndex) -> &Arc<dyn VertexAttribute> {
        &self.attributes[index.index()]
    }

    /// The registered operation instance for an id, if the kind installed one.
    /// Kinds like the transform reserve an id without an instance; their
    /// operations are constructed per use.
    pub fn operation(&self, id: OperationId) -> Option<&Arc<dyn VertexOperation>> {
        self.operations[id.index()].as_ref()
    }

    /// The operation view of a registered attribute kind.
    pub fn attribute_operation(&self, index: AttributeIndex) -> &Arc<dyn VertexOperation> {
        let id = self.attributes[index.index()].operation_id();
        self.operations[id.index()]
            .as_ref()
            .expect("installed attribute has an operation entry")
    }

    pub fn standard(&self) -> StandardAttributes {
        self.standard
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Assigns identities and collects kind instances for a [`Registry`].
///
/// Reservation and installation are split so mutually dependent kinds (the
/// normal/side fallback pair) can learn each other's identities before they
/// are constructed.
pub struct RegistryBuilder {
    attributes: Vec<Option<Arc<dyn VertexAttribute>>>,
    operations: Vec<Option<Arc<dyn VertexOperation>>>,
    standard: Option<StandardAttributes>,
}

impl RegistryBuilder {
    /// Issue a fresh operation identity with no attribute table entry.
    pub fn register_operation(&mut self) -> OperationId {
        let id = OperationId(self.operations.len() as u32);
        self.operations.push(None);
        id
    }

    /// Reserve an attribute slot together with its operation identity.
    pub fn reserve_attribute(&mut self) -> (AttributeIndex, OperationId) {
        let op = self.register_operation();
        let index = AttributeIndex(self.attributes.len() as u32);
        self.attributes.push(None);
        (index, op)
    }

    /// Install an attribute kind into its reserved slot.
    ///
    /// Panics if the kind's identities were not reserved on this builder or
    /// the slot is already occupied.
    pub fn install<A: VertexAttribute + 'static>(&mut self, attribute: Arc<A>) {
        let index = attribute.attribute_index().index();
        let op = attribute.operation_id().index();
        assert!(
            self.attributes[index].is_none() && self.operations[op].is_none(),
            "attribute slot already installed"
        );
        self.operations[op] = Some(attribute.clone() as Arc<dyn VertexOperation>);
        self.attributes[index] = Some(attribute as Arc<dyn VertexAttribute>);
    }

    /// Finalize into an immutable registry.
    ///
    /// Panics if a reserved attribute slot was never installed.
    pub fn build(self) -> Registry {
        let attributes = self
            .attributes
            .into_iter()
            .map(|slot| slot.expect("reserved attribute slot was never installed"))
            .collect();
        Registry {
            attributes,
            operations: self.operations,
            standard: self.standard.expect("standard kinds installed by builder()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_identities_are_dense_and_unique() {
        let mut builder = Registry::builder();
        let a = builder.register_operation();
        let b = builder.register_operation();
        assert_ne!(a, b);
        let registry = builder.build();
        assert_eq!(registry.operation_count(), b.index() + 1);
    }

    #[test]
    fn standard_kinds_are_installed() {
        let registry = Registry::new();
        let std = registry.standard();
        assert_eq!(registry.attribute(std.normal).attribute_index(), std.normal);
        // The transform kind reserves an id without an instance.
        assert!(registry.operation(std.transform).is_none());
        assert!(registry
            .operation(registry.attribute(std.color).operation_id())
            .is_some());
    }
}
