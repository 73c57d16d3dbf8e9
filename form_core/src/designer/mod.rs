//! # Form Designer
//!
//! Drag-and-drop authoring of control-definition trees.
//!
//! The designer lays controls out on a [`Grid`] of fixed-width [`Row`]s whose
//! [`Cell`]s hold the dropped metadata. Each dropped control is turned into a
//! live [`DesignerControl`] through a [`Wrapper`], which by default resolves
//! the control type in the designer namespace of the [`ComponentStore`].
//!
//! Reading a layout back goes bottom-up: every designer control reports its
//! JSON definition, cells concatenate their controls' definitions, rows
//! concatenate cells in column order, and the grid concatenates rows.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use form_core::designer::{Grid, RegistryWrapper};
//! use form_core::metadata::{Concept, ControlMetadata, Location};
//! use form_core::registry::ComponentStore;
//!
//! let store = Arc::new(ComponentStore::with_defaults());
//! let wrapper = Arc::new(RegistryWrapper::new(store));
//! let mut grid = Grid::new(&[], 4, 1, wrapper).unwrap();
//!
//! let pulse = ControlMetadata::new("1", "obsControl")
//!     .with_concept(Concept::new("pulseUuid", "Pulse", "Numeric"));
//! grid.drop(Location::new(0, 3), pulse).unwrap();
//!
//! assert_eq!(grid.row_count(), 2); // last row completed, grid grew
//! assert_eq!(grid.get_controls()[0].location(), Some(Location::new(0, 3)));
//! ```

pub mod boolean_control;
pub mod button;
pub mod cell;
pub mod concept;
pub mod grid;
pub mod label;
pub mod obs_control;
pub mod obs_group_control;
pub mod row;

pub use boolean_control::BooleanControlDesigner;
pub use button::ButtonDesigner;
pub use cell::{cell_position, Cell};
pub use concept::{metadata_for_concept, IdGenerator};
pub use grid::{Grid, MAX_ROWS};
pub use label::LabelDesigner;
pub use obs_control::ObsControlDesigner;
pub use obs_group_control::ObsGroupControlDesigner;
pub use row::{Row, RowCompleted};

use std::fmt::Debug;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::DEFAULT_ROW_WIDTH;
use crate::errors::FormResult;
use crate::metadata::ControlMetadata;
use crate::registry::ComponentStore;
use crate::view::View;

// ============================================================================
// Designer control contract
// ============================================================================

/// An editable control placed on the designer canvas.
pub trait DesignerControl: Debug {
    fn metadata(&self) -> &ControlMetadata;

    /// The definition this control contributes to the saved form, or `None`
    /// when it has nothing to contribute yet.
    fn get_json_definition(&self) -> Option<ControlMetadata>;

    fn render(&self) -> View;

    /// Nested layout, for controls that own one.
    fn grid_mut(&mut self) -> Option<&mut Grid> {
        None
    }
}

/// Builds a designer control. Registered per type in the store.
pub type DesignerFactory = fn(DesignerProps) -> FormResult<Box<dyn DesignerControl>>;

/// Everything a designer control is constructed with.
#[derive(Debug, Clone)]
pub struct DesignerProps {
    pub metadata: ControlMetadata,
    pub store: Arc<ComponentStore>,
    /// Wraps the controls of any nested grid
    pub wrapper: Arc<dyn Wrapper>,
    pub columns: usize,
}

impl DesignerProps {
    pub fn new(metadata: ControlMetadata, store: Arc<ComponentStore>, wrapper: Arc<dyn Wrapper>) -> Self {
        DesignerProps {
            metadata,
            store,
            wrapper,
            columns: DEFAULT_ROW_WIDTH,
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// How a control appears in the designer palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignProperties {
    pub display_name: String,
    pub is_top_level_component: bool,
}

impl DesignProperties {
    pub fn top_level(display_name: impl Into<String>) -> Self {
        DesignProperties {
            display_name: display_name.into(),
            is_top_level_component: true,
        }
    }

    pub fn nested(display_name: impl Into<String>) -> Self {
        DesignProperties {
            display_name: display_name.into(),
            is_top_level_component: false,
        }
    }
}

/// One editable attribute shown in the property editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDescriptor {
    pub name: String,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDescriptor>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        AttributeDescriptor {
            name: name.into(),
            data_type: data_type.into(),
            default_value: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// A `complex` attribute grouping `attributes`.
    pub fn complex(name: impl Into<String>, attributes: Vec<AttributeDescriptor>) -> Self {
        AttributeDescriptor {
            attributes,
            ..AttributeDescriptor::new(name, "complex")
        }
    }
}

/// What the designer namespace of the store holds per type.
#[derive(Debug, Clone)]
pub struct DesignerDescriptor {
    pub control: DesignerFactory,
    pub design_properties: DesignProperties,
    pub attributes: Vec<AttributeDescriptor>,
}

// ============================================================================
// Wrapping
// ============================================================================

/// Turns dropped metadata into a live designer control.
///
/// `Ok(None)` means the type has no designer implementation; the cell keeps
/// the metadata but it contributes nothing to the definition.
pub trait Wrapper: Debug + Send + Sync {
    fn wrap(&self, metadata: &ControlMetadata) -> FormResult<Option<Box<dyn DesignerControl>>>;
}

/// Resolves types through the designer namespace of a store.
#[derive(Debug, Clone)]
pub struct RegistryWrapper {
    store: Arc<ComponentStore>,
    columns: usize,
}

impl RegistryWrapper {
    pub fn new(store: Arc<ComponentStore>) -> Self {
        RegistryWrapper {
            store,
            columns: DEFAULT_ROW_WIDTH,
        }
    }

    /// Row width handed to nested grids.
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }
}

impl Wrapper for RegistryWrapper {
    fn wrap(&self, metadata: &ControlMetadata) -> FormResult<Option<Box<dyn DesignerControl>>> {
        let Some(descriptor) = self.store.get_designer_component(&metadata.control_type) else {
            return Ok(None);
        };
        let props = DesignerProps::new(metadata.clone(), Arc::clone(&self.store), Arc::new(self.clone()))
            .with_columns(self.columns);
        (descriptor.control)(props).map(Some)
    }
}

/// Register every built-in designer control.
pub fn register_defaults(store: &ComponentStore) {
    store.register_designer_component("obsControl", obs_control::descriptor());
    store.register_designer_component("obsGroupControl", obs_group_control::descriptor());
    store.register_designer_component("label", label::descriptor());
    store.register_designer_component("button", button::descriptor());
    store.register_designer_component("boolean", boolean_control::descriptor());
}
