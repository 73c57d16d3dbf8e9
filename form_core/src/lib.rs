//! # form_core - Clinical Form Engine
//!
//! `form_core` turns declarative control-definition trees into live data-entry
//! forms and keeps the recorded observations in sync with every edit. It also
//! carries the drag-and-drop grid used to author those trees. All definitions
//! and records are JSON-serializable with camelCase keys.
//!
//! ## Design Philosophy
//!
//! - **Registry dispatch**: control types resolve through a string-keyed
//!   [`registry::ComponentStore`]; an unknown type renders nothing
//! - **Immutable records**: every edit returns a new [`obs::Obs`]
//! - **Two error channels**: structural [`errors::FormError`]s propagate as
//!   `Err`, [`errors::ValidationError`]s travel with change notifications
//!
//! ## Quick Start
//!
//! ```rust
//! use form_core::{component_store, ControlMetadata, FormContainer, FormDefinition};
//! use form_core::metadata::Concept;
//! use serde_json::json;
//!
//! let mut definition = FormDefinition::new("Vitals");
//! definition.controls.push(
//!     ControlMetadata::new("1", "obsControl").with_concept(Concept::new("p", "Pulse", "Numeric")),
//! );
//!
//! let mut form = FormContainer::new(definition, Vec::new(), component_store()).unwrap();
//! let value = form.edit("1", json!(72)).unwrap();
//! assert_eq!(value.observations[0].value, Some(json!(72)));
//! ```
//!
//! ## Modules
//!
//! - [`registry`] - Component registry with data-entry and designer namespaces
//! - [`controls`] - Data-entry controls and child composition
//! - [`mapper`] - Obs-group synchronization strategies
//! - [`designer`] - Grid/row/cell layout and designer controls
//! - [`form`] - Form templates and the filling session
//! - [`metadata`] / [`obs`] - Definition and record types
//! - [`validation`] - Concept-driven value checks
//! - [`script`] - Value-change script collaborator
//! - [`view`] - Render trees
//! - [`config`] / [`translation`] - Settings and translation keys
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod config;
pub mod controls;
pub mod designer;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod form;
pub mod mapper;
pub mod metadata;
pub mod obs;
pub mod registry;
pub mod script;
pub mod translation;
pub mod validation;
pub mod view;

// Re-export commonly used types at crate root for convenience
pub use config::{FormSettings, DEFAULT_ROW_WIDTH};
pub use controls::{Control, ControlProps, ControlValue, ValueChanged};
pub use designer::{DesignerControl, Grid};
pub use errors::{FormError, FormResult, ValidationError};
pub use form::{FormContainer, FormDefinition, FormValue};
pub use metadata::{Concept, ControlMetadata, Location};
pub use obs::Obs;
pub use registry::{component_store, ComponentStore};
pub use view::View;
