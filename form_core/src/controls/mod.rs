//! # Data-Entry Controls
//!
//! Every node of a control-definition tree is turned into a live [`Control`]
//! by the factory registered for its `type`. Controls follow one contract:
//!
//! - [`Control::get_value`] reports the control's current value, or `None`
//!   when it has nothing to report (presentational nodes, untouched fields).
//! - [`Control::edit`] routes a user edit to the control with the target id
//!   somewhere in this subtree, and returns the [`ValueChanged`] notification
//!   this control passes to its own parent.
//! - [`Control::render`] describes the control as a [`View`].
//!
//! Notifications travel back up as return values, so each composite sees
//! its children's edits before its own parent does, in delivery order.
//!
//! ## Built-in types
//!
//! | type              | implementation          |
//! |-------------------|-------------------------|
//! | `obsControl`      | [`ObsControl`]          |
//! | `obsGroupControl` | [`ObsGroupControl`]     |
//! | `section`         | [`Section`]             |
//! | `table`           | [`Table`]               |
//! | `label`           | [`LabelControl`]        |

pub mod composition;
pub mod label;
pub mod obs_control;
pub mod obs_group_control;
pub mod section;
pub mod table;

pub use composition::{group_by_row, ChildControls};
pub use label::LabelControl;
pub use obs_control::ObsControl;
pub use obs_group_control::ObsGroupControl;
pub use section::Section;
pub use table::Table;

use std::fmt::Debug;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::errors::{FormResult, ValidationError};
use crate::mapper::ChildEdit;
use crate::metadata::ControlMetadata;
use crate::obs::Obs;
use crate::registry::ComponentStore;
use crate::view::View;

/// Builds a control from its props. Registered per type in the store.
pub type ControlFactory = fn(ControlProps) -> FormResult<Box<dyn Control>>;

/// Everything a control is constructed with.
#[derive(Debug, Clone)]
pub struct ControlProps {
    pub metadata: ControlMetadata,
    pub form_uuid: String,
    /// The observation this control owns, when one was recorded before
    pub obs: Option<Obs>,
    /// Records that descendants look their own observations up in
    pub records: Vec<Obs>,
    pub store: Arc<ComponentStore>,
}

impl ControlProps {
    pub fn new(metadata: ControlMetadata, form_uuid: impl Into<String>, store: Arc<ComponentStore>) -> Self {
        ControlProps {
            metadata,
            form_uuid: form_uuid.into(),
            obs: None,
            records: Vec::new(),
            store,
        }
    }

    pub fn with_obs(mut self, obs: Obs) -> Self {
        self.obs = Some(obs);
        self
    }

    pub fn with_records(mut self, records: Vec<Obs>) -> Self {
        self.records = records;
        self
    }

    /// Namespace of the observation this control owns.
    pub fn namespace(&self) -> String {
        Obs::namespace(&self.form_uuid, &self.metadata.id)
    }
}

/// What `get_value` yields: an observation, or a list from a container.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlValue {
    Obs(Obs),
    List(Vec<ControlValue>),
}

impl ControlValue {
    /// All observations in this value, in order.
    pub fn into_observations(self) -> Vec<Obs> {
        match self {
            ControlValue::Obs(obs) => vec![obs],
            ControlValue::List(items) => items.into_iter().flat_map(ControlValue::into_observations).collect(),
        }
    }

    pub fn as_obs(&self) -> Option<&Obs> {
        match self {
            ControlValue::Obs(obs) => Some(obs),
            ControlValue::List(_) => None,
        }
    }
}

/// Change notification passed from a control to its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChanged {
    pub obs: ChildEdit,
    pub errors: Vec<ValidationError>,
}

impl ValueChanged {
    pub fn new(obs: impl Into<ChildEdit>, errors: Vec<ValidationError>) -> Self {
        ValueChanged {
            obs: obs.into(),
            errors,
        }
    }
}

/// The data-entry control contract.
pub trait Control: Debug {
    fn metadata(&self) -> &ControlMetadata;

    fn id(&self) -> &str {
        &self.metadata().id
    }

    fn get_value(&self) -> FormResult<Option<ControlValue>>;

    fn render(&self) -> View;

    /// Apply `value` to the control `target` in this subtree.
    ///
    /// Controls that take no input report nothing.
    fn edit(&mut self, _target: &str, _value: Value) -> FormResult<Option<ValueChanged>> {
        Ok(None)
    }
}

/// Register every built-in data-entry control.
pub fn register_defaults(store: &ComponentStore) {
    store.register_component("obsControl", ObsControl::create);
    store.register_component("obsGroupControl", ObsGroupControl::create);
    store.register_component("section", Section::create);
    store.register_component("table", Table::create);
    store.register_component("label", LabelControl::create);
}
