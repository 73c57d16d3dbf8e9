//! # Control Metadata
//!
//! The control-definition tree. A form template is a list of
//! [`ControlMetadata`] nodes; groups, sections and tables nest further nodes
//! under `controls`. The JSON shape is camelCase and unknown keys are kept in
//! `extra` so a definition survives a load/save cycle untouched.
//!
//! ```text
//! ControlMetadata (obsGroupControl, id "1")
//! ├── label:      { type: "label", value: "Pulse Data" }
//! ├── concept:    { uuid, name, datatype, setMembers }
//! ├── properties: { location: {row, column}, isAbnormal, addMore, ... }
//! └── controls:   [ ControlMetadata (obsControl, id "2"), ... ]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use form_core::metadata::{ControlMetadata, Location};
//!
//! let json = r#"{"id":"1","type":"obsControl","properties":{"location":{"row":0,"column":2}}}"#;
//! let metadata: ControlMetadata = serde_json::from_str(json).unwrap();
//! assert_eq!(metadata.location(), Some(Location::new(0, 2)));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Concept descriptor: what an observation measures.
///
/// Only the fields the engine reads are typed; everything else the concept
/// service returns is carried through `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    #[serde(default)]
    pub uuid: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_class: Option<String>,

    /// Upper bound of the normal range (abnormal above)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi_normal: Option<f64>,

    /// Lower bound of the normal range (abnormal below)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_normal: Option<f64>,

    /// Hard upper bound (invalid above)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi_absolute: Option<f64>,

    /// Hard lower bound (invalid below)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_absolute: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_decimal: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Label>,

    /// Members of a concept set (obs group concepts)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_members: Vec<Concept>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Concept {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, datatype: impl Into<String>) -> Self {
        Concept {
            uuid: uuid.into(),
            name: name.into(),
            datatype: Some(datatype.into()),
            ..Default::default()
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.datatype.as_deref() == Some("Numeric")
    }

    pub fn is_set(&self) -> bool {
        !self.set_members.is_empty()
    }
}

/// A translatable piece of text (labels, column headers, descriptions).
///
/// `translation_key` is opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    #[serde(rename = "type", default = "default_label_type")]
    pub label_type: String,

    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

fn default_label_type() -> String {
    "label".to_string()
}

impl Label {
    pub fn new(value: impl Into<String>) -> Self {
        Label {
            label_type: default_label_type(),
            value: value.into(),
            translation_key: None,
            id: None,
        }
    }

    pub fn with_translation_key(mut self, key: impl Into<String>) -> Self {
        self.translation_key = Some(key.into());
        self
    }
}

/// Grid coordinate recorded in a control's properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub column: usize,
}

impl Location {
    pub const fn new(row: usize, column: usize) -> Self {
        Location { row, column }
    }

    /// Linear position `row * width + column`.
    pub const fn position(&self, width: usize) -> usize {
        self.row * width + self.column
    }
}

/// Free-form control properties with the flags the engine interprets typed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_abnormal: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_more: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Properties {
    pub fn at(row: usize, column: usize) -> Self {
        Properties {
            location: Some(Location::new(row, column)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Properties::default()
    }
}

/// Event scripts attached to a control. Executed by the script collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Events {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_value_change: Option<String>,
}

/// A selectable answer (boolean and coded controls).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<String>,
    pub name: String,
    pub value: Value,
}

/// One node of the control-definition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlMetadata {
    pub id: String,

    #[serde(rename = "type")]
    pub control_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,

    /// Display text of label and section nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<Concept>,

    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<ControlMetadata>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_headers: Vec<Label>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Events>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ControlMetadata {
    pub fn new(id: impl Into<String>, control_type: impl Into<String>) -> Self {
        ControlMetadata {
            id: id.into(),
            control_type: control_type.into(),
            label: None,
            value: None,
            translation_key: None,
            concept: None,
            properties: Properties::default(),
            controls: Vec::new(),
            column_headers: Vec::new(),
            options: None,
            events: None,
            extra: Map::new(),
        }
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concept = Some(concept);
        self
    }

    pub fn with_location(mut self, row: usize, column: usize) -> Self {
        self.properties.location = Some(Location::new(row, column));
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_control(mut self, control: ControlMetadata) -> Self {
        self.controls.push(control);
        self
    }

    /// Human-readable title: the label, else the node's own text, else the
    /// concept name.
    pub fn display_text(&self) -> Option<&str> {
        self.label
            .as_ref()
            .map(|l| l.value.as_str())
            .or(self.value.as_deref())
            .or(self.concept.as_ref().map(|c| c.name.as_str()))
    }

    pub fn location(&self) -> Option<Location> {
        self.properties.location
    }

    /// Row used for table grouping; controls without a location sit in row 0.
    pub fn row(&self) -> usize {
        self.location().map(|l| l.row).unwrap_or(0)
    }

    pub fn is_abnormal(&self) -> bool {
        self.properties.is_abnormal.unwrap_or(false)
    }

    pub fn is_add_more(&self) -> bool {
        self.properties.add_more.unwrap_or(false)
    }

    pub fn is_mandatory(&self) -> bool {
        self.properties.mandatory.unwrap_or(false)
    }

    pub fn on_value_change_script(&self) -> Option<&str> {
        self.events.as_ref().and_then(|e| e.on_value_change.as_deref())
    }

    /// Depth-first lookup of a node by id, including `self`.
    pub fn find(&self, id: &str) -> Option<&ControlMetadata> {
        if self.id == id {
            return Some(self);
        }
        self.controls.iter().find_map(|c| c.find(id))
    }

    /// All ids in this subtree, depth-first.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = vec![self.id.as_str()];
        for child in &self.controls {
            ids.extend(child.ids());
        }
        ids
    }
}
