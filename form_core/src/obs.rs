//! # Observations
//!
//! [`Obs`] is the recorded-data counterpart of a control. A leaf carries a
//! `value`; a group carries `groupMembers`. Obs values are immutable from the
//! engine's point of view: every edit goes through a method that returns a new
//! `Obs`, so no instance is ever shared and mutated across tree nodes.
//!
//! Clearing a value never deletes the observation. It is marked `voided` so
//! the audit history survives a save.
//!
//! ## Example
//!
//! ```rust
//! use form_core::metadata::Concept;
//! use form_core::obs::Obs;
//! use serde_json::json;
//!
//! let pulse = Obs::new(Concept::new("pulse-uuid", "Pulse", "Numeric"))
//!     .with_namespace(Obs::namespace("formUuid", "100"));
//!
//! let recorded = pulse.set_value(json!(72));
//! assert_eq!(recorded.value, Some(json!(72)));
//!
//! let cleared = recorded.set_value(json!(""));
//! assert!(cleared.voided);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::metadata::Concept;

fn is_false(b: &bool) -> bool {
    !*b
}

/// A single observation or a group of observations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default)]
    pub concept: Concept,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// `"<formUuid>/<controlId>"` of the control that owns this observation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_namespace: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub voided: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_members: Option<Vec<Obs>>,

    /// Derived indicator, only maintained on abnormal-flagged groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abnormal: Option<bool>,
}

impl Obs {
    /// A fresh leaf observation with no value.
    pub fn new(concept: Concept) -> Self {
        Obs {
            concept,
            ..Default::default()
        }
    }

    /// A fresh group observation.
    pub fn group(concept: Concept, members: Vec<Obs>) -> Self {
        Obs {
            concept,
            group_members: Some(members),
            ..Default::default()
        }
    }

    /// Build the namespace string for a control of a form.
    pub fn namespace(form_uuid: &str, control_id: &str) -> String {
        format!("{}/{}", form_uuid, control_id)
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.form_namespace = Some(namespace.into());
        self
    }

    pub fn is_group(&self) -> bool {
        self.group_members.is_some()
    }

    pub fn members(&self) -> &[Obs] {
        self.group_members.as_deref().unwrap_or(&[])
    }

    /// Return a copy with `value` recorded, or voided when the value is empty.
    pub fn set_value(&self, value: Value) -> Obs {
        if is_empty_value(&value) {
            return self.void();
        }
        Obs {
            value: Some(value),
            voided: false,
            ..self.clone()
        }
    }

    /// Return a voided copy with its value cleared.
    pub fn void(&self) -> Obs {
        Obs {
            value: None,
            voided: true,
            ..self.clone()
        }
    }

    /// Return a copy with the given members.
    pub fn with_members(&self, members: Vec<Obs>) -> Obs {
        Obs {
            group_members: Some(members),
            ..self.clone()
        }
    }

    /// True when both observations stand for the same control.
    ///
    /// The namespace is authoritative when both sides carry one; otherwise the
    /// concept uuid decides.
    pub fn same_identity(&self, other: &Obs) -> bool {
        match (&self.form_namespace, &other.form_namespace) {
            (Some(a), Some(b)) => a == b,
            _ => !self.concept.uuid.is_empty() && self.concept.uuid == other.concept.uuid,
        }
    }

    /// Has this observation ever carried data worth reporting?
    ///
    /// A never-filled leaf (no uuid, no value) is not reported; a voided leaf
    /// that was previously saved is, so the void reaches the server.
    pub fn has_data(&self) -> bool {
        if self.is_group() {
            return self.uuid.is_some() || self.members().iter().any(Obs::has_data);
        }
        self.uuid.is_some() || self.value.is_some()
    }

    /// Return a copy where every live observation without a uuid gets a
    /// fresh v4 uuid, members included. Voided ones never reached storage
    /// and are left alone.
    pub fn with_assigned_uuids(&self) -> Obs {
        let mut obs = self.clone();
        if let Some(members) = &self.group_members {
            obs.group_members = Some(members.iter().map(Obs::with_assigned_uuids).collect());
        }
        if obs.uuid.is_none() && !obs.voided && (obs.value.is_some() || obs.is_group()) {
            obs.uuid = Some(Uuid::new_v4().to_string());
        }
        obs
    }

    /// Numeric reading of the value (numbers and numeric strings).
    pub fn numeric_value(&self) -> Option<f64> {
        match self.value.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Empty means "cleared by the user": null, blank string, or empty list.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Locate the observation owned by a control in a list of records.
pub fn find_by_namespace<'a>(records: &'a [Obs], namespace: &str) -> Option<&'a Obs> {
    records
        .iter()
        .find(|obs| obs.form_namespace.as_deref() == Some(namespace))
}
