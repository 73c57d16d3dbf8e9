//! # Value-Change Scripts
//!
//! A control may declare `events.onValueChange`. The engine never evaluates
//! scripts itself; after such a control changes, the form container hands the
//! script and a [`FormContext`] snapshot to a [`ScriptRunner`] and adopts the
//! records it returns.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::FormResult;
use crate::obs::{find_by_namespace, Obs};

/// What a script sees and may change: the form's current records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContext {
    pub records: Vec<Obs>,

    /// Opaque patient details, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Value>,
}

impl FormContext {
    pub fn new(records: Vec<Obs>) -> Self {
        FormContext { records, patient: None }
    }

    pub fn with_patient(mut self, patient: Value) -> Self {
        self.patient = Some(patient);
        self
    }

    pub fn get(&self, namespace: &str) -> Option<&Obs> {
        find_by_namespace(&self.records, namespace)
    }

    /// Record `value` on the observation with `namespace`. Returns false when
    /// there is none.
    pub fn set_value(&mut self, namespace: &str, value: Value) -> bool {
        match self
            .records
            .iter_mut()
            .find(|obs| obs.form_namespace.as_deref() == Some(namespace))
        {
            Some(obs) => {
                *obs = obs.set_value(value);
                true
            }
            None => false,
        }
    }

    pub fn into_records(self) -> Vec<Obs> {
        self.records
    }
}

/// Runs `events.onValueChange` scripts.
pub trait ScriptRunner: Debug + Send + Sync {
    fn run(&self, script: &str, context: FormContext) -> FormResult<FormContext>;
}

/// Returns the context unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScriptRunner;

impl ScriptRunner for NoopScriptRunner {
    fn run(&self, _script: &str, context: FormContext) -> FormResult<FormContext> {
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Concept;
    use serde_json::json;

    #[test]
    fn test_set_value_by_namespace() {
        let obs = Obs::new(Concept::new("p", "Pulse", "Numeric")).with_namespace("f/1");
        let mut context = FormContext::new(vec![obs]);

        assert!(context.set_value("f/1", json!(60)));
        assert!(!context.set_value("f/2", json!(60)));
        assert_eq!(context.get("f/1").and_then(|o| o.value.clone()), Some(json!(60)));
    }

    #[test]
    fn test_noop_runner_returns_context() {
        let context = FormContext::new(vec![]).with_patient(json!({"age": 40}));
        assert_eq!(NoopScriptRunner.run("anything", context.clone()), Ok(context));
    }
}
