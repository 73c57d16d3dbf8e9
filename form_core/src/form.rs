//! # Forms
//!
//! A [`FormDefinition`] is the saved template: identity plus the top-level
//! control tree. A [`FormContainer`] is one filling session of a template: it
//! composes the top-level controls over the existing records, routes edits to
//! any control by id and reports the resulting [`FormValue`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use form_core::form::{FormContainer, FormDefinition};
//! use form_core::metadata::{Concept, ControlMetadata};
//! use form_core::registry::ComponentStore;
//! use serde_json::json;
//!
//! let mut definition = FormDefinition::new("Vitals");
//! definition.controls.push(
//!     ControlMetadata::new("1", "obsControl").with_concept(Concept::new("p", "Pulse", "Numeric")),
//! );
//!
//! let store = Arc::new(ComponentStore::with_defaults());
//! let mut form = FormContainer::new(definition, Vec::new(), store).unwrap();
//! let value = form.edit("1", json!(72)).unwrap();
//! assert_eq!(value.observations.len(), 1);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::controls::{ChildControls, ControlValue};
use crate::errors::{merge_errors, FormError, FormResult, ValidationError};
use crate::mapper::ChildEdit;
use crate::metadata::ControlMetadata;
use crate::obs::Obs;
use crate::registry::ComponentStore;
use crate::script::{FormContext, NoopScriptRunner, ScriptRunner};
use crate::view::View;

/// Current schema version of saved form files.
pub const SCHEMA_VERSION: &str = "0.1.0";

fn default_version() -> String {
    "1".to_string()
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// A saved form template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub name: String,

    pub uuid: String,

    /// Published revision of the template
    #[serde(default = "default_version")]
    pub version: String,

    /// Layout of this file, checked on load
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub controls: Vec<ControlMetadata>,
}

impl FormDefinition {
    /// An empty template with a fresh uuid.
    pub fn new(name: impl Into<String>) -> Self {
        FormDefinition {
            name: name.into(),
            uuid: Uuid::new_v4().to_string(),
            version: default_version(),
            schema_version: default_schema_version(),
            controls: Vec::new(),
        }
    }

    /// Depth-first lookup of a control anywhere in the template.
    pub fn find(&self, id: &str) -> Option<&ControlMetadata> {
        self.controls.iter().find_map(|c| c.find(id))
    }
}

/// What a form reports after every edit.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FormValue {
    pub observations: Vec<Obs>,
    pub errors: Vec<ValidationError>,
}

impl FormValue {
    /// True when an error (not a warning) is outstanding.
    pub fn has_blocking_errors(&self) -> bool {
        self.errors.iter().any(ValidationError::is_blocking)
    }
}

#[derive(Debug)]
pub struct FormContainer {
    definition: FormDefinition,
    store: Arc<ComponentStore>,
    runner: Arc<dyn ScriptRunner>,
    children: ChildControls,
    /// Outstanding errors per notifying observation
    errors: Vec<(String, Vec<ValidationError>)>,
}

impl FormContainer {
    pub fn new(definition: FormDefinition, records: Vec<Obs>, store: Arc<ComponentStore>) -> FormResult<Self> {
        let children = ChildControls::build(&definition.controls, &definition.uuid, &records, &store)?;
        debug!(form = %definition.name, controls = children.len(), "form composed");
        Ok(FormContainer {
            definition,
            store,
            runner: Arc::new(NoopScriptRunner),
            children,
            errors: Vec::new(),
        })
    }

    pub fn with_runner(mut self, runner: Arc<dyn ScriptRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn children(&self) -> &ChildControls {
        &self.children
    }

    /// Apply `value` to control `target`, wherever it sits in the tree.
    pub fn edit(&mut self, target: &str, value: Value) -> FormResult<FormValue> {
        let script = self
            .definition
            .find(target)
            .ok_or_else(|| FormError::unknown_control(target))?
            .on_value_change_script()
            .map(str::to_string);

        if let Some(changed) = self.children.route_edit(target, value)? {
            let key = notification_key(&changed.obs).unwrap_or_else(|| target.to_string());
            match self.errors.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = changed.errors,
                None => self.errors.push((key, changed.errors)),
            }
        }

        if let Some(script) = script {
            self.run_script(&script)?;
        }
        self.value()
    }

    fn run_script(&mut self, script: &str) -> FormResult<()> {
        let records = self.observations()?;
        match self.runner.run(script, FormContext::new(records.clone())) {
            Ok(context) if context.records != records => {
                debug!(records = context.records.len(), "adopting records from script");
                self.children = ChildControls::build(
                    &self.definition.controls,
                    &self.definition.uuid,
                    &context.records,
                    &self.store,
                )?;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "value-change script failed"),
        }
        Ok(())
    }

    fn observations(&self) -> FormResult<Vec<Obs>> {
        Ok(self
            .children
            .values()?
            .into_iter()
            .flat_map(ControlValue::into_observations)
            .collect())
    }

    pub fn value(&self) -> FormResult<FormValue> {
        let errors = self
            .errors
            .iter()
            .fold(Vec::new(), |acc, (_, errors)| merge_errors(&acc, errors));
        Ok(FormValue {
            observations: self.observations()?,
            errors,
        })
    }

    pub fn render(&self) -> View {
        View::element("form")
            .with_text(self.definition.name.clone())
            .with_children(self.children.render())
    }
}

fn notification_key(edit: &ChildEdit) -> Option<String> {
    edit.namespace().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Concept, Events};
    use serde_json::json;

    #[derive(Debug)]
    struct CopyToTemperature;

    impl ScriptRunner for CopyToTemperature {
        fn run(&self, _script: &str, mut context: FormContext) -> FormResult<FormContext> {
            let temperature = Obs::new(Concept::new("tempUuid", "Temperature", "Numeric"))
                .with_namespace("formUuid/2")
                .set_value(json!(37));
            context.records.push(temperature);
            Ok(context)
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl ScriptRunner for Failing {
        fn run(&self, _script: &str, _context: FormContext) -> FormResult<FormContext> {
            Err(FormError::Internal {
                message: "script error".to_string(),
            })
        }
    }

    fn definition() -> FormDefinition {
        let mut pulse = ControlMetadata::new("1", "obsControl").with_concept(Concept::new("pulseUuid", "Pulse", "Numeric"));
        pulse.events = Some(Events {
            on_value_change: Some("copy".to_string()),
        });
        let mut temperature = Concept::new("tempUuid", "Temperature", "Numeric");
        temperature.hi_absolute = Some(45.0);

        FormDefinition {
            uuid: "formUuid".to_string(),
            controls: vec![
                pulse,
                ControlMetadata::new("2", "obsControl").with_concept(temperature),
            ],
            ..FormDefinition::new("Vitals")
        }
    }

    fn store() -> Arc<ComponentStore> {
        Arc::new(ComponentStore::with_defaults())
    }

    #[test]
    fn test_edit_unknown_control() {
        let mut form = FormContainer::new(definition(), vec![], store()).unwrap();
        let err = form.edit("99", json!(1)).unwrap_err();
        assert_eq!(err, FormError::unknown_control("99"));
    }

    #[test]
    fn test_script_records_are_adopted() {
        let mut form = FormContainer::new(definition(), vec![], store())
            .unwrap()
            .with_runner(Arc::new(CopyToTemperature));

        let value = form.edit("1", json!(80)).unwrap();
        let namespaces: Vec<_> = value
            .observations
            .iter()
            .filter_map(|o| o.form_namespace.as_deref())
            .collect();
        assert_eq!(namespaces, vec!["formUuid/1", "formUuid/2"]);
    }

    #[test]
    fn test_failed_script_keeps_records() {
        let mut form = FormContainer::new(definition(), vec![], store())
            .unwrap()
            .with_runner(Arc::new(Failing));

        let value = form.edit("1", json!(80)).unwrap();
        assert_eq!(value.observations.len(), 1);
    }

    #[test]
    fn test_errors_clear_when_fixed() {
        let mut form = FormContainer::new(definition(), vec![], store()).unwrap();

        let value = form.edit("2", json!(50)).unwrap();
        assert!(value.has_blocking_errors());

        let value = form.edit("2", json!(37)).unwrap();
        assert!(value.errors.is_empty());
    }

    #[test]
    fn test_definition_json_defaults() {
        let definition: FormDefinition = serde_json::from_str(r#"{"name":"Vitals","uuid":"u"}"#).unwrap();
        assert_eq!(definition.version, "1");
        assert_eq!(definition.schema_version, SCHEMA_VERSION);
        assert!(definition.controls.is_empty());
    }
}
