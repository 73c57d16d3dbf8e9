//! Leaf control bound to one concept.

use serde_json::Value;

use super::{Control, ControlProps, ControlValue, ValueChanged};
use crate::errors::{FormError, FormResult, ValidationError};
use crate::metadata::ControlMetadata;
use crate::obs::Obs;
use crate::validation;
use crate::view::View;

#[derive(Debug)]
pub struct ObsControl {
    metadata: ControlMetadata,
    obs: Obs,
    errors: Vec<ValidationError>,
}

impl ObsControl {
    /// Bind to the recorded observation, or start an empty one for the concept.
    pub fn new(props: ControlProps) -> FormResult<Self> {
        let namespace = props.namespace();
        let concept = props
            .metadata
            .concept
            .clone()
            .ok_or_else(|| FormError::missing_field(format!("controls[{}].concept", props.metadata.id)))?;

        let obs = props
            .obs
            .unwrap_or_else(|| Obs::new(concept).with_namespace(namespace));

        Ok(ObsControl {
            metadata: props.metadata,
            obs,
            errors: Vec::new(),
        })
    }

    pub fn create(props: ControlProps) -> FormResult<Box<dyn Control>> {
        Ok(Box::new(Self::new(props)?))
    }

    pub fn obs(&self) -> &Obs {
        &self.obs
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Record a new value (empty clears and voids) and validate it.
    pub fn set_value(&mut self, value: Value) -> ValueChanged {
        self.obs = self.obs.set_value(value);
        self.errors = validation::validate(&self.metadata, &self.obs);
        ValueChanged::new(self.obs.clone(), self.errors.clone())
    }
}

impl Control for ObsControl {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    fn get_value(&self) -> FormResult<Option<ControlValue>> {
        if self.obs.has_data() {
            Ok(Some(ControlValue::Obs(self.obs.clone())))
        } else {
            Ok(None)
        }
    }

    fn render(&self) -> View {
        let mut view = View::element("obsControl");
        if let Some(text) = self.metadata.display_text() {
            view = view.with_child(View::element("label").with_text(text));
        }
        let shown = match &self.obs.value {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        view.with_child(View::element("input").with_text(shown))
    }

    fn edit(&mut self, target: &str, value: Value) -> FormResult<Option<ValueChanged>> {
        if target != self.metadata.id {
            return Err(FormError::unknown_control(target));
        }
        Ok(Some(self.set_value(value)))
    }
}
