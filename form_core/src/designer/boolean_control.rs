//! Boolean answer designer, drawn with the registered `button` designer.

use serde_json::Value;

use super::{DesignProperties, DesignerControl, DesignerDescriptor, DesignerProps};
use crate::errors::FormResult;
use crate::metadata::{ControlMetadata, SelectOption};
use crate::view::View;

pub const BOOLEAN_YES: &str = "BOOLEAN_YES";
pub const BOOLEAN_NO: &str = "BOOLEAN_NO";

/// Yes/No options used unless the metadata brings its own.
pub fn default_options() -> Vec<SelectOption> {
    vec![
        SelectOption {
            translation_key: Some(BOOLEAN_YES.to_string()),
            name: "Yes".to_string(),
            value: Value::Bool(true),
        },
        SelectOption {
            translation_key: Some(BOOLEAN_NO.to_string()),
            name: "No".to_string(),
            value: Value::Bool(false),
        },
    ]
}

#[derive(Debug)]
pub struct BooleanControlDesigner {
    metadata: ControlMetadata,
    options: Vec<SelectOption>,
    /// `None` when no `button` designer is registered
    button: Option<Box<dyn DesignerControl>>,
}

impl BooleanControlDesigner {
    pub fn new(props: DesignerProps) -> FormResult<Self> {
        let options = props.metadata.options.clone().unwrap_or_else(default_options);

        let mut button_metadata = props.metadata.clone();
        button_metadata.options = Some(options.clone());
        let button = match props.store.get_designer_component("button") {
            Some(descriptor) => Some((descriptor.control)(DesignerProps {
                metadata: button_metadata,
                ..props.clone()
            })?),
            None => None,
        };

        Ok(BooleanControlDesigner {
            metadata: props.metadata,
            options,
            button,
        })
    }

    pub fn create(props: DesignerProps) -> FormResult<Box<dyn DesignerControl>> {
        Ok(Box::new(Self::new(props)?))
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }
}

impl DesignerControl for BooleanControlDesigner {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    fn get_json_definition(&self) -> Option<ControlMetadata> {
        let mut definition = self.metadata.clone();
        definition.options = Some(self.options.clone());
        Some(definition)
    }

    fn render(&self) -> View {
        self.button.as_ref().map(|b| b.render()).unwrap_or(View::Empty)
    }
}

pub fn descriptor() -> DesignerDescriptor {
    DesignerDescriptor {
        control: BooleanControlDesigner::create,
        design_properties: DesignProperties::nested("Boolean"),
        attributes: Vec::new(),
    }
}
