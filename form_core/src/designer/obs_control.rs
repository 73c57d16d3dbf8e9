//! Designer for a single-concept control.
//!
//! The answer widget is whatever designer is registered under the concept's
//! datatype in lower case (`boolean`, ...). Datatypes without one show only
//! the label.

use serde_json::json;

use super::label::label_definition;
use super::{AttributeDescriptor, DesignProperties, DesignerControl, DesignerDescriptor, DesignerProps};
use crate::errors::FormResult;
use crate::metadata::ControlMetadata;
use crate::view::View;

#[derive(Debug)]
pub struct ObsControlDesigner {
    metadata: ControlMetadata,
    answer: Option<Box<dyn DesignerControl>>,
}

impl ObsControlDesigner {
    pub fn new(props: DesignerProps) -> FormResult<Self> {
        let datatype = props
            .metadata
            .concept
            .as_ref()
            .and_then(|c| c.datatype.as_deref())
            .map(str::to_lowercase);

        let answer = match datatype.and_then(|d| props.store.get_designer_component(&d)) {
            Some(descriptor) => Some((descriptor.control)(props.clone())?),
            None => None,
        };

        Ok(ObsControlDesigner {
            metadata: props.metadata,
            answer,
        })
    }

    pub fn create(props: DesignerProps) -> FormResult<Box<dyn DesignerControl>> {
        Ok(Box::new(Self::new(props)?))
    }
}

impl DesignerControl for ObsControlDesigner {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    fn get_json_definition(&self) -> Option<ControlMetadata> {
        let mut definition = self
            .answer
            .as_ref()
            .and_then(|a| a.get_json_definition())
            .unwrap_or_else(|| self.metadata.clone());
        if let Some(label) = definition.label.take() {
            definition.label = Some(label_definition(&label, &definition.id));
        }
        Some(definition)
    }

    fn render(&self) -> View {
        if self.metadata.concept.is_none() {
            return View::element("controlWrapperContent").with_text("Select Obs Source");
        }
        let mut view = View::element("obsControl")
            .with_child(View::element("label").with_text(self.metadata.display_text().unwrap_or_default()));
        if let Some(answer) = &self.answer {
            view = view.with_child(answer.render());
        }
        view
    }
}

pub fn descriptor() -> DesignerDescriptor {
    DesignerDescriptor {
        control: ObsControlDesigner::create,
        design_properties: DesignProperties::top_level("Obs"),
        attributes: vec![
            AttributeDescriptor::new("type", "text").with_default(json!("obsControl")),
            AttributeDescriptor::complex(
                "label",
                vec![
                    AttributeDescriptor::new("type", "text").with_default(json!("label")),
                    AttributeDescriptor::new("value", "text").with_default(json!("Label")),
                ],
            ),
            AttributeDescriptor::complex(
                "properties",
                vec![AttributeDescriptor::new("mandatory", "boolean").with_default(json!(false))],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designer::boolean_control::default_options;
    use crate::designer::RegistryWrapper;
    use crate::metadata::{Concept, Label};
    use crate::registry::ComponentStore;
    use std::sync::Arc;

    fn props(metadata: ControlMetadata) -> DesignerProps {
        let store = Arc::new(ComponentStore::with_defaults());
        let wrapper = Arc::new(RegistryWrapper::new(Arc::clone(&store)));
        DesignerProps::new(metadata, store, wrapper)
    }

    #[test]
    fn test_boolean_concept_uses_boolean_designer() {
        let metadata = ControlMetadata::new("4", "obsControl")
            .with_concept(Concept::new("smokerUuid", "Smoker", "Boolean"))
            .with_label(Label::new("Smoker"));
        let designer = ObsControlDesigner::new(props(metadata)).unwrap();

        assert_eq!(designer.render().count("option"), 2);
        let definition = designer.get_json_definition().unwrap();
        assert_eq!(definition.options, Some(default_options()));
        assert_eq!(
            definition.label.and_then(|l| l.translation_key),
            Some("SMOKER_4".to_string())
        );
    }

    #[test]
    fn test_numeric_concept_renders_label_only() {
        let metadata = ControlMetadata::new("5", "obsControl").with_concept(Concept::new("p", "Pulse", "Numeric"));
        let view = ObsControlDesigner::new(props(metadata)).unwrap().render();
        assert_eq!(view.children().len(), 1);
        assert_eq!(view.find("label").and_then(View::text), Some("Pulse"));
    }

    #[test]
    fn test_without_concept_asks_for_source() {
        let view = ObsControlDesigner::new(props(ControlMetadata::new("6", "obsControl")))
            .unwrap()
            .render();
        assert_eq!(view.text(), Some("Select Obs Source"));
    }
}
