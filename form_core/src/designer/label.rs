//! Label designer. The saved label always carries a translation key.

use serde_json::json;

use super::{AttributeDescriptor, DesignProperties, DesignerControl, DesignerDescriptor, DesignerProps};
use crate::errors::FormResult;
use crate::metadata::{ControlMetadata, Label};
use crate::translation::TranslationKeyGenerator;
use crate::view::View;

#[derive(Debug)]
pub struct LabelDesigner {
    metadata: ControlMetadata,
}

impl LabelDesigner {
    pub fn new(metadata: ControlMetadata) -> Self {
        LabelDesigner { metadata }
    }

    pub fn create(props: DesignerProps) -> FormResult<Box<dyn DesignerControl>> {
        Ok(Box::new(Self::new(props.metadata)))
    }
}

/// `label` as owned by control `id`, with a generated key when it has none.
pub fn label_definition(label: &Label, id: &str) -> Label {
    let mut label = label.clone();
    label.id = Some(id.to_string());
    if label.translation_key.is_none() {
        label.translation_key = Some(TranslationKeyGenerator::new(&label.value, id).build());
    }
    label
}

impl DesignerControl for LabelDesigner {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    fn get_json_definition(&self) -> Option<ControlMetadata> {
        let mut definition = self.metadata.clone();
        if definition.translation_key.is_none() {
            let value = definition.value.clone().unwrap_or_default();
            definition.translation_key = Some(TranslationKeyGenerator::new(value, &definition.id).build());
        }
        Some(definition)
    }

    fn render(&self) -> View {
        View::element("label").with_text(self.metadata.display_text().unwrap_or_default())
    }
}

pub fn descriptor() -> DesignerDescriptor {
    DesignerDescriptor {
        control: LabelDesigner::create,
        design_properties: DesignProperties::top_level("Label"),
        attributes: vec![
            AttributeDescriptor::new("type", "text").with_default(json!("label")),
            AttributeDescriptor::new("value", "text").with_default(json!("Label")),
        ],
    }
}
