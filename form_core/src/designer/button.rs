//! Button group: one button per option. Used by choice-style designers.

use super::{DesignProperties, DesignerControl, DesignerDescriptor, DesignerProps};
use crate::errors::FormResult;
use crate::metadata::ControlMetadata;
use crate::view::View;

#[derive(Debug)]
pub struct ButtonDesigner {
    metadata: ControlMetadata,
}

impl ButtonDesigner {
    pub fn create(props: DesignerProps) -> FormResult<Box<dyn DesignerControl>> {
        Ok(Box::new(ButtonDesigner {
            metadata: props.metadata,
        }))
    }
}

impl DesignerControl for ButtonDesigner {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    fn get_json_definition(&self) -> Option<ControlMetadata> {
        Some(self.metadata.clone())
    }

    fn render(&self) -> View {
        let buttons = self
            .metadata
            .options
            .iter()
            .flatten()
            .map(|option| View::element("option").with_text(option.name.clone()))
            .collect();
        View::element("button").with_children(buttons)
    }
}

pub fn descriptor() -> DesignerDescriptor {
    DesignerDescriptor {
        control: ButtonDesigner::create,
        design_properties: DesignProperties::nested("Button"),
        attributes: Vec::new(),
    }
}
