//! Designer for an obs group: a label over a nested grid of member controls.
//!
//! The nested grid shows no empty rows of its own (`min_rows = 0`); rows
//! appear as members are laid out. Until a concept is chosen the designer
//! only asks for one and contributes no definition.

use serde_json::json;

use super::concept::{metadata_for_concept, IdGenerator};
use super::label::label_definition;
use super::{
    AttributeDescriptor, DesignProperties, DesignerControl, DesignerDescriptor, DesignerProps, Grid,
};
use crate::errors::FormResult;
use crate::metadata::{Concept, ControlMetadata, Label};
use crate::view::View;

#[derive(Debug)]
pub struct ObsGroupControlDesigner {
    metadata: ControlMetadata,
    /// Present once a concept is bound
    grid: Option<Grid>,
}

impl ObsGroupControlDesigner {
    pub fn new(props: DesignerProps) -> FormResult<Self> {
        let grid = match props.metadata.concept {
            Some(_) => Some(Grid::new(&props.metadata.controls, props.columns, 0, props.wrapper)?),
            None => None,
        };
        Ok(ObsGroupControlDesigner {
            metadata: props.metadata,
            grid,
        })
    }

    pub fn create(props: DesignerProps) -> FormResult<Box<dyn DesignerControl>> {
        Ok(Box::new(Self::new(props)?))
    }

    /// Replace `metadata`'s content with the tree for `concept`, keeping its
    /// id and location.
    pub fn inject_concept(metadata: &ControlMetadata, concept: &Concept, id_gen: &mut IdGenerator) -> ControlMetadata {
        metadata_for_concept(
            concept,
            id_gen,
            "obsGroupControl",
            "obsControl",
            metadata.location(),
            Some(&metadata.id),
        )
    }

    /// The label as saved: the metadata's own, else the concept name.
    fn label(&self) -> Label {
        let label = self.metadata.label.clone().unwrap_or_else(|| {
            Label::new(self.metadata.concept.as_ref().map(|c| c.name.clone()).unwrap_or_default())
        });
        label_definition(&label, &self.metadata.id)
    }
}

impl DesignerControl for ObsGroupControlDesigner {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    fn get_json_definition(&self) -> Option<ControlMetadata> {
        let grid = self.grid.as_ref()?;
        let label = self.label();

        let mut definition = self.metadata.clone();
        definition.controls = grid.get_controls();
        if let Some(description) = definition.concept.as_mut().and_then(|c| c.description.as_mut()) {
            if description.translation_key.is_none() {
                description.translation_key = label.translation_key.as_ref().map(|key| format!("{}_DESC", key));
            }
        }
        definition.label = Some(label);
        Some(definition)
    }

    fn render(&self) -> View {
        let Some(grid) = &self.grid else {
            return View::element("controlWrapperContent").with_text("Select ObsGroup Source");
        };

        let mut view = View::element("fieldset");
        if self.metadata.is_add_more() {
            view = view.with_child(View::element("addMore"));
        }
        let mut body = View::element("obsGroupControls");
        let description = self.metadata.concept.as_ref().and_then(|c| c.description.as_ref());
        if let Some(description) = description.filter(|d| !d.value.is_empty()) {
            body = body.with_child(View::element("description").with_text(description.value.clone()));
        }

        view.with_child(View::element("legend").with_text(self.label().value))
            .with_child(body.with_child(grid.render()))
    }

    fn grid_mut(&mut self) -> Option<&mut Grid> {
        self.grid.as_mut()
    }
}

pub fn descriptor() -> DesignerDescriptor {
    DesignerDescriptor {
        control: ObsGroupControlDesigner::create,
        design_properties: DesignProperties::top_level("ObsGroup"),
        attributes: vec![
            AttributeDescriptor::new("type", "text").with_default(json!("obsGroupControl")),
            AttributeDescriptor::complex(
                "label",
                vec![
                    AttributeDescriptor::new("type", "text").with_default(json!("label")),
                    AttributeDescriptor::new("value", "text").with_default(json!("Label")),
                ],
            ),
            AttributeDescriptor::complex(
                "properties",
                vec![AttributeDescriptor::new("addMore", "boolean").with_default(json!(false))],
            ),
        ],
    }
}
