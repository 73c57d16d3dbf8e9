//! Table: column headers over rows of controls grouped by `location.row`.

use serde_json::Value;

use super::{group_by_row, ChildControls, Control, ControlProps, ControlValue, ValueChanged};
use crate::errors::FormResult;
use crate::metadata::{ControlMetadata, Label};
use crate::view::View;

#[derive(Debug)]
pub struct Table {
    metadata: ControlMetadata,
    children: ChildControls,
}

impl Table {
    pub fn new(props: ControlProps) -> FormResult<Self> {
        let children = ChildControls::build(
            &props.metadata.controls,
            &props.form_uuid,
            &props.records,
            &props.store,
        )?;
        Ok(Table {
            metadata: props.metadata,
            children,
        })
    }

    pub fn create(props: ControlProps) -> FormResult<Box<dyn Control>> {
        Ok(Box::new(Self::new(props)?))
    }

    fn header(label: &Label) -> View {
        View::element("columnHeader").with_text(label.value.clone())
    }
}

impl Control for Table {
    fn metadata(&self) -> &ControlMetadata {
        &self.metadata
    }

    fn get_value(&self) -> FormResult<Option<ControlValue>> {
        Ok(Some(ControlValue::List(self.children.values()?)))
    }

    fn render(&self) -> View {
        let headers = self.metadata.column_headers.iter().map(Self::header).collect();
        let rows = group_by_row(&self.metadata.controls)
            .into_values()
            .map(|controls| {
                let ids: Vec<&str> = controls.iter().map(|c| c.id.as_str()).collect();
                View::element("tableRow").with_children(self.children.render_ids(&ids))
            })
            .collect();

        View::element("table")
            .with_child(View::element("tableHeader").with_text(self.metadata.display_text().unwrap_or_default()))
            .with_child(View::element("header").with_children(headers))
            .with_child(View::element("body").with_children(rows))
    }

    fn edit(&mut self, target: &str, value: Value) -> FormResult<Option<ValueChanged>> {
        self.children.route_edit(target, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Concept;
    use crate::registry::ComponentStore;
    use std::sync::Arc;

    fn cell(id: &str, row: usize, column: usize) -> ControlMetadata {
        ControlMetadata::new(id, "obsControl")
            .with_concept(Concept::new(format!("c{}", id), format!("Concept {}", id), "Text"))
            .with_location(row, column)
    }

    #[test]
    fn test_table_renders_headers_and_rows() {
        let mut metadata = ControlMetadata::new("1", "table")
            .with_label(Label::new("Medications"))
            .with_control(cell("2", 0, 0))
            .with_control(cell("3", 1, 0))
            .with_control(cell("4", 0, 1))
            .with_control(ControlMetadata::new("5", "unknownType").with_location(1, 1));
        metadata.column_headers = vec![Label::new("Drug"), Label::new("Dose")];

        let store = Arc::new(ComponentStore::with_defaults());
        let table = Table::new(ControlProps::new(metadata, "f", store)).unwrap();
        let view = table.render();

        assert_eq!(view.count("columnHeader"), 2);
        let body = view.find("body").unwrap();
        assert_eq!(body.children().len(), 2);

        // row 0 keeps definition order: "2" then "4"
        let row0 = &body.children()[0];
        assert_eq!(row0.count("obsControl"), 2);
        assert_eq!(row0.children()[0].find("label").and_then(View::text), Some("Concept 2"));
        assert_eq!(row0.children()[1].find("label").and_then(View::text), Some("Concept 4"));

        // the unresolved control leaves an empty slot in row 1
        let row1 = &body.children()[1];
        assert_eq!(row1.children()[1], View::Empty);
    }
}
