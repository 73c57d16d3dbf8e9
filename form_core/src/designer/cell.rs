//! One grid cell: an ordered stack of dropped controls.

use std::sync::Arc;

use super::{DesignerControl, Wrapper};
use crate::errors::FormResult;
use crate::metadata::{ControlMetadata, Location};
use crate::view::View;

/// Linear position of `(row, column)` in a grid `width` columns wide.
pub const fn cell_position(row: usize, column: usize, width: usize) -> usize {
    row * width + column
}

#[derive(Debug)]
struct Placed {
    metadata: ControlMetadata,
    control: Option<Box<dyn DesignerControl>>,
}

impl Placed {
    fn definition(&self) -> Option<ControlMetadata> {
        self.control.as_ref().and_then(|c| c.get_json_definition())
    }
}

#[derive(Debug)]
pub struct Cell {
    location: Location,
    width: usize,
    wrapper: Arc<dyn Wrapper>,
    placed: Vec<Placed>,
}

impl Cell {
    pub fn new(location: Location, width: usize, wrapper: Arc<dyn Wrapper>) -> Self {
        Cell {
            location,
            width,
            wrapper,
            placed: Vec::new(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn position(&self) -> usize {
        cell_position(self.location.row, self.location.column, self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Ids in stacking order.
    pub fn ids(&self) -> Vec<&str> {
        self.placed.iter().map(|p| p.metadata.id.as_str()).collect()
    }

    /// Drop a control here. The metadata is copied with this cell's location
    /// stamped into its properties and appended after anything already in the
    /// cell. Returns the cell position for the row to act on.
    pub fn drop(&mut self, metadata: &ControlMetadata) -> FormResult<usize> {
        let mut metadata = metadata.clone();
        metadata.properties.location = Some(self.location);
        self.place(metadata)?;
        Ok(self.position())
    }

    /// Add a control already carrying its location, without signalling.
    pub(crate) fn place(&mut self, metadata: ControlMetadata) -> FormResult<()> {
        let control = self.wrapper.wrap(&metadata)?;
        self.placed.push(Placed { metadata, control });
        Ok(())
    }

    /// Remove the control with `id`. The others keep their order.
    ///
    /// Returns the control's current definition, falling back to the metadata
    /// it was dropped with.
    pub fn move_out(&mut self, id: &str) -> Option<ControlMetadata> {
        let index = self.placed.iter().position(|p| p.metadata.id == id)?;
        let placed = self.placed.remove(index);
        Some(placed.definition().unwrap_or(placed.metadata))
    }

    /// Definitions of the wrapped controls, in stacking order.
    pub fn cell_definition(&self) -> Vec<ControlMetadata> {
        self.placed.iter().filter_map(Placed::definition).collect()
    }

    pub fn control_mut(&mut self, id: &str) -> Option<&mut dyn DesignerControl> {
        let placed = self.placed.iter_mut().find(|p| p.metadata.id == id)?;
        let control: &mut dyn DesignerControl = placed.control.as_deref_mut()?;
        Some(control)
    }

    pub fn render(&self) -> View {
        if self.placed.is_empty() {
            return View::Placeholder;
        }
        let wrapped = self
            .placed
            .iter()
            .map(|p| {
                let inner = p.control.as_ref().map(|c| c.render()).unwrap_or(View::Empty);
                View::element("controlWrapper").with_child(inner)
            })
            .collect();
        View::element("cell").with_children(wrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Concept;
    use crate::registry::ComponentStore;
    use crate::designer::RegistryWrapper;

    fn cell(row: usize, column: usize) -> Cell {
        let wrapper = Arc::new(RegistryWrapper::new(Arc::new(ComponentStore::with_defaults())));
        Cell::new(Location::new(row, column), 4, wrapper)
    }

    fn pulse(id: &str) -> ControlMetadata {
        ControlMetadata::new(id, "obsControl").with_concept(Concept::new("pulseUuid", "Pulse", "Numeric"))
    }

    #[test]
    fn test_drop_stamps_location_and_signals_position() {
        let mut cell = cell(1, 2);
        let position = cell.drop(&pulse("1").with_location(5, 5)).unwrap();

        assert_eq!(position, 6);
        assert_eq!(cell.cell_definition()[0].location(), Some(Location::new(1, 2)));
    }

    #[test]
    fn test_drop_into_occupied_cell_appends() {
        let mut cell = cell(0, 0);
        cell.drop(&pulse("1")).unwrap();
        cell.drop(&pulse("2")).unwrap();
        assert_eq!(cell.ids(), vec!["1", "2"]);
    }

    #[test]
    fn test_move_out_keeps_remaining_order() {
        let mut cell = cell(0, 0);
        for id in ["1", "2", "3"] {
            cell.drop(&pulse(id)).unwrap();
        }

        let moved = cell.move_out("2").unwrap();
        assert_eq!(moved.id, "2");
        assert_eq!(cell.ids(), vec!["1", "3"]);
        assert_eq!(cell.move_out("2"), None);
    }

    #[test]
    fn test_unwrappable_control_contributes_nothing() {
        let mut cell = cell(0, 0);
        cell.drop(&ControlMetadata::new("1", "noDesigner")).unwrap();
        cell.drop(&pulse("2")).unwrap();

        let ids: Vec<_> = cell.cell_definition().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["2"]);
        assert_eq!(cell.render().children()[0].children(), &[View::Empty]);
    }

    #[test]
    fn test_empty_cell_renders_placeholder() {
        assert_eq!(cell(0, 0).render(), View::Placeholder);
    }
}
