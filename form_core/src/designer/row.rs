//! A fixed-width row of cells.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::{cell_position, Cell, DesignerControl, Wrapper};
use crate::errors::{FormError, FormResult};
use crate::metadata::{ControlMetadata, Location};
use crate::view::View;

/// Signal raised when a drop lands in the last column of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCompleted(pub usize);

#[derive(Debug)]
pub struct Row {
    position: usize,
    columns: usize,
    wrapper: Arc<dyn Wrapper>,
    /// Cells are created on first use
    cells: BTreeMap<usize, Cell>,
}

impl Row {
    pub fn new(position: usize, columns: usize, wrapper: Arc<dyn Wrapper>) -> Self {
        Row {
            position,
            columns: columns.max(1),
            wrapper,
            cells: BTreeMap::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(&column)
    }

    fn cell_mut(&mut self, column: usize) -> FormResult<&mut Cell> {
        if column >= self.columns {
            return Err(FormError::invalid_location(
                self.position,
                column,
                format!("row has {} columns", self.columns),
            ));
        }
        let location = Location::new(self.position, column);
        let (columns, wrapper) = (self.columns, &self.wrapper);
        Ok(self
            .cells
            .entry(column)
            .or_insert_with(|| Cell::new(location, columns, Arc::clone(wrapper))))
    }

    /// Drop into `column`; reports completion when that is the last column.
    pub fn drop(&mut self, column: usize, metadata: &ControlMetadata) -> FormResult<Option<RowCompleted>> {
        let signalled = self.cell_mut(column)?.drop(metadata)?;
        Ok(self.on_cell_change(signalled))
    }

    pub(crate) fn place(&mut self, column: usize, metadata: ControlMetadata) -> FormResult<()> {
        self.cell_mut(column)?.place(metadata)
    }

    fn on_cell_change(&self, position: usize) -> Option<RowCompleted> {
        let last = cell_position(self.position, self.columns - 1, self.columns);
        if position == last {
            debug!(row = self.position, "row complete");
            Some(RowCompleted(self.position))
        } else {
            None
        }
    }

    pub fn move_out(&mut self, column: usize, id: &str) -> Option<ControlMetadata> {
        self.cells.get_mut(&column)?.move_out(id)
    }

    /// Cell definitions concatenated in column order.
    pub fn row_definition(&self) -> Vec<ControlMetadata> {
        self.cells.values().flat_map(Cell::cell_definition).collect()
    }

    pub fn control_mut(&mut self, id: &str) -> Option<&mut dyn DesignerControl> {
        self.cells.values_mut().find_map(|cell| cell.control_mut(id))
    }

    pub fn render(&self) -> View {
        let cells = (0..self.columns)
            .map(|column| self.cells.get(&column).map(Cell::render).unwrap_or(View::Placeholder))
            .collect();
        View::element("row").with_children(cells)
    }
}
