//! Designer grid behaviour through the public API.

use std::sync::Arc;

use form_core::designer::{
    cell_position, Grid, IdGenerator, ObsGroupControlDesigner, RegistryWrapper, Row, RowCompleted,
    Wrapper,
};
use form_core::metadata::{Concept, ControlMetadata, Location};
use form_core::{ComponentStore, View, DEFAULT_ROW_WIDTH};
use pretty_assertions::assert_eq;
use rstest::rstest;

const W: usize = DEFAULT_ROW_WIDTH;

fn wrapper() -> Arc<dyn Wrapper> {
    Arc::new(RegistryWrapper::new(Arc::new(ComponentStore::with_defaults())))
}

fn pulse(id: &str) -> ControlMetadata {
    ControlMetadata::new(id, "obsControl").with_concept(Concept::new("pulseUuid", "Pulse", "Numeric"))
}

#[rstest]
#[case(0, 0, 0)]
#[case(0, 3, 3)]
#[case(1, 0, 4)]
#[case(2, 1, 9)]
fn test_cell_position(#[case] row: usize, #[case] column: usize, #[case] expected: usize) {
    assert_eq!(cell_position(row, column, W), expected);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(4)]
#[case(7)]
fn test_positions_are_contiguous_across_rows(#[case] width: usize) {
    for row in 0..5 {
        for column in 1..width {
            assert!(cell_position(row, column, width) > cell_position(row, column - 1, width));
        }
        assert_eq!(cell_position(row, width - 1, width) + 1, cell_position(row + 1, 0, width));
    }
}

#[rstest]
#[case(W - 1, Some(RowCompleted(0)))]
#[case(W - 2, None)]
#[case(0, None)]
fn test_row_completion_fires_only_in_last_column(#[case] column: usize, #[case] expected: Option<RowCompleted>) {
    let mut row = Row::new(0, W, wrapper());
    assert_eq!(row.drop(column, &pulse("1")).unwrap(), expected);
}

#[test]
fn test_drop_into_last_column_grows_grid_once() {
    let mut grid = Grid::new(&[], W, 1, wrapper()).unwrap();
    assert_eq!(grid.row_count(), 1);

    assert_eq!(grid.drop(Location::new(0, W - 2), pulse("1")).unwrap(), None);
    assert_eq!(grid.row_count(), 1);

    assert_eq!(grid.drop(Location::new(0, W - 1), pulse("2")).unwrap(), Some(RowCompleted(0)));
    assert_eq!(grid.row_count(), 2);

    // completing the same row again does not grow it further
    assert_eq!(grid.drop(Location::new(0, W - 1), pulse("3")).unwrap(), Some(RowCompleted(0)));
    assert_eq!(grid.row_count(), 2);
}

#[test]
fn test_layout_round_trips_through_definitions() {
    let controls = vec![
        pulse("1").with_location(0, 0),
        pulse("2").with_location(0, 2),
        ControlMetadata::new("3", "label").with_value("Notes").with_location(1, 1),
    ];
    let grid = Grid::new(&controls, W, 2, wrapper()).unwrap();
    let saved = grid.get_controls();

    let ids: Vec<_> = saved.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    let locations: Vec<_> = saved.iter().map(|c| c.location()).collect();
    assert_eq!(
        locations,
        vec![Some(Location::new(0, 0)), Some(Location::new(0, 2)), Some(Location::new(1, 1))]
    );

    let reloaded = Grid::new(&saved, W, 2, wrapper()).unwrap();
    assert_eq!(reloaded.get_controls(), saved);
}

#[test]
fn test_render_shows_placeholders_for_empty_cells() {
    let grid = Grid::new(&[pulse("1").with_location(0, 1)], W, 2, wrapper()).unwrap();
    let view = grid.render();

    assert_eq!(view.children().len(), 2);
    assert_eq!(view.placeholders(), 2 * W - 1);
    assert_eq!(view.count("controlWrapper"), 1);
}

#[test]
fn test_concept_injection_then_nested_drop() {
    let mut vitals = Concept::new("vitalsUuid", "Vitals", "N/A");
    vitals.set_members = vec![
        Concept::new("pulseUuid", "Pulse", "Numeric"),
        Concept::new("tempUuid", "Temperature", "Numeric"),
    ];

    let mut grid = Grid::new(&[], W, 1, wrapper()).unwrap();
    grid.drop(Location::new(0, 0), ControlMetadata::new("1", "obsGroupControl")).unwrap();
    assert_eq!(grid.render().find("controlWrapperContent").and_then(View::text), Some("Select ObsGroup Source"));

    let placeholder = grid.move_control(Location::new(0, 0), "1").unwrap();
    let mut id_gen = IdGenerator::from_controls(&[placeholder.clone()]);
    let injected = ObsGroupControlDesigner::inject_concept(&placeholder, &vitals, &mut id_gen);
    grid.drop(Location::new(0, 0), injected).unwrap();

    let nested = grid
        .find_control_mut("1")
        .and_then(|control| control.grid_mut())
        .unwrap();
    assert_eq!(nested.row_count(), 2);
    nested.drop(Location::new(1, 1), pulse(&id_gen.next_id())).unwrap();

    let saved = grid.get_controls();
    assert_eq!(saved.len(), 1);
    let ids: Vec<_> = saved[0].controls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3", "4"]);
}
