//! # form_cli
//!
//! Command-line front end for `form_core`: render a form template, fill it
//! from the command line, inspect its designer layout, or drop concepts onto
//! it. Files being written are locked for the duration of the command.
//!
//! Logs go to stderr; set `RUST_LOG` (default `form_core=info`) to see more.

mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use form_core::designer::{metadata_for_concept, Grid, IdGenerator, RegistryWrapper};
use form_core::file_io::{
    load_concept, load_form, load_form_with_lock_check, load_observations, load_settings, save_form,
    save_observations, FileLock,
};
use form_core::{
    component_store, ControlMetadata, FormContainer, FormError, FormResult, FormSettings, Location, Obs,
};

use crate::cli::{Cli, Cmd};

fn initialize_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("form_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_records(path: Option<&Path>) -> FormResult<Vec<Obs>> {
    path.map(load_observations).transpose().map(Option::unwrap_or_default)
}

/// Split `id=value`; the value is JSON when it parses, a string otherwise.
fn parse_edit(raw: &str) -> FormResult<(String, Value)> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| FormError::invalid_input("--set", raw, "expected ID=VALUE"))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((id.trim().to_string(), value))
}

fn render(form: &Path, obs: Option<&Path>, json: bool) -> FormResult<()> {
    let definition = load_form(form)?;
    let container = FormContainer::new(definition, load_records(obs)?, component_store())?;
    let view = container.render();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.outline());
    }
    Ok(())
}

fn fill(form: &Path, edits: &[String], obs: Option<&Path>, out: Option<&Path>) -> FormResult<()> {
    let definition = load_form(form)?;
    let mut container = FormContainer::new(definition, load_records(obs)?, component_store())?;

    for raw in edits {
        let (id, value) = parse_edit(raw)?;
        container.edit(&id, value)?;
    }

    let value = container.value()?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    if let Some(out) = out {
        let _lock = FileLock::acquire(out, "form_cli")?;
        save_observations(&value.observations, out)?;
        info!(path = %out.display(), records = value.observations.len(), "observations saved");
    }
    Ok(())
}

fn designer_grid(controls: &[ControlMetadata], settings: &FormSettings) -> FormResult<Grid> {
    let store = component_store();
    let wrapper = Arc::new(RegistryWrapper::new(Arc::clone(&store)).with_columns(settings.columns()));
    Grid::new(controls, settings.columns(), settings.min_rows, wrapper)
}

fn layout(form: &Path, settings: &FormSettings) -> FormResult<()> {
    let (definition, lock) = load_form_with_lock_check(form)?;
    let grid = designer_grid(&definition.controls, settings)?;

    println!("{} ({} columns)", definition.name, grid.columns());
    if let Some(lock) = lock {
        println!("  locked by {} on {} since {}", lock.user_id, lock.machine, lock.locked_at.to_rfc3339());
    }
    for position in 0..grid.row_count() {
        let Some(row) = grid.row(position) else { continue };
        let cells: Vec<String> = (0..row.columns())
            .map(|column| match row.cell(column) {
                Some(cell) if !cell.is_empty() => format!("[{}]", cell.ids().join(",")),
                _ => "[ ]".to_string(),
            })
            .collect();
        println!("  row {}: {}", position, cells.join(" "));
    }
    Ok(())
}

/// Drop `concept` at `location` and save the form back in place.
fn design(form: &Path, concept: &Path, location: Location, user: &str, settings: &FormSettings) -> FormResult<()> {
    let _lock = FileLock::acquire(form, user)?;
    let mut definition = load_form(form)?;
    let concept = load_concept(concept)?;

    let mut grid = designer_grid(&definition.controls, settings)?;
    let mut ids = IdGenerator::from_controls(&definition.controls);
    let metadata = metadata_for_concept(&concept, &mut ids, "obsGroupControl", "obsControl", Some(location), None);
    let id = metadata.id.clone();
    grid.drop(location, metadata)?;

    definition.controls = grid.get_controls();
    save_form(&definition, form)?;
    info!(path = %form.display(), id = %id, concept = %concept.name, "control added");
    Ok(())
}

fn run(cli: Cli) -> FormResult<()> {
    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => FormSettings::default(),
    };

    match cli.cmd {
        Cmd::Render { form, obs, json } => render(&form, obs.as_deref(), json),
        Cmd::Fill { form, edits, obs, out } => fill(&form, &edits, obs.as_deref(), out.as_deref()),
        Cmd::Layout { form } => layout(&form, &settings),
        Cmd::Design {
            form,
            concept,
            row,
            column,
            user,
        } => design(&form, &concept, Location::new(row, column), &user, &settings),
    }
}

fn main() -> ExitCode {
    initialize_logging();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_core::{Concept, FormDefinition};
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_parse_edit_json_and_text() {
        assert_eq!(parse_edit("100=72").unwrap(), ("100".to_string(), json!(72)));
        assert_eq!(parse_edit("7=true").unwrap(), ("7".to_string(), json!(true)));
        assert_eq!(parse_edit("3=Yes please").unwrap(), ("3".to_string(), json!("Yes please")));
        assert_eq!(parse_edit("3=").unwrap(), ("3".to_string(), json!("")));
    }

    #[test]
    fn test_parse_edit_requires_separator() {
        assert_eq!(parse_edit("100").unwrap_err().error_code(), "INVALID_INPUT");
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("form_cli_test_{}_{}.json", name, std::process::id()))
    }

    fn write_fixtures(name: &str) -> (PathBuf, PathBuf) {
        let form = temp_path(&format!("{name}_form"));
        let concept = temp_path(&format!("{name}_concept"));

        let mut definition = FormDefinition::new("Vitals");
        definition.controls.push(
            ControlMetadata::new("1", "obsControl")
                .with_concept(Concept::new("p", "Pulse", "Numeric"))
                .with_location(0, 0),
        );
        save_form(&definition, &form).unwrap();
        std::fs::write(
            &concept,
            json!({
                "uuid": "bpUuid",
                "name": "Blood Pressure",
                "datatype": "N/A",
                "setMembers": [
                    {"uuid": "sbpUuid", "name": "Systolic", "datatype": "Numeric"},
                    {"uuid": "dbpUuid", "name": "Diastolic", "datatype": "Numeric"}
                ]
            })
            .to_string(),
        )
        .unwrap();
        (form, concept)
    }

    fn cleanup(paths: &[&Path]) {
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn test_design_adds_concept_at_location() {
        let (form, concept) = write_fixtures("design");

        design(&form, &concept, Location::new(1, 2), "designer@clinic.org", &FormSettings::default()).unwrap();

        let saved = load_form(&form).unwrap();
        assert_eq!(saved.controls.len(), 2);
        let group = &saved.controls[1];
        assert_eq!(group.id, "2");
        assert_eq!(group.control_type, "obsGroupControl");
        assert_eq!(group.location(), Some(Location::new(1, 2)));
        assert_eq!(group.controls.len(), 2);
        assert!(FileLock::check(&form).is_none());

        cleanup(&[&form, &concept]);
    }

    #[test]
    fn test_design_refuses_a_locked_form() {
        let (form, concept) = write_fixtures("locked");
        let held = FileLock::acquire(&form, "someone@clinic.org").unwrap();

        let err = design(&form, &concept, Location::new(1, 0), "designer@clinic.org", &FormSettings::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert_eq!(load_form(&form).unwrap().controls.len(), 1);

        drop(held);
        cleanup(&[&form, &concept]);
    }

    #[test]
    fn test_design_rejects_a_row_past_the_limit() {
        let (form, concept) = write_fixtures("overflow");

        let err = design(&form, &concept, Location::new(usize::MAX, 0), "designer@clinic.org", &FormSettings::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_LOCATION");

        cleanup(&[&form, &concept]);
    }
}
