use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "form_cli", version, about = "Render, fill, lay out and design clinical forms")]
pub struct Cli {
    /// Settings file (row width, minimum rows)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Print the render tree of a form
    Render {
        form: PathBuf,
        /// Existing observation records
        #[arg(long)]
        obs: Option<PathBuf>,
        /// Print JSON instead of an outline
        #[arg(long)]
        json: bool,
    },
    /// Apply edits and report observations and validation errors
    Fill {
        form: PathBuf,
        /// `<controlId>=<value>`; the value is parsed as JSON, else taken as text
        #[arg(long = "set", value_name = "ID=VALUE")]
        edits: Vec<String>,
        #[arg(long)]
        obs: Option<PathBuf>,
        /// Save the resulting records here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the designer grid of the top-level controls, row by row
    Layout { form: PathBuf },
    /// Drop a concept onto the form's grid and save the form
    Design {
        form: PathBuf,
        /// Concept JSON; a concept set becomes a group of controls
        #[arg(long)]
        concept: PathBuf,
        #[arg(long, default_value_t = 0)]
        row: usize,
        #[arg(long, default_value_t = 0)]
        column: usize,
        /// Recorded in the lock file while the form is being edited
        #[arg(long, default_value = "form_cli")]
        user: String,
    },
}
