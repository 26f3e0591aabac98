//! 命令行参数解析

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "zplan", version)]
#[command(about = "Parametric floor-plan editor core")]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum Command {
    /// Draw a sample two-room plan and save it
    Demo {
        out: PathBuf,
        /// Also autosave into this version store
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },
    /// Print levels, entity counts and room areas
    Info { file: PathBuf },
    /// Derive the 3D scene
    Scene {
        file: PathBuf,
        /// Write the scene as JSON
        #[arg(long, value_name = "OUT")]
        json: Option<PathBuf>,
    },
    /// Export project data as JSON
    ExportJson { file: PathBuf, out: PathBuf },
    /// Import project data from JSON
    ImportJson { input: PathBuf, out: PathBuf },
    /// List saved versions
    Versions { store: PathBuf, project_id: String },
    /// Two editors collaborating over the in-process hub
    CollabDemo,
}
