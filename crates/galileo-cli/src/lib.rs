//! Galileo CLI library
//!
//! This module contains the core CLI logic for the Galileo pipeline tool.

pub mod error_adapter;

mod args;
mod commands;
mod config;
mod output;

pub use args::{
    Args, AutomationCommand, ChartKind, Command, DatasourceCommand, DeploymentCommand, GraphFormat,
    PreprocessCommand, TrainingCommand,
};

use log::{debug, info};

use galileo::{GalileoError, workspace::Workspace};

/// Run the Galileo CLI application
///
/// Loads the configuration, connects a [`Workspace`] to the backend and
/// executes the selected subcommand.
///
/// # Errors
///
/// Returns `GalileoError` for:
/// - Configuration loading errors
/// - Backend transport, status and decoding errors
/// - File I/O errors
/// - Layout and rendering errors
pub async fn run(args: Args) -> Result<(), GalileoError> {
    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(api_url) = args.api_url {
        app_config = app_config.with_base_url(api_url);
    }

    info!(base_url = app_config.api().base_url(); "Connecting to backend");
    let workspace = Workspace::from_config(app_config.api())?;
    debug!(command:? = args.command; "Running command");

    match args.command {
        Command::Graph { output, format } => {
            commands::graph::run(&workspace, &app_config, output.as_deref(), format).await
        }
        Command::Datasources { command } => {
            commands::datasources::run(&workspace, command, app_config.polling().debounce()).await
        }
        Command::Preprocesses { command } => commands::preprocesses::run(&workspace, command).await,
        Command::Trainings { command } => {
            commands::trainings::run(&workspace, command, app_config.polling().interval()).await
        }
        Command::Deployments { command } => commands::deployments::run(&workspace, command).await,
    }
}
