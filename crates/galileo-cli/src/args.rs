//! Command-line argument definitions for the Galileo CLI.
//!
//! [`Args`] holds the global flags shared by every subcommand; the
//! [`Command`] tree mirrors the backend's four entity kinds plus `graph`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use galileo::preview::DEFAULT_PREVIEW_ROWS;

/// Command-line arguments for the Galileo pipeline tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Backend base URL, overriding the configuration file
    #[arg(long, env = "GALILEO_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lay out the whole pipeline and render it
    Graph {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = GraphFormat::Svg)]
        format: GraphFormat,
    },

    /// Datasources and their snapshots
    Datasources {
        #[command(subcommand)]
        command: DatasourceCommand,
    },

    /// Preprocessing pipelines
    Preprocesses {
        #[command(subcommand)]
        command: PreprocessCommand,
    },

    /// Model trainings and their executions
    Trainings {
        #[command(subcommand)]
        command: TrainingCommand,
    },

    /// Deployments and promoted models
    Deployments {
        #[command(subcommand)]
        command: DeploymentCommand,
    },
}

/// Output format of `graph`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Svg,
    /// Computed node positions and edges
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Histogram,
    Scatter,
    Pie,
    Line,
}

#[derive(Subcommand, Debug)]
pub enum DatasourceCommand {
    List,
    /// Show a datasource with its snapshots and schema
    Show { id: String },
    /// Create a datasource from a CSV file
    Create {
        #[arg(long)]
        name: String,
        file: PathBuf,
    },
    /// Upload a new snapshot
    Upload { id: String, file: PathBuf },
    /// Make a snapshot the active one
    Activate { id: String, snapshot: String },
    /// Append rows (a JSON array of objects) to the active snapshot
    Append {
        id: String,
        #[arg(long)]
        rows: String,
    },
    /// Column statistics of a snapshot
    Summary { id: String, snapshot: String },
    /// Download a snapshot as CSV
    Download {
        id: String,
        snapshot: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the first rows of a snapshot
    Preview {
        id: String,
        snapshot: String,
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },
    /// Size of a snapshot in bytes
    Size { id: String, snapshot: String },
    /// Render a chart of a snapshot to PNG
    Chart {
        id: String,
        snapshot: String,
        #[arg(long, value_enum)]
        kind: ChartKind,
        /// Column for histogram and pie charts
        #[arg(long)]
        col: Option<String>,
        #[arg(long, default_value_t = 20)]
        bins: u32,
        #[arg(long)]
        x: Option<String>,
        #[arg(long)]
        y: Option<String>,
        #[arg(long)]
        date_col: Option<String>,
        #[arg(long)]
        value_col: Option<String>,
        /// day, week, month or year
        #[arg(long, default_value = "month")]
        granularity: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Save the HTML profile report of a snapshot
    Report {
        id: String,
        snapshot: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Stream the pairwise scatter matrix, saving every frame
    Pairwise {
        id: String,
        snapshot: String,
        /// Columns to include; all numeric columns when omitted
        #[arg(long, value_delimiter = ',')]
        cols: Vec<String>,
        /// Directory receiving the PNG frames
        #[arg(short, long)]
        output: PathBuf,
        /// Read further column lists from stdin, one per line, and re-request
        /// the matrix whenever the selection settles
        #[arg(long)]
        follow: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PreprocessCommand {
    List,
    Show { id: String },
    /// Create a preprocess and its derived datasource
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "parent", required = true)]
        parents: Vec<String>,
        /// Pipeline steps as JSON: {"steps": [...]}
        #[arg(long)]
        config: String,
    },
    /// Run a pipeline configuration without saving anything
    Preview {
        #[arg(long)]
        config: String,
        #[arg(long)]
        snapshot: Option<String>,
    },
    /// Run a preprocess; uses the active snapshot unless one is given
    Execute {
        id: String,
        #[arg(long)]
        snapshot: Option<String>,
    },
    Executions { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TrainingCommand {
    List,
    Show { id: String },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        datasource: String,
        /// Training configuration as JSON
        #[arg(long)]
        config: String,
    },
    /// Validate a training configuration against a snapshot
    Preview {
        #[arg(long)]
        snapshot: String,
        #[arg(long)]
        config: String,
    },
    /// Start a training run
    Execute {
        id: String,
        #[arg(long)]
        snapshot: String,
        /// Follow progress until the run finishes
        #[arg(long)]
        watch: bool,
    },
    Executions { id: String },
    /// Follow the progress of running executions
    Watch {
        #[arg(required = true)]
        executions: Vec<String>,
    },
    /// Metrics that can drive automatic promotion
    Metrics { id: String },
    /// Preprocess steps that produced an execution's input
    Steps { id: String, execution: String },
    /// Scheduled retraining
    Automation {
        #[command(subcommand)]
        command: AutomationCommand,
    },
    /// Pin an execution as the manually promoted model
    Promote { id: String, execution: String },
    /// Delete a training with its executions and deployments
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum AutomationCommand {
    Show { id: String },
    Set {
        id: String,
        /// Cron-style schedule
        #[arg(long)]
        schedule: Option<String>,
        #[arg(long = "metric")]
        metrics: Vec<String>,
        #[arg(long)]
        disabled: bool,
    },
    Clear { id: String },
    /// Run the automated training now
    RunNow { id: String },
}

#[derive(Subcommand, Debug)]
pub enum DeploymentCommand {
    List,
    Show { id: String },
    Create { training: String },
    /// Model deployments of a deployment
    Models { id: String },
    /// Promoted models of a training
    ByTraining { training: String },
    /// Promote a training execution into a deployment
    Promote { deployment: String, execution: String },
    /// Run inference; features are a JSON object or array
    Predict {
        model_deployment: String,
        #[arg(long)]
        features: String,
    },
    /// Evaluate drift of a model deployment
    Monitor { model_deployment: String },
}
