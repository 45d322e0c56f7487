use std::{io, path::Path};

use log::info;

use galileo::{GalileoError, PipelineBuilder, config::AppConfig, workspace::Workspace};

use crate::args::GraphFormat;

/// Fetches the pipeline and renders it as SVG or layout JSON.
pub(crate) async fn run(
    workspace: &Workspace,
    config: &AppConfig,
    output: Option<&Path>,
    format: GraphFormat,
) -> Result<(), GalileoError> {
    let graph = workspace.fetch_graph().await?;
    let builder = PipelineBuilder::new(config.clone());

    let rendered = match format {
        GraphFormat::Svg => builder.render_svg(&graph)?,
        GraphFormat::Json => {
            let layout = builder.layout(&graph)?;
            serde_json::to_string_pretty(&layout).map_err(io::Error::from)?
        }
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, rendered).await?;
            info!(path = path.display().to_string(), nodes = graph.len(); "Pipeline graph exported");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
