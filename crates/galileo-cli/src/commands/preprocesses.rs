use galileo::{
    GalileoError,
    identifier::NodeId,
    model::{ExecuteRequest, PreprocessConfig, PreprocessCreate},
    workspace::Workspace,
};

use crate::{
    args::PreprocessCommand,
    output::{parse_json, print_json},
};

pub(crate) async fn run(workspace: &Workspace, command: PreprocessCommand) -> Result<(), GalileoError> {
    let client = workspace.client();
    match command {
        PreprocessCommand::List => print_json(&client.list_preprocesses().await?),
        PreprocessCommand::Show { id } => print_json(&client.preprocess(&id).await?),
        PreprocessCommand::Create { name, parents, config } => {
            let request = PreprocessCreate {
                name,
                parent_ids: parents.into_iter().map(NodeId::from).collect(),
                config: parse_json("config", &config)?,
            };
            print_json(&workspace.create_preprocess(&request).await?)
        }
        PreprocessCommand::Preview { config, snapshot } => {
            let config: PreprocessConfig = parse_json("config", &config)?;
            print_json(&client.preview_preprocess(&config, snapshot.as_deref()).await?)
        }
        PreprocessCommand::Execute { id, snapshot } => {
            let request = ExecuteRequest {
                snapshot_id: snapshot,
                snapshots: None,
            };
            print_json(&workspace.execute_preprocess(&id, &request).await?)
        }
        PreprocessCommand::Executions { id } => print_json(&client.preprocess_executions(&id).await?),
    }
}
