use galileo::{GalileoError, model::Features, workspace::Workspace};

use crate::{
    args::DeploymentCommand,
    output::{parse_json, print_json},
};

pub(crate) async fn run(workspace: &Workspace, command: DeploymentCommand) -> Result<(), GalileoError> {
    let client = workspace.client();
    match command {
        DeploymentCommand::List => print_json(&client.list_deployments().await?),
        DeploymentCommand::Show { id } => print_json(&client.deployment(&id).await?),
        DeploymentCommand::Create { training } => print_json(&workspace.create_deployment(&training).await?),
        DeploymentCommand::Models { id } => print_json(&client.model_deployments(&id).await?),
        DeploymentCommand::ByTraining { training } => {
            print_json(&client.deployments_for_training(&training).await?)
        }
        DeploymentCommand::Promote { deployment, execution } => {
            print_json(&workspace.create_model_deployment(&deployment, &execution).await?)
        }
        DeploymentCommand::Predict {
            model_deployment,
            features,
        } => {
            let features: Features = parse_json("features", &features)?;
            let prediction = client.predict(&model_deployment, features).await?;
            print_json(&prediction)
        }
        DeploymentCommand::Monitor { model_deployment } => print_json(&client.monitor(&model_deployment).await?),
    }
}
