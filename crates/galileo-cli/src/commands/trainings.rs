use std::time::Duration;

use log::{info, warn};
use serde_json::Value;
use tokio::sync::mpsc;

use galileo::{
    GalileoError,
    client::poll::{ProgressUpdate, WatchOutcome},
    identifier::NodeId,
    model::{AutomationConfig, TrainingCreate, TrainingPreviewRequest},
    workspace::Workspace,
};

use crate::{
    args::{AutomationCommand, TrainingCommand},
    output::{parse_json, print_json},
};

pub(crate) async fn run(
    workspace: &Workspace,
    command: TrainingCommand,
    poll_interval: Duration,
) -> Result<(), GalileoError> {
    let client = workspace.client();
    match command {
        TrainingCommand::List => print_json(&client.list_trainings().await?),
        TrainingCommand::Show { id } => print_json(&client.training(&id).await?),
        TrainingCommand::Create {
            name,
            datasource,
            config,
        } => {
            let request = TrainingCreate {
                name,
                datasource_id: NodeId::from(datasource),
                config: parse_json::<Value>("config", &config)?,
            };
            print_json(&workspace.create_training(&request).await?)
        }
        TrainingCommand::Preview { snapshot, config } => {
            let request = TrainingPreviewRequest {
                snapshot_id: snapshot,
                config: parse_json("config", &config)?,
            };
            print_json(&client.preview_training(&request).await?)
        }
        TrainingCommand::Execute { id, snapshot, watch } => {
            let execution = workspace.execute_training(&id, &snapshot).await?;
            print_json(&execution)?;
            if watch {
                watch_executions(workspace, vec![execution.id], poll_interval).await?;
            }
            Ok(())
        }
        TrainingCommand::Executions { id } => {
            let executions = client.training_executions(&id).await?;
            let rows: Vec<Value> = executions
                .iter()
                .map(|execution| {
                    serde_json::json!({
                        "execution": execution,
                        "metrics": execution.metrics(),
                    })
                })
                .collect();
            print_json(&rows)
        }
        TrainingCommand::Watch { executions } => watch_executions(workspace, executions, poll_interval).await,
        TrainingCommand::Metrics { id } => print_json(&client.allowed_metrics(&id).await?),
        TrainingCommand::Steps { id, execution } => {
            print_json(&client.execution_preprocess_steps(&id, &execution).await?)
        }
        TrainingCommand::Automation { command } => automation(workspace, command).await,
        TrainingCommand::Promote { id, execution } => print_json(&workspace.promote_manual(&id, &execution).await?),
        TrainingCommand::Delete { id } => {
            workspace.delete_training(&id).await?;
            info!(training_id = id; "Training deleted");
            Ok(())
        }
    }
}

async fn automation(workspace: &Workspace, command: AutomationCommand) -> Result<(), GalileoError> {
    match command {
        AutomationCommand::Show { id } => print_json(&workspace.client().automation_config(&id).await?),
        AutomationCommand::Set {
            id,
            schedule,
            metrics,
            disabled,
        } => {
            let config = AutomationConfig {
                automation_enabled: !disabled,
                automation_schedule: schedule,
                promotion_metrics: metrics,
            };
            print_json(&workspace.set_automation_config(&id, &config).await?)
        }
        AutomationCommand::Clear { id } => print_json(&workspace.clear_automation_config(&id).await?),
        AutomationCommand::RunNow { id } => print_json(&workspace.run_automation_now(&id).await?),
    }
}

/// Prints progress of `executions` until all finish or Ctrl-C is pressed.
async fn watch_executions(
    workspace: &Workspace,
    executions: Vec<String>,
    interval: Duration,
) -> Result<(), GalileoError> {
    let watcher = workspace.watcher(interval);
    let token = watcher.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping watch");
            token.cancel();
        }
    });

    let (updates, mut receiver) = mpsc::channel(16);
    let report = async {
        let mut failed = 0usize;
        while let Some(update) = receiver.recv().await {
            if report_update(&update) {
                failed += 1;
            }
        }
        failed
    };

    let (outcome, failed) = tokio::join!(watcher.watch(executions, updates), report);
    interrupt.abort();

    match outcome {
        WatchOutcome::Completed if failed > 0 => warn!(failed; "Some executions failed"),
        WatchOutcome::Completed => info!("All executions finished"),
        WatchOutcome::Cancelled | WatchOutcome::Closed => info!(outcome:?; "Watch stopped early"),
    }
    Ok(())
}

/// Prints one update; returns true when it reports a failed run.
fn report_update(update: &ProgressUpdate) -> bool {
    match &update.progress {
        Ok(progress) => {
            println!("{}: {}", update.execution_id, progress.describe());
            progress.is_failed()
        }
        Err(err) => {
            warn!("Progress of {} unavailable: {err}", update.execution_id);
            false
        }
    }
}
