use std::{path::Path, time::Duration};

use log::{info, warn};
use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use galileo::{
    GalileoError,
    client::{
        ApiClient, ChartRequest,
        debounce::{self, DebounceSender},
        sse::PairwiseFrame,
    },
    workspace::Workspace,
};

use crate::{
    args::{ChartKind, DatasourceCommand},
    output::{parse_json, print_json, write_file},
};

pub(crate) async fn run(
    workspace: &Workspace,
    command: DatasourceCommand,
    debounce: Duration,
) -> Result<(), GalileoError> {
    let client = workspace.client();
    match command {
        DatasourceCommand::List => print_json(&client.list_datasources().await?),
        DatasourceCommand::Show { id } => {
            let datasource = client.datasource_with_snapshots(&id).await?;
            let schema = datasource.schema();
            print_json(&json!({
                "datasource": datasource,
                "columns": schema.columns,
            }))
        }
        DatasourceCommand::Create { name, file } => {
            let contents = tokio::fs::read(&file).await?;
            let datasource = workspace
                .create_datasource(&name, &super::upload_name(&file), contents)
                .await?;
            print_json(&datasource)
        }
        DatasourceCommand::Upload { id, file } => {
            let contents = tokio::fs::read(&file).await?;
            let snapshot = workspace
                .upload_snapshot(&id, &super::upload_name(&file), contents)
                .await?;
            print_json(&snapshot)
        }
        DatasourceCommand::Activate { id, snapshot } => {
            print_json(&workspace.set_active_snapshot(&id, &snapshot).await?)
        }
        DatasourceCommand::Append { id, rows } => {
            let rows: Vec<Map<String, Value>> = parse_json("rows", &rows)?;
            let added = workspace.append_rows(&id, rows).await?;
            print_json(&json!({ "added": added }))
        }
        DatasourceCommand::Summary { id, snapshot } => {
            print_json(&client.snapshot_summary(&id, &snapshot).await?)
        }
        DatasourceCommand::Download { id, snapshot, output } => {
            let bytes = client.download_snapshot(&id, &snapshot).await?;
            write_file(&output, bytes).await
        }
        DatasourceCommand::Preview { id, snapshot, rows } => {
            print_json(&workspace.snapshot_preview(&id, &snapshot, rows).await?)
        }
        DatasourceCommand::Size { id, snapshot } => {
            let size = client.snapshot_size(&id, &snapshot).await?;
            print_json(&json!({ "size_bytes": size }))
        }
        DatasourceCommand::Chart {
            id,
            snapshot,
            kind,
            col,
            bins,
            x,
            y,
            date_col,
            value_col,
            granularity,
            output,
        } => {
            let chart = match kind {
                ChartKind::Histogram => ChartRequest::Histogram {
                    col: required(col, "col", kind)?,
                    bins,
                },
                ChartKind::Scatter => ChartRequest::Scatter {
                    x: required(x, "x", kind)?,
                    y: required(y, "y", kind)?,
                },
                ChartKind::Pie => ChartRequest::Pie {
                    col: required(col, "col", kind)?,
                },
                ChartKind::Line => ChartRequest::Line {
                    date_col: required(date_col, "date-col", kind)?,
                    value_col: required(value_col, "value-col", kind)?,
                    granularity,
                },
            };
            let image = client.chart(&id, &snapshot, &chart).await?;
            write_file(&output, image).await
        }
        DatasourceCommand::Report { id, snapshot, output } => {
            let html = client.profile_report(&id, &snapshot).await?;
            write_file(&output, html).await
        }
        DatasourceCommand::Pairwise {
            id,
            snapshot,
            cols,
            output,
            follow,
        } => {
            if follow {
                let stdin = BufReader::new(tokio::io::stdin());
                let requested = follow_pairwise(client, &id, &snapshot, &output, cols, stdin, debounce).await?;
                info!(selections = requested; "Column selections exhausted");
                Ok(())
            } else {
                save_pairwise(client, &id, &snapshot, &cols, &output).await.map(drop)
            }
        }
    }
}

/// Streams one pairwise matrix into `dir`; returns the number of frames.
async fn save_pairwise(
    client: &ApiClient,
    id: &str,
    snapshot: &str,
    cols: &[String],
    dir: &Path,
) -> Result<usize, GalileoError> {
    tokio::fs::create_dir_all(dir).await?;
    let mut stream = client.pairwise_matrix_stream(id, snapshot, cols).await?;

    while let Some(frame) = stream.next_frame().await? {
        write_frame(dir, stream.frames(), &frame).await?;
    }

    info!(frames = stream.frames(), dir = dir.display().to_string(); "Pairwise matrix complete");
    Ok(stream.frames())
}

/// Re-requests the matrix for every column selection read from `input` once
/// it has been stable for `delay`.
///
/// `initial`, when not empty, is the first selection. Each request streams
/// into its own `selection-NN` directory under `output`, and a selection that
/// settles while a stream is still running replaces that stream. Returns the
/// number of requests made.
pub(crate) async fn follow_pairwise<R>(
    client: &ApiClient,
    id: &str,
    snapshot: &str,
    output: &Path,
    initial: Vec<String>,
    input: R,
    delay: Duration,
) -> Result<usize, GalileoError>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (sender, mut selections) = debounce::channel(delay);
    if !initial.is_empty() {
        sender.send(initial);
    }
    let reader = tokio::spawn(read_selections(input, sender));

    let mut next = selections.recv().await;
    let mut input_open = true;
    let mut requested = 0;

    while let Some(cols) = next.take() {
        requested += 1;
        let dir = output.join(format!("selection-{requested:02}"));
        tokio::fs::create_dir_all(&dir).await?;
        let mut stream = client.pairwise_matrix_stream(id, snapshot, &cols).await?;
        let mut frames = 0;

        loop {
            tokio::select! {
                settled = selections.recv(), if input_open => match settled {
                    Some(cols) => {
                        info!(frames; "Column selection changed, restarting pairwise matrix");
                        next = Some(cols);
                        break;
                    }
                    None => input_open = false,
                },
                frame = stream.next_frame() => match frame? {
                    Some(frame) => {
                        frames += 1;
                        write_frame(&dir, frames, &frame).await?;
                    }
                    None => break,
                },
            }
        }

        if next.is_none() && input_open {
            next = selections.recv().await;
        }
    }

    reader.abort();
    Ok(requested)
}

/// Forwards one comma-separated column list per input line.
async fn read_selections<R: AsyncBufRead + Unpin>(input: R, sender: DebounceSender<Vec<String>>) {
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let cols = line
                    .split(',')
                    .map(str::trim)
                    .filter(|col| !col.is_empty())
                    .map(str::to_string)
                    .collect();
                if !sender.send(cols) {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(err:err; "Failed to read column selection");
                break;
            }
        }
    }
}

async fn write_frame(dir: &Path, index: usize, frame: &PairwiseFrame) -> Result<(), GalileoError> {
    write_file(&dir.join(format!("frame-{index:03}.png")), &frame.image).await?;
    info!(progress = frame.progress; "Pairwise matrix progress");
    Ok(())
}

fn required(value: Option<String>, flag: &str, kind: ChartKind) -> Result<String, GalileoError> {
    value.ok_or_else(|| GalileoError::Config(format!("--{flag} is required for {kind:?} charts")))
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        net::SocketAddr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Router,
        extract::{Query, State},
        http::header,
        response::IntoResponse,
        routing::get,
    };
    use galileo::client::ClientConfig;

    use super::*;

    type Requests = Arc<Mutex<Vec<String>>>;

    // One frame whose image is the bytes "half", then the end marker.
    const STREAM: &str = "data: {\"progress\": 1.0, \"image\": \"aGFsZg==\"}\n\nevent: done\ndata: \n\n";

    async fn pairwise(State(requests): State<Requests>, Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
        requests.lock().unwrap().push(query.get("cols").cloned().unwrap_or_default());
        ([(header::CONTENT_TYPE, "text/event-stream")], STREAM)
    }

    async fn spawn_backend(requests: Requests) -> SocketAddr {
        let app = Router::new()
            .route("/datasources/{id}/snapshots/{sid}/pairwise_matrix_stream", get(pairwise))
            .with_state(requests);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_follow_requests_only_the_settled_selection() {
        let requests = Requests::default();
        let addr = spawn_backend(requests.clone()).await;
        let client = ApiClient::new(ClientConfig::new(&format!("http://{addr}")).unwrap()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let input: &'static [u8] = b"x, y\nx,z\n";
        let requested = follow_pairwise(
            &client,
            "ds-1",
            "s-1",
            dir.path(),
            vec!["a".to_string()],
            input,
            Duration::from_millis(20),
        )
        .await
        .unwrap();

        assert_eq!(requested, 1);
        assert_eq!(*requests.lock().unwrap(), vec!["x,z".to_string()]);
        let frame = std::fs::read(dir.path().join("selection-01").join("frame-001.png")).unwrap();
        assert_eq!(frame, b"half");
    }

    #[tokio::test]
    async fn test_follow_without_selections_requests_nothing() {
        let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let input: &'static [u8] = b"";
        let requested = follow_pairwise(&client, "ds-1", "s-1", dir.path(), Vec::new(), input, Duration::from_millis(20))
            .await
            .unwrap();

        assert_eq!(requested, 0);
    }
}
