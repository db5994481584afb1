//! Subcommand implementations.

use crate::commands::{build_registry, Reply};
use bot_config_and_utils::Config;
use command_router::{DispatchError, Entry};
use flowdock_api::{stream_url, ApiClient, FlowCatalog, HttpEventSource, MessageData};
use std::error::Error;
use std::sync::Arc;
use stream_ingest::{error_channel, StreamError, StreamManager};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

type AppResult<T> = Result<T, Box<dyn Error>>;

fn api_client(config: &Config) -> AppResult<ApiClient> {
    let token = config.require_token()?;
    Ok(ApiClient::with_base_url(token, config.api_url()?.as_str())?)
}

/// Listen on the configured flows until the stream ends or Ctrl-C.
pub async fn run_bot(config: Config) -> AppResult<()> {
    let token = config.require_token()?.to_string();
    let client = api_client(&config)?;

    let catalog = client.flow_catalog().await?;
    info!(flows = catalog.len(), "Loaded flow catalog");

    let registry = build_registry(replier(client))?.resolve_restrictions(&catalog);
    info!(commands = registry.len(), "Command tree ready");

    let (error_tx, error_rx) = error_channel(config.error_buffer);
    let drain = tokio::spawn(drain_errors(error_rx, catalog));

    let mut manager = StreamManager::new(Arc::new(registry), Some(error_tx));
    let stop_tx = manager.stop_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping");
            let _ = stop_tx.send(());
        }
    });

    let url = stream_url(
        config.stream_url()?.as_str(),
        &config.organization,
        &config.flows,
    )?;
    let source = HttpEventSource::connect(&url, &token).await?;
    let result = manager.listen(source).await;

    // Dropping the manager closes the error channel so the drain task ends.
    drop(manager);
    drain.await?;

    let stats = result?;
    info!(
        lines = stats.lines,
        matched = stats.matched,
        handled = stats.handled,
        errors = stats.errors,
        "Stream closed"
    );
    Ok(())
}

/// Replies go out on the runtime without blocking the ingestion loop.
fn replier(client: ApiClient) -> Reply {
    let runtime = tokio::runtime::Handle::current();
    Arc::new(move |entry: &Entry, text: String| {
        let mut message = MessageData::message(entry.flow.clone(), text);
        if let Some(thread_id) = &entry.thread_id {
            message = message.in_thread(thread_id.clone());
        }
        let client = client.clone();
        runtime.spawn(async move {
            if let Err(e) = client.send_message(&message).await {
                warn!(flow = %message.flow, error = %e, "Failed to send reply");
            }
        });
    })
}

async fn drain_errors(mut error_rx: mpsc::Receiver<StreamError>, catalog: FlowCatalog) {
    while let Some(err) = error_rx.recv().await {
        match &err {
            StreamError::Dispatch(DispatchError::NoCommandMatch { content }) => {
                debug!(content = %content, "Ignoring message with no command");
            }
            StreamError::Dispatch(DispatchError::TrailingContent { pattern, content }) => {
                info!(pattern = %pattern, content = %content, "Command got unexpected arguments");
            }
            StreamError::Decode(e) => warn!(error = %e, "Undecodable stream line"),
            StreamError::Transport(e) => error!(error = %e, "Stream transport error"),
        }
    }
    debug!(flows = catalog.len(), "Error drain finished");
}

/// Print every flow the token can see.
pub async fn list_flows(config: Config) -> AppResult<()> {
    let flows = api_client(&config)?.list_flows().await?;
    for flow in flows {
        println!("{}\t{}\t{}", flow.stream_path(), flow.name, flow.id);
    }
    Ok(())
}

/// Print every user the token can see.
pub async fn list_users(config: Config) -> AppResult<()> {
    let users = api_client(&config)?.list_users().await?;
    for user in users {
        println!("{}\t{}\t{}\t{}", user.id, user.nick, user.name, user.email);
    }
    Ok(())
}

/// Post one message. `flow` may be an ID, a name or a slug.
pub async fn send(
    config: Config,
    flow: String,
    content: String,
    thread: Option<String>,
) -> AppResult<()> {
    let client = api_client(&config)?;
    let catalog = client.flow_catalog().await?;
    let flow_id = resolve_flow(&catalog, &flow)
        .ok_or_else(|| format!("unknown flow '{flow}'"))?
        .to_string();

    let mut message = MessageData::message(flow_id, content);
    if let Some(thread) = thread {
        message = message.in_thread(thread);
    }
    client.send_message(&message).await?;
    println!("sent to {}", catalog.display_name(&message.flow));
    Ok(())
}

fn resolve_flow<'a>(catalog: &'a FlowCatalog, flow: &str) -> Option<&'a str> {
    catalog
        .flows()
        .iter()
        .find(|f| f.id == flow || f.parameterized_name == flow || f.name == flow)
        .map(|f| f.id.as_str())
}
