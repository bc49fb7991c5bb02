use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use toaster::Result;
use toaster::config::Config;
use toaster::error::{Error, NoticeError};
use toaster::render::{DocumentHandle, HtmlRenderer, Renderer};
use toaster::telemetry::init_tracing;
use toaster::{NoticeRequest, Notifier};

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "toaster.toml";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.log_format)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::from_env_and_file(&config_path)?;

    let mut requests = message_requests(&cli)?;
    if let Some(path) = &cli.requests {
        requests.extend(read_requests(path)?);
    }
    if requests.is_empty() {
        warn!("nothing to show; pass --message or --requests");
        return Ok(());
    }

    let document = DocumentHandle::default();
    let notifier = Notifier::get_or_create(config, |config: &Config| -> Box<dyn Renderer> {
        Box::new(HtmlRenderer::with_document(config, document.clone()))
    })?;

    let ids = notifier.push_batch(requests);
    info!(queued = ids.len(), "notices queued");

    let close_task = cli.close.clone().map(|message| {
        let notifier = notifier.clone();
        let delay = cli.close_after;
        tokio::spawn(async move {
            sleep(delay).await;
            info!(%message, "closing notices by message");
            notifier.close_by_message(&message);
        })
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("shutdown signal received, tearing down");
        }
        () = settle(&notifier, close_task.as_ref()) => {
            info!("only sticky notices remain");
        }
    }

    if cli.print_document {
        println!("{}", document.to_html());
    }
    if let Some(task) = close_task {
        task.abort();
    }
    notifier.destroy();
    Ok(())
}

/// Waits until the close request (if any) ran and every remaining notice is
/// one that never dismisses by itself.
async fn settle(notifier: &Notifier, close_task: Option<&JoinHandle<()>>) {
    loop {
        let close_done = close_task.is_none_or(JoinHandle::is_finished);
        let only_sticky = notifier.notices().iter().all(|n| n.duration.is_zero());
        if close_done && only_sticky {
            return;
        }
        sleep(POLL_INTERVAL).await;
    }
}

fn message_requests(cli: &Cli) -> Result<Vec<NoticeRequest>> {
    cli.messages
        .iter()
        .map(|message| {
            if message.trim().is_empty() {
                return Err(Error::from(NoticeError::InvalidMessage));
            }
            let mut request = NoticeRequest::new(message.as_str())
                .severity(cli.severity.as_str())
                .closable(!cli.no_close);
            if cli.sticky {
                request = request.duration_secs(0.0);
            } else if let Some(secs) = cli.duration {
                request = request.duration_secs(secs);
            }
            Ok(request)
        })
        .collect()
}

fn read_requests(path: &Path) -> Result<Vec<NoticeRequest>> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::RequestsRead {
        path: path.to_path_buf(),
        source,
    })?;
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|err| Error::RequestParse {
                line: index + 1,
                message: err.to_string(),
            })
        })
        .collect()
}
