use std::path::Path;
use std::sync::Arc;

use quorum_agent::metrics::gather_metrics;
use quorum_agent::utils::file_io::open_file_for_append;
use quorum_agent::AgentConfig;
use quorum_agent::CommandLauncher;
use quorum_agent::Instance;
use quorum_agent::LineReporter;
use quorum_agent::NodeAgent;
use quorum_agent::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let config = AgentConfig::new()?.validate()?;

    // Initializing Logs
    let _guard = init_observability(&config.log_dir)?;

    let launcher = CommandLauncher::from_config(&config.process, &config.network)?;
    let reporter = Arc::new(LineReporter::new(tokio::io::stdout()));
    let mut agent = NodeAgent::new(Arc::new(config), Arc::new(launcher))?.with_reporter(reporter);

    // Initializing Shutdown Signal
    let (graceful_tx, mut graceful_rx) = watch::channel(());
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    info!(work_dir = ?agent.work_dir().path(), "agent started, reading requests from stdin");
    let mut requests = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = requests.next_line() => match line {
                Ok(Some(line)) => {
                    let params = line.trim();
                    if !params.is_empty() {
                        agent.configure(params).await;
                    }
                }
                Ok(None) => {
                    info!("stdin closed");
                    break;
                }
                Err(e) => {
                    error!("failed to read request: {:?}", e);
                    break;
                }
            },
            Ok(()) = graceful_rx.changed() => {
                break;
            }
        }
    }

    agent.teardown().await?;
    debug!("final metrics:\n{}", gather_metrics());
    info!("Exiting agent.");
    Ok(())
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
    }

    if graceful_tx.send(()).is_err() {
        error!("Failed to send shutdown signal: request loop already finished");
    }
    Ok(())
}

fn init_observability(log_dir: &Path) -> Result<WorkerGuard> {
    let log_file = open_file_for_append(log_dir.join(format!("agent-{}.log", std::process::id())))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();

    Ok(guard)
}
