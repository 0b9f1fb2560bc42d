use facility_index::api::{self, FacilityService};
use facility_index::cache::{CacheStore, RefreshCoordinator, RefreshOutcome};
use facility_index::config::AppConfig;
use facility_index::export::ChunkExporter;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config = AppConfig::from_env()?;
    let mut export_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" | "--export" if i + 1 >= args.len() => {
                eprintln!("Usage: {} [--bind <addr:port>] [--export <dir>]", args[0]);
                eprintln!("Example: {} --bind 0.0.0.0:5000", args[0]);
                eprintln!("Example: {} --export public/data", args[0]);
                std::process::exit(1);
            }
            "--bind" => {
                config.bind_addr = args[i + 1].parse::<SocketAddr>()?;
                i += 2;
            }
            "--export" => {
                export_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    // 1. Cache and refresh pipeline:
    let store = CacheStore::new();
    let coordinator = config.build_coordinator(store.clone())?;
    tracing::info!(
        "Primary source: {}",
        config
            .primary
            .as_ref()
            .map(|p| p.base_url.as_str())
            .unwrap_or("none")
    );

    // 2. One-shot export mode:
    if let Some(dir) = export_dir {
        return run_export(&coordinator, &config, &dir).await;
    }

    // 3. Initial load in the background, so the server answers from the first second:
    coordinator.trigger();

    // 4. Periodic refresh:
    if let Some(every) = config.refresh_interval {
        spawn_refresh_loop(coordinator.clone(), every);
    }

    // 5. HTTP server:
    let service = FacilityService::new(coordinator);
    let app = api::router(service);

    tracing::info!("HTTP server listening on {}", config.bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_export(
    coordinator: &Arc<RefreshCoordinator>,
    config: &AppConfig,
    dir: &Path,
) -> anyhow::Result<()> {
    let snapshot = match coordinator.refresh().await? {
        RefreshOutcome::Refreshed { snapshot, source } => {
            tracing::info!("Loaded {} records from {}", snapshot.len(), source);
            snapshot
        }
        RefreshOutcome::AlreadyInProgress => {
            anyhow::bail!("a refresh was already running, nothing to export")
        }
    };

    let exporter = ChunkExporter::new(config.chunk_size)?;
    let bundle = exporter.export(&snapshot)?;
    let written = ChunkExporter::write_to_dir(&bundle, dir).await?;

    tracing::info!(
        "Export complete: {} records, {} files in {}",
        bundle.manifest.total_records,
        written.len(),
        dir.display()
    );
    Ok(())
}

fn spawn_refresh_loop(coordinator: Arc<RefreshCoordinator>, every: Duration) {
    tracing::info!("Refreshing every {:?}", every);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick fires immediately and the initial load is already running.
        interval.tick().await;

        loop {
            interval.tick().await;
            let result = coordinator.trigger();
            if result.already_in_progress {
                tracing::info!("Scheduled refresh skipped, previous one still running");
            }
        }
    });
}
