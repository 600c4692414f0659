use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use blobsync_daemon::blob::{sort_blobs, Snapshot, SortColumn, SortDirection};
use blobsync_daemon::config::{read_config, SyncConfig};
use blobsync_daemon::scheduler;
use blobsync_daemon::storage::{DirStore, StorageBackend};

const DEFAULT_CONFIG: &str = "blobsync.json";

/// Blobsync Daemon - keeps a source and destination container converged
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the sync configuration file
    #[arg(short, long, env = "BLOBSYNC_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run reconciliation passes on the configured interval
    Run,
    /// Run a single reconciliation pass and exit
    Sync,
    /// Print a container listing
    List {
        /// Which container to list: source or destination
        #[arg(long, default_value = "source")]
        container: String,
        /// Column to order by: name, lastModified, or length
        #[arg(long, default_value = "name")]
        sort: String,
        /// Sort in descending order
        #[arg(long)]
        descending: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = read_config(&args.config)
        .await
        .with_context(|| format!("reading config file {}", args.config.display()))?
        .with_context(|| format!("config file {} not found", args.config.display()))?;

    let store = build_store(&config)?;

    match args.command {
        Command::Run => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("received ctrl-c, stopping scheduler");
                    let _ = shutdown_tx.send(true);
                }
            });

            scheduler::run(&store, &config, shutdown_rx).await;
        }
        Command::Sync => {
            let summary = scheduler::run_pass(&store, &config).await?;
            println!(
                "copied to destination: {}  copied to source: {}  deleted from source: {}  ({} ms)",
                summary.copied_to_dest,
                summary.copied_to_source,
                summary.deleted_from_source,
                summary.duration_ms
            );
        }
        Command::List {
            container,
            sort,
            descending,
        } => {
            let name = match container.as_str() {
                "source" => &config.source.name,
                "destination" | "dest" => &config.destination.name,
                other => bail!("unknown container '{other}', expected source or destination"),
            };
            let column: SortColumn = sort.parse()?;
            let direction = if descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };

            let listing = store.list(name).await?;
            let snapshot = Snapshot::from_listing(listing)?;
            let mut records = snapshot.records;
            sort_blobs(&mut records, column, direction);

            for record in &records {
                println!("{record}");
            }
        }
    }

    Ok(())
}

fn build_store(config: &SyncConfig) -> anyhow::Result<DirStore> {
    let mut store = DirStore::new();
    store
        .add_container(&config.source.name, &config.source.location)
        .with_context(|| format!("registering source container '{}'", config.source.name))?;
    store
        .add_container(&config.destination.name, &config.destination.location)
        .with_context(|| {
            format!(
                "registering destination container '{}'",
                config.destination.name
            )
        })?;
    Ok(store)
}
