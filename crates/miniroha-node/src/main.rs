//! miniroha-node — the Miniroha full-node binary.
//!
//! Startup sequence:
//!   1. Open (or initialise) the state database
//!   2. Apply genesis if the DB is fresh
//!   3. Start either the BFT consensus engine or the timer-driven producer
//!   4. Start the HTTP query/submit surface

mod http;
mod keys;
mod transport;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use miniroha_consensus::{ChainHandle, ConsensusEngine, NullTransport, TimeoutConfig, ValidatorSet};
use miniroha_genesis::{apply_genesis, is_bootstrapped, GenesisConfig};
use miniroha_mempool::Mempool;
use miniroha_state::StateStore;

use crate::http::AppState;
use crate::transport::HttpTransport;

#[derive(Parser, Debug)]
#[command(name = "miniroha-node", version, about = "Miniroha permissioned-ledger node")]
struct Args {
    /// HTTP listen port (`spec.md` §6, env `PORT`, default 3000).
    #[arg(long)]
    port: Option<u16>,

    /// State database directory (`spec.md` §6, env `DB_PATH`).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Enable the BFT consensus engine instead of the timer-driven
    /// producer (`spec.md` §6, env `USE_BFT`).
    #[arg(long)]
    use_bft: bool,

    /// Path to a genesis config JSON (required on a fresh database).
    #[arg(long)]
    genesis: Option<PathBuf>,

    /// This node's validator/proposer id.
    #[arg(long, default_value = "node1")]
    node_id: String,

    /// Path to a base58 Ed25519 seed file. Without one, an ephemeral
    /// keypair is generated — fine for solo/dev nodes, useless for a real
    /// multi-node cluster since the genesis validator set won't match it.
    #[arg(long)]
    keyfile: Option<PathBuf>,

    /// Comma-separated peer base URLs to broadcast consensus messages to.
    #[arg(long, value_delimiter = ',')]
    peers: Vec<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn timeout_config() -> TimeoutConfig {
    let default = TimeoutConfig::default();
    TimeoutConfig {
        propose: Duration::from_millis(env_or("MINIROHA_PROPOSE_TIMEOUT_MS", default.propose.as_millis() as u64)),
        prevote: Duration::from_millis(env_or("MINIROHA_PREVOTE_TIMEOUT_MS", default.prevote.as_millis() as u64)),
        precommit: Duration::from_millis(env_or("MINIROHA_PRECOMMIT_TIMEOUT_MS", default.precommit.as_millis() as u64)),
        block_interval: Duration::from_millis(env_or(
            "MINIROHA_BLOCK_INTERVAL_MS",
            default.block_interval.as_millis() as u64,
        )),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,miniroha=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("miniroha node starting");

    let port = args.port.unwrap_or_else(|| env_or("PORT", 3000u16));
    let db_path = args
        .db_path
        .unwrap_or_else(|| PathBuf::from(std::env::var("DB_PATH").unwrap_or_else(|_| "./miniroha-db".into())));
    let use_bft = args.use_bft || env_or("USE_BFT", false);

    let store = StateStore::open(&db_path).with_context(|| format!("opening state database at {}", db_path.display()))?;

    if !is_bootstrapped(&store)? {
        info!("fresh database — applying genesis");
        let path = args
            .genesis
            .as_ref()
            .context("a fresh database requires --genesis <path to genesis config JSON>")?;
        let json = std::fs::read_to_string(path).with_context(|| format!("reading genesis config from {}", path.display()))?;
        let config: GenesisConfig = serde_json::from_str(&json).context("parsing genesis config JSON")?;
        apply_genesis(&store, &config).context("applying genesis")?;
    } else {
        info!("existing database found — skipping genesis");
    }

    let chain_id = store.get_chain_id()?.unwrap_or_default();
    let keypair = keys::load_or_generate(args.keyfile.as_deref())?;
    let mempool = Arc::new(Mutex::new(Mempool::default()));

    let mut consensus_inbox = None;
    if use_bft {
        let validators = ValidatorSet::new(store.iter_validators()?);
        let applier = Arc::new(ChainHandle::new(store.clone(), Arc::clone(&mempool)));
        let transport: Arc<dyn miniroha_consensus::Transport> = if args.peers.is_empty() {
            warn!("no --peers configured; consensus will only ever see this node's own votes");
            Arc::new(NullTransport::default())
        } else {
            Arc::new(HttpTransport::new(args.peers.clone()))
        };
        let engine = ConsensusEngine::new(args.node_id.clone(), keypair, validators, applier, transport, timeout_config())?;
        let (tx, rx) = tokio::sync::mpsc::channel(256);
        consensus_inbox = Some(tx);
        tokio::spawn(engine.run(rx));
        info!(node_id = %args.node_id, "BFT consensus engine running");
    } else {
        let store = store.clone();
        let mempool = Arc::clone(&mempool);
        let node_id = args.node_id.clone();
        let block_interval = timeout_config().block_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(block_interval);
            loop {
                ticker.tick().await;
                let empty = mempool.lock().expect("mempool mutex poisoned").is_empty();
                if empty {
                    continue;
                }
                let now = now_secs();
                let produced = {
                    let pool = mempool.lock().expect("mempool mutex poisoned");
                    miniroha_chain::produce_block(&store, &pool, &node_id, &keypair, now)
                };
                match produced {
                    Ok(block) => {
                        let mut pool = mempool.lock().expect("mempool mutex poisoned");
                        match miniroha_chain::apply_block(&store, &mut pool, &block) {
                            Ok(()) => info!(height = block.header.height, "block committed by timer-driven producer"),
                            Err(e) => warn!(error = %e, "timer-driven block apply failed"),
                        }
                    }
                    Err(e) => warn!(error = %e, "timer-driven block production failed"),
                }
            }
        });
        info!(interval = ?block_interval, "timer-driven producer running");
    }

    let app_state = Arc::new(AppState {
        store,
        mempool,
        consensus_inbox,
        chain_id,
        use_bft,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    info!(%addr, "HTTP surface listening");
    axum::serve(listener, http::router(app_state)).await.context("serving HTTP")?;

    Ok(())
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
