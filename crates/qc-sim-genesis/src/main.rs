//! # qc-simgen
//!
//! Produces a simulation genesis document.
//!
//! ## Flow
//!
//! 1. Load `SimulationConfig` from `QC_SIM_*` environment variables
//! 2. Reject conflicting inputs
//! 3. Seed the random source and create simulation accounts
//! 4. Assemble (import or randomize)
//! 5. Validate every module's entry
//! 6. Write the snapshot document to `QC_SIM_OUTPUT` or stdout

use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use qc_sim_genesis::{SimAccount, SimulationApp, SimulationConfig};

fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for the document
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = SimulationConfig::from_env();
    config.validate().context("Invalid simulation configuration")?;

    let app = SimulationApp::standard().context("Failed to wire simulation application")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let accounts = SimAccount::random_accounts(&mut rng, config.num_accounts)
        .context("Failed to create simulation accounts")?;

    let genesis = app
        .orchestrator()
        .assemble(&mut rng, accounts, &config.assembly)
        .context("Genesis assembly failed")?;
    app.validate(&genesis)
        .context("Assembled genesis failed validation")?;

    let document = genesis
        .to_document()
        .and_then(|doc| doc.to_json_pretty())
        .context("Failed to encode genesis document")?;

    match &config.output {
        Some(path) => {
            fs::write(path, document.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                "Genesis for chain '{}' at {} written to {} ({} accounts)",
                genesis.chain_id,
                genesis.genesis_time,
                path.display(),
                genesis.accounts.len()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", document)?;
        }
    }

    Ok(())
}
