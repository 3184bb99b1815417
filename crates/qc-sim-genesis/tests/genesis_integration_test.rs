//! End-to-end genesis assembly, import and lifecycle tests.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde_json::Value;
use tempfile::TempDir;

use qc_sim_genesis::modules::accounts::{AccountsGenerator, AccountsGenesis};
use qc_sim_genesis::modules::evidence::EvidenceGenerator;
use qc_sim_genesis::modules::slashing::{SlashingGenerator, SlashingGenesis};
use qc_sim_genesis::modules::staking::{StakingGenerator, StakingGenesis};
use qc_sim_genesis::modules::supply::SupplyGenesis;
use qc_sim_genesis::{
    standard_modules, standard_registry, AssembledGenesis, AssemblyConfig, CompositeState,
    DynGenerator, ErrorKind, GeneratorGraph, GenesisError, MemoryStore, SimAccount, SimulationApp,
    SIMULATION_CHAIN_ID,
};
use shared_types::{Coin, POWER_REDUCTION};

const GENESIS_TIME: i64 = 1_571_788_800;

fn app() -> SimulationApp {
    SimulationApp::standard().unwrap()
}

fn run(
    app: &SimulationApp,
    seed: u64,
    num_accounts: usize,
    config: &AssemblyConfig,
) -> Result<AssembledGenesis, GenesisError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let accounts = SimAccount::random_accounts(&mut rng, num_accounts).unwrap();
    app.orchestrator().assemble(&mut rng, accounts, config)
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// =============================================================================
// Randomized assembly
// =============================================================================

#[test]
fn test_random_mode_without_inputs() {
    let app = app();
    let genesis = run(&app, 42, 5, &AssemblyConfig::default()).unwrap();

    assert_eq!(genesis.chain_id, SIMULATION_CHAIN_ID);
    assert_eq!(genesis.accounts.len(), 5);

    let state = CompositeState::from_bytes(&genesis.app_state).unwrap();
    for name in app.manager().module_names() {
        assert!(state.contains(name), "missing module {}", name);
    }

    let accounts: AccountsGenesis = state.decode("accounts").unwrap().unwrap();
    let staking: StakingGenesis = state.decode("staking").unwrap().unwrap();
    let supply: SupplyGenesis = state.decode("supply").unwrap().unwrap();

    let stake = accounts.accounts[0].coins[0].amount;
    let bonded = staking.validators.len();
    assert!(bonded <= 5);
    assert!(stake < 1_000_000_000_000);
    for (generated, sim) in accounts.accounts.iter().zip(&genesis.accounts) {
        assert_eq!(generated.address, sim.address);
        assert_eq!(generated.coins, vec![Coin::stake(stake)]);
    }
    assert_eq!(supply.supply, vec![Coin::stake(stake * (5 + bonded as u128))]);

    app.validate(&genesis).unwrap();
}

#[test]
fn test_same_seed_byte_identical() {
    let app = app();
    let config = AssemblyConfig::default();
    let a = run(&app, 42, 6, &config).unwrap();
    let b = run(&app, 42, 6, &config).unwrap();
    assert_eq!(a.app_state, b.app_state);
    assert_eq!(a.genesis_time, b.genesis_time);

    let c = run(&app, 43, 6, &config).unwrap();
    assert_ne!(a.app_state, c.app_state);
}

#[test]
fn test_explicit_genesis_time_used() {
    let app = app();
    let genesis = run(&app, 1, 3, &AssemblyConfig::default().at(GENESIS_TIME)).unwrap();
    assert_eq!(genesis.genesis_time.timestamp(), GENESIS_TIME);
}

#[test]
fn test_slashing_evidence_age_matches_unbonding_time() {
    let app = app();
    for seed in 0..5 {
        let genesis = run(&app, seed, 4, &AssemblyConfig::default()).unwrap();
        let state = CompositeState::from_bytes(&genesis.app_state).unwrap();
        let staking: StakingGenesis = state.decode("staking").unwrap().unwrap();
        let slashing: SlashingGenesis = state.decode("slashing").unwrap().unwrap();
        assert_eq!(slashing.params.max_evidence_age, staking.params.unbonding_time);
    }
}

// =============================================================================
// Params file
// =============================================================================

#[test]
fn test_params_file_overrides() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "params.json", r#"{"unbonding_time": 600, "send_enabled": false}"#);

    let app = app();
    let genesis = run(&app, 42, 5, &AssemblyConfig::with_params(&path)).unwrap();
    let state = CompositeState::from_bytes(&genesis.app_state).unwrap();

    let slashing: SlashingGenesis = state.decode("slashing").unwrap().unwrap();
    assert_eq!(slashing.params.max_evidence_age.as_secs(), 600);
    let bank: Value = state.decode("bank").unwrap().unwrap();
    assert_eq!(bank["send_enabled"], false);
    assert_eq!(genesis.chain_id, SIMULATION_CHAIN_ID);
}

#[test]
fn test_params_file_wrong_type() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "params.json", r#"{"max_validators": "many"}"#);

    let err = run(&app(), 42, 5, &AssemblyConfig::with_params(&path)).unwrap_err();
    match &err {
        GenesisError::Decode { context, .. } => assert!(context.contains("max_validators")),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Input);
}

#[test]
fn test_params_file_malformed() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "params.json", "{not json");

    let err = run(&app(), 42, 5, &AssemblyConfig::with_params(&path)).unwrap_err();
    assert!(matches!(err, GenesisError::Decode { .. }));
}

#[test]
fn test_params_file_missing() {
    let err = run(&app(), 42, 5, &AssemblyConfig::with_params("/nonexistent/params.json")).unwrap_err();
    assert!(matches!(err, GenesisError::FileRead { .. }));
}

// =============================================================================
// Import
// =============================================================================

const SNAPSHOT: &str = r#"{
  "genesis_time": "2019-10-23T00:00:00Z",
  "chain_id": "test-1",
  "app_state": {"accounts": {"accounts": [
      {"address": "0303030303030303030303030303030303030303", "coins": [{"denom": "stake", "amount": "10"}]},
      {"address": "0101010101010101010101010101010101010101", "coins": []},
      {"address": "0202020202020202020202020202020202020202", "coins": []}
    ]},
    "bank": {"send_enabled": true}}
}"#;

#[test]
fn test_import_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "genesis.json", SNAPSHOT);

    let genesis = run(&app(), 42, 10, &AssemblyConfig::import(&path)).unwrap();

    assert_eq!(genesis.chain_id, "test-1");
    let addresses: Vec<String> = genesis.accounts.iter().map(|a| a.address.to_string()).collect();
    assert_eq!(
        addresses,
        vec![
            "0303030303030303030303030303030303030303",
            "0101010101010101010101010101010101010101",
            "0202020202020202020202020202020202020202",
        ]
    );

    let start = SNAPSHOT.find(r#"{"accounts""#).unwrap();
    let end = SNAPSHOT.rfind('}').unwrap();
    let expected = SNAPSHOT[start..end].trim_end();
    assert_eq!(genesis.app_state, expected.as_bytes());
}

#[test]
fn test_import_snapshot_with_addresses_only() {
    let dir = TempDir::new().unwrap();
    let text = r#"{"chain_id":"test-1","app_state":{"accounts":{"accounts":[
        {"address":"0101010101010101010101010101010101010101"},
        {"address":"0202020202020202020202020202020202020202"},
        {"address":"0303030303030303030303030303030303030303"}
    ]}}}"#;
    let path = write(&dir, "genesis.json", text);

    let genesis = run(&app(), 42, 0, &AssemblyConfig::import(&path)).unwrap();

    assert_eq!(genesis.chain_id, "test-1");
    assert_eq!(genesis.accounts.len(), 3);
    assert_eq!(
        genesis.accounts[2].address.to_string(),
        "0303030303030303030303030303030303030303"
    );
}

#[test]
fn test_import_regenerates_credentials() {
    let dir = TempDir::new().unwrap();
    let app = app();
    let original = run(&app, 9, 4, &AssemblyConfig::default()).unwrap();
    let doc = original.to_document().unwrap().to_json_pretty().unwrap();
    let path = write(&dir, "genesis.json", &doc);

    let imported = run(&app, 10, 0, &AssemblyConfig::import(&path)).unwrap();

    assert_eq!(imported.accounts.len(), original.accounts.len());
    for (old, new) in original.accounts.iter().zip(&imported.accounts) {
        assert_eq!(old.address, new.address);
        assert_ne!(old.pub_key, new.pub_key);
        let sig = new.credential.sign(b"simulated tx");
        new.pub_key.verify_simulated(b"simulated tx", &sig).unwrap();
    }
    assert_eq!(
        CompositeState::from_bytes(&imported.app_state).unwrap().to_bytes().unwrap(),
        original.app_state
    );
}

#[test]
fn test_import_missing_file() {
    let err = run(&app(), 42, 0, &AssemblyConfig::import("/nonexistent/genesis.json")).unwrap_err();
    assert!(matches!(err, GenesisError::FileRead { .. }));
    assert_eq!(err.kind(), ErrorKind::Input);
}

// =============================================================================
// Mutual exclusivity
// =============================================================================

#[test]
fn test_both_files_rejected_before_any_read() {
    let config = AssemblyConfig {
        genesis_file: Some(PathBuf::from("/nonexistent/genesis.json")),
        params_file: Some(PathBuf::from("/nonexistent/params.json")),
        genesis_time: None,
    };

    let app = app();
    let mut rng = StdRng::seed_from_u64(42);
    let err = app.orchestrator().assemble(&mut rng, Vec::new(), &config).unwrap_err();

    assert!(matches!(err, GenesisError::ConflictingInputs { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    // No random draw happened.
    assert_eq!(rng.next_u64(), StdRng::seed_from_u64(42).next_u64());
}

// =============================================================================
// Generator ordering
// =============================================================================

#[test]
fn test_slashing_before_staking_fails() {
    let graph = GeneratorGraph::with_fixed_order(vec![
        Box::new(AccountsGenerator),
        Box::new(SlashingGenerator),
        Box::new(StakingGenerator),
    ]);
    let app =
        SimulationApp::with_graph(standard_registry().unwrap(), standard_modules(), graph).unwrap();

    let err = run(&app, 42, 3, &AssemblyConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        GenesisError::GeneratorFailure { ref module, .. } if module == "slashing"
    ));
    assert_eq!(err.kind(), ErrorKind::Generator);
}

#[test]
fn test_dependency_order_independent_of_registration() {
    let generators: Vec<DynGenerator> = vec![
        Box::new(EvidenceGenerator),
        Box::new(SlashingGenerator),
        Box::new(StakingGenerator),
        Box::new(AccountsGenerator),
    ];
    let graph = GeneratorGraph::new(generators).unwrap();
    assert_eq!(graph.order(), vec!["accounts", "staking", "evidence", "slashing"]);

    let app =
        SimulationApp::with_graph(standard_registry().unwrap(), standard_modules(), graph).unwrap();
    run(&app, 42, 3, &AssemblyConfig::default()).unwrap();
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_boot_and_export() {
    let app = app();
    let genesis = run(&app, 77, 8, &AssemblyConfig::default()).unwrap();
    let state = CompositeState::from_bytes(&genesis.app_state).unwrap();
    let staking: StakingGenesis = state.decode("staking").unwrap().unwrap();

    let (ctx, updates) = app.boot(&genesis, Arc::new(MemoryStore::new())).unwrap();
    assert_eq!(ctx.chain_id, SIMULATION_CHAIN_ID);

    let powered = staking
        .validators
        .iter()
        .filter(|v| v.tokens / POWER_REDUCTION > 0)
        .count()
        .min(usize::from(staking.params.max_validators));
    assert_eq!(updates.len(), powered);
    for update in &updates {
        let validator = staking
            .validators
            .iter()
            .find(|v| v.consensus_pubkey == hex::encode(update.pub_key))
            .unwrap();
        assert_eq!(update.power as u128, validator.tokens / POWER_REDUCTION);
    }

    let exported = app.export(&ctx).unwrap();
    assert!(!exported.contains("genutil"));
    for name in ["auth", "bank", "gov", "mint", "distribution", "slashing", "supply"] {
        assert_eq!(
            exported.get(name).unwrap().get(),
            state.get(name).unwrap().get(),
            "{} did not round-trip",
            name
        );
    }

    let mut before: AccountsGenesis = state.decode("accounts").unwrap().unwrap();
    let mut after: AccountsGenesis = exported.decode("accounts").unwrap().unwrap();
    before.accounts.sort_by_key(|a| a.address.to_string());
    after.accounts.sort_by_key(|a| a.address.to_string());
    assert_eq!(before, after);

    let exported_staking: StakingGenesis = exported.decode("staking").unwrap().unwrap();
    assert_eq!(exported_staking.validators.len(), staking.validators.len());
    assert_eq!(exported_staking.params, staking.params);
}

// =============================================================================
// Parallel trials
// =============================================================================

#[test]
fn test_parallel_trials_match_sequential() {
    let app = app();
    let accounts = SimAccount::random_accounts(&mut StdRng::seed_from_u64(5), 4).unwrap();
    let time = chrono::DateTime::from_timestamp(GENESIS_TIME, 0).unwrap();
    let params = qc_sim_genesis::AppParams::new();
    let seeds: Vec<u64> = (0..8).collect();

    let parallel = app
        .orchestrator()
        .assembler()
        .assemble_trials(&seeds, &accounts, time, &params);

    for (seed, result) in seeds.iter().zip(parallel) {
        let sequential = app
            .orchestrator()
            .assembler()
            .assemble_random(&mut StdRng::seed_from_u64(*seed), accounts.clone(), time, &params)
            .unwrap();
        assert_eq!(result.unwrap().app_state, sequential.app_state);
    }
}
