//! # File Importer
//!
//! Loads an existing snapshot document and pairs every account it lists with
//! a fresh simulation credential.
//!
//! Credentials are regenerated from the shared random source; the keys in
//! the document are never used. The app state bytes are returned exactly as
//! they appear in the document.

use std::path::Path;

use rand::RngCore;
use shared_crypto::SimulationKeyPair;
use tracing::info;

use crate::domain::{CompositeState, GenesisError, SimAccount, SnapshotDocument};
use crate::modules::accounts::addresses_from_app_state;

/// Random bytes drawn per imported account to seed its credential.
pub const IMPORTED_KEY_SEED_LEN: usize = 15;

/// Output of an import.
#[derive(Debug, Clone)]
pub struct ImportedGenesis {
    /// App state bytes, verbatim from the document.
    pub app_state: Vec<u8>,
    /// One account per document account, in document order.
    pub accounts: Vec<SimAccount>,
    /// Chain id from the document.
    pub chain_id: String,
}

/// Snapshot document importer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImporter;

impl FileImporter {
    /// Importer.
    pub fn new() -> Self {
        Self
    }

    /// Read `path` and import it.
    pub fn import_from_file(
        &self,
        rng: &mut dyn RngCore,
        path: &Path,
    ) -> Result<ImportedGenesis, GenesisError> {
        let document = SnapshotDocument::load(path)?;
        info!(
            "[Importer] Loaded genesis file {} (chain {})",
            path.display(),
            document.chain_id
        );
        self.import_document(rng, &document)
    }

    /// Import an already parsed document.
    pub fn import_document(
        &self,
        rng: &mut dyn RngCore,
        document: &SnapshotDocument,
    ) -> Result<ImportedGenesis, GenesisError> {
        let state = CompositeState::from_bytes(document.app_state_bytes())?;
        let addresses = addresses_from_app_state(&state)?;

        let mut accounts = Vec::with_capacity(addresses.len());
        for address in addresses {
            let mut seed = [0u8; IMPORTED_KEY_SEED_LEN];
            rng.fill_bytes(&mut seed);
            accounts.push(SimAccount::with_address(
                address,
                SimulationKeyPair::from_seed(&seed)?,
            ));
        }

        info!(
            "[Importer] Imported {} accounts for chain {}",
            accounts.len(),
            document.chain_id
        );

        Ok(ImportedGenesis {
            app_state: document.app_state_bytes().to_vec(),
            accounts,
            chain_id: document.chain_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared_types::Address;

    fn document(app_state: &str) -> SnapshotDocument {
        serde_json::from_str(&format!(r#"{{"chain_id":"test-1","app_state":{}}}"#, app_state)).unwrap()
    }

    #[test]
    fn test_accounts_in_document_order() {
        let a = Address::new([1; 20]);
        let b = Address::new([2; 20]);
        let doc = document(&format!(
            r#"{{"accounts":{{"accounts":[{{"address":"{}","coins":[]}},{{"address":"{}","coins":[]}}]}}}}"#,
            b, a
        ));
        let imported = FileImporter::new()
            .import_document(&mut StdRng::seed_from_u64(1), &doc)
            .unwrap();

        let addresses: Vec<_> = imported.accounts.iter().map(|acc| acc.address).collect();
        assert_eq!(addresses, vec![b, a]);
        assert_eq!(imported.chain_id, "test-1");
        assert_eq!(imported.app_state, doc.app_state_bytes());
    }

    #[test]
    fn test_missing_accounts_module() {
        let doc = document(r#"{"bank":{"send_enabled":true}}"#);
        let err = FileImporter::new()
            .import_document(&mut StdRng::seed_from_u64(1), &doc)
            .unwrap_err();
        assert!(matches!(err, GenesisError::Decode { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = FileImporter::new()
            .import_from_file(&mut StdRng::seed_from_u64(1), Path::new("/nonexistent/genesis.json"))
            .unwrap_err();
        assert!(matches!(err, GenesisError::FileRead { .. }));
    }
}
