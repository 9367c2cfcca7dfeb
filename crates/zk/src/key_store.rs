//! File-backed verification key store.
//!
//! Keys are stored as pretty-printed snarkjs JSON, one file per circuit:
//!
//! ```text
//! base_dir/
//! ├── level_1_verification_key.json
//! └── level_2_verification_key.json
//! ```
//!
//! A key is immutable once published: saving identical content again is a
//! no-op, saving different content for the same circuit is refused.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::{Result, ZkError};

const KEY_FILE_SUFFIX: &str = "_verification_key.json";

/// Where verification keys live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStoreConfig {
    pub keys_dir: PathBuf,
}

impl KeyStoreConfig {
    pub const ENV_KEYS_DIR: &'static str = "VERIFICATION_KEYS_DIR";

    /// Reads `VERIFICATION_KEYS_DIR`, falling back to the platform data dir.
    pub fn from_env() -> Self {
        let keys_dir = std::env::var_os(Self::ENV_KEYS_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_keys_dir);
        Self { keys_dir }
    }

    pub fn with_keys_dir(mut self, keys_dir: impl Into<PathBuf>) -> Self {
        self.keys_dir = keys_dir.into();
        self
    }
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Platform data directory for verification keys.
///
/// - Linux: `~/.local/share/zk-attest/verification_keys`
/// - macOS: `~/Library/Application Support/zk-attest/verification_keys`
/// - Fallback: `./verification_keys`
fn default_keys_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "zk-attest")
        .map(|dirs| dirs.data_dir().join("verification_keys"))
        .unwrap_or_else(|| PathBuf::from("./verification_keys"))
}

/// Verification keys addressed by circuit name.
#[derive(Debug, Clone)]
pub struct VerificationKeyStore {
    base_dir: PathBuf,
}

impl VerificationKeyStore {
    /// Creates a store rooted at `base_dir`. No filesystem access happens
    /// until [`VerificationKeyStore::initialize`] or a save.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &KeyStoreConfig) -> Self {
        Self::new(&config.keys_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Ensures the key directory exists. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir).map_err(|e| ZkError::io(&self.base_dir, e))
    }

    /// Path of the key file for `circuit`.
    ///
    /// Circuit names are restricted to ASCII letters, digits, `_` and `-`.
    pub fn key_path(&self, circuit: &str) -> Result<PathBuf> {
        validate_circuit_name(circuit)?;
        Ok(self.base_dir.join(format!("{circuit}{KEY_FILE_SUFFIX}")))
    }

    /// Publishes the key for `circuit` and returns where it was written.
    pub fn save(&self, circuit: &str, key: &Value) -> Result<PathBuf> {
        let path = self.key_path(circuit)?;
        self.initialize()?;

        match self.load(&path) {
            Ok(existing) if existing == *key => {
                debug!(circuit, path = %path.display(), "Verification key already published");
                return Ok(path);
            }
            Ok(_) => return Err(ZkError::KeyAlreadyPublished(circuit.to_string())),
            Err(ZkError::KeyNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(key)?;
        fs::write(&temp_path, json).map_err(|e| ZkError::io(&temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| ZkError::io(&path, e))?;

        info!(circuit, path = %path.display(), "Saved verification key");
        Ok(path)
    }

    /// Reads a key file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ZkError::KeyNotFound(path.display().to_string()));
            }
            Err(e) => return Err(ZkError::io(path, e)),
        };
        Ok(serde_json::from_str(&json)?)
    }

    /// Reads the key published for `circuit`.
    pub fn load_for_circuit(&self, circuit: &str) -> Result<Value> {
        let path = self.key_path(circuit)?;
        match self.load(&path) {
            Err(ZkError::KeyNotFound(_)) => Err(ZkError::KeyNotFound(circuit.to_string())),
            other => other,
        }
    }

    /// Names of all circuits with a published key, sorted.
    pub fn list_circuits(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ZkError::io(&self.base_dir, e)),
        };

        let mut circuits = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ZkError::io(&self.base_dir, e))?;
            let filename = entry.file_name();
            if let Some(filename) = filename.to_str()
                && let Some(circuit) = filename.strip_suffix(KEY_FILE_SUFFIX)
                && validate_circuit_name(circuit).is_ok()
            {
                circuits.push(circuit.to_string());
            }
        }

        circuits.sort();
        Ok(circuits)
    }
}

fn validate_circuit_name(circuit: &str) -> Result<()> {
    let valid = !circuit.is_empty()
        && circuit
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(ZkError::InvalidCircuitName(circuit.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn key() -> Value {
        json!({ "protocol": "groth16", "IC": [["1", "2", "1"]] })
    }

    #[test]
    fn save_then_load_returns_equal_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = VerificationKeyStore::new(dir.path());

        let path = store.save("level_1", &key()).unwrap();
        assert!(path.ends_with("level_1_verification_key.json"));
        assert_eq!(store.load(&path).unwrap(), key());
        assert_eq!(store.load_for_circuit("level_1").unwrap(), key());
    }

    #[test]
    fn initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = VerificationKeyStore::new(dir.path().join("nested/keys"));

        store.initialize().unwrap();
        store.initialize().unwrap();
        assert!(store.base_dir().is_dir());
    }

    #[test]
    fn missing_key_names_circuit() {
        let dir = tempfile::tempdir().unwrap();
        let store = VerificationKeyStore::new(dir.path());

        let err = store.load_for_circuit("level_9").unwrap_err();
        assert!(matches!(err, ZkError::KeyNotFound(ref c) if c == "level_9"));
    }

    #[test]
    fn published_key_cannot_be_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let store = VerificationKeyStore::new(dir.path());

        store.save("level_1", &key()).unwrap();
        store.save("level_1", &key()).unwrap();

        let err = store.save("level_1", &json!({ "protocol": "plonk" })).unwrap_err();
        assert!(matches!(err, ZkError::KeyAlreadyPublished(_)));
        assert_eq!(store.load_for_circuit("level_1").unwrap(), key());
    }

    #[test]
    fn rejects_path_like_circuit_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = VerificationKeyStore::new(dir.path());

        for name in ["../escape", "a/b", "", "level 1"] {
            assert!(matches!(
                store.save(name, &key()).unwrap_err(),
                ZkError::InvalidCircuitName(_)
            ));
        }
    }

    #[test]
    fn lists_published_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let store = VerificationKeyStore::new(dir.path());
        assert!(store.list_circuits().unwrap().is_empty());

        store.save("level_2", &key()).unwrap();
        store.save("level_1", &key()).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list_circuits().unwrap(), vec!["level_1", "level_2"]);
    }
}
