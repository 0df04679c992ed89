//! Durable key-value storage for the API credential.
//!
//! A small JSON file under the config directory, fronted by a process-wide
//! handle behind a `OnceLock`. Initialization is lazy and idempotent: only
//! the first access performs the underlying load, repeated init calls return
//! the same handle. The stored value is never logged or printed.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing::info;

/// Fixed key under which the credential is stored.
pub const CREDENTIAL_KEY: &str = "openai_api_key";

const STORE_FILE: &str = "store.json";

static STORE: OnceLock<Mutex<CredentialStore>> = OnceLock::new();

/// File-backed key-value store.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl CredentialStore {
    /// Opens the store at the given path, loading existing entries if the
    /// file exists.
    pub fn open(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read store at {}", path.display()))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            HashMap::new()
        };

        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Sets a value and persists the store.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.save()
    }

    /// Deletes a value and persists the store. Deleting a missing key is not
    /// an error.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)
            .with_context(|| format!("failed to write store at {}", self.path.display()))?;
        Ok(())
    }
}

fn default_store_path() -> Result<PathBuf> {
    Ok(crate::config::Config::config_dir()?.join(STORE_FILE))
}

/// Returns the process-wide store handle, loading it on first use.
///
/// Safe to call repeatedly; only the first call performs the load.
pub fn init_store() -> Result<&'static Mutex<CredentialStore>> {
    if let Some(store) = STORE.get() {
        return Ok(store);
    }
    let store = CredentialStore::open(default_store_path()?)?;
    info!("Credential store initialized");
    Ok(STORE.get_or_init(|| Mutex::new(store)))
}

/// Reads the stored credential, if any.
pub fn get_api_key() -> Option<String> {
    let store = init_store().ok()?;
    let store = store.lock().ok()?;
    store.get(CREDENTIAL_KEY).map(str::to_string)
}

/// Stores the credential.
pub fn set_api_key(api_key: &str) -> Result<()> {
    let store = init_store()?;
    let mut store = store
        .lock()
        .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
    store.set(CREDENTIAL_KEY, api_key)
}

/// Removes the stored credential.
pub fn clear_api_key() -> Result<()> {
    let store = init_store()?;
    let mut store = store
        .lock()
        .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
    store.delete(CREDENTIAL_KEY)
}
