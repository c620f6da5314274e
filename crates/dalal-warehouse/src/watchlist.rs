use crate::schema::stock::quote::normalize_symbol;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One watched instrument. Only `symbol` matters to the store; anything else a client sends
/// (price, change, notes, ...) is kept and handed back untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WatchItem {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WatchItem {
    pub fn new(symbol: &str, name: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("watchlist storage failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid watchlist file: {0}")]
    InvalidFormat(String),
}

/// Where the watchlist lives; swap implementations without touching callers.
#[async_trait]
pub trait WatchlistRepository: Send + Sync {
    /// Current items; a missing or unreadable store is an empty list.
    async fn load(&self) -> Vec<WatchItem>;

    /// Replace the stored items with `items`.
    async fn save(&self, items: &[WatchItem]) -> Result<(), StoreError>;
}

// -------------------------------------------------------------------------------------------------

/// A JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WatchlistRepository for JsonFileRepository {
    async fn load(&self) -> Vec<WatchItem> {
        match dalal_util::read_json::<Vec<WatchItem>>(&self.path).await {
            Ok(items) => items,
            Err(e) if e.kind() == io::ErrorKind::NotFound => vec![],
            Err(e) => {
                warn!("ignoring unreadable watchlist at {} | {e}", self.path.display());
                vec![]
            }
        }
    }

    async fn save(&self, items: &[WatchItem]) -> Result<(), StoreError> {
        dalal_util::write_json(&self.path, items).await?;
        Ok(())
    }
}

/// Lives as long as the process; used in tests & demos.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    items: Mutex<Vec<WatchItem>>,
}

#[async_trait]
impl WatchlistRepository for MemoryRepository {
    async fn load(&self) -> Vec<WatchItem> {
        self.items.lock().await.clone()
    }

    async fn save(&self, items: &[WatchItem]) -> Result<(), StoreError> {
        *self.items.lock().await = items.to_vec();
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// List semantics over a repository: append-if-absent, remove-by-symbol, replace-all.
///
/// Symbols are trimmed & upper-cased on the way in, so `tcs` and ` TCS` are one entry.
///
/// Every mutation is a load-modify-save cycle, serialized by an internal lock.
pub struct Watchlist {
    repo: Arc<dyn WatchlistRepository>,
    lock: Mutex<()>,
}

impl Watchlist {
    pub fn new(repo: Arc<dyn WatchlistRepository>) -> Self {
        Self {
            repo,
            lock: Mutex::new(()),
        }
    }

    pub async fn items(&self) -> Vec<WatchItem> {
        self.repo.load().await
    }

    /// Returns `false` when the symbol is already watched.
    pub async fn add(&self, mut item: WatchItem) -> Result<bool, StoreError> {
        item.symbol = normalize_symbol(&item.symbol);
        let _guard = self.lock.lock().await;
        let mut items = self.repo.load().await;
        if items.iter().any(|watched| watched.symbol == item.symbol) {
            return Ok(false);
        }

        debug!("watching {}", item.symbol);
        items.push(item);
        self.repo.save(&items).await?;
        Ok(true)
    }

    /// Returns `false` when the symbol was not watched.
    pub async fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        let symbol = normalize_symbol(symbol);
        let _guard = self.lock.lock().await;
        let mut items = self.repo.load().await;
        let before = items.len();
        items.retain(|watched| watched.symbol != symbol);
        if items.len() == before {
            return Ok(false);
        }

        debug!("unwatching {symbol}");
        self.repo.save(&items).await?;
        Ok(true)
    }

    pub async fn replace_all(&self, mut items: Vec<WatchItem>) -> Result<(), StoreError> {
        for item in items.iter_mut() {
            item.symbol = normalize_symbol(&item.symbol);
        }
        let _guard = self.lock.lock().await;
        self.repo.save(&items).await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.replace_all(vec![]).await
    }

    /// Replace the watchlist with the JSON array held in the file at `path`; returns how many
    /// items were imported.
    pub async fn import(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let path = path.as_ref();
        let value: Value = dalal_util::read_json(path).await.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                StoreError::InvalidFormat(format!("{}: {e}", path.display()))
            }
            _ => StoreError::Io(e),
        })?;

        if !value.is_array() {
            return Err(StoreError::InvalidFormat(format!(
                "{}: expected a JSON array",
                path.display()
            )));
        }
        let items: Vec<WatchItem> = serde_json::from_value(value)
            .map_err(|e| StoreError::InvalidFormat(format!("{}: {e}", path.display())))?;

        let count = items.len();
        self.replace_all(items).await?;
        Ok(count)
    }

    /// Write the watchlist to `path` as a pretty-printed JSON array; returns how many items
    /// were exported.
    pub async fn export(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let items = self.items().await;
        dalal_util::write_json(path, &items).await?;
        Ok(items.len())
    }
}
