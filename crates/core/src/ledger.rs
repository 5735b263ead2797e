use crate::error::Result;
use crate::types::{timelock_transaction::TimelockTransaction, transaction_id::TransactionId};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Outstanding timelock transactions of one network, backed by
/// `transactions.<network>.json`.
///
/// Opened once at process start and passed explicitly into every operation.
/// Each mutation rewrites the whole file through a temporary sibling and a
/// rename, so a failed write leaves the previous contents intact. There is no
/// protection against concurrent writers.
#[derive(Debug)]
pub struct Ledger {
    network: String,
    path: PathBuf,
    transactions: BTreeMap<TransactionId, TimelockTransaction>,
}

impl Ledger {
    pub fn open(dir: impl AsRef<Path>, network: &str) -> Result<Self> {
        let path = dir
            .as_ref()
            .join(format!("transactions.{}.json", network));

        let mut transactions: BTreeMap<TransactionId, TimelockTransaction> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        // Older files keyed entries without repeating the id inside them.
        for (id, tx) in transactions.iter_mut() {
            tx.id = *id;
        }

        debug!(
            "Opened {} ledger at {} with {} transaction(s)",
            network,
            path.display(),
            transactions.len()
        );

        Ok(Self {
            network: network.to_string(),
            path,
            transactions,
        })
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, id: &TransactionId) -> Option<&TimelockTransaction> {
        self.transactions.get(id)
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.transactions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimelockTransaction> {
        self.transactions.values()
    }

    /// Inserts and persists. On a failed write the in-memory state is rolled back.
    pub fn insert(&mut self, transaction: TimelockTransaction) -> Result<()> {
        let id = transaction.id;
        let previous = self.transactions.insert(id, transaction);
        if let Err(e) = self.flush() {
            match previous {
                Some(tx) => self.transactions.insert(id, tx),
                None => self.transactions.remove(&id),
            };
            return Err(e);
        }
        info!("Stored transaction {} in {} ledger", id, self.network);
        Ok(())
    }

    /// Removes and persists, returning the removed entry.
    pub fn remove(&mut self, id: &TransactionId) -> Result<Option<TimelockTransaction>> {
        let Some(removed) = self.transactions.remove(id) else {
            return Ok(None);
        };
        if let Err(e) = self.flush() {
            self.transactions.insert(*id, removed);
            return Err(e);
        }
        info!("Removed transaction {} from {} ledger", id, self.network);
        Ok(Some(removed))
    }

    pub fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(&self.transactions)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn close(self) -> Result<()> {
        self.flush()
    }
}
