//! Record store of the expense tracker.
//!
//! [`Ledger`] owns the collection of [`Entry`] values and is the only way to
//! read or change it. The collection itself lives in an [`EntryStore`]: a
//! JSON file in production, memory in tests.
use std::sync::Arc;

use tokio::sync::Mutex;

pub use entry::{Entry, EntryId, EntryKind, EntryNew};
pub use error::EngineError;
pub use ids::IdGenerator;
pub use store::{EntryStore, JsonFileStore, MemoryStore};

mod entry;
mod error;
mod ids;
mod store;

type ResultEngine<T> = Result<T, EngineError>;

#[derive(Debug)]
pub struct Ledger {
    store: Arc<dyn EntryStore>,
    ids: IdGenerator,
    /// Serializes read-modify-write cycles on the store.
    write_lock: Mutex<()>,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// Every entry, in insertion order.
    ///
    /// Never fails: an unreadable or malformed store is logged and reported
    /// as an empty collection.
    pub async fn entries(&self) -> Vec<Entry> {
        match self.load().await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!("failed to read entries, serving an empty list: {err}");
                Vec::new()
            }
        }
    }

    /// Validate `candidate`, assign it a fresh id and append it.
    ///
    /// Nothing is written when validation fails.
    pub async fn add_entry(&self, candidate: EntryNew) -> ResultEngine<Entry> {
        // Reject bad input before touching the store.
        candidate.clone().into_entry(0)?;

        let _guard = self.write_lock.lock().await;
        let mut entries = self.load_for_update().await?;
        if let Some(max) = entries.iter().map(|entry| entry.id).max() {
            self.ids.observe(max);
        }

        let entry = candidate.into_entry(self.ids.next_id())?;
        entries.push(entry.clone());
        self.persist(entries).await?;

        tracing::debug!("added entry {entry}");
        Ok(entry)
    }

    /// Remove every entry with the given id and return how many were removed.
    ///
    /// A missing id is [`EngineError::MissingId`]; an unknown one is a no-op.
    pub async fn delete_entry(&self, id: Option<EntryId>) -> ResultEngine<usize> {
        let id = id.ok_or(EngineError::MissingId)?;

        let _guard = self.write_lock.lock().await;
        let mut entries = self.load_for_update().await?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = before - entries.len();
        if removed > 0 {
            self.persist(entries).await?;
        }

        tracing::debug!("deleted {removed} entries with id {id}");
        Ok(removed)
    }

    /// Load before a mutation. Unlike [`Ledger::entries`] this refuses to
    /// go on with an unreadable store, which would be overwritten otherwise.
    async fn load_for_update(&self) -> ResultEngine<Vec<Entry>> {
        self.load().await.inspect_err(|err| {
            tracing::error!("failed to read entries before update: {err}");
        })
    }

    async fn persist(&self, entries: Vec<Entry>) -> ResultEngine<()> {
        let store = Arc::clone(&self.store);
        blocking(move || store.save(&entries))
            .await
            .inspect_err(|err| {
                tracing::error!("failed to write entries: {err}");
            })
    }

    async fn load(&self) -> ResultEngine<Vec<Entry>> {
        let store = Arc::clone(&self.store);
        blocking(move || store.load()).await
    }
}

/// Run store I/O off the async worker threads.
async fn blocking<T, F>(f: F) -> ResultEngine<T>
where
    F: FnOnce() -> ResultEngine<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| EngineError::Storage(std::io::Error::other(err)))?
}

/// Builder for [`Ledger`]. Without a store it falls back to a [`MemoryStore`].
#[derive(Debug, Default)]
pub struct LedgerBuilder {
    store: Option<Arc<dyn EntryStore>>,
}

impl LedgerBuilder {
    /// Pass the store the ledger reads from and writes to.
    pub fn store(mut self, store: impl EntryStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Pass a store shared with someone else, e.g. a test inspecting it.
    pub fn shared_store(mut self, store: Arc<dyn EntryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the ledger, seeding the id generator past every stored id.
    ///
    /// An unreadable store does not prevent startup; it is logged and the
    /// first mutation will report the failure.
    pub async fn build(self) -> ResultEngine<Ledger> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn EntryStore>);

        let loaded = {
            let store = Arc::clone(&store);
            blocking(move || store.load()).await
        };
        let floor = match loaded {
            Ok(entries) => {
                tracing::info!("loaded {} entries", entries.len());
                entries.iter().map(|entry| entry.id).max().unwrap_or(0)
            }
            Err(err) => {
                tracing::warn!("store is not readable at startup: {err}");
                0
            }
        };

        Ok(Ledger {
            store,
            ids: IdGenerator::starting_after(floor),
            write_lock: Mutex::new(()),
        })
    }
}
