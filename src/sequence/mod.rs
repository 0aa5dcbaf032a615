//! Auto-increment ID sequences backed by the document store.
//!
//! A [`Sequence`] hands out monotonically-assigned integer IDs for one
//! (collection, sequence name) pair. IDs are allocated by atomically
//! advancing the version counter of a single counter document in the
//! administrative sequence index, pre-fetched in batches into an in-memory
//! cache, and drawn one at a time by callers. Because allocation goes
//! through the backend's atomic version counter, IDs never collide across
//! processes sharing a sequence name; IDs fetched into a cache that is then
//! abandoned are permanently lost, so gaps are possible.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use crate::errors::StoreError;
use crate::interfaces::DocumentStore;
use crate::opensearch::{
    max_id_scan_query, sequence_index_settings, BOOTSTRAP_SCAN_SIZE, SEQUENCE_INDEX,
};

/// A named auto-increment ID generator.
///
/// Construction bootstraps the counter relative to data already present in
/// the collection (see [`Sequence::new`]), then keeps a bounded cache of
/// pre-allocated IDs topped up in the background. [`get_id`](Self::get_id)
/// draws one ID; when the cache runs low, a low-watermark signal is sent to
/// a dedicated refill worker task, so callers are never blocked by store
/// round trips while cached IDs remain. One worker per sequence guarantees
/// at most one refill batch in flight at a time.
///
/// The cache is a bounded channel: the refill worker blocks when it is full
/// and consumers block when it is empty. An empty cache therefore means
/// [`get_id`](Self::get_id) waits for the next refill instead of failing.
/// This is deliberate backpressure, not an error.
pub struct Sequence {
    store: Arc<dyn DocumentStore>,
    /// Collection whose documents this sequence assigns IDs for; scanned
    /// once at bootstrap.
    collection: String,
    /// Sequence name, doubling as the counter document ID.
    name: String,
    cache_size: usize,
    id_tx: mpsc::Sender<u64>,
    id_rx: Mutex<mpsc::Receiver<u64>>,
    /// Low-watermark signals to the refill worker. Capacity 1: signals sent
    /// while a refill is pending coalesce into it.
    refill_tx: mpsc::Sender<()>,
}

impl Sequence {
    /// Create a sequence for `collection` under `name`, bootstrapping the
    /// counter before any ID can be issued.
    ///
    /// Bootstrap provisions the sequence index if needed, then checks for
    /// the counter document. If it does not exist yet, the collection is
    /// scanned for its highest pre-existing integer identifier and the
    /// counter is advanced past it, so enabling sequences on a collection
    /// with manually-assigned integer keys cannot produce collisions.
    ///
    /// A bootstrap failure is fatal: a sequence that cannot determine its
    /// floor must not issue IDs.
    ///
    /// Two processes bootstrapping the same fresh name concurrently may
    /// each advance the counter by the floor. That wastes a gap of IDs but
    /// never produces a duplicate, and is accepted rather than paying for
    /// cross-process locking the store does not offer.
    ///
    /// # Arguments
    ///
    /// * `store` - The backing document store
    /// * `collection` - The collection whose IDs this sequence manages
    /// * `name` - The sequence name (counter document ID)
    /// * `cache_size` - Refill batch size; values below 1 are raised to 1
    pub async fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        name: impl Into<String>,
        cache_size: usize,
    ) -> Result<Self, StoreError> {
        let cache_size = cache_size.max(1);
        // One full refill batch fits ahead of consumption.
        let (id_tx, id_rx) = mpsc::channel(cache_size * 2);
        let (refill_tx, refill_rx) = mpsc::channel(1);

        let sequence = Self {
            store,
            collection: collection.into(),
            name: name.into(),
            cache_size,
            id_tx,
            id_rx: Mutex::new(id_rx),
            refill_tx,
        };

        sequence
            .store
            .ensure_index(SEQUENCE_INDEX, Some(sequence_index_settings()))
            .await?;
        sequence.bootstrap().await?;

        tokio::spawn(refill_worker(
            Arc::clone(&sequence.store),
            sequence.name.clone(),
            cache_size as u64,
            sequence.id_tx.clone(),
            refill_rx,
        ));
        sequence.request_refill();

        Ok(sequence)
    }

    /// Draw the next ID, waiting for a refill if the cache is empty.
    ///
    /// Returns the decimal representation of the allocated integer. Every
    /// value returned is unique for this sequence name across all processes
    /// sharing the backing store, and greater than the bootstrap floor.
    ///
    /// This variant waits indefinitely while refills keep failing; use
    /// [`get_id_timeout`](Self::get_id_timeout) to bound the wait.
    pub async fn get_id(&self) -> Result<String, StoreError> {
        let id = self.next_id().await?;
        Ok(id.to_string())
    }

    /// Draw the next ID, waiting at most `deadline`.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The allocated ID
    /// * `Err(StoreError::Timeout)` - If no ID became available in time
    pub async fn get_id_timeout(&self, deadline: Duration) -> Result<String, StoreError> {
        match tokio::time::timeout(deadline, self.next_id()).await {
            Ok(id) => Ok(id?.to_string()),
            Err(_) => Err(StoreError::timeout(format!(
                "no sequence ID became available within {:?}",
                deadline
            ))),
        }
    }

    /// Number of IDs currently buffered.
    fn cached(&self) -> usize {
        self.id_tx.max_capacity() - self.id_tx.capacity()
    }

    /// Signal the refill worker. A signal already pending means a refill is
    /// coming anyway, so a full channel is not an error.
    fn request_refill(&self) {
        let _ = self.refill_tx.try_send(());
    }

    async fn next_id(&self) -> Result<u64, StoreError> {
        if self.cached() == 0 {
            warn!(
                collection = %self.collection,
                sequence = %self.name,
                "sequence cache is empty"
            );
        }
        if self.cached() <= self.cache_size {
            self.request_refill();
        }

        let mut id_rx = self.id_rx.lock().await;
        match id_rx.try_recv() {
            Ok(id) => Ok(id),
            Err(mpsc::error::TryRecvError::Empty) => {
                // Make sure a refill is pending before blocking, otherwise a
                // consumer could wait on a cache nothing will ever fill.
                self.request_refill();
                id_rx
                    .recv()
                    .await
                    .ok_or_else(|| StoreError::unknown("sequence ID cache closed"))
            }
            Err(mpsc::error::TryRecvError::Disconnected) => {
                Err(StoreError::unknown("sequence ID cache closed"))
            }
        }
    }

    /// Seed the counter relative to pre-existing data.
    async fn bootstrap(&self) -> Result<(), StoreError> {
        if self.store.exists(SEQUENCE_INDEX, &self.name).await? {
            // A live counter already reflects prior usage.
            debug!(sequence = %self.name, "Counter document exists, skipping bootstrap scan");
            return Ok(());
        }

        let floor = self.max_existing_id().await?;
        if floor > 0 {
            info!(
                collection = %self.collection,
                sequence = %self.name,
                floor = floor,
                "Advancing sequence counter past pre-existing identifiers"
            );
            // The returned versions are discarded; the next refill starts
            // strictly above the floor.
            self.store
                .increment_batch(SEQUENCE_INDEX, &self.name, floor)
                .await?;
        }
        Ok(())
    }

    /// Highest integer identifier currently present in the collection, or 0
    /// if there is none.
    async fn max_existing_id(&self) -> Result<u64, StoreError> {
        let response = match self
            .store
            .search(&self.collection, &max_id_scan_query(BOOTSTRAP_SCAN_SIZE))
            .await
        {
            Ok(response) => response,
            // A collection that does not exist yet has no identifiers.
            Err(StoreError::NotFound(_)) => return Ok(0),
            Err(e) => return Err(e),
        };

        for hit in &response.hits {
            match hit.id.parse::<u64>() {
                Ok(id) => return Ok(id),
                Err(_) => {
                    debug!(
                        collection = %self.collection,
                        doc_id = %hit.id,
                        "Skipping non-integer identifier in bootstrap scan"
                    );
                }
            }
        }
        Ok(0)
    }
}

/// Dedicated refill task: one per sequence, draining low-watermark signals.
///
/// Each signal produces at most one `increment_batch` round trip, so refills
/// never overlap. A failed batch is logged and the cache simply does not
/// grow; the next signal tries again. The task exits when the owning
/// [`Sequence`] is dropped (both channels close).
async fn refill_worker(
    store: Arc<dyn DocumentStore>,
    name: String,
    batch: u64,
    id_tx: mpsc::Sender<u64>,
    mut refill_rx: mpsc::Receiver<()>,
) {
    while refill_rx.recv().await.is_some() {
        match store.increment_batch(SEQUENCE_INDEX, &name, batch).await {
            Ok(versions) => {
                debug!(sequence = %name, count = versions.len(), "Refilled sequence cache");
                for version in versions {
                    // Fails only when the sequence was dropped; the
                    // remaining IDs are lost, which gaps allow.
                    if id_tx.send(version).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                error!(sequence = %name, error = %e, "Sequence cache refill failed");
            }
        }
    }
}
