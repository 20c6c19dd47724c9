//! The caching engine wrapping one chain.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use weir_common::Digest;
use weir_flow::{Chain, Outcome, Record};

use crate::codec::{self, CodecError};
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::fingerprint::ChainFingerprint;
use crate::store::EntryStore;

/// Default record field holding the per-item identity.
pub const DEFAULT_IDENTITY_FIELD: &str = "id";

/// Default bound on the structural walk of unit state.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 10;

/// Default access rights for a freshly created cache directory: world
/// read/write/execute, so the cache can be shared between user accounts.
pub const DEFAULT_DIRECTORY_MODE: u32 = 0o777;

/// Constructor-level configuration for a [`FlowCache`].
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Persistence root; created with [`CacheOptions::directory_mode`] rights
    /// if absent.
    pub directory: PathBuf,

    /// Name of the record field used as per-item identity.
    pub identity_field: String,

    /// When set, existing entries are ignored (the chain always runs) but
    /// results are still written.
    pub force: bool,

    /// Maximum nesting depth the structural fingerprint walks into unit
    /// state; deeper levels contribute nothing.
    pub max_recursion_depth: usize,

    /// Access rights applied to a freshly created persistence root.
    pub directory_mode: u32,
}

impl CacheOptions {
    /// Creates options with defaults for everything but the directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            force: false,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            directory_mode: DEFAULT_DIRECTORY_MODE,
        }
    }

    /// Sets the identity field name.
    pub fn identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    /// Sets the force flag.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Sets the structural walk depth bound.
    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Sets the access rights for a freshly created persistence root.
    pub fn directory_mode(mut self, mode: u32) -> Self {
        self.directory_mode = mode;
        self
    }
}

/// A memoizing front for one chain.
///
/// For each processed record the engine derives a cache key from the record's
/// identity field and the chain's structural fingerprint. On a hit the
/// persisted result is merged back into the record (or a persisted early-stop
/// is replayed) without running the chain; on a miss the chain runs and its
/// outcome is persisted. A truncated entry encountered on a hit is deleted
/// and recomputed.
pub struct FlowCache {
    /// The wrapped chain.
    chain: Chain,

    /// Flat-file persistence under the configured directory.
    store: EntryStore,

    /// Record field used as per-item identity.
    identity_field: String,

    /// Ignore existing entries (but still write results).
    force: bool,

    /// Depth bound for the structural fingerprint walk.
    max_depth: usize,

    /// Fingerprint of the wrapped chain, recomputed when the top-level link
    /// count changes.
    fingerprint: ChainFingerprint,
}

impl FlowCache {
    /// Wraps a chain, creating the persistence root if needed and computing
    /// the initial fingerprint.
    pub fn new(chain: Chain, options: CacheOptions) -> Result<Self, CacheError> {
        let store = EntryStore::create(&options.directory, options.directory_mode)?;
        let fingerprint = ChainFingerprint::compute(&chain, options.max_recursion_depth);
        Ok(Self {
            chain,
            store,
            identity_field: options.identity_field,
            force: options.force,
            max_depth: options.max_recursion_depth,
            fingerprint,
        })
    }

    /// Returns the current chain fingerprint.
    pub fn fingerprint(&self) -> &ChainFingerprint {
        &self.fingerprint
    }

    /// Returns the wrapped chain.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Returns the wrapped chain for modification.
    ///
    /// The fingerprint is refreshed on the next [`FlowCache::process`] call
    /// if the top-level link count changed; state mutations that keep the
    /// count are deliberately not detected (the cheap staleness probe).
    pub fn chain_mut(&mut self) -> &mut Chain {
        &mut self.chain
    }

    /// Derives the cache key for a record: the digest of its serialized
    /// identity value concatenated with the chain's structural hash.
    ///
    /// Records with the same identity value processed by structurally
    /// identical chains collide onto the same key by design.
    pub fn cache_key(&self, record: &Record) -> Result<String, CacheError> {
        let identity =
            record
                .get(&self.identity_field)
                .ok_or_else(|| CacheError::MissingIdentityField {
                    field: self.identity_field.clone(),
                })?;
        let bytes = codec::encode(identity)?;
        Ok(format!(
            "{}{}",
            Digest::from_bytes(&bytes),
            self.fingerprint.structural_hash
        ))
    }

    /// Returns the on-disk path that does or would hold the record's entry.
    pub fn entry_path(&self, record: &Record) -> Result<PathBuf, CacheError> {
        Ok(self.store.path_for(&self.cache_key(record)?))
    }

    /// Processes a record through the cache.
    ///
    /// On a hit the persisted fields are merged into `record` (same-named
    /// fields overwritten, others untouched); for a persisted early-stop,
    /// [`Outcome::Stopped`] is returned without touching the record or the
    /// chain. On a miss the chain runs, the outcome is
    /// persisted, and the chain's own outcome is returned so callers observe
    /// the same stop contract either way.
    pub fn process(&mut self, record: &mut Record) -> Result<Outcome, CacheError> {
        self.refresh_fingerprint();
        let key = self.cache_key(record)?;

        if self.store.exists(&key) {
            if self.force {
                info!(key = %key, "entry found in cache but force is set, reprocessing");
            } else if let Some(outcome) = self.replay(record, &key)? {
                return Ok(outcome);
            }
        }

        debug!(key = %key, "not found in cache, processing chain");
        self.run_and_persist(record, &key)
    }

    /// Recomputes the fingerprint when the top-level link count changed.
    fn refresh_fingerprint(&mut self) {
        if self.chain.len() != self.fingerprint.unit_count {
            self.fingerprint = ChainFingerprint::compute(&self.chain, self.max_depth);
        }
    }

    /// Hit path: replays a persisted entry into the record.
    ///
    /// Returns `Ok(None)` when the entry was truncated; it has been deleted
    /// and the caller falls through to a miss.
    fn replay(&self, record: &mut Record, key: &str) -> Result<Option<Outcome>, CacheError> {
        info!(key = %key, "found in cache, skipping chain");
        let bytes = self.store.read(key)?;
        let entry: CacheEntry = match codec::decode(&bytes) {
            Ok(entry) => entry,
            Err(CodecError::EndOfData) => {
                warn!(
                    path = %self.store.path_for(key).display(),
                    "failed to load cache entry, corrupted file will be deleted"
                );
                self.store.remove(key)?;
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        if entry.stopped {
            return Ok(Some(Outcome::Stopped));
        }

        if entry.chain_mtime != self.fingerprint.chain_mtime {
            warn!(
                cached = entry.chain_mtime,
                current = self.fingerprint.chain_mtime,
                "modification times do not correspond; sources changed since this entry was written"
            );
        }

        record.absorb(&entry.data);
        Ok(Some(Outcome::Completed))
    }

    /// Miss path: runs the chain and persists its outcome.
    fn run_and_persist(&mut self, record: &mut Record, key: &str) -> Result<Outcome, CacheError> {
        let outcome = self.chain.process(record)?;

        let entry = CacheEntry {
            data: record.clone(),
            stopped: outcome.is_stopped(),
            chain_repr: self.fingerprint.chain_repr.clone(),
            chain_mtime: self.fingerprint.chain_mtime,
        };
        let bytes = codec::encode(&entry)?;
        self.store.write(key, &bytes)?;

        Ok(outcome)
    }
}
