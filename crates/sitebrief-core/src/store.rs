//! Sled-backed lead store: one tree per collection, JSON-serialized records.
//!
//! Two collections: `identities` (raw documents owned by the upstream auth
//! system, any shape) and `handoffs` (records created by this core). Writes
//! are single-record inserts with no cross-record invariants; the only
//! guarantee needed from Sled is its atomic per-key insert.

use serde_json::Value;
use sled::Db;
use std::path::Path;

use crate::error::CoreResult;
use crate::handoff::HandoffRecord;

const DEFAULT_PATH: &str = "./data/sitebrief_leads";

const IDENTITIES_TREE: &str = "identities";
const HANDOFFS_TREE: &str = "handoffs";

/// Durable store for identities and handoff records.
pub struct LeadStore {
    identities: sled::Tree,
    handoffs: sled::Tree,
    _db: Db,
}

impl LeadStore {
    /// Opens or creates the store at `./data/sitebrief_leads`.
    pub fn new() -> Result<Self, sled::Error> {
        Self::open_path(DEFAULT_PATH)
    }

    /// Opens or creates the store at the given path.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        Ok(Self {
            identities: db.open_tree(IDENTITIES_TREE)?,
            handoffs: db.open_tree(HANDOFFS_TREE)?,
            _db: db,
        })
    }

    /// Stores a raw identity document under its id. The document keeps
    /// whatever shape the upstream system gave it; normalization happens on
    /// read.
    pub fn put_identity(&self, id: &str, doc: &Value) -> CoreResult<()> {
        let bytes = serde_json::to_vec(doc)?;
        self.identities.insert(id.as_bytes(), bytes)?;
        Ok(())
    }

    /// Raw identity document by id, if present.
    pub fn identity_doc(&self, id: &str) -> CoreResult<Option<Value>> {
        match self.identities.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All identity documents. Undecodable entries are skipped with a warning
    /// rather than failing the whole listing.
    pub fn all_identity_docs(&self) -> CoreResult<Vec<Value>> {
        let mut docs = Vec::new();
        for entry in self.identities.iter() {
            let (key, bytes) = entry?;
            match serde_json::from_slice(&bytes) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    tracing::warn!(
                        target: "sitebrief::store",
                        key = %String::from_utf8_lossy(&key),
                        error = %e,
                        "skipping undecodable identity document"
                    );
                }
            }
        }
        Ok(docs)
    }

    /// Persists one handoff record under its id. Atomic single-record insert.
    pub fn insert_record(&self, record: &HandoffRecord) -> CoreResult<()> {
        let bytes = serde_json::to_vec(record)?;
        self.handoffs.insert(record.id.as_bytes(), bytes)?;
        Ok(())
    }

    /// Handoff record by id, if present.
    pub fn record(&self, id: &str) -> CoreResult<Option<HandoffRecord>> {
        match self.handoffs.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// First handoff record referencing the given submitter, if any.
    pub fn find_record_by_user(&self, user_id: &str) -> CoreResult<Option<HandoffRecord>> {
        for entry in self.handoffs.iter() {
            let (_, bytes) = entry?;
            let record: HandoffRecord = serde_json::from_slice(&bytes)?;
            if record.user_id == user_id {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Number of stored handoff records.
    pub fn record_count(&self) -> usize {
        self.handoffs.len()
    }
}
