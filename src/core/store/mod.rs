//! Chatbot profile store.
//!
//! [`ProfileStore`] keeps every profile inside one root record
//! (`{"version": "1.0", "bots": {id: profile}}`) stored under a single key of
//! the durable substrate. Every write replaces the whole record, which makes
//! each operation a single atomic `set` against a substrate that has no
//! transactions.
//!
//! Reads are fail-safe: a missing, unparsable or version-mismatched record
//! reads as empty. Writes that start from such a record rebuild it from
//! scratch, dropping whatever could not be read.
//!
//! There is no coordination between processes sharing a substrate; the last
//! whole-record write wins. An environment with real concurrent writers
//! needs a compare-and-swap on the record version before this store is safe
//! there.

mod error;
mod id;
mod legacy;


pub use error::StoreError;
pub use legacy::MigrationOutcome;

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::core::constants::{STORAGE_KEY, STORAGE_VERSION};
use crate::core::profile::{Profile, ProfileInput, ProfilePatch};
use crate::core::substrate::{KeyValueStore, SubstrateError};

/// The single persisted object holding all profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRecord {
    pub version: String,
    pub bots: BTreeMap<String, Profile>,
}

impl RootRecord {
    pub fn empty() -> Self {
        Self {
            version: STORAGE_VERSION.to_string(),
            bots: BTreeMap::new(),
        }
    }

    fn name_taken(&self, name: &str, exclude_id: Option<&str>) -> bool {
        let needle = name.to_lowercase();
        self.bots
            .values()
            .any(|bot| Some(bot.id.as_str()) != exclude_id && bot.name.to_lowercase() == needle)
    }
}

/// Summary of what the store currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    pub total_bots: usize,
    /// Size in bytes of the persisted root record as stored.
    pub storage_size: usize,
    pub oldest_created: Option<DateTime<Utc>>,
    pub newest_created: Option<DateTime<Utc>>,
}

/// Why a stored root record could not be used.
#[derive(Debug)]
enum Corruption {
    Unreadable(SubstrateError),
    Unparsable(serde_json::Error),
    VersionMismatch(Option<String>),
    MissingBots,
}

struct LoadedRoot {
    record: RootRecord,
    raw_len: usize,
}

/// Durable CRUD over chatbot profiles.
///
/// `local` is the origin-scoped durable substrate holding the root record.
/// `session` is the ephemeral substrate holding the temporary chatbot slot
/// and the session id.
pub struct ProfileStore {
    local: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
}

impl ProfileStore {
    pub fn new(
        local: impl KeyValueStore + 'static,
        session: impl KeyValueStore + 'static,
    ) -> Self {
        Self {
            local: Box::new(local),
            session: Box::new(session),
        }
    }

    /// The session-scoped substrate.
    pub fn session(&self) -> &dyn KeyValueStore {
        self.session.as_ref()
    }

    /// All stored profiles, oldest first.
    pub fn list(&self) -> Vec<Profile> {
        let mut bots: Vec<Profile> = self.load_root().record.bots.into_values().collect();
        bots.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        bots
    }

    pub fn get(&self, id: &str) -> Option<Profile> {
        self.load_root().record.bots.remove(id)
    }

    /// True when no stored profile other than `exclude_id` uses `name`,
    /// ignoring case.
    pub fn name_is_unique(&self, name: &str, exclude_id: Option<&str>) -> bool {
        !self.load_root().record.name_taken(name, exclude_id)
    }

    /// Store a new profile and return its generated id.
    pub fn create(&self, input: ProfileInput) -> Result<String, StoreError> {
        let mut record = self.load_root().record;
        if record.name_taken(&input.name, None) {
            return Err(StoreError::NameTaken { name: input.name });
        }

        let now = now();
        let mut id = id::generate(now);
        while record.bots.contains_key(&id) {
            id = id::generate(now);
        }

        let profile = build_profile(id.clone(), input, now, now);
        record.bots.insert(id.clone(), profile);
        self.persist(&record)?;

        info!(id = %id, "created chatbot profile");
        Ok(id)
    }

    /// Merge `patch` onto the profile `id` and persist it.
    ///
    /// The id and creation time are kept; `updated_at` always moves forward.
    pub fn update(&self, id: &str, patch: &ProfilePatch) -> Result<Profile, StoreError> {
        let mut record = self.load_root().record;
        let existing = record.bots.get(id).ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;

        let merged = patch.apply(existing.input());
        if record.name_taken(&merged.name, Some(id)) {
            return Err(StoreError::NameTaken { name: merged.name });
        }

        let created_at = existing.created_at;
        let updated_at = later_than(existing.updated_at);
        let profile = build_profile(id.to_string(), merged, created_at, updated_at);
        record.bots.insert(id.to_string(), profile.clone());
        self.persist(&record)?;

        info!(id, "updated chatbot profile");
        Ok(profile)
    }

    /// Remove a profile. Returns `false` when there was nothing to remove.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut record = self.load_root().record;
        if record.bots.remove(id).is_none() {
            debug!(id, "delete of unknown chatbot ignored");
            return Ok(false);
        }

        self.persist(&record)?;
        self.unstage(id);
        info!(id, "deleted chatbot profile");
        Ok(true)
    }

    pub fn stats(&self) -> StorageStats {
        let loaded = self.load_root();
        let created = loaded.record.bots.values().map(|bot| bot.created_at);
        StorageStats {
            total_bots: loaded.record.bots.len(),
            storage_size: loaded.raw_len,
            oldest_created: created.clone().min(),
            newest_created: created.max(),
        }
    }

    fn load_root(&self) -> LoadedRoot {
        let raw = match self.local.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                return LoadedRoot {
                    record: RootRecord::empty(),
                    raw_len: 0,
                }
            }
            Err(err) => {
                return Self::discard(Corruption::Unreadable(err), 0);
            }
        };

        let raw_len = raw.len();
        match parse_root(&raw) {
            Ok(record) => LoadedRoot { record, raw_len },
            Err(corruption) => Self::discard(corruption, raw_len),
        }
    }

    fn discard(corruption: Corruption, raw_len: usize) -> LoadedRoot {
        match &corruption {
            Corruption::Unreadable(err) => warn!("chatbot storage unreadable, treating as empty: {err}"),
            Corruption::Unparsable(err) => warn!("chatbot storage is not valid JSON, treating as empty: {err}"),
            Corruption::VersionMismatch(found) => warn!(
                expected = STORAGE_VERSION,
                found = found.as_deref().unwrap_or("<missing>"),
                "chatbot storage version mismatch, treating as empty"
            ),
            Corruption::MissingBots => warn!("chatbot storage has no bots map, treating as empty"),
        }
        LoadedRoot {
            record: RootRecord::empty(),
            raw_len,
        }
    }

    fn persist(&self, record: &RootRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        self.local.set(STORAGE_KEY, &payload).map_err(|source| {
            error!("failed to persist chatbot storage: {source}");
            StoreError::Persistence {
                key: STORAGE_KEY,
                source,
            }
        })?;
        debug!(bots = record.bots.len(), bytes = payload.len(), "persisted root record");
        Ok(())
    }
}

/// Decode a root record, dropping individual entries that are malformed or
/// whose key does not match their id.
fn parse_root(raw: &str) -> Result<RootRecord, Corruption> {
    // Only a top-level JSON object qualifies.
    let root: Map<String, Value> = serde_json::from_str(raw).map_err(Corruption::Unparsable)?;
    match root.get("version") {
        Some(Value::String(version)) if version == STORAGE_VERSION => {}
        found => {
            let found = found.map(|value| match value {
                Value::String(version) => version.clone(),
                other => other.to_string(),
            });
            return Err(Corruption::VersionMismatch(found));
        }
    }
    let Some(Value::Object(raw_bots)) = root.get("bots") else {
        return Err(Corruption::MissingBots);
    };

    let mut bots = BTreeMap::new();
    for (key, value) in raw_bots {
        match Profile::deserialize(value) {
            Ok(bot) if &bot.id == key => {
                bots.insert(key.clone(), bot);
            }
            Ok(bot) => warn!(key = %key, id = %bot.id, "dropping chatbot stored under a foreign key"),
            Err(err) => warn!(key = %key, "dropping unreadable chatbot entry: {err}"),
        }
    }

    Ok(RootRecord {
        version: STORAGE_VERSION.to_string(),
        bots,
    })
}

fn build_profile(
    id: String,
    input: ProfileInput,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Profile {
    Profile {
        id,
        name: input.name,
        personality: input.personality,
        reference_materials: input.reference_materials,
        conversation_style: input.conversation_style,
        color_theme: input.color_theme,
        created_at,
        updated_at,
    }
}

/// Current time at the millisecond precision timestamps are stored with.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A timestamp strictly after `previous`, normally the current time.
fn later_than(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::milliseconds(1)
    }
}
