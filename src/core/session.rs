//! Anonymous student session id.
//!
//! The chat service keys conversation state on a `student_id`. It is
//! generated once per session substrate and reused until that substrate is
//! cleared.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::constants::SESSION_ID_KEY;
use crate::core::substrate::KeyValueStore;

/// The stored session id, generating and storing a new one when absent.
///
/// A substrate that cannot be read or written still yields a usable id; it
/// just will not survive the process.
pub fn session_id(substrate: &dyn KeyValueStore) -> String {
    match substrate.get(SESSION_ID_KEY) {
        Ok(Some(id)) if !id.trim().is_empty() => return id,
        Ok(_) => {}
        Err(err) => warn!("could not read session id: {err}"),
    }

    let id = Uuid::new_v4().to_string();
    match substrate.set(SESSION_ID_KEY, &id) {
        Ok(()) => debug!(id = %id, "generated new session id"),
        Err(err) => warn!("could not store session id, using an unsaved one: {err}"),
    }
    id
}

/// Short form shown to students: the first 8 characters, uppercased.
pub fn display_id(id: &str) -> String {
    id.chars().take(8).collect::<String>().to_uppercase()
}
