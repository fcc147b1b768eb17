//! The session-scoped temporary chatbot slot and the one-time migration out
//! of it.
//!
//! Older builds kept a single chatbot in the session substrate only. On
//! startup [`ProfileStore::migrate_legacy`] moves such a chatbot into the
//! durable store. The same slot is still used to hand a freshly saved
//! profile to the next chat ("save & launch").

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::ProfileStore;
use crate::core::constants::SESSION_TEMP_KEY;
use crate::core::profile::{ColorTheme, ConversationStyle, Profile, ProfileInput};

/// What [`ProfileStore::migrate_legacy`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// A profile was created from the slot, which was then cleared.
    Migrated { id: String },
    /// The slot holds a saved profile staged for launch; left in place.
    Staged { id: String },
    /// A profile with the slot's name already exists; the slot was cleared.
    AlreadyPresent { name: String },
    /// The slot is empty, could not be read, or held a staged profile that
    /// has since been deleted (the slot is then cleared).
    NothingToMigrate,
    /// The slot holds something that is not a complete chatbot; left as is.
    Incomplete,
    /// Saving the profile failed; the slot is kept for the next attempt.
    Failed,
}

impl ProfileStore {
    /// Move a chatbot left in the session slot by an older build into the
    /// durable store.
    ///
    /// Only a JSON object with a non-empty `name` and `personality` is
    /// migrated. Missing or unrecognised style and theme fall back to
    /// friendly and blue. Never fails; running it again after a migration
    /// finds the slot empty and does nothing.
    pub fn migrate_legacy(&self) -> MigrationOutcome {
        let raw = match self.session.get(SESSION_TEMP_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return MigrationOutcome::NothingToMigrate,
            Err(err) => {
                warn!("could not read legacy chatbot slot: {err}");
                return MigrationOutcome::NothingToMigrate;
            }
        };

        // A full profile was staged by this build, never left by an older one.
        if let Ok(staged) = serde_json::from_str::<Profile>(&raw) {
            if self.get(&staged.id).is_some() {
                debug!(id = %staged.id, "session slot holds a staged chatbot, nothing to migrate");
                return MigrationOutcome::Staged { id: staged.id };
            }
            info!(id = %staged.id, "staged chatbot no longer saved, clearing slot");
            self.clear_temp();
            return MigrationOutcome::NothingToMigrate;
        }

        let Some(input) = legacy_input(&raw) else {
            debug!("legacy chatbot slot is incomplete, skipping migration");
            return MigrationOutcome::Incomplete;
        };

        if !self.name_is_unique(&input.name, None) {
            info!(name = %input.name, "legacy chatbot already saved, clearing slot");
            self.clear_temp();
            return MigrationOutcome::AlreadyPresent { name: input.name };
        }

        match self.create(input) {
            Ok(id) => {
                self.clear_temp();
                info!(id = %id, "migrated chatbot from session storage");
                MigrationOutcome::Migrated { id }
            }
            Err(err) => {
                error!("migrating legacy chatbot failed: {err}");
                MigrationOutcome::Failed
            }
        }
    }

    /// Put `profile` in the session slot for immediate use.
    pub fn stage_temp(&self, profile: &Profile) {
        let payload = match serde_json::to_string(profile) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("could not encode temporary chatbot: {err}");
                return;
            }
        };
        if let Err(err) = self.session.set(SESSION_TEMP_KEY, &payload) {
            warn!("could not stage temporary chatbot: {err}");
        }
    }

    /// The profile in the session slot, if it holds a complete one.
    pub fn peek_temp(&self) -> Option<Profile> {
        let raw = match self.session.get(SESSION_TEMP_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("could not read temporary chatbot: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(err) => {
                debug!("temporary chatbot slot does not hold a profile: {err}");
                None
            }
        }
    }

    /// Like [`peek_temp`](Self::peek_temp), and clears the slot when a
    /// profile was found.
    pub fn take_temp(&self) -> Option<Profile> {
        let profile = self.peek_temp()?;
        self.clear_temp();
        Some(profile)
    }

    /// Clear the slot if it holds the profile `id`.
    pub(super) fn unstage(&self, id: &str) {
        if self.peek_temp().is_some_and(|staged| staged.id == id) {
            self.clear_temp();
        }
    }

    pub fn clear_temp(&self) {
        if let Err(err) = self.session.remove(SESSION_TEMP_KEY) {
            warn!("could not clear temporary chatbot slot: {err}");
        }
    }
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn legacy_input(raw: &str) -> Option<ProfileInput> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;

    let name = non_empty_str(object, "name")?;
    let personality = non_empty_str(object, "personality")?;

    let conversation_style = non_empty_str(object, "conversationStyle")
        .and_then(|style| {
            style
                .parse::<ConversationStyle>()
                .map_err(|err| warn!("legacy chatbot: {err}, using friendly"))
                .ok()
        })
        .unwrap_or(ConversationStyle::Friendly);
    let color_theme = non_empty_str(object, "colorTheme")
        .and_then(|theme| {
            theme
                .parse::<ColorTheme>()
                .map_err(|err| warn!("legacy chatbot: {err}, using blue"))
                .ok()
        })
        .unwrap_or(ColorTheme::Blue);

    Some(ProfileInput {
        name: name.to_string(),
        personality: personality.to_string(),
        reference_materials: non_empty_str(object, "referenceMaterials").map(str::to_string),
        conversation_style,
        color_theme,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_input_requires_name_and_personality() {
        assert!(legacy_input(r#"{"name": "Max"}"#).is_none());
        assert!(legacy_input(r#"{"name": "", "personality": "A patient tutor"}"#).is_none());
        assert!(legacy_input(r#"{"name": 7, "personality": "A patient tutor"}"#).is_none());
        assert!(legacy_input(r#"["Max", "A patient tutor"]"#).is_none());
        assert!(legacy_input("not json").is_none());
    }

    #[test]
    fn legacy_input_defaults_unknown_choices() {
        let input = legacy_input(
            r#"{"name": "Max", "personality": "A patient tutor.", "conversationStyle": "grumpy", "colorTheme": "GREEN"}"#,
        )
        .expect("complete legacy chatbot");

        assert_eq!(input.conversation_style, ConversationStyle::Friendly);
        assert_eq!(input.color_theme, ColorTheme::Green);
        assert_eq!(input.reference_materials, None);
    }
}
