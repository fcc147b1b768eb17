//! Shared constants used across the application

/// Key of the root record in the durable substrate.
pub const STORAGE_KEY: &str = "savedChatbots";

/// Schema version written into every root record. Records carrying any other
/// version are treated as unreadable.
pub const STORAGE_VERSION: &str = "1.0";

/// Single slot in the session substrate holding a temporary chatbot, and the
/// source of the one-time legacy migration.
pub const SESSION_TEMP_KEY: &str = "customChatbot";

/// Session substrate key for the anonymous student session id.
pub const SESSION_ID_KEY: &str = "schoolmate_session_id";

/// Prefix of every generated profile id.
pub const PROFILE_ID_PREFIX: &str = "bot";

pub const NAME_MAX_CHARS: usize = 50;
pub const PERSONALITY_MIN_CHARS: usize = 10;
pub const PERSONALITY_MAX_CHARS: usize = 1000;
pub const REFERENCE_MAX_CHARS: usize = 5000;
