//! Profile id generation: `bot_<unix millis>_<9 base-36 chars>`.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::core::constants::PROFILE_ID_PREFIX;

const SUFFIX_LEN: usize = 9;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

pub(super) fn generate(now: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}",
        PROFILE_ID_PREFIX,
        now.timestamp_millis(),
        random_suffix()
    )
}

fn random_suffix() -> String {
    let mut bytes = [0u8; 8];
    let mut value = match getrandom::fill(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes),
        Err(err) => {
            // Still unique within this process; the store re-rolls on collision.
            warn!("system randomness unavailable for chatbot id: {err}");
            let nanos = Utc::now().timestamp_subsec_nanos() as u64;
            nanos ^ FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed).rotate_left(32)
        }
    };

    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        suffix.push(ALPHABET[(value % 36) as usize] as char);
        value /= 36;
    }
    suffix
}
