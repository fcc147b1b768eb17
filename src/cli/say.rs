//! TUI-less "say" command, plus the other commands that talk to the service

use std::error::Error;

use crate::api::{reply_or_fallback, ChatClient, HistoryEntry};
use crate::core::config::Config;
use crate::core::profile::Profile;
use crate::core::session::{display_id, session_id};
use crate::core::store::{ProfileStore, StoreError};

/// Pick the chatbot for `say`: the named one, else the staged one (which is
/// consumed). A staged chatbot is read back from the store so later edits
/// apply; the staged copy is only used when it is no longer saved.
pub fn resolve_bot(store: &ProfileStore, bot: Option<&str>) -> Result<Profile, Box<dyn Error>> {
    match bot {
        Some(id) => Ok(store
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?),
        None => {
            let staged = store.take_temp().ok_or(
                "No chatbot selected. Pass --bot <id>, or create one with --launch.",
            )?;
            Ok(store.get(&staged.id).unwrap_or(staged))
        }
    }
}

pub async fn run_say(
    store: &ProfileStore,
    config: &Config,
    bot: Option<String>,
    message: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let message = message.join(" ");
    if message.trim().is_empty() {
        return Err("Usage: schoolmate say [--bot <id>] <message>".into());
    }

    let profile = resolve_bot(store, bot.as_deref())?;
    let student_id = session_id(store.session());
    let client = ChatClient::new(config.api_base_url(), config.request_timeout())?;

    // The chat opens with the greeting, so the service sees it as history.
    let history = [HistoryEntry::assistant(profile.greeting())];
    let result = client
        .send_custom(&profile, &student_id, &message, &history)
        .await;

    println!(
        "{}",
        reply_or_fallback(result, profile.conversation_style)
    );
    Ok(())
}

pub async fn run_health(config: &Config) -> Result<(), Box<dyn Error>> {
    let client = ChatClient::new(config.api_base_url(), config.request_timeout())?;
    let health = client.health().await?;

    println!("✅ Chat service at {} is {}", client.base_url(), health.status);
    if let Some(model) = health.model {
        println!("  model: {model}");
    }
    Ok(())
}

pub fn print_session(store: &ProfileStore) {
    let id = session_id(store.session());
    println!("Session: {}", display_id(&id));
    println!("  id: {id}");
}
