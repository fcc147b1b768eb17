//! Chatbot management commands

use std::error::Error;
use std::fs;

use chrono::{DateTime, Utc};

use crate::cli::{CreateArgs, EditArgs};
use crate::core::profile::{Profile, ProfileInput, ProfilePatch, ValidationIssue};
use crate::core::store::{MigrationOutcome, ProfileStore, StoreError};

fn format_time(stamp: &DateTime<Utc>) -> String {
    stamp.format("%Y-%m-%d %H:%M").to_string()
}

fn invalid(issues: &[ValidationIssue]) -> Box<dyn Error> {
    let details: Vec<String> = issues.iter().map(|issue| format!("  • {issue}")).collect();
    format!("Chatbot is not valid:\n{}", details.join("\n")).into()
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Render the `list` table.
pub fn render_list(bots: &[Profile]) -> String {
    if bots.is_empty() {
        return "No saved chatbots. Create one with `schoolmate create`.".to_string();
    }

    let id_width = bots.iter().map(|bot| bot.id.len()).max().unwrap_or(0).max(2);
    let name_width = bots
        .iter()
        .map(|bot| bot.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = format!(
        "{:<id_width$}  {:<name_width$}  {:<12}  {:<7}  UPDATED\n",
        "ID", "NAME", "STYLE", "THEME"
    );
    for bot in bots {
        out.push_str(&format!(
            "{:<id_width$}  {:<name_width$}  {:<12}  {:<7}  {}\n",
            bot.id,
            bot.name,
            bot.conversation_style.as_str(),
            bot.color_theme.as_str(),
            format_time(&bot.updated_at)
        ));
    }
    out
}

/// Render the `show` view.
pub fn render_profile(bot: &Profile) -> String {
    let mut out = format!("{} ({})\n", bot.name, bot.id);
    out.push_str(&format!(
        "  Style:       {} ({})\n",
        bot.conversation_style.label(),
        bot.conversation_style.description()
    ));
    out.push_str(&format!("  Theme:       {}\n", bot.color_theme.label()));
    out.push_str(&format!("  Created:     {}\n", format_time(&bot.created_at)));
    out.push_str(&format!("  Updated:     {}\n", format_time(&bot.updated_at)));
    out.push_str(&format!("\nPersonality:\n  {}\n", bot.personality));
    if let Some(materials) = &bot.reference_materials {
        out.push_str(&format!("\nReference materials:\n  {materials}\n"));
    }
    out.push_str(&format!("\nGreeting:\n  {}\n", bot.greeting()));
    out
}

pub fn list(store: &ProfileStore) {
    println!("{}", render_list(&store.list()).trim_end());
}

pub fn show(store: &ProfileStore, id: &str) -> Result<(), Box<dyn Error>> {
    let bot = store.get(id).ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
    print!("{}", render_profile(&bot));
    Ok(())
}

/// Build the input for `create`, reading the reference file when given.
pub fn create_input(args: &CreateArgs) -> Result<ProfileInput, Box<dyn Error>> {
    let reference = match (&args.reference, &args.reference_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(fs::read_to_string(path).map_err(|err| {
            format!("Failed to read reference file {}: {err}", path.display())
        })?),
        (None, None) => None,
    };

    Ok(ProfileInput {
        name: args.name.trim().to_string(),
        personality: args.personality.trim().to_string(),
        reference_materials: reference.and_then(non_blank),
        conversation_style: args.style,
        color_theme: args.theme,
    })
}

pub fn create(store: &ProfileStore, args: CreateArgs) -> Result<(), Box<dyn Error>> {
    let input = create_input(&args)?;
    let issues = input.validate();
    if !issues.is_empty() {
        return Err(invalid(&issues));
    }
    if !store.name_is_unique(&input.name, None) {
        return Err(format!(
            "A chatbot named '{}' already exists. Please choose a different name.",
            input.name
        )
        .into());
    }

    let id = store.create(input)?;
    println!("✅ Created chatbot: {id}");

    if args.launch {
        let bot = store
            .get(&id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
        store.stage_temp(&bot);
        println!("🚀 {} is ready. Start with: schoolmate say <message>", bot.name);
        println!("{}", bot.greeting());
    }
    Ok(())
}

/// Translate `edit` flags into a patch.
pub fn edit_patch(args: &EditArgs) -> ProfilePatch {
    let reference_materials = if args.clear_reference {
        Some(None)
    } else {
        args.reference.clone().map(non_blank)
    };

    ProfilePatch {
        name: args.name.as_deref().map(|name| name.trim().to_string()),
        personality: args
            .personality
            .as_deref()
            .map(|personality| personality.trim().to_string()),
        reference_materials,
        conversation_style: args.style,
        color_theme: args.theme,
    }
}

pub fn edit(store: &ProfileStore, args: EditArgs) -> Result<(), Box<dyn Error>> {
    let patch = edit_patch(&args);
    if patch.is_empty() {
        return Err("Nothing to change. Pass at least one field to edit.".into());
    }

    let existing = store.get(&args.id).ok_or_else(|| StoreError::NotFound {
        id: args.id.clone(),
    })?;
    let issues = patch.apply(existing.input()).validate();
    if !issues.is_empty() {
        return Err(invalid(&issues));
    }

    let updated = store.update(&args.id, &patch)?;
    println!("✅ Updated chatbot: {} ({})", updated.name, updated.id);
    Ok(())
}

pub fn delete(store: &ProfileStore, id: &str) -> Result<(), Box<dyn Error>> {
    if store.delete(id)? {
        println!("✅ Deleted chatbot: {id}");
        Ok(())
    } else {
        Err(StoreError::NotFound { id: id.to_string() }.into())
    }
}

pub fn stats(store: &ProfileStore) {
    let stats = store.stats();
    println!("Saved chatbots: {}", stats.total_bots);
    println!("Storage used:   {} bytes", stats.storage_size);
    if let Some(oldest) = stats.oldest_created {
        println!("Oldest:         {}", format_time(&oldest));
    }
    if let Some(newest) = stats.newest_created {
        println!("Newest:         {}", format_time(&newest));
    }
}

/// Describe a migration outcome. Implicit runs only mention migrations that
/// actually happened.
pub fn migration_message(outcome: &MigrationOutcome, explicit: bool) -> Option<String> {
    match outcome {
        MigrationOutcome::Migrated { id } => {
            Some(format!("✅ Saved chatbot from an earlier session: {id}"))
        }
        _ if !explicit => None,
        MigrationOutcome::Staged { id } => Some(format!("Chatbot {id} is staged for the next say")),
        MigrationOutcome::AlreadyPresent { name } => Some(format!(
            "Chatbot '{name}' from an earlier session is already saved"
        )),
        MigrationOutcome::NothingToMigrate => Some("Nothing to migrate".to_string()),
        MigrationOutcome::Incomplete => {
            Some("⚠️  Earlier session data is incomplete and was left in place".to_string())
        }
        MigrationOutcome::Failed => {
            Some("❌ Could not save the chatbot from an earlier session".to_string())
        }
    }
}

pub fn report_migration(outcome: &MigrationOutcome, explicit: bool) {
    if let Some(message) = migration_message(outcome, explicit) {
        if explicit {
            println!("{message}");
        } else {
            eprintln!("{message}");
        }
    }
}
