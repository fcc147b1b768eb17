use super::*;
use crate::cli::bots::{create_input, edit_patch, migration_message, render_list, render_profile};
use crate::cli::say::resolve_bot;
use crate::core::profile::ProfileInput;
use crate::core::store::MigrationOutcome;
use crate::core::substrate::MemoryStore;
use std::fs;
use tempfile::TempDir;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }

    pub(super) fn parse_create(argv: &[&str]) -> CreateArgs {
        match parse_args(argv).command {
            Commands::Create(create) => create,
            other => panic!("expected create subcommand for argv={argv:?}, got {other:?}"),
        }
    }

    pub(super) fn parse_edit(argv: &[&str]) -> EditArgs {
        match parse_args(argv).command {
            Commands::Edit(edit) => edit,
            other => panic!("expected edit subcommand for argv={argv:?}, got {other:?}"),
        }
    }

    pub(super) fn memory_store() -> ProfileStore {
        ProfileStore::new(MemoryStore::new(), MemoryStore::new())
    }
}

use test_helpers::{memory_store, parse_args, parse_create, parse_edit};

#[test]
fn test_global_flags_parse_anywhere() {
    let argv = ["schoolmate", "list", "-vv", "--config", "/tmp/schoolmate.toml"];
    let args = parse_args(&argv);

    assert!(matches!(args.command, Commands::List));
    assert_eq!(args.verbose, 2);
    assert_eq!(
        args.config.as_deref(),
        Some(std::path::Path::new("/tmp/schoolmate.toml"))
    );
}

#[test]
fn test_subcommand_is_required() {
    assert!(Args::try_parse_from(["schoolmate"]).is_err());
}

#[test]
fn test_create_defaults_and_choices() {
    let create = parse_create(&[
        "schoolmate",
        "create",
        "--name",
        "Max",
        "--personality",
        "A patient algebra tutor.",
    ]);
    assert_eq!(create.style, ConversationStyle::Friendly);
    assert_eq!(create.theme, ColorTheme::Blue);
    assert!(!create.launch);

    let create = parse_create(&[
        "schoolmate",
        "create",
        "-n",
        "Max",
        "-p",
        "A patient algebra tutor.",
        "--style",
        "Academic",
        "--theme",
        "teal",
        "--launch",
    ]);
    assert_eq!(create.style, ConversationStyle::Academic);
    assert_eq!(create.theme, ColorTheme::Teal);
    assert!(create.launch);
}

#[test]
fn test_create_rejects_unknown_style_and_conflicting_reference() {
    let unknown = Args::try_parse_from([
        "schoolmate", "create", "-n", "Max", "-p", "A patient tutor.", "--style", "grumpy",
    ]);
    assert!(unknown.is_err());

    let conflicting = Args::try_parse_from([
        "schoolmate",
        "create",
        "-n",
        "Max",
        "-p",
        "A patient tutor.",
        "--reference",
        "notes",
        "--reference-file",
        "notes.txt",
    ]);
    assert!(conflicting.is_err());
}

#[test]
fn test_edit_clear_reference_conflicts_with_reference() {
    let result = Args::try_parse_from([
        "schoolmate",
        "edit",
        "bot_1_abc",
        "--reference",
        "new notes",
        "--clear-reference",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_say_collects_message_words() {
    let args = parse_args(&["schoolmate", "say", "--bot", "bot_1_abc", "what", "is", "-1", "squared?"]);
    match args.command {
        Commands::Say { bot, message } => {
            assert_eq!(bot.as_deref(), Some("bot_1_abc"));
            assert_eq!(message.join(" "), "what is -1 squared?");
        }
        other => panic!("expected say subcommand, got {other:?}"),
    }
}

#[test]
fn test_config_subcommands() {
    let args = parse_args(&["schoolmate", "config"]);
    assert!(matches!(args.command, Commands::Config { command: None }));

    let args = parse_args(&["schoolmate", "config", "set", "api-base-url", "http://10.0.0.2:5000"]);
    match args.command {
        Commands::Config {
            command: Some(ConfigCommands::Set { key, value }),
        } => {
            assert_eq!(key, "api-base-url");
            assert_eq!(value, "http://10.0.0.2:5000");
        }
        other => panic!("expected config set, got {other:?}"),
    }
}

#[test]
fn test_create_input_reads_reference_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("notes.txt");
    fs::write(&path, "Photosynthesis turns light into sugar.").unwrap();

    let create = parse_create(&[
        "schoolmate",
        "create",
        "-n",
        "  Sunny  ",
        "-p",
        "A cheerful biology tutor.",
        "--reference-file",
        path.to_str().unwrap(),
    ]);
    let input = create_input(&create).expect("input should build");

    assert_eq!(input.name, "Sunny");
    assert_eq!(
        input.reference_materials.as_deref(),
        Some("Photosynthesis turns light into sugar.")
    );
}

#[test]
fn test_create_input_drops_blank_reference() {
    let create = parse_create(&[
        "schoolmate", "create", "-n", "Max", "-p", "A patient tutor.", "-r", "   ",
    ]);
    assert_eq!(create_input(&create).unwrap().reference_materials, None);
}

#[test]
fn test_edit_patch_maps_flags() {
    let edit = parse_edit(&["schoolmate", "edit", "bot_1_abc", "--clear-reference", "-t", "pink"]);
    let patch = edit_patch(&edit);
    assert_eq!(patch.reference_materials, Some(None));
    assert_eq!(patch.color_theme, Some(ColorTheme::Pink));
    assert_eq!(patch.name, None);

    let edit = parse_edit(&["schoolmate", "edit", "bot_1_abc"]);
    assert!(edit_patch(&edit).is_empty());
}

#[test]
fn test_create_command_validates_and_enforces_unique_names() {
    let store = memory_store();

    let too_short = parse_create(&["schoolmate", "create", "-n", "Max", "-p", "short"]);
    let err = bots::create(&store, too_short).unwrap_err();
    assert!(err.to_string().contains("at least 10 characters"));
    assert!(store.list().is_empty());

    let ok = parse_create(&["schoolmate", "create", "-n", "Max", "-p", "A patient tutor."]);
    bots::create(&store, ok).expect("valid create");
    assert_eq!(store.list().len(), 1);

    let dup = parse_create(&["schoolmate", "create", "-n", "MAX", "-p", "Another patient tutor."]);
    let err = bots::create(&store, dup).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(store.list().len(), 1);
}

#[test]
fn test_launch_stages_bot_for_say() {
    let store = memory_store();
    let create = parse_create(&[
        "schoolmate", "create", "-n", "Max", "-p", "A patient tutor.", "--launch",
    ]);
    bots::create(&store, create).unwrap();

    // Startup migration must not swallow the staged bot.
    assert!(matches!(
        store.migrate_legacy(),
        MigrationOutcome::Staged { .. }
    ));
    let bot = resolve_bot(&store, None).expect("staged bot");
    assert_eq!(bot.name, "Max");
    assert!(resolve_bot(&store, None).is_err());
    assert_eq!(resolve_bot(&store, Some(&bot.id)).unwrap().id, bot.id);
}

#[test]
fn test_say_uses_edits_made_after_launch() {
    let store = memory_store();
    let create = parse_create(&[
        "schoolmate", "create", "-n", "Max", "-p", "A patient tutor.", "--launch",
    ]);
    bots::create(&store, create).unwrap();
    let id = store.list()[0].id.clone();

    let edit = parse_edit(&[
        "schoolmate", "edit", id.as_str(), "-n", "Maxine", "-s", "academic",
    ]);
    bots::edit(&store, edit).unwrap();

    let bot = resolve_bot(&store, None).expect("staged bot");
    assert_eq!(bot.id, id);
    assert_eq!(bot.name, "Maxine");
    assert_eq!(bot.conversation_style, ConversationStyle::Academic);
}

#[test]
fn test_launch_then_delete_does_not_bring_bot_back() {
    let store = memory_store();
    let create = parse_create(&[
        "schoolmate", "create", "-n", "Max", "-p", "A patient tutor.", "--launch",
    ]);
    bots::create(&store, create).unwrap();
    let id = store.list()[0].id.clone();

    bots::delete(&store, &id).unwrap();
    store.migrate_legacy();

    assert!(store.list().is_empty());
    assert!(resolve_bot(&store, None).is_err());
}

#[test]
fn test_edit_command_rejects_invalid_merge() {
    let store = memory_store();
    let id = store
        .create(ProfileInput::new("Max", "A patient tutor."))
        .unwrap();

    let edit = parse_edit(&["schoolmate", "edit", id.as_str(), "-p", "tiny"]);
    assert!(bots::edit(&store, edit).is_err());
    assert_eq!(store.get(&id).unwrap().personality, "A patient tutor.");

    let edit = parse_edit(&["schoolmate", "edit", id.as_str(), "-s", "casual"]);
    bots::edit(&store, edit).unwrap();
    assert_eq!(
        store.get(&id).unwrap().conversation_style,
        ConversationStyle::Casual
    );
}

#[test]
fn test_delete_of_unknown_bot_is_an_error() {
    let store = memory_store();
    let err = bots::delete(&store, "bot_missing").unwrap_err();
    assert_eq!(err.to_string(), "Chatbot 'bot_missing' not found");
}

#[test]
fn test_render_list_and_profile() {
    let store = memory_store();
    assert!(render_list(&[]).starts_with("No saved chatbots"));

    let id = store
        .create(
            ProfileInput::new("Max", "A patient tutor. Loves fractions.")
                .with_style(ConversationStyle::Professional)
                .with_reference_materials("Unit 4"),
        )
        .unwrap();
    let bots = store.list();

    let table = render_list(&bots);
    let mut lines = table.lines();
    assert!(lines.next().unwrap().starts_with("ID"));
    let row = lines.next().unwrap();
    assert!(row.starts_with(&id));
    assert!(row.contains("professional"));
    assert!(row.contains("blue"));

    let view = render_profile(&bots[0]);
    assert!(view.contains("Professional (Clear, direct, and informative)"));
    assert!(view.contains("Ocean Blue"));
    assert!(view.contains("Unit 4"));
    assert!(view.contains("A patient tutor. What would you like to explore today?"));
}

#[test]
fn test_migration_messages() {
    let migrated = MigrationOutcome::Migrated {
        id: "bot_1_abc".to_string(),
    };
    assert!(migration_message(&migrated, false).unwrap().contains("bot_1_abc"));
    assert_eq!(
        migration_message(&MigrationOutcome::NothingToMigrate, false),
        None
    );
    assert_eq!(
        migration_message(&MigrationOutcome::NothingToMigrate, true).as_deref(),
        Some("Nothing to migrate")
    );
}

#[test]
fn test_open_store_uses_configured_directories() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = Config {
        data_dir: Some(temp_dir.path().join("local")),
        session_dir: Some(temp_dir.path().join("session")),
        ..Default::default()
    };

    let store = open_store(&config).expect("store should open");
    store
        .create(ProfileInput::new("Max", "A patient tutor."))
        .unwrap();
    crate::core::session::session_id(store.session());

    assert!(temp_dir.path().join("local").join("savedChatbots.json").exists());
    assert!(temp_dir
        .path()
        .join("session")
        .join("schoolmate_session_id.json")
        .exists());
}
