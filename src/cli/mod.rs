//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod bots;
pub mod say;

#[cfg(test)]
mod tests;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::core::config::Config;
use crate::core::profile::{ColorTheme, ConversationStyle};
use crate::core::store::ProfileStore;
use crate::core::substrate::FileStore;
use crate::utils::logging;

#[derive(Parser)]
#[command(name = "schoolmate")]
#[command(version)]
#[command(about = "Manage custom tutoring chatbots and talk to them from the terminal")]
#[command(
    long_about = "Schoolmate keeps your custom tutoring chatbots on this machine and sends \
messages to the Schoolmate chat service on their behalf.\n\n\
Each chatbot has a name, a personality, optional reference materials, a conversation \
style and a colour theme. Names are unique, ignoring case.\n\n\
Environment Variables:\n\
  RUST_LOG          Log filter (overrides -v), e.g. RUST_LOG=schoolmate=debug"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Use this configuration file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log more (-v for info, -vv for debug)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List saved chatbots
    List,
    /// Show one chatbot in full
    Show {
        /// Chatbot id
        id: String,
    },
    /// Create a chatbot
    Create(CreateArgs),
    /// Change fields of a chatbot
    Edit(EditArgs),
    /// Delete a chatbot
    Delete {
        /// Chatbot id
        id: String,
    },
    /// Show storage statistics
    Stats,
    /// Move a chatbot left by an older version into saved chatbots
    Migrate,
    /// Send one message to a chatbot and print the reply
    Say {
        /// Chatbot id (defaults to the chatbot staged with `create --launch`)
        #[arg(short = 'b', long, value_name = "ID")]
        bot: Option<String>,
        /// Message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
    /// Print the anonymous session id sent with chat messages
    Session,
    /// Check that the chat service is running
    Health,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Chatbot name (unique, at most 50 characters)
    #[arg(short = 'n', long)]
    pub name: String,
    /// Personality and role description (10 to 1000 characters)
    #[arg(short = 'p', long)]
    pub personality: String,
    /// Reference material the chatbot should draw on
    #[arg(short = 'r', long, conflicts_with = "reference_file")]
    pub reference: Option<String>,
    /// Read reference material from a file
    #[arg(long, value_name = "PATH")]
    pub reference_file: Option<PathBuf>,
    #[arg(short = 's', long, default_value_t = ConversationStyle::Friendly)]
    pub style: ConversationStyle,
    #[arg(short = 't', long, default_value_t = ColorTheme::Blue)]
    pub theme: ColorTheme,
    /// Also make it the chatbot used by the next `say`
    #[arg(long)]
    pub launch: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Chatbot id
    pub id: String,
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    #[arg(short = 'p', long)]
    pub personality: Option<String>,
    #[arg(short = 'r', long, conflicts_with = "clear_reference")]
    pub reference: Option<String>,
    /// Remove the reference material
    #[arg(long)]
    pub clear_reference: bool,
    #[arg(short = 's', long)]
    pub style: Option<ConversationStyle>,
    #[arg(short = 't', long)]
    pub theme: Option<ColorTheme>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        value: String,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let config_path = match args.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load_from_path(&config_path)?;
    debug!(path = %config_path.display(), "loaded configuration");

    match args.command {
        Commands::Config { command } => run_config(config, &config_path, command),
        Commands::Health => say::run_health(&config).await,
        command => {
            let store = open_store(&config)?;
            if !matches!(command, Commands::Migrate) {
                bots::report_migration(&store.migrate_legacy(), false);
            }
            run_store_command(&store, &config, command).await
        }
    }
}

async fn run_store_command(
    store: &ProfileStore,
    config: &Config,
    command: Commands,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::List => {
            bots::list(store);
            Ok(())
        }
        Commands::Show { id } => bots::show(store, &id),
        Commands::Create(create) => bots::create(store, create),
        Commands::Edit(edit) => bots::edit(store, edit),
        Commands::Delete { id } => bots::delete(store, &id),
        Commands::Stats => {
            bots::stats(store);
            Ok(())
        }
        Commands::Migrate => {
            bots::report_migration(&store.migrate_legacy(), true);
            Ok(())
        }
        Commands::Say { bot, message } => say::run_say(store, config, bot, message).await,
        Commands::Session => {
            say::print_session(store);
            Ok(())
        }
        Commands::Health | Commands::Config { .. } => Ok(()),
    }
}

/// Open the profile store over the configured data and session directories.
pub fn open_store(config: &Config) -> Result<ProfileStore, Box<dyn Error>> {
    let local = FileStore::new(config.data_dir()?).with_quota(config.storage_quota_bytes());
    let session = FileStore::new(config.session_dir()?);
    debug!(
        data_dir = %local.dir().display(),
        session_dir = %session.dir().display(),
        "opening chatbot store"
    );
    Ok(ProfileStore::new(local, session))
}

fn run_config(
    mut config: Config,
    config_path: &Path,
    command: Option<ConfigCommands>,
) -> Result<(), Box<dyn Error>> {
    match command {
        None => config.print_all(config_path),
        Some(ConfigCommands::Set { key, value }) => {
            config.set_value(&key, &value)?;
            config.save_to_path(config_path)?;
            println!("✅ Set {key} to: {value}");
        }
        Some(ConfigCommands::Unset { key }) => {
            config.unset_value(&key)?;
            config.save_to_path(config_path)?;
            println!("✅ Unset {key}");
        }
    }
    Ok(())
}
