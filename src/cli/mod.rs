//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod auth;
pub mod chat;
pub mod model_list;
pub mod say;
pub mod settings;
pub mod setup;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::auth::{run_auth, run_deauth};
use crate::cli::chat::run_chat;
use crate::cli::model_list::list_models;
use crate::cli::say::run_say;
use crate::cli::settings::{SetContext, SettingError, SettingRegistry};
use crate::cli::setup::RunOverrides;
use crate::core::chat_stream::ReasoningEffort;
use crate::core::config::Config;
use crate::core::credentials::CredentialStore;
use crate::utils::logging;

#[derive(Parser)]
#[command(name = "palaver")]
#[command(version)]
#[command(about = "A terminal chat client for the OpenAI Responses API")]
#[command(
    long_about = "palaver is a line-oriented terminal chat client. Replies stream in as they \
are generated and are formatted as they grow: fenced code blocks are highlighted, **bold** \
text is emphasized and \\[ ... \\] display math is typeset.\n\n\
Authentication:\n\
  Use 'palaver auth' to store an API key in your system keyring.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    Your OpenAI API key (takes precedence over the keyring)\n\
  PALAVER_LOG       Log filter, e.g. 'palaver=debug' (default: warn)\n\n\
Controls:\n\
  Enter             Send the message\n\
  Ctrl+C            Cancel the reply that is streaming, or quit at the prompt\n\
  Ctrl+D            Quit\n\n\
Commands:\n\
  /help             Show all chat commands"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this run
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Ask for JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Wait for the whole reply instead of streaming it
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Send each message without the earlier turns
    #[arg(long, global = true)]
    pub no_context: bool,

    /// System instruction for this run
    #[arg(short = 's', long, global = true, value_name = "TEXT")]
    pub system: Option<String>,

    /// Reasoning effort for models that support it (low, medium, high)
    #[arg(short = 'e', long, global = true, value_name = "EFFORT")]
    pub effort: Option<ReasoningEffort>,

    /// Write logs to this file instead of stderr
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> RunOverrides {
        RunOverrides {
            model: self.model.clone(),
            json: self.json,
            no_stream: self.no_stream,
            no_context: self.no_context,
            system: self.system.clone(),
            effort: self.effort,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store an API key in the system keyring
    Auth,
    /// Remove the stored API key
    Deauth,
    /// Start the interactive chat (default)
    Chat,
    /// Send one prompt and print the reply
    Say {
        /// Image to attach (repeatable)
        #[arg(short = 'i', long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,
        /// The prompt; multiple words are joined with spaces
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// List known models with their prices
    Models,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Err(err) = logging::init(args.log_file.as_deref()) {
        eprintln!("⚠️  Logging disabled: {err}");
    }
    let overrides = args.overrides();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Auth => {
            if let Err(e) = run_auth(&CredentialStore::new()) {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth => {
            if let Err(e) = run_deauth(&CredentialStore::new()) {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Chat => run_chat(overrides).await,
        Commands::Say { images, prompt } => run_say(prompt, images, overrides).await,
        Commands::Models => list_models(),
        Commands::Set { key, value } => {
            run_setting(|registry, ctx| registry.set(&key, &value, ctx));
            Ok(())
        }
        Commands::Unset { key } => {
            run_setting(|registry, ctx| registry.unset(&key, ctx));
            Ok(())
        }
        Commands::Config => {
            let config_path = Config::get_config_path()?;
            let config = Config::load_from_path(&config_path)?;
            for line in SettingRegistry::new().describe(&config, &config_path) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

/// Run one set/unset against the user's config file, printing the outcome
/// and exiting non-zero on failure.
fn run_setting<F>(action: F)
where
    F: FnOnce(&SettingRegistry, &SetContext<'_>) -> Result<String, SettingError>,
{
    let outcome = Config::get_config_path()
        .map_err(|e| SettingError::ConfigError(e.to_string()))
        .and_then(|config_path| {
            let config = Config::load_from_path(&config_path)
                .map_err(|e| SettingError::ConfigError(e.to_string()))?;
            let ctx = SetContext {
                config: &config,
                config_path: &config_path,
            };
            action(&SettingRegistry::new(), &ctx)
        });

    match outcome {
        Ok(message) => println!("{message}"),
        Err(err) => {
            err.print();
            std::process::exit(err.exit_code());
        }
    }
}
