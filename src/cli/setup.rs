//! Shared startup for `chat` and `say`: config, per-run overrides, the API
//! key and the HTTP transport.

use std::sync::Arc;

use tracing::debug;

use crate::core::chat_stream::{CompletionTransport, HttpTransport, ReasoningEffort};
use crate::core::config::Config;
use crate::core::credentials::{CredentialError, CredentialStore, KeySource};
use crate::core::session::{ChatSession, SessionSettings};

/// Command-line flags that override the config for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub model: Option<String>,
    pub json: bool,
    pub no_stream: bool,
    pub no_context: bool,
    pub system: Option<String>,
    pub effort: Option<ReasoningEffort>,
}

impl RunOverrides {
    pub fn apply(&self, settings: &mut SessionSettings) {
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if self.json {
            settings.json_mode = true;
        }
        if self.no_stream {
            settings.stream = false;
        }
        if self.no_context {
            settings.remember_context = false;
        }
        if let Some(system) = &self.system {
            settings.system_instruction = Some(system.clone());
        }
        if let Some(effort) = self.effort {
            settings.reasoning_effort = Some(effort);
        }
    }
}

pub struct Bootstrap {
    pub config: Config,
    pub session: ChatSession,
    pub transport: Arc<dyn CompletionTransport>,
    pub key_source: KeySource,
}

pub fn session_for(config: &Config, overrides: &RunOverrides) -> ChatSession {
    let mut settings = SessionSettings::from_config(config);
    overrides.apply(&mut settings);
    ChatSession::new(settings, config.model_catalog())
}

/// Load everything a chat needs. A missing API key is reported and ends the
/// process.
pub fn bootstrap(overrides: &RunOverrides) -> Result<Bootstrap, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let (api_key, key_source) = match CredentialStore::new().resolve() {
        Ok(found) => found,
        Err(CredentialError::Missing) => {
            eprintln!("❌ {}", CredentialError::Missing);
            eprintln!();
            eprintln!("💡 Quick fixes:");
            eprintln!("  • palaver auth");
            eprintln!("  • export OPENAI_API_KEY=sk-...");
            std::process::exit(1);
        }
        Err(err) => {
            if err.is_recoverable() {
                eprintln!("⚠️  {err}");
                eprintln!("   Unlock your keychain or set OPENAI_API_KEY, then try again.");
            } else {
                eprintln!("❌ {err}");
            }
            std::process::exit(1);
        }
    };
    debug!(source = %key_source, base_url = config.base_url(), "credentials resolved");

    let transport: Arc<dyn CompletionTransport> = Arc::new(HttpTransport::new(
        reqwest::Client::new(),
        config.base_url(),
        api_key,
    ));
    let session = session_for(&config, overrides);

    Ok(Bootstrap {
        config,
        session,
        transport,
        key_source,
    })
}
