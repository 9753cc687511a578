//! Shell context, dispatch, and CLI error types.

use std::path::PathBuf;
use std::sync::Arc;

use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;
use tokio::runtime::Runtime;

use crate::cli::commands::{self, CommandEntry};
use crate::cli::output::{self, ConsoleNotifier};
use crate::config::{ConfigManager, WizardConfig};
use crate::core::service::ListingService;
use crate::core::session::{SessionMode, WizardSession};
use crate::errors::{ConfigError, RemoteError, ValidationError, WizardError};
use crate::storage::{InMemoryListingService, JsonListingStore};

/// Overrides the application directory (config and stored listings).
pub const HOME_ENV: &str = "LISTING_WIZARD_HOME";
/// Any value switches the shell to line-by-line script mode.
pub const SCRIPT_ENV: &str = "LISTING_WIZARD_SCRIPT";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ValidationError> for CommandError {
    fn from(err: ValidationError) -> Self {
        CommandError::Wizard(err.into())
    }
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Where submitted listings go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Json(PathBuf),
    Memory,
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub mode: CliMode,
    pub base_dir: PathBuf,
    pub backend: Backend,
}

impl CliOptions {
    /// Reads the mode and directories from the environment and `args`.
    /// `--memory` keeps listings in process memory.
    pub fn from_env(args: &[String]) -> Self {
        let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
            CliMode::Script
        } else {
            CliMode::Interactive
        };
        let base_dir = std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(ConfigManager::default_location);
        let backend = if args.iter().any(|arg| arg == "--memory") {
            Backend::Memory
        } else {
            Backend::Json(base_dir.clone())
        };
        Self {
            mode,
            base_dir,
            backend,
        }
    }
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) backend: Backend,
    pub(crate) config: WizardConfig,
    pub(crate) session: WizardSession,
    pub(crate) service: Arc<dyn ListingService>,
    pub(crate) runtime: Runtime,
    pub(crate) registry: Vec<CommandEntry>,
    pub(crate) last_command: Option<String>,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(options: &CliOptions) -> Result<Self, CliError> {
        let config = ConfigManager::with_base_dir(options.base_dir.clone())?.load()?;
        let service: Arc<dyn ListingService> = match &options.backend {
            Backend::Json(base) => Arc::new(JsonListingStore::in_base_dir(base)?),
            Backend::Memory => Arc::new(InMemoryListingService::new()),
        };
        let runtime = tokio::runtime::Builder::new_current_thread().build()?;
        if options.mode == CliMode::Script {
            colored::control::set_override(false);
        }
        tracing::info!(mode = ?options.mode, backend = ?options.backend, "shell started");

        Ok(Self {
            mode: options.mode,
            backend: options.backend.clone(),
            session: Self::fresh_session(&config),
            config,
            service,
            runtime,
            registry: commands::registry(),
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn fresh_session(config: &WizardConfig) -> WizardSession {
        WizardSession::new(config.clone()).with_notifier(Arc::new(ConsoleNotifier))
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.iter().map(|entry| entry.name).collect()
    }

    pub(crate) fn prompt(&self) -> String {
        let step = self.session.current_step();
        let mode = match self.session.mode() {
            SessionMode::Create => "new".to_string(),
            SessionMode::Edit(id) => format!("edit {}", short_id(&id.to_string())),
        };
        if self.session.sequencer().is_submitted() {
            return format!("wizard [{mode}, submitted]> ");
        }
        format!("wizard [{mode} {}/9 {}]> ", step.id(), step.label())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let handler = self
            .registry
            .iter()
            .find(|entry| {
                entry.name == command || entry.aliases.iter().any(|alias| *alias == command)
            })
            .map(|entry| entry.handler);
        match handler {
            Some(handler) => match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            },
            None => {
                self.suggest_command(raw);
                Ok(LoopControl::Continue)
            }
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let needle = input.to_ascii_lowercase();
        let best = self
            .registry
            .iter()
            .map(|entry| (levenshtein(entry.name, &needle), entry.name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            // Session failures have already been shown through the notifier.
            CommandError::Wizard(err) => {
                tracing::debug!(error = %err, command = ?self.last_command, "command failed");
                Ok(())
            }
        }
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
