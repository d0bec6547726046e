//! Ticketing-system credential resolution.
//!
//! Credentials come from the environment when present and are asked for
//! interactively otherwise.

use crate::env::EnvConfig;
use crate::error::{CliError, Result};
use dialoguer::{Input, Password};
use serde::Serialize;
use std::fmt;
use std::io::IsTerminal;

/// Default Jira REST v2 endpoint
pub const DEFAULT_JIRA_API_URI: &str = "https://jira.shopware.com/rest/api/2/";

/// Jira API credentials
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct JiraCredentials {
    /// Base URI of the REST v2 API
    pub api_base_uri: String,
    /// Basic-auth user
    pub api_user: String,
    /// Basic-auth password or API token
    pub api_password: String,
}

impl fmt::Debug for JiraCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraCredentials")
            .field("api_base_uri", &self.api_base_uri)
            .field("api_user", &self.api_user)
            .field("api_password", &"********")
            .finish()
    }
}

/// Source of interactive answers for missing credentials
pub trait CredentialPrompt {
    /// Whether a user can answer prompts
    fn is_interactive(&self) -> bool;

    /// Ask for a visible value
    fn ask(&self, prompt: &str) -> Result<String>;

    /// Ask for a value without echoing it
    fn ask_hidden(&self, prompt: &str) -> Result<String>;
}

/// Prompts on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn ask(&self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| CliError::Prompt { reason: e.to_string() }.into())
    }

    fn ask_hidden(&self, prompt: &str) -> Result<String> {
        Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| CliError::Prompt { reason: e.to_string() }.into())
    }
}

/// Resolves credentials for external systems
pub struct CredentialResolver<'a> {
    env: &'a EnvConfig,
    prompt: &'a dyn CredentialPrompt,
}

impl<'a> CredentialResolver<'a> {
    /// Create a resolver reading from `env` and falling back to `prompt`
    pub fn new(env: &'a EnvConfig, prompt: &'a dyn CredentialPrompt) -> Self {
        Self { env, prompt }
    }

    /// Resolve Jira credentials.
    ///
    /// Blocks on the prompt when user or password are missing from the
    /// environment. Without a terminal the missing values stay empty.
    pub fn resolve_jira(&self) -> Result<JiraCredentials> {
        let api_base_uri = self.env.get_or("JIRA_API_V2_URL", DEFAULT_JIRA_API_URI);
        let api_user = self.value_or_ask("JIRA_API_USER", "Jira username", false)?;
        let api_password = self.value_or_ask("JIRA_API_PASSWORD", "Jira password", true)?;

        Ok(JiraCredentials {
            api_base_uri,
            api_user,
            api_password,
        })
    }

    fn value_or_ask(&self, env_var: &str, prompt: &str, hidden: bool) -> Result<String> {
        if let Some(value) = self.env.get(env_var) {
            return Ok(value);
        }

        if !self.prompt.is_interactive() {
            log::warn!("{env_var} is not set and no terminal is attached; using an empty value");
            return Ok(String::new());
        }

        if hidden {
            self.prompt.ask_hidden(prompt)
        } else {
            self.prompt.ask(prompt)
        }
    }
}
