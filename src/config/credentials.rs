//! Cleanup service credentials, read from the environment

use std::env;
use std::fmt;

/// Environment variable holding the cleanup service API key
pub const API_KEY_VAR: &str = "CODEGPT_API_KEY";

/// Environment variable holding the agent the text is routed to
pub const AGENT_ID_VAR: &str = "CODEGPT_AGENT_ID";

/// Older name for [`AGENT_ID_VAR`], still honored
pub const LEGACY_AGENT_ID_VAR: &str = "AGENT_ID";

/// Credentials for the content cleanup service
#[derive(Clone, PartialEq, Eq)]
pub struct TransformCredentials {
    pub api_key: String,
    pub agent_id: Option<String>,
}

impl TransformCredentials {
    /// Reads credentials from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Returns `None` when no API key is configured.
    pub fn from_env() -> Option<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads credentials through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR)?;
        let agent_id = non_empty(AGENT_ID_VAR).or_else(|| non_empty(LEGACY_AGENT_ID_VAR));

        Some(Self { api_key, agent_id })
    }
}

// Keeps the key out of logs
impl fmt::Debug for TransformCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformCredentials")
            .field("api_key", &"<redacted>")
            .field("agent_id", &self.agent_id)
            .finish()
    }
}
