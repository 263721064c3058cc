//! API-key prompting behaviour.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Ask for an API key interactively when none is configured.
    ///
    /// Deployments that sit behind the keyed research endpoints turn this
    /// on; open deployments leave it off and send no key.
    #[serde(default)]
    pub prompt_for_key: bool,
}

impl AuthConfig {
    /// Whether the caller should prompt, given the key currently configured.
    #[must_use]
    pub const fn needs_prompt(&self, api_key: &str) -> bool {
        self.prompt_for_key && api_key.is_empty()
    }
}
