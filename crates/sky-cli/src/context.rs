use std::io::{BufRead, Write};

use anyhow::Context;
use sky_client::SkyClient;
use sky_config::SkyConfig;

use crate::ui;

/// Loaded configuration plus the API client built from it.
pub struct AppContext {
    pub config: SkyConfig,
    pub client: SkyClient,
}

impl AppContext {
    /// Load configuration, build the client, and prompt for an API key when
    /// the deployment wants one and none is configured.
    pub fn init() -> anyhow::Result<Self> {
        let config = SkyConfig::load_with_dotenv().context("failed to load configuration")?;
        let api = config.require_api()?;
        let mut client = SkyClient::new(api).context("failed to build API client")?;

        if config.auth.needs_prompt(&api.api_key) {
            if ui::prefs().interactive {
                let key = prompt_api_key()?;
                if !key.is_empty() {
                    client.set_api_key(key);
                }
            } else {
                tracing::warn!("API key required but stdin is not a terminal; continuing without one");
            }
        }

        Ok(Self { config, client })
    }
}

fn prompt_api_key() -> anyhow::Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "API key: ")?;
    stderr.flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
