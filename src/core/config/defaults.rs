use crate::core::config::data::{Config, ResolvedSettings, SettingsOverrides};

/// Backend used when nothing else names one.
pub const DEFAULT_ENDPOINT: &str = "https://llama-chatbot-backend.onrender.com/chat";

/// Environment variable consulted between the command line and the config file.
pub const ENDPOINT_ENV_VAR: &str = "LLAMABOT_ENDPOINT";

impl Config {
    /// Merge this config with command-line overrides and the environment.
    ///
    /// Endpoint precedence is flag, then `LLAMABOT_ENDPOINT`, then the config
    /// file, then [`DEFAULT_ENDPOINT`].
    pub fn resolve(&self, overrides: &SettingsOverrides) -> ResolvedSettings {
        let env_endpoint = std::env::var(ENDPOINT_ENV_VAR).ok();
        self.resolve_with_env(overrides, env_endpoint.as_deref())
    }

    pub(crate) fn resolve_with_env(
        &self,
        overrides: &SettingsOverrides,
        env_endpoint: Option<&str>,
    ) -> ResolvedSettings {
        let non_blank = |value: &&str| !value.trim().is_empty();

        let endpoint = overrides
            .endpoint
            .as_deref()
            .filter(non_blank)
            .or(env_endpoint.filter(non_blank))
            .or(self.endpoint.as_deref().filter(non_blank))
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim()
            .to_string();

        let wire_format = overrides
            .wire_format
            .or(self.wire_format)
            .unwrap_or_default();

        let markdown = !overrides.no_markdown && self.markdown.unwrap_or(true);

        ResolvedSettings {
            endpoint,
            wire_format,
            markdown,
        }
    }
}
