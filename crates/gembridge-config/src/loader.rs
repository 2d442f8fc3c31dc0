use std::path::Path;

use anyhow::Context;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// resolved, the TOML is invalid, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config = Self::from_toml(&raw)?;
        tracing::debug!(path = %path.display(), model = %config.gemini.model, "configuration loaded");

        Ok(config)
    }

    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).context("config variable expansion failed")?;
        let config: Self = toml::from_str(&expanded).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is set or a numeric setting is
    /// out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_credentials()?;
        self.validate_generation()?;
        self.validate_pricing()?;
        Ok(())
    }

    fn validate_credentials(&self) -> anyhow::Result<()> {
        if self.gemini.api_key().is_none() && self.gemini.access_token().is_none() {
            anyhow::bail!("gemini.api_key or gemini.access_token must be set");
        }
        Ok(())
    }

    fn validate_generation(&self) -> anyhow::Result<()> {
        if let Some(temperature) = self.gemini.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            anyhow::bail!("gemini.temperature must be between 0.0 and 2.0, got {temperature}");
        }

        if self.gemini.model.trim().is_empty() {
            anyhow::bail!("gemini.model must not be empty");
        }

        Ok(())
    }

    fn validate_pricing(&self) -> anyhow::Result<()> {
        let Some(pricing) = self.gemini.pricing else {
            return Ok(());
        };

        for (name, rate) in [
            ("input_per_mtok", pricing.input_per_mtok),
            ("output_per_mtok", pricing.output_per_mtok),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                anyhow::bail!("gemini.pricing.{name} must be a non-negative number, got {rate}");
            }
        }

        Ok(())
    }
}
