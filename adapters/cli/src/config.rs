use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tower_gym_http::HttpConfig;
use tower_gym_world::{EnvConfig, MapLayout};

/// Contents of the optional TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// `[server]` table.
    pub(crate) server: HttpConfig,
    /// `[env]` table.
    pub(crate) env: EnvConfig,
    /// `[[maps]]` entries rotated across resets.
    pub(crate) maps: Vec<MapLayout>,
}

impl CliConfig {
    /// Loads the file at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid configuration toml")
    }

    /// Environment configuration with the top-level maps appended.
    pub(crate) fn env_config(&self) -> EnvConfig {
        let mut env = self.env.clone();
        env.maps.extend(self.maps.iter().cloned());
        env
    }
}

#[cfg(test)]
mod tests {
    use super::CliConfig;
    use tower_gym_core::Position;
    use tower_gym_http::DEFAULT_BASE_URL;
    use tower_gym_world::RenderMode;

    #[test]
    fn empty_file_yields_defaults() {
        let config = CliConfig::parse("").expect("parses");
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn full_file_is_understood() {
        let config = CliConfig::parse(
            r#"
            [server]
            base_url = "http://game:4000/"
            timeout_ms = 2500

            [env]
            capacity_model = "conservative"
            render_mode = "disabled"
            seed = 17

            [env.encoder]
            include_path_cells = true

            [env.reward]
            game_over_penalty = -50.0

            [[maps]]
            name = "spiral"
            waypoints = [{ x = 75, y = 25 }, { x = 75, y = 325 }]
            "#,
        )
        .expect("parses");

        assert_eq!(config.server.base_url, "http://game:4000/");
        assert_eq!(config.server.timeout_ms, Some(2_500));

        let env = config.env_config();
        assert_eq!(env.render_mode, RenderMode::Disabled);
        assert!(env.encoder.include_path_cells);
        assert_eq!(env.reward.game_over_penalty, -50.0);
        assert_eq!(env.reward.spending_penalty, -4.0);
        assert_eq!(env.seed, 17);
        assert_eq!(env.maps.len(), 1);
        assert_eq!(env.maps[0].waypoints[1], Position::new(75.0, 325.0));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(CliConfig::parse("[trainer]\nsteps = 3\n").is_err());
    }
}
