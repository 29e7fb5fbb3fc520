use std::path::Path;

use serde::Deserialize;

use mud::rules::ChargenRules;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub name: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: "SuperMUD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: String,
    /// When false, accounts and characters live in memory for this run only.
    pub enabled: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: "data/player.db".to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChargenSection {
    pub years_in_the_future: u32,
    pub minimum_character_age: u32,
    pub utc_offset_hours: i32,
    pub max_characters_per_account: usize,
}

impl Default for ChargenSection {
    fn default() -> Self {
        let rules = ChargenRules::default();
        Self {
            years_in_the_future: rules.years_in_the_future,
            minimum_character_age: rules.minimum_character_age,
            utc_offset_hours: rules.utc_offset_hours,
            max_characters_per_account: rules.max_characters_per_account,
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub chargen: ChargenSection,
}

impl ServerConfig {
    /// Load configuration from an optional TOML file path.
    pub fn load(config_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match config_path {
            Some(path) if Path::new(path).exists() => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            _ => Self::default(),
        };
        Ok(config)
    }

    pub fn to_chargen_rules(&self) -> ChargenRules {
        ChargenRules {
            years_in_the_future: self.chargen.years_in_the_future,
            minimum_character_age: self.chargen.minimum_character_age,
            utc_offset_hours: self.chargen.utc_offset_hours,
            max_characters_per_account: self.chargen.max_characters_per_account,
        }
    }
}

/// Parse CLI arguments and load config.
/// Supports: --config <path>
pub fn parse_cli_args() -> ServerConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if let Some(val) = args.get(i + 1) {
                    config_path = Some(val.as_str());
                    i += 2;
                } else {
                    eprintln!("--config requires a path argument");
                    std::process::exit(1);
                }
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
    }

    match ServerConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_matches_hardcoded_values() {
        let config = ServerConfig::default();
        assert_eq!(config.server.name, "SuperMUD");
        assert_eq!(config.database.path, "data/player.db");
        assert!(config.database.enabled);
        assert_eq!(config.chargen.years_in_the_future, 2);
        assert_eq!(config.chargen.minimum_character_age, 18);
        assert_eq!(config.chargen.utc_offset_hours, -8);
        assert_eq!(config.chargen.max_characters_per_account, 10);
    }

    #[test]
    fn to_chargen_rules() {
        let mut config = ServerConfig::default();
        config.chargen.minimum_character_age = 21;
        let rules = config.to_chargen_rules();
        assert_eq!(rules.minimum_character_age, 21);
        assert_eq!(rules.years_in_the_future, 2);
    }

    #[test]
    fn load_nonexistent_file_returns_defaults() {
        let config = ServerConfig::load(Some("/tmp/nonexistent_supermud_config_12345.toml")).unwrap();
        assert_eq!(config.chargen.years_in_the_future, 2);
    }

    #[test]
    fn load_none_returns_defaults() {
        let config = ServerConfig::load(None).unwrap();
        assert!(config.database.enabled);
    }

    #[test]
    fn load_partial_toml() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"
[database]
enabled = false

[chargen]
years_in_the_future = 5
"#
        )
        .unwrap();

        let config = ServerConfig::load(Some(f.path().to_str().unwrap())).unwrap();
        assert!(!config.database.enabled);
        assert_eq!(config.database.path, "data/player.db");
        assert_eq!(config.chargen.years_in_the_future, 5);
        assert_eq!(config.chargen.minimum_character_age, 18);
    }

    #[test]
    fn load_malformed_toml_fails() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "[chargen\nyears_in_the_future = ").unwrap();
        assert!(ServerConfig::load(Some(f.path().to_str().unwrap())).is_err());
    }
}
