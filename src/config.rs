use crate::analysis::badges::BadgeThresholds;
use crate::analysis::ranking::MIN_MATCHUP_GAMES;
use crate::error::AppError;
use std::env;
use std::str::FromStr;

pub const DEFAULT_STORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const DEFAULT_CACHE_MAX_AGE_MINS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Only required when the dataset is fetched from the store.
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub database: String,
    pub store_url: String,
    pub cache_max_age_mins: u64,
    pub min_matchup_games: u32,
    pub thresholds: BadgeThresholds,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut thresholds = BadgeThresholds::default();
        if let Some(rate) = parse_var(&lookup, "SMASH_DOMINANT_WINRATE")? {
            thresholds.dominant_winrate = rate;
        }
        if let Some(n) = parse_var(&lookup, "SMASH_DOMINANT_MIN_MATCHES")? {
            thresholds.dominant_min_matches = n;
        }
        if let Some(n) = parse_var(&lookup, "SMASH_ACTIVE_MIN_MATCHES")? {
            thresholds.active_min_matches = n;
        }
        if let Some(n) = parse_var(&lookup, "SMASH_RIVALRY_MIN_MATCHES")? {
            thresholds.rivalry_min_matches = n;
        }

        Ok(Config {
            project_id: text("SMASH_PROJECT_ID"),
            api_key: text("SMASH_API_KEY"),
            database: text("SMASH_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            store_url: text("SMASH_STORE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_STORE_URL.to_string()),
            cache_max_age_mins: parse_var(&lookup, "SMASH_CACHE_MAX_AGE_MINS")?
                .unwrap_or(DEFAULT_CACHE_MAX_AGE_MINS),
            min_matchup_games: parse_var(&lookup, "SMASH_MIN_MATCHUP_GAMES")?
                .unwrap_or(MIN_MATCHUP_GAMES),
            thresholds,
        })
    }

    pub fn require_project(&self) -> Result<&str, AppError> {
        self.project_id.as_deref().ok_or_else(|| {
            AppError::ConfigError(
                "SMASH_PROJECT_ID not found in environment or .env file".to_string(),
            )
        })
    }

    /// Database resource the dataset is read from, e.g.
    /// `https://firestore.googleapis.com/v1/projects/p/databases/(default)`.
    pub fn store_source(&self) -> Result<String, AppError> {
        Ok(format!(
            "{}/projects/{}/databases/{}",
            self.store_url,
            self.require_project()?,
            self.database
        ))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map(Some).map_err(|_| {
            AppError::ConfigError(format!("{} must be a number, got \"{}\"", key, raw))
        }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert!(config.project_id.is_none());
        assert!(config.require_project().is_err());
        assert_eq!(config.database, "(default)");
        assert_eq!(config.store_url, DEFAULT_STORE_URL);
        assert_eq!(config.cache_max_age_mins, 30);
        assert_eq!(config.min_matchup_games, 3);
        assert_eq!(config.thresholds.dominant_winrate, 70.0);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SMASH_PROJECT_ID", "smash-lan"),
            ("SMASH_API_KEY", "  "),
            ("SMASH_STORE_URL", "http://localhost:8080/v1/"),
            ("SMASH_MIN_MATCHUP_GAMES", "5"),
            ("SMASH_DOMINANT_WINRATE", "65.5"),
            ("SMASH_RIVALRY_MIN_MATCHES", "8"),
        ])
        .unwrap();

        assert_eq!(config.require_project().unwrap(), "smash-lan");
        assert!(config.api_key.is_none());
        assert_eq!(config.store_url, "http://localhost:8080/v1");
        assert_eq!(config.min_matchup_games, 5);
        assert_eq!(config.thresholds.dominant_winrate, 65.5);
        assert_eq!(config.thresholds.rivalry_min_matches, 8);
        assert_eq!(config.thresholds.active_min_matches, 50);
        assert_eq!(
            config.store_source().unwrap(),
            "http://localhost:8080/v1/projects/smash-lan/databases/(default)"
        );
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = config(&[("SMASH_CACHE_MAX_AGE_MINS", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            AppError::ConfigError(msg) if msg.contains("SMASH_CACHE_MAX_AGE_MINS")
        ));
    }
}
