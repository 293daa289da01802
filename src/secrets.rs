// secrets
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

pub static SECRET_MANAGER: Lazy<SecretManager> = Lazy::new(|| {
    let file = read_env_file(Path::new(".env"));
    SecretManager::from_lookup(env_then_file(&file))
});

/// Variables of a dotenv file. A missing file yields none, malformed lines are skipped.
pub fn read_env_file(path: &Path) -> HashMap<String, String> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.filter_map(Result::ok).collect(),
        Err(_) => HashMap::new(),
    }
}

/// Process environment first, then the dotenv file.
fn env_then_file(file: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
    move |key: &str| env::var(key).ok().or_else(|| file.get(key).cloned())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MODE {
    DEV,
    PROD,
}

pub struct SecretManager {
    secrets: HashMap<String, String>,
}

impl SecretManager {
    /// Build the settings from `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let mut secrets: HashMap<String, String> = HashMap::new();
        let mode = match lookup("MODE") {
            Some(mode) if mode.to_lowercase() == "prod" => MODE::PROD,
            _ => MODE::DEV,
        };

        let database_url = match (mode, lookup("DATABASE_URL")) {
            (_, Some(url)) => url,
            (MODE::DEV, None) => format!(
                "postgres://{}:{}@{}:{}/{}",
                var("DB_USER", "postgres"),
                var("DB_PASSWORD", "postgres"),
                var("DB_HOST", "localhost"),
                var("DB_PORT", "5432"),
                var("DB_NAME", "songs"),
            ),
            (MODE::PROD, None) => String::new(),
        };
        secrets.insert("DATABASE_URL".to_string(), database_url);

        let defaults: &[(&str, &str)] = match mode {
            MODE::DEV => &[
                ("PORT", "8080"),
                ("LOG_LEVEL", "debug"),
                ("DB_MAX_CONNECTIONS", "5"),
            ],
            MODE::PROD => &[
                ("PORT", "8080"),
                ("LOG_LEVEL", "info"),
                ("DB_MAX_CONNECTIONS", "5"),
            ],
        };
        for (key, default) in defaults {
            secrets.insert(key.to_string(), var(*key, *default));
        }

        // Song details enrichment is off unless a url is given
        secrets.insert("MUSIC_INFO_URL".to_string(), var("MUSIC_INFO_URL", ""));
        secrets.insert(
            "MUSIC_INFO_TIMEOUT_SECS".to_string(),
            var("MUSIC_INFO_TIMEOUT_SECS", "10"),
        );

        SecretManager { secrets }
    }

    /// Log which settings are configured (NOT their values!)
    pub fn log_configured(&self) {
        let mut configured: Vec<&str> = self
            .secrets
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str())
            .collect();
        configured.sort_unstable();
        info!("Secrets configured: {:?}", configured);
    }

    pub fn get(&self, key: &str) -> String {
        self.secrets.get(key).cloned().unwrap_or_default()
    }

    /// Parse a setting, falling back to `default` when it is missing or malformed.
    pub fn get_parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        let raw = self.get(key);
        if raw.is_empty() {
            return default;
        }
        raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring malformed {}={:?}", key, raw);
            default
        })
    }
}
