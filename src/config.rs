use crate::domain::Network;
use std::collections::HashMap;
use thiserror::Error;

/// One configured retailer: which network tracks it and the affiliate URL
/// the member is redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retailer {
    pub network: Network,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub admin_token: String,
    /// Bearer token -> member id, for the member-facing endpoints.
    pub member_tokens: HashMap<String, String>,
    /// Retailer id -> (network, affiliate URL).
    pub retailers: HashMap<String, Retailer>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let admin_token = env_map
            .get("ADMIN_TOKEN")
            .cloned()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnv("ADMIN_TOKEN".to_string()))?;

        let member_tokens = parse_member_tokens_from_map(&env_map)?;
        let retailers = parse_retailers_from_map(&env_map)?;

        Ok(Config {
            port,
            database_path,
            admin_token,
            member_tokens,
            retailers,
        })
    }
}

/// Parse `token:memberId` pairs from `MEMBER_TOKENS` (comma-separated) or
/// `MEMBER_TOKENS_FILE` (one per line).
fn parse_member_tokens_from_map(
    env_map: &HashMap<String, String>,
) -> Result<HashMap<String, String>, ConfigError> {
    let entries = list_from_env_or_file(env_map, "MEMBER_TOKENS", "MEMBER_TOKENS_FILE")?;

    let mut tokens = HashMap::new();
    for entry in entries {
        let (token, member) = entry.split_once(':').ok_or_else(|| {
            ConfigError::InvalidValue(
                "MEMBER_TOKENS".to_string(),
                format!("expected token:memberId, got {}", entry),
            )
        })?;
        if token.is_empty() || member.is_empty() {
            return Err(ConfigError::InvalidValue(
                "MEMBER_TOKENS".to_string(),
                format!("expected token:memberId, got {}", entry),
            ));
        }
        tokens.insert(token.to_string(), member.to_string());
    }
    Ok(tokens)
}

/// Parse `retailerId:network:url` entries from `RETAILERS` (comma-separated)
/// or `RETAILERS_FILE` (one per line).
fn parse_retailers_from_map(
    env_map: &HashMap<String, String>,
) -> Result<HashMap<String, Retailer>, ConfigError> {
    let entries = list_from_env_or_file(env_map, "RETAILERS", "RETAILERS_FILE")?;

    let mut retailers = HashMap::new();
    for entry in entries {
        let mut parts = entry.splitn(3, ':');
        let (id, network_str, url) = match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(network), Some(url)) if !id.is_empty() && !url.is_empty() => {
                (id, network, url)
            }
            _ => {
                return Err(ConfigError::InvalidValue(
                    "RETAILERS".to_string(),
                    format!("expected retailerId:network:url, got {}", entry),
                ))
            }
        };
        let network = Network::parse(network_str).ok_or_else(|| {
            ConfigError::InvalidValue(
                "RETAILERS".to_string(),
                format!("unknown network {} in {}", network_str, entry),
            )
        })?;
        retailers.insert(
            id.to_string(),
            Retailer {
                network,
                url: url.to_string(),
            },
        );
    }
    Ok(retailers)
}

fn list_from_env_or_file(
    env_map: &HashMap<String, String>,
    var: &str,
    file_var: &str,
) -> Result<Vec<String>, ConfigError> {
    if let Some(inline) = env_map.get(var) {
        Ok(inline
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    } else if let Some(file_path) = env_map.get(file_var) {
        let content = std::fs::read_to_string(file_path).map_err(|_| {
            ConfigError::InvalidValue(
                file_var.to_string(),
                "file not found or unreadable".to_string(),
            )
        })?;
        Ok(content
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    } else {
        Ok(Vec::new())
    }
}
