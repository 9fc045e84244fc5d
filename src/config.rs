use std::env;

use crate::call::peer::{IceServer, DEFAULT_STUN_SERVERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    Rest,
}

#[derive(Debug, Clone)]
pub struct RestBackendConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct LocationApiConfig {
    pub base_url: String,
    pub host_header: String,
    pub api_key: Option<String>,
}

impl Default for LocationApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            host_header: "locatie.localhost".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub backend_kind: BackendKind,
    pub rest: RestBackendConfig,
    pub auth_url: String,
    pub location: LocationApiConfig,
    pub ice_servers: Vec<IceServer>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} moet in .env staan")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let port = match env::var("PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: v,
            })?,
            Err(_) => 3000,
        };

        let backend_kind = match env::var("BACKEND_KIND").as_deref() {
            Ok("rest") => BackendKind::Rest,
            Ok("sqlite") | Err(_) => BackendKind::Sqlite,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    key: "BACKEND_KIND",
                    value: other.to_string(),
                })
            }
        };

        let backend_url =
            env::var("BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:54321".to_string());
        let rest = RestBackendConfig {
            base_url: backend_url.clone(),
            api_key: env::var("BACKEND_API_KEY").unwrap_or_default(),
        };
        if backend_kind == BackendKind::Rest && rest.api_key.is_empty() {
            return Err(ConfigError::Missing("BACKEND_API_KEY"));
        }

        let defaults = LocationApiConfig::default();
        let location = LocationApiConfig {
            base_url: env::var("LOCATION_API_URL").unwrap_or(defaults.base_url),
            host_header: env::var("LOCATION_SERVICE_HOST").unwrap_or(defaults.host_header),
            api_key: env::var("LOCATION_API_KEY").ok(),
        };

        let ice_servers = env::var("ICE_SERVERS")
            .ok()
            .map(|v| parse_ice_servers(&v))
            .filter(|servers| !servers.is_empty())
            .unwrap_or_else(default_ice_servers);

        Ok(Self {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            backend_kind,
            auth_url: env::var("AUTH_URL").unwrap_or_else(|_| backend_url.clone()),
            rest,
            location,
            ice_servers,
        })
    }
}

pub fn default_ice_servers() -> Vec<IceServer> {
    DEFAULT_STUN_SERVERS
        .iter()
        .map(|url| IceServer {
            urls: vec![url.to_string()],
        })
        .collect()
}

fn parse_ice_servers(raw: &str) -> Vec<IceServer> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| s.starts_with("stun:") || s.starts_with("turn:"))
        .map(|s| IceServer {
            urls: vec![s.to_string()],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ice_server_list_skips_unknown_schemes() {
        let servers = parse_ice_servers("stun:a.example:3478, http://nope, turn:b.example");
        let urls: Vec<_> = servers.iter().map(|s| s.urls[0].as_str()).collect();
        assert_eq!(urls, vec!["stun:a.example:3478", "turn:b.example"]);
    }

    #[test]
    fn default_ice_servers_are_public_stun() {
        let servers = default_ice_servers();
        assert_eq!(servers.len(), DEFAULT_STUN_SERVERS.len());
        assert!(servers.iter().all(|s| s.urls[0].starts_with("stun:")));
    }
}
