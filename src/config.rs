use std::env;

use crate::{datasource::DataSourceSettings, HawkularError, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub datasource: DataSourceSettings,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// `DATASOURCE_CONFIG` points at a data source JSON file and takes
    /// precedence over the individual `HAWKULAR_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|e| HawkularError::Config(format!("invalid PORT: {}", e)))?;

        let datasource = match lookup("DATASOURCE_CONFIG") {
            Some(path) => {
                let raw = std::fs::read_to_string(&path).map_err(|e| {
                    HawkularError::Config(format!("Failed to read {}: {}", path, e))
                })?;
                DataSourceSettings::from_json(&raw)?
            }
            None => {
                let url = lookup("HAWKULAR_URL")
                    .unwrap_or_else(|| "http://localhost:8080/hawkular/metrics".to_string());
                let tenant = lookup("HAWKULAR_TENANT").ok_or_else(|| {
                    HawkularError::Config("HAWKULAR_TENANT must be set".to_string())
                })?;

                let mut settings = DataSourceSettings::new(url, tenant);
                if let Some(raw) = lookup("HAWKULAR_TIMEOUT_SECS") {
                    let secs: u64 = raw.parse().map_err(|e| {
                        HawkularError::Config(format!("invalid HAWKULAR_TIMEOUT_SECS: {}", e))
                    })?;
                    if secs > 0 {
                        settings.json_data["timeout"] = secs.into();
                    }
                }

                match lookup("HAWKULAR_USER") {
                    Some(user) => {
                        let password = lookup("HAWKULAR_PASSWORD").unwrap_or_default();
                        settings.with_basic_auth(user, password)
                    }
                    None => settings,
                }
            }
        };

        Ok(Self { port, datasource })
    }
}
