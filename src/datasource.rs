use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::{HawkularError, Result};

pub const HAWKULAR_DATASOURCE: &str = "hawkular-datasource";

/// Data source settings as stored by the host.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSettings {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub type_name: String,
    pub url: String,
    #[serde(default)]
    pub basic_auth: bool,
    #[serde(default)]
    pub basic_auth_user: String,
    #[serde(default)]
    pub basic_auth_password: String,
    #[serde(default)]
    pub json_data: serde_json::Value,
}

impl fmt::Debug for DataSourceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSourceSettings")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("url", &self.url)
            .field("basic_auth", &self.basic_auth)
            .field("basic_auth_user", &self.basic_auth_user)
            .field("basic_auth_password", &"<redacted>")
            .field("json_data", &self.json_data)
            .finish()
    }
}

fn default_type() -> String {
    HAWKULAR_DATASOURCE.to_string()
}

impl DataSourceSettings {
    pub fn new(url: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            type_name: default_type(),
            url: url.into(),
            basic_auth: false,
            basic_auth_user: String::new(),
            basic_auth_password: String::new(),
            json_data: serde_json::json!({ "tenant": tenant.into() }),
        }
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = true;
        self.basic_auth_user = user.into();
        self.basic_auth_password = password.into();
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| HawkularError::Config(format!("invalid data source settings: {}", e)))
    }

    pub fn tenant(&self) -> Result<&str> {
        match self.json_data.get("tenant").and_then(|t| t.as_str()) {
            Some(tenant) if !tenant.is_empty() => Ok(tenant),
            _ => Err(HawkularError::Config(format!(
                "data source '{}' has no tenant configured",
                self.name
            ))),
        }
    }

    /// Request timeout from `jsonData.timeout`, in seconds. Zero means unset.
    pub fn timeout(&self) -> Option<Duration> {
        self.json_data
            .get("timeout")
            .and_then(|t| t.as_u64())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    /// Credentials to attach, if basic auth is enabled.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.basic_auth
            .then(|| (self.basic_auth_user.as_str(), self.basic_auth_password.as_str()))
    }
}
