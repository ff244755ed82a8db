//! Context configuration.

use serde::{Deserialize, Serialize};

use crate::error::{NamecheapError, Result};
use crate::validation::{FieldRule, FieldValue, check_field};

/// Sandbox API host, for testing.
pub const SANDBOX_HOST: &str = "api.sandbox.namecheap.com";

/// Production API host.
pub const PRODUCTION_HOST: &str = "api.namecheap.com";

/// Credentials and endpoint for a [`DnsContext`](crate::DnsContext).
///
/// The client IP must be whitelisted on the account; discovering it is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfig {
    pub api_host: String,
    pub api_user: String,
    pub api_key: String,
    /// Account to act on; defaults to `api_user`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(rename = "clientIP")]
    pub client_ip: String,
}

const API_HOST_RULES: &[FieldRule] = &[FieldRule::Required, FieldRule::MaxLength(255)];
const API_USER_RULES: &[FieldRule] = &[FieldRule::Required, FieldRule::MaxLength(20)];
const API_KEY_RULES: &[FieldRule] = &[FieldRule::Required, FieldRule::MaxLength(50)];
const USER_NAME_RULES: &[FieldRule] = &[FieldRule::Required, FieldRule::MaxLength(20)];
const CLIENT_IP_RULES: &[FieldRule] = &[
    FieldRule::Required,
    FieldRule::MaxLength(15),
    FieldRule::Ipv4Address,
];

impl ContextConfig {
    pub fn new(
        api_host: impl Into<String>,
        api_user: impl Into<String>,
        api_key: impl Into<String>,
        client_ip: impl Into<String>,
    ) -> Self {
        Self {
            api_host: api_host.into(),
            api_user: api_user.into(),
            api_key: api_key.into(),
            user_name: None,
            client_ip: client_ip.into(),
        }
    }

    pub fn sandbox(
        api_user: impl Into<String>,
        api_key: impl Into<String>,
        client_ip: impl Into<String>,
    ) -> Self {
        Self::new(SANDBOX_HOST, api_user, api_key, client_ip)
    }

    pub fn production(
        api_user: impl Into<String>,
        api_key: impl Into<String>,
        client_ip: impl Into<String>,
    ) -> Self {
        Self::new(PRODUCTION_HOST, api_user, api_key, client_ip)
    }

    /// Act on behalf of another account.
    #[must_use]
    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// `user_name` when set, otherwise `api_user`.
    pub fn effective_user_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.api_user)
    }

    /// Key the rate limiter groups calls by.
    pub fn credential_key(&self) -> String {
        format!("{}:{}", self.api_user, self.api_key)
    }

    /// Default endpoint for this host.
    pub fn endpoint(&self) -> String {
        format!("https://{}/xml.response", self.api_host)
    }

    /// Every rule violation, empty when the configuration is usable.
    pub fn errors(&self) -> Vec<String> {
        let fields: [(&str, &str, &[FieldRule]); 5] = [
            ("ApiHost", self.api_host.as_str(), API_HOST_RULES),
            ("ApiUser", self.api_user.as_str(), API_USER_RULES),
            ("ApiKey", self.api_key.as_str(), API_KEY_RULES),
            ("UserName", self.effective_user_name(), USER_NAME_RULES),
            ("ClientIP", self.client_ip.as_str(), CLIENT_IP_RULES),
        ];

        fields
            .into_iter()
            .flat_map(|(field, value, rules)| check_field(field, FieldValue::Text(value), rules))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        let errors = self.errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(NamecheapError::InvalidConfig { errors })
        }
    }
}
