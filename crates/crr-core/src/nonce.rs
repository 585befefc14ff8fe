//! Deployment nonce
//!
//! Custom resources that must run on every deployment carry a value that
//! changes between synthesis runs, which makes the provisioning engine see an
//! update each time. The nonce is an explicit input so that a plan can also
//! be reproduced exactly.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value that differs between deployments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentNonce(String);

impl DeploymentNonce {
    /// Current time in epoch milliseconds
    pub fn from_clock() -> Self {
        Self(Utc::now().timestamp_millis().to_string())
    }

    /// A caller-chosen value, for reproducible plans
    pub fn fixed(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeploymentNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
