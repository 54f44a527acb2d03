//! Host connectivity signal

use crate::installation::traits::Connectivity;
use std::env;

/// Value of the connectivity variable that marks the host as offline
pub const OFFLINE_VALUE: &str = "offline";

/// Reads connectivity from a process-wide environment variable.
///
/// Only the exact value `offline` counts as offline; any other value, or the
/// variable being unset, is treated as online.
#[derive(Debug, Clone)]
pub struct EnvConnectivity {
    variable: String,
}

impl EnvConnectivity {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl Connectivity for EnvConnectivity {
    fn is_offline(&self) -> bool {
        env::var(&self.variable)
            .map(|status| status == OFFLINE_VALUE)
            .unwrap_or(false)
    }
}
