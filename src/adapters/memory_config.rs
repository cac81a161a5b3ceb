//! In-memory configuration store.
//!
//! Implements [`ConfigPort`] by keeping the configuration as a postcard
//! blob, the same encoding a persistent backend would write.  Used by the
//! host binary to hold the active configuration and by tests.

use std::sync::{Mutex, PoisonError};

use log::{info, warn};

use crate::app::ports::ConfigPort;
use crate::config::MonitorConfig;
use crate::diagnostics::COMMUNICATIONS;
use crate::error::ConfigError;

#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-encoded bytes as-is, bypassing validation.
    #[cfg(test)]
    pub(crate) fn store_raw(&self, bytes: Vec<u8>) {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
    }
}

impl ConfigPort for MemoryConfigStore {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let blob = self.blob.lock().unwrap_or_else(PoisonError::into_inner);
        match blob.as_deref() {
            Some(bytes) => {
                let cfg: MonitorConfig =
                    postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate().inspect_err(|e| {
                    warn!(target: COMMUNICATIONS, "stored config rejected: {}", e);
                })?;
                Ok(cfg)
            }
            None => {
                info!(target: COMMUNICATIONS, "no stored config, using defaults");
                Ok(MonitorConfig::default())
            }
        }
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        let len = bytes.len();
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        info!(target: COMMUNICATIONS, "config saved ({} bytes)", len);
        Ok(())
    }
}
