//! Shared application state.
//!
//! [`AppState<C>`] carries the configuration an application was started
//! with. It holds no principal: the acting user is always passed to CRM
//! calls explicitly.

use std::path::PathBuf;
use std::sync::Arc;

use crate::Result;
use crate::traits::ConfigProvider;

/// Cheaply cloneable handle to the application configuration.
#[derive(Debug)]
pub struct AppState<C: ConfigProvider> {
    config: Arc<C>,
}

impl<C: ConfigProvider> AppState<C> {
    /// Wrap a configuration.
    pub fn new(config: C) -> Self {
        Self::from_arc(Arc::new(config))
    }

    /// Wrap an already shared configuration.
    pub fn from_arc(config: Arc<C>) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// An owned handle to the configuration.
    pub fn config_arc(&self) -> Arc<C> {
        Arc::clone(&self.config)
    }

    /// Shorthand for `config().project_name()`.
    pub fn project_name(&self) -> &str {
        self.config.project_name()
    }

    /// Shorthand for `config().data_path(name)`.
    ///
    /// # Errors
    ///
    /// As for [`ConfigProvider::data_path`].
    pub fn data_path(&self, name: &str) -> Result<PathBuf> {
        self.config.data_path(name)
    }
}

impl<C: ConfigProvider> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}
