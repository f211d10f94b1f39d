//! Core traits for StationeryConnect applications.
//!
//! The primary trait is [`ConfigProvider`], which abstracts where an
//! application keeps its data and how it identifies itself.

use std::path::PathBuf;

use crate::Result;

/// Trait for application configuration.
///
/// Applications embedding the CRM implement this trait to tell it where
/// seed datasets and exports live.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use stationery_core::traits::ConfigProvider;
/// use stationery_core::Result;
///
/// #[derive(Clone)]
/// struct ShopConfig {
///     data_dir: PathBuf,
/// }
///
/// impl ConfigProvider for ShopConfig {
///     fn project_name(&self) -> &str {
///         "stationery"
///     }
///
///     fn base_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.clone())
///     }
///
///     fn data_path(&self, name: &str) -> Result<PathBuf> {
///         Ok(self.data_dir.join(name))
///     }
/// }
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for env var prefixes and default paths.
    fn project_name(&self) -> &str;

    /// Base path for all project data.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn base_path(&self) -> Result<PathBuf>;

    /// Path of a named data file, such as `"dataset.json"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved.
    fn data_path(&self, name: &str) -> Result<PathBuf>;
}
