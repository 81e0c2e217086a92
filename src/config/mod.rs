//! Configuration: types, default paths and XML loading.
//!
//! Precedence is CLI flags > config.xml > built-in defaults.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{create_template_config, load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DIRLINK_CONFIG";
