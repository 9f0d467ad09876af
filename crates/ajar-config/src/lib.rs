//! Configuration system for the Ajar coding assistant.
//!
//! Provides TOML-based configuration with:
//! - Storage layout (`[storage]`): data directory and the three backing files
//! - Memory retrieval defaults (`[memory]`)
//! - Model selection for the chat and image-slicing flows (`[assistant]`)
//! - Dataset build settings (`[dataset]`)
//!
//! Config files are layered: the user config directory first, then a
//! project-local `ajar.toml` on top.

pub mod discovery;
pub mod error;
pub mod storage;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, save_config,
    user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use storage::StorageConfig;
pub use types::*;
