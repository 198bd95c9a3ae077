//! Configuration module for module assembly.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CXXBIND_` and use double underscores
//! to separate nested levels:
//! - `CXXBIND_ASSEMBLY__COLLISION_POLICY=reject` sets `assembly.collision_policy`
//! - `CXXBIND_PARSER__BACKEND=json` sets `parser.backend`
//! - `CXXBIND_DEBUG=true` sets `debug`

use crate::module::CollisionPolicy;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".cxxbind";
const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "CXXBIND_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Directory holding the headers of every module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,

    /// Universe of module names used for dependency resolution
    #[serde(default)]
    pub known_modules: Vec<String>,

    /// Module assembly settings
    #[serde(default)]
    pub assembly: AssemblyConfig,

    /// Header parser settings, passed through to the parser backend
    #[serde(default)]
    pub parser: ParserSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AssemblyConfig {
    /// What to do when two headers declare the same class, template or typedef
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ParserBackend {
    /// Syntactic reader built on tree-sitter-cpp
    #[default]
    TreeSitter,
    /// Pre-computed JSON descriptors produced by an external parser
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ParserSettings {
    #[serde(default)]
    pub backend: ParserBackend,

    /// Extension of the headers that make up a module
    #[serde(default = "default_header_extension")]
    pub header_extension: String,

    /// Where the json backend looks for `<header>.json`; defaults to next to the header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_dir: Option<PathBuf>,

    /// Macros blanked out before parsing (export decorations and the like)
    #[serde(default = "default_strip_macros")]
    pub strip_macros: Vec<String>,

    /// Per-module parser overrides
    #[serde(default)]
    pub modules: HashMap<String, ModuleParserConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ModuleParserConfig {
    /// Extra macros to blank out for this module only
    #[serde(default)]
    pub strip_macros: Vec<String>,

    /// Header file names to leave out of the module
    #[serde(default)]
    pub skip_headers: Vec<String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_false() -> bool {
    false
}
fn default_header_extension() -> String {
    "hxx".to_string()
}
fn default_strip_macros() -> Vec<String> {
    vec![
        "Standard_EXPORT".to_string(),
        "Standard_API".to_string(),
        "DEFINE_STANDARD_ALLOC".to_string(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            prefix: None,
            known_modules: Vec::new(),
            assembly: AssemblyConfig::default(),
            parser: ParserSettings::default(),
        }
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            backend: ParserBackend::default(),
            header_extension: default_header_extension(),
            descriptor_dir: None,
            strip_macros: default_strip_macros(),
            modules: HashMap::new(),
        }
    }
}

impl ParserSettings {
    /// Global macros plus the ones configured for `module`
    pub fn strip_macros_for(&self, module: &str) -> Vec<&str> {
        let mut macros: Vec<&str> = self.strip_macros.iter().map(String::as_str).collect();
        if let Some(module_config) = self.modules.get(module) {
            macros.extend(module_config.strip_macros.iter().map(String::as_str));
        }
        macros
    }

    pub fn skips_header(&self, module: &str, file_name: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|m| m.skip_headers.iter().any(|h| h == file_name))
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .cxxbind directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::layered(&config_path, ENV_PREFIX)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::layered(path.as_ref(), ENV_PREFIX)
    }

    fn layered(config_path: &Path, env_prefix: &str) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels,
            // single underscore remains as is within field names
            .merge(Env::prefixed(env_prefix).map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the workspace config by looking for a .cxxbind directory
    /// from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get the workspace root directory (where .cxxbind is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = r#"# cxxbind configuration file

# Version of the configuration schema
version = 1

# Enable debug logging
debug = false

# Directory holding the module headers (e.g. $CONDA_PREFIX/include/opencascade)
# prefix = "/usr/include/opencascade"

# Every module name dependencies may resolve to
known_modules = []

[assembly]
# What to do when two headers declare the same class, template or typedef:
# "overwrite" (later header wins), "reject" (fail), "merge" (union the members)
collision_policy = "overwrite"

[parser]
# "tree-sitter" reads headers directly, "json" reads <header>.json descriptors
backend = "tree-sitter"

# Extension of module headers
header_extension = "hxx"

# Macros removed before parsing
strip_macros = ["Standard_EXPORT", "Standard_API", "DEFINE_STANDARD_ALLOC"]

# Per-module overrides
# [parser.modules.gp]
# strip_macros = []
# skip_headers = ["gp_Mat.hxx"]
"#;

        std::fs::write(&config_path, template)?;

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(
            settings.assembly.collision_policy,
            CollisionPolicy::Overwrite
        );
        assert_eq!(settings.parser.backend, ParserBackend::TreeSitter);
        assert_eq!(settings.parser.header_extension, "hxx");
        assert!(settings.prefix.is_none());
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2
known_modules = ["gp", "Standard", "TColStd"]

[assembly]
collision_policy = "merge"

[parser]
backend = "json"
descriptor_dir = "descriptors"

[parser.modules.gp]
strip_macros = ["gp_EXPORT"]
skip_headers = ["gp_Mat.hxx"]
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.known_modules.len(), 3);
        assert_eq!(settings.assembly.collision_policy, CollisionPolicy::Merge);
        assert_eq!(settings.parser.backend, ParserBackend::Json);
        assert_eq!(
            settings.parser.descriptor_dir,
            Some(PathBuf::from("descriptors"))
        );
        assert!(settings.parser.skips_header("gp", "gp_Mat.hxx"));
        assert!(!settings.parser.skips_header("gp", "gp_Pnt.hxx"));
        assert!(settings.parser.strip_macros_for("gp").contains(&"gp_EXPORT"));
        assert!(!settings.parser.strip_macros_for("TColStd").contains(&"gp_EXPORT"));
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.assembly.collision_policy = CollisionPolicy::Reject;
        settings.known_modules = vec!["gp".to_string()];

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.assembly.collision_policy, CollisionPolicy::Reject);
        assert_eq!(loaded.known_modules, vec!["gp"]);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        // Only specify a few settings
        let toml_content = r#"
[parser]
header_extension = "hpp"
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();

        assert_eq!(settings.parser.header_extension, "hpp");
        // Default values should still be present
        assert_eq!(settings.version, 1);
        assert_eq!(settings.parser.backend, ParserBackend::TreeSitter);
        assert!(!settings.parser.strip_macros.is_empty());
    }

    #[test]
    fn test_layered_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
debug = false

[parser]
header_extension = "hpp"
"#;
        fs::write(&config_path, toml_content).unwrap();

        // Environment variables override the config file. The prefix is private
        // to this test so parallel loads under CXXBIND_ never see it.
        unsafe {
            std::env::set_var("LAYERED_TEST_DEBUG", "true");
            std::env::set_var("LAYERED_TEST_PARSER__BACKEND", "json");
        }

        let settings = Settings::layered(&config_path, "LAYERED_TEST_").unwrap();

        assert!(settings.debug);
        assert_eq!(settings.parser.backend, ParserBackend::Json);
        // Config file value is used when no env var
        assert_eq!(settings.parser.header_extension, "hpp");

        unsafe {
            std::env::remove_var("LAYERED_TEST_DEBUG");
            std::env::remove_var("LAYERED_TEST_PARSER__BACKEND");
        }
    }
}
