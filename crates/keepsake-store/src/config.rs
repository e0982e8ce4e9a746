use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use keepsake_codec::CodecKind;
use keepsake_template::KeyTemplate;
use keepsake_types::BackendKind;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::resolver::DirectoryResolver;

/// Environment variable that overrides [`StoreConfig::home_dir`].
pub const HOME_ENV: &str = "KEEPSAKE_HOME";

const HOME_DIR_NAME: &str = ".keepsake";

/// Process-level store configuration, usually loaded from a TOML file.
///
/// ```toml
/// home_dir = "/var/lib/keepsake"
/// backend = "local"
/// directory = "/data/results"
/// validate_directory = true
/// key_template = "{flow}/{task}.bin"
/// codec = "bincode"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub home_dir: PathBuf,
    pub backend: BackendKind,
    pub directory: Option<PathBuf>,
    pub validate_directory: bool,
    pub key_template: Option<KeyTemplate>,
    pub codec: CodecKind,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            home_dir: default_home(),
            backend: BackendKind::default(),
            directory: None,
            validate_directory: true,
            key_template: None,
            codec: CodecKind::default(),
        }
    }
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(HOME_DIR_NAME))
        .unwrap_or_else(|| Path::new("~").join(HOME_DIR_NAME))
}

impl StoreConfig {
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Load a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply `KEEPSAKE_HOME` if it is set and non-empty.
    pub fn apply_env(self) -> Self {
        self.with_home_override(std::env::var_os(HOME_ENV))
    }

    fn with_home_override(mut self, home: Option<OsString>) -> Self {
        if let Some(home) = home.filter(|h| !h.is_empty()) {
            self.home_dir = PathBuf::from(home);
        }
        self
    }

    pub fn resolver(&self) -> DirectoryResolver {
        DirectoryResolver::new(&self.home_dir)
    }

    pub fn options(&self) -> StoreOptions {
        StoreOptions {
            directory: self.directory.clone(),
            validate_directory: self.validate_directory,
            key_template: self.key_template.clone(),
            codec: self.codec,
        }
    }
}

/// Options recognized when opening a store.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreOptions {
    /// Root override; subject to the containment rule.
    pub directory: Option<PathBuf>,
    /// Make the root absolute and create it. On by default.
    pub validate_directory: bool,
    /// Template for keys; `None` generates a fresh key per write.
    pub key_template: Option<KeyTemplate>,
    pub codec: CodecKind,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            directory: None,
            validate_directory: true,
            key_template: None,
            codec: CodecKind::default(),
        }
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn validate_directory(mut self, validate: bool) -> Self {
        self.validate_directory = validate;
        self
    }

    pub fn with_template(mut self, template: KeyTemplate) -> Self {
        self.key_template = Some(template);
        self
    }

    pub fn with_codec(mut self, codec: CodecKind) -> Self {
        self.codec = codec;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert!(c.home_dir.ends_with(".keepsake"));
        assert_eq!(c.backend, BackendKind::Local);
        assert!(c.directory.is_none());
        assert!(c.validate_directory);
        assert!(c.key_template.is_none());
        assert_eq!(c.codec, CodecKind::Bincode);
    }

    #[test]
    fn parse_full_toml() {
        let c = StoreConfig::from_toml_str(
            r#"
            home_dir = "/var/lib/keepsake"
            backend = "memory"
            directory = "/data/results"
            validate_directory = false
            key_template = "{flow}/{task}.bin"
            codec = "json"
            "#,
        )
        .unwrap();
        assert_eq!(c.home_dir, PathBuf::from("/var/lib/keepsake"));
        assert_eq!(c.backend, BackendKind::Memory);
        assert_eq!(c.directory, Some(PathBuf::from("/data/results")));
        assert!(!c.validate_directory);
        assert_eq!(c.key_template.unwrap().source(), "{flow}/{task}.bin");
        assert_eq!(c.codec, CodecKind::Json);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c = StoreConfig::from_toml_str(r#"home_dir = "/srv/ks""#).unwrap();
        assert_eq!(c.home_dir, PathBuf::from("/srv/ks"));
        assert!(c.validate_directory);
        assert_eq!(c.codec, CodecKind::Bincode);
    }

    #[test]
    fn invalid_template_is_config_error() {
        let err = StoreConfig::from_toml_str(r#"key_template = "{unclosed""#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn codec_name_is_case_insensitive() {
        let c = StoreConfig::from_toml_str(r#"codec = "JSON""#).unwrap();
        assert_eq!(c.codec, CodecKind::Json);
    }

    #[test]
    fn unknown_codec_is_config_error() {
        let err = StoreConfig::from_toml_str(r#"codec = "pickle""#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keepsake.toml");
        fs::write(&path, "codec = \"json\"\n").unwrap();
        assert_eq!(StoreConfig::load(&path).unwrap().codec, CodecKind::Json);

        let missing = StoreConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, StoreError::Config(_)));
    }

    #[test]
    fn home_override() {
        let c = StoreConfig::default().with_home_override(Some("/tmp/ks".into()));
        assert_eq!(c.home_dir, PathBuf::from("/tmp/ks"));

        let c = StoreConfig::default().with_home_override(Some(OsString::new()));
        assert!(c.home_dir.ends_with(".keepsake"));
    }

    #[test]
    fn options_mirror_config() {
        let c = StoreConfig {
            directory: Some("/data".into()),
            validate_directory: false,
            codec: CodecKind::Json,
            ..StoreConfig::default()
        };
        let o = c.options();
        assert_eq!(o.directory, Some(PathBuf::from("/data")));
        assert!(!o.validate_directory);
        assert_eq!(o.codec, CodecKind::Json);
        assert_eq!(c.resolver().home(), c.home_dir.as_path());
    }

    #[test]
    fn options_builder() {
        let o = StoreOptions::new()
            .with_directory("/x")
            .validate_directory(false)
            .with_codec(CodecKind::Json)
            .with_template(KeyTemplate::parse("{id}").unwrap());
        assert_eq!(o.directory, Some(PathBuf::from("/x")));
        assert!(!o.validate_directory);
        assert_eq!(o.codec, CodecKind::Json);
        assert!(o.key_template.is_some());
        assert!(StoreOptions::default().validate_directory);
    }
}
