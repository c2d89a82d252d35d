//! Merge configuration and its YAML file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.grantmail/
//!   config.yaml   (mode 0600, created by `grantmail config init`)
//! ```
//!
//! # API pattern
//!
//! Every function touching the default location has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Relative paths inside a config file are resolved against the directory
//! containing that file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Record, TemplateChoice};

/// Sheet read from workbook sources unless configured otherwise.
pub const DEFAULT_SHEET: &str = "Participants (Reviewers)";

/// Operations manager signed into every email unless configured otherwise.
pub const DEFAULT_OPERATIONS_MANAGER: &str = "Av";

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Header names of the four columns the loader selects.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub name: String,
    pub grant: String,
    pub nda: String,
    pub evaluation_returned: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            grant: "Grant".to_string(),
            nda: "Send_Peer_Reviewer_NDA".to_string(),
            evaluation_returned: "Evaluation_Forms_returned".to_string(),
        }
    }
}

impl ColumnNames {
    /// The four headers in load order.
    pub fn all(&self) -> [&str; 4] {
        [&self.name, &self.grant, &self.nda, &self.evaluation_returned]
    }
}

/// The two template documents a record can be merged into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TemplatePaths {
    pub without_nda: PathBuf,
    pub with_nda: PathBuf,
}

impl TemplatePaths {
    pub fn path_for(&self, choice: TemplateChoice) -> &Path {
        match choice {
            TemplateChoice::WithNda => &self.with_nda,
            TemplateChoice::WithoutNda => &self.without_nda,
        }
    }

    /// Template path for `record`, chosen by its NDA flag.
    pub fn select(&self, record: &Record) -> &Path {
        self.path_for(record.template_choice())
    }

    /// The first template choice whose path is empty, if any.
    pub fn first_unset(&self) -> Option<TemplateChoice> {
        if is_unset(&self.without_nda) {
            Some(TemplateChoice::WithoutNda)
        } else if is_unset(&self.with_nda) {
            Some(TemplateChoice::WithNda)
        } else {
            None
        }
    }
}

/// How placeholder tokens are located inside a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Replace inside each text run independently. A token split across
    /// runs is left untouched.
    #[default]
    RunLocal,
    /// Collapse a paragraph's runs into one before replacing, when a token
    /// only exists across run boundaries. Loses formatting of the merged runs.
    Reflow,
}

/// What the batch does after a document fails to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WriteFailurePolicy {
    /// Stop at the first failing record. Earlier outputs stay on disk.
    #[default]
    Halt,
    /// Report the failure and carry on with the next record.
    Continue,
}

/// Everything one merge run needs. Passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub source: PathBuf,
    pub sheet: String,
    pub templates: TemplatePaths,
    pub output_dir: PathBuf,
    pub operations_manager: String,
    pub columns: ColumnNames,
    pub match_mode: MatchMode,
    pub on_write_error: WriteFailurePolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            sheet: DEFAULT_SHEET.to_string(),
            templates: TemplatePaths::default(),
            output_dir: PathBuf::new(),
            operations_manager: DEFAULT_OPERATIONS_MANAGER.to_string(),
            columns: ColumnNames::default(),
            match_mode: MatchMode::default(),
            on_write_error: WriteFailurePolicy::default(),
        }
    }
}

impl MergeConfig {
    /// Join every non-empty relative path onto `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.source,
            &mut self.templates.without_nda,
            &mut self.templates.with_nda,
            &mut self.output_dir,
        ] {
            if !is_unset(path) && path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// `true` for an empty path (the form's "nothing selected" state).
pub fn is_unset(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

// ---------------------------------------------------------------------------
// 2. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.grantmail/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".grantmail").join("config.yaml")
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load a config file from an explicit path.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_from(path: &Path) -> Result<MergeConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let mut config: MergeConfig = serde_yaml::from_str(&contents).map_err(|e| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    if let Some(base) = path.parent() {
        config.resolve_relative_to(base);
    }
    Ok(config)
}

/// Load `<home>/.grantmail/config.yaml`, or defaults when it does not exist.
pub fn load_at(home: &Path) -> Result<MergeConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(MergeConfig::default());
    }
    load_from(&path)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<MergeConfig, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_to(path: &Path, config: &MergeConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            set_dir_permissions(parent)?;
        }
    }
    let tmp_path = path.with_extension("yaml.tmp");
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 5. Init
// ---------------------------------------------------------------------------

/// Write a default config file to `path`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_to(path: &Path, force: bool) -> Result<MergeConfig, ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    let config = MergeConfig::default();
    save_to(path, &config)?;
    Ok(config)
}

/// Write a default config to `<home>/.grantmail/config.yaml`.
pub fn init_at(home: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(home);
    init_to(&path, force)?;
    Ok(path)
}

/// `init_at` convenience wrapper.
pub fn init(force: bool) -> Result<PathBuf, ConfigError> {
    init_at(&home()?, force)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
