use crate::error::{GrowError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SiteConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

// ---------------------------------------------------------------------------
// ScoringConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Percentage at or above which a category reads as a strength.
    #[serde(default = "default_strength_threshold")]
    pub strength_threshold: u32,
    /// Percentage below which a category reads as needing focus.
    #[serde(default = "default_focus_threshold")]
    pub focus_threshold: u32,
}

fn default_strength_threshold() -> u32 {
    75
}

fn default_focus_threshold() -> u32 {
    50
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strength_threshold: default_strength_threshold(),
            focus_threshold: default_focus_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,
    /// Shared bearer token accepted on admin routes in addition to admin users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

fn default_session_ttl_hours() -> u32 {
    168
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            admin_token: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub site: SiteConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            site: SiteConfig {
                name: site_name.into(),
                tagline: None,
                contact_email: None,
            },
            scoring: ScoringConfig::default(),
            auth: AuthConfig::default(),
            server: ServerConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(GrowError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like `load`, but falls back to defaults on an uninitialized root.
    /// Scoring must keep working even before `grow init` has run.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(GrowError::NotInitialized) => Ok(Self::new("grow")),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.site.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "site.name is empty".to_string(),
            });
        }

        let s = &self.scoring;
        if s.strength_threshold > 100 || s.focus_threshold > 100 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "scoring thresholds must be 0-100 (strength={}, focus={})",
                    s.strength_threshold, s.focus_threshold
                ),
            });
        }
        if s.focus_threshold > s.strength_threshold {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "scoring.focus_threshold ({}) is above strength_threshold ({}) \
                     so no category will read as developing",
                    s.focus_threshold, s.strength_threshold
                ),
            });
        }

        if self.auth.session_ttl_hours == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "auth.session_ttl_hours is 0, so every login expires immediately"
                    .to_string(),
            });
        }
        if let Some(token) = &self.auth.admin_token {
            if token.len() < 16 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "auth.admin_token is shorter than 16 characters".to_string(),
                });
            }
        }

        if let Some(email) = &self.site.contact_email {
            if !crate::forms::is_valid_email(email) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("site.contact_email '{email}' does not look like an email"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("Grow Coaching");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.site.name, "Grow Coaching");
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.scoring, ScoringConfig::default());
    }

    #[test]
    fn minimal_yaml_gets_defaults() {
        let yaml = "version: 1\nsite:\n  name: my-site\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.scoring.strength_threshold, 75);
        assert_eq!(cfg.scoring.focus_threshold, 50);
        assert_eq!(cfg.auth.session_ttl_hours, 168);
        assert!(cfg.auth.admin_token.is_none());
        assert_eq!(cfg.server.port, 3141);
    }

    #[test]
    fn admin_token_not_serialized_when_absent() {
        let cfg = Config::new("test");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert!(!yaml.contains("admin_token"));
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(GrowError::NotInitialized)
        ));
        let cfg = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(cfg.scoring, ScoringConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cfg = Config::new("saved");
        cfg.scoring.strength_threshold = 80;
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.scoring.strength_threshold, 80);
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(Config::new("site").validate().is_empty());
    }

    #[test]
    fn validate_inverted_thresholds() {
        let mut cfg = Config::new("site");
        cfg.scoring.focus_threshold = 90;
        cfg.scoring.strength_threshold = 60;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }

    #[test]
    fn validate_out_of_range_threshold_is_error() {
        let mut cfg = Config::new("site");
        cfg.scoring.strength_threshold = 120;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
    }

    #[test]
    fn validate_zero_ttl_and_short_token() {
        let mut cfg = Config::new("site");
        cfg.auth.session_ttl_hours = 0;
        cfg.auth.admin_token = Some("short".to_string());
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn validate_empty_site_name() {
        let cfg = Config::new("  ");
        let warnings = cfg.validate();
        assert_eq!(warnings[0].level, WarnLevel::Error);
    }
}
