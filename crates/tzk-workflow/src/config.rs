//! Project (`tzk.json`) and global (`config.json`) configuration.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;
use tzk_build::DEFAULT_CERT_PASSWORD;
use tzk_targets::{PollPolicy, DEFAULT_EMULATOR_PROFILE};
use tzk_util::read_env_trimmed;

pub const PROJECT_CONFIG_FILE: &str = "tzk.json";
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

const EMULATOR_PROFILE_ENV: &str = "TZK_EMULATOR_PROFILE";
const POLL_ATTEMPTS_ENV: &str = "TZK_POLL_ATTEMPTS";
const POLL_INTERVAL_ENV: &str = "TZK_POLL_INTERVAL_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no {} found; is this a tzk project?", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("platform {0} is not configured for this app")]
    UnknownPlatform(String),
    #[error("platform {platform} is missing \"{field}\"")]
    MissingField {
        platform: String,
        field: &'static str,
    },
    #[error("no default target for {platform}; set defaultTargets.{platform} in {}", .path.display())]
    NoDefaultTarget { platform: String, path: PathBuf },
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, ConfigError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    pub id: String,
    pub platforms: BTreeMap<String, PlatformConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformConfig {
    pub app_name: String,
    /// Package id handed to `uninstall` and `run`.
    pub id: String,
    pub package: String,
    pub certificate_profile: String,
    /// Overrides the global `shortIdPlatforms` list for this platform.
    pub run_with_short_id: Option<bool>,
    /// Bundler command run in the project root before `build-web`.
    pub web_build: Vec<String>,
}

impl ProjectConfig {
    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_CONFIG_FILE)
    }

    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(project_dir);
        read_json(&path)?.ok_or(ConfigError::NotFound(path))
    }

    pub fn platform(&self, platform: &str) -> Result<&PlatformConfig, ConfigError> {
        let config = self
            .platforms
            .get(platform)
            .ok_or_else(|| ConfigError::UnknownPlatform(platform.to_string()))?;
        config.validate(platform)?;
        Ok(config)
    }
}

impl PlatformConfig {
    fn validate(&self, platform: &str) -> Result<(), ConfigError> {
        let required = [
            ("appName", &self.app_name),
            ("id", &self.id),
            ("package", &self.package),
            ("certificateProfile", &self.certificate_profile),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    platform: platform.to_string(),
                    field,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            interval_ms: policy.interval.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalConfig {
    /// Emulator to start per platform when nothing usable is connected.
    pub default_targets: BTreeMap<String, String>,
    pub emulator_profile: String,
    /// Platforms whose `run` takes the package id cut at the first `.`.
    pub short_id_platforms: Vec<String>,
    pub certificate_password: String,
    pub poll: PollConfig,
}

fn default_targets() -> BTreeMap<String, String> {
    [
        ("tizen", "T-samsung-5.0-x86"),
        ("tizenwatch", "W-5.0-circle-x86"),
        ("tizenmobile", "M-5.0-x86"),
    ]
    .into_iter()
    .map(|(platform, target)| (platform.to_string(), target.to_string()))
    .collect()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_targets: default_targets(),
            emulator_profile: DEFAULT_EMULATOR_PROFILE.to_string(),
            short_id_platforms: vec!["tizenwatch".into(), "tizenmobile".into()],
            certificate_password: DEFAULT_CERT_PASSWORD.to_string(),
            poll: PollConfig::default(),
        }
    }
}

impl GlobalConfig {
    pub fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(GLOBAL_CONFIG_FILE)
    }

    /// Loads `config.json` from `config_dir`, falling back to defaults when it is
    /// absent. Platforms the file leaves out keep their built-in default target;
    /// environment variables win over the file.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(config_dir);
        let mut cfg = match read_json::<GlobalConfig>(&path)? {
            Some(cfg) => cfg,
            None => {
                debug!("no global config at {}, using defaults", path.display());
                GlobalConfig::default()
            }
        };
        for (platform, target) in default_targets() {
            cfg.default_targets.entry(platform).or_insert(target);
        }
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Some(profile) = read_env_trimmed(EMULATOR_PROFILE_ENV) {
            self.emulator_profile = profile;
        }
        if let Some(attempts) = read_env_trimmed(POLL_ATTEMPTS_ENV).and_then(|v| v.parse().ok()) {
            self.poll.max_attempts = attempts;
        }
        if let Some(interval) = read_env_trimmed(POLL_INTERVAL_ENV).and_then(|v| v.parse().ok()) {
            self.poll.interval_ms = interval;
        }
    }

    pub fn default_target(&self, platform: &str) -> Option<&str> {
        self.default_targets
            .get(platform)
            .map(String::as_str)
            .filter(|target| !target.trim().is_empty())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.poll.max_attempts,
            Duration::from_millis(self.poll.interval_ms),
        )
    }

    pub fn uses_short_id(&self, platform: &str, config: &PlatformConfig) -> bool {
        config
            .run_with_short_id
            .unwrap_or_else(|| self.short_id_platforms.iter().any(|p| p == platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> PlatformConfig {
        PlatformConfig {
            app_name: "Hello".into(),
            id: "ABCDEFG.hello".into(),
            package: "ABCDEFG".into(),
            certificate_profile: "tzkCert".into(),
            ..PlatformConfig::default()
        }
    }

    #[test]
    fn short_id_defaults_follow_platform_list() {
        let global = GlobalConfig::default();
        assert!(global.uses_short_id("tizenwatch", &platform()));
        assert!(global.uses_short_id("tizenmobile", &platform()));
        assert!(!global.uses_short_id("tizen", &platform()));
    }

    #[test]
    fn platform_override_beats_global_list() {
        let global = GlobalConfig::default();
        let forced = PlatformConfig {
            run_with_short_id: Some(true),
            ..platform()
        };
        let disabled = PlatformConfig {
            run_with_short_id: Some(false),
            ..platform()
        };
        assert!(global.uses_short_id("tizen", &forced));
        assert!(!global.uses_short_id("tizenwatch", &disabled));
    }

    #[test]
    fn missing_fields_are_reported() {
        let mut project = ProjectConfig::default();
        project.platforms.insert(
            "tizen".into(),
            PlatformConfig {
                certificate_profile: String::new(),
                ..platform()
            },
        );
        match project.platform("tizen") {
            Err(ConfigError::MissingField { field, .. }) => assert_eq!(field, "certificateProfile"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            project.platform("tizenwatch"),
            Err(ConfigError::UnknownPlatform(_))
        ));
    }

    #[test]
    fn default_poll_policy() {
        let policy = GlobalConfig::default().poll_policy();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.interval, Duration::from_millis(2000));
    }
}
