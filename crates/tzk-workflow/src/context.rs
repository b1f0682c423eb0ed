use std::path::{Path, PathBuf};

use tzk_build::{package_file_name, PlatformLayout, TemplateValues};
use tzk_targets::{PollPolicy, TargetSpec};

use crate::config::{ConfigError, GlobalConfig, ProjectConfig};
use crate::error::{PipelineError, RunFailure, Stage};

/// Everything one run needs to know about the app, the platform and the target.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub platform: String,
    pub app_name: String,
    pub package_id: String,
    pub package: String,
    pub cert_profile: String,
    pub cert_password: String,
    pub run_with_short_id: bool,
    pub web_build: Vec<String>,
    pub layout: PlatformLayout,
    pub config_dir: PathBuf,
    pub target: TargetSpec,
    /// Default emulator for the platform, started when nothing else is usable.
    pub default_target: Option<String>,
    /// Emulator this run started during resolution, if any.
    pub emulator_name: Option<String>,
    pub emulator_profile: String,
    pub poll: PollPolicy,
}

impl PipelineContext {
    pub fn from_config(
        project_dir: &Path,
        project: &ProjectConfig,
        global: &GlobalConfig,
        config_dir: &Path,
        platform: &str,
        target: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let app = project.platform(platform)?;
        let app_id = if project.id.trim().is_empty() {
            app.package.as_str()
        } else {
            project.id.as_str()
        };
        Ok(Self {
            platform: platform.to_string(),
            app_name: app.app_name.clone(),
            package_id: app.id.clone(),
            package: app.package.clone(),
            cert_profile: app.certificate_profile.clone(),
            cert_password: global.certificate_password.clone(),
            run_with_short_id: global.uses_short_id(platform, app),
            web_build: app.web_build.clone(),
            layout: PlatformLayout::new(project_dir, app_id, platform),
            config_dir: config_dir.to_path_buf(),
            target: TargetSpec::parse(target),
            default_target: global.default_target(platform).map(str::to_string),
            emulator_name: None,
            emulator_profile: global.emulator_profile.clone(),
            poll: global.poll_policy(),
        })
    }

    /// Id handed to `run`: the package id, cut at the first `.` when the platform
    /// wants the short form.
    pub fn run_id(&self) -> &str {
        if self.run_with_short_id {
            self.package_id
                .split('.')
                .next()
                .unwrap_or(&self.package_id)
        } else {
            &self.package_id
        }
    }

    pub fn package_file(&self) -> String {
        package_file_name(&self.app_name)
    }

    pub fn template_values(&self) -> TemplateValues<'_> {
        TemplateValues {
            package: &self.package,
            id: &self.package_id,
            app_name: &self.app_name,
        }
    }

    /// Emulator to relaunch when the device drops away mid-run: the requested
    /// target when it names one, otherwise whatever resolution started.
    pub fn recovery_target(&self) -> Option<&str> {
        match &self.target {
            TargetSpec::Identifier(name) => Some(name.as_str()),
            _ => self.emulator_name.as_deref(),
        }
    }

    pub fn global_config_path(&self) -> PathBuf {
        GlobalConfig::path(&self.config_dir)
    }

    pub fn failure(&self, stage: Stage, source: impl Into<PipelineError>) -> RunFailure {
        RunFailure {
            stage,
            platform: self.platform.clone(),
            target: self.target.to_string(),
            source: source.into(),
        }
    }
}
