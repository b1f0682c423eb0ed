use std::{fmt, path::PathBuf};

use serde::Serialize;
use tzk_build::ConfigureError;
use tzk_targets::TargetError;
use tzk_util::ToolFailure;

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Resolve,
    Configure,
    BuildWeb,
    Build,
    Package,
    Uninstall,
    Install,
    Recover,
    Run,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Configure => "configure",
            Stage::BuildWeb => "build-web",
            Stage::Build => "build",
            Stage::Package => "package",
            Stage::Uninstall => "uninstall",
            Stage::Install => "install",
            Stage::Recover => "recover",
            Stage::Run => "run",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Configure(#[from] ConfigureError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{stage} step failed: {source}")]
    StepFailed {
        stage: Stage,
        #[source]
        source: ToolFailure,
    },
    #[error(
        "could not find the requested target and could not start an emulator automatically \
         ({source}); create one and set it as the default target in {}",
        .config_path.display()
    )]
    EmulatorSetup {
        config_path: PathBuf,
        #[source]
        source: TargetError,
    },
    #[error("no device available and no emulator started")]
    NoDeviceAvailable,
    #[error("prompt failed: {0}")]
    Prompt(String),
    #[error("cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn step(stage: Stage, source: ToolFailure) -> Self {
        PipelineError::StepFailed { stage, source }
    }
}

/// Terminal outcome of a failed run.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed for {platform} on {target}: {source}")]
pub struct RunFailure {
    pub stage: Stage,
    pub platform: String,
    pub target: String,
    #[source]
    pub source: PipelineError,
}

impl RunFailure {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.source, PipelineError::Cancelled)
    }
}
