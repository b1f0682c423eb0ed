use std::path::PathBuf;

use tracing::{info, warn};
use tzk_util::{run_tool, sdk_tool_path, ToolFailure};

use crate::error::TargetError;
use crate::retry::recover_once;

pub const DEFAULT_EMULATOR_PROFILE: &str = "tv-samsung-5.0-x86";

const MISSING_PROFILE_MARKERS: &[&str] = &[
    "does not exist",
    "doesn't exist",
    "no such",
    "not found",
    "cannot find",
    "can't find",
    "is not created",
];

/// Emulator manager: starts and creates virtual devices.
#[allow(async_fn_in_trait)]
pub trait EmulatorControl {
    async fn launch(&self, name: &str) -> Result<String, ToolFailure>;

    async fn create(&self, name: &str, profile: &str) -> Result<String, ToolFailure>;
}

/// `em-cli` from the Tizen SDK emulator tools.
#[derive(Debug, Clone)]
pub struct EmCli {
    path: PathBuf,
}

impl EmCli {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::new(em_cli_path())
    }
}

pub fn em_cli_path() -> PathBuf {
    sdk_tool_path("TZK_EMULATOR_CLI", "tools/emulator/bin/em-cli", "em-cli")
}

impl EmulatorControl for EmCli {
    async fn launch(&self, name: &str) -> Result<String, ToolFailure> {
        let output = run_tool(&self.path, ["launch", "--name", name], None).await?;
        Ok(output.text())
    }

    async fn create(&self, name: &str, profile: &str) -> Result<String, ToolFailure> {
        let output = run_tool(&self.path, ["create", "-n", name, "-p", profile], None).await?;
        Ok(output.text())
    }
}

fn require_name(name: Option<&str>) -> Result<&str, TargetError> {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(TargetError::NoTargetSpecified)
}

/// Whether the emulator manager ran and said the named emulator doesn't exist.
/// A missing or unspawnable `em-cli` never qualifies.
pub fn is_missing_profile(failure: &ToolFailure) -> bool {
    match failure {
        ToolFailure::Exit { .. } => MISSING_PROFILE_MARKERS
            .iter()
            .any(|marker| failure.mentions(marker)),
        ToolFailure::NotFound { .. } | ToolFailure::Io { .. } => false,
    }
}

pub async fn launch_emulator<E: EmulatorControl>(
    control: &E,
    name: Option<&str>,
) -> Result<(), TargetError> {
    let name = require_name(name)?;
    info!("launchEmulator:{name} - starting");
    control
        .launch(name)
        .await
        .map(|_| ())
        .map_err(|source| TargetError::LaunchFailed {
            name: name.to_string(),
            source,
        })
}

pub async fn create_emulator<E: EmulatorControl>(
    control: &E,
    name: &str,
    profile: &str,
) -> Result<(), TargetError> {
    info!("createEmulator:{name}:{profile} - starting");
    control
        .create(name, profile)
        .await
        .map(|_| ())
        .map_err(|source| TargetError::CreateFailed {
            name: name.to_string(),
            source,
        })
}

/// Launches `name`, creating it from `profile` first when the emulator manager
/// reports it doesn't exist. Create and the second launch happen at most once.
pub async fn launch_or_create<E: EmulatorControl>(
    control: &E,
    name: Option<&str>,
    profile: &str,
) -> Result<(), TargetError> {
    let name = require_name(name)?;
    recover_once(
        name.to_string(),
        move |name: String| async move { launch_emulator(control, Some(&name)).await },
        |err: &TargetError| {
            matches!(err, TargetError::LaunchFailed { source, .. } if is_missing_profile(source))
        },
        move |name: String, err: TargetError| async move {
            warn!("{err}; creating it from profile {profile}");
            create_emulator(control, &name, profile).await?;
            Ok(name)
        },
    )
    .await
}
