//! Entry points behind the CLI commands.

use std::path::PathBuf;

use tracing::info;
use tzk_build::{PlatformTool, WebBundler};
use tzk_targets::{
    connect_target, find_connected, launch_emulator, launch_or_create, list_devices, resolve,
    wait_ready, CancelToken, Clock, Device, DeviceBridge, EmulatorControl, PollOutcome,
    PollPolicy, Resolution, ResolutionResult, TargetError,
};

use crate::config::ConfigError;
use crate::context::PipelineContext;
use crate::error::{PipelineError, RunFailure, Stage};
use crate::log::RunLog;
use crate::pipeline::{build_package, checkpoint, wait_for, Pipeline, RunReport, Toolbox};
use crate::prompt::Prompter;

/// Resolves a device for `ctx.target` and deploys the app to it.
pub async fn run_app<B, E, T, W, C, P>(
    tools: &Toolbox<B, E, T, W, C>,
    ctx: &mut PipelineContext,
    prompter: &P,
    cancel: &CancelToken,
    log: &mut RunLog,
) -> Result<RunReport, RunFailure>
where
    B: DeviceBridge,
    E: EmulatorControl,
    T: PlatformTool,
    W: WebBundler,
    C: Clock,
    P: Prompter,
{
    let device = resolve_device(tools, ctx, prompter, cancel, log).await?;
    info!("deploying to {}", device.device_id());
    Pipeline::new(tools, ctx, cancel, device).run(log).await
}

/// Configure through Package without touching any device. Returns the package path.
pub async fn build_app<B, E, T, W, C>(
    tools: &Toolbox<B, E, T, W, C>,
    ctx: &PipelineContext,
    cancel: &CancelToken,
    log: &mut RunLog,
) -> Result<PathBuf, RunFailure>
where
    T: PlatformTool,
    W: WebBundler,
{
    let output_dir = build_package(tools, ctx, cancel, log).await?;
    Ok(output_dir.join(ctx.package_file()))
}

pub async fn list_targets<B: DeviceBridge>(bridge: &B) -> Result<Vec<Device>, TargetError> {
    list_devices(bridge).await
}

/// Table printed by `tzk target list`.
pub fn format_targets(devices: &[Device]) -> String {
    if devices.is_empty() {
        return "No devices found".to_string();
    }
    let width = devices.iter().map(|d| d.id.len()).max().unwrap_or(0);
    devices
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{:>2}. {:<width$}  {}  {}", i + 1, d.id, d.name, d.kind))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Launches (creating if needed) emulator `name` and waits for it to boot.
pub async fn launch_target<B, E, C>(
    bridge: &B,
    emulator: &E,
    clock: &C,
    name: Option<&str>,
    profile: &str,
    policy: PollPolicy,
    cancel: &CancelToken,
) -> Result<PollOutcome<ResolutionResult>, TargetError>
where
    B: DeviceBridge,
    E: EmulatorControl,
    C: Clock,
{
    launch_or_create(emulator, name, profile).await?;
    let name = name.map(str::trim).unwrap_or_default();
    wait_ready(bridge, clock, name, policy, cancel).await
}

/// Turns the requested target into a device, connecting, prompting or starting an
/// emulator as needed.
pub async fn resolve_device<B, E, T, W, C, P>(
    tools: &Toolbox<B, E, T, W, C>,
    ctx: &mut PipelineContext,
    prompter: &P,
    cancel: &CancelToken,
    log: &mut RunLog,
) -> Result<ResolutionResult, RunFailure>
where
    B: DeviceBridge,
    E: EmulatorControl,
    C: Clock,
    P: Prompter,
{
    let stage = Stage::Resolve;
    checkpoint(ctx, cancel, stage)?;
    log.task(&format!("resolve:{}", ctx.target));
    let devices = list_devices(&tools.bridge)
        .await
        .map_err(|err| ctx.failure(stage, err))?;

    match resolve(&ctx.target, &devices) {
        Resolution::Resolved(result) => Ok(result),
        Resolution::NeedsConnect(address) => {
            match connect_and_match(&tools.bridge, &address).await {
                Ok(result) => Ok(result),
                Err(err) => {
                    log.warn(err.to_string());
                    offer_emulator(tools, ctx, prompter, cancel, log).await
                }
            }
        }
        Resolution::NeedsChoice(devices) => {
            let index = prompter
                .choose_device(&devices)
                .map_err(|err| ctx.failure(stage, err))?;
            devices
                .get(index)
                .map(ResolutionResult::from_device)
                .ok_or_else(|| {
                    ctx.failure(stage, TargetError::DeviceNotFound(format!("choice {index}")))
                })
        }
        Resolution::NeedsEmulator(Some(name)) => {
            match start_emulator(tools, ctx, cancel, &name, log).await {
                Ok(result) => {
                    ctx.emulator_name = Some(name);
                    Ok(result)
                }
                Err(failure) if failure.is_cancelled() => Err(failure),
                Err(failure) => {
                    log.warn(failure.source.to_string());
                    offer_emulator(tools, ctx, prompter, cancel, log).await
                }
            }
        }
        Resolution::NeedsEmulator(None) => offer_emulator(tools, ctx, prompter, cancel, log).await,
    }
}

async fn connect_and_match<B: DeviceBridge>(
    bridge: &B,
    address: &str,
) -> Result<ResolutionResult, TargetError> {
    connect_target(bridge, address).await?;
    let devices = list_devices(bridge).await?;
    find_connected(&devices, address)
        .map(ResolutionResult::from_device)
        .ok_or_else(|| TargetError::DeviceNotFound(address.to_string()))
}

async fn start_emulator<B, E, T, W, C>(
    tools: &Toolbox<B, E, T, W, C>,
    ctx: &PipelineContext,
    cancel: &CancelToken,
    name: &str,
    log: &RunLog,
) -> Result<ResolutionResult, RunFailure>
where
    B: DeviceBridge,
    E: EmulatorControl,
    C: Clock,
{
    log.task(&format!("launch:{name}"));
    launch_emulator(&tools.emulator, Some(name))
        .await
        .map_err(|err| ctx.failure(Stage::Resolve, err))?;
    wait_for(&tools.bridge, &tools.clock, ctx, cancel, name, Stage::Resolve).await
}

/// Last resort: ask to start the platform's default emulator.
async fn offer_emulator<B, E, T, W, C, P>(
    tools: &Toolbox<B, E, T, W, C>,
    ctx: &mut PipelineContext,
    prompter: &P,
    cancel: &CancelToken,
    log: &mut RunLog,
) -> Result<ResolutionResult, RunFailure>
where
    B: DeviceBridge,
    E: EmulatorControl,
    C: Clock,
    P: Prompter,
{
    let stage = Stage::Resolve;
    let start = prompter
        .confirm_emulator(&ctx.target)
        .map_err(|err| ctx.failure(stage, err))?;
    if !start {
        return Err(ctx.failure(stage, PipelineError::NoDeviceAvailable));
    }

    let Some(name) = ctx.default_target.clone() else {
        let missing = ConfigError::NoDefaultTarget {
            platform: ctx.platform.clone(),
            path: ctx.global_config_path(),
        };
        return Err(ctx.failure(stage, missing));
    };
    log.task(&format!("launch:{name}"));
    launch_or_create(&tools.emulator, Some(&name), &ctx.emulator_profile)
        .await
        .map_err(|source| {
            ctx.failure(
                stage,
                PipelineError::EmulatorSetup {
                    config_path: ctx.global_config_path(),
                    source,
                },
            )
        })?;
    let result = wait_for(&tools.bridge, &tools.clock, ctx, cancel, &name, stage).await?;
    ctx.emulator_name = Some(name);
    Ok(result)
}
