//! The launch pipeline: Configure, BuildWeb, Build, Package, Uninstall, Install
//! and Run against a resolved device, with one emulator recovery per run.

use std::{
    cell::Cell,
    path::{Path, PathBuf},
};

use tracing::info;
use tzk_build::{
    configure_project, ensure_author_certificate, is_device_missing, is_not_installed,
    CommandBundler, PlatformTool, TizenCli, WebBundler,
};
use tzk_targets::{
    launch_emulator, recover_once, wait_ready, CancelToken, Clock, DeviceBridge, EmCli,
    EmulatorControl, PollOutcome, ResolutionResult, Sdb, TargetError, TokioClock,
};

use crate::context::PipelineContext;
use crate::error::{PipelineError, RunFailure, Stage};
use crate::log::RunLog;

/// The external tools one run talks to.
#[derive(Debug, Clone)]
pub struct Toolbox<B, E, T, W, C> {
    pub bridge: B,
    pub emulator: E,
    pub tool: T,
    pub bundler: W,
    pub clock: C,
}

pub type SdkToolbox = Toolbox<Sdb, EmCli, TizenCli, CommandBundler, TokioClock>;

impl SdkToolbox {
    pub fn from_env() -> Self {
        Toolbox {
            bridge: Sdb::from_env(),
            emulator: EmCli::from_env(),
            tool: TizenCli::from_env(),
            bundler: CommandBundler,
            clock: TokioClock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub device_id: String,
    pub package: PathBuf,
    /// Id the app was started with.
    pub run_id: String,
    pub recovered: bool,
}

pub(crate) fn checkpoint(
    ctx: &PipelineContext,
    cancel: &CancelToken,
    stage: Stage,
) -> Result<(), RunFailure> {
    if cancel.is_cancelled() {
        return Err(ctx.failure(stage, PipelineError::Cancelled));
    }
    Ok(())
}

/// Waits for emulator `name` to come up, reporting failures against `stage`.
pub(crate) async fn wait_for<B: DeviceBridge, C: Clock>(
    bridge: &B,
    clock: &C,
    ctx: &PipelineContext,
    cancel: &CancelToken,
    name: &str,
    stage: Stage,
) -> Result<ResolutionResult, RunFailure> {
    match wait_ready(bridge, clock, name, ctx.poll, cancel).await {
        Ok(PollOutcome::Ready(result)) => Ok(result),
        Ok(PollOutcome::Cancelled) => Err(ctx.failure(stage, PipelineError::Cancelled)),
        Err(err) => Err(ctx.failure(stage, err)),
    }
}

/// Configure through Package. Returns the output directory holding the package.
pub async fn build_package<B, E, T, W, C>(
    tools: &Toolbox<B, E, T, W, C>,
    ctx: &PipelineContext,
    cancel: &CancelToken,
    log: &mut RunLog,
) -> Result<PathBuf, RunFailure>
where
    T: PlatformTool,
    W: WebBundler,
{
    checkpoint(ctx, cancel, Stage::Configure)?;
    log.task(&format!("configure:{}", ctx.platform));
    if ensure_author_certificate(
        &tools.tool,
        &ctx.config_dir,
        &ctx.cert_profile,
        &ctx.cert_password,
    )
    .await
    {
        info!("registered developer certificate as {}", ctx.cert_profile);
    }
    let app_dir = configure_project(&ctx.layout, &ctx.template_values())
        .map_err(|err| ctx.failure(Stage::Configure, err))?;

    checkpoint(ctx, cancel, Stage::BuildWeb)?;
    log.task("buildWeb");
    tools
        .bundler
        .bundle(ctx.layout.root(), &ctx.web_build)
        .await
        .map_err(|err| ctx.failure(Stage::BuildWeb, PipelineError::step(Stage::BuildWeb, err)))?;

    let build_dir = ctx.layout.build_dir();
    checkpoint(ctx, cancel, Stage::Build)?;
    log.task("build");
    tools
        .tool
        .build_web(&app_dir, &build_dir)
        .await
        .map_err(|err| ctx.failure(Stage::Build, PipelineError::step(Stage::Build, err)))?;

    let output_dir = ctx.layout.output_dir();
    checkpoint(ctx, cancel, Stage::Package)?;
    log.task("package");
    tools
        .tool
        .package(&build_dir, &ctx.cert_profile, &output_dir)
        .await
        .map_err(|err| ctx.failure(Stage::Package, PipelineError::step(Stage::Package, err)))?;

    Ok(output_dir)
}

/// One deployment to a resolved device.
pub struct Pipeline<'a, B, E, T, W, C> {
    tools: &'a Toolbox<B, E, T, W, C>,
    ctx: &'a PipelineContext,
    cancel: &'a CancelToken,
    device: ResolutionResult,
    recovered: bool,
}

impl<'a, B, E, T, W, C> Pipeline<'a, B, E, T, W, C>
where
    B: DeviceBridge,
    E: EmulatorControl,
    T: PlatformTool,
    W: WebBundler,
    C: Clock,
{
    pub fn new(
        tools: &'a Toolbox<B, E, T, W, C>,
        ctx: &'a PipelineContext,
        cancel: &'a CancelToken,
        device: ResolutionResult,
    ) -> Self {
        Self {
            tools,
            ctx,
            cancel,
            device,
            recovered: false,
        }
    }

    pub async fn run(mut self, log: &mut RunLog) -> Result<RunReport, RunFailure> {
        let output_dir = build_package(self.tools, self.ctx, self.cancel, log).await?;
        self.uninstall(log).await?;
        self.install(&output_dir, log).await?;
        self.launch(log).await?;
        Ok(RunReport {
            device_id: self.device.device_id().to_string(),
            package: output_dir.join(self.ctx.package_file()),
            run_id: self.ctx.run_id().to_string(),
            recovered: self.recovered,
        })
    }

    async fn uninstall(&mut self, log: &mut RunLog) -> Result<(), RunFailure> {
        let ctx = self.ctx;
        checkpoint(ctx, self.cancel, Stage::Uninstall)?;
        log.task(&format!("uninstall:{}", ctx.package_id));
        let failure = match self
            .tools
            .tool
            .uninstall(&ctx.package_id, self.device.device_id())
            .await
        {
            Ok(_) => return Ok(()),
            Err(failure) => failure,
        };

        if is_device_missing(&failure) && self.can_recover() {
            self.recovered = true;
            self.device = self.relaunch(log).await?;
            Ok(())
        } else if is_not_installed(&failure) {
            log.warn(format!(
                "{} is not installed on {}, continuing",
                ctx.package_id,
                self.device.device_id()
            ));
            Ok(())
        } else {
            Err(ctx.failure(
                Stage::Uninstall,
                PipelineError::step(Stage::Uninstall, failure),
            ))
        }
    }

    async fn install_on(
        &self,
        output_dir: &Path,
        device: ResolutionResult,
    ) -> Result<ResolutionResult, RunFailure> {
        let ctx = self.ctx;
        self.tools
            .tool
            .install(output_dir, &ctx.package_file(), device.device_id())
            .await
            .map_err(|err| ctx.failure(Stage::Install, PipelineError::step(Stage::Install, err)))?;
        Ok(device)
    }

    async fn install(
        &mut self,
        output_dir: &Path,
        log: &mut RunLog,
    ) -> Result<(), RunFailure> {
        checkpoint(self.ctx, self.cancel, Stage::Install)?;
        log.task("install");
        let may_recover = self.can_recover();
        let recovering = Cell::new(false);
        let this = &*self;

        let device = recover_once(
            this.device.clone(),
            move |device| this.install_on(output_dir, device),
            |failure: &RunFailure| may_recover && !failure.is_cancelled(),
            |_, failure: RunFailure| {
                recovering.set(true);
                async move {
                    log.error(failure.source.to_string());
                    this.relaunch(log).await
                }
            },
        )
        .await?;

        self.recovered |= recovering.get();
        self.device = device;
        Ok(())
    }

    /// Recovery is spent once per run and needs an emulator to relaunch; without
    /// one the step's own failure is what gets reported.
    fn can_recover(&self) -> bool {
        !self.recovered && self.ctx.recovery_target().is_some()
    }

    async fn relaunch(&self, log: &mut RunLog) -> Result<ResolutionResult, RunFailure> {
        let ctx = self.ctx;
        checkpoint(ctx, self.cancel, Stage::Recover)?;
        log.warn(format!(
            "looks like there is no emulator or device connected, trying to launch it \
             (tzk target launch -p {} -t {})",
            ctx.platform, ctx.target
        ));
        let name = ctx
            .recovery_target()
            .ok_or_else(|| ctx.failure(Stage::Recover, TargetError::NoTargetSpecified))?;
        log.task(&format!("recover:{name}"));
        launch_emulator(&self.tools.emulator, Some(name))
            .await
            .map_err(|err| ctx.failure(Stage::Recover, err))?;
        wait_for(
            &self.tools.bridge,
            &self.tools.clock,
            ctx,
            self.cancel,
            name,
            Stage::Recover,
        )
        .await
    }

    async fn launch(&self, log: &mut RunLog) -> Result<(), RunFailure> {
        let ctx = self.ctx;
        checkpoint(ctx, self.cancel, Stage::Run)?;
        log.task(&format!("run:{}", ctx.run_id()));
        self.tools
            .tool
            .run(ctx.run_id(), self.device.device_id())
            .await
            .map_err(|err| ctx.failure(Stage::Run, PipelineError::step(Stage::Run, err)))?;
        Ok(())
    }
}
