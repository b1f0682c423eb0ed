mod prompt;

use std::{
    io::IsTerminal,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::warn;
use tzk_targets::{cancel_pair, CancelHandle, CancelToken, EmCli, PollOutcome, Sdb, TokioClock};
use tzk_util::{config_dir, init_tracing};
use tzk_workflow::{
    build_app, format_targets, launch_target, list_targets, run_app, GlobalConfig, Outcome,
    PipelineContext, ProjectConfig, RunLog, RunRecord, RunStatus, SdkToolbox,
};

use crate::prompt::CliPrompter;

const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "tzk", version, about = "Build, deploy and run Tizen web apps")]
struct Cli {
    /// Verbose output
    #[arg(long, global = true)]
    info: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Build, install and run the app on a device or emulator
    Run {
        #[arg(short, long)]
        platform: String,
        /// Device id, device name, IP address or emulator name
        #[arg(short, long)]
        target: Option<String>,
        /// Project root (defaults to the current directory)
        #[arg(long)]
        project: Option<PathBuf>,
    },
    /// Configure, build and package the app
    Build {
        #[arg(short, long)]
        platform: String,
        #[arg(long)]
        project: Option<PathBuf>,
    },
    /// Device and emulator commands
    Target {
        #[command(subcommand)]
        cmd: TargetCmd,
    },
}

#[derive(Subcommand)]
enum TargetCmd {
    /// List connected devices and running emulators
    List,
    /// Launch an emulator (creating it if needed) and wait for it to boot
    Launch {
        #[arg(short, long)]
        platform: String,
        /// Emulator name (defaults to the platform's default target)
        #[arg(short, long)]
        target: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.info) {
        eprintln!("failed to initialise logging: {err}");
    }

    let (handle, token) = cancel_pair();
    spawn_interrupt_watcher(handle);

    match dispatch(cli.cmd, &token).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn spawn_interrupt_watcher(handle: CancelHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping after the current step");
            handle.cancel();
        }
    });
}

async fn dispatch(cmd: Cmd, cancel: &CancelToken) -> anyhow::Result<ExitCode> {
    match cmd {
        Cmd::Run {
            platform,
            target,
            project,
        } => run_command(&platform, target.as_deref(), project, cancel).await,
        Cmd::Build { platform, project } => build_command(&platform, project, cancel).await,
        Cmd::Target { cmd: TargetCmd::List } => {
            let devices = list_targets(&Sdb::from_env()).await?;
            println!("{}", format_targets(&devices));
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Target {
            cmd: TargetCmd::Launch { platform, target },
        } => launch_command(&platform, target, cancel).await,
    }
}

fn project_root(project: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match project {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("can't determine the current directory"),
    }
}

fn load_context(
    project_dir: &Path,
    platform: &str,
    target: Option<&str>,
) -> anyhow::Result<PipelineContext> {
    let config_dir = config_dir();
    let project = ProjectConfig::load(project_dir)?;
    let global = GlobalConfig::load(&config_dir)?;
    let ctx =
        PipelineContext::from_config(project_dir, &project, &global, &config_dir, platform, target)?;
    Ok(ctx)
}

fn finish(record: &RunRecord) -> ExitCode {
    eprint!("{}", record.summary());
    let path = RunRecord::default_path();
    if let Err(err) = record.save(&path) {
        warn!("failed to save {}: {err}", path.display());
    }
    match record.status {
        RunStatus::Success => ExitCode::SUCCESS,
        RunStatus::Cancelled => ExitCode::from(EXIT_CANCELLED),
        RunStatus::Failed => ExitCode::FAILURE,
    }
}

async fn run_command(
    platform: &str,
    target: Option<&str>,
    project: Option<PathBuf>,
    cancel: &CancelToken,
) -> anyhow::Result<ExitCode> {
    let project_dir = project_root(project)?;
    let mut ctx = load_context(&project_dir, platform, target)?;
    let tools = SdkToolbox::from_env();
    let prompter = CliPrompter::new(std::io::stdin().is_terminal());
    let mut log = RunLog::new(format!("run -p {platform}"));

    let result = run_app(&tools, &mut ctx, &prompter, cancel, &mut log).await;
    let target = ctx.target.to_string();
    let record = match &result {
        Ok(report) => {
            println!("{} running on {}", report.run_id, report.device_id);
            log.finish(
                platform,
                &target,
                Outcome::Success {
                    device_id: Some(&report.device_id),
                },
            )
        }
        Err(failure) => log.finish(platform, &target, Outcome::Failure(failure)),
    };
    Ok(finish(&record))
}

async fn build_command(
    platform: &str,
    project: Option<PathBuf>,
    cancel: &CancelToken,
) -> anyhow::Result<ExitCode> {
    let project_dir = project_root(project)?;
    let ctx = load_context(&project_dir, platform, None)?;
    let tools = SdkToolbox::from_env();
    let mut log = RunLog::new(format!("build -p {platform}"));

    let result = build_app(&tools, &ctx, cancel, &mut log).await;
    let record = match &result {
        Ok(package) => {
            println!("package: {}", package.display());
            log.finish(platform, "<none>", Outcome::Success { device_id: None })
        }
        Err(failure) => log.finish(platform, "<none>", Outcome::Failure(failure)),
    };
    Ok(finish(&record))
}

async fn launch_command(
    platform: &str,
    target: Option<String>,
    cancel: &CancelToken,
) -> anyhow::Result<ExitCode> {
    let global = GlobalConfig::load(&config_dir())?;
    let Some(name) = target.or_else(|| global.default_target(platform).map(str::to_string)) else {
        bail!("no target given and no default target for {platform}; pass -t <name>");
    };

    let outcome = launch_target(
        &Sdb::from_env(),
        &EmCli::from_env(),
        &TokioClock,
        Some(&name),
        &global.emulator_profile,
        global.poll_policy(),
        cancel,
    )
    .await?;
    match outcome {
        PollOutcome::Ready(result) => {
            println!("{name} is ready as {}", result.device_id());
            Ok(ExitCode::SUCCESS)
        }
        PollOutcome::Cancelled => Ok(ExitCode::from(EXIT_CANCELLED)),
    }
}
