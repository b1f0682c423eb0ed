//! Run orchestration for `tzk`: configuration, target resolution, the launch
//! pipeline and the per-run log.

pub mod config;
pub mod context;
pub mod error;
pub mod log;
pub mod orchestrate;
pub mod pipeline;
pub mod prompt;

pub use config::{ConfigError, GlobalConfig, PlatformConfig, PollConfig, ProjectConfig};
pub use context::PipelineContext;
pub use error::{PipelineError, RunFailure, Stage};
pub use log::{Outcome, RunLog, RunRecord, RunStatus};
pub use orchestrate::{
    build_app, format_targets, launch_target, list_targets, resolve_device, run_app,
};
pub use pipeline::{build_package, Pipeline, RunReport, SdkToolbox, Toolbox};
pub use prompt::{device_label, NonInteractive, PromptError, Prompter};
