use std::path::Path;

use tracing::{debug, info};
use tzk_util::{run_tool, ToolFailure};

/// The JS bundling step that runs before `build-web`.
#[allow(async_fn_in_trait)]
pub trait WebBundler {
    async fn bundle(&self, project_root: &Path, command: &[String]) -> Result<(), ToolFailure>;
}

/// Runs the configured command (program followed by its arguments) in the
/// project root.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBundler;

impl WebBundler for CommandBundler {
    async fn bundle(&self, project_root: &Path, command: &[String]) -> Result<(), ToolFailure> {
        let Some((program, args)) = command.split_first() else {
            info!("no web build configured, skipping");
            return Ok(());
        };
        info!("buildWeb:{program} - starting");
        let output = run_tool(Path::new(program), args, Some(project_root)).await?;
        debug!("{}", output.text());
        Ok(())
    }
}
