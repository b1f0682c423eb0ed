use std::{ffi::OsStr, io, path::Path, process::Stdio};

use tokio::process::Command;
use tracing::debug;

/// Captured output of a tool that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// stdout followed by stderr, for callers that scan the whole response.
    pub fn text(&self) -> String {
        let mut out = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(stderr);
        }
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolFailure {
    #[error("{program} not found (install it or point the matching TZK_* variable at it)")]
    NotFound { program: String },
    #[error("{program} failed: {message}")]
    Io { program: String, message: String },
    #[error("{}", exit_message(program, *status, stdout, stderr))]
    Exit {
        program: String,
        status: i32,
        stdout: String,
        stderr: String,
    },
}

impl ToolFailure {
    pub fn exit(program: impl Into<String>, status: i32, stdout: &str, stderr: &str) -> Self {
        Self::Exit {
            program: program.into(),
            status,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    /// Everything the tool said, used when classifying a failure.
    pub fn detail(&self) -> String {
        match self {
            ToolFailure::NotFound { program } => format!("{program} not found"),
            ToolFailure::Io { message, .. } => message.clone(),
            ToolFailure::Exit { stdout, stderr, .. } => format!("{stdout}\n{stderr}"),
        }
    }

    /// Case-insensitive search over [`ToolFailure::detail`].
    pub fn mentions(&self, needle: &str) -> bool {
        self.detail()
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ToolFailure::NotFound { .. })
    }
}

pub fn format_tool_output(stdout: &str, stderr: &str) -> String {
    let stdout = stdout.trim();
    let stderr = stderr.trim();
    let mut out = String::new();

    if !stdout.is_empty() {
        out.push_str("stdout:\n");
        out.push_str(stdout);
        out.push('\n');
    }
    if !stderr.is_empty() {
        out.push_str("stderr:\n");
        out.push_str(stderr);
        out.push('\n');
    }

    out
}

fn exit_message(program: &str, status: i32, stdout: &str, stderr: &str) -> String {
    let detail = format_tool_output(stdout, stderr);
    if detail.trim().is_empty() {
        format!("{program} failed with exit {status}")
    } else {
        format!("{program} failed with exit {status}: {}", detail.trim())
    }
}

fn program_label(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}

/// Runs an external tool to completion and captures its output.
///
/// A non-zero exit becomes [`ToolFailure::Exit`] carrying both streams, so callers can
/// classify the failure by what the tool printed.
pub async fn run_tool<I, S>(
    program: &Path,
    args: I,
    cwd: Option<&Path>,
) -> Result<ToolOutput, ToolFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let label = program_label(program);
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    debug!("running {:?}", cmd.as_std());

    let output = cmd.output().await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ToolFailure::NotFound {
                program: label.clone(),
            }
        } else {
            ToolFailure::Io {
                program: label.clone(),
                message: e.to_string(),
            }
        }
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if output.status.success() {
        Ok(ToolOutput { stdout, stderr })
    } else {
        Err(ToolFailure::Exit {
            program: label,
            status: output.status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}
