//! Per-run log context: task lines, the notable messages worth repeating at the
//! end, and the persisted record of the last run.

use std::{
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use serde::Serialize;
use tracing::{error, info, warn};
use tzk_util::{format_elapsed, now_millis, state_file_path, write_json_atomic};
use uuid::Uuid;

use crate::error::{RunFailure, Stage};

pub const LAST_RUN_FILE: &str = "last-run.json";

#[derive(Debug)]
pub struct RunLog {
    run_id: String,
    command: String,
    started: Instant,
    started_at: i64,
    messages: Vec<String>,
}

impl RunLog {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            run_id: format!("run-{}", Uuid::new_v4()),
            command: command.into(),
            started: Instant::now(),
            started_at: now_millis(),
            messages: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn task(&self, name: &str) {
        info!(run_id = %self.run_id, "{name} - starting");
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(run_id = %self.run_id, "{message}");
        self.remember(message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!(run_id = %self.run_id, "{message}");
        self.remember(message);
    }

    fn remember(&mut self, message: String) {
        if !self.messages.contains(&message) {
            self.messages.push(message);
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn finish(&self, platform: &str, target: &str, outcome: Outcome<'_>) -> RunRecord {
        let (status, device_id, stage, error) = match outcome {
            Outcome::Success { device_id } => {
                (RunStatus::Success, device_id.map(str::to_string), None, None)
            }
            Outcome::Failure(failure) => {
                let status = if failure.is_cancelled() {
                    RunStatus::Cancelled
                } else {
                    RunStatus::Failed
                };
                (status, None, Some(failure.stage), Some(failure.source.to_string()))
            }
        };
        RunRecord {
            run_id: self.run_id.clone(),
            command: self.command.clone(),
            platform: platform.to_string(),
            target: target.to_string(),
            device_id,
            status,
            stage,
            error,
            messages: self.messages.clone(),
            started_at: self.started_at,
            finished_at: now_millis(),
            elapsed_ms: self.elapsed().as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Success { device_id: Option<&'a str> },
    Failure(&'a RunFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub run_id: String,
    pub command: String,
    pub platform: String,
    pub target: String,
    pub device_id: Option<String>,
    pub status: RunStatus,
    pub stage: Option<Stage>,
    pub error: Option<String>,
    pub messages: Vec<String>,
    pub started_at: i64,
    pub finished_at: i64,
    pub elapsed_ms: u64,
}

impl RunRecord {
    pub fn default_path() -> PathBuf {
        state_file_path(LAST_RUN_FILE)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        write_json_atomic(path, self)
    }

    /// End-of-run summary printed by the CLI.
    pub fn summary(&self) -> String {
        let mut out = format!("tzk {}\n", self.command);
        out.push_str(&format!("  platform: {}\n", self.platform));
        out.push_str(&format!("  target: {}\n", self.target));
        if let Some(device) = &self.device_id {
            out.push_str(&format!("  device: {device}\n"));
        }
        let status = match self.status {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        };
        match &self.stage {
            Some(stage) => out.push_str(&format!("  result: {status} at {stage}\n")),
            None => out.push_str(&format!("  result: {status}\n")),
        }
        if let Some(error) = &self.error {
            out.push_str(&format!("  error: {error}\n"));
        }
        out.push_str(&format!(
            "  executed in: {}\n",
            format_elapsed(Duration::from_millis(self.elapsed_ms))
        ));
        if !self.messages.is_empty() {
            out.push_str("  messages:\n");
            for message in &self.messages {
                out.push_str(&format!("    - {message}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn repeated_messages_are_kept_once() {
        let mut log = RunLog::new("run");
        log.warn("uninstall skipped");
        log.warn("uninstall skipped");
        log.error("install failed");
        assert_eq!(log.messages(), ["uninstall skipped", "install failed"]);
        assert!(log.run_id().starts_with("run-"));
    }

    #[test]
    fn failure_record_carries_stage_and_error() {
        let mut log = RunLog::new("run");
        log.warn("device dropped");
        let failure = RunFailure {
            stage: Stage::Install,
            platform: "tizen".into(),
            target: "T-samsung-5.0-x86".into(),
            source: PipelineError::NoDeviceAvailable,
        };
        let record = log.finish("tizen", "T-samsung-5.0-x86", Outcome::Failure(&failure));

        assert_eq!(record.status, RunStatus::Failed);
        assert_eq!(record.stage, Some(Stage::Install));
        let summary = record.summary();
        assert!(summary.contains("result: failed at install"));
        assert!(summary.contains("    - device dropped"));
        assert!(summary.contains("executed in: 0h:0m:"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["stage"], "install");
        assert_eq!(json["status"], "failed");
    }

    #[test]
    fn record_is_saved_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join(LAST_RUN_FILE);
        let log = RunLog::new("build");
        let record = log.finish(
            "tizenwatch",
            "<none>",
            Outcome::Success {
                device_id: Some("W-5.0-circle-x86"),
            },
        );
        record.save(&path).unwrap();

        let data = std::fs::read_to_string(&path).unwrap();
        assert!(data.contains("\"deviceId\": \"W-5.0-circle-x86\""));
        assert!(data.contains("\"status\": \"success\""));
    }
}
