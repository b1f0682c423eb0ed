use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Serialize;

mod tool;

pub use tool::{format_tool_output, run_tool, ToolFailure, ToolOutput};

pub const CONFIG_DIR_ENV: &str = "TZK_CONFIG_DIR";
pub const DATA_DIR_ENV: &str = "TZK_DATA_DIR";

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Directory holding the global `config.json` and the developer certificate.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = read_env_trimmed(CONFIG_DIR_ENV) {
        return expand_user(&dir);
    }
    match home_dir() {
        Some(home) => home.join(".config/tzk"),
        None => PathBuf::from("/tmp/tzk/config"),
    }
}

pub fn data_dir() -> PathBuf {
    if let Some(dir) = read_env_trimmed(DATA_DIR_ENV) {
        return expand_user(&dir);
    }
    match home_dir() {
        Some(home) => home.join(".local/share/tzk"),
        None => PathBuf::from("/tmp/tzk"),
    }
}

pub fn state_dir() -> PathBuf {
    data_dir().join("state")
}

pub fn state_file_path(file_name: &str) -> PathBuf {
    state_dir().join(file_name)
}

pub fn expand_user(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = home_dir() {
            let rest = path.strip_prefix("~/").unwrap_or("");
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

pub fn read_env_trimmed(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Looks a program up on `PATH` (or takes it as-is when it already contains a separator).
pub fn find_command(cmd: &str) -> Option<PathBuf> {
    if cmd.contains('/') {
        let path = PathBuf::from(cmd);
        return path.is_file().then_some(path);
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| candidate.is_file())
}

pub fn tizen_sdk_home() -> Option<PathBuf> {
    for key in ["TIZEN_SDK_HOME", "TIZEN_STUDIO_HOME"] {
        if let Some(dir) = read_env_trimmed(key) {
            return Some(expand_user(&dir));
        }
    }
    let candidate = home_dir()?.join("tizen-studio");
    candidate.is_dir().then_some(candidate)
}

/// Resolves an SDK tool: explicit env override, then the SDK install, then `PATH`.
pub fn sdk_tool_path(env_key: &str, sdk_relative: &str, program: &str) -> PathBuf {
    if let Some(path) = read_env_trimmed(env_key) {
        return expand_user(&path);
    }
    if let Some(sdk) = tizen_sdk_home() {
        let candidate = sdk.join(sdk_relative);
        if candidate.is_file() {
            return candidate;
        }
    }
    find_command(program).unwrap_or_else(|| PathBuf::from(program))
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Renders an elapsed duration as `0h:2m:5s:120ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hrs = total_secs / 3600;
    format!("{hrs}h:{mins}m:{secs}s:{ms}ms")
}

pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .init();
    Ok(())
}
