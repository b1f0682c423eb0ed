use std::path::PathBuf;

use tracing::info;
use tzk_util::{run_tool, sdk_tool_path, ToolFailure};

use crate::error::TargetError;

const CONNECT_FAILED_MARKER: &str = "failed to connect to remote target";

/// The device bridge: enumerates devices and opens network connections to them.
#[allow(async_fn_in_trait)]
pub trait DeviceBridge {
    async fn connect(&self, address: &str) -> Result<String, ToolFailure>;

    /// Raw tabular device listing.
    async fn devices(&self) -> Result<String, ToolFailure>;
}

/// `sdb`, the Tizen smart development bridge.
#[derive(Debug, Clone)]
pub struct Sdb {
    path: PathBuf,
}

impl Sdb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::new(sdb_path())
    }
}

pub fn sdb_path() -> PathBuf {
    sdk_tool_path("TZK_SDB_PATH", "tools/sdb", "sdb")
}

impl DeviceBridge for Sdb {
    async fn connect(&self, address: &str) -> Result<String, ToolFailure> {
        let output = run_tool(&self.path, ["connect", address], None).await?;
        Ok(output.text())
    }

    async fn devices(&self) -> Result<String, ToolFailure> {
        let output = run_tool(&self.path, ["devices"], None).await?;
        Ok(output.stdout)
    }
}

/// Connects the bridge to a networked device.
///
/// `sdb connect` exits zero even when the remote refuses, so the response text is
/// checked as well.
pub async fn connect_target<B: DeviceBridge>(
    bridge: &B,
    address: &str,
) -> Result<String, TargetError> {
    info!("connect:{address} - starting");
    let response = bridge
        .connect(address)
        .await
        .map_err(|err| TargetError::ConnectFailed {
            address: address.to_string(),
            detail: err.to_string(),
        })?;
    if response.to_ascii_lowercase().contains(CONNECT_FAILED_MARKER) {
        return Err(TargetError::ConnectFailed {
            address: address.to_string(),
            detail: response.trim().to_string(),
        });
    }
    Ok(response)
}
