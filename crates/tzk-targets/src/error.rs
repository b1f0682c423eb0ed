use tzk_util::ToolFailure;

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("device bridge unavailable: {0}")]
    BridgeUnavailable(String),
    #[error("no emulator target name specified (pass -t <name>)")]
    NoTargetSpecified,
    #[error("no device matching {0} could be found")]
    DeviceNotFound(String),
    #[error("failed to connect to remote target {address}: {detail}")]
    ConnectFailed { address: String, detail: String },
    #[error("failed to launch emulator {name}: {source}")]
    LaunchFailed { name: String, source: ToolFailure },
    #[error("failed to create emulator {name}: {source}")]
    CreateFailed { name: String, source: ToolFailure },
    #[error("can't connect to emulator {name} after {attempts} attempts; try restarting it")]
    Timeout { name: String, attempts: u32 },
}
