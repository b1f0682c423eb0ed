use tracing::debug;

use crate::bridge::DeviceBridge;
use crate::error::TargetError;

/// One row of `sdb devices`.
///
/// `name` is the bridge serial (`emulator-26101`, `192.168.0.10:26101`), `kind` the
/// connection state and `id` the target name the platform CLI expects after `-t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub kind: String,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.kind == "device"
    }
}

/// Parses bridge output into devices.
///
/// The first line is the header. Rows need at least three whitespace separated
/// fields; anything shorter (banners, daemon chatter, truncated output) is dropped.
pub fn parse_devices(output: &str) -> Vec<Device> {
    let mut devices = Vec::new();

    for line in output.trim().lines().skip(1) {
        let line = line.trim();
        if line.is_empty() || line.starts_with("List of devices") || line.starts_with('*') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            debug!("skipping device line {line:?}");
            continue;
        }

        devices.push(Device {
            name: fields[0].to_string(),
            kind: fields[1].to_string(),
            id: fields[2..].join(" "),
        });
    }

    devices
}

pub async fn list_devices<B: DeviceBridge>(bridge: &B) -> Result<Vec<Device>, TargetError> {
    let output = bridge
        .devices()
        .await
        .map_err(|err| TargetError::BridgeUnavailable(err.to_string()))?;
    Ok(parse_devices(&output))
}
