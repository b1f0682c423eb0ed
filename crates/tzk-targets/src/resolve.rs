use crate::devices::Device;
use crate::target::TargetSpec;

/// A device id the rest of the run can rely on.
///
/// Only built from an enumerated [`Device`] or from a confirmed-ready emulator, so
/// holding one means resolution actually happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    device_id: String,
}

impl ResolutionResult {
    pub fn from_device(device: &Device) -> Self {
        Self {
            device_id: device.id.clone(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolutionResult),
    /// Connect the bridge to this address, re-enumerate and match again.
    NeedsConnect(String),
    /// Several candidates and nothing requested: the user has to pick.
    NeedsChoice(Vec<Device>),
    /// Nothing usable is running; carries the requested name to launch.
    NeedsEmulator(Option<String>),
}

pub fn resolve(target: &TargetSpec, devices: &[Device]) -> Resolution {
    match target {
        TargetSpec::IpAddress(address) => Resolution::NeedsConnect(address.clone()),
        TargetSpec::Identifier(query) => match match_device(devices, query) {
            Some(device) => Resolution::Resolved(ResolutionResult::from_device(device)),
            None => Resolution::NeedsEmulator(Some(query.clone())),
        },
        TargetSpec::None => match devices {
            [] => Resolution::NeedsEmulator(None),
            [only] => Resolution::Resolved(ResolutionResult::from_device(only)),
            many => Resolution::NeedsChoice(many.to_vec()),
        },
    }
}

/// Exact match on `id` across all devices first, then on `name`.
pub fn match_device<'a>(devices: &'a [Device], query: &str) -> Option<&'a Device> {
    devices
        .iter()
        .find(|device| device.id == query)
        .or_else(|| devices.iter().find(|device| device.name == query))
}

/// Finds the device a `connect <address>` produced. The bridge lists it under
/// `address:port`.
pub fn find_connected<'a>(devices: &'a [Device], address: &str) -> Option<&'a Device> {
    let with_port = format!("{address}:");
    devices.iter().find(|device| {
        device.name == address || device.name.starts_with(&with_port) || device.id == address
    })
}
