use tzk_targets::{Device, TargetSpec};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PromptError(pub String);

/// Questions a run may need to ask the user.
pub trait Prompter {
    /// Index into `devices` of the one to deploy to.
    fn choose_device(&self, devices: &[Device]) -> Result<usize, PromptError>;

    /// Whether to start the platform's default emulator after `target` could not
    /// be found or reached.
    fn confirm_emulator(&self, target: &TargetSpec) -> Result<bool, PromptError>;
}

/// Answers for non-interactive runs: first device, no emulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn choose_device(&self, _devices: &[Device]) -> Result<usize, PromptError> {
        Ok(0)
    }

    fn confirm_emulator(&self, _target: &TargetSpec) -> Result<bool, PromptError> {
        Ok(false)
    }
}

/// Label shown for a device in the chooser.
pub fn device_label(device: &Device) -> String {
    if device.id == device.name {
        format!("{} ({})", device.id, device.kind)
    } else {
        format!("{} [{}] ({})", device.id, device.name, device.kind)
    }
}

impl From<PromptError> for crate::error::PipelineError {
    fn from(err: PromptError) -> Self {
        crate::error::PipelineError::Prompt(err.0)
    }
}
