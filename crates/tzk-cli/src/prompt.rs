use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use tzk_targets::{Device, TargetSpec};
use tzk_workflow::{device_label, NonInteractive, PromptError, Prompter};

/// Terminal prompts; falls back to [`NonInteractive`] answers without a tty.
pub struct CliPrompter {
    interactive: bool,
    theme: ColorfulTheme,
}

impl CliPrompter {
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for CliPrompter {
    fn choose_device(&self, devices: &[Device]) -> Result<usize, PromptError> {
        if !self.interactive {
            return NonInteractive.choose_device(devices);
        }
        let items: Vec<String> = devices.iter().map(device_label).collect();
        Select::with_theme(&self.theme)
            .with_prompt("Which target to use?")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|err| PromptError(err.to_string()))
    }

    fn confirm_emulator(&self, target: &TargetSpec) -> Result<bool, PromptError> {
        if !self.interactive {
            return NonInteractive.confirm_emulator(target);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt(format!(
                "Could not find or connect to the specified target ({target}). \
                 Would you like to start an emulator?"
            ))
            .default(true)
            .interact()
            .map_err(|err| PromptError(err.to_string()))
    }
}
