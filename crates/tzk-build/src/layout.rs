use std::path::{Path, PathBuf};

/// Where one app's platform build lives under a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformLayout {
    root: PathBuf,
    app_id: String,
    platform: String,
}

impl PlatformLayout {
    pub fn new(root: impl Into<PathBuf>, app_id: &str, platform: &str) -> Self {
        Self {
            root: root.into(),
            app_id: app_id.to_string(),
            platform: platform.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// `platformBuilds/<appId>_<platform>`, the directory handed to `build-web`.
    pub fn app_dir(&self) -> PathBuf {
        self.root
            .join("platformBuilds")
            .join(format!("{}_{}", self.app_id, self.platform))
    }

    pub fn build_dir(&self) -> PathBuf {
        self.app_dir().join("build")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.app_dir().join("output")
    }

    pub fn template_dir(&self) -> PathBuf {
        self.root.join("platformTemplates").join(&self.platform)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.app_config_dir().join("assets").join(&self.platform)
    }

    pub fn overrides_dir(&self) -> PathBuf {
        self.app_config_dir().join("builds").join(&self.platform)
    }

    fn app_config_dir(&self) -> PathBuf {
        self.root.join("appConfigs").join(&self.app_id)
    }
}

/// `<app name>.wgt`, the file `package` writes into the output dir.
pub fn package_file_name(app_name: &str) -> String {
    format!("{app_name}.wgt")
}
