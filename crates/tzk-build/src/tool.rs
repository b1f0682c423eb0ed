use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tzk_util::{run_tool, sdk_tool_path, ToolFailure};

const DEVICE_MISSING_MARKERS: &[&str] = &[
    "no device matching",
    "device not found",
    "device is not connected",
];

const NOT_INSTALLED_MARKERS: &[&str] = &["not installed", "no such package", "package not exist"];

/// The platform build/package/install tool.
#[allow(async_fn_in_trait)]
pub trait PlatformTool {
    async fn build_web(&self, app_dir: &Path, build_dir: &Path) -> Result<String, ToolFailure>;

    async fn package(
        &self,
        build_dir: &Path,
        cert_profile: &str,
        output_dir: &Path,
    ) -> Result<String, ToolFailure>;

    async fn uninstall(&self, package_id: &str, device: &str) -> Result<String, ToolFailure>;

    async fn install(
        &self,
        output_dir: &Path,
        package_file: &str,
        device: &str,
    ) -> Result<String, ToolFailure>;

    async fn run(&self, id: &str, device: &str) -> Result<String, ToolFailure>;

    async fn create_certificate(
        &self,
        dir: &Path,
        alias: &str,
        file_stem: &str,
        password: &str,
    ) -> Result<String, ToolFailure>;

    async fn add_security_profile(
        &self,
        profile: &str,
        p12: &Path,
        password: &str,
    ) -> Result<String, ToolFailure>;
}

/// `tizen` from the Tizen Studio IDE tools.
#[derive(Debug, Clone)]
pub struct TizenCli {
    path: PathBuf,
}

impl TizenCli {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::new(tizen_cli_path())
    }

    async fn call(&self, args: &[&OsStr]) -> Result<String, ToolFailure> {
        let output = run_tool(&self.path, args, None).await?;
        Ok(output.text())
    }
}

pub fn tizen_cli_path() -> PathBuf {
    sdk_tool_path("TZK_TIZEN_CLI", "tools/ide/bin/tizen", "tizen")
}

impl PlatformTool for TizenCli {
    async fn build_web(&self, app_dir: &Path, build_dir: &Path) -> Result<String, ToolFailure> {
        self.call(&[
            OsStr::new("build-web"),
            OsStr::new("--"),
            app_dir.as_os_str(),
            OsStr::new("-out"),
            build_dir.as_os_str(),
        ])
        .await
    }

    async fn package(
        &self,
        build_dir: &Path,
        cert_profile: &str,
        output_dir: &Path,
    ) -> Result<String, ToolFailure> {
        self.call(&[
            OsStr::new("package"),
            OsStr::new("--"),
            build_dir.as_os_str(),
            OsStr::new("-s"),
            OsStr::new(cert_profile),
            OsStr::new("-t"),
            OsStr::new("wgt"),
            OsStr::new("-o"),
            output_dir.as_os_str(),
        ])
        .await
    }

    async fn uninstall(&self, package_id: &str, device: &str) -> Result<String, ToolFailure> {
        self.call(&[
            OsStr::new("uninstall"),
            OsStr::new("-p"),
            OsStr::new(package_id),
            OsStr::new("-t"),
            OsStr::new(device),
        ])
        .await
    }

    async fn install(
        &self,
        output_dir: &Path,
        package_file: &str,
        device: &str,
    ) -> Result<String, ToolFailure> {
        self.call(&[
            OsStr::new("install"),
            OsStr::new("--"),
            output_dir.as_os_str(),
            OsStr::new("-n"),
            OsStr::new(package_file),
            OsStr::new("-t"),
            OsStr::new(device),
        ])
        .await
    }

    async fn run(&self, id: &str, device: &str) -> Result<String, ToolFailure> {
        self.call(&[
            OsStr::new("run"),
            OsStr::new("-p"),
            OsStr::new(id),
            OsStr::new("-t"),
            OsStr::new(device),
        ])
        .await
    }

    async fn create_certificate(
        &self,
        dir: &Path,
        alias: &str,
        file_stem: &str,
        password: &str,
    ) -> Result<String, ToolFailure> {
        self.call(&[
            OsStr::new("certificate"),
            OsStr::new("--"),
            dir.as_os_str(),
            OsStr::new("-a"),
            OsStr::new(alias),
            OsStr::new("-f"),
            OsStr::new(file_stem),
            OsStr::new("-p"),
            OsStr::new(password),
        ])
        .await
    }

    async fn add_security_profile(
        &self,
        profile: &str,
        p12: &Path,
        password: &str,
    ) -> Result<String, ToolFailure> {
        self.call(&[
            OsStr::new("security-profiles"),
            OsStr::new("add"),
            OsStr::new("-n"),
            OsStr::new(profile),
            OsStr::new("-a"),
            p12.as_os_str(),
            OsStr::new("-p"),
            OsStr::new(password),
        ])
        .await
    }
}

/// The tool could not reach the device it was pointed at.
pub fn is_device_missing(failure: &ToolFailure) -> bool {
    DEVICE_MISSING_MARKERS
        .iter()
        .any(|marker| failure.mentions(marker))
}

/// Uninstall of a package that was never installed.
pub fn is_not_installed(failure: &ToolFailure) -> bool {
    NOT_INSTALLED_MARKERS
        .iter()
        .any(|marker| failure.mentions(marker))
}
