#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use tzk_build::PlatformTool;
use tzk_util::ToolFailure;

/// Records every call; fails the ones listed in `failing`.
#[derive(Default)]
pub struct FakeTool {
    pub calls: Mutex<Vec<String>>,
    pub failing: Vec<&'static str>,
}

impl FakeTool {
    pub fn failing(failing: &[&'static str]) -> Self {
        Self {
            failing: failing.to_vec(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str, detail: String) -> Result<String, ToolFailure> {
        self.calls.lock().unwrap().push(format!("{name} {detail}"));
        if self.failing.contains(&name) {
            Err(ToolFailure::exit("tizen", 1, "", "boom"))
        } else {
            Ok(String::new())
        }
    }
}

impl PlatformTool for FakeTool {
    async fn build_web(&self, app_dir: &Path, build_dir: &Path) -> Result<String, ToolFailure> {
        self.record("build-web", format!("{} {}", app_dir.display(), build_dir.display()))
    }

    async fn package(
        &self,
        build_dir: &Path,
        cert_profile: &str,
        output_dir: &Path,
    ) -> Result<String, ToolFailure> {
        self.record(
            "package",
            format!("{} {cert_profile} {}", build_dir.display(), output_dir.display()),
        )
    }

    async fn uninstall(&self, package_id: &str, device: &str) -> Result<String, ToolFailure> {
        self.record("uninstall", format!("{package_id} {device}"))
    }

    async fn install(
        &self,
        output_dir: &Path,
        package_file: &str,
        device: &str,
    ) -> Result<String, ToolFailure> {
        self.record("install", format!("{} {package_file} {device}", output_dir.display()))
    }

    async fn run(&self, id: &str, device: &str) -> Result<String, ToolFailure> {
        self.record("run", format!("{id} {device}"))
    }

    async fn create_certificate(
        &self,
        dir: &Path,
        alias: &str,
        file_stem: &str,
        _password: &str,
    ) -> Result<String, ToolFailure> {
        self.record("certificate", format!("{} {alias} {file_stem}", dir.display()))
    }

    async fn add_security_profile(
        &self,
        profile: &str,
        _p12: &Path,
        _password: &str,
    ) -> Result<String, ToolFailure> {
        self.record("security-profiles", profile.to_string())
    }
}
