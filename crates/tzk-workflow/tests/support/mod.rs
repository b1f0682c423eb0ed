#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::Instant;
use tzk_build::{PlatformTool, WebBundler};
use tzk_targets::{Clock, Device, DeviceBridge, EmulatorControl, TargetSpec};
use tzk_util::ToolFailure;
use tzk_workflow::{
    GlobalConfig, PipelineContext, PlatformConfig, ProjectConfig, PromptError, Prompter, Toolbox,
};

pub const TV: &str = "T-samsung-5.0-x86";

pub fn failure(program: &str, stderr: &str) -> ToolFailure {
    ToolFailure::exit(program, 1, "", stderr)
}

pub fn listing(rows: &[(&str, &str, &str)]) -> String {
    let mut out = String::from("List of devices attached\n");
    for (name, kind, id) in rows {
        out.push_str(&format!("{name}\t{kind}\t{id}\n"));
    }
    out
}

pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
    }
}

/// Replays `devices` listings in order, repeating the last one.
#[derive(Default)]
pub struct FakeBridge {
    listings: Mutex<VecDeque<String>>,
    connect_response: String,
    pub connects: Mutex<Vec<String>>,
}

impl FakeBridge {
    pub fn new(listings: Vec<String>) -> Self {
        Self {
            listings: Mutex::new(listings.into()),
            ..Self::default()
        }
    }

    pub fn with_connect_response(mut self, response: &str) -> Self {
        self.connect_response = response.to_string();
        self
    }
}

impl DeviceBridge for FakeBridge {
    async fn connect(&self, address: &str) -> Result<String, ToolFailure> {
        self.connects.lock().unwrap().push(address.to_string());
        Ok(self.connect_response.clone())
    }

    async fn devices(&self) -> Result<String, ToolFailure> {
        let mut listings = self.listings.lock().unwrap();
        if listings.len() > 1 {
            return Ok(listings.pop_front().unwrap_or_default());
        }
        Ok(listings.front().cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeEmulator {
    launch_failures: Mutex<VecDeque<&'static str>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeEmulator {
    pub fn failing_launches(failures: &[&'static str]) -> Self {
        Self {
            launch_failures: Mutex::new(failures.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl EmulatorControl for FakeEmulator {
    async fn launch(&self, name: &str) -> Result<String, ToolFailure> {
        self.calls.lock().unwrap().push(format!("launch {name}"));
        match self.launch_failures.lock().unwrap().pop_front() {
            Some(stderr) => Err(failure("em-cli", stderr)),
            None => Ok(String::new()),
        }
    }

    async fn create(&self, name: &str, profile: &str) -> Result<String, ToolFailure> {
        self.calls.lock().unwrap().push(format!("create {name} {profile}"));
        Ok(String::new())
    }
}

/// Platform CLI fake: each operation fails with the queued messages, in order,
/// then succeeds.
#[derive(Default)]
pub struct FakeTool {
    failures: Mutex<HashMap<&'static str, VecDeque<&'static str>>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTool {
    pub fn fail(self, op: &'static str, stderr: &'static str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(stderr);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls to `op`, with arguments.
    pub fn calls_to(&self, op: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.split(' ').next() == Some(op))
            .collect()
    }

    fn record(&self, op: &'static str, args: String) -> Result<String, ToolFailure> {
        self.calls.lock().unwrap().push(format!("{op} {args}"));
        let next = self
            .failures
            .lock()
            .unwrap()
            .get_mut(op)
            .and_then(VecDeque::pop_front);
        match next {
            Some(stderr) => Err(failure("tizen", stderr)),
            None => Ok(String::new()),
        }
    }
}

impl PlatformTool for FakeTool {
    async fn build_web(&self, _app_dir: &Path, _build_dir: &Path) -> Result<String, ToolFailure> {
        self.record("build-web", String::new())
    }

    async fn package(
        &self,
        _build_dir: &Path,
        cert_profile: &str,
        _output_dir: &Path,
    ) -> Result<String, ToolFailure> {
        self.record("package", cert_profile.to_string())
    }

    async fn uninstall(&self, package_id: &str, device: &str) -> Result<String, ToolFailure> {
        self.record("uninstall", format!("{package_id} {device}"))
    }

    async fn install(
        &self,
        _output_dir: &Path,
        package_file: &str,
        device: &str,
    ) -> Result<String, ToolFailure> {
        self.record("install", format!("{package_file} {device}"))
    }

    async fn run(&self, id: &str, device: &str) -> Result<String, ToolFailure> {
        self.record("run", format!("{id} {device}"))
    }

    async fn create_certificate(
        &self,
        _dir: &Path,
        alias: &str,
        _file_stem: &str,
        _password: &str,
    ) -> Result<String, ToolFailure> {
        self.record("certificate", alias.to_string())
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

#[derive(Default)]
pub struct NoBundler;

impl WebBundler for NoBundler {
    async fn bundle(&self, _project_root: &Path, _command: &[String]) -> Result<(), ToolFailure> {
        Ok(())
    }
}

/// Canned prompt answers; panics when asked something it has no answer for.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub choice: Option<usize>,
    pub start_emulator: Option<bool>,
    pub asked: Mutex<Vec<String>>,
}

impl Prompter for ScriptedPrompter {
    fn choose_device(&self, devices: &[Device]) -> Result<usize, PromptError> {
        self.asked
            .lock()
            .unwrap()
            .push(format!("choose {}", devices.len()));
        self.choice
            .ok_or_else(|| PromptError("no scripted device choice".into()))
    }

    fn confirm_emulator(&self, target: &TargetSpec) -> Result<bool, PromptError> {
        self.asked.lock().unwrap().push(format!("emulator {target}"));
        self.start_emulator
            .ok_or_else(|| PromptError("no scripted emulator answer".into()))
    }
}

pub type FakeToolbox = Toolbox<FakeBridge, FakeEmulator, FakeTool, NoBundler, ManualClock>;

pub fn toolbox(bridge: FakeBridge, emulator: FakeEmulator, tool: FakeTool) -> FakeToolbox {
    Toolbox {
        bridge,
        emulator,
        tool,
        bundler: NoBundler,
        clock: ManualClock::new(),
    }
}

/// A project on disk with one platform template, plus a context for it.
pub struct Fixture {
    pub temp: TempDir,
    pub ctx: PipelineContext,
}

pub fn fixture(platform: &str, target: Option<&str>) -> Fixture {
    let temp = TempDir::new().unwrap();
    let project_dir = temp.path().join("project");
    let config_dir = temp.path().join("config");

    let template = project_dir.join("platformTemplates").join(platform);
    fs::create_dir_all(&template).unwrap();
    fs::write(template.join("config.xml"), "<widget id=\"{{PACKAGE}}\"/>").unwrap();

    let mut project = ProjectConfig {
        id: "helloWorld".into(),
        ..ProjectConfig::default()
    };
    project.platforms.insert(
        platform.to_string(),
        PlatformConfig {
            app_name: "Hello".into(),
            id: "ABCDEFG.hello".into(),
            package: "ABCDEFG".into(),
            certificate_profile: "tzkCert".into(),
            ..PlatformConfig::default()
        },
    );
    let mut global = GlobalConfig::default();
    global.poll.max_attempts = 3;

    let ctx =
        PipelineContext::from_config(&project_dir, &project, &global, &config_dir, platform, target)
            .unwrap();
    Fixture { temp, ctx }
}
