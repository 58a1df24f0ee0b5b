//! Recording host and harness for pipeline tests.

use anyhow::{Result, bail};
use std::cell::{Cell, RefCell};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::prompt::Prompt;
use super::{Context, RunOptions};
use crate::common::host::Host;
use crate::common::subid::Allocation;
use crate::common::systemd::SystemState;
use crate::common::{Identity, SetupConfig};

const SHIM_PATH: &str = "/usr/bin/docker";

pub struct FakeHost {
    pub kernel: Option<String>,
    pub system_state: SystemState,
    pub cgroup_v2: bool,
    pub propagation: Option<String>,
    pub missing_commands: Vec<String>,
    pub available_packages: Vec<String>,
    pub install_ok: bool,
    pub stop_ok: bool,
    pub migrate_ok: bool,
    /// `None` makes the info query itself fail
    pub rootless: Option<String>,
    pub canary_ok: bool,
    pub socket_ok: bool,
    pub shim_lands_on_path: bool,
    pub shim_info_ok: bool,
    installed: RefCell<Vec<String>>,
    env: RefCell<Vec<(String, String)>>,
    calls: RefCell<Vec<String>>,
    subuid_path: PathBuf,
    subgid_path: PathBuf,
    shim_package: String,
}

impl FakeHost {
    /// A WSL guest where everything succeeds.
    pub fn healthy() -> Self {
        Self {
            kernel: Some("Linux version 5.15.153.1-microsoft-standard-WSL2".into()),
            system_state: SystemState::Running,
            cgroup_v2: true,
            propagation: Some("shared".into()),
            missing_commands: Vec::new(),
            available_packages: vec!["passt".into()],
            install_ok: true,
            stop_ok: true,
            migrate_ok: true,
            rootless: Some("true".into()),
            canary_ok: true,
            socket_ok: true,
            shim_lands_on_path: true,
            shim_info_ok: true,
            installed: RefCell::new(Vec::new()),
            env: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            subuid_path: PathBuf::new(),
            subgid_path: PathBuf::new(),
            shim_package: SetupConfig::default().shim_package,
        }
    }

    pub fn without_command(mut self, name: &str) -> Self {
        self.missing_commands.push(name.to_string());
        self
    }

    pub fn with_installed(self, package: &str) -> Self {
        self.installed.borrow_mut().push(package.to_string());
        self
    }

    /// Side-effecting and engine calls, in order. Read-only probes are not recorded.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn env(&self) -> Vec<(String, String)> {
        self.env.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

fn append_entry(path: &Path, user: &str, allocation: &Allocation) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let count = u64::from(allocation.last - allocation.first) + 1;
    writeln!(file, "{user}:{}:{count}", allocation.first)?;
    Ok(())
}

impl Host for FakeHost {
    fn kernel_version(&self) -> Option<String> {
        self.kernel.clone()
    }

    fn system_state(&self) -> SystemState {
        if !self.has_command("systemctl") {
            return SystemState::Unavailable;
        }
        self.system_state.clone()
    }

    fn has_cgroup_v2(&self) -> bool {
        self.cgroup_v2
    }

    fn root_propagation(&self) -> Option<String> {
        if !self.has_command("findmnt") {
            return None;
        }
        self.propagation.clone()
    }

    fn has_command(&self, name: &str) -> bool {
        !self.missing_commands.iter().any(|c| c == name)
    }

    fn package_available(&self, package: &str) -> bool {
        self.available_packages.iter().any(|p| p == package)
    }

    fn package_installed(&self, package: &str) -> bool {
        self.installed.borrow().iter().any(|p| p == package)
    }

    fn refresh_packages(&self) -> Result<()> {
        self.record("refresh");
        Ok(())
    }

    fn install_packages(&self, packages: &[&str]) -> Result<()> {
        self.record(format!("install {}", packages.join(" ")));
        if !self.install_ok {
            bail!("E: Unable to locate package");
        }
        self.installed
            .borrow_mut()
            .extend(packages.iter().map(|p| p.to_string()));
        Ok(())
    }

    fn add_subordinate_ids(&self, user: &str, allocation: Allocation) -> Result<()> {
        self.record(allocation.usermod_args(user).join(" "));
        if allocation.uids {
            append_entry(&self.subuid_path, user, &allocation)?;
        }
        if allocation.gids {
            append_entry(&self.subgid_path, user, &allocation)?;
        }
        Ok(())
    }

    fn stop_all_containers(&self) -> Result<()> {
        self.record("stop-all");
        if !self.stop_ok {
            bail!("no containers");
        }
        Ok(())
    }

    fn migrate_storage(&self) -> Result<()> {
        self.record("migrate");
        if !self.migrate_ok {
            bail!("exit status 125");
        }
        Ok(())
    }

    fn rootless_status(&self) -> Result<String> {
        self.record("info");
        match &self.rootless {
            Some(value) => Ok(value.clone()),
            None => bail!("cannot connect to podman"),
        }
    }

    fn run_canary(&self, image: &str) -> Result<()> {
        self.record(format!("canary {image}"));
        if !self.canary_ok {
            bail!("exit status 126");
        }
        Ok(())
    }

    fn enable_user_socket(&self, unit: &str) -> Result<()> {
        self.record(format!("socket {unit}"));
        if !self.socket_ok {
            bail!("Failed to connect to bus");
        }
        Ok(())
    }

    fn export_env(&self, key: &str, value: &str) {
        self.env
            .borrow_mut()
            .push((key.to_string(), value.to_string()));
    }

    fn find_shim(&self) -> Option<PathBuf> {
        let installed = self.package_installed(&self.shim_package);
        (installed && self.shim_lands_on_path).then(|| PathBuf::from(SHIM_PATH))
    }

    fn shim_info(&self, shim: &Path) -> Result<()> {
        self.record(format!("shim-info {}", shim.display()));
        if !self.shim_info_ok {
            bail!("Cannot connect to the Docker daemon");
        }
        Ok(())
    }
}

/// Prompt with a fixed answer that counts how often it was asked.
/// Without an answer, being asked is a test failure.
pub struct ScriptedPrompt {
    answer: Option<bool>,
    asked: Cell<usize>,
}

impl ScriptedPrompt {
    pub fn asked(&self) -> usize {
        self.asked.get()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, question: &str, _default: bool) -> Result<bool> {
        self.asked.set(self.asked.get() + 1);
        match self.answer {
            Some(answer) => Ok(answer),
            None => panic!("unexpected prompt: {question}"),
        }
    }
}

/// A fake host wired to temporary mapping files and profile.
pub struct Harness {
    pub host: FakeHost,
    pub config: SetupConfig,
    pub identity: Identity,
    pub options: RunOptions,
    pub prompt: ScriptedPrompt,
    _dir: TempDir,
}

impl Harness {
    pub fn new(host: FakeHost) -> Self {
        Self::with_config(host, SetupConfig::default())
    }

    /// Like [`Harness::new`], with mapping files and profile redirected into
    /// a temp dir on top of `base`.
    pub fn with_config(mut host: FakeHost, base: SetupConfig) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SetupConfig {
            subuid_path: dir.path().join("subuid"),
            subgid_path: dir.path().join("subgid"),
            profile: Some(dir.path().join(".bashrc").to_string_lossy().into_owned()),
            ..base
        };
        host.subuid_path = config.subuid_path.clone();
        host.subgid_path = config.subgid_path.clone();
        host.shim_package = config.shim_package.clone();

        Self {
            host,
            config,
            identity: Identity {
                name: "alice".into(),
                uid: 1000,
            },
            options: RunOptions::default(),
            prompt: ScriptedPrompt {
                answer: None,
                asked: Cell::new(0),
            },
            _dir: dir,
        }
    }

    pub fn as_root(mut self) -> Self {
        self.identity = Identity {
            name: "root".into(),
            uid: 0,
        };
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_answer(mut self, answer: bool) -> Self {
        self.prompt.answer = Some(answer);
        self
    }

    /// Seed both mapping files with the same content.
    pub fn with_subids(self, contents: &str) -> Self {
        fs::write(&self.config.subuid_path, contents).expect("write subuid");
        fs::write(&self.config.subgid_path, contents).expect("write subgid");
        self
    }

    pub fn context(&self) -> Context<'_> {
        Context {
            host: &self.host,
            prompt: &self.prompt,
            config: &self.config,
            identity: &self.identity,
            options: self.options,
        }
    }

    pub fn profile_path(&self) -> PathBuf {
        self.config.profile_path()
    }

    pub fn read_profile(&self) -> String {
        fs::read_to_string(self.profile_path()).unwrap_or_default()
    }

    pub fn read_subuid(&self) -> String {
        fs::read_to_string(&self.config.subuid_path).unwrap_or_default()
    }

    pub fn read_subgid(&self) -> String {
        fs::read_to_string(&self.config.subgid_path).unwrap_or_default()
    }
}
