//! Start servers as detached background processes.

use std::fs::File;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::{signal, ManagedServer, SupervisorConfig, SupervisorError};

/// Result of trying to start one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Still running after the startup grace period
    Started { pid: u32 },
    /// Exited before the grace period elapsed
    Exited,
    /// No executable at the expected path
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedServer {
    pub server: ManagedServer,
    pub pid: u32,
}

/// Starts servers and remembers which ones came up, so an interrupted
/// startup can take them down again.
pub struct Launcher {
    config: SupervisorConfig,
    started: Mutex<Vec<LaunchedServer>>,
}

impl Launcher {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Whether the executable for `server` is present.
    pub fn is_installed(&self, server: &ManagedServer) -> bool {
        server.executable(&self.config.bin_dir).exists()
    }

    /// Spawn `server` and wait out the startup grace period.
    ///
    /// The child runs in its own session with stdin closed and both output
    /// streams redirected to a freshly truncated `<name>.log`. It is told to
    /// serve HTTP on its configured port.
    pub async fn launch(&self, server: &ManagedServer) -> Result<LaunchOutcome, SupervisorError> {
        let executable = server.executable(&self.config.bin_dir);
        if !self.is_installed(server) {
            warn!(server = %server.name, path = %executable.display(), "Server executable not found");
            return Ok(LaunchOutcome::Missing);
        }

        std::fs::create_dir_all(&self.config.log_dir)?;
        let log = File::create(server.log_path(&self.config.log_dir))?;

        let mut cmd = Command::new(&executable);
        cmd.args(&server.args)
            .env("MCP_TRANSPORT_MODE", "http")
            .env("PORT", server.port.to_string())
            .env("SERVER_NAME", &server.name)
            .stdin(Stdio::null())
            .stdout(log.try_clone()?)
            .stderr(log);
        detach(&mut cmd);

        let mut child = cmd.spawn()?;
        let pid = child.id();
        debug!(server = %server.name, pid, "Spawned server");

        tokio::time::sleep(self.config.startup_grace).await;

        if let Some(status) = child.try_wait()? {
            warn!(server = %server.name, %status, "Server exited during startup");
            return Ok(LaunchOutcome::Exited);
        }

        info!(server = %server.name, pid, "Server started");
        self.lock_started().push(LaunchedServer {
            server: server.clone(),
            pid,
        });
        Ok(LaunchOutcome::Started { pid })
    }

    /// Servers started so far, in launch order.
    pub fn started(&self) -> Vec<LaunchedServer> {
        self.lock_started().clone()
    }

    /// Send SIGTERM to the process group of every server started so far.
    pub fn terminate_started(&self) -> Vec<(LaunchedServer, Result<bool, SupervisorError>)> {
        self.lock_started()
            .drain(..)
            .map(|launched| {
                let result = signal::terminate_group(launched.pid as i32);
                (launched, result)
            })
            .collect()
    }

    fn lock_started(&self) -> std::sync::MutexGuard<'_, Vec<LaunchedServer>> {
        self.started.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Put the child in a new session so terminal signals aimed at the
/// supervisor's process group never reach it.
#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    unsafe {
        cmd.pre_exec(|| {
            nix::unistd::setsid()
                .map(|_| ())
                .map_err(std::io::Error::other)
        });
    }
}

#[cfg(not(unix))]
fn detach(_cmd: &mut Command) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::config::KmcpConfig;
    use std::path::PathBuf;
    use std::time::Duration;

    fn shell_server(name: &str, script: &str) -> ManagedServer {
        ManagedServer {
            name: name.to_string(),
            port: 0,
            command: Some(PathBuf::from("/bin/sh")),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    fn launcher(log_dir: PathBuf) -> Launcher {
        let mut config = SupervisorConfig::with_bin_dir(&KmcpConfig::default(), PathBuf::from("/nonexistent"));
        config.log_dir = log_dir;
        config.startup_grace = Duration::from_millis(300);
        Launcher::new(config)
    }

    #[tokio::test]
    async fn missing_executable_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = launcher(dir.path().to_path_buf());

        let outcome = launcher
            .launch(&ManagedServer::new("math-server", 3001))
            .await
            .unwrap();
        assert_eq!(outcome, LaunchOutcome::Missing);
        assert!(!dir.path().join("math-server.log").exists());
        assert!(launcher.started().is_empty());
    }

    #[tokio::test]
    async fn early_exit_is_a_failed_start() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = launcher(dir.path().to_path_buf());

        let outcome = launcher
            .launch(&shell_server("crashy", "echo booting; exit 3"))
            .await
            .unwrap();
        assert_eq!(outcome, LaunchOutcome::Exited);
        assert!(launcher.started().is_empty());

        let log = std::fs::read_to_string(dir.path().join("crashy.log")).unwrap();
        assert_eq!(log, "booting\n");
    }

    #[tokio::test]
    async fn long_running_server_is_started_detached_and_can_be_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = launcher(dir.path().to_path_buf());

        let outcome = launcher
            .launch(&shell_server("sleepy", "echo \"port=$PORT mode=$MCP_TRANSPORT_MODE\"; exec sleep 30"))
            .await
            .unwrap();
        let LaunchOutcome::Started { pid } = outcome else {
            panic!("expected server to start, got {outcome:?}");
        };

        // new session: the child leads its own process group
        let pgid = nix::unistd::getpgid(Some(nix::unistd::Pid::from_raw(pid as i32))).unwrap();
        assert_eq!(pgid.as_raw(), pid as i32);

        let log = std::fs::read_to_string(dir.path().join("sleepy.log")).unwrap();
        assert_eq!(log, "port=0 mode=http\n");

        let results = launcher.terminate_started();
        assert_eq!(results.len(), 1);
        assert!(*results[0].1.as_ref().unwrap());
        assert!(launcher.started().is_empty());
    }
}
