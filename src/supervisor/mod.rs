//! Process supervision for the MCP server binaries.
//!
//! The `start-servers`, `stop-servers` and `check-servers` commands share this
//! module: servers are found by name in the OS process table, started as
//! detached session leaders with output redirected to `<name>.log`, and
//! stopped with SIGTERM. Discovery is best-effort; nothing here is atomic.

pub mod discovery;
pub mod launch;
pub mod logs;
pub mod report;
pub mod signal;

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::config::{KmcpConfig, ServerEntry};

pub const DEFAULT_STARTUP_GRACE: Duration = Duration::from_secs(2);

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(unix)]
    #[error("signal delivery failed: {0}")]
    Signal(#[from] nix::Error),

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

/// A server the supervisor knows how to start, find and stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedServer {
    pub name: String,
    pub port: u16,
    pub command: Option<PathBuf>,
    pub args: Vec<String>,
}

impl ManagedServer {
    pub fn new(name: &str, port: u16) -> Self {
        Self {
            name: name.to_string(),
            port,
            command: None,
            args: Vec::new(),
        }
    }

    /// Human-friendly name: "weather-server" -> "Weather Server".
    pub fn display_name(&self) -> String {
        self.name
            .split(['-', '_'])
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }

    pub fn log_file_name(&self) -> String {
        format!("{}.log", self.name)
    }

    pub fn log_path(&self, log_dir: &Path) -> PathBuf {
        log_dir.join(self.log_file_name())
    }

    /// Executable to launch: the configured command, or `<name>` in `bin_dir`.
    pub fn executable(&self, bin_dir: &Path) -> PathBuf {
        self.command
            .clone()
            .unwrap_or_else(|| bin_dir.join(&self.name))
    }
}

impl From<ServerEntry> for ManagedServer {
    fn from(entry: ServerEntry) -> Self {
        Self {
            name: entry.name,
            port: entry.port,
            command: entry.command,
            args: entry.args,
        }
    }
}

/// The two servers shipped with this crate.
pub fn default_servers() -> Vec<ManagedServer> {
    vec![
        ManagedServer::new("math-server", 3001),
        ManagedServer::new("weather-server", 3002),
    ]
}

/// Settings shared by the supervisor commands.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub servers: Vec<ManagedServer>,
    /// Directory holding `<name>.log` files
    pub log_dir: PathBuf,
    /// Directory searched for server binaries without an explicit command
    pub bin_dir: PathBuf,
    /// How long a freshly spawned server must stay alive to count as started
    pub startup_grace: Duration,
}

impl SupervisorConfig {
    /// Build from the `supervisor` config section. Server binaries are looked
    /// up next to the running executable.
    pub fn from_config(config: &KmcpConfig) -> Result<Self, SupervisorError> {
        let exe = std::env::current_exe()?;
        let bin_dir = exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::with_bin_dir(config, bin_dir))
    }

    pub fn with_bin_dir(config: &KmcpConfig, bin_dir: PathBuf) -> Self {
        let section = &config.supervisor;
        Self {
            servers: section
                .servers
                .clone()
                .map(|entries| entries.into_iter().map(ManagedServer::from).collect())
                .unwrap_or_else(default_servers),
            log_dir: section.log_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            bin_dir,
            startup_grace: section
                .startup_grace_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_STARTUP_GRACE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SupervisorSection;

    #[test]
    fn display_names() {
        assert_eq!(ManagedServer::new("weather-server", 1).display_name(), "Weather Server");
        assert_eq!(ManagedServer::new("math_server", 1).display_name(), "Math Server");
        assert_eq!(ManagedServer::new("solo", 1).display_name(), "Solo");
    }

    #[test]
    fn executable_defaults_to_bin_dir() {
        let mut server = ManagedServer::new("math-server", 3001);
        assert_eq!(
            server.executable(Path::new("/opt/mcp/bin")),
            PathBuf::from("/opt/mcp/bin/math-server")
        );
        server.command = Some(PathBuf::from("/usr/local/bin/calc"));
        assert_eq!(
            server.executable(Path::new("/opt/mcp/bin")),
            PathBuf::from("/usr/local/bin/calc")
        );
        assert_eq!(server.log_path(Path::new("logs")), PathBuf::from("logs/math-server.log"));
    }

    #[test]
    fn defaults_without_supervisor_section() {
        let config = SupervisorConfig::with_bin_dir(&KmcpConfig::default(), PathBuf::from("bin"));
        assert_eq!(config.servers, default_servers());
        assert_eq!(config.log_dir, PathBuf::from("."));
        assert_eq!(config.startup_grace, DEFAULT_STARTUP_GRACE);
    }

    #[test]
    fn supervisor_section_overrides_defaults() {
        let kmcp = KmcpConfig {
            supervisor: SupervisorSection {
                log_dir: Some(PathBuf::from("/var/log/mcp")),
                startup_grace_secs: Some(5),
                servers: Some(vec![ServerEntry {
                    name: "weather-server".to_string(),
                    port: 9000,
                    command: None,
                    args: vec!["--verbose".to_string()],
                }]),
            },
            ..KmcpConfig::default()
        };
        let config = SupervisorConfig::with_bin_dir(&kmcp, PathBuf::from("bin"));
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.servers[0].port, 9000);
        assert_eq!(config.servers[0].args, vec!["--verbose"]);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/mcp"));
        assert_eq!(config.startup_grace, Duration::from_secs(5));
    }
}
