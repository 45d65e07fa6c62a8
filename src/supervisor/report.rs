//! Human-readable output of the supervisor commands.
//!
//! Each report is gathered first and rendered through `Display`, so the
//! text can be checked without touching real processes.

use std::fmt;
use std::path::Path;
use tracing::warn;

use super::discovery::{Lookup, Source};
use super::launch::LaunchedServer;
use super::logs::{self, LogInfo};
use super::{ManagedServer, SupervisorConfig, SupervisorError};

const START_CMD: &str = "start-servers";
const STOP_CMD: &str = "stop-servers";
const CHECK_CMD: &str = "check-servers";

/// How a log path is shown to the user: bare file name for the working
/// directory, full path otherwise.
pub fn display_log_path(server: &ManagedServer, log_dir: &Path) -> String {
    if log_dir == Path::new(".") || log_dir.as_os_str().is_empty() {
        server.log_file_name()
    } else {
        server.log_path(log_dir).display().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningServer {
    pub server: ManagedServer,
    pub pid: i32,
}

/// Output of `check-servers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub running: Vec<RunningServer>,
    pub logs: Vec<LogInfo>,
    /// Names of configured servers with no running process
    pub missing: Vec<String>,
}

impl StatusReport {
    /// Look up every configured server with `find` and inspect its log.
    pub fn gather<F>(config: &SupervisorConfig, find: F) -> Self
    where
        F: Fn(&str) -> Lookup,
    {
        let mut running = Vec::new();
        let mut missing = Vec::new();

        for server in &config.servers {
            let lookup = find(&server.name);
            if lookup.pids.is_empty() {
                missing.push(server.name.clone());
            }
            running.extend(lookup.pids.into_iter().map(|pid| RunningServer {
                server: server.clone(),
                pid,
            }));
        }

        let logs = config
            .servers
            .iter()
            .filter_map(|server| logs::inspect(&server.log_path(&config.log_dir)))
            .collect();

        Self {
            running,
            logs,
            missing,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📋 MCP Server Status Check")?;
        writeln!(f, "{}", "=".repeat(35))?;

        if self.running.is_empty() {
            writeln!(f, "🔴 No MCP servers are currently running")?;
        } else {
            writeln!(f, "🟢 Running Servers:")?;
            for running in &self.running {
                writeln!(f, "  • {} (PID: {})", running.server.display_name(), running.pid)?;
            }
        }
        writeln!(f)?;

        if self.logs.is_empty() {
            writeln!(f, "📝 No log files found")?;
        } else {
            writeln!(f, "📝 Log Files:")?;
            for log in &self.logs {
                writeln!(f, "  • {} ({} bytes)", log.file_name, log.size)?;
                if log.last_lines.is_empty() {
                    writeln!(f, "    (empty or unreadable)")?;
                } else {
                    writeln!(f, "    Recent entries:")?;
                    for line in &log.last_lines {
                        writeln!(f, "      {}", line.trim())?;
                    }
                }
                writeln!(f)?;
            }
        }

        if self.missing.is_empty() {
            writeln!(f, "✅ All expected servers are running!")?;
        } else {
            writeln!(f, "⚠️  Expected but not running:")?;
            for name in &self.missing {
                writeln!(f, "  • {}", name)?;
            }
            writeln!(f)?;
            writeln!(f, "💡 To start all servers:")?;
            writeln!(f, "  {}", START_CMD)?;
        }

        writeln!(f)?;
        writeln!(f, "🔧 Management Commands:")?;
        writeln!(f, "  Start all:  {}", START_CMD)?;
        writeln!(f, "  Stop all:   {}", STOP_CMD)?;
        write!(f, "  Check:      {}", CHECK_CMD)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopEvent {
    Stopping { name: String, pid: i32 },
    NotRunning { name: String },
}

/// Output of `stop-servers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    pub events: Vec<StopEvent>,
    /// Processes that accepted SIGTERM
    pub stopped: usize,
    /// Log files left in place
    pub kept_logs: Vec<String>,
}

impl StopReport {
    /// SIGTERM every process found for every configured server.
    ///
    /// Processes that vanish before the signal lands are skipped and not
    /// counted; other delivery failures are logged and skipped.
    pub fn stop_all<F, K>(config: &SupervisorConfig, find: F, terminate: K) -> Self
    where
        F: Fn(&str) -> Lookup,
        K: Fn(i32) -> Result<bool, SupervisorError>,
    {
        let mut events = Vec::new();
        let mut stopped = 0;

        for server in &config.servers {
            let lookup = find(&server.name);
            if lookup.pids.is_empty() {
                // no process table to consult, so the server's state is unknown
                if lookup.source == Source::Unavailable {
                    continue;
                }
                events.push(StopEvent::NotRunning {
                    name: server.name.clone(),
                });
                continue;
            }

            for pid in lookup.pids {
                match terminate(pid) {
                    Ok(true) => {
                        events.push(StopEvent::Stopping {
                            name: server.name.clone(),
                            pid,
                        });
                        stopped += 1;
                    }
                    Ok(false) => {}
                    Err(e) => warn!(server = %server.name, pid, error = %e, "Failed to stop server"),
                }
            }
        }

        let kept_logs = if stopped > 0 {
            config
                .servers
                .iter()
                .filter(|server| server.log_path(&config.log_dir).exists())
                .map(|server| display_log_path(server, &config.log_dir))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            events,
            stopped,
            kept_logs,
        }
    }
}

impl fmt::Display for StopReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🛑 Stopping MCP Servers")?;
        writeln!(f, "{}", "=".repeat(30))?;

        for event in &self.events {
            match event {
                StopEvent::Stopping { name, pid } => {
                    writeln!(f, "🛑 Stopping {} (PID: {})", name, pid)?
                }
                StopEvent::NotRunning { name } => writeln!(f, "✅ {} not running", name)?,
            }
        }

        if self.stopped > 0 {
            writeln!(f)?;
            writeln!(f, "✅ Stopped {} server process(es)", self.stopped)?;
            writeln!(f)?;
            writeln!(f, "🧹 Cleaning up log files...")?;
            for log in &self.kept_logs {
                writeln!(f, "  📄 {} (keeping for reference)", log)?;
            }
        } else {
            writeln!(f)?;
            writeln!(f, "✅ No MCP servers were running")?;
        }

        writeln!(f)?;
        write!(f, "🏁 Done!")
    }
}

/// Closing summary of `start-servers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSummary {
    pub started: Vec<LaunchedServer>,
    /// Log path of every configured server, for the `tail -f` hints
    pub log_paths: Vec<String>,
}

impl StartSummary {
    pub fn new(config: &SupervisorConfig, started: Vec<LaunchedServer>) -> Self {
        Self {
            started,
            log_paths: config
                .servers
                .iter()
                .map(|server| display_log_path(server, &config.log_dir))
                .collect(),
        }
    }

    pub fn any_started(&self) -> bool {
        !self.started.is_empty()
    }
}

impl fmt::Display for StartSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.any_started() {
            return write!(f, "❌ No servers were started successfully");
        }

        writeln!(f)?;
        writeln!(f, "🎉 All servers started!")?;
        writeln!(f)?;
        writeln!(f, "Running servers:")?;
        for launched in &self.started {
            writeln!(f, "  • {} (PID: {})", launched.server.display_name(), launched.pid)?;
        }

        writeln!(f)?;
        writeln!(f, "📋 To check status:")?;
        writeln!(f, "  {}", CHECK_CMD)?;
        writeln!(f)?;
        writeln!(f, "🛑 To stop all servers:")?;
        writeln!(f, "  {}", STOP_CMD)?;
        writeln!(f)?;
        write!(f, "📝 To view logs:")?;
        for path in &self.log_paths {
            write!(f, "\n  tail -f {}", path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::KmcpConfig;
    use std::cell::RefCell;
    use std::path::PathBuf;

    fn config_in(log_dir: &Path) -> SupervisorConfig {
        let mut config = SupervisorConfig::with_bin_dir(&KmcpConfig::default(), PathBuf::from("bin"));
        config.log_dir = log_dir.to_path_buf();
        config
    }

    fn fake_find(running: &'static [(&'static str, i32)]) -> impl Fn(&str) -> Lookup {
        move |name| Lookup {
            pids: running
                .iter()
                .filter(|(n, _)| *n == name)
                .map(|(_, pid)| *pid)
                .collect(),
            source: Source::Pgrep,
        }
    }

    #[test]
    fn status_with_partial_fleet() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("weather-server.log"), "a\nb\nc\nd\n").unwrap();
        std::fs::write(dir.path().join("math-server.log"), "").unwrap();

        let report = StatusReport::gather(&config_in(dir.path()), fake_find(&[("weather-server", 77)]));
        assert_eq!(report.missing, vec!["math-server"]);
        assert_eq!(report.running.len(), 1);
        assert_eq!(report.logs.len(), 2);

        let text = report.to_string();
        assert!(text.contains("🟢 Running Servers:\n  • Weather Server (PID: 77)\n"));
        assert!(text.contains("  • math-server.log (0 bytes)\n    (empty or unreadable)\n"));
        assert!(text.contains("    Recent entries:\n      b\n      c\n      d\n"));
        assert!(text.contains("⚠️  Expected but not running:\n  • math-server\n"));
        assert!(text.contains("💡 To start all servers:\n  start-servers\n"));
        assert!(!text.contains("All expected servers are running"));
    }

    #[test]
    fn status_with_nothing_running_and_no_logs() {
        let dir = tempfile::tempdir().unwrap();
        let report = StatusReport::gather(&config_in(dir.path()), fake_find(&[]));

        let text = report.to_string();
        assert!(text.contains("🔴 No MCP servers are currently running"));
        assert!(text.contains("📝 No log files found"));
        assert_eq!(report.missing, vec!["math-server", "weather-server"]);
        assert!(text.ends_with("  Check:      check-servers"));
    }

    #[test]
    fn status_with_everything_running() {
        let dir = tempfile::tempdir().unwrap();
        let report = StatusReport::gather(
            &config_in(dir.path()),
            fake_find(&[("math-server", 10), ("weather-server", 11), ("weather-server", 12)]),
        );
        assert!(report.missing.is_empty());
        assert_eq!(report.running.len(), 3);
        assert!(report.to_string().contains("✅ All expected servers are running!"));
    }

    #[test]
    fn stop_counts_only_delivered_signals() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("weather-server.log"), "x\n").unwrap();
        let signalled = RefCell::new(Vec::new());

        let report = StopReport::stop_all(
            &config_in(dir.path()),
            fake_find(&[("weather-server", 5), ("weather-server", 6), ("weather-server", 7)]),
            |pid| {
                signalled.borrow_mut().push(pid);
                match pid {
                    5 => Ok(true),
                    6 => Ok(false),
                    _ => Err(SupervisorError::Unsupported("test")),
                }
            },
        );

        assert_eq!(*signalled.borrow(), vec![5, 6, 7]);
        assert_eq!(report.stopped, 1);
        assert_eq!(
            report.events,
            vec![
                StopEvent::NotRunning { name: "math-server".to_string() },
                StopEvent::Stopping { name: "weather-server".to_string(), pid: 5 },
            ]
        );
        assert_eq!(
            report.kept_logs,
            vec![dir.path().join("weather-server.log").display().to_string()]
        );

        let text = report.to_string();
        assert!(text.contains("✅ math-server not running\n"));
        assert!(text.contains("🛑 Stopping weather-server (PID: 5)\n"));
        assert!(text.contains("✅ Stopped 1 server process(es)"));
        assert!(text.contains("(keeping for reference)"));
        assert!(text.ends_with("🏁 Done!"));
    }

    #[test]
    fn stop_with_nothing_running() {
        let dir = tempfile::tempdir().unwrap();
        let report = StopReport::stop_all(&config_in(dir.path()), fake_find(&[]), |_| {
            panic!("nothing should be signalled")
        });
        assert_eq!(report.stopped, 0);
        assert!(report.to_string().contains("✅ No MCP servers were running"));
    }

    #[test]
    fn stop_without_a_process_table_reports_no_status() {
        let dir = tempfile::tempdir().unwrap();
        let report = StopReport::stop_all(
            &config_in(dir.path()),
            |_: &str| Lookup {
                pids: Vec::new(),
                source: Source::Unavailable,
            },
            |_| panic!("nothing should be signalled"),
        );
        assert!(report.events.is_empty());
        assert!(!report.to_string().contains("not running"));
    }

    #[test]
    fn start_summary_lists_servers_and_log_hints() {
        let config = config_in(Path::new("."));
        let started = vec![LaunchedServer {
            server: ManagedServer::new("math-server", 3001),
            pid: 4321,
        }];

        let text = StartSummary::new(&config, started).to_string();
        assert!(text.contains("🎉 All servers started!"));
        assert!(text.contains("  • Math Server (PID: 4321)\n"));
        assert!(text.ends_with("  tail -f math-server.log\n  tail -f weather-server.log"));

        let empty = StartSummary::new(&config, Vec::new());
        assert!(!empty.any_started());
        assert_eq!(empty.to_string(), "❌ No servers were started successfully");
    }
}
