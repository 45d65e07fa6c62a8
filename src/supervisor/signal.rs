//! SIGTERM delivery to single processes and whole process groups.

use super::SupervisorError;

/// Send SIGTERM to `pid`.
///
/// Returns `Ok(false)` if the process no longer exists.
#[cfg(unix)]
pub fn terminate(pid: i32) -> Result<bool, SupervisorError> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Send SIGTERM to the process group led by `pid`.
///
/// Returns `Ok(false)` if the group no longer exists.
#[cfg(unix)]
pub fn terminate_group(pid: i32) -> Result<bool, SupervisorError> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::{getpgid, Pid};

    let pgid = match getpgid(Some(Pid::from_raw(pid))) {
        Ok(pgid) => pgid,
        Err(Errno::ESRCH) => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    match killpg(pgid, Signal::SIGTERM) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(unix))]
pub fn terminate(_pid: i32) -> Result<bool, SupervisorError> {
    Err(SupervisorError::Unsupported("stopping servers"))
}

#[cfg(not(unix))]
pub fn terminate_group(_pid: i32) -> Result<bool, SupervisorError> {
    Err(SupervisorError::Unsupported("stopping servers"))
}
