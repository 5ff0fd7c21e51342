//! Checked process primitives: fork, wait, kill, immediate exit.

use std::fmt;

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use serde::Serialize;

use crate::error::{Result, SumError};

/// Which side of a fork the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forked {
    Parent { child: Pid },
    Child,
}

/// Create a child process.
///
/// # Safety
/// Same contract as [`nix::unistd::fork`]: in a multi-threaded process the
/// child may only call async-signal-safe functions before it exits.
pub unsafe fn fork() -> Result<Forked> {
    match unistd::fork() {
        Ok(ForkResult::Parent { child }) => Ok(Forked::Parent { child }),
        Ok(ForkResult::Child) => Ok(Forked::Child),
        Err(e) => Err(SumError::sys("fork", e)),
    }
}

pub fn current_pid() -> Pid {
    unistd::getpid()
}

/// How a reaped child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    Exited { code: i32 },
    Signaled { signal: i32, core_dumped: bool },
}

impl Termination {
    fn from_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(Self::Exited { code }),
            WaitStatus::Signaled(_, signal, core_dumped) => Some(Self::Signaled {
                signal: signal as i32,
                core_dumped,
            }),
            _ => None,
        }
    }

    /// Exited with status 0.
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Exited { code: 0 })
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Exited { code } => write!(f, "exited with status {}", code),
            Self::Signaled { signal, core_dumped } => {
                match Signal::try_from(signal) {
                    Ok(sig) => write!(f, "killed by {}", sig.as_str())?,
                    Err(_) => write!(f, "killed by signal {}", signal)?,
                }
                if core_dumped {
                    write!(f, " (core dumped)")?;
                }
                Ok(())
            }
        }
    }
}

/// Block until `pid` terminates.
///
/// `EINTR` from a completion signal arriving mid-wait restarts the call;
/// any other failure is returned.
pub fn wait_for(pid: Pid) -> Result<Termination> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(termination) = Termination::from_status(status) {
                    return Ok(termination);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(SumError::sys("waitpid", e)),
        }
    }
}

/// Reap `pid` if it already terminated, without blocking.
pub fn try_wait(pid: Pid) -> Result<Option<Termination>> {
    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(status) => Ok(Termination::from_status(status)),
        Err(Errno::EINTR) => Ok(None),
        Err(e) => Err(SumError::sys("waitpid", e)),
    }
}

/// Send SIGKILL to `pid`. A child that already exited is not an error.
pub fn kill(pid: Pid) -> Result<()> {
    match signal::kill(pid, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(SumError::sys("kill", e)),
    }
}

/// Terminate the calling process without running destructors or flushing
/// inherited stdio buffers.
pub fn exit_now(code: i32) -> ! {
    // SAFETY: _exit is async-signal-safe and never returns.
    unsafe { libc::_exit(code) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::Exited { code: 0 }.to_string(), "exited with status 0");
        let killed = Termination::Signaled {
            signal: libc::SIGKILL,
            core_dumped: false,
        };
        assert_eq!(killed.to_string(), "killed by SIGKILL");
        assert!(!killed.is_normal());
        assert!(!Termination::Exited { code: 1 }.is_normal());
    }

    #[test]
    fn test_termination_serializes_tagged() {
        let json = serde_json::to_value(Termination::Exited { code: 0 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "exited", "code": 0 }));
    }
}
