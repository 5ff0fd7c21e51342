//! Checked signal primitives.
//!
//! Thin wrappers over `sigaction`, `sigemptyset`/`sigaddset`,
//! `pthread_sigmask` and `sigqueue`. `nix::sys::signal::Signal` has no
//! variants for the real-time range, so these go through `libc` and map the
//! return codes through `Errno`.

use std::mem;
use std::ptr;

use libc::{c_int, c_void, siginfo_t, sigset_t};
use nix::errno::Errno;
use nix::unistd::Pid;

use crate::error::{Result, SumError};

/// Signature of an `SA_SIGINFO` handler.
pub type InfoHandler = extern "C" fn(c_int, *mut siginfo_t, *mut c_void);

/// Largest usable offset above SIGRTMIN.
pub fn max_rt_offset() -> i32 {
    libc::SIGRTMAX() - libc::SIGRTMIN()
}

/// Resolve `SIGRTMIN + offset`.
pub fn realtime(offset: u8) -> Result<c_int> {
    let max = max_rt_offset();
    if i32::from(offset) > max {
        return Err(SumError::SignalOutOfRange { offset, max });
    }
    Ok(libc::SIGRTMIN() + i32::from(offset))
}

/// A disposition saved by [`install_info_handler`].
pub struct Disposition(libc::sigaction);

/// Install `handler` for `signo` with `SA_SIGINFO`, no `SA_RESTART` and an
/// empty handler mask. Returns the previous disposition.
pub fn install_info_handler(signo: c_int, handler: InfoHandler) -> Result<Disposition> {
    // SAFETY: sigaction is plain data; all-zero is a valid starting value.
    let mut action: libc::sigaction = unsafe { mem::zeroed() };
    action.sa_sigaction = handler as libc::sighandler_t;
    action.sa_flags = libc::SA_SIGINFO;
    action.sa_mask = empty_set()?;

    // SAFETY: as above.
    let mut previous: libc::sigaction = unsafe { mem::zeroed() };
    // SAFETY: both pointers reference live, initialized values.
    let ret = unsafe { libc::sigaction(signo, &action, &mut previous) };
    Errno::result(ret).map_err(|e| SumError::sys("sigaction", e))?;

    Ok(Disposition(previous))
}

/// Reinstate a disposition saved by [`install_info_handler`].
pub fn restore(signo: c_int, previous: &Disposition) -> Result<()> {
    // SAFETY: `previous.0` was filled in by the kernel.
    let ret = unsafe { libc::sigaction(signo, &previous.0, ptr::null_mut()) };
    Errno::result(ret)
        .map(drop)
        .map_err(|e| SumError::sys("sigaction", e))
}

fn empty_set() -> Result<sigset_t> {
    // SAFETY: sigemptyset initializes the set before it is read.
    let mut set: sigset_t = unsafe { mem::zeroed() };
    let ret = unsafe { libc::sigemptyset(&mut set) };
    Errno::result(ret).map_err(|e| SumError::sys("sigemptyset", e))?;
    Ok(set)
}

/// A set containing only `signo`.
pub fn signal_set(signo: c_int) -> Result<sigset_t> {
    let mut set = empty_set()?;
    // SAFETY: `set` was initialized by sigemptyset.
    let ret = unsafe { libc::sigaddset(&mut set, signo) };
    Errno::result(ret).map_err(|e| SumError::sys("sigaddset", e))?;
    Ok(set)
}

fn change_mask(how: c_int, set: *const sigset_t) -> Result<sigset_t> {
    // SAFETY: pthread_sigmask writes the old mask before returning 0.
    let mut previous: sigset_t = unsafe { mem::zeroed() };
    let ret = unsafe { libc::pthread_sigmask(how, set, &mut previous) };
    if ret != 0 {
        return Err(SumError::sys("pthread_sigmask", Errno::from_raw(ret)));
    }
    Ok(previous)
}

/// Add `set` to the calling thread's mask. Returns the mask before the call.
pub fn block(set: &sigset_t) -> Result<sigset_t> {
    change_mask(libc::SIG_BLOCK, set)
}

/// Remove `set` from the calling thread's mask.
pub fn unblock(set: &sigset_t) -> Result<()> {
    change_mask(libc::SIG_UNBLOCK, set).map(drop)
}

/// Replace the calling thread's mask.
pub fn set_mask(mask: &sigset_t) -> Result<()> {
    change_mask(libc::SIG_SETMASK, mask).map(drop)
}

/// Whether `signo` is blocked in the calling thread.
pub fn is_blocked(signo: c_int) -> Result<bool> {
    let current = change_mask(libc::SIG_BLOCK, ptr::null())?;
    // SAFETY: `current` was filled in by pthread_sigmask.
    let ret = unsafe { libc::sigismember(&current, signo) };
    Errno::result(ret)
        .map(|member| member == 1)
        .map_err(|e| SumError::sys("sigismember", e))
}

/// Queue `signo` to `pid` carrying `payload` in the pointer-sized field of
/// `sigval`.
///
/// Async-signal-safe: usable from a freshly forked child.
pub fn queue(pid: Pid, signo: c_int, payload: isize) -> Result<()> {
    let value = libc::sigval {
        sival_ptr: payload as *mut c_void,
    };
    // SAFETY: sigqueue only reads its arguments.
    let ret = unsafe { libc::sigqueue(pid.as_raw(), signo, value) };
    Errno::result(ret)
        .map(drop)
        .map_err(|e| SumError::sys("sigqueue", e))
}

/// Payload and sender of a delivered `SA_SIGINFO` signal.
///
/// Returns `None` unless the signal was produced by `sigqueue`.
///
/// # Safety
/// `info` must be the pointer the kernel passed to an `SA_SIGINFO` handler.
pub unsafe fn queued_payload(info: *const siginfo_t) -> Option<(i32, isize)> {
    let info = info.as_ref()?;
    if info.si_code != libc::SI_QUEUE {
        return None;
    }
    Some((info.si_pid(), info.si_value().sival_ptr as isize))
}
