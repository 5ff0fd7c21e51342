//! Completion handler behaviour with signals sent to this process.

use std::time::Duration;

use sigsum::aggregate::handler::tally;
use sigsum::aggregate::CompletionHandler;
use sigsum::sys::{process, signal};

mod common;

#[test]
fn test_queued_signal_is_recorded() {
    let _serial = common::serial();
    let signo = signal::realtime(5).unwrap();
    let handler = CompletionHandler::install(signo).unwrap();
    let before = handler.tally().received();
    let total_before = handler.tally().total();

    signal::queue(process::current_pid(), signo, 1234).unwrap();

    assert!(common::wait_until(Duration::from_secs(5), || tally().received() == before + 1));
    assert_eq!(tally().total(), total_before + 1234);

    let receipt = tally().receipt(before).expect("receipt written");
    assert_eq!(receipt.sender, process::current_pid().as_raw());
    assert_eq!(receipt.value, 1234);

    handler.uninstall().unwrap();
}

#[test]
fn test_several_queued_signals_are_not_merged() {
    let _serial = common::serial();
    let signo = signal::realtime(6).unwrap();
    let handler = CompletionHandler::install(signo).unwrap();
    let before = handler.tally().received();
    let total_before = handler.tally().total();

    let set = signal::signal_set(signo).unwrap();
    let previous = signal::block(&set).unwrap();
    for value in 1..=10 {
        signal::queue(process::current_pid(), signo, value).unwrap();
    }
    signal::set_mask(&previous).unwrap();

    assert!(common::wait_until(Duration::from_secs(5), || tally().received() == before + 10));
    assert_eq!(tally().total(), total_before + 55);

    handler.uninstall().unwrap();
}

#[test]
fn test_plain_kill_is_stray() {
    let _serial = common::serial();
    let signo = signal::realtime(7).unwrap();
    let handler = CompletionHandler::install(signo).unwrap();
    let received = handler.tally().received();
    let stray = handler.tally().stray();

    // SAFETY: kill has no memory-safety preconditions.
    let ret = unsafe { libc::kill(libc::getpid(), signo) };
    assert_eq!(ret, 0);

    assert!(common::wait_until(Duration::from_secs(5), || tally().stray() == stray + 1));
    assert_eq!(tally().received(), received);

    drop(handler);
}
