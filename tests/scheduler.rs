// tests/scheduler.rs
//
// Background refresh loop: repeats, survives failing cycles, never overlaps, stops.
//
mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dex_board::board::BoardCell;
use dex_board::config::FetchOptions;
use dex_board::error::FetchError;
use dex_board::fetch::RemoteDir;
use dex_board::pipeline::Pipeline;
use dex_board::scheduler::{run_guarded, CycleOutcome, Scheduler, SchedulerHandle, SchedulerState};

use common::{options, serving, MemDir};

fn wait_for(handle: &SchedulerHandle, cycles: usize) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while handle.cycles_completed() < cycles {
        assert!(Instant::now() < deadline, "scheduler stalled at {} cycles", handle.cycles_completed());
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn publishes_and_repeats() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(tmp.path());
    let remote = MemDir::with_files(&[("a.json", r#"{"name": "A", "pokedex": {"caughtCount": 3}}"#)]);
    let board = Arc::new(BoardCell::new());
    let pipeline = Pipeline::new(opts.clone(), Arc::clone(&board)).with_connector(serving(remote));

    let handle = Scheduler::new(pipeline, opts.schedule.interval).spawn().unwrap();
    wait_for(&handle, 2);
    assert_eq!(handle.cycles_failed(), 0);
    handle.stop();

    let current = board.current().unwrap();
    assert_eq!(current.pairs(), vec![("A".to_string(), 3)]);
}

#[test]
fn panicking_cycle_does_not_stop_the_loop() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(tmp.path());
    let pipeline = Pipeline::new(opts.clone(), Arc::new(BoardCell::new())).with_connector(Box::new(
        |_: &FetchOptions| -> Result<Box<dyn RemoteDir>, FetchError> { panic!("transport blew up") },
    ));

    let handle = Scheduler::new(pipeline, opts.schedule.interval).spawn().unwrap();
    wait_for(&handle, 3);
    assert!(handle.cycles_failed() >= 3);
    handle.stop();
}

#[test]
fn guarded_cycle_reports_outcome() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(tmp.path());
    let ok = Pipeline::new(opts.clone(), Arc::new(BoardCell::new())).with_connector(serving(MemDir::with_files(&[])));
    assert_eq!(run_guarded(&ok), CycleOutcome::Published);

    let boom = Pipeline::new(opts, Arc::new(BoardCell::new())).with_connector(Box::new(
        |_: &FetchOptions| -> Result<Box<dyn RemoteDir>, FetchError> { panic!("boom") },
    ));
    assert_eq!(run_guarded(&boom), CycleOutcome::Panicked);
}

#[test]
fn cycles_never_overlap() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = options(tmp.path());
    opts.schedule.interval = Duration::from_millis(1);

    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (flight, top) = (Arc::clone(&in_flight), Arc::clone(&peak));
    let pipeline = Pipeline::new(opts.clone(), Arc::new(BoardCell::new())).with_connector(Box::new(
        move |_: &FetchOptions| -> Result<Box<dyn RemoteDir>, FetchError> {
            let now = flight.fetch_add(1, Ordering::SeqCst) + 1;
            top.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Box::new(MemDir::with_files(&[])))
        },
    ));

    let handle = Scheduler::new(pipeline, opts.schedule.interval).spawn().unwrap();
    wait_for(&handle, 3);
    handle.stop();
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[test]
fn stop_returns_promptly_with_long_interval() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(tmp.path());
    let pipeline = Pipeline::new(opts, Arc::new(BoardCell::new())).with_connector(serving(MemDir::with_files(&[])));

    let handle = Scheduler::new(pipeline, Duration::from_secs(3600)).spawn().unwrap();
    wait_for(&handle, 1);
    assert_eq!(handle.state(), SchedulerState::Idle);

    let started = Instant::now();
    handle.stop();
    assert!(started.elapsed() < Duration::from_secs(5));
}
