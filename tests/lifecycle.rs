//! End-to-end timer lifecycle scenarios against `AppState`

mod common;

use std::{sync::atomic::Ordering, sync::Arc, time::Duration};

use chrono::Duration as ChronoDuration;
use tempfile::TempDir;

use common::{eventually, harness, harness_with, SwitchableStorage};
use timekeeper::{
    services::PermissionState,
    state::{ColorTag, NewTimer, TimerPhase},
    store::{FileStorage, MemoryStorage},
    tasks::completion_task,
    utils::Clock,
    TimerError,
};

fn coffee() -> NewTimer {
    NewTimer::new("Coffee", 0, 5, 0, ColorTag::Blue)
}

#[tokio::test]
async fn coffee_timer_runs_to_completion_and_rings() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    assert_eq!(timer.duration_seconds, 300);

    h.state.start_timer(&timer.id).unwrap();
    h.clock.advance_secs(300);

    let state = Arc::clone(&h.state);
    let id = timer.id.clone();
    assert!(eventually(|| state.get_timer(&id).unwrap().phase == TimerPhase::Completed).await);

    let view = h.state.get_timer(&timer.id).unwrap();
    assert!(!view.record.is_active);
    assert_eq!(view.record.completed_at, Some(h.clock.now()));
    assert_eq!(view.progress, 100.0);
    assert!(view.alarm_ringing);
    assert!(h.audio.playing.load(Ordering::SeqCst));

    let shown = h.platform.shown.lock().unwrap();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "Coffee completed!");
    assert_eq!(shown[0].tag, format!("timer-{}", timer.id));
}

#[tokio::test]
async fn running_view_tracks_remaining_time() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    h.state.start_timer(&timer.id).unwrap();

    h.clock.advance_secs(10);
    let state = Arc::clone(&h.state);
    let id = timer.id.clone();
    assert!(eventually(|| state.get_timer(&id).unwrap().remaining_seconds == 290).await);

    let view = h.state.get_timer(&timer.id).unwrap();
    assert_eq!(view.phase, TimerPhase::Running);
    assert_eq!(view.display, "04:50");
}

#[tokio::test]
async fn start_after_pause_restarts_the_full_duration() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    h.state.start_timer(&timer.id).unwrap();

    h.clock.advance_secs(10);
    let paused = h.state.pause_timer(&timer.id).unwrap();
    assert!(!paused.is_active);
    assert!(!h.state.engine().is_watching(&timer.id));

    let restarted = h.state.start_timer(&timer.id).unwrap();
    assert_eq!(restarted.end_time, Some(h.clock.now() + ChronoDuration::seconds(300)));
    assert_eq!(h.state.get_timer(&timer.id).unwrap().remaining_seconds, 300);
}

#[tokio::test]
async fn paused_timer_never_completes() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    h.state.start_timer(&timer.id).unwrap();
    h.state.pause_timer(&timer.id).unwrap();

    h.clock.advance_secs(600);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let view = h.state.get_timer(&timer.id).unwrap();
    assert_eq!(view.phase, TimerPhase::Idle);
    assert!(view.record.completed_at.is_none());
    assert!(h.platform.shown.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reset_after_completion_clears_and_silences() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    h.state.complete_timer(&timer.id).unwrap();
    assert!(h.state.is_ringing(&timer.id));
    assert!(h.audio.playing.load(Ordering::SeqCst));

    let reset = h.state.reset_timer(&timer.id).unwrap();
    assert!(!reset.is_active);
    assert!(reset.completed_at.is_none());
    assert!(reset.end_time.is_none());
    assert!(!h.state.is_ringing(&timer.id));
    assert!(!h.audio.playing.load(Ordering::SeqCst));
}

#[tokio::test]
async fn stop_alarm_keeps_the_timer_completed() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    h.state.complete_timer(&timer.id).unwrap();

    h.state.stop_alarm(&timer.id);

    let view = h.state.get_timer(&timer.id).unwrap();
    assert_eq!(view.phase, TimerPhase::Completed);
    assert!(!view.alarm_ringing);
    assert!(!h.state.alerts().is_sounding());
}

#[tokio::test]
async fn completion_without_permission_only_marks_completed() {
    let h = harness(PermissionState::Denied);
    let timer = h.state.create_timer(coffee()).unwrap();

    h.state.complete_timer(&timer.id).unwrap();

    let view = h.state.get_timer(&timer.id).unwrap();
    assert_eq!(view.phase, TimerPhase::Completed);
    assert!(!view.alarm_ringing);
    assert_eq!(h.audio.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn deleted_timer_cannot_be_started() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    h.state.start_timer(&timer.id).unwrap();

    assert!(h.state.delete_timer(&timer.id).is_some());
    assert!(!h.state.engine().is_watching(&timer.id));
    assert!(h.state.delete_timer(&timer.id).is_none());
    assert_eq!(
        h.state.start_timer(&timer.id),
        Err(TimerError::NotFound(timer.id.clone()))
    );
}

#[tokio::test]
async fn stale_completion_is_ignored() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    let first = h.state.start_timer(&timer.id).unwrap();

    h.clock.advance_secs(5);
    h.state.start_timer(&timer.id).unwrap();

    h.state.handle_completion(&timer.id, first.end_time.unwrap());
    assert_eq!(h.state.get_timer(&timer.id).unwrap().phase, TimerPhase::Running);
}

#[tokio::test]
async fn completion_after_reset_is_ignored() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    let started = h.state.start_timer(&timer.id).unwrap();

    h.state.reset_timer(&timer.id).unwrap();
    h.state.handle_completion(&timer.id, started.end_time.unwrap());

    let view = h.state.get_timer(&timer.id).unwrap();
    assert_eq!(view.phase, TimerPhase::Idle);
    assert!(!view.alarm_ringing);
    assert!(h.platform.shown.lock().unwrap().is_empty());
    assert!(!h.audio.playing.load(Ordering::SeqCst));
}

#[tokio::test]
async fn repeated_completion_announces_once() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();
    let end_time = h.state.start_timer(&timer.id).unwrap().end_time.unwrap();

    h.state.handle_completion(&timer.id, end_time);
    h.state.handle_completion(&timer.id, end_time);

    assert_eq!(h.state.get_timer(&timer.id).unwrap().phase, TimerPhase::Completed);
    assert_eq!(h.platform.shown.lock().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_reset_and_completion_stay_consistent() {
    let h = harness(PermissionState::Granted);
    let timer = h.state.create_timer(coffee()).unwrap();

    for _ in 0..200 {
        let end_time = h.state.start_timer(&timer.id).unwrap().end_time.unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| h.state.handle_completion(&timer.id, end_time));
            scope.spawn(|| h.state.reset_timer(&timer.id).unwrap());
        });

        let view = h.state.get_timer(&timer.id).unwrap();
        assert_eq!(view.phase, TimerPhase::Idle);
        assert!(view.record.end_time.is_none());
        assert!(view.record.completed_at.is_none());
        assert!(!view.alarm_ringing);
        assert!(!h.audio.playing.load(Ordering::SeqCst));
    }
}

#[tokio::test]
async fn failed_reload_keeps_running_timers() {
    let storage = SwitchableStorage::default();
    let fail_reads = Arc::clone(&storage.fail_reads);
    let (h, events) = harness_with(Box::new(storage), PermissionState::Granted);
    tokio::spawn(completion_task(Arc::clone(&h.state), events));

    let timer = h.state.create_timer(coffee()).unwrap();
    h.state.start_timer(&timer.id).unwrap();

    fail_reads.store(true, Ordering::SeqCst);
    assert!(h.state.reload_timers().is_err());
    assert_eq!(h.state.list_timers().len(), 1);
    assert!(h.state.engine().is_watching(&timer.id));

    h.state.create_timer(NewTimer::new("Tea", 0, 3, 0, ColorTag::Green)).unwrap();
    fail_reads.store(false, Ordering::SeqCst);
    h.state.reload_timers().unwrap();

    let titles: Vec<_> = h
        .state
        .list_timers()
        .into_iter()
        .map(|t| t.record.title)
        .collect();
    assert_eq!(titles, vec!["Tea", "Coffee"]);
    assert!(h.state.engine().is_watching(&timer.id));

    h.clock.advance_secs(300);
    let state = Arc::clone(&h.state);
    let id = timer.id.clone();
    assert!(eventually(|| state.get_timer(&id).unwrap().phase == TimerPhase::Completed).await);
}

#[tokio::test]
async fn lost_completion_event_is_recovered_by_reload() {
    let (h, mut events) = harness_with(
        Box::new(MemoryStorage::default()),
        PermissionState::Granted,
    );
    let timer = h.state.create_timer(coffee()).unwrap();
    h.state.start_timer(&timer.id).unwrap();

    h.clock.advance_secs(300);
    let lost = tokio::time::timeout(Duration::from_secs(1), events.recv()).await.unwrap();
    assert!(lost.is_some());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(h.state.get_timer(&timer.id).unwrap().phase, TimerPhase::Running);

    h.state.reload_timers().unwrap();
    tokio::spawn(completion_task(Arc::clone(&h.state), events));

    let state = Arc::clone(&h.state);
    let id = timer.id.clone();
    assert!(eventually(|| state.get_timer(&id).unwrap().phase == TimerPhase::Completed).await);
    assert_eq!(h.platform.shown.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn running_timers_recover_after_restart() {
    let dir = TempDir::new().unwrap();

    let (first, _events) = harness_with(
        Box::new(FileStorage::new(dir.path()).unwrap()),
        PermissionState::Granted,
    );
    let timer = first.state.create_timer(coffee()).unwrap();
    let started = first.state.start_timer(&timer.id).unwrap();
    first.state.shutdown();
    drop(first);

    let (second, events) = harness_with(
        Box::new(FileStorage::new(dir.path()).unwrap()),
        PermissionState::Granted,
    );
    assert_eq!(second.state.get_timer(&timer.id).unwrap().record, started);

    // The process was down past the end time
    second.clock.set(started.end_time.unwrap() + ChronoDuration::seconds(60));
    tokio::spawn(completion_task(Arc::clone(&second.state), events));
    assert_eq!(second.state.recover_running_timers(), 1);

    let state = Arc::clone(&second.state);
    let id = timer.id.clone();
    assert!(eventually(|| state.get_timer(&id).unwrap().phase == TimerPhase::Completed).await);
}
