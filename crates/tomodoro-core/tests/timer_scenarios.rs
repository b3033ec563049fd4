//! End-to-end timer scenarios.
//!
//! The reducer-level scenarios run synchronously; the driver-level ones use
//! a paused tokio clock so a full 25-minute session elapses instantly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tomodoro_core::{
    reduce, Action, Chime, ChimeError, Event, PomodoroSettings, PomodoroState, PomodoroStore,
    SettingsPatch, TimerDriver, TimerMode, TimerStatus, Tone,
};

#[derive(Default)]
struct CountingChime(AtomicUsize);

impl Chime for CountingChime {
    fn play(&self, tones: &[Tone]) -> Result<(), ChimeError> {
        assert_eq!(tones.len(), 3);
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Tick until zero, then complete the way the driver would.
fn run_phase(state: PomodoroState) -> PomodoroState {
    let mut s = reduce(&state, &Action::StartTimer);
    while !s.at_zero_crossing() {
        s = reduce(&s, &Action::Tick);
    }
    reduce(&s, &Action::CompleteSession)
}

// ============================================================================
// Reducer scenarios
// ============================================================================

#[test]
fn full_work_session_with_defaults() {
    let mut s = reduce(&PomodoroState::default(), &Action::StartTimer);
    for _ in 0..1500 {
        s = reduce(&s, &Action::Tick);
    }
    assert_eq!(s.time_remaining, 0);
    assert!(s.at_zero_crossing());

    let s = reduce(&s, &Action::CompleteSession);
    assert_eq!(s.mode, TimerMode::ShortBreak);
    assert_eq!(s.status, TimerStatus::Idle);
    assert_eq!(s.time_remaining, 300);
    assert_eq!(s.completed_pomodoros, 1);
}

#[test]
fn fourth_cycle_earns_long_break() {
    let mut s = PomodoroState::default();
    let mut breaks = Vec::new();
    for _ in 0..4 {
        s = run_phase(s); // work -> break
        breaks.push(s.mode);
        if s.completed_pomodoros < 4 {
            s = run_phase(s); // break -> work
            assert_eq!(s.mode, TimerMode::Work);
        }
    }
    assert_eq!(
        breaks,
        vec![
            TimerMode::ShortBreak,
            TimerMode::ShortBreak,
            TimerMode::ShortBreak,
            TimerMode::LongBreak
        ]
    );
    assert_eq!(s.time_remaining, s.settings.long_break_duration);
    assert_eq!(s.completed_pomodoros, 4);
    assert_eq!(s.points(), 100);
}

#[test]
fn settings_update_applies_only_when_idle() {
    let patch = SettingsPatch {
        work_duration: Some(1500),
        ..Default::default()
    };
    let base = PomodoroState::new(PomodoroSettings {
        work_duration: 600,
        ..Default::default()
    });

    let idle = reduce(&base, &Action::UpdateSettings(patch));
    assert_eq!(idle.time_remaining, 1500);

    let mut running = reduce(&base, &Action::StartTimer);
    running = reduce(&running, &Action::Tick);
    let updated = reduce(&running, &Action::UpdateSettings(patch));
    assert_eq!(updated.time_remaining, 599);
    assert_eq!(updated.settings.work_duration, 1500);

    // The new length takes effect on the next reset.
    let reset = reduce(&updated, &Action::ResetTimer);
    assert_eq!(reset.time_remaining, 1500);
}

#[test]
fn store_guards_the_interval() {
    let mut store = PomodoroStore::default();
    let err = store
        .update_settings(SettingsPatch {
            long_break_interval: Some(0),
            ..Default::default()
        })
        .unwrap_err();
    assert!(err.to_string().contains("long_break_interval"));
}

// ============================================================================
// Driver scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn driver_completes_default_work_session() {
    let chime = Arc::new(CountingChime::default());
    let handle = TimerDriver::new(PomodoroStore::default())
        .with_chime(chime.clone())
        .spawn();

    handle.start_timer().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1500) + Duration::from_millis(500)).await;

    let s = handle.state().unwrap();
    assert_eq!(s.mode, TimerMode::ShortBreak);
    assert_eq!(s.status, TimerStatus::Idle);
    assert_eq!(s.time_remaining, 300);
    assert_eq!(s.completed_pomodoros, 1);
    assert_eq!(chime.0.load(Ordering::SeqCst), 1);

    // Idle after completion: nothing moves.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.state().unwrap().time_remaining, 300);
}

#[tokio::test(start_paused = true)]
async fn driver_runs_four_cycles_into_long_break() {
    let chime = Arc::new(CountingChime::default());
    let settings = PomodoroSettings {
        work_duration: 5,
        short_break_duration: 2,
        long_break_duration: 7,
        long_break_interval: 4,
    };
    let handle = TimerDriver::new(PomodoroStore::with_settings(settings).unwrap())
        .with_chime(chime.clone())
        .spawn();
    let mut events = handle.subscribe();

    for cycle in 1..=4 {
        handle.start_timer().await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        let s = handle.state().unwrap();
        assert_eq!(s.completed_pomodoros, cycle);
        if cycle < 4 {
            assert_eq!(s.mode, TimerMode::ShortBreak);
            handle.start_timer().await.unwrap();
            tokio::time::sleep(Duration::from_secs(3)).await;
            assert_eq!(handle.state().unwrap().mode, TimerMode::Work);
        }
    }

    let s = handle.state().unwrap();
    assert_eq!(s.mode, TimerMode::LongBreak);
    assert_eq!(s.time_remaining, 7);
    assert_eq!(chime.0.load(Ordering::SeqCst), 7);

    let mut last_completion = None;
    while let Ok(event) = events.try_recv() {
        if let Event::SessionCompleted { to, .. } = event {
            last_completion = Some(to);
        }
    }
    assert_eq!(last_completion, Some(TimerMode::LongBreak));
}

#[tokio::test(start_paused = true)]
async fn driver_settings_update_respects_status() {
    let handle = TimerDriver::new(PomodoroStore::default())
        .with_chime(Arc::new(CountingChime::default()))
        .spawn();
    let patch = SettingsPatch {
        work_duration: Some(1200),
        ..Default::default()
    };

    let idle = handle.update_settings(patch).await.unwrap();
    assert_eq!(idle.time_remaining, 1200);

    handle.start_timer().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    let running = handle
        .update_settings(SettingsPatch {
            work_duration: Some(1500),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(running.status, TimerStatus::Running);
    assert_eq!(running.time_remaining, 1198);
    assert_eq!(running.settings.work_duration, 1500);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_the_ticker() {
    let chime = Arc::new(CountingChime::default());
    let store = PomodoroStore::new(PomodoroSettings {
        work_duration: 3,
        ..Default::default()
    });
    let handle = TimerDriver::new(store).with_chime(chime.clone()).spawn();
    let mut watcher = handle.watch();
    handle.start_timer().await.unwrap();
    drop(handle);

    // Sender side goes away once the actor exits.
    while watcher.changed().await.is_ok() {}
    assert_eq!(watcher.borrow().status, TimerStatus::Running);

    // A live ticker would have reached zero and rung by now.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(chime.0.load(Ordering::SeqCst), 0);
    assert_eq!(watcher.borrow().time_remaining, 3);
}
