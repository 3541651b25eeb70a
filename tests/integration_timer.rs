// Drives the interval timer through the runtime's step loop the way the
// app does: every timeout from the event source becomes one 1-second
// transition. Uses the capturing notifier to check the advisory cues.

use std::sync::mpsc;
use std::time::Duration;

use steelcore::notify::{NoopNotifier, Notifier, RecordingNotifier};
use steelcore::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use steelcore::timer::{IntervalTimer, Phase, Preset};

#[test]
fn headless_session_completes_via_runner() {
    let preset = Preset {
        rounds: 3,
        work_secs: 10,
        rest_secs: 5,
    };
    let mut timer = IntervalTimer::new(preset);
    timer.start(&NoopNotifier);

    let (_tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(1));
    let runner = Runner::new(es, ticker);

    // Bounded loop; the session needs exactly 40 transitions
    for _ in 0..100u32 {
        if let AppEvent::Tick = runner.step() {
            timer.tick(&NoopNotifier);
        }
        if timer.is_done() {
            break;
        }
    }

    assert!(timer.is_done(), "session should have completed");
    assert_eq!(timer.elapsed_secs(), 40);

    let handoff = timer.handoff().unwrap();
    assert_eq!(handoff.suggested_minutes, 1);
}

#[test]
fn phase_walkthrough_matches_preset() {
    let preset = Preset {
        rounds: 3,
        work_secs: 10,
        rest_secs: 5,
    };
    let mut timer = IntervalTimer::new(preset);
    timer.start(&NoopNotifier);

    for _ in 0..10 {
        timer.tick(&NoopNotifier);
    }
    assert_eq!(timer.phase(), Phase::Rest);
    assert_eq!(timer.time_left(), 5);
    assert_eq!(timer.round(), 1);

    for _ in 0..5 {
        timer.tick(&NoopNotifier);
    }
    assert_eq!(timer.phase(), Phase::Work);
    assert_eq!(timer.round(), 2);

    for _ in 0..(10 + 5 + 10) {
        timer.tick(&NoopNotifier);
    }
    assert_eq!(timer.phase(), Phase::Done);
    assert_eq!(timer.elapsed_secs(), 40);
}

#[test]
fn reset_mid_rest_discards_everything() {
    let preset = Preset {
        rounds: 3,
        work_secs: 10,
        rest_secs: 5,
    };
    let mut timer = IntervalTimer::new(preset);
    timer.start(&NoopNotifier);

    for _ in 0..(10 + 5 + 10 + 1) {
        timer.tick(&NoopNotifier);
    }
    assert_eq!(timer.phase(), Phase::Rest);
    assert_eq!(timer.round(), 2);

    timer.reset();
    assert_eq!(timer.phase(), Phase::Idle);
    assert_eq!(timer.round(), 1);
    assert_eq!(timer.time_left(), preset.work_secs);
    assert_eq!(timer.elapsed_secs(), 0);
    assert!(timer.handoff().is_none());
}

#[test]
fn custom_preset_clamps_instead_of_rejecting() {
    let preset = Preset::custom(99, 0);
    assert_eq!(preset.work_secs / 60, 60);
    assert_eq!(preset.rounds, 1);
}

#[test]
fn cues_fire_at_countdown_and_transitions_only() {
    let preset = Preset {
        rounds: 2,
        work_secs: 6,
        rest_secs: 5,
    };
    let mut timer = IntervalTimer::new(preset);
    let notifier = RecordingNotifier::new();

    timer.start(&notifier);
    for _ in 0..(6 + 5 + 6) {
        timer.tick(&notifier);
    }
    assert!(timer.is_done());

    let announced = notifier.announcements.borrow().clone();
    assert_eq!(
        announced,
        vec![
            "Work round 1",
            "3",
            "2",
            "1",
            "Rest",
            "3",
            "2",
            "1",
            "Work round 2",
            "3",
            "2",
            "1",
            "Session complete",
        ]
    );
}

#[test]
fn notifier_failures_cannot_break_the_timer() {
    // A notifier whose announce panics would violate best-effort; the
    // port has no Result to surface, so a silent sink is the contract.
    struct SilentSink;
    impl Notifier for SilentSink {
        fn announce(&self, _text: &str) {}
        fn vibrate(&self, _pattern_ms: &[u64]) {}
    }

    let mut timer = IntervalTimer::new(Preset {
        rounds: 1,
        work_secs: 2,
        rest_secs: 0,
    });
    timer.start(&SilentSink);
    timer.tick(&SilentSink);
    timer.tick(&SilentSink);
    assert!(timer.is_done());
}
