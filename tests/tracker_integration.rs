//! Pointer tracker integration tests
//!
//! Exercise the public surface end to end: a virtual source drives the
//! tracker, records are drained from the queue and polls read the
//! accumulators.

use std::sync::Arc;
use std::thread;

use lamco_pointer_queue::input::{
    EventRecord, PointerMode, PointerTracker, RecordKind, VirtualSource, ACTION_PRESSED,
    ACTION_RELEASED, NOTCH_SCALE, RAW_BUTTON_MIDDLE, RAW_BUTTON_PRIMARY, RAW_BUTTON_SECONDARY,
    RECORD_SIZE,
};
use proptest::prelude::*;

fn registered(
    width: i32,
    height: i32,
    capacity: usize,
) -> (Arc<VirtualSource>, Arc<PointerTracker>) {
    let source = VirtualSource::with_surface(width, height);
    let tracker = Arc::new(PointerTracker::with_queue_capacity(capacity));
    tracker.register(&source);
    (source, tracker)
}

#[test]
fn test_windowed_motion_sequence() {
    let (source, tracker) = registered(1024, 768, 64);

    // Registration anchors at the flipped centre (512, 767 - 384)
    assert_eq!(tracker.position(), (512, 383));

    source.move_to(522, 384, 1);
    source.move_to(530, 374, 2);

    let mut coords = [0; 3];
    let mut buttons = [0; 3];
    tracker.poll(&mut coords, &mut buttons);
    assert_eq!(coords, [530, 393, 0]);

    let state = tracker.state();
    assert_eq!(state.accum_dx, 0);
    assert_eq!(state.accum_dy, 0);

    let records = tracker.queue().drain_records().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], EventRecord::motion(522, 383, 1));
    assert_eq!(records[1], EventRecord::motion(530, 393, 2));
}

#[test]
fn test_captured_round_trip() {
    let (source, tracker) = registered(800, 600, 64);
    tracker.set_grabbed(true);
    assert_eq!(tracker.mode(), PointerMode::Captured);

    source.raw_delta(3, -4, 10);
    source.raw_delta(7, 1, 11);
    source.move_to(1, 1, 12);

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.coords, [10, -3, 0]);

    tracker.set_grabbed(false);
    assert_eq!(tracker.mode(), PointerMode::Windowed);
    assert!(tracker.queue().is_empty());
    assert_eq!(tracker.snapshot().coords[2], 0);
}

#[test]
fn test_chorded_middle_click() {
    let (source, tracker) = registered(640, 480, 64);

    source
        .button(RAW_BUTTON_PRIMARY, ACTION_PRESSED, true, 1)
        .unwrap();
    assert_eq!(tracker.buttons(), [0, 1, 0]);

    // Modifier released before the button: release still goes to middle
    source
        .button(RAW_BUTTON_PRIMARY, ACTION_RELEASED, false, 2)
        .unwrap();
    assert_eq!(tracker.buttons(), [0, 0, 0]);

    let records = tracker.queue().drain_records().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.button == 1));
    assert!(records.iter().all(|r| r.kind() == RecordKind::Button));
    assert_eq!(records[0].state, 1);
    assert_eq!(records[1].state, 0);
}

#[test]
fn test_physical_middle_then_chord_suppressed() {
    let (source, tracker) = registered(640, 480, 64);

    source
        .button(RAW_BUTTON_MIDDLE, ACTION_PRESSED, false, 1)
        .unwrap();
    source
        .button(RAW_BUTTON_PRIMARY, ACTION_PRESSED, true, 2)
        .unwrap();

    assert_eq!(tracker.buttons(), [0, 1, 0]);
    assert_eq!(tracker.queue().len(), 1);
}

#[test]
fn test_secondary_and_wheel() {
    let (source, tracker) = registered(640, 480, 64);

    source
        .button(RAW_BUTTON_SECONDARY, ACTION_PRESSED, false, 1)
        .unwrap();
    source.wheel(-2, 2);

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.buttons, [0, 0, 1]);
    assert_eq!(snapshot.coords[2], -2 * NOTCH_SCALE);

    let records = tracker.queue().drain_records().unwrap();
    assert_eq!(records[1], EventRecord::wheel(-240, 2));
}

#[test]
fn test_unregister_stops_records() {
    let (source, tracker) = registered(640, 480, 64);
    tracker.unregister();
    assert_eq!(source.listener_count(), 0);

    source.move_to(1, 1, 1);
    source.wheel(1, 2);
    assert!(tracker.queue().is_empty());
    assert_eq!(tracker.snapshot().coords[2], 0);
}

#[test]
fn test_drain_into_byte_buffer() {
    let (source, tracker) = registered(640, 480, 64);
    source.move_to(1, 2, 3);
    source.move_to(4, 5, 6);

    // Room for one and a half records: only whole records are written
    let mut buf = vec![0u8; RECORD_SIZE + RECORD_SIZE / 2];
    let written = tracker.queue().drain_into(&mut buf);
    assert_eq!(written, RECORD_SIZE);
    assert_eq!(
        EventRecord::decode(&buf[..RECORD_SIZE]).unwrap(),
        EventRecord::motion(1, 477, 3)
    );
    assert_eq!(tracker.queue().len(), 1);
}

#[test]
fn test_concurrent_producer_and_poller() {
    const EVENTS: i32 = 5_000;

    let source = VirtualSource::headless();
    let tracker = Arc::new(PointerTracker::with_queue_capacity(2 * EVENTS as usize));
    tracker.register(&source);
    tracker.set_grabbed(true);

    let producer = {
        let source = Arc::clone(&source);
        thread::spawn(move || {
            for i in 0..EVENTS {
                source.raw_delta(1, -1, i64::from(i));
                if i % 10 == 0 {
                    source.wheel(1, i64::from(i));
                }
            }
        })
    };

    let mut total = [0i64; 3];
    let mut buttons = [0u8; 3];
    while !producer.is_finished() {
        let mut coords = [0; 3];
        tracker.poll(&mut coords, &mut buttons);
        for (sum, value) in total.iter_mut().zip(coords) {
            *sum += i64::from(value);
        }
        thread::yield_now();
    }
    producer.join().unwrap();

    let mut coords = [0; 3];
    tracker.poll(&mut coords, &mut buttons);
    for (sum, value) in total.iter_mut().zip(coords) {
        *sum += i64::from(value);
    }

    let wheel_events = i64::from((EVENTS + 9) / 10);
    assert_eq!(total[0], i64::from(EVENTS));
    assert_eq!(total[1], -i64::from(EVENTS));
    assert_eq!(total[2], wheel_events * i64::from(NOTCH_SCALE));
    assert_eq!(
        tracker.queue().len() as i64,
        i64::from(EVENTS) + wheel_events
    );
}

#[derive(Debug, Clone)]
enum Step {
    Move(i32, i32),
    Raw(i32, i32),
    Button(i32, i32, bool),
    Wheel(i32),
    Grab(bool),
    Poll,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..1024i32, 0..768i32).prop_map(|(x, y)| Step::Move(x, y)),
        (-50..50i32, -50..50i32).prop_map(|(dx, dy)| Step::Raw(dx, dy)),
        (
            prop_oneof![Just(0), Just(1), Just(2), Just(3), Just(7)],
            prop_oneof![Just(ACTION_PRESSED), Just(ACTION_RELEASED), Just(0)],
            any::<bool>()
        )
            .prop_map(|(b, a, m)| Step::Button(b, a, m)),
        (-3..3i32).prop_map(Step::Wheel),
        any::<bool>().prop_map(Step::Grab),
        Just(Step::Poll),
    ]
}

proptest! {
    #[test]
    fn test_random_sequences_keep_invariants(steps in prop::collection::vec(step(), 1..200)) {
        let (source, tracker) = registered(1024, 768, 512);

        for (i, step) in steps.into_iter().enumerate() {
            let ts = i as i64;
            match step {
                Step::Move(x, y) => source.move_to(x, y, ts),
                Step::Raw(dx, dy) => source.raw_delta(dx, dy, ts),
                Step::Button(b, a, m) => {
                    let valid_action = a == ACTION_PRESSED || a == ACTION_RELEASED;
                    let valid_button = (0..=3).contains(&b);
                    let result = source.button(b, a, m, ts);
                    prop_assert_eq!(result.is_ok(), valid_action && valid_button);
                }
                Step::Wheel(n) => source.wheel(n, ts),
                Step::Grab(g) => tracker.set_grabbed(g),
                Step::Poll => {
                    let snapshot = tracker.snapshot();
                    let state = tracker.state();
                    prop_assert_eq!(state.accum_dx, 0);
                    prop_assert_eq!(state.accum_dy, 0);
                    prop_assert_eq!(state.accum_dz, 0);
                    if !state.grabbed {
                        prop_assert_eq!(snapshot.coords[0], state.last_x);
                        prop_assert_eq!(snapshot.coords[1], state.last_y);
                    }
                }
            }

            prop_assert!(tracker.buttons().iter().all(|&b| b <= 1));
        }

        for raw in tracker.queue().drain() {
            let record = EventRecord::decode(&raw).unwrap();
            prop_assert_eq!(record.encode(), raw);
            prop_assert!((-1..=2).contains(&record.button));
            prop_assert!(record.state <= 1);
        }
    }
}
