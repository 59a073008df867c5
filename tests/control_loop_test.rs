//! Control loop: frames in, pointer calls out


use eye_mouse::{
    app::{spawn_control_loop, ControlLoop},
    blink::MouseButton,
    capture::ReplaySource,
    config::Config,
    cursor_control::marshal,
    eye_metrics::{LandmarkFrame, Point2},
    feedback::latest_slot,
    gaze_mapper::ScreenBounds,
    stop::StopToken,
    Error,
};
use test_helpers::{frame_with, identity_model, open_frame, RecordingPointer, CLOSED, OPEN};

const SCREEN: ScreenBounds = ScreenBounds::new(1920, 1080);

fn control() -> ControlLoop {
    ControlLoop::new(&Config::default(), identity_model(), SCREEN).unwrap()
}

/// Left eye double blink while the gaze jumps right, then open frames
fn double_blink_frames() -> Vec<LandmarkFrame> {
    let start = Point2::new(500.0, 400.0);
    let away = Point2::new(900.0, 400.0);
    let mut frames = vec![
        open_frame(0, start),
        frame_with(33, away, CLOSED, OPEN),
        open_frame(66, away),
        frame_with(99, away, CLOSED, OPEN),
        open_frame(132, away),
    ];
    for t in (165..=330).step_by(33) {
        frames.push(open_frame(t, away));
    }
    frames
}

#[test]
fn test_double_blink_clicks_and_holds_cursor() {
    let mut control = control();
    let outputs: Vec<_> = double_blink_frames().iter().map(|f| control.process_frame(f)).collect();

    let clicks: Vec<_> = outputs.iter().flat_map(|o| o.clicks.iter().map(|c| (c.button, c.timestamp))).collect();
    assert_eq!(clicks, vec![(MouseButton::Left, std::time::Duration::from_millis(132))]);

    // held while closed, on reopening, and for the 120 ms after
    let start = Point2::new(500.0, 400.0);
    for output in outputs.iter().filter(|o| o.timestamp.as_millis() <= 231) {
        assert_eq!(output.cursor, Some(start), "moved at {:?}", output.timestamp);
    }

    let resumed = outputs.iter().find(|o| o.timestamp.as_millis() == 264).unwrap();
    assert!(resumed.cursor.unwrap().x > 500.0);
    assert_eq!(resumed.raw_target, Some(Point2::new(900.0, 400.0)));
}

#[test]
fn test_run_sends_moves_only_on_pixel_change_and_clicks() {
    let mut control = control();
    let mut frames = double_blink_frames();
    // long enough to settle
    for i in 0..200u64 {
        frames.push(open_frame(363 + i * 33, Point2::new(900.0, 400.0)));
    }
    let mut source = ReplaySource::new(frames);
    let mut pointer = RecordingPointer::default();

    let summary = control.run(&mut source, &mut pointer, &StopToken::new(), None).unwrap();

    assert_eq!(summary.frames, 211);
    assert_eq!(summary.frames_with_face, 211);
    assert_eq!(summary.clicks, 1);
    assert_eq!(pointer.clicks, vec![MouseButton::Left]);
    assert_eq!(summary.moves, pointer.moves.len());
    assert_eq!(pointer.moves[0], (500, 400));
    // consecutive moves always differ
    assert!(pointer.moves.windows(2).all(|w| w[0] != w[1]));
    let last = *pointer.moves.last().unwrap();
    assert!((last.0 - 900).abs() <= 3 && last.1 == 400, "settled at {last:?}");
}

#[test]
fn test_frames_without_face_hold_and_skip_blinks() {
    let mut control = control();
    control.process_frame(&open_frame(0, Point2::new(300.0, 300.0)));
    control.process_frame(&frame_with(33, Point2::new(300.0, 300.0), CLOSED, CLOSED));

    let output = control.process_frame(&LandmarkFrame::empty(66));
    assert_eq!(output.metrics, None);
    assert_eq!(output.raw_target, None);
    assert_eq!(output.cursor, Some(Point2::new(300.0, 300.0)));
    // still closed: the missing frame did not count as reopening
    assert!(control.blinks().left.is_closed());
    assert_eq!(control.blinks().left.state().blink_count, 0);
}

#[test]
fn test_no_face_ever_sends_nothing() {
    let mut control = control();
    let mut source = ReplaySource::new((0..10).map(|i| LandmarkFrame::empty(i * 33)));
    let mut pointer = RecordingPointer::default();

    let summary = control.run(&mut source, &mut pointer, &StopToken::new(), None).unwrap();
    assert_eq!(summary.frames, 10);
    assert_eq!(summary.frames_with_face, 0);
    assert!(pointer.moves.is_empty());
    assert_eq!(control.cursor(), None);
}

#[test]
fn test_capture_failure_ends_run_with_error() {
    let mut control = control();
    let mut source = ReplaySource::new(vec![open_frame(0, Point2::new(10.0, 10.0))]).failing_with("device lost");
    let mut pointer = RecordingPointer::default();

    let result = control.run(&mut source, &mut pointer, &StopToken::new(), None);
    assert!(matches!(result, Err(Error::Capture(_))));
    assert_eq!(pointer.moves, vec![(10, 10)]);
}

#[test]
fn test_stop_token_ends_run_before_next_frame() {
    let mut control = control();
    let stop = StopToken::new();
    stop.stop();
    let mut source = ReplaySource::new(vec![open_frame(0, Point2::new(10.0, 10.0))]);
    let mut pointer = RecordingPointer::default();

    let summary = control.run(&mut source, &mut pointer, &stop, None).unwrap();
    assert_eq!(summary.frames, 0);
    assert_eq!(source.remaining(), 1);
}

#[test]
fn test_predictions_off_screen_are_clamped() {
    let mut control = control();
    let output = control.process_frame(&open_frame(0, Point2::new(5000.0, -300.0)));
    assert_eq!(output.raw_target, Some(Point2::new(1919.0, 0.0)));
    assert_eq!(output.cursor, Some(Point2::new(1919.0, 0.0)));
}

#[test]
fn test_invalid_filter_rejected_at_construction() {
    let mut config = Config::default();
    config.gaze_filter.kind = "median:2".to_string();
    assert!(matches!(
        ControlLoop::new(&config, identity_model(), SCREEN),
        Err(Error::FilterError(_))
    ));
}

#[test]
fn test_worker_thread_marshals_pointer_calls() {
    let frames = double_blink_frames();
    let frame_count = frames.len();
    let (pointer, mut dispatcher) = marshal(RecordingPointer {
        screen: Some(SCREEN),
        ..RecordingPointer::default()
    });
    let (feedback_tx, feedback_rx) = latest_slot();

    let handle = spawn_control_loop(
        control(),
        Box::new(ReplaySource::new(frames)),
        pointer,
        StopToken::new(),
        Some(feedback_tx),
    )
    .unwrap();

    let applied = dispatcher.run_until_closed();
    let summary = handle.join().unwrap().unwrap();

    assert_eq!(summary.frames, frame_count);
    assert_eq!(applied, summary.moves + summary.clicks);
    let recorded = dispatcher.into_inner();
    assert_eq!(recorded.clicks, vec![MouseButton::Left]);

    // only the newest status survives
    let last = feedback_rx.try_take().unwrap();
    assert_eq!(last.timestamp.as_millis(), 330);
    assert!(last.face_detected);
    assert!(feedback_rx.try_take().is_none());
    assert!(feedback_rx.is_closed());
}
