//! # Interaction Verification Tests
//!
//! Drives the widget engine through the full frame pipeline:
//!
//! 1. **Click vs drag**: a short press clicks, a long press drags
//! 2. **Snap timing**: snapping is timed by distance over snap speed
//! 3. **Drop pairing**: every `drop_start` gets a `drop_end`
//! 4. **Release redirect**: drop hooks can keep a piece on its target
//!
//! Run with: cargo test -p gambit --test interaction_verification

use std::sync::{Arc, Mutex};

use gambit::ui::{HookContext, InteractionState, MouseButton, PickStrategy, Widget, WidgetEvent};
use gambit::{EngineConfig, FramePipeline, InputEvent};

// ============================================================================
// HARNESS
// ============================================================================

type Log = Arc<Mutex<Vec<String>>>;

/// Widget that records every hook it receives, tagged with its name.
struct Piece {
    name: &'static str,
    log: Log,
}

impl Piece {
    fn record(&self, hook: &str) {
        self.log.lock().unwrap().push(format!("{}:{hook}", self.name));
    }
}

impl Widget for Piece {
    fn hover_start(&mut self, _: &mut HookContext<'_>) {
        self.record("hover_start");
    }
    fn hover_end(&mut self, _: &mut HookContext<'_>) {
        self.record("hover_end");
    }
    fn left_click(&mut self, _: &mut HookContext<'_>) {
        self.record("left_click");
    }
    fn left_click_end(&mut self, _: &mut HookContext<'_>) {
        self.record("left_click_end");
    }
    fn click_off(&mut self, _: &mut HookContext<'_>) {
        self.record("click_off");
    }
    fn drag_start(&mut self, _: &mut HookContext<'_>) {
        self.record("drag_start");
    }
    fn drag_end_drop(&mut self, _: &mut HookContext<'_>) {
        self.record("drag_end_drop");
    }
    fn drag_end_no_drop(&mut self, _: &mut HookContext<'_>) {
        self.record("drag_end_no_drop");
    }
    fn drop_start(&mut self, _: &mut HookContext<'_>) {
        self.record("drop_start");
    }
    fn drop_end(&mut self, _: &mut HookContext<'_>) {
        self.record("drop_end");
    }
}

fn pipeline() -> FramePipeline {
    FramePipeline::new(&EngineConfig {
        workers: 2,
        ..EngineConfig::default()
    })
    .unwrap()
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock().unwrap())
}

fn count(events: &[String], hook: &str) -> usize {
    events.iter().filter(|e| e.ends_with(hook)).count()
}

fn mouse_move(pipeline: &mut FramePipeline, x: f32, y: f32) {
    pipeline.handle_event(&InputEvent::MouseMove { x, y });
}

/// Runs frames of `dt` until the clock reaches `until`.
fn run_until(pipeline: &mut FramePipeline, dt: f64, until: f64) {
    while pipeline.now() + 1e-9 < until {
        pipeline.frame(dt);
    }
}

// ============================================================================
// CLICK VS DRAG
// ============================================================================

#[test]
fn verify_short_press_is_a_click() {
    let mut pipeline = pipeline();
    let log = Log::default();
    let piece = pipeline
        .engine_mut()
        .create(Piece { name: "a", log: Arc::clone(&log) }, (100.0, 100.0), (20.0, 20.0), 0.0)
        .unwrap();
    pipeline.engine_mut().set_draggable(piece, true);

    mouse_move(&mut pipeline, 100.0, 100.0);
    pipeline.frame(0.05);
    assert_eq!(pipeline.engine().current_hover(), Some(piece));
    take(&log);

    pipeline.handle_event(&InputEvent::MouseDown(MouseButton::Left));
    run_until(&mut pipeline, 0.05, 0.15);
    pipeline.handle_event(&InputEvent::MouseUp(MouseButton::Left));
    run_until(&mut pipeline, 0.05, 0.5);

    let events = take(&log);
    assert_eq!(events, vec!["a:left_click", "a:left_click_end"]);
    assert_eq!(count(&events, "drag_start"), 0);
    assert_eq!(pipeline.engine().state(), InteractionState::Hover);
    assert_eq!(pipeline.engine().last_click(), Some(piece));
}

#[test]
fn verify_long_press_is_a_drag() {
    let mut pipeline = pipeline();
    let log = Log::default();
    let piece = pipeline
        .engine_mut()
        .create(Piece { name: "a", log: Arc::clone(&log) }, (100.0, 100.0), (20.0, 20.0), 0.0)
        .unwrap();
    pipeline.engine_mut().set_draggable(piece, true);

    mouse_move(&mut pipeline, 100.0, 100.0);
    pipeline.frame(0.05);
    take(&log);

    pipeline.handle_event(&InputEvent::MouseDown(MouseButton::Left));
    run_until(&mut pipeline, 0.05, 0.35);
    assert_eq!(pipeline.engine().state(), InteractionState::Drag);

    // The piece follows the cursor while dragged.
    mouse_move(&mut pipeline, 160.0, 120.0);
    pipeline.frame(0.02);
    let (x, y) = pipeline.engine().style(piece).unwrap().position();
    assert!((x - 160.0).abs() < 1e-3 && (y - 120.0).abs() < 1e-3);

    pipeline.handle_event(&InputEvent::MouseUp(MouseButton::Left));
    run_until(&mut pipeline, 0.05, 1.0);

    let events = take(&log);
    assert_eq!(events.first().map(String::as_str), Some("a:drag_start"));
    assert_eq!(count(&events, "drag_end_drop") + count(&events, "drag_end_no_drop"), 1);
    assert_eq!(count(&events, "left_click"), 0);

    // Released with no drop target: animates back to where it was picked up.
    let (x, y) = pipeline.engine().style(piece).unwrap().position();
    assert!((x - 100.0).abs() < 1e-3 && (y - 100.0).abs() < 1e-3);
}

#[test]
fn verify_threshold_is_configurable() {
    let config = EngineConfig::from_toml_str("workers = 1\ndrag_threshold = 0.5").unwrap();
    let mut pipeline = FramePipeline::new(&config).unwrap();
    let log = Log::default();
    let piece = pipeline
        .engine_mut()
        .create(Piece { name: "a", log: Arc::clone(&log) }, (0.0, 0.0), (20.0, 20.0), 0.0)
        .unwrap();
    pipeline.engine_mut().set_draggable(piece, true);

    mouse_move(&mut pipeline, 0.0, 0.0);
    pipeline.frame(0.05);
    pipeline.handle_event(&InputEvent::MouseDown(MouseButton::Left));
    run_until(&mut pipeline, 0.05, 0.45);
    assert_eq!(pipeline.engine().state(), InteractionState::PreDragThreshold);

    pipeline.handle_event(&InputEvent::MouseUp(MouseButton::Left));
    let events = take(&log);
    assert_eq!(count(&events, "left_click"), 1);
    assert_eq!(count(&events, "drag_start"), 0);
}

// ============================================================================
// SNAP AND DROP
// ============================================================================

struct Board {
    pipeline: FramePipeline,
    log: Log,
    piece: gambit::WidgetId,
    square: gambit::WidgetId,
}

/// A draggable piece at (100, 100) and a large snappable square centred
/// 300px to its right. The piece is being dragged when this returns.
fn board(strategy: PickStrategy) -> Board {
    let mut pipeline = FramePipeline::new(&EngineConfig {
        workers: 2,
        pick_strategy: strategy,
        ..EngineConfig::default()
    })
    .unwrap();
    let log = Log::default();
    let engine = pipeline.engine_mut();
    let square = engine
        .create(Piece { name: "square", log: Arc::clone(&log) }, (400.0, 100.0), (50.0, 50.0), 0.0)
        .unwrap();
    let piece = engine
        .create(Piece { name: "piece", log: Arc::clone(&log) }, (100.0, 100.0), (10.0, 10.0), 0.0)
        .unwrap();
    engine.set_draggable(piece, true);
    engine.set_snappable(square, true);

    mouse_move(&mut pipeline, 100.0, 100.0);
    pipeline.frame(0.05);
    pipeline.handle_event(&InputEvent::MouseDown(MouseButton::Left));
    run_until(&mut pipeline, 0.05, 0.35);
    assert_eq!(pipeline.engine().state(), InteractionState::Drag);
    take(&log);

    Board {
        pipeline,
        log,
        piece,
        square,
    }
}

#[test]
fn verify_snap_timing() {
    let mut board = board(PickStrategy::ColorMask);

    // Jump the cursor onto the square; the piece is still at (100, 100).
    mouse_move(&mut board.pipeline, 400.0, 100.0);
    let stats = board.pipeline.frame(0.02);
    let now = stats.now;

    let engine = board.pipeline.engine();
    assert_eq!(engine.state(), InteractionState::ToSnap);
    assert_eq!(engine.current_drop(), Some(board.square));

    let style = engine.style(board.piece).unwrap();
    let arrival = style.path().lock().destination().timestamp;
    assert!((arrival - (now + 0.3)).abs() < 1e-6);
    assert_eq!(style.destination_position(), (400.0, 100.0));
    assert_eq!(take(&board.log), vec!["square:drop_start"]);

    run_until(&mut board.pipeline, 0.02, now + 0.4);
    assert_eq!(board.pipeline.engine().state(), InteractionState::Snap);
    let (x, _) = board.pipeline.engine().style(board.piece).unwrap().position();
    assert!((x - 400.0).abs() < 1e-3);
}

#[test]
fn verify_snap_with_bounds_picking() {
    let mut board = board(PickStrategy::Bounds);
    mouse_move(&mut board.pipeline, 380.0, 90.0);
    board.pipeline.frame(0.02);
    assert_eq!(board.pipeline.engine().state(), InteractionState::ToSnap);
    assert_eq!(board.pipeline.engine().current_drop(), Some(board.square));
}

#[test]
fn verify_leaving_snap_target_pairs_drop_hooks() {
    let mut board = board(PickStrategy::ColorMask);

    mouse_move(&mut board.pipeline, 400.0, 100.0);
    run_until(&mut board.pipeline, 0.02, 1.0);
    assert_eq!(board.pipeline.engine().state(), InteractionState::Snap);

    mouse_move(&mut board.pipeline, 100.0, 300.0);
    board.pipeline.frame(0.02);
    assert_eq!(board.pipeline.engine().state(), InteractionState::ToDrag);
    assert_eq!(board.pipeline.engine().current_drop(), None);

    run_until(&mut board.pipeline, 0.02, 2.0);
    assert_eq!(board.pipeline.engine().state(), InteractionState::Drag);
    let (x, y) = board.pipeline.engine().style(board.piece).unwrap().position();
    assert!((x - 100.0).abs() < 1e-3 && (y - 300.0).abs() < 1e-3);

    board.pipeline.handle_event(&InputEvent::MouseUp(MouseButton::Left));
    let events = take(&board.log);
    assert_eq!(count(&events, "drop_start"), count(&events, "drop_end"));
    assert_eq!(count(&events, "drag_end_no_drop"), 1);
    assert_eq!(count(&events, "drag_end_drop"), 0);
}

#[test]
fn verify_drop_hook_redirects_release() {
    let mut board = board(PickStrategy::ColorMask);
    let accepted = board.pipeline.engine_mut().listen(
        board.square,
        "drag_end_drop".parse::<WidgetEvent>().unwrap(),
        |ctx| {
            let (x, y) = ctx.style.position();
            assert!(ctx.set_release(x, y));
        },
    );
    assert!(accepted);

    mouse_move(&mut board.pipeline, 400.0, 100.0);
    run_until(&mut board.pipeline, 0.02, 1.0);
    board.pipeline.handle_event(&InputEvent::MouseUp(MouseButton::Left));
    run_until(&mut board.pipeline, 0.02, 2.0);

    let events = take(&board.log);
    let end = events.iter().position(|e| e == "square:drag_end_drop").unwrap();
    let drop_end = events.iter().position(|e| e == "square:drop_end").unwrap();
    assert!(end < drop_end);
    assert_eq!(board.pipeline.engine().current_drop(), None);

    // Stays on the square instead of returning home.
    let (x, y) = board.pipeline.engine().style(board.piece).unwrap().position();
    assert!((x - 400.0).abs() < 1e-3 && (y - 100.0).abs() < 1e-3);
}

#[test]
fn verify_click_on_empty_space_clears_selection() {
    let mut pipeline = pipeline();
    let log = Log::default();
    let piece = pipeline
        .engine_mut()
        .create(Piece { name: "a", log: Arc::clone(&log) }, (0.0, 0.0), (20.0, 20.0), 0.0)
        .unwrap();

    mouse_move(&mut pipeline, 0.0, 0.0);
    pipeline.frame(0.05);
    pipeline.handle_event(&InputEvent::MouseDown(MouseButton::Left));
    pipeline.frame(0.05);
    pipeline.handle_event(&InputEvent::MouseUp(MouseButton::Left));
    assert_eq!(pipeline.engine().last_click(), Some(piece));

    mouse_move(&mut pipeline, 500.0, 500.0);
    pipeline.frame(0.05);
    take(&log);
    pipeline.handle_event(&InputEvent::MouseDown(MouseButton::Left));
    assert_eq!(take(&log), vec!["a:click_off"]);
    assert_eq!(pipeline.engine().last_click(), None);
}
