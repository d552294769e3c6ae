//! # Pipeline Verification Tests
//!
//! 1. **Barrier**: every update hook runs exactly once per frame, before
//!    interaction resolution, for any worker count
//! 2. **Timers**: callbacks fire in due order after the interaction phase
//! 3. **Input queue**: events sent from another thread land next frame
//! 4. **Looping paths**: registry paths blend on the workers
//!
//! Run with: cargo test -p gambit --test pipeline_verification

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gambit::core::WorkerPool;
use gambit::ui::{
    Capabilities, Color, DrawList, HookContext, Path, RenderCommand, Style, UpdateContext, Widget,
    WidgetEngine,
};
use gambit::{EngineConfig, FramePipeline, InputEvent};

// ============================================================================
// HARNESS
// ============================================================================

/// Widget with an update hook that counts its own calls and a global total.
struct Ticker {
    own: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    /// Total seen when the hover hook ran.
    seen_at_hover: Arc<AtomicUsize>,
}

impl Widget for Ticker {
    fn capabilities(&self) -> Capabilities {
        Capabilities::from_bits(Capabilities::DRAW | Capabilities::MASK | Capabilities::UPDATE)
    }

    fn draw(&self, style: &Style, list: &mut DrawList) {
        list.fill_rect(style.bounds(), Color::WHITE);
    }

    fn update(&mut self, _: &UpdateContext<'_>) {
        self.own.fetch_add(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    fn hover_start(&mut self, _: &mut HookContext<'_>) {
        self.seen_at_hover
            .store(self.total.load(Ordering::SeqCst), Ordering::SeqCst);
    }
}

struct Tickers {
    counters: Vec<Arc<AtomicUsize>>,
    total: Arc<AtomicUsize>,
    seen_at_hover: Arc<AtomicUsize>,
}

/// Fills `engine` with a 10x5 grid of tickers, 20px apart.
fn populate(engine: &mut WidgetEngine) -> Tickers {
    let total = Arc::new(AtomicUsize::new(0));
    let seen_at_hover = Arc::new(AtomicUsize::new(0));
    let mut counters = Vec::new();
    for i in 0..50u16 {
        let own = Arc::new(AtomicUsize::new(0));
        let position = (f32::from(i % 10) * 20.0, f32::from(i / 10) * 20.0);
        engine
            .create(
                Ticker {
                    own: Arc::clone(&own),
                    total: Arc::clone(&total),
                    seen_at_hover: Arc::clone(&seen_at_hover),
                },
                position,
                (8.0, 8.0),
                0.0,
            )
            .unwrap();
        counters.push(own);
    }
    Tickers {
        counters,
        total,
        seen_at_hover,
    }
}

// ============================================================================
// BARRIER
// ============================================================================

#[test]
fn verify_barrier_single_and_eight_workers() {
    for workers in [1, 8] {
        let pool = WorkerPool::new(workers).unwrap();
        let mut engine = WidgetEngine::default();
        let tickers = populate(&mut engine);

        for frame in 1..=5 {
            let now = f64::from(frame) * 0.016;
            let tasks = engine.widget_work(now);
            assert_eq!(tasks.len(), 50, "{workers} workers");
            pool.submit_batch(tasks);
            pool.wait();

            for counter in &tickers.counters {
                assert_eq!(counter.load(Ordering::SeqCst), frame as usize, "{workers} workers");
            }
            engine.update(now);
        }
        assert_eq!(tickers.total.load(Ordering::SeqCst), 250);
        assert_eq!(pool.panicked_tasks(), 0);
    }
}

#[test]
fn verify_updates_finish_before_interaction() {
    for workers in [1, 8] {
        let mut pipeline = FramePipeline::new(&EngineConfig {
            workers,
            ..EngineConfig::default()
        })
        .unwrap();
        let tickers = populate(pipeline.engine_mut());

        // The hover hook runs in the interaction phase of frame one.
        pipeline.handle_event(&InputEvent::MouseMove { x: 40.0, y: 20.0 });
        let stats = pipeline.frame(0.016);

        assert_eq!(stats.tasks, 50);
        assert!(pipeline.engine().current_hover().is_some());
        assert_eq!(tickers.seen_at_hover.load(Ordering::SeqCst), 50);
        assert!(tickers
            .counters
            .iter()
            .all(|c| c.load(Ordering::SeqCst) == 1));
    }
}

#[test]
fn verify_draw_list_follows_insertion_order() {
    let mut pipeline = FramePipeline::new(&EngineConfig {
        workers: 4,
        ..EngineConfig::default()
    })
    .unwrap();
    populate(pipeline.engine_mut());
    pipeline.frame(0.016);

    let xs: Vec<f32> = pipeline
        .draw_list()
        .commands()
        .iter()
        .take(3)
        .filter_map(|c| match c {
            RenderCommand::Rect { bounds, .. } => Some(bounds.x),
            _ => None,
        })
        .collect();
    assert_eq!(pipeline.draw_list().len(), 50);
    assert_eq!(xs, vec![-8.0, 12.0, 32.0]);
}

// ============================================================================
// TIMERS
// ============================================================================

#[test]
fn verify_timers_fire_in_due_order() {
    let mut pipeline = FramePipeline::new(&EngineConfig {
        workers: 1,
        ..EngineConfig::default()
    })
    .unwrap();
    let order = Rc::new(RefCell::new(Vec::new()));

    for (delay, tag) in [(0.3, "c"), (0.1, "a"), (0.2, "b1"), (0.2, "b2"), (0.9, "late")] {
        let order = Rc::clone(&order);
        pipeline.schedule(delay, move |_| order.borrow_mut().push(tag));
    }

    pipeline.frame_at(0.5);
    assert_eq!(*order.borrow(), vec!["a", "b1", "b2", "c"]);
    assert_eq!(pipeline.timers_mut().len(), 1);
}

#[test]
fn verify_timers_can_drive_the_engine() {
    let mut pipeline = FramePipeline::new(&EngineConfig {
        workers: 2,
        ..EngineConfig::default()
    })
    .unwrap();
    let tickers = populate(pipeline.engine_mut());
    let doomed: Vec<_> = pipeline.engine().ids().take(10).collect();

    let handle = pipeline
        .schedule(0.5, move |engine| {
            for id in doomed {
                assert!(engine.destroy(id));
            }
        })
        .unwrap();
    assert!(pipeline.reschedule(handle, 0.25));

    pipeline.frame_at(0.25);
    pipeline.frame_at(0.7);
    assert_eq!(pipeline.engine().len(), 50);

    pipeline.frame_at(0.8);
    assert_eq!(pipeline.engine().len(), 40);
    assert!(pipeline.stats().timers_fired_sum >= 1);
    assert!(tickers.total.load(Ordering::SeqCst) > 0);
}

#[test]
fn verify_cancelled_timer_never_fires() {
    let mut pipeline = FramePipeline::new(&EngineConfig::default()).unwrap();
    let fired = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&fired);
    let handle = pipeline
        .schedule(0.1, move |_| *flag.borrow_mut() = true)
        .unwrap();

    assert!(pipeline.cancel(handle));
    assert!(!pipeline.cancel(handle));
    pipeline.frame_at(1.0);
    assert!(!*fired.borrow());
}

// ============================================================================
// INPUT QUEUE
// ============================================================================

#[test]
fn verify_input_from_another_thread() {
    let mut pipeline = FramePipeline::new(&EngineConfig {
        workers: 1,
        input_capacity: 4,
        ..EngineConfig::default()
    })
    .unwrap();
    let sender = pipeline.input_sender();

    std::thread::spawn(move || {
        assert!(sender.send(InputEvent::MouseMove { x: 12.0, y: 34.0 }));
        assert!(sender.send(InputEvent::MouseMove { x: 56.0, y: 78.0 }));
    })
    .join()
    .unwrap();

    let stats = pipeline.frame(0.016);
    assert_eq!(stats.events, 2);
    assert_eq!(pipeline.engine().mouse(), (56.0, 78.0));
    assert_eq!(pipeline.frame(0.016).events, 0);
}

// ============================================================================
// LOOPING PATHS
// ============================================================================

#[test]
fn verify_looping_path_blends_on_workers() {
    let mut pipeline = FramePipeline::new(&EngineConfig {
        workers: 3,
        ..EngineConfig::default()
    })
    .unwrap();

    let mut path = Path::new(1, &[0.0], 0.0);
    path.push_keypoint(&[10.0], 0.0).unwrap().timestamp = 1.0;
    assert!(path.enter_loop(0.5, 0.0));
    let path = pipeline.engine_mut().paths_mut().register(path);

    // Two whole periods of 1.5s, then halfway through the forward leg.
    pipeline.frame_at(3.5);
    assert!((path.lock().current()[0] - 5.0).abs() < 1e-4);

    // Halfway through the return leg.
    pipeline.frame_at(4.25);
    assert!((path.lock().current()[0] - 5.0).abs() < 1e-4);
    assert!(path.lock().is_looping());

    path.lock().exit_loop(4.25);
    pipeline.frame_at(10.0);
    assert!((path.lock().current()[0] - 5.0).abs() < 1e-4);
}
