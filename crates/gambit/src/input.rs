//! # Input Queue
//!
//! Window systems often deliver input on their own thread. The queue hands
//! events to the frame pipeline, which drains it at the start of each frame.
//!
//! ```text
//! ┌─────────────┐  try_send   ┌─────────────┐  drain   ┌──────────────┐
//! │ host window │ ──────────▶ │   bounded   │ ───────▶ │ FramePipeline│
//! │   thread    │             │   channel   │          │ event_handler│
//! └─────────────┘             └─────────────┘          └──────────────┘
//! ```

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use gambit_ui::InputEvent;

/// Default number of events buffered between frames.
pub const DEFAULT_INPUT_CAPACITY: usize = 1024;

/// Bounded input channel.
#[derive(Debug)]
pub struct InputQueue {
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
}

impl InputQueue {
    /// Creates a queue holding at most `capacity` undrained events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self { sender, receiver }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Takes every pending event, oldest first.
    pub fn drain(&self) -> impl Iterator<Item = InputEvent> + '_ {
        self.receiver.try_iter()
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_CAPACITY)
    }
}

/// Handle for pushing input from any thread.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<InputEvent>,
}

impl InputSender {
    /// Queues an event without blocking.
    ///
    /// Returns `false` if the queue is full or the pipeline is gone; the
    /// event is dropped.
    pub fn send(&self, event: InputEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("input queue full, event dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}
