use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use super::types::{Difficulty, EndReason, PowerUpKind};

/// One-shot notifications for audio and visual collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    Moved,
    AteFood { score_delta: u32 },
    AtePowerUp(PowerUpKind),
    GameOver { reason: EndReason, score: u32 },
}

/// Receiver of engine events. Calls happen on the engine's thread between
/// ticks and must not block.
///
/// `acquire_output`/`release_output` bracket the time a run is live, e.g. for
/// background music. The engine pairs every acquire with exactly one release.
pub trait GameEventSink: Send + Sync {
    fn notify(&self, event: GameEvent);

    fn acquire_output(&self, _difficulty: Difficulty) {}

    fn release_output(&self) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullEventSink;

impl GameEventSink for NullEventSink {
    fn notify(&self, _event: GameEvent) {}
}

/// Forwards events to a channel, for collaborators living on another task.
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<GameEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<GameEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl GameEventSink for ChannelEventSink {
    fn notify(&self, event: GameEvent) {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.sender.send(event);
    }
}

/// Holds the sink's output resource; releases it when dropped.
pub(crate) struct OutputGuard {
    sink: Arc<dyn GameEventSink>,
}

impl OutputGuard {
    pub(crate) fn acquire(sink: Arc<dyn GameEventSink>, difficulty: Difficulty) -> Self {
        sink.acquire_output(difficulty);
        Self { sink }
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        self.sink.release_output();
    }
}
