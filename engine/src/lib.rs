pub mod clock;
pub mod config;
pub mod games;
pub mod high_score;
pub mod logger;
pub mod settings;
mod defaults;

pub use clock::{Clock, ManualClock, SystemClock};
pub use games::snake::{
    ActiveEffects, ChannelEventSink, Difficulty, Direction, EndReason, GameEvent, GameEventSink,
    NullEventSink, Point, PowerUp, PowerUpKind, SessionCommand, SessionController, SessionHandle,
    SessionSnapshot, SessionState, SnakeSession,
};
pub use high_score::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
pub use settings::{EngineConfig, SnakeSessionSettings};
