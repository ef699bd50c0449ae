mod entity;
mod events;
mod game_state;
mod grid;
mod placement;
mod power_up;
mod runner;
mod session;
mod types;

pub use entity::{SEED_LENGTH, Snake};
pub use events::{ChannelEventSink, GameEvent, GameEventSink, NullEventSink};
pub use game_state::{INITIAL_DIRECTION, SnakeGameState, TickOutcome};
pub use grid::Grid;
pub use placement::find_free_cell;
pub use power_up::{ActiveEffects, PowerUp, PowerUpManager};
pub use runner::{SessionCommand, SessionHandle, SnakeSession};
pub use session::{SessionController, SessionSnapshot, SessionState};
pub use types::{DeathReason, Difficulty, Direction, EndReason, Point, PowerUpKind};
