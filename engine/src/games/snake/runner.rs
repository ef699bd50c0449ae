use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::log;
use super::session::{SessionController, SessionSnapshot, SessionState};
use super::types::{Difficulty, Direction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Turn(Direction),
    /// Any non-directional key before the first run.
    Start,
    Restart,
    SetDifficulty(Difficulty),
    Stop,
}

pub struct SnakeSession;

impl SnakeSession {
    /// Drives `controller` until `Stop` arrives or every command sender is
    /// dropped, publishing a snapshot after each change.
    ///
    /// Only one tick deadline exists at a time. It is armed when a run starts
    /// and re-armed after each tick with the interval current at that moment.
    pub async fn run(
        mut controller: SessionController,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) -> SessionSnapshot {
        let mut next_tick = Instant::now() + controller.tick_interval();
        snapshots.send_replace(controller.snapshot());

        loop {
            let running = controller.state() == SessionState::Running;

            tokio::select! {
                _ = sleep_until(next_tick), if running => {
                    controller.tick();
                    next_tick = Instant::now() + controller.tick_interval();
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };

                    let was_running = running;
                    if !apply_command(&mut controller, command) {
                        break;
                    }
                    let restarted = command == SessionCommand::Restart;
                    if controller.state() == SessionState::Running && (!was_running || restarted) {
                        next_tick = Instant::now() + controller.tick_interval();
                    }
                }
            }

            snapshots.send_replace(controller.snapshot());
        }

        if !controller.stop() {
            log!("Session shut down in state {:?}", controller.state());
        }
        let snapshot = controller.snapshot();
        snapshots.send_replace(snapshot.clone());
        snapshot
    }

    /// Runs the session on its own task.
    pub fn spawn(controller: SessionController) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let task = tokio::spawn(Self::run(controller, command_rx, snapshot_tx));

        SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        }
    }
}

/// Returns `false` when the loop should end.
fn apply_command(controller: &mut SessionController, command: SessionCommand) -> bool {
    match command {
        SessionCommand::Turn(direction) => {
            controller.handle_input(direction);
        }
        SessionCommand::Start => {
            controller.start();
        }
        SessionCommand::Restart => controller.restart(),
        SessionCommand::SetDifficulty(difficulty) => {
            if !controller.set_difficulty(difficulty) {
                log!("Ignoring difficulty change to {} after start", difficulty);
            }
        }
        SessionCommand::Stop => return false,
    }
    true
}

pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<SessionSnapshot>,
}

impl SessionHandle {
    /// Returns `false` once the session has stopped.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the session and waits for its final snapshot.
    pub async fn stop(self) -> Option<SessionSnapshot> {
        let _ = self.commands.send(SessionCommand::Stop);
        self.task.await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use crate::clock::ManualClock;
    use crate::games::SessionRng;
    use crate::games::snake::events::tests::RecordingSink;
    use crate::games::snake::{DeathReason, EndReason, GameEvent, Point, PowerUp, PowerUpKind};
    use crate::high_score::MemoryHighScoreStore;
    use crate::settings::SnakeSessionSettings;

    fn create_controller() -> (SessionController, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let controller = SessionController::new(
            SnakeSessionSettings::default(),
            Box::new(MemoryHighScoreStore::new()),
            sink.clone(),
        )
        .with_rng(SessionRng::new(42))
        .with_clock(ManualClock::new(0));
        (controller, sink)
    }

    fn create_session() -> (SessionHandle, Arc<RecordingSink>) {
        let (controller, sink) = create_controller();
        (SnakeSession::spawn(controller), sink)
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_before_start() {
        let (handle, _) = create_session();
        advance(1_000).await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, SessionState::NotStarted);
        assert_eq!(snapshot.tick, 0);
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_difficulty_interval() {
        let (handle, _) = create_session();
        assert!(handle.send(SessionCommand::SetDifficulty(Difficulty::Easy)));
        assert!(handle.send(SessionCommand::Start));

        advance(610).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, SessionState::Running);
        assert_eq!(snapshot.difficulty, Difficulty::Easy);
        assert_eq!(snapshot.tick, 3);
        assert_eq!(snapshot.snake[0], Point::new(10, 7));
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_turns_do_not_delay_ticks() {
        let (handle, _) = create_session();
        handle.send(SessionCommand::Turn(Direction::Left));

        for _ in 0..5 {
            advance(50).await;
            handle.send(SessionCommand::Turn(Direction::Left));
        }

        // 250ms on the normal 120ms pace: two ticks.
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.tick, 2);
        assert_eq!(snapshot.snake[0], Point::new(8, 10));
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_stops_ticking_and_restart_resumes() {
        let (handle, sink) = create_session();
        handle.send(SessionCommand::Start);

        // Ten moves reach the top row, the eleventh hits the wall.
        advance(120 * 11 + 10).await;
        let over = handle.snapshot();
        assert_eq!(over.state, SessionState::Over);
        assert_eq!(over.end_reason, Some(EndReason::Died(DeathReason::WallCollision)));
        assert_eq!(over.tick, 11);
        assert_eq!(sink.output_balance(), 0);

        advance(1_000).await;
        assert_eq!(handle.snapshot().tick, 11);

        handle.send(SessionCommand::Restart);
        advance(130).await;
        let restarted = handle.snapshot();
        assert_eq!(restarted.state, SessionState::Running);
        assert_eq!(restarted.tick, 1);
        assert_eq!(restarted.snake[0], Point::new(10, 9));
        assert_eq!(sink.output_balance(), 1);

        let last = handle.stop().await.unwrap();
        assert_eq!(last.state, SessionState::Stopped);
        assert_eq!(sink.output_balance(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_power_up_shortens_next_deadline() {
        let (mut controller, sink) = create_controller();
        controller.game_state_mut().power_ups.place(PowerUp {
            position: Point::new(10, 9),
            kind: PowerUpKind::Speed,
            expires_at_ms: 5_000,
        });
        let handle = SnakeSession::spawn(controller);
        handle.send(SessionCommand::Start);

        // Pickup at 120ms, then 80ms steps: 200, 280, 360.
        advance(370).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.tick, 4);
        assert_eq!(snapshot.snake[0], Point::new(10, 6));
        assert!(snapshot.active_effects.is_active(PowerUpKind::Speed));
        assert_eq!(sink.events()[0], GameEvent::AtePowerUp(PowerUpKind::Speed));
        handle.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_command_ends_loop_and_releases_output() {
        let (handle, sink) = create_session();
        handle.send(SessionCommand::Start);
        advance(130).await;
        assert_eq!(sink.output_balance(), 1);

        assert!(handle.send(SessionCommand::Stop));
        let mut snapshots = handle.subscribe();
        snapshots
            .wait_for(|s| s.state == SessionState::Stopped)
            .await
            .unwrap();
        assert_eq!(sink.output_balance(), 0);

        advance(1_000).await;
        assert!(!handle.send(SessionCommand::Restart));
        assert_eq!(handle.snapshot().tick, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_releases_output() {
        let (handle, sink) = create_session();
        handle.send(SessionCommand::Start);
        advance(10).await;
        assert_eq!(sink.output_balance(), 1);

        let SessionHandle { commands, snapshots, task } = handle;
        drop(commands);
        drop(snapshots);
        task.await.unwrap();
        assert_eq!(sink.output_balance(), 0);
    }
}
