use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent};
use flowdeck_core::types::RunEvent;
use tokio::sync::broadcast;

/// Events that drive the TUI loop.
pub enum TuiEvent {
    /// A crossterm key event.
    Key(crossterm::event::KeyEvent),
    /// A crossterm mouse event (click, drag, wheel).
    Mouse(crossterm::event::MouseEvent),
    #[allow(dead_code)]
    Resize(u16, u16),
    /// A scheduler event from the EventBus.
    Run(RunEvent),
    /// Tick timer for indicator animation.
    Tick,
}

/// Merged event loop: crossterm + EventBus + tick timer.
pub struct EventLoop {
    run_rx: broadcast::Receiver<RunEvent>,
    tick_interval: Duration,
}

impl EventLoop {
    pub fn new(run_rx: broadcast::Receiver<RunEvent>) -> Self {
        Self {
            run_rx,
            tick_interval: Duration::from_millis(100),
        }
    }

    /// Wait for the next event from any source.
    pub async fn next(&mut self) -> Option<TuiEvent> {
        let tick_sleep = tokio::time::sleep(self.tick_interval);

        // Poll crossterm in a blocking thread
        let crossterm_poll = tokio::task::spawn_blocking(|| {
            if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                event::read().ok()
            } else {
                None
            }
        });

        tokio::select! {
            // Scheduler events
            result = self.run_rx.recv() => {
                match result {
                    Ok(evt) => Some(TuiEvent::Run(evt)),
                    Err(broadcast::error::RecvError::Lagged(_)) => Some(TuiEvent::Tick),
                    Err(_) => None,
                }
            }
            // Crossterm events
            result = crossterm_poll => {
                match result {
                    Ok(Some(CrosstermEvent::Key(key))) => Some(TuiEvent::Key(key)),
                    Ok(Some(CrosstermEvent::Mouse(mouse))) => Some(TuiEvent::Mouse(mouse)),
                    Ok(Some(CrosstermEvent::Resize(w, h))) => Some(TuiEvent::Resize(w, h)),
                    _ => Some(TuiEvent::Tick),
                }
            }
            // Tick timer
            _ = tick_sleep => {
                Some(TuiEvent::Tick)
            }
        }
    }
}
