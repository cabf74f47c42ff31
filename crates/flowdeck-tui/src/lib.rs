mod app;
mod event;
mod input;
mod ui;

use std::sync::Arc;

use flowdeck_core::event::EventBus;
use flowdeck_core::traits::RunBackend;
use flowdeck_graph::canvas::Canvas;

/// Launch the terminal UI.
pub async fn run_tui(
    canvas: Canvas,
    backend: Arc<dyn RunBackend>,
    event_bus: Arc<EventBus>,
) -> anyhow::Result<()> {
    // Enter raw mode
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;

    let backend_impl = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend_impl)?;

    let result = app::run_app(&mut terminal, canvas, backend, event_bus).await;

    // Restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
