use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas as CanvasWidget, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use flowdeck_core::types::VisualState;
use flowdeck_graph::node::NodeInstance;

use crate::app::App;

/// Node box footprint in terminal cells.
pub const NODE_WIDTH: u16 = 13;
pub const NODE_HEIGHT: u16 = 3;

/// Draw the TUI layout: canvas, status bar, palette/help line.
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_canvas(f, app, chunks[0]);
    draw_status_bar(f, app, chunks[1]);
    draw_palette(f, app, chunks[2]);
}

fn draw_canvas(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Canvas — zoom {:.2}x ", app.canvas.view.zoom()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Record the transform origin for input hit-testing
    app.canvas_area = inner;

    draw_connectors(f, app, inner);
    for node in app.canvas.nodes() {
        draw_node(f, app, inner, node);
    }
}

/// Connector layer, drawn beneath the node boxes.
fn draw_connectors(f: &mut Frame, app: &App, inner: Rect) {
    let origin = app.origin();
    let view = &app.canvas.view;

    // Edge endpoints at box centers, in cells relative to the inner area,
    // with y flipped for the painter's upward axis.
    let center = |node: &NodeInstance| {
        let p = view.world_to_screen(origin, node.world);
        (
            f64::from(p.x - origin.x) + f64::from(NODE_WIDTH) / 2.0,
            f64::from(inner.height) - (f64::from(p.y - origin.y) + f64::from(NODE_HEIGHT) / 2.0),
        )
    };

    let widget = CanvasWidget::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, f64::from(inner.width)])
        .y_bounds([0.0, f64::from(inner.height)])
        .paint(|ctx| {
            for edge in app.canvas.edges() {
                let (Some(from), Some(to)) =
                    (app.canvas.node(edge.from), app.canvas.node(edge.to))
                else {
                    continue;
                };
                let (x1, y1) = center(from);
                let (x2, y2) = center(to);
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color: Color::DarkGray,
                });
            }
        });
    f.render_widget(widget, inner);
}

fn draw_node(f: &mut Frame, app: &App, inner: Rect, node: &NodeInstance) {
    let top_left = app.canvas.view.world_to_screen(app.origin(), node.world);

    // Clip against the inner area; nodes may be panned off-view
    let x0 = top_left.x.max(i32::from(inner.x));
    let y0 = top_left.y.max(i32::from(inner.y));
    let x1 = (top_left.x + i32::from(NODE_WIDTH)).min(i32::from(inner.right()));
    let y1 = (top_left.y + i32::from(NODE_HEIGHT)).min(i32::from(inner.bottom()));
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let rect = Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16);

    let state = node.visual_state();
    let color = match state {
        VisualState::Idle => Color::Gray,
        VisualState::Queued => Color::Yellow,
        VisualState::Running => Color::Cyan,
        VisualState::Success => Color::Green,
        VisualState::Error => Color::Red,
    };
    let selected = app.canvas.selection() == Some(node.id);
    let border_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };

    let body = Line::from(vec![
        Span::styled(node.indicator.glyph(), Style::default().fg(color)),
        Span::raw(" "),
        Span::styled(
            truncate(&node.label, usize::from(NODE_WIDTH).saturating_sub(4)),
            Style::default().fg(color),
        ),
    ]);

    let widget = Paragraph::new(body).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    f.render_widget(widget, rect);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = if app.is_running {
        let spinner = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        let idx = (app.tick_count / 2) % spinner.len();
        let progress = app
            .run_progress
            .map(|(step, total)| format!(" [{step}/{total}]"))
            .unwrap_or_default();
        format!(" {}{} {}", spinner[idx], progress, app.status)
    } else {
        format!(
            " {} | nodes: {} edges: {}",
            app.status,
            app.canvas.nodes().len(),
            app.canvas.edges().len()
        )
    };

    let status =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status, area);
}

fn draw_palette(f: &mut Frame, app: &App, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();
    for (i, entry) in app.canvas.registry().palette().iter().enumerate() {
        spans.push(Span::styled(
            format!(" {}:{} ", i + 1, entry.kind.label()),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.push(Span::styled(
        " r:run  +/-:zoom  arrows:pan  q:quit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_label_untouched() {
        assert_eq!(truncate("Build 1", 9), "Build 1");
    }

    #[test]
    fn test_truncate_long_label_ellipsized() {
        let t = truncate("Compute 12345", 9);
        assert_eq!(t.chars().count(), 9);
        assert!(t.ends_with('…'));
    }
}
