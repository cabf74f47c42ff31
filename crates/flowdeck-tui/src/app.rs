use std::collections::HashMap;
use std::sync::Arc;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::debug;

use flowdeck_core::event::EventBus;
use flowdeck_core::traits::RunBackend;
use flowdeck_core::types::{NodeId, RunEvent, ScreenPoint, SeriesData, VisualState};
use flowdeck_graph::canvas::{Canvas, ClickOutcome};
use flowdeck_runner::Runner;

use crate::event::{EventLoop, TuiEvent};
use crate::input::{self, InputAction};
use crate::ui;

/// A node grab in progress: becomes a drag once the pointer moves, otherwise
/// resolves to a click on release.
struct Grab {
    id: NodeId,
    /// Pointer offset from the node box's top-left cell at grab time.
    offset: (i32, i32),
    moved: bool,
}

/// Application state for one canvas pane.
pub struct App {
    pub canvas: Canvas,
    /// Series received this session, keyed by node.
    pub series: HashMap<NodeId, SeriesData>,
    pub status: String,
    pub is_running: bool,
    /// (step, total) of the run in flight.
    pub run_progress: Option<(usize, usize)>,
    pub tick_count: usize,
    /// Inner canvas area recorded at draw time; the transform origin.
    pub canvas_area: Rect,
    grab: Option<Grab>,
}

impl App {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            series: HashMap::new(),
            status: "1-9 add node | click two nodes to connect | r runs the graph".to_string(),
            is_running: false,
            run_progress: None,
            tick_count: 0,
            canvas_area: Rect::default(),
            grab: None,
        }
    }

    /// Transform origin: top-left of the drawn canvas area.
    pub fn origin(&self) -> ScreenPoint {
        ScreenPoint::new(i32::from(self.canvas_area.x), i32::from(self.canvas_area.y))
    }

    fn label_of(&self, id: NodeId) -> String {
        self.canvas
            .node(id)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Topmost node whose box covers the given terminal cell.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<NodeId> {
        let origin = self.origin();
        let (col, row) = (i32::from(column), i32::from(row));
        self.canvas.nodes().iter().rev().find_map(|node| {
            let top_left = self.canvas.view.world_to_screen(origin, node.world);
            let in_x = col >= top_left.x && col < top_left.x + i32::from(ui::NODE_WIDTH);
            let in_y = row >= top_left.y && row < top_left.y + i32::from(ui::NODE_HEIGHT);
            (in_x && in_y).then_some(node.id)
        })
    }

    /// Add a node from the palette, centered in view with a small stagger so
    /// repeated adds stay distinguishable.
    pub fn add_from_palette(&mut self, slot: usize) {
        let palette = self.canvas.registry().palette();
        let Some(entry) = palette.get(slot) else {
            self.status = format!("No palette entry {}", slot + 1);
            return;
        };

        let count = self.canvas.nodes().len() as i32;
        let center = ScreenPoint::new(
            i32::from(self.canvas_area.x) + i32::from(self.canvas_area.width) / 2
                + (count % 5) * 3
                - 6,
            i32::from(self.canvas_area.y) + i32::from(self.canvas_area.height) / 2 + (count % 3)
                - 1,
        );
        let world = self.canvas.view.screen_to_world(self.origin(), center);

        match self.canvas.add_node(entry.kind, world) {
            Ok(id) => self.status = format!("Added {}", self.label_of(id)),
            Err(e) => self.status = e.to_string(),
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let origin = self.origin();
                let hit = self.hit_test(mouse.column, mouse.row).and_then(|id| {
                    self.canvas
                        .node(id)
                        .map(|n| (id, self.canvas.view.world_to_screen(origin, n.world)))
                });
                if let Some((id, top_left)) = hit {
                    self.grab = Some(Grab {
                        id,
                        offset: (
                            i32::from(mouse.column) - top_left.x,
                            i32::from(mouse.row) - top_left.y,
                        ),
                        moved: false,
                    });
                } else {
                    // Empty-space click drops the pending connection
                    self.canvas.clear_selection();
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(grab) = &mut self.grab {
                    grab.moved = true;
                    let target = ScreenPoint::new(
                        i32::from(mouse.column) - grab.offset.0,
                        i32::from(mouse.row) - grab.offset.1,
                    );
                    let (id, origin) = (grab.id, self.origin());
                    self.canvas.drag_to(id, origin, target);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(grab) = self.grab.take() {
                    if !grab.moved {
                        self.click_node(grab.id);
                    }
                }
            }
            MouseEventKind::ScrollUp => {
                self.canvas.view.zoom_in();
            }
            MouseEventKind::ScrollDown => {
                self.canvas.view.zoom_out();
            }
            _ => {}
        }
    }

    fn click_node(&mut self, id: NodeId) {
        match self.canvas.click(id) {
            ClickOutcome::Selected(id) => {
                self.status = format!("{} armed — click another node to connect", self.label_of(id));
            }
            ClickOutcome::Deselected(_) => {
                self.status = "Selection cleared".to_string();
            }
            ClickOutcome::Connected { from, to } => {
                self.status = format!("{} → {}", self.label_of(from), self.label_of(to));
            }
            ClickOutcome::DuplicateIgnored { from, to } => {
                self.status = format!(
                    "{} → {} already exists",
                    self.label_of(from),
                    self.label_of(to)
                );
            }
            ClickOutcome::Rejected { reason, .. } => {
                self.status = reason.to_string();
            }
            ClickOutcome::Ignored => {}
        }
    }

    pub fn apply_run_event(&mut self, event: RunEvent) {
        match event {
            RunEvent::RunStarted { total } => {
                self.is_running = true;
                self.run_progress = Some((0, total));
            }
            RunEvent::NodeQueued { id } => {
                self.canvas.set_visual(id, VisualState::Queued);
            }
            RunEvent::NodeStarted { id, step, total } => {
                self.canvas.set_visual(id, VisualState::Running);
                self.run_progress = Some((step, total));
                self.status = format!("Running {} ({step}/{total})", self.label_of(id));
            }
            RunEvent::NodeFinished { id, ok } => {
                let state = if ok {
                    VisualState::Success
                } else {
                    VisualState::Error
                };
                self.canvas.set_visual(id, state);
                if !ok {
                    self.status = format!("{} failed, continuing", self.label_of(id));
                }
            }
            RunEvent::SeriesReady { id, series } => {
                debug!(%id, points = series.len(), "Series received");
                self.status = format!(
                    "{}: result series ({} points)",
                    self.label_of(id),
                    series.len()
                );
                self.series.insert(id, series);
            }
            RunEvent::RunFinished => {
                self.is_running = false;
                self.run_progress = None;
                self.canvas.reset_visuals();
                self.status = "Run finished".to_string();
            }
        }
    }
}

/// Main app loop.
pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    canvas: Canvas,
    backend: Arc<dyn RunBackend>,
    event_bus: Arc<EventBus>,
) -> anyhow::Result<()> {
    let mut app = App::new(canvas);
    let run_rx = event_bus.subscribe();
    let mut events = EventLoop::new(run_rx);

    loop {
        terminal.draw(|f| ui::draw(f, &mut app))?;

        if let Some(event) = events.next().await {
            match event {
                TuiEvent::Key(key) => match input::map_key(key) {
                    InputAction::Quit => break,
                    InputAction::AddNode(slot) => app.add_from_palette(slot),
                    InputAction::Run => {
                        // Sole guard against concurrent runs
                        if app.is_running {
                            app.status = "A run is already in progress".to_string();
                            continue;
                        }
                        let steps = flowdeck_runner::plan(&app.canvas);
                        if steps.is_empty() {
                            app.status = "Nothing to run".to_string();
                            continue;
                        }
                        app.is_running = true;
                        let runner = Runner::new(backend.clone(), event_bus.clone());
                        tokio::spawn(async move {
                            runner.run(steps).await;
                        });
                    }
                    InputAction::ZoomIn => {
                        app.canvas.view.zoom_in();
                    }
                    InputAction::ZoomOut => {
                        app.canvas.view.zoom_out();
                    }
                    InputAction::Pan(dx, dy) => {
                        app.canvas.view.pan(f64::from(dx), f64::from(dy));
                    }
                    InputAction::Deselect => {
                        app.canvas.clear_selection();
                    }
                    InputAction::None => {}
                },
                TuiEvent::Mouse(mouse) => app.handle_mouse(mouse),
                TuiEvent::Run(event) => app.apply_run_event(event),
                TuiEvent::Tick => {
                    app.tick_count += 1;
                    app.canvas.tick();
                }
                TuiEvent::Resize(_, _) => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdeck_graph::registry::{NodeKind, NodeRegistry};
    use flowdeck_graph::view::ViewTransform;
    use flowdeck_core::types::WorldPoint;

    fn app_with_canvas() -> App {
        let canvas = Canvas::new(NodeRegistry::default_palette(), ViewTransform::default());
        let mut app = App::new(canvas);
        app.canvas_area = Rect::new(1, 1, 60, 20);
        app
    }

    #[test]
    fn test_hit_test_finds_node_box() {
        let mut app = app_with_canvas();
        let id = app
            .canvas
            .add_node(NodeKind::Build, WorldPoint::new(5.0, 5.0))
            .unwrap();

        // zoom 1, pan 0: box top-left is origin + (5,5) = (6,6)
        assert_eq!(app.hit_test(6, 6), Some(id));
        assert_eq!(app.hit_test(6 + ui::NODE_WIDTH - 1, 6 + ui::NODE_HEIGHT - 1), Some(id));
        assert_eq!(app.hit_test(6 + ui::NODE_WIDTH, 6), None);
        assert_eq!(app.hit_test(0, 0), None);
    }

    #[test]
    fn test_run_events_drive_visuals() {
        let mut app = app_with_canvas();
        let id = app
            .canvas
            .add_node(NodeKind::Compute, WorldPoint::new(0.0, 0.0))
            .unwrap();

        app.apply_run_event(RunEvent::RunStarted { total: 1 });
        assert!(app.is_running);
        app.apply_run_event(RunEvent::NodeQueued { id });
        assert_eq!(app.canvas.node(id).unwrap().visual_state(), VisualState::Queued);
        app.apply_run_event(RunEvent::NodeStarted { id, step: 1, total: 1 });
        assert_eq!(app.canvas.node(id).unwrap().visual_state(), VisualState::Running);
        app.apply_run_event(RunEvent::NodeFinished { id, ok: false });
        assert_eq!(app.canvas.node(id).unwrap().visual_state(), VisualState::Error);

        app.apply_run_event(RunEvent::RunFinished);
        assert!(!app.is_running);
        assert_eq!(app.canvas.node(id).unwrap().visual_state(), VisualState::Idle);
    }

    #[test]
    fn test_series_retained_per_node() {
        let mut app = app_with_canvas();
        let id = app
            .canvas
            .add_node(NodeKind::Compute, WorldPoint::new(0.0, 0.0))
            .unwrap();
        let series = SeriesData {
            x: vec![1.0],
            y: vec![2.0],
        };
        app.apply_run_event(RunEvent::SeriesReady {
            id,
            series: series.clone(),
        });
        assert_eq!(app.series.get(&id), Some(&series));
    }

    #[test]
    fn test_palette_add_out_of_range_slot() {
        let mut app = app_with_canvas();
        app.add_from_palette(9);
        assert!(app.canvas.nodes().is_empty());
    }
}
