use flowdeck_core::config::CanvasConfig;
use flowdeck_core::types::{ScreenPoint, WorldPoint};

/// Pan/zoom mapping between world coordinates and terminal cells.
///
/// `world_to_screen(p) = origin + (p + pan) * zoom`, rounded to the nearest
/// cell; `screen_to_world` is the exact inverse before rounding, so the
/// round-trip holds within one cell. Pan accumulates unclamped, so nodes may
/// move off-view and come back; zoom is clamped to its configured bounds.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    pan_x: f64,
    pan_y: f64,
    zoom: f64,
    zoom_min: f64,
    zoom_max: f64,
    zoom_step: f64,
}

impl ViewTransform {
    pub fn new(zoom: f64, zoom_min: f64, zoom_max: f64) -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: zoom.clamp(zoom_min, zoom_max),
            zoom_min,
            zoom_max,
            zoom_step: 0.25,
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        let mut view = Self::new(config.zoom, config.zoom_min, config.zoom_max);
        view.zoom_step = config.zoom_step;
        view
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan_offset(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    /// Map a world position to a drawn cell relative to `origin`.
    pub fn world_to_screen(&self, origin: ScreenPoint, p: WorldPoint) -> ScreenPoint {
        ScreenPoint {
            x: origin.x + ((p.x + self.pan_x) * self.zoom).round() as i32,
            y: origin.y + ((p.y + self.pan_y) * self.zoom).round() as i32,
        }
    }

    /// Map a drawn cell back to world coordinates.
    pub fn screen_to_world(&self, origin: ScreenPoint, p: ScreenPoint) -> WorldPoint {
        WorldPoint {
            x: f64::from(p.x - origin.x) / self.zoom - self.pan_x,
            y: f64::from(p.y - origin.y) / self.zoom - self.pan_y,
        }
    }

    /// Apply a zoom delta, clamped to bounds.
    ///
    /// Returns whether the zoom actually changed; an unchanged zoom needs no
    /// redraw.
    pub fn adjust_zoom(&mut self, delta: f64) -> bool {
        let next = (self.zoom + delta).clamp(self.zoom_min, self.zoom_max);
        if (next - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = next;
        true
    }

    /// Zoom in by one configured step. Returns whether anything changed.
    pub fn zoom_in(&mut self) -> bool {
        self.adjust_zoom(self.zoom_step)
    }

    /// Zoom out by one configured step. Returns whether anything changed.
    pub fn zoom_out(&mut self) -> bool {
        self.adjust_zoom(-self.zoom_step)
    }

    /// Shift the pan offset by a world-space delta. Unclamped.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}
