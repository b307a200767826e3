//! Output surface and reference bounds
//!
//! Widgets never build markup. They query a [`BoundsSource`] for the
//! reference element's box and write animated values to a [`Surface`].

use kinet_core::{Rect, Vec2};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Supplies the current bounding box of a reference element
pub trait BoundsSource {
    fn bounding_rect(&self) -> Rect;
}

impl BoundsSource for Rect {
    fn bounding_rect(&self) -> Rect {
        *self
    }
}

/// Bounds the host can update as the element moves or resizes
#[derive(Clone, Default)]
pub struct SharedBounds(Rc<Cell<Rect>>);

impl SharedBounds {
    pub fn new(rect: Rect) -> Self {
        Self(Rc::new(Cell::new(rect)))
    }

    pub fn set(&self, rect: Rect) {
        self.0.set(rect);
    }

    pub fn get(&self) -> Rect {
        self.0.get()
    }
}

impl BoundsSource for SharedBounds {
    fn bounding_rect(&self) -> Rect {
        self.0.get()
    }
}

/// 2D transform applied to a widget element
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transform {
    pub translate: Vec2,
    pub scale: f32,
    pub rotate_deg: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate: Vec2::ZERO,
        scale: 1.0,
        rotate_deg: 0.0,
    };

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            translate: Vec2::new(x, y),
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotate_deg = degrees;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) scale({}) rotate({}deg)",
            format_number(self.translate.x),
            format_number(self.translate.y),
            format_number(self.scale),
            format_number(self.rotate_deg)
        )
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros
pub fn format_number(value: f32) -> String {
    let mut s = format!("{value:.2}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s.remove(0);
    }
    s
}

/// Receives animated values from widgets
///
/// Every method defaults to a no-op so a surface only implements the
/// outputs it renders.
pub trait Surface {
    /// Transform for the widget's `element`-th element
    fn apply_transform(&mut self, _element: usize, _transform: Transform) {}

    /// Vector path data (`d` attribute)
    fn apply_path_command(&mut self, _d: &str) {}

    /// Horizontal scroll offset of a looping strip
    fn apply_scroll_offset(&mut self, _x: f32) {}

    /// Displayed text content
    fn apply_text(&mut self, _text: &str) {}
}

/// A surface shared between a widget's frame callback and its owner
pub type SharedSurface = Rc<RefCell<dyn Surface>>;

/// One recorded surface write
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SurfaceCall {
    Transform { element: usize, transform: Transform },
    PathCommand { d: String },
    ScrollOffset { x: f32 },
    Text { text: String },
}

impl fmt::Display for SurfaceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceCall::Transform { element, transform } => {
                write!(f, "transform[{element}] {transform}")
            }
            SurfaceCall::PathCommand { d } => write!(f, "path {d}"),
            SurfaceCall::ScrollOffset { x } => write!(f, "scroll {}", format_number(*x)),
            SurfaceCall::Text { text } => write!(f, "text {text}"),
        }
    }
}

/// Surface that records every write, for tests and headless playback
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Drain the recorded calls
    pub fn take(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn last_path(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            SurfaceCall::PathCommand { d } => Some(d.as_str()),
            _ => None,
        })
    }

    pub fn last_transform(&self, element: usize) -> Option<Transform> {
        self.calls.iter().rev().find_map(|call| match call {
            SurfaceCall::Transform {
                element: e,
                transform,
            } if *e == element => Some(*transform),
            _ => None,
        })
    }

    pub fn last_scroll_offset(&self) -> Option<f32> {
        self.calls.iter().rev().find_map(|call| match call {
            SurfaceCall::ScrollOffset { x } => Some(*x),
            _ => None,
        })
    }

    pub fn last_text(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            SurfaceCall::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn apply_transform(&mut self, element: usize, transform: Transform) {
        self.calls.push(SurfaceCall::Transform { element, transform });
    }

    fn apply_path_command(&mut self, d: &str) {
        self.calls.push(SurfaceCall::PathCommand { d: d.to_string() });
    }

    fn apply_scroll_offset(&mut self, x: f32) {
        self.calls.push(SurfaceCall::ScrollOffset { x });
    }

    fn apply_text(&mut self, text: &str) {
        self.calls.push(SurfaceCall::Text {
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(-30.0), "-30");
        assert_eq!(format_number(57.126), "57.13");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(10.0), "10");
    }

    #[test]
    fn test_transform_display() {
        let t = Transform::translate(12.5, -4.0)
            .with_scale(0.9)
            .with_rotation(3.0);
        assert_eq!(t.to_string(), "translate(12.5px, -4px) scale(0.9) rotate(3deg)");
    }

    #[test]
    fn test_recording_surface_queries() {
        let mut surface = RecordingSurface::new();
        surface.apply_path_command("M 0 0");
        surface.apply_transform(1, Transform::translate(1.0, 2.0));
        surface.apply_transform(0, Transform::IDENTITY);
        surface.apply_path_command("M 1 1");
        surface.apply_scroll_offset(-3.0);
        surface.apply_text("HELLO");

        assert_eq!(surface.last_path(), Some("M 1 1"));
        assert_eq!(surface.last_transform(1), Some(Transform::translate(1.0, 2.0)));
        assert_eq!(surface.last_transform(2), None);
        assert_eq!(surface.last_scroll_offset(), Some(-3.0));
        assert_eq!(surface.last_text(), Some("HELLO"));
        assert_eq!(surface.take().len(), 6);
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn test_shared_bounds_updates() {
        let bounds = SharedBounds::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let source: Rc<dyn BoundsSource> = Rc::new(bounds.clone());
        bounds.set(Rect::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(source.bounding_rect().width(), 20.0);
    }
}
