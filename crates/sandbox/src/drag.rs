//! Geometry of the draggable overlay panel.
//!
//! Only two numbers survive between pointer events: the offset between the pointer and
//! the panel corner captured when a drag starts. Everything else is recomputed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	#[must_use]
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	#[must_use]
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelGeometry {
	position: Point,
	panel: Size,
	viewport: Size,
	drag_offset: Option<Point>,
}

impl PanelGeometry {
	#[must_use]
	pub fn new(position: Point, panel: Size, viewport: Size) -> Self {
		let mut geometry = Self {
			position,
			panel,
			viewport,
			drag_offset: None,
		};
		geometry.position = geometry.clamp(position);
		geometry
	}

	#[must_use]
	pub const fn position(&self) -> Point {
		self.position
	}

	#[must_use]
	pub const fn is_dragging(&self) -> bool {
		self.drag_offset.is_some()
	}

	/// Window resized, pull the panel back inside if needed
	pub fn set_viewport(&mut self, viewport: Size) {
		self.viewport = viewport;
		self.position = self.clamp(self.position);
	}

	pub fn begin_drag(&mut self, pointer: Point) {
		self.drag_offset = Some(Point::new(
			pointer.x - self.position.x,
			pointer.y - self.position.y,
		));
	}

	/// Moves the panel with the pointer, `None` when no drag is in progress
	pub fn drag_to(&mut self, pointer: Point) -> Option<Point> {
		let offset = self.drag_offset?;
		self.position = self.clamp(Point::new(pointer.x - offset.x, pointer.y - offset.y));
		Some(self.position)
	}

	pub fn end_drag(&mut self) {
		self.drag_offset = None;
	}

	fn clamp(&self, point: Point) -> Point {
		let max_x = (self.viewport.width - self.panel.width).max(0.0);
		let max_y = (self.viewport.height - self.panel.height).max(0.0);

		Point::new(point.x.clamp(0.0, max_x), point.y.clamp(0.0, max_y))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
	Scroll,
	Wheel,
	Click,
	PointerDown,
	PointerMove,
	PointerUp,
	TouchStart,
	TouchMove,
	TouchEnd,
	KeyDown,
}

/// Whether an event should reach the page underneath the panel.
///
/// Scrolling, clicking or dragging inside the panel must never reach the page below it.
#[must_use]
pub const fn should_propagate(event: PanelEvent, inside_panel: bool) -> bool {
	!inside_panel || matches!(event, PanelEvent::KeyDown)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn panel() -> PanelGeometry {
		PanelGeometry::new(
			Point::new(100.0, 100.0),
			Size::new(400.0, 300.0),
			Size::new(1280.0, 800.0),
		)
	}

	#[test]
	fn drag_keeps_the_grab_offset() {
		let mut geometry = panel();

		geometry.begin_drag(Point::new(110.0, 120.0));
		assert_eq!(
			geometry.drag_to(Point::new(210.0, 220.0)),
			Some(Point::new(200.0, 200.0))
		);

		geometry.end_drag();
		assert!(!geometry.is_dragging());
		assert_eq!(geometry.drag_to(Point::new(0.0, 0.0)), None);
		assert_eq!(geometry.position(), Point::new(200.0, 200.0));
	}

	#[test]
	fn panel_never_leaves_the_viewport() {
		let mut geometry = panel();
		geometry.begin_drag(Point::new(100.0, 100.0));

		assert_eq!(
			geometry.drag_to(Point::new(-500.0, -20.0)),
			Some(Point::new(0.0, 0.0))
		);
		assert_eq!(
			geometry.drag_to(Point::new(5000.0, 5000.0)),
			Some(Point::new(880.0, 500.0))
		);
	}

	#[test]
	fn shrinking_viewport_pulls_the_panel_back() {
		let mut geometry = PanelGeometry::new(
			Point::new(800.0, 400.0),
			Size::new(400.0, 300.0),
			Size::new(1280.0, 800.0),
		);

		geometry.set_viewport(Size::new(1000.0, 600.0));
		assert_eq!(geometry.position(), Point::new(600.0, 300.0));

		// a panel larger than the viewport sticks to the top left corner
		geometry.set_viewport(Size::new(200.0, 200.0));
		assert_eq!(geometry.position(), Point::new(0.0, 0.0));
	}

	#[test]
	fn events_inside_the_panel_stay_there() {
		for event in [
			PanelEvent::Scroll,
			PanelEvent::Wheel,
			PanelEvent::Click,
			PanelEvent::PointerDown,
			PanelEvent::TouchMove,
		] {
			assert!(!should_propagate(event, true));
			assert!(should_propagate(event, false));
		}

		assert!(should_propagate(PanelEvent::KeyDown, true));
	}
}
