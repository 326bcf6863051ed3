//! Pointer input.
//!
//! Host events are reduced to four [`PointerEvent`]s carrying client-space
//! positions (logical pixels relative to the window). [`InputAdapter`] turns
//! them into drag rotation and a canvas-space pointer for repulsion.
//!
//! ```
//! use particle_globe::input::{InputAdapter, PointerEvent, SurfaceGeometry};
//! use particle_globe::projection::RotationState;
//! use glam::Vec2;
//!
//! let geometry = SurfaceGeometry::unscaled(Vec2::new(800.0, 600.0));
//! let mut input = InputAdapter::new(0.01);
//! let mut rotation = RotationState::default();
//!
//! input.apply(PointerEvent::Down(Vec2::new(100.0, 100.0)), &geometry, &mut rotation);
//! input.apply(PointerEvent::Move(Vec2::new(150.0, 100.0)), &geometry, &mut rotation);
//! assert!((rotation.target.y - 0.5).abs() < 1e-6);
//! ```

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};

use crate::projection::RotationState;

/// A pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Up(Vec2),
    Move(Vec2),
    Leave,
}

/// Where the canvas sits on screen and how big its backing store is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    /// Top-left of the canvas element in client coordinates.
    pub origin: Vec2,
    /// Displayed size of the canvas element.
    pub size: Vec2,
    /// Backing store size in device pixels.
    pub backing: Vec2,
    pub device_pixel_ratio: f32,
}

impl SurfaceGeometry {
    /// A canvas at the client origin whose backing store matches its size.
    pub fn unscaled(size: Vec2) -> Self {
        Self {
            origin: Vec2::ZERO,
            size,
            backing: size,
            device_pixel_ratio: 1.0,
        }
    }

    /// A canvas filling a window of `logical` size at `dpr`.
    pub fn window(logical: Vec2, dpr: f32) -> Self {
        Self {
            origin: Vec2::ZERO,
            size: logical,
            backing: logical * dpr,
            device_pixel_ratio: dpr,
        }
    }

    /// Map a client position into canvas drawing coordinates.
    pub fn to_canvas(&self, client: Vec2) -> Vec2 {
        let dpr = if self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        let scale = Vec2::new(
            axis_scale(self.backing.x, dpr, self.size.x),
            axis_scale(self.backing.y, dpr, self.size.y),
        );
        (client - self.origin) * scale
    }
}

fn axis_scale(backing: f32, dpr: f32, displayed: f32) -> f32 {
    if displayed > 0.0 {
        backing / dpr / displayed
    } else {
        1.0
    }
}

/// Pointer as seen by the force model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Canvas-space position, `None` once the pointer has left.
    pub canvas: Option<Vec2>,
    pub dragging: bool,
    last_client: Vec2,
}

/// Applies pointer events to rotation and pointer state.
#[derive(Debug, Clone)]
pub struct InputAdapter {
    state: PointerState,
    sensitivity: f32,
}

impl InputAdapter {
    pub fn new(drag_sensitivity: f32) -> Self {
        Self {
            state: PointerState::default(),
            sensitivity: drag_sensitivity,
        }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    /// Canvas-space pointer for repulsion.
    pub fn pointer(&self) -> Option<Vec2> {
        self.state.canvas
    }

    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    pub fn apply(
        &mut self,
        event: PointerEvent,
        geometry: &SurfaceGeometry,
        rotation: &mut RotationState,
    ) {
        let s = &mut self.state;
        match event {
            PointerEvent::Down(client) => {
                s.dragging = true;
                s.last_client = client;
            }
            PointerEvent::Move(client) => {
                if s.dragging {
                    rotation.drag(client - s.last_client, self.sensitivity);
                }
                s.last_client = client;
                s.canvas = Some(geometry.to_canvas(client));
            }
            PointerEvent::Up(_) => {
                s.dragging = false;
            }
            PointerEvent::Leave => {
                s.dragging = false;
                s.canvas = None;
            }
        }
    }
}

/// Turns winit window events into [`PointerEvent`]s.
///
/// winit reports button presses without a position, so the last cursor
/// position is remembered here.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTranslator {
    cursor: Vec2,
}

impl PointerTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `scale_factor` converts winit's physical positions to logical ones.
    pub fn translate(&mut self, event: &WindowEvent, scale_factor: f64) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(scale_factor);
                self.cursor = Vec2::new(logical.x, logical.y);
                Some(PointerEvent::Move(self.cursor))
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => Some(match state {
                ElementState::Pressed => PointerEvent::Down(self.cursor),
                ElementState::Released => PointerEvent::Up(self.cursor),
            }),
            WindowEvent::CursorLeft { .. } => Some(PointerEvent::Leave),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> SurfaceGeometry {
        SurfaceGeometry::unscaled(Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_move_without_drag_only_tracks_pointer() {
        let mut input = InputAdapter::new(0.01);
        let mut rotation = RotationState::default();
        input.apply(PointerEvent::Move(Vec2::new(10.0, 20.0)), &geometry(), &mut rotation);
        assert_eq!(input.pointer(), Some(Vec2::new(10.0, 20.0)));
        assert_eq!(rotation, RotationState::default());
    }

    #[test]
    fn test_drag_rotates_by_client_delta() {
        let mut input = InputAdapter::new(0.01);
        let mut rotation = RotationState::default();
        let g = geometry();
        input.apply(PointerEvent::Down(Vec2::new(100.0, 100.0)), &g, &mut rotation);
        assert!(input.is_dragging());
        input.apply(PointerEvent::Move(Vec2::new(120.0, 90.0)), &g, &mut rotation);
        input.apply(PointerEvent::Move(Vec2::new(130.0, 90.0)), &g, &mut rotation);
        assert!((rotation.target.y - 0.3).abs() < 1e-6);
        assert!((rotation.target.x - 0.1).abs() < 1e-6);

        input.apply(PointerEvent::Up(Vec2::new(130.0, 90.0)), &g, &mut rotation);
        assert!(!input.is_dragging());
        input.apply(PointerEvent::Move(Vec2::new(300.0, 300.0)), &g, &mut rotation);
        assert!((rotation.target.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_leave_clears_pointer_and_drag() {
        let mut input = InputAdapter::new(0.01);
        let mut rotation = RotationState::default();
        let g = geometry();
        input.apply(PointerEvent::Move(Vec2::new(5.0, 5.0)), &g, &mut rotation);
        input.apply(PointerEvent::Down(Vec2::new(5.0, 5.0)), &g, &mut rotation);
        input.apply(PointerEvent::Leave, &g, &mut rotation);
        assert_eq!(input.pointer(), None);
        assert!(!input.is_dragging());
    }

    #[test]
    fn test_canvas_coordinates_account_for_offset_and_ratio() {
        // A 400x300 element at (50, 20), with a 2x backing store.
        let g = SurfaceGeometry {
            origin: Vec2::new(50.0, 20.0),
            size: Vec2::new(400.0, 300.0),
            backing: Vec2::new(800.0, 600.0),
            device_pixel_ratio: 2.0,
        };
        assert_eq!(g.to_canvas(Vec2::new(250.0, 170.0)), Vec2::new(200.0, 150.0));

        // Element stretched to twice its drawing size.
        let stretched = SurfaceGeometry {
            origin: Vec2::ZERO,
            size: Vec2::new(800.0, 600.0),
            backing: Vec2::new(400.0, 300.0),
            device_pixel_ratio: 1.0,
        };
        assert_eq!(stretched.to_canvas(Vec2::new(400.0, 300.0)), Vec2::new(200.0, 150.0));
    }

    #[test]
    fn test_zero_sized_element_does_not_divide_by_zero() {
        let g = SurfaceGeometry::unscaled(Vec2::ZERO);
        assert_eq!(g.to_canvas(Vec2::new(3.0, 4.0)), Vec2::new(3.0, 4.0));
    }
}
