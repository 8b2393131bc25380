use crate::app::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Uniform world->pixel scale and the letterbox offset that centers the world in the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Letterbox {
    pub(crate) scale: f32,
    pub(crate) offset: Vec2,
}

impl Letterbox {
    pub(crate) fn fit(viewport: Viewport, world_size: Vec2) -> Option<Self> {
        if viewport.width == 0 || viewport.height == 0 {
            return None;
        }
        if !(world_size.x > 0.0 && world_size.y > 0.0) {
            return None;
        }
        let scale_x = viewport.width as f32 / world_size.x;
        let scale_y = viewport.height as f32 / world_size.y;
        let scale = scale_x.min(scale_y);
        let offset = Vec2 {
            x: (viewport.width as f32 - world_size.x * scale) * 0.5,
            y: (viewport.height as f32 - world_size.y * scale) * 0.5,
        };
        Some(Self { scale, offset })
    }

    pub(crate) fn to_screen(self, world: Vec2) -> Vec2 {
        Vec2 {
            x: world.x * self.scale + self.offset.x,
            y: world.y * self.scale + self.offset.y,
        }
    }

    pub(crate) fn to_world(self, screen: Vec2) -> Vec2 {
        Vec2 {
            x: (screen.x - self.offset.x) / self.scale,
            y: (screen.y - self.offset.y) / self.scale,
        }
    }
}

pub fn world_to_screen_px(window_size: (u32, u32), world_size: Vec2, world: Vec2) -> (i32, i32) {
    let viewport = Viewport {
        width: window_size.0,
        height: window_size.1,
    };
    match Letterbox::fit(viewport, world_size) {
        Some(letterbox) => {
            let screen = letterbox.to_screen(world);
            (screen.x.round() as i32, screen.y.round() as i32)
        }
        None => (world.x.round() as i32, world.y.round() as i32),
    }
}

pub fn screen_to_world_px(window_size: (u32, u32), world_size: Vec2, screen_px: Vec2) -> Vec2 {
    let viewport = Viewport {
        width: window_size.0,
        height: window_size.1,
    };
    match Letterbox::fit(viewport, world_size) {
        Some(letterbox) => letterbox.to_world(screen_px),
        None => screen_px,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Vec2 = Vec2 { x: 800.0, y: 600.0 };

    #[test]
    fn world_origin_maps_to_window_origin_at_native_size() {
        assert_eq!(world_to_screen_px((800, 600), WORLD, Vec2::ZERO), (0, 0));
        assert_eq!(
            world_to_screen_px((800, 600), WORLD, Vec2::new(800.0, 600.0)),
            (800, 600)
        );
    }

    #[test]
    fn wide_window_letterboxes_horizontally() {
        // 1600x600 window: scale stays 1.0, world is centered with 400px bars
        assert_eq!(world_to_screen_px((1600, 600), WORLD, Vec2::ZERO), (400, 0));
        assert_eq!(
            world_to_screen_px((1600, 600), WORLD, Vec2::new(100.0, 50.0)),
            (500, 50)
        );
    }

    #[test]
    fn scaled_window_round_trips_through_world() {
        let window = (1280, 720);
        let world = Vec2::new(200.0, 300.0);
        let (sx, sy) = world_to_screen_px(window, WORLD, world);
        let back = screen_to_world_px(window, WORLD, Vec2::new(sx as f32, sy as f32));
        assert!((back.x - world.x).abs() < 1.0);
        assert!((back.y - world.y).abs() < 1.0);
    }

    #[test]
    fn degenerate_window_passes_coordinates_through() {
        let cursor = Vec2::new(12.0, 34.0);
        assert_eq!(screen_to_world_px((0, 0), WORLD, cursor), cursor);
    }
}
