use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{DrawList, DrawRect, Vec2};

use super::transform::Letterbox;
use super::Viewport;

const LETTERBOX_COLOR: [u8; 4] = [8, 8, 12, 255];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render(&mut self, draw_list: &DrawList) -> Result<(), Error> {
        let viewport = self.viewport;
        let frame = self.pixels.frame_mut();
        rasterize(frame, viewport, draw_list);
        self.pixels.render()
    }
}

fn rasterize(frame: &mut [u8], viewport: Viewport, draw_list: &DrawList) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&LETTERBOX_COLOR);
    }
    let Some(letterbox) = Letterbox::fit(viewport, draw_list.world_size()) else {
        return;
    };

    let [r, g, b] = draw_list.clear_color();
    let world_rect = ScreenRectPx::from_world(
        letterbox,
        Vec2::ZERO,
        draw_list.world_size(),
        Vec2::new(1.0, 1.0),
    );
    fill_rect_blended(frame, viewport, world_rect, [r, g, b], 1.0);

    for rect in draw_list.rects() {
        draw_rect(frame, viewport, letterbox, rect);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl ScreenRectPx {
    fn from_world(letterbox: Letterbox, position: Vec2, size: Vec2, scale: Vec2) -> Self {
        let center = Vec2::new(position.x + size.x * 0.5, position.y + size.y * 0.5);
        let half = Vec2::new(size.x * scale.x * 0.5, size.y * scale.y * 0.5);
        let top_left = letterbox.to_screen(center - half);
        let bottom_right = letterbox.to_screen(center + half);
        Self {
            left: top_left.x.round() as i32,
            top: top_left.y.round() as i32,
            right: bottom_right.x.round() as i32,
            bottom: bottom_right.y.round() as i32,
        }
    }

    fn clipped(self, viewport: Viewport) -> Option<Self> {
        let clipped = Self {
            left: self.left.max(0),
            top: self.top.max(0),
            right: self.right.min(viewport.width as i32),
            bottom: self.bottom.min(viewport.height as i32),
        };
        (clipped.left < clipped.right && clipped.top < clipped.bottom).then_some(clipped)
    }
}

fn draw_rect(frame: &mut [u8], viewport: Viewport, letterbox: Letterbox, rect: &DrawRect) {
    if rect.alpha <= 0.0 {
        return;
    }
    let screen = ScreenRectPx::from_world(letterbox, rect.position, rect.size, rect.scale);
    fill_rect_blended(frame, viewport, screen, rect.color, rect.alpha);
}

fn fill_rect_blended(
    frame: &mut [u8],
    viewport: Viewport,
    rect: ScreenRectPx,
    color: [u8; 3],
    alpha: f32,
) {
    let Some(rect) = rect.clipped(viewport) else {
        return;
    };
    let alpha = alpha.clamp(0.0, 1.0);
    let width = viewport.width as usize;
    for y in rect.top..rect.bottom {
        for x in rect.left..rect.right {
            blend_pixel_clipped(frame, width, x, y, color, alpha);
        }
    }
}

fn blend_pixel_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(pixel) = frame.get_mut(byte_offset..byte_offset + 4) else {
        return;
    };
    for channel in 0..3 {
        pixel[channel] = blend_channel(pixel[channel], color[channel], alpha);
    }
    pixel[3] = 255;
}

fn blend_channel(dst: u8, src: u8, alpha: f32) -> u8 {
    let mixed = src as f32 * alpha + dst as f32 * (1.0 - alpha);
    mixed.round().clamp(0.0, 255.0) as u8
}
