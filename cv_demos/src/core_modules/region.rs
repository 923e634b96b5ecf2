// THEORY:
// A `Region` (ROI) is just a rectangle: an origin plus a width and a height. It
// holds no pixels and no state. The two usual ways of describing one are
// supported: by two opposite corners, or by a center point and half extents.
//
// Regions are applied to images in two ways:
// 1.  **Extraction**: cropping the region into its own, independently owned image.
//     The region is first clamped to the image bounds; a region that does not
//     overlap the image at all yields nothing.
// 2.  **Annotation**: drawing outlines (rectangles, circles, lines) in place on
//     the source image. Outlines of thickness `t` are centered on the geometric
//     border, so a 3-pixel rectangle covers one pixel outside the region, the
//     border pixel itself, and one pixel inside.
//
// All rasterization is delegated to `imageproc::drawing`, which clips to the
// canvas on its own.

use image::{ImageBuffer, Pixel, Rgb};
use imageproc::drawing::{
    BresenhamLineIter, Canvas, draw_filled_circle_mut, draw_filled_rect_mut,
    draw_line_segment_mut,
};
use imageproc::rect::Rect;

pub type Point = (i32, i32);

/// Builds an RGB color from OpenCV-style blue, green, red components.
pub const fn bgr(blue: u8, green: u8, red: u8) -> Rgb<u8> {
    Rgb([red, green, blue])
}

pub const RED: Rgb<u8> = bgr(0, 0, 255);
pub const BLUE: Rgb<u8> = bgr(255, 0, 0);
pub const BLACK: Rgb<u8> = bgr(0, 0, 0);

/// How a shape is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    /// Outline with the given thickness in pixels.
    Outline(u32),
    Filled,
}

/// A rectangular region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region spanned by two opposite corners. The second corner is exclusive,
    /// so `from_corners((0, 0), (10, 5))` is 10 wide and 5 tall.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.0.min(p2.0);
        let y = p1.1.min(p2.1);
        Self {
            x,
            y,
            width: p1.0.abs_diff(p2.0),
            height: p1.1.abs_diff(p2.1),
        }
    }

    pub fn centered(center: Point, half_width: u32, half_height: u32) -> Self {
        let (hw, hh) = (half_width as i32, half_height as i32);
        Self::from_corners(
            (center.0 - hw, center.1 - hh),
            (center.0 + hw, center.1 + hh),
        )
    }

    pub fn top_left(&self) -> Point {
        (self.x, self.y)
    }

    /// Last column and row inside the region.
    pub fn bottom_right(&self) -> Point {
        (
            self.x + self.width as i32 - 1,
            self.y + self.height as i32 - 1,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with a `width` x `height` image, if any.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Region> {
        let x0 = self.x.max(0) as i64;
        let y0 = self.y.max(0) as i64;
        let x1 = (self.x as i64 + self.width as i64).min(width as i64);
        let y1 = (self.y as i64 + self.height as i64).min(height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Region::new(
            x0 as i32,
            y0 as i32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ))
    }

    /// Copies the (clamped) region out of `image`.
    pub fn extract<P>(
        &self,
        image: &ImageBuffer<P, Vec<P::Subpixel>>,
    ) -> Option<ImageBuffer<P, Vec<P::Subpixel>>>
    where
        P: Pixel + 'static,
    {
        let clamped = self.clamp_to(image.width(), image.height())?;
        let view = image::imageops::crop_imm(
            image,
            clamped.x as u32,
            clamped.y as u32,
            clamped.width,
            clamped.height,
        );
        Some(view.to_image())
    }

    fn as_rect(&self) -> Option<Rect> {
        (!self.is_empty()).then(|| Rect::at(self.x, self.y).of_size(self.width, self.height))
    }
}

/// Fills the inclusive pixel box `(x0, y0)..=(x1, y1)`.
fn fill_box<C: Canvas>(canvas: &mut C, x0: i32, y0: i32, x1: i32, y1: i32, color: C::Pixel) {
    if x1 < x0 || y1 < y0 {
        return;
    }
    let rect = Rect::at(x0, y0).of_size((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32);
    draw_filled_rect_mut(canvas, rect, color);
}

/// Splits a thickness into the pixels drawn before and after the center line.
fn spread(thickness: u32) -> (i32, i32) {
    let thickness = thickness.max(1) as i32;
    let before = thickness / 2;
    (before, thickness - 1 - before)
}

/// Draws `region` onto `canvas` in place.
pub fn draw_rectangle<C: Canvas>(canvas: &mut C, region: Region, color: C::Pixel, stroke: Stroke) {
    let Some(rect) = region.as_rect() else {
        return;
    };
    let (left, top) = region.top_left();
    let (right, bottom) = region.bottom_right();

    match stroke {
        Stroke::Filled => draw_filled_rect_mut(canvas, rect, color),
        Stroke::Outline(thickness) => {
            let (lo, hi) = spread(thickness);
            fill_box(canvas, left - lo, top - lo, right + hi, top + hi, color);
            fill_box(canvas, left - lo, bottom - lo, right + hi, bottom + hi, color);
            fill_box(canvas, left - lo, top - lo, left + hi, bottom + hi, color);
            fill_box(canvas, right - lo, top - lo, right + hi, bottom + hi, color);
        }
    }
}

/// Draws a circle onto `canvas` in place. Outlines are rendered as an annulus,
/// one horizontal span per row.
pub fn draw_circle<C: Canvas>(
    canvas: &mut C,
    center: Point,
    radius: u32,
    color: C::Pixel,
    stroke: Stroke,
) {
    let (cx, cy) = center;
    match stroke {
        Stroke::Filled => draw_filled_circle_mut(canvas, center, radius as i32, color),
        Stroke::Outline(thickness) => {
            let (lo, hi) = spread(thickness);
            let outer = radius as f64 + hi as f64 + 0.5;
            let inner = radius as f64 - lo as f64 - 0.5;
            let reach = outer.floor() as i32;

            for dy in -reach..=reach {
                let dy_sq = (dy as f64).powi(2);
                let outer_x = (outer * outer - dy_sq).sqrt().floor() as i32;
                let y = cy + dy;
                if inner > 0.0 && (dy as f64).abs() < inner {
                    let inner_x = (inner * inner - dy_sq).sqrt().floor() as i32;
                    fill_box(canvas, cx - outer_x, y, cx - inner_x - 1, y, color);
                    fill_box(canvas, cx + inner_x + 1, y, cx + outer_x, y, color);
                } else {
                    fill_box(canvas, cx - outer_x, y, cx + outer_x, y, color);
                }
            }
        }
    }
}

/// Draws a straight segment between two points, inclusive.
pub fn draw_line<C: Canvas>(canvas: &mut C, from: Point, to: Point, color: C::Pixel, thickness: u32) {
    let start = (from.0 as f32, from.1 as f32);
    let end = (to.0 as f32, to.1 as f32);
    if thickness <= 1 {
        draw_line_segment_mut(canvas, start, end, color);
        return;
    }
    let brush = (thickness / 2) as i32;
    for point in BresenhamLineIter::new(start, end) {
        draw_filled_circle_mut(canvas, point, brush, color);
    }
}
