use crate::{Grid, Loc, Ratio, Shape};
use embedded_graphics::prelude::*;
use log::debug;
use std::time::{Duration, Instant};

/// Blank border kept around the wall on every side, in pixels.
pub const MARGIN: u32 = 20;

/// What the host should do after a call into the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRequest {
    Idle,
    Immediate,
    After(Duration),
}

/// Pixel geometry of a wall fitted into a viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    viewport: Size,
    grid_size: u32,
    ratio: Ratio,
    pitch: u32,
}

impl Layout {
    pub fn configure(viewport: Size, grid_size: u32, shape: Shape) -> Self {
        let ratio = shape.ratio();
        let rows = grid_size.max(1);
        let usable_width = viewport.width.saturating_sub(2 * MARGIN);
        let usable_height = viewport.height.saturating_sub(2 * MARGIN);

        let pitch_for_width = usable_width / rows;
        let pitch_for_height = ratio.max_width_for(usable_height / rows);
        // Odd widths put shared edges on half pixels.
        let pitch = pitch_for_width.min(pitch_for_height) & !1;

        Self {
            viewport,
            grid_size,
            ratio,
            pitch,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    pub fn row_height(&self) -> u32 {
        self.ratio.height_for(self.pitch)
    }

    pub fn is_degenerate(&self) -> bool {
        self.pitch == 0
    }

    pub fn anchor(&self, loc: Loc) -> Point {
        let x = MARGIN + loc.col * self.pitch + loc.row * self.pitch / 2;
        let y = MARGIN + self.ratio.height_for(loc.row * self.pitch);
        Point::new(x as i32, y as i32)
    }
}

/// Paints a `Grid` with one brick shape, pacing the reveal of queued colors.
#[derive(Clone, Debug)]
pub struct Renderer {
    shape: Shape,
    layout: Layout,
}

impl Renderer {
    pub fn new(shape: Shape, viewport: Size, grid_size: u32) -> Self {
        Self {
            shape,
            layout: Layout::configure(viewport, grid_size, shape),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn configure(&mut self, viewport: Size, grid_size: u32, shape: Shape) {
        self.shape = shape;
        self.layout = Layout::configure(viewport, grid_size, shape);
        debug!(
            "Configured {} bricks of width {} for {}x{} viewport",
            shape, self.layout.pitch, viewport.width, viewport.height
        );
    }

    /// Refits the wall to a new viewport. A resize always repaints, pending
    /// animation or not.
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) -> FrameRequest {
        self.configure(Size::new(width, height), self.layout.grid_size, self.shape);
        FrameRequest::Immediate
    }

    pub fn set_shape(&mut self, shape: Shape) -> FrameRequest {
        self.configure(self.layout.viewport, self.layout.grid_size, shape);
        FrameRequest::Immediate
    }

    pub fn frame<C, D>(
        &self,
        grid: &mut Grid<C>,
        target: &mut D,
        now: Instant,
    ) -> Result<FrameRequest, D::Error>
    where
        C: RgbColor,
        D: DrawTarget<Color = C>,
    {
        if !grid.is_settled() {
            grid.drain(now);
        }

        target.clear(C::WHITE)?;
        if !self.layout.is_degenerate() {
            for (loc, color) in grid.displayed_iter() {
                self.shape
                    .paint(target, self.layout.anchor(loc), self.layout.pitch, color)?;
            }
        }

        if grid.is_settled() {
            Ok(FrameRequest::Idle)
        } else {
            Ok(FrameRequest::After(grid.update_delay()))
        }
    }
}
