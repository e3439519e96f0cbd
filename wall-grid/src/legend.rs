use crate::{ColorRule, Grid, WallError};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle,
};
use embedded_graphics::text::{Baseline, Text};
use std::time::Duration;

/// Info panel for the bottom right corner: wall size, update delay, and the
/// rule drawn as a table of colored dots.
#[derive(Clone, Debug)]
pub struct Legend<C> {
    size: u32,
    update_delay: Duration,
    palette: Vec<C>,
    table: Vec<Vec<usize>>,
}

impl<C> Legend<C>
where
    C: RgbColor,
{
    const RADIUS: u32 = 10;
    const PADDING: u32 = 6;
    const LINE_HEIGHT: u32 = 12;
    const CORNER_GAP: u32 = 10;
    const CHAR_WIDTH: u32 = 6;

    /// Snapshots the grid's settings and tabulates `rule` over its palette.
    pub fn new<R>(grid: &Grid<C>, rule: &R) -> Result<Self, WallError>
    where
        R: ColorRule + ?Sized,
    {
        let num_colors = grid.num_colors();
        rule.ensure_covers(num_colors)?;
        let mut table = Vec::with_capacity(num_colors);
        for left in 0..num_colors {
            let mut row = Vec::with_capacity(num_colors);
            for right in 0..num_colors {
                let result = rule.compute(left, right);
                if result >= num_colors {
                    return Err(WallError::InvalidPaletteIndex {
                        index: result,
                        num_colors,
                    });
                }
                row.push(result);
            }
            table.push(row);
        }
        Ok(Self {
            size: grid.size(),
            update_delay: grid.update_delay(),
            palette: grid.palette().to_vec(),
            table,
        })
    }

    pub fn lines(&self) -> [String; 2] {
        [
            format!("n = {}", self.size),
            format!("delay = {} ms", self.update_delay.as_millis()),
        ]
    }

    pub fn table_size(&self) -> u32 {
        let num_colors = self.palette.len() as u32;
        (num_colors + 1) * 2 * Self::RADIUS + num_colors
    }

    pub fn panel_size(&self) -> Size {
        let lines = self.lines();
        let text_width = lines
            .iter()
            .map(|line| line.len() as u32 * Self::CHAR_WIDTH)
            .max()
            .unwrap_or(0);
        let content_width = text_width.max(self.table_size());
        let content_height = lines.len() as u32 * Self::LINE_HEIGHT + self.table_size();
        Size::new(
            content_width + 2 * Self::PADDING,
            content_height + 2 * Self::PADDING,
        )
    }

    /// Top left corner of the panel, or `None` if it does not fit.
    pub fn placement(&self, viewport: Size) -> Option<Point> {
        let panel = self.panel_size();
        let x = viewport.width.checked_sub(panel.width + Self::CORNER_GAP)?;
        let y = viewport.height.checked_sub(panel.height + Self::CORNER_GAP)?;
        Some(Point::new(x as i32, y as i32))
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = C>,
    {
        let Some(top_left) = self.placement(target.bounding_box().size) else {
            return Ok(());
        };

        let panel_style = PrimitiveStyleBuilder::new()
            .fill_color(C::WHITE)
            .stroke_color(C::BLACK)
            .stroke_width(1)
            .build();
        Rectangle::new(top_left, self.panel_size())
            .into_styled(panel_style)
            .draw(target)?;

        let padding = Self::PADDING as i32;
        let text_style = MonoTextStyle::new(&FONT_6X10, C::BLACK);
        let mut line_origin = top_left + Point::new(padding, padding);
        for line in self.lines() {
            Text::with_baseline(&line, line_origin, text_style, Baseline::Top).draw(target)?;
            line_origin.y += Self::LINE_HEIGHT as i32;
        }

        self.draw_table(target, line_origin)
    }

    fn draw_table<D>(&self, target: &mut D, origin: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = C>,
    {
        let diameter = 2 * Self::RADIUS as i32;
        let extent = self.table_size() as i32;
        let grid_line = PrimitiveStyle::with_stroke(C::BLACK, 1);
        Line::new(
            origin + Point::new(0, diameter),
            origin + Point::new(extent - 1, diameter),
        )
        .into_styled(grid_line)
        .draw(target)?;
        Line::new(
            origin + Point::new(diameter, 0),
            origin + Point::new(diameter, extent - 1),
        )
        .into_styled(grid_line)
        .draw(target)?;

        for (index, &color) in self.palette.iter().enumerate() {
            let center = Self::dot_center(index);
            self.draw_dot(target, origin + Point::new(Self::RADIUS as i32, center), color)?;
            self.draw_dot(target, origin + Point::new(center, Self::RADIUS as i32), color)?;
        }

        for (left, row) in self.table.iter().enumerate() {
            for (right, &result) in row.iter().enumerate() {
                let center = Point::new(Self::dot_center(right), Self::dot_center(left));
                self.draw_dot(target, origin + center, self.palette[result])?;
            }
        }
        Ok(())
    }

    /// Offset of the center of the dot in table row or column `index`, past
    /// the header.
    pub fn dot_center(index: usize) -> i32 {
        let slot = index as i32 + 1;
        slot * 2 * Self::RADIUS as i32 + slot + Self::RADIUS as i32
    }

    fn draw_dot<D>(&self, target: &mut D, center: Point, color: C) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = C>,
    {
        let style = PrimitiveStyleBuilder::new()
            .fill_color(color)
            .stroke_color(C::BLACK)
            .stroke_width(1)
            .build();
        Circle::with_center(center, 2 * (Self::RADIUS - 2))
            .into_styled(style)
            .draw(target)
    }
}
