use arrayvec::ArrayVec;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Polyline, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, StrokeAlignment, Triangle,
};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

pub type Vertices = ArrayVec<Point, 6>;

/// Brick outline. Bricks in one row sit side by side; each row is shifted by
/// half a brick and stacked `ratio` of a brick width below the row above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shape {
    RectangleHalf,
    Square,
    #[default]
    Hexagon,
    Diamond,
}

/// Height over width, kept as an exact fraction so pixel math stays integral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ratio {
    pub height: u32,
    pub width: u32,
}

impl Ratio {
    pub const fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// `width * ratio`, rounded down.
    pub fn height_for(&self, width: u32) -> u32 {
        (width as u64 * self.height as u64 / self.width as u64) as u32
    }

    /// Largest width whose `height_for` does not exceed `height`.
    pub fn max_width_for(&self, height: u32) -> u32 {
        (height as u64 * self.width as u64 / self.height as u64) as u32
    }
}

impl Shape {
    pub const ALL: [Shape; 4] = [
        Shape::RectangleHalf,
        Shape::Square,
        Shape::Hexagon,
        Shape::Diamond,
    ];

    pub fn ratio(&self) -> Ratio {
        match self {
            Shape::RectangleHalf => Ratio::new(1, 2),
            Shape::Square => Ratio::new(1, 1),
            Shape::Hexagon => Ratio::new(3, 4),
            Shape::Diamond => Ratio::new(1, 2),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::RectangleHalf => "rect",
            Shape::Square => "square",
            Shape::Hexagon => "hexagon",
            Shape::Diamond => "diamond",
        }
    }

    pub fn successor(&self) -> Shape {
        let index = Self::ALL.iter().position(|shape| shape == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Corners of a brick with its bounding box's top left at `anchor`,
    /// clockwise from the top.
    ///
    /// Hexagons and diamonds are a full `pitch` tall and interlock with the
    /// staggered row below, so they overhang their row by `pitch / 4` and
    /// `pitch / 2`. The last row's overhang lands in the margin, and past the
    /// viewport edge once it is wider than `MARGIN`.
    pub fn vertices(&self, anchor: Point, pitch: u32) -> Vertices {
        let Point { x, y } = anchor;
        let p = pitch as i32;
        let mut result = Vertices::new();
        match self {
            Shape::RectangleHalf | Shape::Square => {
                let h = self.ratio().height_for(pitch) as i32;
                result.extend([
                    Point::new(x, y),
                    Point::new(x + p, y),
                    Point::new(x + p, y + h),
                    Point::new(x, y + h),
                ]);
            }
            Shape::Hexagon => {
                result.extend([
                    Point::new(x + p / 2, y),
                    Point::new(x + p, y + p / 4),
                    Point::new(x + p, y + 3 * p / 4),
                    Point::new(x + p / 2, y + p),
                    Point::new(x, y + 3 * p / 4),
                    Point::new(x, y + p / 4),
                ]);
            }
            Shape::Diamond => {
                result.extend([
                    Point::new(x + p / 2, y),
                    Point::new(x + p, y + p / 2),
                    Point::new(x + p / 2, y + p),
                    Point::new(x, y + p / 2),
                ]);
            }
        }
        result
    }

    /// Draws one brick filled with `color` and outlined in black.
    pub fn paint<D>(
        &self,
        target: &mut D,
        anchor: Point,
        pitch: u32,
        color: D::Color,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: RgbColor,
    {
        if pitch == 0 {
            return Ok(());
        }
        match self {
            Shape::RectangleHalf | Shape::Square => {
                let height = self.ratio().height_for(pitch);
                let style = PrimitiveStyleBuilder::new()
                    .fill_color(color)
                    .stroke_color(D::Color::BLACK)
                    .stroke_width(1)
                    .stroke_alignment(StrokeAlignment::Inside)
                    .build();
                Rectangle::new(anchor, Size::new(pitch + 1, height + 1))
                    .into_styled(style)
                    .draw(target)
            }
            Shape::Hexagon | Shape::Diamond => {
                let vertices = self.vertices(anchor, pitch);
                Self::paint_polygon(target, &vertices, color)
            }
        }
    }

    fn paint_polygon<D>(target: &mut D, vertices: &[Point], color: D::Color) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: RgbColor,
    {
        let fill = PrimitiveStyle::with_fill(color);
        for pair in vertices[1..].windows(2) {
            Triangle::new(vertices[0], pair[0], pair[1])
                .into_styled(fill)
                .draw(target)?;
        }

        let mut outline: ArrayVec<Point, 7> = vertices.iter().copied().collect();
        outline.push(vertices[0]);
        Polyline::new(&outline)
            .into_styled(PrimitiveStyle::with_stroke(D::Color::BLACK, 1))
            .draw(target)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownShape(pub String);

impl fmt::Display for UnknownShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown shape '{}', expected one of rect, square, hexagon, diamond",
            self.0
        )
    }
}

impl Error for UnknownShape {}

impl FromStr for Shape {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownShape(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_canvas::Canvas;
    use embedded_graphics::pixelcolor::Rgb888;

    const FILL: Rgb888 = Rgb888::new(0xf0, 0x80, 0x80);

    #[test]
    fn ratios_match_row_pitch() {
        assert_eq!(Shape::RectangleHalf.ratio().height_for(20), 10);
        assert_eq!(Shape::Square.ratio().height_for(20), 20);
        assert_eq!(Shape::Hexagon.ratio().height_for(20), 15);
        assert_eq!(Shape::Diamond.ratio().height_for(20), 10);
        assert_eq!(Shape::Hexagon.ratio().max_width_for(15), 20);
        assert_eq!(Shape::Hexagon.ratio().max_width_for(14), 18);
    }

    #[test]
    fn parses_shape_names() {
        assert_eq!("hexagon".parse::<Shape>(), Ok(Shape::Hexagon));
        assert_eq!("Rect".parse::<Shape>(), Ok(Shape::RectangleHalf));
        assert_eq!("square".parse::<Shape>(), Ok(Shape::Square));
        assert_eq!("diamond".parse::<Shape>(), Ok(Shape::Diamond));
        assert_eq!(
            "circle".parse::<Shape>(),
            Err(UnknownShape("circle".to_string()))
        );
    }

    #[test]
    fn next_cycles_through_all_shapes() {
        let mut shape = Shape::RectangleHalf;
        let mut seen = vec![shape];
        for _ in 0..3 {
            shape = shape.successor();
            seen.push(shape);
        }
        assert_eq!(seen, Shape::ALL.to_vec());
        assert_eq!(shape.successor(), Shape::RectangleHalf);
    }

    #[test]
    fn hexagon_vertices_span_pitch_both_ways() {
        let vertices = Shape::Hexagon.vertices(Point::new(10, 20), 8);
        assert_eq!(
            vertices.as_slice(),
            &[
                Point::new(14, 20),
                Point::new(18, 22),
                Point::new(18, 26),
                Point::new(14, 28),
                Point::new(10, 26),
                Point::new(10, 22),
            ]
        );
    }

    #[test]
    fn only_interlocking_bricks_overhang_their_row() {
        let overhang = |shape: Shape| {
            let bottom = shape.vertices(Point::zero(), 20).iter().map(|v| v.y).max();
            bottom.map(|bottom| bottom - shape.ratio().height_for(20) as i32)
        };
        assert_eq!(overhang(Shape::RectangleHalf), Some(0));
        assert_eq!(overhang(Shape::Square), Some(0));
        assert_eq!(overhang(Shape::Hexagon), Some(5));
        assert_eq!(overhang(Shape::Diamond), Some(10));
    }

    #[test]
    fn rectangle_is_half_as_tall_as_wide() {
        let vertices = Shape::RectangleHalf.vertices(Point::zero(), 12);
        assert_eq!(vertices[2], Point::new(12, 6));
    }

    #[test]
    fn square_paint_fills_inside_and_outlines_edges() {
        let mut canvas = Canvas::new(20, 20);
        Shape::Square
            .paint(&mut canvas, Point::new(2, 3), 10, FILL)
            .unwrap();

        assert_eq!(canvas.pixel(2, 3), Some(Rgb888::BLACK));
        assert_eq!(canvas.pixel(12, 13), Some(Rgb888::BLACK));
        assert_eq!(canvas.pixel(7, 8), Some(FILL));
        assert_eq!(canvas.pixel(13, 8), None);
        assert_eq!(canvas.count(FILL), 9 * 9);
    }

    #[test]
    fn diamond_paint_leaves_corners_empty() {
        let mut canvas = Canvas::new(20, 20);
        Shape::Diamond
            .paint(&mut canvas, Point::zero(), 16, FILL)
            .unwrap();

        assert_eq!(canvas.pixel(10, 8), Some(FILL));
        assert_eq!(canvas.pixel(8, 0), Some(Rgb888::BLACK));
        assert_eq!(canvas.pixel(0, 0), None);
        assert_eq!(canvas.pixel(16, 16), None);
    }

    #[test]
    fn hexagon_paint_stays_inside_bounding_box() {
        let mut canvas = Canvas::new(30, 30);
        Shape::Hexagon
            .paint(&mut canvas, Point::new(5, 5), 12, FILL)
            .unwrap();

        assert_eq!(canvas.pixel(13, 11), Some(FILL));
        for x in 0..30 {
            assert_eq!(canvas.pixel(x, 4), None);
            assert_eq!(canvas.pixel(x, 18), None);
        }
    }

    #[test]
    fn zero_pitch_paints_nothing() {
        let mut canvas = Canvas::new(4, 4);
        Shape::Square
            .paint(&mut canvas, Point::zero(), 0, FILL)
            .unwrap();
        assert_eq!(canvas.count(FILL) + canvas.count(Rgb888::BLACK), 0);
    }
}
