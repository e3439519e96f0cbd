use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use std::convert::Infallible;

/// Draw target over a pixels RGBA frame. Pixels outside the frame are dropped.
pub struct FrameBuffer<'a> {
    frame: &'a mut [u8],
    size: Size,
}

impl<'a> FrameBuffer<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(frame.len(), 4 * width as usize * height as usize);
        Self {
            frame,
            size: Size::new(width, height),
        }
    }

    fn offset(&self, point: Point) -> Option<usize> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        if x < self.size.width && y < self.size.height {
            Some(4 * (y as usize * self.size.width as usize + x as usize))
        } else {
            None
        }
    }
}

fn rgba(color: Rgb888) -> [u8; 4] {
    [color.r(), color.g(), color.b(), 0xff]
}

impl DrawTarget for FrameBuffer<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(offset) = self.offset(point) {
                self.frame[offset..offset + 4].copy_from_slice(&rgba(color));
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let rgba = rgba(color);
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer<'_> {
    fn size(&self) -> Size {
        self.size
    }
}
