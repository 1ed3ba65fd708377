use std::fmt;

/// An axis-aligned rectangle.
///
/// This rectangle type uses (signed) integer coordinates and is meant to be used with the
/// [`crate::image`] module.
///
/// Rectangles are allowed to have zero height and/or width.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Rect {
    /// Creates a rectangle extending downwards and right from a point.
    #[inline]
    pub fn from_top_left(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the X coordinate of the left edge.
    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Returns the Y coordinate of the top edge.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Returns the width of this rectangle, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of this rectangle, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Computes the rectangle covered by both `self` and `other`.
    ///
    /// Returns `None` when the rectangles do not overlap (an empty intersection counts as no
    /// overlap).
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x_min = self.x.max(other.x);
        let y_min = self.y.max(other.y);
        let x_max = (self.x + self.width as i32).min(other.x + other.width as i32);
        let y_max = (self.y + self.height as i32).min(other.y + other.height as i32);
        if x_min >= x_max || y_min >= y_max {
            return None;
        }

        Some(Rect::from_top_left(
            x_min,
            y_min,
            (x_max - x_min) as u32,
            (y_max - y_min) as u32,
        ))
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect @ ({}, {}), {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}
