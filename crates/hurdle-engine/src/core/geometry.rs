use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in screen coordinates (y grows downwards).
///
/// `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns the point of the rectangle closest to `(px, py)`.
    ///
    /// Points inside the rectangle are their own nearest point.
    #[must_use]
    pub fn nearest_point(&self, px: f32, py: f32) -> (f32, f32) {
        (
            px.clamp(self.x, self.right()),
            py.clamp(self.y, self.bottom()),
        )
    }
}

/// A circle used as the hitbox of an agent.
///
/// All overlap predicates are strict: touching at exactly one point is not a
/// collision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    #[must_use]
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    /// Squared distance from the centre to the nearest point of `rect`.
    ///
    /// Zero when the centre lies inside the rectangle.
    #[must_use]
    pub fn squared_distance_to_rect(&self, rect: &Rect) -> f32 {
        let (nx, ny) = rect.nearest_point(self.x, self.y);
        let dx = self.x - nx;
        let dy = self.y - ny;
        dx * dx + dy * dy
    }

    /// Circle-vs-rectangle overlap test.
    ///
    /// # Example
    ///
    /// ```
    /// use hurdle_engine::{Circle, Rect};
    ///
    /// let rect = Rect::new(100.0, 100.0, 50.0, 50.0);
    /// assert!(Circle::new(90.0, 120.0, 20.0).overlaps_rect(&rect));
    /// assert!(!Circle::new(80.0, 120.0, 20.0).overlaps_rect(&rect)); // touching
    /// ```
    #[must_use]
    pub fn overlaps_rect(&self, rect: &Rect) -> bool {
        self.squared_distance_to_rect(rect) < self.radius * self.radius
    }

    /// Overlap test against an infinitely tall column `[left, left + width]`.
    ///
    /// Only the horizontal distance counts, so the vertical position of the
    /// circle is irrelevant.
    #[must_use]
    pub fn overlaps_column(&self, left: f32, width: f32) -> bool {
        let dx = self.x - self.x.clamp(left, left + width);
        dx * dx < self.radius * self.radius
    }

    #[must_use]
    pub fn overlaps_circle(&self, other: &Circle) -> bool {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let reach = self.radius + other.radius;
        dx * dx + dy * dy < reach * reach
    }
}
