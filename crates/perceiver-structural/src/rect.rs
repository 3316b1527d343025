use serde::{Deserialize, Serialize};

/// Integer box in CSS pixels. Snapshot floats are truncated toward zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rect from a `[x, y, w, h]` snapshot array; missing components are zero.
    pub fn from_cdp(raw: &[f64]) -> Self {
        let at = |i: usize| raw.get(i).copied().unwrap_or(0.0) as i32;
        Self::new(at(0), at(1), at(2), at(3))
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        let x = (other.x <= self.x && self.x < other.right())
            || (self.x < other.x && other.x <= self.right());
        let y = (other.y <= self.y && self.y < other.bottom())
            || (self.y < other.y && other.y <= self.bottom());
        x && y
    }

    /// Edges count as inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x <= x && x <= self.right() && self.y <= y && y <= self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(other.x, other.y) && self.contains(other.right(), other.bottom())
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn relative_point(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.x, y - self.y)
    }

    pub fn clip_to(&self, bounds: &Rect) -> Rect {
        let x = self.x.max(bounds.x);
        let y = self.y.max(bounds.y);
        let width = (self.right().min(bounds.right()) - x).max(0);
        let height = (self.bottom().min(bounds.bottom()) - y).max(0);
        Rect::new(x, y, width, height)
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}
