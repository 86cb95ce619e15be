//! Intersection tests for circles and axis-aligned rectangles
//!
//! Every body in the arena is either a circle or an axis-aligned rectangle
//! (rectangle rotation is purely cosmetic), so segment tests against those two
//! shapes are all the swept and hitscan passes need.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle described by its centre and full size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    /// Corners in winding order starting at the minimum corner
    pub fn corners(&self) -> [Vec2; 4] {
        let min = self.min();
        let max = self.max();
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }

    /// Point of the rectangle (boundary or interior) closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// First point where segment `start..end` enters a circle
///
/// Solves |start + t*d - center|² = r² and returns the smallest root with
/// t in [0, 1]. A segment starting inside the circle reports the exit root.
pub fn line_circle_intersect(start: Vec2, end: Vec2, center: Vec2, radius: f32) -> Option<Vec2> {
    let d = end - start;
    let f = start - center;

    let a = d.dot(d);
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * f.dot(d);
    let c = f.dot(f) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    [t1, t2]
        .into_iter()
        .find(|t| (0.0..=1.0).contains(t))
        .map(|t| start + d * t)
}

/// Intersection point of segments `a1..a2` and `b1..b2`
///
/// Parallel (including collinear) segments report no intersection.
pub fn line_line_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.perp_dot(s);
    if denom.abs() <= f32::EPSILON {
        return None;
    }

    let qp = b1 - a1;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + r * t)
    } else {
        None
    }
}

/// Nearest point where segment `start..end` crosses a rectangle edge
pub fn line_rect_intersect(start: Vec2, end: Vec2, rect: &Rect) -> Option<Vec2> {
    let corners = rect.corners();
    (0..4)
        .filter_map(|i| line_line_intersect(start, end, corners[i], corners[(i + 1) % 4]))
        .min_by(|a, b| {
            start
                .distance_squared(*a)
                .total_cmp(&start.distance_squared(*b))
        })
}

/// Whether `p` lies inside or on the boundary of the rectangle
#[inline]
pub fn point_in_rect(p: Vec2, rect: &Rect) -> bool {
    let min = rect.min();
    let max = rect.max();
    p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
}
