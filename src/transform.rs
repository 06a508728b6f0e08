//! 2D affine transforms
//!
//! [`Transform2D`] covers the subset of transform behavior damage resolution
//! needs: composing context matrices while walking a display list, mapping
//! local rectangles into surface coordinates, and tolerance-based comparison
//! for cross-frame diffing.

use crate::geometry::{nearly_equal, Point, Rect};

/// A 2D affine transform
///
/// Maps points as:
///
/// ```text
/// x' = a*x + c*y + e
/// y' = b*x + d*y + f
/// ```
///
/// which is the standard column-vector convention:
///
/// ```text
/// [a c e]   [x]
/// [b d f] * [y]
/// [0 0 1]   [1]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
  /// Scale X (m11)
  pub a: f32,
  /// Shear Y (m12)
  pub b: f32,
  /// Shear X (m21)
  pub c: f32,
  /// Scale Y (m22)
  pub d: f32,
  /// Translate X (m31)
  pub e: f32,
  /// Translate Y (m32)
  pub f: f32,
}

impl Transform2D {
  /// Identity transform (no transformation)
  pub const IDENTITY: Self = Self {
    a: 1.0,
    b: 0.0,
    c: 0.0,
    d: 1.0,
    e: 0.0,
    f: 0.0,
  };

  /// Create identity transform
  pub fn identity() -> Self {
    Self::IDENTITY
  }

  /// Create translation transform
  pub fn from_translate(x: f32, y: f32) -> Self {
    Self {
      a: 1.0,
      b: 0.0,
      c: 0.0,
      d: 1.0,
      e: x,
      f: y,
    }
  }

  /// Create scale transform
  pub fn from_scale(sx: f32, sy: f32) -> Self {
    Self {
      a: sx,
      b: 0.0,
      c: 0.0,
      d: sy,
      e: 0.0,
      f: 0.0,
    }
  }

  /// Create a transform from its six components in row notation
  pub const fn from_row(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
    Self { a, b, c, d, e, f }
  }

  /// Overwrites the X scale component
  pub fn set_scale_x(&mut self, sx: f32) {
    self.a = sx;
  }

  /// Overwrites the Y scale component
  pub fn set_scale_y(&mut self, sy: f32) {
    self.d = sy;
  }

  /// Multiply two transforms (concatenate)
  ///
  /// The result applies `other` first, then `self`: the right-multiplication
  /// used when a child context is pushed onto the composition stack:
  /// `absolute = parent.multiply(&child_local)`.
  ///
  /// # Examples
  ///
  /// ```
  /// use fastdamage::geometry::Point;
  /// use fastdamage::transform::Transform2D;
  ///
  /// let parent = Transform2D::from_scale(2.0, 2.0);
  /// let child = Transform2D::from_translate(10.0, 0.0);
  /// let absolute = parent.multiply(&child);
  /// // The child translation happens in parent space, so it is scaled.
  /// assert_eq!(absolute.transform_point(Point::ZERO), Point::new(20.0, 0.0));
  /// ```
  #[allow(clippy::suspicious_operation_groupings)]
  pub fn multiply(&self, other: &Transform2D) -> Transform2D {
    // Standard 2D affine matrix multiplication:
    // [a c e]   [a' c' e']   [a*a'+c*b'  a*c'+c*d'  a*e'+c*f'+e]
    // [b d f] * [b' d' f'] = [b*a'+d*b'  b*c'+d*d'  b*e'+d*f'+f]
    // [0 0 1]   [0  0  1 ]   [0          0          1          ]
    Transform2D {
      a: self.a * other.a + self.c * other.b,
      b: self.b * other.a + self.d * other.b,
      c: self.a * other.c + self.c * other.d,
      d: self.b * other.c + self.d * other.d,
      e: self.a * other.e + self.c * other.f + self.e,
      f: self.b * other.e + self.d * other.f + self.f,
    }
  }

  /// Transform a point
  pub fn transform_point(&self, p: Point) -> Point {
    Point {
      x: self.a * p.x + self.c * p.y + self.e,
      y: self.b * p.x + self.d * p.y + self.f,
    }
  }

  /// Map a rectangle, returning the axis-aligned bounding box of the four
  /// transformed corners
  ///
  /// The result may be larger than the transformed shape when rotation or
  /// shear is involved, which is the conservative direction for damage.
  pub fn map_rect(&self, rect: Rect) -> Rect {
    let p1 = self.transform_point(Point::new(rect.left, rect.top));
    let p2 = self.transform_point(Point::new(rect.right, rect.top));
    let p3 = self.transform_point(Point::new(rect.left, rect.bottom));
    let p4 = self.transform_point(Point::new(rect.right, rect.bottom));

    Rect {
      left: p1.x.min(p2.x).min(p3.x).min(p4.x),
      top: p1.y.min(p2.y).min(p3.y).min(p4.y),
      right: p1.x.max(p2.x).max(p3.x).max(p4.x),
      bottom: p1.y.max(p2.y).max(p3.y).max(p4.y),
    }
  }

  /// Returns true if every component of `other` is within the shared
  /// tolerance of the corresponding component of `self`
  ///
  /// Used by the layer differ instead of `==`: equivalent matrices built
  /// through different multiplication orders differ in the last few bits.
  pub fn nearly_equals(&self, other: &Transform2D) -> bool {
    nearly_equal(self.a, other.a)
      && nearly_equal(self.b, other.b)
      && nearly_equal(self.c, other.c)
      && nearly_equal(self.d, other.d)
      && nearly_equal(self.e, other.e)
      && nearly_equal(self.f, other.f)
  }

  /// Returns true if every component is finite
  pub fn is_finite(&self) -> bool {
    self.a.is_finite()
      && self.b.is_finite()
      && self.c.is_finite()
      && self.d.is_finite()
      && self.e.is_finite()
      && self.f.is_finite()
  }

  /// Converts to the equivalent `tiny_skia` transform
  pub fn to_tiny_skia(&self) -> tiny_skia::Transform {
    tiny_skia::Transform::from_row(self.a, self.b, self.c, self.d, self.e, self.f)
  }
}

impl Default for Transform2D {
  fn default() -> Self {
    Self::IDENTITY
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_identity_maps_points_unchanged() {
    let p = Point::new(10.0, 20.0);
    assert_eq!(Transform2D::identity().transform_point(p), p);
  }

  #[test]
  fn test_translate() {
    let t = Transform2D::from_translate(5.0, 10.0);
    assert_eq!(
      t.transform_point(Point::new(10.0, 20.0)),
      Point::new(15.0, 30.0)
    );
  }

  #[test]
  fn test_scale() {
    let t = Transform2D::from_scale(2.0, 3.0);
    assert_eq!(
      t.transform_point(Point::new(10.0, 10.0)),
      Point::new(20.0, 30.0)
    );
  }

  #[test]
  fn test_set_scale_components() {
    let mut t = Transform2D::identity();
    t.set_scale_x(2.0);
    t.set_scale_y(0.5);
    assert_eq!(t, Transform2D::from_scale(2.0, 0.5));
  }

  #[test]
  fn test_multiply_applies_child_first() {
    let parent = Transform2D::from_scale(2.0, 2.0);
    let child = Transform2D::from_translate(10.0, 5.0);
    let absolute = parent.multiply(&child);
    // Child translation is expressed in parent space.
    assert_eq!(absolute.transform_point(Point::ZERO), Point::new(20.0, 10.0));
  }

  #[test]
  fn test_multiply_identity_is_noop() {
    let t = Transform2D::from_row(2.0, 0.5, -0.5, 2.0, 7.0, 3.0);
    assert_eq!(Transform2D::IDENTITY.multiply(&t), t);
    assert_eq!(t.multiply(&Transform2D::IDENTITY), t);
  }

  #[test]
  fn test_map_rect_translate_and_scale() {
    let t = Transform2D::from_scale(2.0, 2.0).multiply(&Transform2D::from_translate(5.0, 5.0));
    let mapped = t.map_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    assert_eq!(mapped, Rect::from_xywh(10.0, 10.0, 20.0, 20.0));
  }

  #[test]
  fn test_map_rect_shear_produces_bounding_box() {
    // Pure X shear: the mapped unit square leans right but the AABB must
    // contain all four corners.
    let t = Transform2D::from_row(1.0, 0.0, 1.0, 1.0, 0.0, 0.0);
    let mapped = t.map_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    assert_eq!(mapped, Rect::from_ltrb(0.0, 0.0, 20.0, 10.0));
  }

  #[test]
  fn test_nearly_equals_tolerates_jitter() {
    let a = Transform2D::from_translate(50.0, 50.0);
    let b = Transform2D::from_row(1.0, 0.0, 0.0, 1.0, 50.00005, 49.99995);
    assert!(a.nearly_equals(&b));
    let moved = Transform2D::from_translate(50.5, 50.0);
    assert!(!a.nearly_equals(&moved));
  }

  #[test]
  fn test_is_finite() {
    assert!(Transform2D::IDENTITY.is_finite());
    let mut t = Transform2D::IDENTITY;
    t.e = f32::NAN;
    assert!(!t.is_finite());
  }

  #[test]
  fn test_to_tiny_skia_round_trips_points() {
    let t = Transform2D::from_row(2.0, 0.0, 0.0, 3.0, 4.0, 5.0);
    let sk = t.to_tiny_skia();
    let mut points = [tiny_skia::Point::from_xy(1.0, 1.0)];
    sk.map_points(&mut points);
    let mapped = t.transform_point(Point::new(1.0, 1.0));
    assert_eq!(points[0].x, mapped.x);
    assert_eq!(points[0].y, mapped.y);
  }
}
