//! Clip-path handles for composition state
//!
//! A [`ClipPath`] is the accumulated clip of one point in a display-list
//! walk: the intersection of every clip operation applied by the current
//! context and its ancestors. Handles are cheap to clone and share
//! structure: each clip operation pushes one immutable node onto a
//! reference-counted chain, so sibling contexts reuse their common ancestor
//! clips instead of copying them.
//!
//! Damage resolution consumes clips two ways:
//! - [`ClipPath::bounds`]: the axis-aligned bounding box of the clip, used
//!   to trim contributed rectangles. The AABB intersection of chained clips
//!   is conservative (it can only over-approximate the true clip region),
//!   which is the safe direction for damage.
//! - Equality: the cross-frame layer differ compares clip chains
//!   structurally. Node shapes are kept as real `tiny_skia` path geometry so
//!   that clips with identical bounds but different outlines (a sharp versus
//!   a rounded corner, or two different corner radii) still compare unequal
//!   and re-raster the layer.

use crate::geometry::Rect;
use crate::transform::Transform2D;
use std::fmt;
use std::sync::Arc;
use tiny_skia::PathBuilder;

/// Control-point factor approximating a quarter circle with one cubic.
const ARC_K: f32 = 0.552_284_8;

struct ClipNode {
  /// Absolute-coordinate outline of this clip shape. `None` marks a
  /// degenerate clip (zero-area or non-finite input) that excludes
  /// everything.
  shape: Option<tiny_skia::Path>,
  /// Axis-aligned bounding box of `shape` in surface coordinates.
  bounds: Rect,
  parent: Option<Arc<ClipNode>>,
}

impl fmt::Debug for ClipNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClipNode")
      .field("degenerate", &self.shape.is_none())
      .field("bounds", &self.bounds)
      .field("parent", &self.parent)
      .finish()
  }
}

/// Accumulated clip region handle
///
/// The default handle is *unclipped*: semantically the whole surface, with
/// no bounds of its own.
///
/// # Examples
///
/// ```
/// use fastdamage::clip::ClipPath;
/// use fastdamage::geometry::Rect;
/// use fastdamage::transform::Transform2D;
///
/// let clip = ClipPath::none().intersect_rect(80.0, 60.0, &Transform2D::IDENTITY);
/// assert_eq!(clip.bounds(), Some(Rect::from_xywh(0.0, 0.0, 80.0, 60.0)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ClipPath {
  node: Option<Arc<ClipNode>>,
}

impl ClipPath {
  /// Returns the unclipped handle
  pub fn none() -> Self {
    Self { node: None }
  }

  /// Returns true if no clip operation has been applied
  pub fn is_unclipped(&self) -> bool {
    self.node.is_none()
  }

  /// Intersects with the local rectangle `(0, 0, width, height)` mapped into
  /// surface coordinates by `matrix`, returning a new handle
  ///
  /// Non-positive or non-finite dimensions produce a degenerate clip that
  /// excludes everything: producers can animate a clip down to zero size,
  /// and that must clip content out rather than panic.
  pub fn intersect_rect(&self, width: f32, height: f32, matrix: &Transform2D) -> ClipPath {
    let shape = tiny_skia::Rect::from_xywh(0.0, 0.0, width, height)
      .map(PathBuilder::from_rect)
      .and_then(|path| path.transform(matrix.to_tiny_skia()));
    self.push(shape, width, height, matrix)
  }

  /// Intersects with a uniform-radius rounded rectangle `(0, 0, width,
  /// height)` mapped into surface coordinates by `matrix`
  ///
  /// The radius is clamped to half the shorter side. A zero radius degrades
  /// to the plain rectangle outline.
  pub fn intersect_rounded_rect(
    &self,
    border_radius: f32,
    width: f32,
    height: f32,
    matrix: &Transform2D,
  ) -> ClipPath {
    let shape = build_rounded_rect_path(width, height, border_radius)
      .and_then(|path| path.transform(matrix.to_tiny_skia()));
    self.push(shape, width, height, matrix)
  }

  fn push(
    &self,
    shape: Option<tiny_skia::Path>,
    width: f32,
    height: f32,
    matrix: &Transform2D,
  ) -> ClipPath {
    let bounds = match &shape {
      Some(path) => {
        let b = path.bounds();
        Rect::from_ltrb(b.left(), b.top(), b.right(), b.bottom())
      }
      // Degenerate shape: keep a zero-area bounds at the mapped location so
      // the chain intersection collapses there.
      None => matrix.map_rect(Rect::from_xywh(0.0, 0.0, width.max(0.0), height.max(0.0))),
    };
    ClipPath {
      node: Some(Arc::new(ClipNode {
        shape,
        bounds,
        parent: self.node.clone(),
      })),
    }
  }

  /// Returns the axis-aligned bounding box of the accumulated clip, or
  /// `None` when unclipped
  ///
  /// Computed as the saturating intersection of every node's bounds down
  /// the chain.
  pub fn bounds(&self) -> Option<Rect> {
    let mut acc: Option<Rect> = None;
    let mut cursor = self.node.as_deref();
    while let Some(node) = cursor {
      acc = Some(match acc {
        Some(r) => r.intersect(node.bounds),
        None => node.bounds,
      });
      cursor = node.parent.as_deref();
    }
    acc
  }
}

impl PartialEq for ClipPath {
  fn eq(&self, other: &Self) -> bool {
    let mut a = self.node.as_ref();
    let mut b = other.node.as_ref();
    loop {
      match (a, b) {
        (None, None) => return true,
        (Some(na), Some(nb)) => {
          // Shared ancestry short-circuits the structural walk.
          if Arc::ptr_eq(na, nb) {
            return true;
          }
          if na.bounds != nb.bounds || na.shape != nb.shape {
            return false;
          }
          a = na.parent.as_ref();
          b = nb.parent.as_ref();
        }
        _ => return false,
      }
    }
  }
}

/// Builds the outline of a uniform-radius rounded rectangle at the origin,
/// approximating each corner with a single cubic.
fn build_rounded_rect_path(width: f32, height: f32, radius: f32) -> Option<tiny_skia::Path> {
  if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
    return None;
  }

  let r = radius.clamp(0.0, width.min(height) / 2.0);
  if !(r > 0.0) {
    return tiny_skia::Rect::from_xywh(0.0, 0.0, width, height).map(PathBuilder::from_rect);
  }

  let mut pb = PathBuilder::new();
  let right = width;
  let bottom = height;
  let k = ARC_K;

  pb.move_to(r, 0.0);
  pb.line_to(right - r, 0.0);
  pb.cubic_to(
    right - r * (1.0 - k),
    0.0,
    right,
    r * (1.0 - k),
    right,
    r,
  );
  pb.line_to(right, bottom - r);
  pb.cubic_to(
    right,
    bottom - r * (1.0 - k),
    right - r * (1.0 - k),
    bottom,
    right - r,
    bottom,
  );
  pb.line_to(r, bottom);
  pb.cubic_to(r * (1.0 - k), bottom, 0.0, bottom - r * (1.0 - k), 0.0, bottom - r);
  pb.line_to(0.0, r);
  pb.cubic_to(0.0, r * (1.0 - k), r * (1.0 - k), 0.0, r, 0.0);
  pb.close();
  pb.finish()
}
