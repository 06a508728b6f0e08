//! Composition state for display-list walks
//!
//! [`CompositionState`] is one element of the stack maintained while walking
//! a display list: the absolute transform from the current context's local
//! coordinates to surface coordinates, the product of every ancestor
//! opacity, and the accumulated clip. Pushing a context derives a child
//! state; clip operations refine the current state in place.

use crate::clip::ClipPath;
use crate::geometry::Rect;
use crate::transform::Transform2D;

/// Accumulated transform, opacity, and clip at one point of a display-list
/// walk
///
/// # Examples
///
/// ```
/// use fastdamage::composition::CompositionState;
/// use fastdamage::geometry::Rect;
/// use fastdamage::transform::Transform2D;
///
/// let root = CompositionState::new(Transform2D::IDENTITY, 1.0);
/// let child = root.push_context(0.5, &Transform2D::from_translate(50.0, 50.0));
/// let abs = child.absolute_clipped_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
/// assert_eq!(abs, Rect::from_xywh(50.0, 50.0, 10.0, 10.0));
/// assert_eq!(child.absolute_opacity(), 0.5);
/// ```
#[derive(Clone, Debug)]
pub struct CompositionState {
  clip_path: ClipPath,
  matrix: Transform2D,
  opacity: f32,
}

impl CompositionState {
  /// Creates an unclipped state with the given base matrix and opacity
  ///
  /// The base matrix of a display-list walk is the ingestion scale
  /// `diag(surface_w / list_w, surface_h / list_h)`; an unclipped state is
  /// semantically clipped to the scaled surface rectangle.
  pub fn new(matrix: Transform2D, opacity: f32) -> Self {
    Self {
      clip_path: ClipPath::none(),
      matrix,
      opacity,
    }
  }

  /// Derives the state for a child context
  ///
  /// The child's matrix is composed by right-multiplication (the child's
  /// local matrix applies first), its opacity is the running product, and
  /// the clip chain is inherited by reference.
  pub fn push_context(&self, opacity: f32, matrix: &Transform2D) -> CompositionState {
    CompositionState {
      clip_path: self.clip_path.clone(),
      matrix: self.matrix.multiply(matrix),
      opacity: self.opacity * opacity,
    }
  }

  /// Intersects the clip with the local rectangle `(0, 0, width, height)`,
  /// expressed in absolute coordinates
  pub fn clip_rect(&mut self, width: f32, height: f32) {
    self.clip_path = self.clip_path.intersect_rect(width, height, &self.matrix);
  }

  /// Intersects the clip with a uniform-radius rounded rectangle
  /// `(0, 0, width, height)`, expressed in absolute coordinates
  pub fn clip_round(&mut self, border_radius: f32, width: f32, height: f32) {
    self.clip_path = self
      .clip_path
      .intersect_rounded_rect(border_radius, width, height, &self.matrix);
  }

  /// Projects a local rectangle into surface coordinates and trims it to
  /// the clip bounds
  ///
  /// The projection takes the axis-aligned bounding box of the transformed
  /// corners, and the trim uses the clip chain's AABB; both over-approximate
  /// the exact region, which is the conservative direction for damage.
  pub fn absolute_clipped_rect(&self, local: Rect) -> Rect {
    let mapped = self.matrix.map_rect(local);
    match self.clip_path.bounds() {
      Some(clip_bounds) => mapped.intersect(clip_bounds),
      None => mapped,
    }
  }

  /// The absolute transform from local to surface coordinates
  pub fn absolute_matrix(&self) -> &Transform2D {
    &self.matrix
  }

  /// The accumulated clip chain
  pub fn absolute_clip_path(&self) -> &ClipPath {
    &self.clip_path
  }

  /// The product of every ancestor opacity
  pub fn absolute_opacity(&self) -> f32 {
    self.opacity
  }
}
