//! Display-list types consumed by the damage resolver
//!
//! A display list is an immutable, ordered description of one frame's
//! drawing, organized into planes. Operations come in two kinds:
//!
//! - *Context* operations ([`Operation::PushContext`] / [`Operation::PopContext`],
//!   the clip operations) reshape how later operations project onto the
//!   surface but draw nothing themselves.
//! - *Drawing* operations ([`Operation::DrawPicture`],
//!   [`Operation::DrawExternalSurface`], [`Operation::PrepareMask`])
//!   contribute pixels and therefore damage.
//!
//! The drawing operations reference opaque, reference-counted handles
//! ([`Picture`], [`ExternalSurfaceSnapshot`], [`Mask`]) shared with the
//! producer; the resolver only ever reads their bounding geometry.

use crate::geometry::{Rect, Size};
use crate::transform::Transform2D;
use std::fmt;
use std::sync::Arc;

/// A recorded drawing
///
/// Stands in for the producer's recorded drawing handle; damage resolution
/// consumes only the cull rectangle, the local-coordinate bound the
/// recording promises to stay inside.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
  cull_rect: Rect,
}

impl Picture {
  /// Creates a picture with the given cull rectangle
  pub fn new(cull_rect: Rect) -> Self {
    Self { cull_rect }
  }

  /// The local-coordinate rectangle the recording stays inside
  pub fn cull_rect(&self) -> Rect {
    self.cull_rect
  }
}

/// A snapshot of externally-composited content (video, camera, platform
/// views) at the moment the display list was produced
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSurfaceSnapshot {
  relative_size: Size,
}

impl ExternalSurfaceSnapshot {
  /// Creates a snapshot with the given size in the embedding context's
  /// local coordinates
  pub fn new(relative_size: Size) -> Self {
    Self { relative_size }
  }

  /// The surface's size in local coordinates
  pub fn relative_size(&self) -> Size {
    self.relative_size
  }
}

/// An alpha mask to be rasterized onto a mask target
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
  bounds: Rect,
}

impl Mask {
  /// Creates a mask covering the given local-coordinate bounds
  pub fn new(bounds: Rect) -> Self {
    Self { bounds }
  }

  /// The local-coordinate bounds the mask's pixels stay inside
  pub fn bounds(&self) -> Rect {
    self.bounds
  }
}

/// A single display-list operation
#[derive(Debug, Clone)]
pub enum Operation {
  /// Begin a nested context: later operations compose `matrix` and
  /// `opacity` on top of the current state until the matching
  /// [`Operation::PopContext`]
  ///
  /// `layer_id` identifies the layer the nested content belongs to across
  /// frames (0 for un-layered content). `has_updates` is the producer's
  /// declaration that the layer's content changed since the previous frame;
  /// producers must also set it on the first frame a layer is introduced,
  /// or the new layer will not be damaged in.
  PushContext {
    /// Opacity multiplied onto the current context's opacity
    opacity: f32,
    /// Local transform composed onto the current context's matrix
    matrix: Transform2D,
    /// Stable cross-frame layer identity (0 = un-layered)
    layer_id: u64,
    /// Producer-declared intra-layer content change
    has_updates: bool,
  },

  /// End the innermost open context
  PopContext,

  /// Intersect the current context's clip with the local rectangle
  /// `(0, 0, width, height)`
  ClipRect {
    /// Clip width in local coordinates
    width: f32,
    /// Clip height in local coordinates
    height: f32,
  },

  /// Intersect the current context's clip with a uniform-radius rounded
  /// rectangle `(0, 0, width, height)`
  ClipRound {
    /// Uniform corner radius in local coordinates
    border_radius: f32,
    /// Clip width in local coordinates
    width: f32,
    /// Clip height in local coordinates
    height: f32,
  },

  /// Draw a recorded picture
  DrawPicture {
    /// The recording; its cull rectangle bounds the drawn pixels
    picture: Arc<Picture>,
  },

  /// Draw externally-composited content
  DrawExternalSurface {
    /// Snapshot of the external surface
    snapshot: Arc<ExternalSurfaceSnapshot>,
  },

  /// Rasterize a mask onto the mask target
  ///
  /// Dirties pixels inside the mask bounds on the target, so it contributes
  /// damage like a draw.
  PrepareMask {
    /// The mask being prepared
    mask: Arc<Mask>,
  },

  /// Composite the previously prepared mask over the content drawn since
  ///
  /// Constrained by the prior [`Operation::PrepareMask`] and the draws under
  /// it; adds no damage of its own.
  ApplyMask,
}

/// Receiver for a display list's operations in producer order
pub trait OperationVisitor {
  /// Called once per operation of the visited plane
  fn visit(&mut self, op: &Operation);
}

/// Immutable, plane-organized description of one frame's drawing
///
/// Planes are visited in index order; within a plane, operations are in
/// producer order. Context push/pop nesting is balanced within each plane.
///
/// # Examples
///
/// ```
/// use fastdamage::display_list::{DisplayList, Operation};
/// use fastdamage::geometry::Size;
///
/// let list = DisplayList::new(Size::new(100.0, 100.0), vec![vec![Operation::ApplyMask]]);
/// assert_eq!(list.planes_count(), 1);
/// assert_eq!(list.plane_operations(0).len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DisplayList {
  size: Size,
  planes: Vec<Vec<Operation>>,
}

impl DisplayList {
  /// Creates a display list from its planes
  pub fn new(size: Size, planes: Vec<Vec<Operation>>) -> Self {
    Self { size, planes }
  }

  /// The size of the coordinate space the list was produced in
  ///
  /// Ingestion maps this onto the surface size, so a list produced at a
  /// different resolution than the surface is scaled, not cropped.
  pub fn size(&self) -> Size {
    self.size
  }

  /// Number of planes
  pub fn planes_count(&self) -> usize {
    self.planes.len()
  }

  /// The operations of one plane, in producer order
  ///
  /// # Panics
  ///
  /// Panics if `plane_index` is out of range.
  pub fn plane_operations(&self, plane_index: usize) -> &[Operation] {
    &self.planes[plane_index]
  }

  /// Feeds every operation of one plane to `visitor`, in producer order
  ///
  /// # Panics
  ///
  /// Panics if `plane_index` is out of range.
  pub fn visit_operations<V: OperationVisitor>(&self, plane_index: usize, visitor: &mut V) {
    for op in &self.planes[plane_index] {
      visitor.visit(op);
    }
  }
}

impl fmt::Display for DisplayList {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let ops: usize = self.planes.iter().map(Vec::len).sum();
    write!(
      f,
      "DisplayList({} planes, {} operations, {})",
      self.planes.len(),
      ops,
      self.size
    )
  }
}
