//! Display-list construction
//!
//! [`DisplayListBuilder`] assembles plane-organized operation streams with
//! balanced context nesting. Contexts are scoped by closures, so a push
//! without its matching pop cannot be expressed.
//!
//! # Example
//!
//! ```
//! use fastdamage::display_list_builder::DisplayListBuilder;
//! use fastdamage::geometry::{Point, Size};
//!
//! let mut builder = DisplayListBuilder::new(100.0, 100.0);
//! builder.layer_context(Point::ZERO, 1.0, 1, true, |b| {
//!   b.rectangle(Size::new(100.0, 100.0));
//!   b.layer_context(Point::new(50.0, 50.0), 1.0, 2, true, |b| {
//!     b.rectangle(Size::new(10.0, 10.0));
//!   });
//! });
//! let list = builder.finish();
//! assert_eq!(list.planes_count(), 1);
//! ```

use crate::display_list::{DisplayList, ExternalSurfaceSnapshot, Mask, Operation, Picture};
use crate::geometry::{Point, Rect, Size};
use crate::transform::Transform2D;
use std::sync::Arc;

/// Builds a [`DisplayList`] one operation at a time
pub struct DisplayListBuilder {
  size: Size,
  planes: Vec<Vec<Operation>>,
}

impl DisplayListBuilder {
  /// Creates a builder for a list produced in a `width` × `height`
  /// coordinate space, with one open plane
  pub fn new(width: f32, height: f32) -> Self {
    Self {
      size: Size::new(width, height),
      planes: vec![Vec::new()],
    }
  }

  /// Starts a new plane; subsequent operations land there
  pub fn begin_plane(&mut self) {
    self.planes.push(Vec::new());
  }

  fn push(&mut self, op: Operation) {
    // new() always seeds one plane, so last_mut cannot fail.
    self.planes.last_mut().unwrap().push(op);
  }

  /// Opens an un-layered context translated by `offset`, builds its content
  /// with `build`, and closes it
  pub fn context(&mut self, offset: Point, opacity: f32, build: impl FnOnce(&mut Self)) {
    self.layer_context(offset, opacity, 0, false, build);
  }

  /// Opens a layer context translated by `offset`, builds its content with
  /// `build`, and closes it
  pub fn layer_context(
    &mut self,
    offset: Point,
    opacity: f32,
    layer_id: u64,
    has_updates: bool,
    build: impl FnOnce(&mut Self),
  ) {
    self.matrix_context(
      Transform2D::from_translate(offset.x, offset.y),
      opacity,
      layer_id,
      has_updates,
      build,
    );
  }

  /// Opens a layer context with an arbitrary local matrix
  pub fn matrix_context(
    &mut self,
    matrix: Transform2D,
    opacity: f32,
    layer_id: u64,
    has_updates: bool,
    build: impl FnOnce(&mut Self),
  ) {
    self.push(Operation::PushContext {
      opacity,
      matrix,
      layer_id,
      has_updates,
    });
    build(self);
    self.push(Operation::PopContext);
  }

  /// Clips the current context to `(0, 0, width, height)`
  pub fn clip_rect(&mut self, width: f32, height: f32) {
    self.push(Operation::ClipRect { width, height });
  }

  /// Clips the current context to a uniform-radius rounded rectangle
  pub fn clip_round(&mut self, border_radius: f32, width: f32, height: f32) {
    self.push(Operation::ClipRound {
      border_radius,
      width,
      height,
    });
  }

  /// Draws a picture whose cull rectangle is `(0, 0, size.width, size.height)`
  pub fn rectangle(&mut self, size: Size) {
    self.draw_picture(Arc::new(Picture::new(Rect::from_xywh(
      0.0,
      0.0,
      size.width,
      size.height,
    ))));
  }

  /// Draws an existing picture handle
  pub fn draw_picture(&mut self, picture: Arc<Picture>) {
    self.push(Operation::DrawPicture { picture });
  }

  /// Draws an external surface of the given local size
  pub fn external_surface(&mut self, size: Size) {
    self.push(Operation::DrawExternalSurface {
      snapshot: Arc::new(ExternalSurfaceSnapshot::new(size)),
    });
  }

  /// Prepares a mask covering `bounds`
  pub fn prepare_mask(&mut self, bounds: Rect) {
    self.push(Operation::PrepareMask {
      mask: Arc::new(Mask::new(bounds)),
    });
  }

  /// Applies the previously prepared mask
  pub fn apply_mask(&mut self) {
    self.push(Operation::ApplyMask);
  }

  /// Consumes the builder and returns the finished list
  pub fn finish(self) -> DisplayList {
    DisplayList::new(self.size, self.planes)
  }
}
