//! Raster damage resolution for incremental 2D compositing
//!
//! `fastdamage` computes the minimal set of axis-aligned surface rectangles
//! that must be re-rasterized to bring a framebuffer in sync with a new
//! frame, given successive display lists describing what each frame should
//! look like. Restricting the raster pass to those rectangles is the key
//! optimization of an incremental compositor: unchanged regions are never
//! redrawn.
//!
//! # Pipeline
//!
//! ```text
//! DisplayList → walk (composition stack) → layer contributions
//!                                               │
//!             previous frame's contributions ──┤
//!                                               ▼
//!                                      cross-frame diff → damage rects
//! ```
//!
//! Per frame, a [`RasterDamageResolver`] is driven in three phases: announce
//! the surface size, ingest one or more display lists, and end the frame to
//! collect the merged damage rectangles. Damage is conservative (every
//! rectangle is snapped outward to the pixel grid and padded by 1px for
//! anti-aliasing bleed), and the returned rectangles are pairwise disjoint
//! under a small numeric tolerance.
//!
//! # Example
//!
//! ```
//! use fastdamage::{DisplayListBuilder, RasterDamageResolver};
//! use fastdamage::geometry::{Point, Size};
//!
//! let frame = |offset: Point| {
//!   let mut builder = DisplayListBuilder::new(100.0, 100.0);
//!   builder.layer_context(offset, 1.0, 1, false, |b| {
//!     b.rectangle(Size::new(10.0, 10.0));
//!   });
//!   builder.finish()
//! };
//!
//! let mut resolver = RasterDamageResolver::new();
//!
//! // First frame: the surface appears, so everything is damaged.
//! resolver.begin_updates(100.0, 100.0);
//! resolver.add_damage_from_display_list_updates(&frame(Point::new(20.0, 20.0)));
//! resolver.end_updates();
//!
//! // The layer moves: damage covers its old and new positions only.
//! resolver.begin_updates(100.0, 100.0);
//! resolver.add_damage_from_display_list_updates(&frame(Point::new(60.0, 60.0)));
//! let damage = resolver.end_updates();
//! assert_eq!(damage.len(), 2);
//! ```

pub mod clip;
pub mod composition;
pub mod damage;
pub mod display_list;
pub mod display_list_builder;
pub mod geometry;
pub mod resolver;
pub mod transform;

pub use clip::ClipPath;
pub use composition::CompositionState;
pub use damage::DamageList;
pub use display_list::{
  DisplayList, ExternalSurfaceSnapshot, Mask, Operation, OperationVisitor, Picture,
};
pub use display_list_builder::DisplayListBuilder;
pub use geometry::{Point, Rect, Size};
pub use resolver::RasterDamageResolver;
pub use transform::Transform2D;
