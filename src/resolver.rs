//! Raster damage resolution
//!
//! [`RasterDamageResolver`] compares successive frames of display lists and
//! produces the minimal set of surface rectangles whose pixels must be
//! re-rasterized. One resolver instance is scoped to one render surface and
//! is driven in three phases per frame:
//!
//! 1. [`begin_updates`](RasterDamageResolver::begin_updates) announces the
//!    surface size (a size change damages the whole surface).
//! 2. [`add_damage_from_display_list_updates`](RasterDamageResolver::add_damage_from_display_list_updates)
//!    walks a display list, recording what every layer covers this frame.
//! 3. [`end_updates`](RasterDamageResolver::end_updates) diffs this frame's
//!    layer coverage against the previous frame's, merges the resulting
//!    rectangles, and rotates frame state.
//!
//! # Damage expansion
//!
//! Every rectangle entering the damage list goes through the same expansion:
//! outward snap to the pixel grid, then 1px of growth on every edge.
//! Anti-aliasing can touch pixels just outside a shape's geometric bound;
//! the damage rectangles are consumed as raster clip regions, so without
//! that margin the blended edge pixels would never be rewritten and moving
//! content would leave trails.

use crate::clip::ClipPath;
use crate::composition::CompositionState;
use crate::damage::DamageList;
use crate::display_list::{DisplayList, Operation, OperationVisitor};
use crate::geometry::{nearly_equal, Rect};
use crate::transform::Transform2D;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Everything one layer covered in one frame
///
/// Written by the display-list walk (last writer wins within a frame) and
/// consumed by the cross-frame diff.
#[derive(Debug, Clone)]
struct LayerContribution {
  /// Expanded surface-coordinate rectangle the layer's draws covered
  absolute_rect: Rect,
  absolute_matrix: Transform2D,
  clip_path: ClipPath,
  absolute_opacity: f32,
  /// Producer-declared content change; cleared once consumed by the diff
  has_updates: bool,
}

/// Applies the shared damage expansion policy: pixel-grid snap plus a 1px
/// anti-aliasing margin.
fn expand_for_raster(rect: Rect) -> Rect {
  rect.make_outset().inflate(1.0)
}

/// Cross-frame damage resolver for one render surface
///
/// Not reentrant; drive `begin_updates`, any number of ingest calls, and
/// `end_updates` in strict sequence from one thread. Separate instances are
/// fully independent.
///
/// # Examples
///
/// ```
/// use fastdamage::display_list_builder::DisplayListBuilder;
/// use fastdamage::geometry::{Point, Size};
/// use fastdamage::resolver::RasterDamageResolver;
///
/// let mut builder = DisplayListBuilder::new(100.0, 100.0);
/// builder.layer_context(Point::ZERO, 1.0, 1, true, |b| {
///   b.rectangle(Size::new(100.0, 100.0));
/// });
/// let list = builder.finish();
///
/// let mut resolver = RasterDamageResolver::new();
/// resolver.begin_updates(100.0, 100.0);
/// resolver.add_damage_from_display_list_updates(&list);
/// let damage = resolver.end_updates();
/// assert!(!damage.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RasterDamageResolver {
  width: f32,
  height: f32,
  layer_contents: FxHashMap<u64, LayerContribution>,
  previous_layer_contents: FxHashMap<u64, LayerContribution>,
  damage: DamageList,
}

impl RasterDamageResolver {
  /// Creates a resolver with no recorded surface size
  ///
  /// The first `begin_updates` call therefore always produces full-surface
  /// damage.
  pub fn new() -> Self {
    Self::default()
  }

  /// Begins a frame at the given surface size
  ///
  /// If the size differs from the previous frame's, the expanded
  /// full-surface rectangle is added to the damage list. Nothing else is
  /// touched; in particular the current-frame layer map survives, so a
  /// caller that abandoned the previous frame (ingested without calling
  /// [`end_updates`](Self::end_updates)) carries those stale contributions
  /// into this frame.
  ///
  /// # Panics
  ///
  /// Panics if either dimension is negative or non-finite.
  pub fn begin_updates(&mut self, surface_width: f32, surface_height: f32) {
    assert!(
      surface_width.is_finite() && surface_width >= 0.0,
      "surface width must be finite and non-negative, got {surface_width}"
    );
    assert!(
      surface_height.is_finite() && surface_height >= 0.0,
      "surface height must be finite and non-negative, got {surface_height}"
    );

    let changed = self.width != surface_width || self.height != surface_height;
    self.width = surface_width;
    self.height = surface_height;

    if changed {
      self
        .damage
        .add(expand_for_raster(Rect::from_xywh(
          0.0,
          0.0,
          surface_width,
          surface_height,
        )));
    }
  }

  /// Walks a display list and records this frame's layer contributions
  ///
  /// The walk starts from a composition state that scales the list's
  /// coordinate space onto the surface. Multiple calls between one
  /// `begin_updates`/`end_updates` pair accumulate; a layer touched by
  /// several lists keeps the last contribution.
  pub fn add_damage_from_display_list_updates(&mut self, display_list: &DisplayList) {
    let size = display_list.size();
    let scale_x = self.width / size.width;
    let scale_y = self.height / size.height;
    let mut visitor = DamageVisitor::new(self, scale_x, scale_y);
    for plane_index in 0..display_list.planes_count() {
      display_list.visit_operations(plane_index, &mut visitor);
    }
  }

  /// Ends the frame: diffs layer coverage against the previous frame,
  /// rotates frame state, and returns the merged damage rectangles
  ///
  /// An empty result is the normal signal that nothing changed.
  pub fn end_updates(&mut self) -> Vec<Rect> {
    self.resolve_damage();

    std::mem::swap(&mut self.previous_layer_contents, &mut self.layer_contents);
    self.layer_contents.clear();

    self.damage.take()
  }

  /// Cross-frame layer diff
  ///
  /// First pass: every previous-frame layer that disappeared damages its
  /// old rectangle; every surviving layer whose geometry, clip, opacity, or
  /// update flag changed damages both its old and new rectangles. Second
  /// pass: remaining `has_updates` flags mark layers the first pass never
  /// saw, that is newly appeared layers, which damage their new rectangle.
  ///
  /// A layer appearing *without* the flag set is intentionally silent:
  /// there is no membership test against the previous frame, and producers
  /// are required to flag a layer's introducing frame.
  fn resolve_damage(&mut self) {
    for (layer_id, old) in &self.previous_layer_contents {
      let Some(new) = self.layer_contents.get_mut(layer_id) else {
        self.damage.add(old.absolute_rect);
        continue;
      };

      if new.has_updates
        || !new.absolute_matrix.nearly_equals(&old.absolute_matrix)
        || new.clip_path != old.clip_path
        || !new.absolute_rect.nearly_equals(&old.absolute_rect)
        || !nearly_equal(new.absolute_opacity, old.absolute_opacity)
      {
        new.has_updates = false;

        self.damage.add(old.absolute_rect);
        self.damage.add(new.absolute_rect);
      }
    }

    for contribution in self.layer_contents.values_mut() {
      if contribution.has_updates {
        contribution.has_updates = false;
        self.damage.add(contribution.absolute_rect);
      }
    }
  }

  /// Records what a layer covers this frame; successive writes for the
  /// same layer within a frame overwrite.
  fn record_layer_contribution(
    &mut self,
    layer_id: u64,
    absolute_rect: Rect,
    absolute_matrix: Transform2D,
    clip_path: ClipPath,
    absolute_opacity: f32,
    has_updates: bool,
  ) {
    self.layer_contents.insert(
      layer_id,
      LayerContribution {
        absolute_rect,
        absolute_matrix,
        clip_path,
        absolute_opacity,
        has_updates,
      },
    );
  }
}

/// One element of the walk's context stack
struct LayerContext {
  state: CompositionState,
  layer_id: u64,
  has_updates: bool,
}

/// Display-list walker that turns drawing operations into layer
/// contributions
///
/// Context operations maintain the stack; drawing operations project their
/// local bounds through the top of the stack and record them.
struct DamageVisitor<'a> {
  resolver: &'a mut RasterDamageResolver,
  // Scenes rarely nest deeper than this; deeper stacks spill to the heap.
  stack: SmallVec<[LayerContext; 8]>,
}

impl<'a> DamageVisitor<'a> {
  fn new(resolver: &'a mut RasterDamageResolver, scale_x: f32, scale_y: f32) -> Self {
    let mut base_matrix = Transform2D::identity();
    base_matrix.set_scale_x(scale_x);
    base_matrix.set_scale_y(scale_y);

    let mut stack = SmallVec::new();
    stack.push(LayerContext {
      state: CompositionState::new(base_matrix, 1.0),
      layer_id: 0,
      has_updates: false,
    });
    Self { resolver, stack }
  }

  fn current_context(&mut self) -> &mut LayerContext {
    // The base element is never popped, so the stack is never empty.
    self.stack.last_mut().unwrap()
  }

  /// Shared contribution path for every drawing operation
  fn add_damage_if_needed(&mut self, bounds: Rect) {
    let context = self.stack.last().unwrap();
    let absolute_rect = expand_for_raster(context.state.absolute_clipped_rect(bounds));

    self.resolver.record_layer_contribution(
      context.layer_id,
      absolute_rect,
      *context.state.absolute_matrix(),
      context.state.absolute_clip_path().clone(),
      context.state.absolute_opacity(),
      context.has_updates,
    );
  }
}

impl OperationVisitor for DamageVisitor<'_> {
  fn visit(&mut self, op: &Operation) {
    match op {
      Operation::PushContext {
        opacity,
        matrix,
        layer_id,
        has_updates,
      } => {
        let top = self.current_context();
        let state = top.state.push_context(*opacity, matrix);
        self.stack.push(LayerContext {
          state,
          layer_id: *layer_id,
          has_updates: *has_updates,
        });
      }
      Operation::PopContext => {
        assert!(
          self.stack.len() > 1,
          "PopContext without a matching PushContext"
        );
        self.stack.pop();
      }
      Operation::ClipRect { width, height } => {
        self.current_context().state.clip_rect(*width, *height);
      }
      Operation::ClipRound {
        border_radius,
        width,
        height,
      } => {
        self
          .current_context()
          .state
          .clip_round(*border_radius, *width, *height);
      }
      Operation::DrawPicture { picture } => {
        self.add_damage_if_needed(picture.cull_rect());
      }
      Operation::DrawExternalSurface { snapshot } => {
        let size = snapshot.relative_size();
        self.add_damage_if_needed(Rect::from_xywh(0.0, 0.0, size.width, size.height));
      }
      Operation::PrepareMask { mask } => {
        self.add_damage_if_needed(mask.bounds());
      }
      Operation::ApplyMask => {}
    }
  }
}
