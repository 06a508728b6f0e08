//! Damage rectangle accumulation
//!
//! [`DamageList`] collects the rectangles a frame must re-rasterize while
//! keeping them pairwise disjoint under the shared tolerance: any inserted
//! rectangle that touches existing entries absorbs them into one bounding
//! rectangle. Consumers iterate the final list as raster clip regions, so
//! overlap between entries would mean rasterizing the shared pixels twice.
//!
//! Insertion is a linear scan and the merge loop is O(n²) in the worst
//! case. The list length is bounded by the number of layers that changed in
//! a frame, which is small in practice; a spatial index would not pay for
//! itself here.

use crate::geometry::Rect;

/// Unordered collection of pairwise disjoint-under-tolerance damage
/// rectangles
///
/// # Examples
///
/// ```
/// use fastdamage::damage::DamageList;
/// use fastdamage::geometry::Rect;
///
/// let mut damage = DamageList::new();
/// damage.add(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
/// damage.add(Rect::from_xywh(5.0, 5.0, 10.0, 10.0));
/// assert_eq!(damage.rects(), &[Rect::from_xywh(0.0, 0.0, 15.0, 15.0)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DamageList {
  rects: Vec<Rect>,
}

impl DamageList {
  /// Creates an empty list
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts a rectangle, merging away every stored rectangle it touches
  ///
  /// The candidate is unioned with intersecting entries until no entry
  /// intersects it, then appended. Re-iterating matters: absorbing one
  /// entry can grow the candidate into another entry that was previously
  /// clear of it, and a single merge pass would leave those two stored
  /// rectangles overlapping each other.
  pub fn add(&mut self, rect: Rect) {
    let mut merged = rect;
    loop {
      let Some(index) = self
        .rects
        .iter()
        .position(|r| r.intersects_with_tolerance(&merged))
      else {
        break;
      };
      merged = merged.union(self.rects.remove(index));
    }
    self.rects.push(merged);
  }

  /// The accumulated rectangles
  pub fn rects(&self) -> &[Rect] {
    &self.rects
  }

  /// Number of accumulated rectangles
  pub fn len(&self) -> usize {
    self.rects.len()
  }

  /// Returns true if nothing has been damaged
  pub fn is_empty(&self) -> bool {
    self.rects.is_empty()
  }

  /// Moves the accumulated rectangles out, leaving the list empty
  pub fn take(&mut self) -> Vec<Rect> {
    std::mem::take(&mut self.rects)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn assert_pairwise_disjoint(list: &DamageList) {
    let rects = list.rects();
    for (i, a) in rects.iter().enumerate() {
      for b in &rects[i + 1..] {
        assert!(
          !a.intersects_with_tolerance(b),
          "{} intersects {}",
          a,
          b
        );
      }
    }
  }

  #[test]
  fn add_keeps_disjoint_rects_separate() {
    let mut damage = DamageList::new();
    damage.add(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    damage.add(Rect::from_xywh(50.0, 50.0, 10.0, 10.0));
    assert_eq!(damage.len(), 2);
    assert_pairwise_disjoint(&damage);
  }

  #[test]
  fn add_merges_overlapping_rects() {
    let mut damage = DamageList::new();
    damage.add(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    damage.add(Rect::from_xywh(5.0, 5.0, 10.0, 10.0));
    assert_eq!(damage.rects(), &[Rect::from_xywh(0.0, 0.0, 15.0, 15.0)]);
  }

  #[test]
  fn add_merges_rects_separated_by_less_than_tolerance() {
    let mut damage = DamageList::new();
    damage.add(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    damage.add(Rect::from_xywh(10.00005, 0.0, 10.0, 10.0));
    assert_eq!(damage.len(), 1);
  }

  #[test]
  fn add_merges_chain_of_bridged_rects() {
    let mut damage = DamageList::new();
    // Two rects clear of each other.
    damage.add(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    damage.add(Rect::from_xywh(20.0, 0.0, 10.0, 10.0));
    assert_eq!(damage.len(), 2);

    // A bridge touching both must absorb both, not just the first.
    damage.add(Rect::from_xywh(8.0, 0.0, 14.0, 10.0));
    assert_eq!(damage.rects(), &[Rect::from_ltrb(0.0, 0.0, 30.0, 10.0)]);
    assert_pairwise_disjoint(&damage);
  }

  #[test]
  fn merged_growth_cascades() {
    let mut damage = DamageList::new();
    damage.add(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    damage.add(Rect::from_xywh(12.0, 0.0, 10.0, 10.0));
    damage.add(Rect::from_xywh(24.0, 0.0, 10.0, 10.0));
    assert_eq!(damage.len(), 3);

    // Touches only the middle rect directly, but the union with the middle
    // rect spans into both neighbors.
    damage.add(Rect::from_xywh(9.0, 0.0, 16.0, 10.0));
    assert_eq!(damage.rects(), &[Rect::from_ltrb(0.0, 0.0, 34.0, 10.0)]);
  }

  #[test]
  fn untouched_rects_keep_insertion_order() {
    let mut damage = DamageList::new();
    damage.add(Rect::from_xywh(0.0, 0.0, 5.0, 5.0));
    damage.add(Rect::from_xywh(20.0, 0.0, 5.0, 5.0));
    damage.add(Rect::from_xywh(40.0, 0.0, 5.0, 5.0));
    damage.add(Rect::from_xywh(60.0, 0.0, 5.0, 5.0));
    let before: Vec<Rect> = damage.rects().to_vec();
    // Merge away the second entry only.
    damage.add(Rect::from_xywh(22.0, 0.0, 5.0, 5.0));
    assert_eq!(damage.rects()[0], before[0]);
    assert_eq!(damage.rects()[1], before[2]);
    assert_eq!(damage.rects()[2], before[3]);
  }

  #[test]
  fn take_empties_the_list() {
    let mut damage = DamageList::new();
    damage.add(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    let rects = damage.take();
    assert_eq!(rects.len(), 1);
    assert!(damage.is_empty());
  }
}
