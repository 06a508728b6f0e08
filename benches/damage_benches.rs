//! Damage-resolution benchmarks
//!
//! Covers the two hot paths:
//! - Damage-list insertion with merging (the O(n²) loop)
//! - A full begin/ingest/end frame cycle over a synthetic layered scene
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench --bench damage_benches
//! ```

use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use fastdamage::geometry::{Point, Rect, Size};
use fastdamage::DamageList;
use fastdamage::DisplayList;
use fastdamage::DisplayListBuilder;
use fastdamage::RasterDamageResolver;

/// Builds a scene of `layer_count` disjoint 8×8 layers on a 1000×1000 list,
/// all flagged as updated.
fn layered_scene(layer_count: usize) -> DisplayList {
  let mut builder = DisplayListBuilder::new(1000.0, 1000.0);
  builder.layer_context(Point::ZERO, 1.0, 1, false, |b| {
    b.rectangle(Size::new(1000.0, 1000.0));
    for i in 0..layer_count {
      let x = (i % 50) as f32 * 20.0;
      let y = (i / 50) as f32 * 20.0;
      b.layer_context(Point::new(x, y), 1.0, 2 + i as u64, true, |b| {
        b.rectangle(Size::new(8.0, 8.0));
      });
    }
  });
  builder.finish()
}

fn bench_damage_list_add(c: &mut Criterion) {
  let mut group = c.benchmark_group("damage_list_add");

  for &count in &[8usize, 64, 256] {
    // Disjoint inserts: worst case for the scan, no merging.
    group.bench_with_input(BenchmarkId::new("disjoint", count), &count, |b, &count| {
      b.iter(|| {
        let mut list = DamageList::new();
        for i in 0..count {
          let x = (i % 64) as f32 * 20.0;
          let y = (i / 64) as f32 * 20.0;
          list.add(black_box(Rect::from_xywh(x, y, 8.0, 8.0)));
        }
        list.len()
      })
    });

    // Overlapping inserts collapse into a single growing rect.
    group.bench_with_input(BenchmarkId::new("merging", count), &count, |b, &count| {
      b.iter(|| {
        let mut list = DamageList::new();
        for i in 0..count {
          list.add(black_box(Rect::from_xywh(i as f32 * 4.0, 0.0, 10.0, 10.0)));
        }
        list.len()
      })
    });
  }

  group.finish();
}

fn bench_frame_cycle(c: &mut Criterion) {
  let mut group = c.benchmark_group("frame_cycle");

  for &layers in &[10usize, 100, 500] {
    let list = layered_scene(layers);
    group.bench_with_input(BenchmarkId::new("steady_state", layers), &list, |b, list| {
      let mut resolver = RasterDamageResolver::new();
      resolver.begin_updates(1000.0, 1000.0);
      resolver.add_damage_from_display_list_updates(list);
      resolver.end_updates();

      b.iter(|| {
        resolver.begin_updates(1000.0, 1000.0);
        resolver.add_damage_from_display_list_updates(black_box(list));
        resolver.end_updates().len()
      })
    });
  }

  group.finish();
}

criterion_group!(benches, bench_damage_list_add, bench_frame_cycle);
criterion_main!(benches);
