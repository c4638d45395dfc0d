//! Benchmarks for per-frame work: scene building and placement lookups
//!
//! The whole scene is rebuilt every frame, so this is the hot path.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use tile_editor::theme::Theme;
use tile_editor::{build_scene, Editor, EditorAction, MapDocument, ScreenPos};

/// Editor with `count` objects spread over a square of cells
fn populated_editor(count: usize) -> Editor {
    let mut editor = Editor::default();
    let side = (count as f32).sqrt().ceil() as usize;
    let names: Vec<String> = editor.catalog.names().map(str::to_string).collect();
    for i in 0..count {
        let name = &names[i % names.len()];
        editor
            .map
            .add_object(name, (i % side) as f32 * 2.0, (i / side) as f32 * 2.0);
    }
    editor
}

fn bench_build_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_scene");
    let theme = Theme::dark();

    for count in [0, 100, 1000, 5000] {
        let editor = populated_editor(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &editor, |b, editor| {
            b.iter(|| black_box(build_scene(editor, &theme, None)));
        });
    }

    group.finish();
}

/// Zoomed all the way out, most of the grid and objects are on screen
fn bench_build_scene_zoomed_out(c: &mut Criterion) {
    let theme = Theme::dark();
    let mut editor = populated_editor(5000);
    editor.apply(EditorAction::Zoom(-10));

    c.bench_function("build_scene_zoomed_out", |b| {
        b.iter(|| black_box(build_scene(&editor, &theme, None)));
    });
}

/// Placing into an occupied map scans every object
fn bench_add_object(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_object");

    for count in [100, 1000, 10000] {
        let editor = populated_editor(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &editor.map, |b, map| {
            b.iter_batched(
                || map.clone(),
                |mut map: MapDocument| black_box(map.add_object("wall", -1.0, -1.0)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_place_click(c: &mut Criterion) {
    let mut editor = populated_editor(1000);
    let click = ScreenPos::new(900.0, 500.0);

    c.bench_function("place_then_erase", |b| {
        b.iter(|| {
            editor.apply(EditorAction::Place(black_box(click)));
            editor.apply(EditorAction::Erase(black_box(click)));
        });
    });
}

criterion_group!(
    benches,
    bench_build_scene,
    bench_build_scene_zoomed_out,
    bench_add_object,
    bench_place_click
);
criterion_main!(benches);
