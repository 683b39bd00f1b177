use chessboard_view::board::cache::{CacheKey, Placement, RenderCache};
use chessboard_view::board::geometry::BoardGeometry;
use chessboard_view::board::{
    BoardController, CommandList, RulesEngine, ShakmatyRules, Square, ViewOptions,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn bench_cache_rebuild(c: &mut Criterion) {
    let rules = ShakmatyRules::new();
    let placement: Placement = std::array::from_fn(|index| {
        Square::new(index as u8).and_then(|square| rules.piece_at(square))
    });
    let geometry = BoardGeometry::new(640.0, false);
    let surface = CommandList::new();
    let mut cache: RenderCache<Arc<[chessboard_view::board::DrawOp]>> = RenderCache::new();
    let mut hash = 0u64;

    c.bench_function("rebuild_start_position", |b| {
        b.iter(|| {
            hash += 1;
            cache.invalidate_if_stale(CacheKey {
                board_size: 640.0,
                position_hash: hash,
                flipped: false,
            });
            cache.rebuild(&surface, &geometry, &placement, &[]);
        })
    });
}

fn bench_steady_frame(c: &mut Criterion) {
    let mut rules = ShakmatyRules::new();
    let mut controller: BoardController<CommandList> =
        BoardController::new(ViewOptions::default(), false);
    let mut surface = CommandList::new();

    c.bench_function("steady_frame_cached", |b| {
        b.iter(|| {
            surface.take_frame();
            controller.frame(&mut rules, &mut surface, 640.0, &[])
        })
    });
}

criterion_group!(benches, bench_cache_rebuild, bench_steady_frame);
criterion_main!(benches);
