// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use corvus::core::{self, Color, Move};
use corvus::movegen;
use corvus::search::{self, SearchOptions};
use corvus::Position;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("quiet-move-clonemake", |b| {
        let pos = Position::from_fen("8/8/4b3/8/2B5/8/8/8 w - - 0 1").unwrap();
        let mov = Move::quiet(core::C4, core::D5);
        b.iter(|| {
            let mut pos = black_box(&pos).clone();
            let mov = black_box(mov);
            pos.make_move(mov);
        });
    });

    c.bench_function("pawn-movegen", |b| {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/Pp2P3/2N2Q1p/1PPBBPPP/R3K2R b KQkq a3 0 1",
        )
        .unwrap();
        b.iter(|| {
            let mut moves = Vec::new();
            movegen::generate_pawn_moves(black_box(Color::Black), black_box(&pos), &mut moves);
        });
    });

    c.bench_function("kiwipete-movegen-all", |b| {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/Pp2P3/2N2Q1p/1PPBBPPP/R3K2R b KQkq a3 0 1",
        )
        .unwrap();
        b.iter(|| {
            let mut moves = Vec::new();
            movegen::generate_moves(black_box(Color::Black), black_box(&pos), &mut moves);
        });
    });

    c.bench_function("kiwipete-movegen-quiet", |b| {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/Pp2P3/2N2Q1p/1PPBBPPP/R3K2R b KQkq a3 0 1",
        )
        .unwrap();
        b.iter(|| {
            let mut moves = Vec::new();
            movegen::generate_moves(black_box(Color::Black), black_box(&pos), &mut moves);
            moves.retain(|m| m.is_quiet());
        });
    });

    c.bench_function("shallow-search-depth-4", |b| {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/Pp2P3/2N2Q1p/1PPBBPPP/R3K2R w KQkq a3 0 1",
        )
        .unwrap();
        let options = SearchOptions {
            depth: 4,
            ..SearchOptions::default()
        };
        b.iter(|| search::search(black_box(&pos), black_box(&options)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
