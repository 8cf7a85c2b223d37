//! Criterion benchmarks for game-record parsing.
//!
//! Run with:
//!     cargo bench --bench game_info

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use cyclic_eval::engine::models::Position;
use cyclic_eval::sgf::game_info::{parse_game_str, ParseOptions};

/// A 19x19 record with `n` alternating moves and a closing pair of passes.
fn synthetic_game(n: usize) -> String {
    let mut sgf = String::from(
        "(;FF[4]GM[1]SZ[19]KM[7.5]RU[koPOSITIONALscoreAREAtaxNONEsui1]\
         PB[adv-s545065216-d2]PW[victim-b40c256-s11840935168-v1600]RE[W+12.5]\
         C[startTurnIdx=0,initTurnNum=0,gameHash=ABCDEF,gtype=normal]",
    );
    for i in 0..n {
        let color = if i % 2 == 0 { 'B' } else { 'W' };
        let x = (b'a' + (i % 19) as u8) as char;
        let y = (b'a' + ((i / 19) % 19) as u8) as char;
        sgf.push_str(&format!(";{}[{}{}]C[{}]", color, x, y, i));
    }
    sgf.push_str(";B[];W[])");
    sgf
}

fn bench_parse_game_str(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_game_str");

    for moves in [50usize, 200, 350] {
        let sgf = synthetic_game(moves);
        for fast_parse in [false, true] {
            let opts = ParseOptions {
                fast_parse,
                ..Default::default()
            };
            let id = format!("{}_{}", moves, if fast_parse { "fast" } else { "full" });
            group.bench_with_input(BenchmarkId::new("parse", id), &sgf, |b, sgf| {
                b.iter(|| parse_game_str("bench.sgfs", 1, black_box(sgf), &opts));
            });
        }
    }

    group.finish();
}

fn bench_position_from_sgf(c: &mut Criterion) {
    let mut group = c.benchmark_group("position_from_sgf");

    for moves in [50usize, 350] {
        let sgf = synthetic_game(moves);
        group.bench_with_input(BenchmarkId::new("main_line", moves), &sgf, |b, sgf| {
            b.iter(|| Position::from_sgf("bench", black_box(sgf), None));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_game_str, bench_position_from_sgf);
criterion_main!(benches);
