//! Benchmarks for route-table construction and path matching.
//!
//! Run with: cargo bench -p waypoint-router

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use waypoint_router::{RouteNode, RouteTable};

/// A tree of `sections` top-level prefixes, each with `leaves` literal
/// children. Table size is `sections * (1 + leaves)`.
fn make_routes(sections: usize, leaves: usize) -> Vec<RouteNode> {
    (0..sections)
        .map(|s| {
            let children =
                (0..leaves).map(|l| RouteNode::leaf(format!("/leaf{l}"))).collect();
            RouteNode::prefix(format!("/section{s}"), children)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("table/build");

    for sections in [4, 16, 64] {
        let routes = make_routes(sections, 4);
        group.bench_with_input(BenchmarkId::new("sections", sections), &routes, |b, routes| {
            b.iter(|| black_box(RouteTable::build(routes).unwrap()))
        });
    }

    group.finish();
}

fn bench_match_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("matcher/position");

    for sections in [4, 16, 64] {
        let table = RouteTable::build(&make_routes(sections, 4)).unwrap();
        let first = "/section0/leaf0".to_string();
        let last = format!("/section{}/leaf3", sections - 1);

        group.bench_with_input(BenchmarkId::new("first", sections), &table, |b, table| {
            b.iter(|| black_box(table.match_path(&first)))
        });
        group.bench_with_input(BenchmarkId::new("last", sections), &table, |b, table| {
            b.iter(|| black_box(table.match_path(&last)))
        });
    }

    group.finish();
}

fn bench_match_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("matcher/miss");

    for sections in [4, 16, 64] {
        let table = RouteTable::build(&make_routes(sections, 4)).unwrap();
        group.bench_with_input(BenchmarkId::new("sections", sections), &table, |b, table| {
            b.iter(|| black_box(table.match_path("/absolutely/not/here")))
        });
    }

    group.finish();
}

fn bench_match_captures(c: &mut Criterion) {
    let mut group = c.benchmark_group("matcher/captures");

    let routes = vec![
        RouteNode::prefix(
            "/users",
            vec![RouteNode::leaf("/:id"), RouteNode::leaf("/:id/posts/:post")],
        ),
        RouteNode::leaf("/files/*rest"),
    ];
    let table = RouteTable::build(&routes).unwrap();

    group.bench_function("single_param", |b| {
        b.iter(|| black_box(table.match_path(black_box("/users/12345"))))
    });
    group.bench_function("two_params", |b| {
        b.iter(|| black_box(table.match_path(black_box("/users/12345/posts/67890"))))
    });
    group.bench_function("catch_all", |b| {
        b.iter(|| black_box(table.match_path(black_box("/files/a/b/c/d/e.txt"))))
    });

    group.finish();
}

fn bench_deep_ancestry(c: &mut Criterion) {
    let mut group = c.benchmark_group("matcher/ancestry");

    for depth in [2, 4, 8] {
        let mut node = RouteNode::leaf("/leaf");
        for level in (0..depth).rev() {
            node = RouteNode::prefix(format!("/l{level}"), vec![node]);
        }
        let table = RouteTable::build(&[node]).unwrap();
        let path = (0..depth).map(|level| format!("/l{level}")).collect::<String>() + "/leaf";

        group.bench_with_input(BenchmarkId::new("depth", depth), &table, |b, table| {
            b.iter(|| black_box(table.match_path(&path)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_match_position,
    bench_match_captures,
    bench_match_miss,
    bench_deep_ancestry,
);

criterion_main!(benches);
