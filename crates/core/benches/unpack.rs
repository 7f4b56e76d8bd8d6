//! Criterion benchmarks for response unpacking and chart layout.
//!
//! Run with:
//!   cargo bench -p blogview
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Map, Value};

use blogview::chart::{ChartConfig, ChartSpec, Transition};
use blogview::response::{parse_response, unpack};

/// `groups` runs with `queries` queries each; every table has `rows` data rows.
fn make_groups(groups: usize, queries: usize, rows: usize, numeric: bool) -> Map<String, Value> {
    let mut out = Map::new();
    for g in 0..groups {
        let mut qs = Map::new();
        for q in 0..queries {
            let mut table = vec![json!(["x", "p"])];
            for r in 0..rows {
                let domain = if numeric { json!(r) } else { json!(format!("v{r}")) };
                table.push(json!([domain, (r as f64) / (rows as f64)]));
            }
            qs.insert(
                format!("q{q}"),
                json!({ "query": format!("P(X{q})"), "distribution": table }),
            );
        }
        out.insert(format!("run{g}"), json!({ "samples": 1000, "queries": qs }));
    }
    out
}

fn bench_unpack(c: &mut Criterion) {
    let mut group = c.benchmark_group("unpack");

    for (groups, queries) in [(1, 8), (4, 32), (16, 64)] {
        let map = make_groups(groups, queries, 20, false);
        group.throughput(Throughput::Elements((groups * queries) as u64));
        group.bench_with_input(
            BenchmarkId::new("groups_x_queries", format!("{groups}x{queries}")),
            &map,
            |b, map| b.iter(|| unpack(black_box(map))),
        );
    }

    group.finish();
}

fn bench_parse_response(c: &mut Criterion) {
    let body = Value::Array(vec![
        Value::Object(make_groups(8, 32, 50, true)),
        json!("log"),
    ])
    .to_string();

    c.bench_function("parse_response_8x32", |b| {
        b.iter(|| parse_response(black_box(&body)))
    });
}

fn bench_frame_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_layout");
    let cfg = ChartConfig::default();

    for (label, numeric) in [("column", false), ("line", true)] {
        let results = unpack(&make_groups(1, 2, 200, numeric)).expect("valid fixture");
        let Some(prev) = results.entry(0) else {
            continue;
        };
        let Some(next) = results.entry(1) else {
            continue;
        };
        let prev = ChartSpec::for_entry(prev, &cfg);
        let tr = Transition::new(Some(&prev), ChartSpec::for_entry(next, &cfg));
        group.bench_function(label, |b| b.iter(|| tr.frame(black_box(0.5))));
    }

    group.finish();
}

criterion_group!(benches, bench_unpack, bench_parse_response, bench_frame_layout);
criterion_main!(benches);
