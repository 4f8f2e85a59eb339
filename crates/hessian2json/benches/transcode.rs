//! Benchmark – `hessian2json::Transcoder`
#![allow(missing_docs, clippy::cast_precision_loss)]

#[path = "../tests/common.rs"]
mod common;

use std::time::Duration;

use common::Encoder;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hessian2json::{Transcoder, TranscoderOptions};

/// A generic result of `rows` records, each a map with a long id, a short
/// name, a decimal price, a timestamp and a back-reference to the first row's
/// tag list.
fn make_payload(rows: usize) -> Vec<u8> {
    let mut out = Encoder::new();
    out.map().string("rows").fixed_list(rows);
    for row in 0..rows {
        let id = i64::try_from(row).expect("row fits i64");
        out.map()
            .string("id")
            .long(1_000_000 + id)
            .string("name")
            .string(&format!("item-{row} \u{e9}t\u{e9}"))
            .string("price");
        if row == 0 {
            out.class_def("java.math.BigDecimal", &["value"])
                .decimal(0, "1234.50")
                .string("created")
                .class_def("java.sql.Timestamp", &["value"])
                .object(1)
                .date(1_700_000_000_000)
                .string("tags")
                .list()
                .string("red")
                .string("blue")
                .end();
        } else {
            out.decimal(0, "99.99")
                .string("created")
                .object(1)
                .date(1_700_000_000_000 + id * 1000)
                .string("tags")
                .reference(5);
        }
        out.string("score").double(0.25 * id as f64).end();
    }
    out.end().finish()
}

fn bench_transcode(c: &mut Criterion) {
    let mut group = c.benchmark_group("transcode_map");
    for &rows in &[10usize, 1_000, 10_000] {
        let payload = make_payload(rows);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        for &buffer_capacity in &[256usize, 8 * 1024] {
            let options = TranscoderOptions {
                buffer_capacity,
                ..TranscoderOptions::default()
            };
            group.bench_with_input(
                BenchmarkId::new(rows.to_string(), buffer_capacity),
                &payload,
                |b, payload| {
                    b.iter(|| {
                        let json = Transcoder::with_options(black_box(&payload[..]), options)
                            .transcode_map()
                            .expect("payload is well formed");
                        black_box(json.len());
                    });
                },
            );
        }
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(10));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_transcode }
criterion_main!(benches);
