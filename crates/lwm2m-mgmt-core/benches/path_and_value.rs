use criterion::{black_box, Criterion};
use lwm2m_mgmt_core::value::{ArrayValue, Value};
use lwm2m_mgmt_core::Path;
use std::env;
use std::time::Duration;

/// Parses and re-renders a resource path, the hot path for every Perform
/// call's per-path bookkeeping.
fn bench_path_round_trip(c: &mut Criterion) {
    c.bench_function("path_round_trip", |b| {
        b.iter(|| {
            let path = Path::parse(black_box("/3/0/15")).unwrap();
            black_box(path.to_string())
        });
    });
}

/// Builds a 16-entry sparse integer array, the shape a multi-instance
/// resource read/write most commonly takes.
fn bench_array_value_build(c: &mut Criterion) {
    c.bench_function("array_value_build", |b| {
        b.iter(|| {
            let mut array: ArrayValue<i64> = ArrayValue::new();
            for i in 0..16u16 {
                array.set_at(i, black_box(i as i64 * 7));
            }
            black_box(array)
        });
    });
}

/// Deep-copies an opaque payload into a [`Value`], the allocation every
/// Write of a binary resource pays.
fn bench_opaque_value_copy(c: &mut Criterion) {
    let payload = vec![0xABu8; 256];
    c.bench_function("opaque_value_copy", |b| {
        b.iter(|| black_box(Value::opaque(black_box(&payload))));
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_path_round_trip(&mut criterion);
    bench_array_value_build(&mut criterion);
    bench_opaque_value_copy(&mut criterion);
    criterion.final_summary();
}
