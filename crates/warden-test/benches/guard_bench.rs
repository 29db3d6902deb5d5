//! Benchmarks for guard dispatch

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use warden_core::Guards;

fn bench_assert_type_check(c: &mut Criterion) {
    let member = Guards::builtin().assert().member("isString").unwrap();
    let input = json!("warden");

    c.bench_function("assert_is_string", |b| {
        b.iter(|| member.call(black_box(&input), &[]))
    });
}

fn bench_check_with_args(c: &mut Criterion) {
    let member = Guards::builtin().check().member("isApproximately").unwrap();
    let input = json!(10.05);
    let args = [json!(10), json!(0.1)];

    c.bench_function("check_is_approximately", |b| {
        b.iter(|| member.call(black_box(&input), black_box(&args)))
    });
}

fn bench_assert_wrap_failure(c: &mut Criterion) {
    let member = Guards::builtin().assert_wrap().member("hasKey").unwrap();
    let input = json!({"host": "localhost", "tags": ["a", "b", "c"]});
    let args = [json!("port")];

    c.bench_function("assert_wrap_has_key_failure", |b| {
        b.iter(|| {
            let err = member.call(black_box(&input), &args).unwrap_err();
            black_box(err)
        })
    });
}

fn bench_truthy(c: &mut Criterion) {
    let group = Guards::builtin().check_wrap();
    let input = json!([1, 2, 3]);

    c.bench_function("check_wrap_truthy", |b| {
        b.iter(|| group.truthy(black_box(&input)))
    });
}

criterion_group!(
    benches,
    bench_assert_type_check,
    bench_check_with_args,
    bench_assert_wrap_failure,
    bench_truthy
);
criterion_main!(benches);
