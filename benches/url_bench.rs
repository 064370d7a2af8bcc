// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use api_client::http::{append_params, build_url, normalize_headers, serialize_params};
use api_client::Params;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

fn url_building_benchmark(c: &mut Criterion) {
    let paths = vec![
        "/users",
        "users/42/posts",
        "https://cdn.example.com/assets/app.js",
        "",
    ];

    c.bench_function("build_url", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(build_url(Some("https://api.example.com/v1/"), path));
            }
        })
    });
}

fn params_benchmark(c: &mut Criterion) {
    let params = Params::new()
        .set("q", "rust http client")
        .set("page", 3)
        .set("tags", vec!["a", "b", "c"])
        .set("missing", None::<String>);

    c.bench_function("serialize_params", |b| {
        b.iter(|| black_box(serialize_params(black_box(&params))))
    });

    c.bench_function("append_params", |b| {
        b.iter(|| {
            black_box(append_params(
                "https://api.example.com/search?lang=en",
                Some(&params),
                None,
            ))
        })
    });
}

fn header_benchmark(c: &mut Criterion) {
    let raw = json!({
        "content-type": "application/json",
        "Accept": "application/json",
        "X-Request-Id": "abc-123",
        "X-Retry": 2,
        "X-Empty": null,
    });

    c.bench_function("normalize_headers", |b| {
        b.iter(|| black_box(normalize_headers(raw.clone())))
    });
}

criterion_group!(benches, url_building_benchmark, params_benchmark, header_benchmark);
criterion_main!(benches);
