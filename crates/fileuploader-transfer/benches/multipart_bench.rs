// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for multipart framing in the fileuploader-transfer
// crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use fileuploader_core::types::{FormField, UploadRequest};
use fileuploader_transfer::multipart::{MultipartForm, generate_boundary};

fn request_with_fields(count: usize) -> UploadRequest {
    UploadRequest {
        uri: "file:///tmp/bench.jpg".into(),
        upload_url: "http://127.0.0.1/upload".into(),
        method: "POST".into(),
        content_type: "image/jpeg".into(),
        file_name: "bench.jpg".into(),
        field_name: "file".into(),
        fields: (0..count)
            .map(|i| FormField {
                name: format!("field-{i}"),
                value: format!("value number {i}"),
            })
            .collect(),
    }
}

fn bench_boundary(c: &mut Criterion) {
    c.bench_function("generate_boundary", |b| b.iter(generate_boundary));
}

fn bench_framing(c: &mut Criterion) {
    let small = request_with_fields(2);
    let large = request_with_fields(64);

    c.bench_function("preamble", |b| {
        let form = MultipartForm::for_request(&small);
        b.iter(|| black_box(form.preamble()))
    });

    c.bench_function("epilogue_2_fields", |b| {
        let form = MultipartForm::for_request(&small);
        b.iter(|| black_box(form.epilogue()))
    });

    c.bench_function("epilogue_64_fields", |b| {
        let form = MultipartForm::for_request(&large);
        b.iter(|| black_box(form.epilogue()))
    });

    c.bench_function("content_length_64_fields", |b| {
        let form = MultipartForm::for_request(&large);
        b.iter(|| black_box(form.content_length(black_box(10 * 1024 * 1024))))
    });
}

criterion_group!(benches, bench_boundary, bench_framing);
criterion_main!(benches);
