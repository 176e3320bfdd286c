//! Criterion benchmarks for core engine operations.
//!
//! Run with: `cargo bench --package girder_core`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use girder_core::parser::scanner::Scanner;
use girder_core::{parse_string, Interpreter};

const FIB: &str = "function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); } fib(15);";

const OBJECT_CHURN: &str = "\
var sink = 0;
for (var i = 0; i < 200; i++) {
    var o = { a: i, b: i * 2, c: 'x' + i };
    o.d = o.a + o.b;
    sink += o.d;
}
sink;";

const STRING_OPS: &str = "\
var parts = 'the quick brown fox jumps over the lazy dog'.split(' ');
var out = parts.map(function (w) { return w.toUpperCase(); }).join('-');
out.length;";

// ---------------------------------------------------------------------------
// Scanner throughput
// ---------------------------------------------------------------------------

fn bench_tokenize(c: &mut Criterion) {
    // A source with a bit of everything the scanner branches on.
    let source = FIB.repeat(32);
    c.bench_function("scanner_tokenize_fib_x32", |b| {
        b.iter(|| {
            let tokens = Scanner::tokenize_all(black_box(&source)).unwrap();
            black_box(tokens.len());
        });
    });
}

// ---------------------------------------------------------------------------
// Parser throughput
// ---------------------------------------------------------------------------

fn bench_parse(c: &mut Criterion) {
    let source = OBJECT_CHURN.repeat(16);
    c.bench_function("parse_object_churn_x16", |b| {
        b.iter(|| {
            let program = parse_string(black_box(&source), None).unwrap();
            black_box(program.body.len());
        });
    });
}

// ---------------------------------------------------------------------------
// End-to-end evaluation
// ---------------------------------------------------------------------------

fn bench_execute_fib(c: &mut Criterion) {
    let program = parse_string(FIB, None).unwrap();
    c.bench_function("execute_fib_15", |b| {
        // A fresh interpreter per iteration keeps the global scope from
        // accumulating bindings across runs.
        b.iter(|| {
            let mut interp = Interpreter::new();
            black_box(interp.execute_program(black_box(&program)));
        });
    });
}

fn bench_execute_object_churn(c: &mut Criterion) {
    let program = parse_string(OBJECT_CHURN, None).unwrap();
    c.bench_function("execute_object_churn", |b| {
        b.iter(|| {
            let mut interp = Interpreter::new();
            black_box(interp.execute_program(black_box(&program)));
        });
    });
}

fn bench_execute_string_ops(c: &mut Criterion) {
    let program = parse_string(STRING_OPS, None).unwrap();
    c.bench_function("execute_string_ops", |b| {
        b.iter(|| {
            let mut interp = Interpreter::new();
            black_box(interp.execute_program(black_box(&program)));
        });
    });
}

fn bench_interpreter_startup(c: &mut Criterion) {
    c.bench_function("interpreter_bootstrap", |b| {
        b.iter(|| {
            black_box(Interpreter::new());
        });
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse,
    bench_execute_fib,
    bench_execute_object_churn,
    bench_execute_string_ops,
    bench_interpreter_startup,
);
criterion_main!(benches);
