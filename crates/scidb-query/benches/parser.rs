//! Parser and graph benchmarks using divan
//!
//! Benchmarks for query parsing, disambiguation and graph building across
//! input sizes.

use scidb_query::{analyze, parse};
use scidb_query::parser::parse_expression;

fn main() {
    divan::main();
}

const EXAMPLE: &str = "store(build(A,iif(A.i0=A.i1,1,0)), A); \
                       store(build(A,iif(A.i0=A.i1,2,1)), B); \
                       multiply(A, B); \
                       remove(A);";

fn pipeline(len: usize) -> String {
    (0..len)
        .map(|i| format!("store(apply(filter(A{}, v > {i}), w, v * 2), A{});", i % 7, (i + 1) % 7))
        .collect()
}

// === Expression Benchmarks ===

mod expressions {
    use super::*;

    #[divan::bench]
    fn integer_literal(bencher: divan::Bencher) {
        bencher.bench_local(|| parse_expression(divan::black_box("42")));
    }

    #[divan::bench]
    fn arithmetic(bencher: divan::Bencher) {
        bencher.bench_local(|| parse_expression(divan::black_box("(a + 2) * -b - c / 4 % 5")));
    }

    #[divan::bench]
    fn nested_calls(bencher: divan::Bencher) {
        bencher.bench_local(|| {
            parse_expression(divan::black_box("iif(sqrt(abs(x)) > pow(y, 2), floor(z), ceil(z))"))
        });
    }
}

// === Query List Benchmarks ===

mod queries {
    use super::*;

    #[divan::bench]
    fn example(bencher: divan::Bencher) {
        bencher.bench_local(|| parse(divan::black_box(EXAMPLE)));
    }

    #[divan::bench]
    fn create_array(bencher: divan::Bencher) {
        bencher.bench_local(|| {
            parse(divan::black_box(
                "CREATE ARRAY M <v:double null, w:int64>[i=0:*,1000,0, j=0:99,10,2]",
            ))
        });
    }

    #[divan::bench(args = [10, 100, 1000])]
    fn long_pipeline(bencher: divan::Bencher, len: usize) {
        let source = pipeline(len);
        bencher.bench_local(|| parse(divan::black_box(&source)));
    }
}

// === Full Analysis Benchmarks ===

mod analysis {
    use super::*;

    #[divan::bench(args = [10, 100, 1000])]
    fn analyze_pipeline(bencher: divan::Bencher, len: usize) {
        let source = pipeline(len);
        bencher.bench_local(|| analyze(divan::black_box(&source)));
    }
}
