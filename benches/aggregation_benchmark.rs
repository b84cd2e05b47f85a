use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evadash::parsing::csv_parser::parse_dropout_csv;
use evadash::services::aggregation::aggregate_by_period;

fn synthetic_csv(rows: usize) -> String {
    let mut lines = vec!["curso,semestre,ano,1° C,2° C,3° C,4° C,5° C,6° C".to_string()];
    for i in 0..rows {
        let course = match i % 3 {
            0 => "Medicina",
            1 => "Direito",
            _ => "Letras",
        };
        let term = 1 + (i % 2);
        let year = 2015 + (i % 10);
        lines.push(format!("{course},{term},{year},{},1,0,2,0,1", i % 5));
    }
    lines.join("\n")
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_parsing");

    for size in [100usize, 1_000, 10_000] {
        let content = synthetic_csv(size);
        group.bench_with_input(BenchmarkId::new("parse", size), &content, |b, input| {
            b.iter(|| parse_dropout_csv(black_box(input)));
        });
    }

    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    for size in [100usize, 1_000, 10_000] {
        let dataset = parse_dropout_csv(&synthetic_csv(size));
        group.bench_with_input(
            BenchmarkId::new("aggregate_by_period", size),
            &dataset,
            |b, input| {
                b.iter(|| aggregate_by_period(black_box(&input.records)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_aggregation);
criterion_main!(benches);
