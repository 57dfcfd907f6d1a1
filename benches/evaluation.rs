use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mvctl::{Checker, Document};

/// Three coupled genes with four levels each — 125 states, cyclic dynamics.
const MODEL: &str = r#"{
    "network": {
        "variables": {"X": 4, "Y": 4, "Z": 4},
        "regulations": [
            {
                "target": "X",
                "regulators": [{"variable": "Z", "thresholds": [2]}],
                "contexts": [
                    {"intervals": [1], "target_value": 4},
                    {"intervals": [2], "target_value": 0}
                ]
            },
            {
                "target": "Y",
                "regulators": [{"variable": "X", "thresholds": [2]}],
                "contexts": [
                    {"intervals": [2], "target_value": 4},
                    {"intervals": [1], "target_value": 0}
                ]
            },
            {
                "target": "Z",
                "regulators": [{"variable": "Y", "thresholds": [2]}],
                "contexts": [
                    {"intervals": [2], "target_value": 4},
                    {"intervals": [1], "target_value": 0}
                ]
            }
        ]
    }
}"#;

fn bench_build(c: &mut Criterion) {
    let doc = Document::from_json(MODEL).unwrap();
    c.bench_function("state_graph_build", |b| {
        b.iter(|| Checker::from_document(black_box(&doc)).unwrap())
    });
}

fn bench_check(c: &mut Criterion) {
    let doc = Document::from_json(MODEL).unwrap();
    let checker = Checker::from_document(&doc).unwrap();
    c.bench_function("until_fixpoint", |b| {
        b.iter(|| {
            checker
                .check(black_box("E (X <= 3) U (Y >= 4)"))
                .unwrap()
        })
    });
    c.bench_function("globally_fixpoint", |b| {
        b.iter(|| checker.check(black_box("AG (Z <= 3)")).unwrap())
    });
}

criterion_group!(benches, bench_build, bench_check);
criterion_main!(benches);
