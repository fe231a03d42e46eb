//! Throughput of the guardrail passes
//!
//! Classification and scanning run on every turn, so both should stay well
//! under the generator's latency.

use criterion::{Criterion, criterion_group, criterion_main};
use mathcoach::{MessageClassifier, ResponseScanner, Taxonomy};
use std::hint::black_box;

const STUDENT_MESSAGES: &[&str] = &[
    "What's the final answer?",
    "is 42 correct?",
    "I subtracted 7 from both sides and got 3x = 15, so is 5 correct?",
    "I think we add the pairs first",
    "I give up, this is too hard",
];

fn long_reply() -> String {
    let paragraph = "Good thinking so far. Let's look at how the numbers pair up from both ends. \
                     What do you notice when you add the first and the last number?\n";
    paragraph.repeat(20)
}

fn bench_classify(c: &mut Criterion) {
    let classifier = MessageClassifier::default();
    c.bench_function("classify_student_messages", |b| {
        b.iter(|| {
            for message in STUDENT_MESSAGES {
                black_box(classifier.classify(black_box(message)));
            }
        });
    });
}

fn bench_scan(c: &mut Criterion) {
    let scanner = ResponseScanner::default();
    let reply = long_reply();
    c.bench_function("scan_long_clean_reply", |b| {
        b.iter(|| black_box(scanner.scan(black_box(&reply))));
    });
    c.bench_function("scan_short_leak", |b| {
        b.iter(|| black_box(scanner.scan(black_box("The answer is 17."))));
    });
}

fn bench_taxonomy_build(c: &mut Criterion) {
    c.bench_function("taxonomy_builtin_clone", |b| {
        b.iter(|| black_box(Taxonomy::builtin()));
    });
}

criterion_group!(benches, bench_classify, bench_scan, bench_taxonomy_build);
criterion_main!(benches);
