use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rubrix_core::heuristic::{self, keyword_coverage, TextSignals};
use rubrix_core::model::ScoringInputs;

const QUESTION: &str =
    "Discuss the evolving role of the Finance Commission in Indian fiscal federalism.";

fn make_answer(paragraphs: usize) -> String {
    let paragraph = "In India, the Finance Commission under Article 280 mediates vertical \
                     devolution between the Union and the states. However, the growing share \
                     of cesses and surcharges erodes the divisible pool, as the 15th Finance \
                     Commission report of 2020 noted. Furthermore, centrally sponsored schemes \
                     bypass the formula entirely.";
    vec![paragraph; paragraphs].join("\n\n")
}

fn bench_heuristic_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_score");

    for (label, paragraphs) in [("short", 1), ("medium", 4), ("long", 16)] {
        let answer = make_answer(paragraphs);
        let inputs = ScoringInputs {
            question_text: QUESTION,
            answer_text: &answer,
            reference_context: "",
            concepts: &[],
        };
        group.bench_function(label, |b| b.iter(|| heuristic::score(black_box(&inputs))));
    }

    group.finish();
}

fn bench_text_signals(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_signals");
    let answer = make_answer(8);

    group.bench_function("compute", |b| {
        b.iter(|| TextSignals::compute(black_box(&answer)))
    });

    group.bench_function("keyword_coverage", |b| {
        b.iter(|| keyword_coverage(black_box(QUESTION), black_box(&answer)))
    });

    group.finish();
}

criterion_group!(benches, bench_heuristic_score, bench_text_signals);
criterion_main!(benches);
