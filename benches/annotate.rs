use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gallgloss_rs::{GlossaryEntry, StemIndex, annotate, stem_text};

const TERMS: &[&str] = &[
    "gall",
    "leaf gall",
    "detachable",
    "integral",
    "chamber",
    "larval chamber",
    "petiole",
    "midrib",
    "bud",
    "stem gall",
    "oak apple",
    "sclerenchyma",
];

const DESCRIPTION: &str = "Detachable leaf gall on the midrib, round, with a single larval chamber. \
    Similar to an oak apple but smaller; the petiole and bud are never affected. \
    Walls are thin, without sclerenchyma, and the stem gall form is unknown.";

fn glossary(copies: usize) -> Vec<GlossaryEntry> {
    (0..copies)
        .flat_map(|copy| {
            TERMS.iter().enumerate().map(move |(idx, term)| {
                let word = if copy == 0 {
                    term.to_string()
                } else {
                    format!("{term} {copy}")
                };
                GlossaryEntry::new((copy * TERMS.len() + idx) as i64, word, "")
            })
        })
        .collect()
}

fn bench_index_build(c: &mut Criterion) {
    for &copies in &[1usize, 50, 500] {
        let entries = glossary(copies);
        let stems = stem_text(&entries);
        c.bench_with_input(
            BenchmarkId::new("index_build", entries.len()),
            &stems,
            |b, stems| {
                b.iter(|| black_box(StemIndex::new(stems).len()));
            },
        );
    }
}

fn bench_annotate(c: &mut Criterion) {
    let entries = glossary(50);
    let stems = stem_text(&entries);
    for &repeat in &[1usize, 20] {
        let text = DESCRIPTION.repeat(repeat);
        c.bench_with_input(
            BenchmarkId::new("annotate", text.len()),
            &text,
            |b, text| {
                b.iter(|| black_box(annotate(text, false, &stems).len()));
            },
        );
    }
}

criterion_group!(benches, bench_index_build, bench_annotate);
criterion_main!(benches);
