use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use edit_kernel::{AnalysisBatch, DocumentSession, HighlightSpan, Scope, SpanIndex};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (edit-kernel benchmark line)\n"
        ));
    }
    // Remove the final '\n' to avoid creating an extra trailing empty line.
    out.pop();
    out
}

/// One keyword span per line, like a real highlighter would emit.
fn highlight_batch(text: &str) -> AnalysisBatch {
    let mut highlights = Vec::new();
    let mut offset = 0;
    for line in text.split('\n') {
        if line.chars().count() >= 6 {
            highlights.push(HighlightSpan::new(offset, offset + 6, Scope::Number));
        }
        offset += line.chars().count() + 1;
    }
    AnalysisBatch {
        highlights,
        ..Default::default()
    }
}

fn bench_large_file_open(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("large_file_open/50k_lines", |b| {
        b.iter(|| {
            let session = DocumentSession::new(black_box(&text));
            black_box(session.line_count());
        })
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("typing_middle/100_inserts", |b| {
        b.iter_batched(
            || DocumentSession::new(&text),
            |mut session| {
                let mut offset = session.buffer().char_count() / 2;
                for _ in 0..100 {
                    session.insert(offset, "x");
                    offset += 1;
                }
                black_box(session.buffer().char_count());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_span_index_build_and_query(c: &mut Criterion) {
    let text = large_text(50_000);
    let batch = highlight_batch(&text);

    c.bench_function("span_index/build_50k_spans", |b| {
        b.iter(|| black_box(SpanIndex::build(batch.highlights.clone())))
    });

    let index = SpanIndex::build(batch.highlights.clone());
    c.bench_function("span_index/query_one_line", |b| {
        b.iter(|| black_box(index.query(1_800_000, 1_800_080)))
    });
}

fn bench_line_segments_viewport(c: &mut Criterion) {
    let text = large_text(50_000);
    let mut session = DocumentSession::new(&text);
    let batch = highlight_batch(&text);

    struct Canned(AnalysisBatch);
    impl edit_kernel::AnalysisWorker for Canned {
        type Error = std::convert::Infallible;
        fn parse(&mut self, _: &str) -> Result<AnalysisBatch, Self::Error> {
            Ok(self.0.clone())
        }
        fn apply_edits(
            &mut self,
            _: &[edit_kernel::EditDescriptor],
        ) -> Result<Option<AnalysisBatch>, Self::Error> {
            Ok(Some(self.0.clone()))
        }
    }
    let mut worker = Canned(batch);
    session.parse_now(&mut worker).unwrap();

    // Type a little so every query goes through ledger remapping.
    session.insert(0, "// touched\n");

    // Pick rows well into the file to avoid warming only the
    // top-of-document paths.
    let start_row = 25_000;
    let count = 60;

    c.bench_function("line_segments/60_lines_remapped", |b| {
        b.iter(|| {
            for row in start_row..start_row + count {
                black_box(session.line_segments(row));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_large_file_open,
    bench_typing_in_middle,
    bench_span_index_build_and_query,
    bench_line_segments_viewport
);
criterion_main!(benches);
