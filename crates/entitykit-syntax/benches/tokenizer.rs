use criterion::{Criterion, criterion_group, criterion_main};
use entitykit_syntax::BlockProcessor;

fn generate_post_content(sections: usize) -> String {
    let section = r#"<!-- wp:group {"layout":{"type":"constrained"}} -->
<div class="wp-block-group"><!-- wp:heading {"level":2} -->
<h2 class="wp-block-heading">Section</h2>
<!-- /wp:heading -->

<!-- wp:paragraph -->
<p>Paragraph with some content and a <a href="https://example.com">link</a>.</p>
<!-- /wp:paragraph -->

<!-- wp:separator /--></div>
<!-- /wp:group -->

"#;
    section.repeat(sections)
}

fn bench_tokenizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");
    group.sample_size(10);

    let content = generate_post_content(500);

    group.bench_function("next_token", |b| {
        b.iter(|| {
            let mut processor = BlockProcessor::new(std::hint::black_box(&content));
            let mut tokens = 0usize;
            while processor.next_token() {
                tokens += 1;
            }
            std::hint::black_box(tokens);
        });
    });

    group.bench_function("extract_top_level", |b| {
        b.iter(|| {
            let mut processor = BlockProcessor::new(std::hint::black_box(&content));
            let mut blocks = Vec::new();
            while processor.next_block(None) {
                if processor.depth() == 1 {
                    blocks.extend(processor.extract_full_block_and_advance());
                }
            }
            std::hint::black_box(blocks);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tokenizer);
criterion_main!(benches);
