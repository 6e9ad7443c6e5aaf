//! Benchmark for context resolution on documents of growing size.
//!
//! Every resolver stops scanning at the queried position, so resolving near
//! the start should stay flat while resolving near the end grows linearly.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tagwise::{MarkupContextOptions, get_css_context, get_html_context, select_item_html};

/// Generate an HTML document with N list items and a trailing style block.
fn generate_document(num_items: usize) -> String {
    let mut doc = String::with_capacity(num_items * 60);
    doc.push_str("<html><body><ul>\n");
    for i in 0..num_items {
        doc.push_str(&format!(
            "  <li class=\"item item_{}\" style=\"color: red\">Item {}</li>\n",
            i, i
        ));
    }
    doc.push_str("</ul>\n<style>\nli { margin: 0 }\n</style>\n</body></html>");
    doc
}

/// Generate a stylesheet with N rules.
fn generate_stylesheet(num_rules: usize) -> String {
    let mut css = String::with_capacity(num_rules * 40);
    for i in 0..num_rules {
        css.push_str(&format!(".rule-{} {{ margin: {}px; color: red }}\n", i, i));
    }
    css
}

fn benchmark_html_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("html_context");
    let options = MarkupContextOptions::default();

    for num_items in [10, 100, 1000] {
        let doc = generate_document(num_items);
        let near_end = doc.find("margin").unwrap_or(doc.len());

        group.bench_with_input(BenchmarkId::new("near_start", num_items), &doc, |b, doc| {
            b.iter(|| get_html_context(black_box(doc), black_box(20), &options))
        });
        group.bench_with_input(BenchmarkId::new("style_block", num_items), &doc, |b, doc| {
            b.iter(|| get_html_context(black_box(doc), black_box(near_end), &options))
        });
    }

    group.finish();
}

fn benchmark_css_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("css_context");

    for num_rules in [10, 100, 1000] {
        let css = generate_stylesheet(num_rules);
        let pos = css.len().saturating_sub(5);
        group.bench_with_input(BenchmarkId::new("near_end", num_rules), &css, |b, css| {
            b.iter(|| get_css_context(black_box(css), black_box(pos)))
        });
    }

    group.finish();
}

fn benchmark_select_item(c: &mut Criterion) {
    let doc = generate_document(100);
    let middle = doc.len() / 2;
    c.bench_function("select_item_html_middle", |b| {
        b.iter(|| select_item_html(black_box(&doc), black_box(middle), false))
    });
}

criterion_group!(
    benches,
    benchmark_html_context,
    benchmark_css_context,
    benchmark_select_item
);
criterion_main!(benches);
