//! Compile benchmarks — init inputs → active service.
//!
//! Measures the one-time cost of schema validation, template parsing and
//! whole-batch compilation, including scaling with the batch size.

use gqtmatch::prelude::*;
use gqtmatch::{SchemaCompiler, TemplateCompiler, TemplateParser};

fn main() {
    divan::main();
}

const SCHEMA: &str = r"
    type Query {
        user(id: ID!): User
        users(first: Int, after: String, role: Role): [User!]!
        search(term: String!, limit: Int): [SearchResult!]!
    }
    type Mutation {
        rename(id: ID!, name: String!): User
    }
    enum Role { ADMIN EDITOR VIEWER }
    interface Node { id: ID! }
    type User implements Node {
        id: ID!
        name: String
        role: Role
        friends(first: Int): [User!]!
        posts(first: Int, published: Boolean): [Post!]!
    }
    type Post implements Node { id: ID! title: String body: String author: User }
    union SearchResult = User | Post
";

const TEMPLATE: &str = r"
    query {
        users(first: > 0 && <= 100, after: *, role: ADMIN || EDITOR) {
            id
            name
            posts(first: <= 10, published: true) { id title author { id } }
        }
    }
";

fn batch(n: usize) -> Vec<TemplateSource> {
    (0..n)
        .map(|i| TemplateSource::new(format!("t{i}"), TEMPLATE))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Single stages
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn schema_validation(bencher: divan::Bencher) {
    bencher.bench_local(|| SchemaCompiler::compile(divan::black_box(SCHEMA)));
}

#[divan::bench]
fn template_schemaless(bencher: divan::Bencher) {
    let parser = TemplateParser::schemaless();
    bencher.bench_local(|| parser.parse(divan::black_box(TEMPLATE)));
}

#[divan::bench]
fn template_schema_checked(bencher: divan::Bencher) {
    let schema = SchemaCompiler::compile(SCHEMA).unwrap().unwrap();
    let parser = TemplateParser::new(Some(&schema)).unwrap();
    bencher.bench_local(|| parser.parse(divan::black_box(TEMPLATE)));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Batches at scale
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 10, 100, 1000])]
fn batch_compile(bencher: divan::Bencher, n: usize) {
    let schema = SchemaCompiler::compile(SCHEMA).unwrap().unwrap();
    let parser = TemplateParser::new(Some(&schema)).unwrap();
    let sources = batch(n);
    bencher.bench_local(|| TemplateCompiler::new(&parser).compile(&sources));
}

#[divan::bench(args = [10, 100])]
fn full_init(bencher: divan::Bencher, n: usize) {
    let sources = batch(n);
    bencher.bench_local(|| {
        let mut state = EngineState::new();
        state.init(SCHEMA, &sources)
    });
}

#[divan::bench]
fn rejected_batch(bencher: divan::Bencher) {
    let mut sources = batch(100);
    sources.push(TemplateSource::new("bad", "query { users(nope: 1) { id } }"));
    let schema = SchemaCompiler::compile(SCHEMA).unwrap().unwrap();
    let parser = TemplateParser::new(Some(&schema)).unwrap();
    bencher.bench_local(|| TemplateCompiler::new(&parser).compile(&sources));
}
