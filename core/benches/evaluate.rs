//! Evaluate benchmarks — the hot path.
//!
//! Measures: a single operation against a single template, miss-heavy
//! template sets, variable resolution, fragment expansion, and early stop.

use gqtmatch::prelude::*;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test fixtures
// ═══════════════════════════════════════════════════════════════════════════════

const OPERATION: &str = r"
    query Users($first: Int = 20, $role: Role) {
        users(first: $first, role: $role) {
            id
            name
            posts(first: 5, published: true) { id title author { id } }
        }
    }
";

const FRAGMENTED: &str = r"
    query Users {
        users(first: 20, role: ADMIN) { ...UserFields }
    }
    fragment UserFields on User { id name ...Posts }
    fragment Posts on User { posts(first: 5, published: true) { id title author { id } } }
";

const HIT: &str = r"
    query {
        users(first: > 0 && <= 100, role: *) {
            id
            name
            posts(first: <= 10, published: true) { id title author { id } }
        }
    }
";

fn state(templates: &[(&str, &str)]) -> EngineState {
    let sources: Vec<TemplateSource> = templates
        .iter()
        .map(|(id, src)| TemplateSource::new(*id, *src))
        .collect();
    let mut state = EngineState::new();
    state.init("", &sources).unwrap();
    state
}

/// `n` templates that differ from the operation in one leaf field.
fn misses(n: usize) -> Vec<TemplateSource> {
    (0..n)
        .map(|i| {
            TemplateSource::new(
                format!("miss{i}"),
                format!("query {{ users(first: *, role: *) {{ id field{i} }} }}"),
            )
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Core scenario
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn single_hit(bencher: divan::Bencher) {
    let state = state(&[("hit", HIT)]);
    let invoker = MatchInvoker::new(&state);
    bencher.bench_local(|| invoker.collect(MatchRequest::new(divan::black_box(OPERATION))));
}

#[divan::bench]
fn single_hit_with_variables(bencher: divan::Bencher) {
    let state = state(&[("hit", HIT)]);
    let invoker = MatchInvoker::new(&state);
    bencher.bench_local(|| {
        invoker.collect(
            MatchRequest::new(divan::black_box(OPERATION))
                .with_variables(r#"{"first": 50, "role": "ADMIN"}"#),
        )
    });
}

#[divan::bench]
fn fragment_expansion(bencher: divan::Bencher) {
    let state = state(&[("hit", HIT)]);
    let invoker = MatchInvoker::new(&state);
    bencher.bench_local(|| invoker.collect(MatchRequest::new(divan::black_box(FRAGMENTED))));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scaling: hit at the end of n misses
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [10, 100, 1000])]
fn hit_after_misses(bencher: divan::Bencher, n: usize) {
    let mut sources = misses(n);
    sources.push(TemplateSource::new("hit", HIT));
    let mut state = EngineState::new();
    state.init("", &sources).unwrap();
    let invoker = MatchInvoker::new(&state);
    bencher.bench_local(|| invoker.collect(MatchRequest::new(divan::black_box(OPERATION))));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Early stop
// ═══════════════════════════════════════════════════════════════════════════════

struct FirstMatch(Option<String>);

impl MatchObserver for FirstMatch {
    fn on_match(&mut self, template: &Template) -> Flow {
        self.0 = Some(template.id().to_string());
        Flow::Stop
    }

    fn on_error(&mut self, _error: &MatchError) {}
}

#[divan::bench(args = [100, 1000])]
fn first_match_stops(bencher: divan::Bencher, n: usize) {
    let mut sources = vec![TemplateSource::new("hit", HIT)];
    sources.extend(misses(n));
    let mut state = EngineState::new();
    state.init("", &sources).unwrap();
    let invoker = MatchInvoker::new(&state);
    bencher.bench_local(|| {
        let mut observer = FirstMatch(None);
        invoker.run(MatchRequest::new(divan::black_box(OPERATION)), &mut observer);
        observer.0
    });
}
