use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use issue_query::ast::QuerySyntax;
use issue_query::binder::Binder;
use issue_query::corpus::CorpusSnapshot;
use issue_query::evaluator::Evaluator;
use issue_query::issue::{CrawledIssue, IssueState};
use issue_query::lexer::Lexer;
use issue_query::parser::Parser;
use issue_query::registry::FilterRegistry;
use issue_query::search::IssueSearch;
use time::macros::datetime;
use time::Duration;

const QUERIES: [(&str, &str); 3] = [
    ("simple", "is:open is:issue"),
    ("medium", r#"is:open -label:bug label:"good first issue" crash"#),
    (
        "complex",
        r#"is:open is:issue -label:"area-System.Net" author:octocat created:2021-01-01..2021-12-31 number:>100 "null reference" title:startup"#,
    ),
];

// 构造一个合成语料：多个仓库交错出现，标签和状态轮换
fn create_corpus(size: u32) -> CorpusSnapshot {
    let repos = ["dotnet/runtime", "dotnet/roslyn", "dotnet/aspnetcore", "dotnet/docs"];
    let labels = ["bug", "good first issue", "area-System.Net", "docs", "perf"];
    let start = datetime!(2021-01-01 00:00 UTC);

    CorpusSnapshot::new((0..size).map(|n| {
        let i = n as usize;
        CrawledIssue {
            repository: repos[i % repos.len()].to_string(),
            number: n + 1,
            title: format!("Issue {} crash on startup", n),
            body: Some(format!("Body of issue {} with a null reference somewhere", n)),
            labels: vec![labels[i % labels.len()].to_string()],
            state: if n % 3 == 0 { IssueState::Closed } else { IssueState::Open },
            is_pull_request: n % 5 == 0,
            is_draft: false,
            is_locked: false,
            author: Some(if n % 2 == 0 { "octocat" } else { "hubot" }.to_string()),
            assignee: None,
            milestone: None,
            url: None,
            created_at: start + Duration::hours(i64::from(n)),
            updated_at: start + Duration::hours(i64::from(n) * 2),
            closed_at: None,
            merged_at: None,
        }
    }))
}

// 基准测试：词法分析性能
fn benchmark_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_performance");

    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::new("tokenize", name), &query, |b, &query| {
            b.iter(|| {
                let tokens: Vec<_> = Lexer::new(black_box(query)).collect();
                black_box(tokens)
            })
        });
    }

    group.finish();
}

// 基准测试：语法分析性能
fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_performance");

    for (name, query) in QUERIES {
        // 预先词法分析
        let tokens: Vec<_> = Lexer::new(query).collect();

        group.bench_with_input(BenchmarkId::new("parse", name), &tokens, |b, tokens| {
            b.iter(|| black_box(Parser::new(black_box(tokens)).parse()))
        });
    }

    group.finish();
}

// 基准测试：绑定性能
fn benchmark_binder(c: &mut Criterion) {
    let registry = FilterRegistry::standard();
    let mut group = c.benchmark_group("binder_performance");

    for (name, query) in QUERIES {
        let syntax = QuerySyntax::parse(query);

        group.bench_with_input(BenchmarkId::new("bind", name), &syntax, |b, syntax| {
            b.iter(|| black_box(Binder::new(&registry).bind(black_box(syntax))))
        });
    }

    group.finish();
}

// 基准测试：不同语料规模下的求值性能
fn benchmark_evaluator(c: &mut Criterion) {
    let registry = FilterRegistry::standard();
    let evaluator = Evaluator::new();
    let query = Binder::new(&registry).bind(&QuerySyntax::parse(QUERIES[1].1));

    let mut group = c.benchmark_group("evaluator_performance");

    for size in [1_000u32, 10_000, 50_000] {
        let corpus = create_corpus(size);
        group.bench_with_input(BenchmarkId::new("evaluate", size), &corpus, |b, corpus| {
            b.iter(|| black_box(evaluator.evaluate(black_box(&query), corpus)))
        });
    }

    group.finish();
}

// 基准测试：完整的端到端处理（每次按键都会执行一次）
fn benchmark_end_to_end(c: &mut Criterion) {
    let search = IssueSearch::new(Arc::new(create_corpus(10_000)));
    let mut group = c.benchmark_group("end_to_end_performance");

    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::new("search", name), &query, |b, &query| {
            b.iter(|| black_box(search.search(black_box(query))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_lexer,
    benchmark_parser,
    benchmark_binder,
    benchmark_evaluator,
    benchmark_end_to_end
);
criterion_main!(benches);
