//! 搜索入口：输入查询文本，输出分组后的结果
//!
//! ```text
//! text ─ Lexer ─▶ tokens ─ Parser ─▶ QuerySyntax ─ Binder ─▶ BoundQuery
//!                                                               │
//!                          CorpusSource::snapshot() ─ Evaluator ┴─▶ CrawledIssueResults
//! ```
//!
//! 每次调用只使用自己的快照和中间结果，因此多个调用可以并发执行。这里不做
//! 防抖或取消，调用者自行丢弃被新搜索取代的结果。

use tracing::{debug, warn};

use crate::ast::{escape_value, QuerySyntax};
use crate::binder::{Binder, BoundQuery};
use crate::config::SearchConfig;
use crate::corpus::{CorpusSnapshot, CorpusSource};
use crate::evaluator::Evaluator;
use crate::lexer::tokenize;
use crate::registry::FilterRegistry;
use crate::results::CrawledIssueResults;
use crate::token::TokenKind;

pub struct IssueSearch<S> {
    registry: FilterRegistry,
    evaluator: Evaluator,
    source: S,
}

impl<S: CorpusSource> IssueSearch<S> {
    /// 标准过滤器和默认排序
    pub fn new(source: S) -> Self {
        Self::with_parts(FilterRegistry::standard(), Evaluator::new(), source)
    }

    pub fn with_parts(registry: FilterRegistry, evaluator: Evaluator, source: S) -> Self {
        Self {
            registry,
            evaluator,
            source,
        }
    }

    /// 按配置构建，指向未知键名的别名会被跳过
    pub fn from_config(config: &SearchConfig, source: S) -> Self {
        let (registry, rejected) = config.filter_registry();
        for alias in rejected {
            warn!(alias = %alias, "忽略指向未注册过滤键的别名");
        }
        Self::with_parts(
            registry,
            Evaluator::with_options(config.evaluation_options()),
            source,
        )
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 只解析和绑定，不求值
    pub fn bind(&self, text: &str) -> BoundQuery {
        Binder::new(&self.registry).bind(&QuerySyntax::parse(text))
    }

    /// 在当前语料快照上执行 `text`
    pub fn search(&self, text: &str) -> CrawledIssueResults {
        let snapshot = self.source.snapshot();
        self.search_snapshot(text, &snapshot)
    }

    /// 在指定的快照上执行 `text`
    pub fn search_snapshot(&self, text: &str, snapshot: &CorpusSnapshot) -> CrawledIssueResults {
        let query = self.bind(text);
        let results = self.evaluator.evaluate(&query, snapshot);

        debug!(
            query = text,
            terms = term_count(&query),
            corpus = snapshot.len(),
            groups = results.group_count(),
            issues = results.issue_count(),
            "搜索完成"
        );
        results
    }
}

fn term_count(query: &BoundQuery) -> usize {
    match query {
        BoundQuery::And(and) => and.terms.len(),
        BoundQuery::FreeText(_) | BoundQuery::KeyValue(_) => 1,
    }
}

/// 向查询文本追加一个 `key:value` 项，已存在等价的项时原样返回
///
/// 用于“跳转到标签”这类操作，值会按需转义。文本末尾未闭合的引号或落单的
/// 反斜杠会先补全，保证追加的项是独立的查询项。
pub fn append_key_value(text: &str, key: &str, value: &str) -> String {
    if QuerySyntax::parse(text).contains_key_value(key, value) {
        return text.to_string();
    }

    let term = format!("{}:{}", key, escape_value(value));
    let text = terminated(text);
    if text.is_empty() {
        term
    } else {
        format!("{} {}", text, term)
    }
}

/// 去掉末尾空白，并补全最后一个单元，使其后可以安全地接上新的查询项
fn terminated(text: &str) -> String {
    let last = tokenize(text).into_iter().rev().find_map(|token| match token.kind {
        TokenKind::FreeText(raw) | TokenKind::Value(raw) => Some((raw, token.span.end)),
        _ => None,
    });
    let Some((raw, end)) = last else {
        return String::new();
    };

    let mut text = text[..end].to_string();
    text.push_str(closing_suffix(raw));
    text
}

/// 最后一个单元需要补上的字符
fn closing_suffix(raw: &str) -> &'static str {
    // 末尾奇数个反斜杠会转义紧随其后的字符
    let dangling_backslash = raw.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1;

    match raw.strip_prefix('"') {
        Some(quoted) if !is_closed_quote(quoted) => {
            if dangling_backslash {
                "\\\""
            } else {
                "\""
            }
        }
        Some(_) => "",
        None if dangling_backslash => "\\",
        None => "",
    }
}

/// 去掉开始引号后的内容是否以未转义的结束引号结尾
fn is_closed_quote(quoted: &str) -> bool {
    match quoted.strip_suffix('"') {
        Some(body) => body.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0,
        None => false,
    }
}
