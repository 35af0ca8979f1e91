//! 求值器：在语料快照上执行绑定后的查询
//!
//! 求值是一次线性扫描：逐个 issue 测试查询，匹配项按仓库分组，最后应用
//! 配置的排序。快照本身不会被修改。

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::binder::{BoundKeyValueQuery, BoundQuery, Condition};
use crate::corpus::CorpusSnapshot;
use crate::issue::{CrawledIssue, TextField};
use crate::results::{CrawledIssueResults, RepositoryGroup};

/// 结果中仓库分组的顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// 仓库在语料中首次出现的顺序
    #[default]
    FirstSeen,
    /// 按仓库名排序，不区分大小写
    Alphabetical,
    /// 匹配数多的在前
    LargestFirst,
}

/// 分组内 issue 的顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueOrder {
    /// 语料顺序
    #[default]
    Corpus,
    UpdatedDescending,
    CreatedDescending,
    NumberDescending,
}

/// 结果分组与排序选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationOptions {
    pub group_order: GroupOrder,
    pub issue_order: IssueOrder,
    /// 每个分组初始的展开状态
    pub expand_groups: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            group_order: GroupOrder::default(),
            issue_order: IssueOrder::default(),
            expand_groups: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: EvaluationOptions,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EvaluationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// 在 `corpus` 上求值 `query`，并把匹配项整理为分组
    pub fn evaluate(&self, query: &BoundQuery, corpus: &CorpusSnapshot) -> CrawledIssueResults {
        let mut groups: Vec<RepositoryGroup> = Vec::new();
        let mut group_index: HashMap<&str, usize> = HashMap::new();

        for issue in corpus.issues() {
            if !matches(query, issue) {
                continue;
            }

            let idx = *group_index.entry(issue.repository.as_str()).or_insert_with(|| {
                groups.push(RepositoryGroup {
                    repository_name: issue.repository.clone(),
                    issues: Vec::new(),
                    is_expanded: self.options.expand_groups,
                });
                groups.len() - 1
            });
            groups[idx].issues.push(Arc::clone(issue));
        }

        self.order_groups(&mut groups);
        CrawledIssueResults::new(groups)
    }

    fn order_groups(&self, groups: &mut [RepositoryGroup]) {
        // 稳定排序：相等时保持语料顺序
        match self.options.group_order {
            GroupOrder::FirstSeen => {}
            GroupOrder::Alphabetical => {
                groups.sort_by_cached_key(|g| g.repository_name.to_lowercase())
            }
            GroupOrder::LargestFirst => {
                groups.sort_by(|a, b| b.issues.len().cmp(&a.issues.len()))
            }
        }

        for group in groups.iter_mut() {
            match self.options.issue_order {
                IssueOrder::Corpus => {}
                IssueOrder::UpdatedDescending => {
                    group.issues.sort_by(|a, b| b.updated_at.cmp(&a.updated_at))
                }
                IssueOrder::CreatedDescending => {
                    group.issues.sort_by(|a, b| b.created_at.cmp(&a.created_at))
                }
                IssueOrder::NumberDescending => group.issues.sort_by(|a, b| b.number.cmp(&a.number)),
            }
        }
    }
}

/// 单个 issue 是否满足查询
pub fn matches(query: &BoundQuery, issue: &CrawledIssue) -> bool {
    match query {
        BoundQuery::And(and) => and.terms.iter().all(|term| matches(term, issue)),
        BoundQuery::FreeText(text) => matches_free_text(&text.text, issue),
        BoundQuery::KeyValue(kv) => matches_key_value(kv, issue),
    }
}

/// `needle` 已是小写
fn matches_free_text(needle: &str, issue: &CrawledIssue) -> bool {
    [TextField::Title, TextField::Body]
        .into_iter()
        .filter_map(|field| issue.text(field))
        .any(|haystack| contains_lowercase(haystack, needle))
}

fn matches_key_value(query: &BoundKeyValueQuery, issue: &CrawledIssue) -> bool {
    // 缺失的字段不满足条件，因此取反形式匹配
    test_condition(&query.condition, issue) != query.is_negated
}

fn test_condition(condition: &Condition, issue: &CrawledIssue) -> bool {
    match condition {
        Condition::Equals { field, value } => issue
            .text(*field)
            .is_some_and(|text| eq_lowercase(text, value)),
        Condition::Contains { field, value } => issue
            .text(*field)
            .is_some_and(|text| contains_lowercase(text, value)),
        Condition::HasLabel(label) => issue.labels.iter().any(|l| eq_lowercase(l, label)),
        Condition::Flag(flag) => issue.has_flag(*flag),
        Condition::Number { field, range } => {
            issue.number(*field).is_some_and(|n| range.contains(n))
        }
        Condition::Date { field, range } => issue
            .date(*field)
            .is_some_and(|ts| range.contains(ts.to_offset(UtcOffset::UTC).date())),
        Condition::Never => false,
    }
}

/// 忽略大小写比较，`lower` 已是小写
///
/// 纯 ASCII 时不分配内存，否则退回到 `to_lowercase`
fn eq_lowercase(text: &str, lower: &str) -> bool {
    if text.is_ascii() && lower.is_ascii() {
        text.eq_ignore_ascii_case(lower)
    } else {
        text.to_lowercase() == lower
    }
}

/// 忽略大小写的子串匹配，`needle` 已是小写
fn contains_lowercase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if haystack.is_ascii() && needle.is_ascii() {
        haystack
            .as_bytes()
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
    } else {
        haystack.to_lowercase().contains(needle)
    }
}
