//! 查询引擎搜索的 issue 记录
//!
//! 记录由爬虫产生，对查询引擎只读。

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// issue 或 PR 的开关状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

/// 从远程仓库爬取的 issue 或 PR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawledIssue {
    /// 完整仓库名，形如 "owner/name"
    pub repository: String,
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub state: IssueState,
    #[serde(default)]
    pub is_pull_request: bool,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub milestone: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub closed_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub merged_at: Option<OffsetDateTime>,
}

/// 过滤器可以引用的单值文本字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Title,
    Body,
    State,
    Author,
    Assignee,
    Milestone,
    Repository,
    /// 仓库名中的 owner 部分
    Owner,
    Url,
}

impl TextField {
    /// 按查询中的名称查找字段，不区分大小写
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name.to_ascii_lowercase().as_str() {
            "title" => TextField::Title,
            "body" => TextField::Body,
            "state" => TextField::State,
            "author" => TextField::Author,
            "assignee" => TextField::Assignee,
            "milestone" => TextField::Milestone,
            "repo" | "repository" => TextField::Repository,
            "org" | "owner" => TextField::Owner,
            "url" => TextField::Url,
            _ => return None,
        };
        Some(field)
    }
}

/// issue 的布尔属性，通过 `is:`、`no:` 这类枚举键选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueFlag {
    Open,
    Closed,
    Issue,
    PullRequest,
    Merged,
    Locked,
    Draft,
    NoLabel,
    NoAssignee,
    NoMilestone,
}

/// 范围过滤器可以引用的数值字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberField {
    Number,
}

/// 日期范围过滤器可以引用的时间字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Created,
    Updated,
    Closed,
}

impl CrawledIssue {
    /// 文本字段的值，issue 没有该字段时返回 `None`
    pub fn text(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Title => Some(&self.title),
            TextField::Body => self.body.as_deref(),
            TextField::State => Some(self.state.as_str()),
            TextField::Author => self.author.as_deref(),
            TextField::Assignee => self.assignee.as_deref(),
            TextField::Milestone => self.milestone.as_deref(),
            TextField::Repository => Some(&self.repository),
            TextField::Owner => self.repository.split_once('/').map(|(owner, _)| owner),
            TextField::Url => self.url.as_deref(),
        }
    }

    pub fn number(&self, field: NumberField) -> Option<i64> {
        match field {
            NumberField::Number => Some(i64::from(self.number)),
        }
    }

    pub fn date(&self, field: DateField) -> Option<OffsetDateTime> {
        match field {
            DateField::Created => Some(self.created_at),
            DateField::Updated => Some(self.updated_at),
            DateField::Closed => self.closed_at,
        }
    }

    pub fn has_flag(&self, flag: IssueFlag) -> bool {
        match flag {
            IssueFlag::Open => self.state == IssueState::Open,
            IssueFlag::Closed => self.state == IssueState::Closed,
            IssueFlag::Issue => !self.is_pull_request,
            IssueFlag::PullRequest => self.is_pull_request,
            IssueFlag::Merged => self.is_pull_request && self.merged_at.is_some(),
            IssueFlag::Locked => self.is_locked,
            IssueFlag::Draft => self.is_pull_request && self.is_draft,
            IssueFlag::NoLabel => self.labels.is_empty(),
            IssueFlag::NoAssignee => self.assignee.is_none(),
            IssueFlag::NoMilestone => self.milestone.is_none(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use time::macros::datetime;

    /// 一个打开的、没有标签的 issue，测试按需修改字段
    pub fn issue(repository: &str, number: u32, title: &str) -> CrawledIssue {
        CrawledIssue {
            repository: repository.to_string(),
            number,
            title: title.to_string(),
            body: None,
            labels: Vec::new(),
            state: IssueState::Open,
            is_pull_request: false,
            is_draft: false,
            is_locked: false,
            author: None,
            assignee: None,
            milestone: None,
            url: None,
            created_at: datetime!(2021-03-01 12:00 UTC),
            updated_at: datetime!(2021-03-05 12:00 UTC),
            closed_at: None,
            merged_at: None,
        }
    }

    pub fn labeled(mut issue: CrawledIssue, labels: &[&str]) -> CrawledIssue {
        issue.labels = labels.iter().map(|l| l.to_string()).collect();
        issue
    }
}
