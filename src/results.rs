//! 按仓库分组的搜索结果

use std::sync::Arc;

use crate::issue::CrawledIssue;

/// 一个仓库中匹配的 issue
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryGroup {
    pub repository_name: String,
    pub issues: Vec<Arc<CrawledIssue>>,
    /// 展开状态，折叠的分组只显示标题行
    pub is_expanded: bool,
}

/// 一次搜索的输出：有序的仓库分组
///
/// 每次搜索都创建新的实例。构造之后只有 [`collapse_all`](Self::collapse_all)
/// 和 [`expand_all`](Self::expand_all) 会修改它。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrawledIssueResults {
    groups: Vec<RepositoryGroup>,
}

/// 显示行：分组标题或其中的一个 issue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultRow<'a> {
    Group(&'a RepositoryGroup),
    Issue(&'a CrawledIssue),
}

/// 一页显示行
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<'a> {
    /// 从 1 开始，限制在 `1..=page_count` 内
    pub page_number: usize,
    pub page_count: usize,
    pub rows: Vec<ResultRow<'a>>,
}

impl CrawledIssueResults {
    /// 没有任何分组的结果
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(groups: Vec<RepositoryGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[RepositoryGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn issue_count(&self) -> usize {
        self.groups.iter().map(|g| g.issues.len()).sum()
    }

    /// 按显示顺序遍历所有 issue，不考虑展开状态
    pub fn issues(&self) -> impl Iterator<Item = &CrawledIssue> {
        self.groups.iter().flat_map(|g| g.issues.iter().map(|i| i.as_ref()))
    }

    pub fn collapse_all(&mut self) {
        self.set_expanded(false);
    }

    pub fn expand_all(&mut self) {
        self.set_expanded(true);
    }

    fn set_expanded(&mut self, is_expanded: bool) {
        for group in &mut self.groups {
            group.is_expanded = is_expanded;
        }
    }

    /// 分组标题，展开的分组后面跟着其 issue
    pub fn rows(&self) -> Vec<ResultRow<'_>> {
        let mut rows = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            rows.push(ResultRow::Group(group));
            if group.is_expanded {
                rows.extend(group.issues.iter().map(|i| ResultRow::Issue(i.as_ref())));
            }
        }
        rows
    }

    /// [`rows`](Self::rows) 的一页（页码从 1 开始），超出范围的页码会被限制
    pub fn page(&self, page_number: usize, page_size: usize) -> ResultPage<'_> {
        let page_size = page_size.max(1);
        let rows = self.rows();
        let page_count = rows.len().div_ceil(page_size).max(1);
        let page_number = page_number.clamp(1, page_count);

        let rows = rows
            .into_iter()
            .skip((page_number - 1) * page_size)
            .take(page_size)
            .collect();

        ResultPage {
            page_number,
            page_count,
            rows,
        }
    }
}
