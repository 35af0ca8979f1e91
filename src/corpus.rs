//! 语料快照，以及与持有语料的爬虫之间的接口
//!
//! 查询引擎只读取不可变的快照。刷新语料的一方构建新快照并替换进来，
//! 正在进行的搜索继续使用开始时的快照。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::info;

use crate::issue::CrawledIssue;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("语料文件不存在: {0}")]
    NotFound(PathBuf),
    #[error("无法读取语料文件 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("无法解析JSON语料文件 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 有序、不可变的 issue 集合
///
/// 顺序即爬取顺序，分组和组内排序都以它为准
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusSnapshot {
    issues: Vec<Arc<CrawledIssue>>,
}

impl CorpusSnapshot {
    pub fn new(issues: impl IntoIterator<Item = CrawledIssue>) -> Self {
        Self {
            issues: issues.into_iter().map(Arc::new).collect(),
        }
    }

    /// 从 issue 的 JSON 数组加载快照
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CorpusError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let issues: Vec<CrawledIssue> =
            serde_json::from_str(&content).map_err(|source| CorpusError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), count = issues.len(), "已加载语料快照");
        Ok(Self::new(issues))
    }

    pub fn issues(&self) -> &[Arc<CrawledIssue>] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// 为搜索入口提供当前的语料快照
pub trait CorpusSource: Send + Sync {
    fn snapshot(&self) -> Arc<CorpusSnapshot>;
}

/// 固定的快照本身就是数据源
impl CorpusSource for Arc<CorpusSnapshot> {
    fn snapshot(&self) -> Arc<CorpusSnapshot> {
        Arc::clone(self)
    }
}

/// 内存中的数据源，快照可以原子地替换
#[derive(Debug, Default)]
pub struct SharedCorpus {
    current: RwLock<Arc<CorpusSnapshot>>,
}

impl SharedCorpus {
    pub fn new(snapshot: CorpusSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// 换入新快照，已在进行的搜索继续使用旧快照
    pub fn replace(&self, snapshot: CorpusSnapshot) {
        let snapshot = Arc::new(snapshot);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = snapshot;
    }
}

impl CorpusSource for SharedCorpus {
    fn snapshot(&self) -> Arc<CorpusSnapshot> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::fixtures::issue;
    use std::io::Write;

    #[test]
    fn test_shared_corpus_replaces_snapshot() {
        let shared = SharedCorpus::new(CorpusSnapshot::new([issue("a/b", 1, "one")]));
        let before = shared.snapshot();

        shared.replace(CorpusSnapshot::new([
            issue("a/b", 1, "one"),
            issue("a/b", 2, "two"),
        ]));

        assert_eq!(before.len(), 1);
        assert_eq!(shared.snapshot().len(), 2);
    }

    #[test]
    fn test_load_valid_json_corpus() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[
                {{"repository": "dotnet/runtime", "number": 1, "title": "Crash",
                  "state": "open", "created_at": "2021-03-01T12:00:00Z",
                  "updated_at": "2021-03-01T12:00:00Z"}},
                {{"repository": "dotnet/roslyn", "number": 2, "title": "Hang",
                  "state": "closed", "is_pull_request": true,
                  "created_at": "2021-03-01T12:00:00Z",
                  "updated_at": "2021-03-02T12:00:00Z"}}
            ]"#
        )
        .unwrap();

        let snapshot = CorpusSnapshot::from_json_file(file.path()).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.issues()[1].repository, "dotnet/roslyn");
        assert!(snapshot.issues()[1].is_pull_request);
    }

    #[test]
    fn test_invalid_json_corpus() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "invalid json").unwrap();
        assert!(matches!(
            CorpusSnapshot::from_json_file(file.path()),
            Err(CorpusError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_corpus_file() {
        assert!(matches!(
            CorpusSnapshot::from_json_file("non_existent_corpus.json"),
            Err(CorpusError::NotFound(_))
        ));
    }
}
