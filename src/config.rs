//! 配置模块，负责加载JSON配置文件

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::evaluator::{EvaluationOptions, GroupOrder, IssueOrder};
use crate::registry::FilterRegistry;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    NotFound(PathBuf),
    #[error("无法读取配置文件 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("无法解析JSON配置文件 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 搜索配置，所有字段都有默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 没有输入查询时使用的默认查询
    pub default_query: String,
    pub group_order: GroupOrder,
    pub issue_order: IssueOrder,
    /// 分组初始是否展开
    pub expand_groups: bool,
    /// 每页显示的行数
    pub page_size: usize,
    /// 键名别名到标准键名的映射，例如 `"user": "author"`
    pub key_aliases: HashMap<String, String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_query: "is:open is:issue".to_string(),
            group_order: GroupOrder::default(),
            issue_order: IssueOrder::default(),
            expand_groups: true,
            page_size: 25,
            key_aliases: HashMap::new(),
        }
    }
}

impl SearchConfig {
    /// 从JSON文件加载搜索配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }

        // 读取文件内容
        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;

        // 解析JSON
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path_ref.to_path_buf(),
            source,
        })
    }

    /// 结果分组与排序选项
    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            group_order: self.group_order,
            issue_order: self.issue_order,
            expand_groups: self.expand_groups,
        }
    }

    /// 标准过滤器注册表，加上配置中的别名
    ///
    /// 指向未注册键的别名会被忽略，并返回这些别名供调用者记录
    pub fn filter_registry(&self) -> (FilterRegistry, Vec<String>) {
        let mut registry = FilterRegistry::standard();
        let mut rejected = Vec::new();

        // 按别名排序，保证结果与 HashMap 的遍历顺序无关
        let mut aliases: Vec<_> = self.key_aliases.iter().collect();
        aliases.sort();
        for (alias, key) in aliases {
            if !registry.add_alias(alias, key) {
                rejected.push(alias.clone());
            }
        }

        (registry, rejected)
    }
}
