//! issue 查询引擎：在爬取的 issue 和 PR 上执行的简洁搜索语言
//!
//! ```text
//! is:open is:issue -label:bug "null reference" author:octocat
//! ```
//!
//! 查询项之间是隐式 AND。`key:value` 项依据 [`FilterRegistry`] 解析，前导
//! `-` 对单个键值项取反，其余单词和带引号的短语在标题和正文中搜索。

pub mod ast;
pub mod binder;
pub mod config;
pub mod corpus;
pub mod evaluator;
pub mod issue;
pub mod lexer;
pub mod parser;
pub mod range;
pub mod registry;
pub mod results;
pub mod search;
pub mod token;

pub use ast::{escape_value, unescape_value, QuerySyntax};
pub use binder::{Binder, BoundQuery};
pub use config::SearchConfig;
pub use corpus::{CorpusSnapshot, CorpusSource, SharedCorpus};
pub use evaluator::{EvaluationOptions, Evaluator};
pub use issue::CrawledIssue;
pub use registry::FilterRegistry;
pub use results::{CrawledIssueResults, RepositoryGroup};
pub use search::{append_key_value, IssueSearch};
