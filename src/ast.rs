//! 未绑定的语法树，以及值的转义/反转义
//!
//! 语法树只做结构化，不做语义校验。`KeyValueSyntax::raw_value` 保留用户
//! 输入时的转义形式，反转义只在绑定阶段发生，因此语法树可以原样渲染回
//! 查询文本。

use std::fmt;

use crate::lexer::tokenize;
use crate::parser::Parser;

/// 语法树的根节点, 代表一条完整的查询文本
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuerySyntax {
    /// 按输入顺序排列的查询项
    pub nodes: Vec<QueryNodeSyntax>,
}

/// 单个查询项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNodeSyntax {
    FreeText(FreeTextSyntax),
    KeyValue(KeyValueSyntax),
}

/// 自由文本, 例如：`crash` 或 `"null reference"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeTextSyntax {
    /// 原始文本（仍带引号和转义）
    pub text: String,
}

/// 键值过滤项, 例如：`-label:"good first issue"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueSyntax {
    pub is_negated: bool,
    pub key: String,
    /// 原始值（仍带引号和转义）
    pub raw_value: String,
}

impl QuerySyntax {
    /// 分词并构建语法树
    pub fn parse(text: &str) -> Self {
        let tokens = tokenize(text);
        Parser::new(&tokens).parse()
    }

    /// 是否已包含一个等价的非取反键值项（键名不区分大小写，值按反转义后比较）
    pub fn contains_key_value(&self, key: &str, value: &str) -> bool {
        self.nodes.iter().any(|node| match node {
            QueryNodeSyntax::KeyValue(kv) => {
                !kv.is_negated && kv.key.eq_ignore_ascii_case(key) && kv.value() == value
            }
            QueryNodeSyntax::FreeText(_) => false,
        })
    }
}

impl FreeTextSyntax {
    /// 反转义后的文本
    pub fn value(&self) -> String {
        unescape_value(&self.text)
    }
}

impl KeyValueSyntax {
    /// 由未转义的值构造键值项
    pub fn new(is_negated: bool, key: impl Into<String>, value: &str) -> Self {
        Self {
            is_negated,
            key: key.into(),
            raw_value: escape_value(value),
        }
    }

    /// 反转义后的值
    pub fn value(&self) -> String {
        unescape_value(&self.raw_value)
    }
}

impl fmt::Display for QueryNodeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNodeSyntax::FreeText(node) => write!(f, "{}", node.text),
            QueryNodeSyntax::KeyValue(node) => {
                if node.is_negated {
                    write!(f, "-")?;
                }
                write!(f, "{}:{}", node.key, node.raw_value)
            }
        }
    }
}

impl fmt::Display for QuerySyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\' || c == ':')
}

/// 把任意值转义为可以安全写入查询文本的形式
///
/// 不含空白、引号、反斜杠和冒号的非空值原样返回，其余值加上双引号，
/// 并把 `\` 和 `"` 转义。保证 `unescape_value(&escape_value(v)) == v`。
pub fn escape_value(value: &str) -> String {
    if !needs_quotes(value) {
        return value.to_string();
    }

    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('"');
    escaped
}

/// `escape_value` 的逆操作，也用于处理用户直接输入的原始值
///
/// - 带引号：去掉两端引号，解析 `\"` 和 `\\`，其它反斜杠按字面保留
/// - 不带引号：解析 `\"`、`\\` 和反斜杠加空白，其它反斜杠按字面保留
pub fn unescape_value(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());

    if let Some(quoted) = raw.strip_prefix('"') {
        let mut chars = quoted.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.peek() {
                    Some(&next) if next == '"' || next == '\\' => {
                        value.push(next);
                        chars.next();
                    }
                    _ => value.push('\\'),
                },
                '"' => break, // 结束引号
                _ => value.push(c),
            }
        }
    } else {
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            match (c, chars.peek()) {
                ('\\', Some(&next)) if next == '"' || next == '\\' || next.is_whitespace() => {
                    value.push(next);
                    chars.next();
                }
                _ => value.push(c),
            }
        }
    }

    value
}
