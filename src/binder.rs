//! 绑定器：依据过滤器注册表解析未绑定的语法树
//!
//! 绑定是全函数。未知键名、未知枚举值和无法解析的操作数都绑定为条件永不
//! 匹配的普通节点，输入到一半的查询只会得到更少的结果，而不是报错。

use std::fmt;

use time::Date;
use tracing::trace;

use crate::ast::{escape_value, FreeTextSyntax, KeyValueSyntax, QueryNodeSyntax, QuerySyntax};
use crate::issue::{DateField, IssueFlag, NumberField, TextField};
use crate::range::{parse_date, parse_number, RangeExpr};
use crate::registry::{FilterKind, FilterRegistry, ValueDomain};

/// 语义解析后的查询
#[derive(Debug, Clone, PartialEq)]
pub enum BoundQuery {
    FreeText(BoundFreeTextQuery),
    KeyValue(BoundKeyValueQuery),
    And(BoundAndQuery),
}

/// 标题或正文包含该文本时匹配，不区分大小写
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFreeTextQuery {
    /// 反转义后的小写文本
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundKeyValueQuery {
    pub is_negated: bool,
    /// 已注册时为标准键名，否则为输入的键名
    pub key: String,
    /// 反转义后的原始值
    pub value: String,
    /// 未注册的键为 `None`
    pub domain: Option<ValueDomain>,
    pub condition: Condition,
}

/// 查询项的合取，空合取匹配所有 issue
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundAndQuery {
    pub terms: Vec<BoundQuery>,
}

/// 键值项解析出的类型化条件
///
/// 文本操作数以小写形式保存
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals { field: TextField, value: String },
    Contains { field: TextField, value: String },
    HasLabel(String),
    Flag(IssueFlag),
    Number { field: NumberField, range: RangeExpr<i64> },
    Date { field: DateField, range: RangeExpr<Date> },
    Never,
}

pub struct Binder<'r> {
    registry: &'r FilterRegistry,
}

impl<'r> Binder<'r> {
    pub fn new(registry: &'r FilterRegistry) -> Self {
        Self { registry }
    }

    /// 绑定整条查询，结果总是 `BoundQuery::And`
    pub fn bind(&self, syntax: &QuerySyntax) -> BoundQuery {
        let terms = syntax
            .nodes
            .iter()
            .map(|node| match node {
                QueryNodeSyntax::FreeText(node) => self.bind_free_text(node),
                QueryNodeSyntax::KeyValue(node) => self.bind_key_value(node),
            })
            .collect();

        BoundQuery::And(BoundAndQuery { terms })
    }

    fn bind_free_text(&self, node: &FreeTextSyntax) -> BoundQuery {
        BoundQuery::FreeText(BoundFreeTextQuery {
            text: node.value().to_lowercase(),
        })
    }

    fn bind_key_value(&self, node: &KeyValueSyntax) -> BoundQuery {
        let value = node.value();

        let (key, domain, condition) = match self.registry.get(&node.key) {
            Some(definition) => (
                definition.key.clone(),
                Some(definition.domain()),
                bind_condition(&definition.kind, &value),
            ),
            None => {
                trace!(key = %node.key, "未注册的过滤键，按同名字段匹配");
                let condition = match TextField::from_name(&node.key) {
                    Some(field) => bind_condition(&FilterKind::Contains(field), &value),
                    None => Condition::Never,
                };
                (node.key.clone(), None, condition)
            }
        };

        BoundQuery::KeyValue(BoundKeyValueQuery {
            is_negated: node.is_negated,
            key,
            value,
            domain,
            condition,
        })
    }
}

/// 把过滤器类型和操作数解析为条件
fn bind_condition(kind: &FilterKind, value: &str) -> Condition {
    if value.is_empty() {
        return Condition::Never;
    }

    match kind {
        FilterKind::Equals(field) => Condition::Equals {
            field: *field,
            value: value.to_lowercase(),
        },
        FilterKind::Contains(field) => Condition::Contains {
            field: *field,
            value: value.to_lowercase(),
        },
        FilterKind::Labels => Condition::HasLabel(value.to_lowercase()),
        FilterKind::Flags(flags) => flags
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(value))
            .map_or(Condition::Never, |(_, flag)| Condition::Flag(*flag)),
        FilterKind::Number(field) => RangeExpr::parse(value, parse_number)
            .map_or(Condition::Never, |range| Condition::Number { field: *field, range }),
        FilterKind::Date(field) => RangeExpr::parse(value, parse_date)
            .map_or(Condition::Never, |range| Condition::Date { field: *field, range }),
    }
}

impl fmt::Display for BoundQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundQuery::FreeText(query) => write!(f, "{}", escape_value(&query.text)),
            BoundQuery::KeyValue(query) => {
                if query.is_negated {
                    write!(f, "-")?;
                }
                write!(f, "{}:{}", query.key, escape_value(&query.value))
            }
            BoundQuery::And(query) => {
                for (i, term) in query.terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", term)?;
                }
                Ok(())
            }
        }
    }
}
