//! 过滤器注册表：可识别的 `key:` 过滤器表
//!
//! 注册表在启动时构建一次，之后只读。查找不区分大小写，别名解析到标准定义。

use std::collections::HashMap;

use crate::issue::{DateField, IssueFlag, NumberField, TextField};

/// 过滤器接受的值类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueDomain {
    /// 整值相等，不区分大小写
    Equality,
    /// 子串匹配，不区分大小写
    Substring,
    /// 固定名称集合中的一个
    Enum(Vec<&'static str>),
    NumberRange,
    DateRange,
}

/// 已注册过滤器匹配 issue 的方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    Equals(TextField),
    Contains(TextField),
    /// 任一标签等于该值
    Labels,
    /// 值是某个标志的名称
    Flags(Vec<(&'static str, IssueFlag)>),
    Number(NumberField),
    Date(DateField),
}

impl FilterKind {
    pub fn domain(&self) -> ValueDomain {
        match self {
            FilterKind::Equals(_) | FilterKind::Labels => ValueDomain::Equality,
            FilterKind::Contains(_) => ValueDomain::Substring,
            FilterKind::Flags(flags) => ValueDomain::Enum(flags.iter().map(|(name, _)| *name).collect()),
            FilterKind::Number(_) => ValueDomain::NumberRange,
            FilterKind::Date(_) => ValueDomain::DateRange,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDefinition {
    /// 标准键名，小写
    pub key: String,
    pub kind: FilterKind,
}

impl FilterDefinition {
    pub fn domain(&self) -> ValueDomain {
        self.kind.domain()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    definitions: Vec<FilterDefinition>,
    /// 小写键名或别名到 `definitions` 下标的映射
    index: HashMap<String, usize>,
}

impl FilterRegistry {
    /// 空注册表，所有键都未注册
    pub fn new() -> Self {
        Self::default()
    }

    /// issue 搜索页识别的标准过滤器
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                "is",
                FilterKind::Flags(vec![
                    ("open", IssueFlag::Open),
                    ("closed", IssueFlag::Closed),
                    ("issue", IssueFlag::Issue),
                    ("pr", IssueFlag::PullRequest),
                    ("merged", IssueFlag::Merged),
                    ("locked", IssueFlag::Locked),
                    ("draft", IssueFlag::Draft),
                ]),
            )
            .register(
                "no",
                FilterKind::Flags(vec![
                    ("label", IssueFlag::NoLabel),
                    ("assignee", IssueFlag::NoAssignee),
                    ("milestone", IssueFlag::NoMilestone),
                ]),
            )
            .register("label", FilterKind::Labels)
            .register("author", FilterKind::Equals(TextField::Author))
            .register("assignee", FilterKind::Equals(TextField::Assignee))
            .register("milestone", FilterKind::Equals(TextField::Milestone))
            .register("repo", FilterKind::Equals(TextField::Repository))
            .register("org", FilterKind::Equals(TextField::Owner))
            .register("title", FilterKind::Contains(TextField::Title))
            .register("number", FilterKind::Number(NumberField::Number))
            .register("created", FilterKind::Date(DateField::Created))
            .register("updated", FilterKind::Date(DateField::Updated))
            .register("closed", FilterKind::Date(DateField::Closed));
        registry
    }

    /// 注册过滤器，替换同名的已有过滤器
    pub fn register(&mut self, key: &str, kind: FilterKind) -> &mut Self {
        let key = key.to_ascii_lowercase();
        let definition = FilterDefinition {
            key: key.clone(),
            kind,
        };

        match self.index.get(&key) {
            Some(&idx) if self.definitions[idx].key == key => self.definitions[idx] = definition,
            _ => {
                self.index.insert(key, self.definitions.len());
                self.definitions.push(definition);
            }
        }
        self
    }

    /// 让 `alias` 解析到以 `key` 注册的过滤器
    ///
    /// `key` 未注册时返回 `false`。别名不会遮蔽标准键名。
    pub fn add_alias(&mut self, alias: &str, key: &str) -> bool {
        let alias = alias.to_ascii_lowercase();
        let Some(&idx) = self.index.get(&key.to_ascii_lowercase()) else {
            return false;
        };
        if self.definitions.iter().any(|d| d.key == alias) {
            return false;
        }
        self.index.insert(alias, idx);
        true
    }

    pub fn get(&self, key: &str) -> Option<&FilterDefinition> {
        self.index
            .get(&key.to_ascii_lowercase())
            .map(|&idx| &self.definitions[idx])
    }

    pub fn definitions(&self) -> &[FilterDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let registry = FilterRegistry::standard();
        let def = registry.get("LaBeL").unwrap();
        assert_eq!(def.key, "label");
        assert_eq!(def.domain(), ValueDomain::Equality);
        assert!(registry.get("reactions").is_none());
    }

    #[test]
    fn test_enum_domain_lists_values() {
        let registry = FilterRegistry::standard();
        assert_eq!(
            registry.get("no").unwrap().domain(),
            ValueDomain::Enum(vec!["label", "assignee", "milestone"])
        );
    }

    #[test]
    fn test_register_replaces_existing_key() {
        let mut registry = FilterRegistry::standard();
        let before = registry.len();
        registry.register("Title", FilterKind::Equals(TextField::Title));
        assert_eq!(registry.len(), before);
        assert_eq!(registry.get("title").unwrap().kind, FilterKind::Equals(TextField::Title));
    }

    #[test]
    fn test_aliases_resolve_to_canonical() {
        let mut registry = FilterRegistry::standard();
        assert!(registry.add_alias("Labels", "label"));
        assert_eq!(registry.get("labels").unwrap().key, "label");

        assert!(!registry.add_alias("user", "nonexistent"));
        assert!(registry.get("user").is_none());

        assert!(!registry.add_alias("author", "assignee"));
        assert_eq!(registry.get("author").unwrap().key, "author");
    }

    #[test]
    fn test_empty_registry() {
        let registry = FilterRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("is").is_none());
    }
}
