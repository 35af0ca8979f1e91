//! 数值和日期过滤器的范围操作数：`5`、`>5`、`<=5`、`1..10`、`1..*`、`*..10`

use time::macros::format_description;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeExpr<T> {
    Eq(T),
    Gt(T),
    Gte(T),
    Lt(T),
    Lte(T),
    /// 两端都包含
    Between(T, T),
}

impl<T: PartialOrd + Copy> RangeExpr<T> {
    /// 解析范围操作数，每个边界用 `parse_bound` 解析
    ///
    /// 操作数或任一边界无法解析时返回 `None`
    pub fn parse(text: &str, parse_bound: impl Fn(&str) -> Option<T>) -> Option<Self> {
        let text = text.trim();

        if let Some((low, high)) = text.split_once("..") {
            return match (low, high) {
                ("*", "*") => None,
                ("*", high) => parse_bound(high).map(RangeExpr::Lte),
                (low, "*") => parse_bound(low).map(RangeExpr::Gte),
                (low, high) => Some(RangeExpr::Between(parse_bound(low)?, parse_bound(high)?)),
            };
        }

        if let Some(rest) = text.strip_prefix(">=") {
            parse_bound(rest).map(RangeExpr::Gte)
        } else if let Some(rest) = text.strip_prefix("<=") {
            parse_bound(rest).map(RangeExpr::Lte)
        } else if let Some(rest) = text.strip_prefix('>') {
            parse_bound(rest).map(RangeExpr::Gt)
        } else if let Some(rest) = text.strip_prefix('<') {
            parse_bound(rest).map(RangeExpr::Lt)
        } else {
            parse_bound(text).map(RangeExpr::Eq)
        }
    }

    pub fn contains(&self, value: T) -> bool {
        match *self {
            RangeExpr::Eq(v) => value == v,
            RangeExpr::Gt(v) => value > v,
            RangeExpr::Gte(v) => value >= v,
            RangeExpr::Lt(v) => value < v,
            RangeExpr::Lte(v) => value <= v,
            RangeExpr::Between(low, high) => low <= value && value <= high,
        }
    }
}

pub fn parse_number(text: &str) -> Option<i64> {
    text.parse().ok()
}

/// 日期格式为 `YYYY-MM-DD`
pub fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parses_comparisons() {
        assert_eq!(RangeExpr::parse("5", parse_number), Some(RangeExpr::Eq(5)));
        assert_eq!(RangeExpr::parse(">5", parse_number), Some(RangeExpr::Gt(5)));
        assert_eq!(RangeExpr::parse(">=5", parse_number), Some(RangeExpr::Gte(5)));
        assert_eq!(RangeExpr::parse("<5", parse_number), Some(RangeExpr::Lt(5)));
        assert_eq!(RangeExpr::parse("<=5", parse_number), Some(RangeExpr::Lte(5)));
    }

    #[test]
    fn test_parses_intervals() {
        assert_eq!(RangeExpr::parse("1..10", parse_number), Some(RangeExpr::Between(1, 10)));
        assert_eq!(RangeExpr::parse("3..*", parse_number), Some(RangeExpr::Gte(3)));
        assert_eq!(RangeExpr::parse("*..3", parse_number), Some(RangeExpr::Lte(3)));
        assert_eq!(RangeExpr::parse("*..*", parse_number), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(RangeExpr::parse("", parse_number), None);
        assert_eq!(RangeExpr::parse(">", parse_number), None);
        assert_eq!(RangeExpr::parse("ten", parse_number), None);
        assert_eq!(RangeExpr::parse("1..x", parse_number), None);
        assert_eq!(RangeExpr::parse("2021-13-01", parse_date), None);
    }

    #[test]
    fn test_dates() {
        let range = RangeExpr::parse(">=2021-03-01", parse_date).unwrap();
        assert!(range.contains(date!(2021 - 03 - 01)));
        assert!(range.contains(date!(2022 - 01 - 01)));
        assert!(!range.contains(date!(2021 - 02 - 28)));

        let range = RangeExpr::parse("2021-01-01..2021-12-31", parse_date).unwrap();
        assert!(range.contains(date!(2021 - 06 - 15)));
        assert!(!range.contains(date!(2022 - 01 - 01)));
    }

    #[test]
    fn test_contains_is_inclusive_for_intervals() {
        let range = RangeExpr::Between(1, 3);
        assert!(range.contains(1));
        assert!(range.contains(3));
        assert!(!range.contains(4));
    }
}
