//! 查询语言的语法分析器
//!
//! ## 解析流程
//!
//! ```text
//! parse()
//!   └─ 循环读取 token，直到 EndOfInput
//!        ├─ Negation → 标记取反，随后必须是 Key
//!        ├─ Key      → 期望 Colon，再读取 Value → KeyValueSyntax
//!        ├─ FreeText → FreeTextSyntax
//!        └─ 其他     → 按原文退化为 FreeTextSyntax
//! ```
//!
//! 语言只有隐式 AND 和逐项取反，没有运算符优先级，也没有分组，因此语法
//! 树就是按输入顺序排列的查询项序列。解析是全函数：不合法的 token 序列
//! 退化为自由文本，而不是返回错误。

use crate::ast::{FreeTextSyntax, KeyValueSyntax, QueryNodeSyntax, QuerySyntax};
use crate::token::{Token, TokenKind};

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&'a Token<'a>> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// 如果当前 token 的类型与给定类型相同则消费它
    fn eat(&mut self, kind: &TokenKind) -> Option<&'a Token<'a>> {
        match self.peek() {
            Some(token)
                if std::mem::discriminant(&token.kind) == std::mem::discriminant(kind) =>
            {
                self.advance()
            }
            _ => None,
        }
    }

    pub fn parse(&mut self) -> QuerySyntax {
        let mut nodes = Vec::new();

        while let Some(token) = self.advance() {
            match &token.kind {
                TokenKind::EndOfInput => break,
                TokenKind::FreeText(text) => {
                    nodes.push(QueryNodeSyntax::FreeText(FreeTextSyntax {
                        text: text.to_string(),
                    }));
                }
                TokenKind::Negation => match self.eat(&TokenKind::Key("")) {
                    Some(Token {
                        kind: TokenKind::Key(key),
                        ..
                    }) => nodes.push(self.parse_key_value(true, key)),
                    _ => nodes.push(free_text("-")),
                },
                TokenKind::Key(key) => nodes.push(self.parse_key_value(false, key)),
                TokenKind::Colon => nodes.push(free_text(":")),
                TokenKind::Value(value) => nodes.push(free_text(value)),
            }
        }

        QuerySyntax { nodes }
    }

    /// 在 Key 之后解析 `: value`，缺失的部分按空值处理
    fn parse_key_value(&mut self, is_negated: bool, key: &str) -> QueryNodeSyntax {
        let mut raw_value = "";
        if self.eat(&TokenKind::Colon).is_some() {
            if let Some(Token {
                kind: TokenKind::Value(value),
                ..
            }) = self.eat(&TokenKind::Value(""))
            {
                raw_value = *value;
            }
        }

        QueryNodeSyntax::KeyValue(KeyValueSyntax {
            is_negated,
            key: key.to_string(),
            raw_value: raw_value.to_string(),
        })
    }
}

fn free_text(text: &str) -> QueryNodeSyntax {
    QueryNodeSyntax::FreeText(FreeTextSyntax {
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::token::Span;

    fn parse_string(input: &str) -> QuerySyntax {
        let tokens: Vec<_> = Lexer::new(input).collect();
        Parser::new(&tokens).parse()
    }

    fn key_value(is_negated: bool, key: &str, raw_value: &str) -> QueryNodeSyntax {
        QueryNodeSyntax::KeyValue(KeyValueSyntax {
            is_negated,
            key: key.to_string(),
            raw_value: raw_value.to_string(),
        })
    }

    #[test]
    fn test_empty_query() {
        assert!(parse_string("").nodes.is_empty());
        assert!(parse_string("  \t ").nodes.is_empty());
    }

    #[test]
    fn test_preserves_term_order() {
        let result = parse_string(r#"is:open crash -label:"good first issue" "null ref""#);
        assert_eq!(
            result.nodes,
            vec![
                key_value(false, "is", "open"),
                free_text("crash"),
                key_value(true, "label", r#""good first issue""#),
                free_text(r#""null ref""#),
            ]
        );
    }

    #[test]
    fn test_raw_value_stays_escaped() {
        let result = parse_string(r#"title:"say \"hi\"""#);
        if let QueryNodeSyntax::KeyValue(kv) = &result.nodes[0] {
            assert_eq!(kv.raw_value, r#""say \"hi\"""#);
            assert_eq!(kv.value(), r#"say "hi""#);
        } else {
            panic!("Expected key value node");
        }
    }

    #[test]
    fn test_incomplete_key_value() {
        let result = parse_string("is:open label:");
        assert_eq!(
            result.nodes,
            vec![key_value(false, "is", "open"), key_value(false, "label", "")]
        );
    }

    #[test]
    fn test_malformed_token_sequence_degrades_to_free_text() {
        let tokens = vec![
            Token { kind: TokenKind::Negation, span: Span::new(0, 1) },
            Token { kind: TokenKind::FreeText("x"), span: Span::new(1, 2) },
            Token { kind: TokenKind::Key("label"), span: Span::new(3, 8) },
            Token { kind: TokenKind::Value("bug"), span: Span::new(8, 11) },
            Token { kind: TokenKind::Colon, span: Span::new(12, 13) },
        ];
        let result = Parser::new(&tokens).parse();
        assert_eq!(
            result.nodes,
            vec![
                free_text("-"),
                free_text("x"),
                key_value(false, "label", ""),
                free_text("bug"),
                free_text(":"),
            ]
        );
    }

    #[test]
    fn test_stops_at_end_of_input() {
        let tokens = vec![
            Token { kind: TokenKind::FreeText("a"), span: Span::new(0, 1) },
            Token { kind: TokenKind::EndOfInput, span: Span::new(1, 1) },
            Token { kind: TokenKind::FreeText("b"), span: Span::new(1, 2) },
        ];
        assert_eq!(Parser::new(&tokens).parse().nodes, vec![free_text("a")]);
    }

    #[test]
    fn test_render_round_trip() {
        let input = r#"is:open is:issue -label:"area: net" crash "two words""#;
        let result = parse_string(input);
        assert_eq!(result.to_string(), input);
        assert_eq!(parse_string(&result.to_string()), result);
    }
}
