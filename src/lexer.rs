//! 查询语言的词法分析器
//!
//! 词法分析是全函数：任何输入都能得到 token 序列，不完整的输入（例如用户
//! 正在输入的 `label:"good fi`）退化为普通 token，而不是报错。

use std::collections::VecDeque;

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
    /// 一个 `key:value` 单元会产生多个 token，先缓存在这里
    pending: VecDeque<Token<'a>>,
    finished: bool,
}

/// 对整段查询文本进行分词，结果以 `EndOfInput` 结尾
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    Lexer::new(text).collect()
}

/// 键名允许的字符（首字符必须是字母或数字）
fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == '.'
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// 向前探测当前单元是否为 `-?key:` 形式，不推进位置
    ///
    /// 返回 (是否取反, 键起始位置, 冒号位置)
    fn scan_key(&self) -> Option<(bool, usize, usize)> {
        let rest = &self.input[self.position..];
        let mut chars = rest.char_indices().peekable();

        let negated = matches!(chars.peek(), Some((_, '-')));
        if negated {
            chars.next();
        }
        let key_start = self.position + usize::from(negated);

        match chars.next() {
            Some((_, c)) if c.is_alphanumeric() => {}
            _ => return None,
        }

        for (offset, c) in chars {
            if c == ':' {
                return Some((negated, key_start, self.position + offset));
            }
            if !is_key_char(c) {
                return None;
            }
        }
        None
    }

    /// 读取双引号包围的文本，包括两端的引号
    /// 未闭合的引号一直读到输入末尾
    fn read_quoted(&mut self) {
        self.bump(); // 消费开始引号
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump(); // 转义字符连同下一个字符一起消费
                }
                '"' => break,
                _ => {}
            }
        }
    }

    /// 读取不带引号的文本，直到遇到未转义的空白
    fn read_unquoted(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            self.bump();
            if c == '\\' {
                self.bump();
            }
        }
    }

    fn read_text(&mut self) {
        if self.peek() == Some('"') {
            self.read_quoted();
        } else {
            self.read_unquoted();
        }
    }

    /// 读取一个 `-?key:value` 单元，把产生的 token 依次放入缓存
    fn read_key_value(&mut self, start: usize, negated: bool, key_start: usize, colon: usize) {
        if negated {
            self.pending.push_back(Token {
                kind: TokenKind::Negation,
                span: Span::new(start, key_start),
            });
        }
        self.pending.push_back(Token {
            kind: TokenKind::Key(&self.input[key_start..colon]),
            span: Span::new(key_start, colon),
        });
        self.pending.push_back(Token {
            kind: TokenKind::Colon,
            span: Span::new(colon, colon + 1),
        });

        self.position = colon + 1;
        let value_start = self.position;
        if self.peek().is_some_and(|c| !c.is_whitespace()) {
            self.read_text();
        }
        self.pending.push_back(Token {
            kind: TokenKind::Value(&self.input[value_start..self.position]),
            span: Span::new(value_start, self.position),
        });
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }
        if self.finished {
            return None;
        }

        self.skip_whitespace();
        let start = self.position;

        if self.peek().is_none() {
            self.finished = true;
            return Some(Token {
                kind: TokenKind::EndOfInput,
                span: Span::new(start, start),
            });
        }

        if let Some((negated, key_start, colon)) = self.scan_key() {
            self.read_key_value(start, negated, key_start, colon);
            return self.pending.pop_front();
        }

        self.read_text();
        Some(Token {
            kind: TokenKind::FreeText(&self.input[start..self.position]),
            span: Span::new(start, self.position),
        })
    }
}
