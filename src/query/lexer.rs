//! Query lexer: tokenizes a query string.
//!
//! Whitespace separates tokens and is otherwise dropped. Spans are kept so
//! the parser can tell `title:AND` (one contiguous field condition) from
//! `title:x AND tag:y` (a keyword between two conditions).

use crate::{Error, Result};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Source text; for string literals, the unescaped contents.
    pub text: String,
}

/// Source span (byte offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords (exact case only)
    And, Or, Not,

    // Literals
    Word, StringLiteral,

    // Punctuation
    LParen, RParen, Comma, Colon,

    Eof,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(self, TokenKind::And | TokenKind::Or | TokenKind::Not)
    }
}

/// Characters that end a bare word.
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | ',' | ':')
}

/// Tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            // Skip whitespace
            c if c.is_whitespace() => { chars.next(); }

            // Quoted values: "..." or '...'
            '"' | '\'' => {
                let quote = ch;
                chars.next(); // consume opening quote
                let start = pos;
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => {
                            if let Some((_, escaped)) = chars.next() {
                                match escaped {
                                    'n' => s.push('\n'),
                                    't' => s.push('\t'),
                                    '\\' => s.push('\\'),
                                    c if c == quote => s.push(c),
                                    c => { s.push('\\'); s.push(c); }
                                }
                            }
                        }
                        Some((end, c)) if c == quote => {
                            tokens.push(Token {
                                kind: TokenKind::StringLiteral,
                                span: Span { start, end: end + c.len_utf8() },
                                text: s,
                            });
                            break;
                        }
                        Some((_, c)) => s.push(c),
                        None => return Err(Error::SyntaxError {
                            position: start,
                            message: "Unterminated quoted value".into(),
                        }),
                    }
                }
            }

            '(' => { chars.next(); tokens.push(punct(TokenKind::LParen, pos, "(")); }
            ')' => { chars.next(); tokens.push(punct(TokenKind::RParen, pos, ")")); }
            ',' => { chars.next(); tokens.push(punct(TokenKind::Comma, pos, ",")); }
            ':' => { chars.next(); tokens.push(punct(TokenKind::Colon, pos, ":")); }

            // Bare words: field names, operators, values, keywords
            _ => {
                let start = pos;
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if is_delimiter(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                let kind = keyword_or_word(&word);
                tokens.push(Token {
                    kind,
                    span: Span { start, end: start + word.len() },
                    text: word,
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span { start: input.len(), end: input.len() },
        text: String::new(),
    });

    Ok(tokens)
}

fn punct(kind: TokenKind, pos: usize, text: &str) -> Token {
    Token {
        kind,
        span: Span { start: pos, end: pos + text.len() },
        text: text.to_string(),
    }
}

fn keyword_or_word(s: &str) -> TokenKind {
    match s {
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "NOT" => TokenKind::Not,
        _ => TokenKind::Word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_field_condition() {
        assert_eq!(kinds("type:issue"), vec![
            TokenKind::Word,  // type
            TokenKind::Colon,
            TokenKind::Word,  // issue
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn test_keywords_exact_case() {
        assert_eq!(kinds("a:1 AND b:2"), vec![
            TokenKind::Word, TokenKind::Colon, TokenKind::Word,
            TokenKind::And,
            TokenKind::Word, TokenKind::Colon, TokenKind::Word,
            TokenKind::Eof,
        ]);
        // lower-case is just a word
        assert_eq!(kinds("and")[0], TokenKind::Word);
        assert_eq!(kinds("NOTE")[0], TokenKind::Word);
    }

    #[test]
    fn test_link_call() {
        assert_eq!(kinds("link(validates, req.001)"), vec![
            TokenKind::Word,   // link
            TokenKind::LParen,
            TokenKind::Word,   // validates
            TokenKind::Comma,
            TokenKind::Word,   // req.001
            TokenKind::RParen,
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn test_quoted_value() {
        let tokens = tokenize(r#"title:"Rock AND Roll""#).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[2].text, "Rock AND Roll");
        assert_eq!(tokens[2].span, Span { start: 6, end: 21 });
    }

    #[test]
    fn test_single_quote_escape() {
        let tokens = tokenize(r"title:'it\'s'").unwrap();
        assert_eq!(tokens[2].text, "it's");
    }

    #[test]
    fn test_apostrophe_inside_word() {
        let tokens = tokenize("title:don't").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Word);
        assert_eq!(tokens[2].text, "don't");
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(tokenize(r#"title:"open"#).is_err());
    }

    #[test]
    fn test_spans_are_contiguous() {
        let tokens = tokenize("context.status:eq:approved").unwrap();
        for pair in tokens[..tokens.len() - 1].windows(2) {
            assert_eq!(pair[0].span.end, pair[1].span.start);
        }
        assert_eq!(tokens[0].text, "context.status");
    }
}
