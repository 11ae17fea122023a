//! Query recursive descent parser.
//!
//! Parses token streams into a `QueryNode` tree. Grammar, lowest binding
//! first:
//!
//! ```text
//! Expression     := Term (OR Term)*
//! Term           := Factor (AND Factor)*
//! Factor         := NOT Factor | '(' Expression ')' | Condition
//! Condition      := FieldCondition | LinkCondition
//! FieldCondition := field ':' [operator ':'] value
//! LinkCondition  := 'link(' connection_type ',' target_id ')'
//! ```
//!
//! A field condition is one contiguous run of tokens: whitespace ends it.
//! That is what lets keywords appear literally inside values (`title:AND`).

use crate::{Error, Result};
use super::ast::*;
use super::lexer::{Token, TokenKind};

/// Deepest allowed nesting of `NOT` and parentheses.
pub const MAX_NESTING: usize = 256;

/// Parser state: a token slice, a cursor and the current nesting depth.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> &'t Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Token after the current one, if any.
    fn peek_next(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos + 1)
    }

    fn advance(&mut self) -> &'t Token {
        let tok = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, msg: String) -> Error {
        self.error_at(self.peek().span.start, msg)
    }

    fn error_at(&self, position: usize, msg: String) -> Error {
        Error::SyntaxError { position, message: msg }
    }

    /// Step one level into `NOT` or `(`, starting at byte `at`.
    fn enter(&mut self, at: usize) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_at(at, format!("Query nesting too deep (limit {MAX_NESTING})")));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// True if the current token starts exactly at byte `end`.
    fn adjacent(&self, end: usize) -> bool {
        self.peek().span.start == end
    }
}

/// Parse a complete query from tokens.
pub fn parse_query(tokens: &[Token]) -> Result<QueryNode> {
    if tokens.is_empty() {
        return Err(Error::SyntaxError { position: 0, message: "Empty query".into() });
    }
    let mut p = Parser::new(tokens);
    if p.at(TokenKind::Eof) {
        return Err(p.error("Empty query".into()));
    }

    let root = parse_expression(&mut p)?;

    match p.peek_kind() {
        TokenKind::Eof => Ok(root),
        TokenKind::RParen => Err(p.error("Unmatched ')'".into())),
        kind => Err(p.error(format!(
            "Unexpected token after expression: {:?} '{}'",
            kind,
            p.peek().text
        ))),
    }
}

// ============================================================================
// Expressions
// ============================================================================

fn parse_expression(p: &mut Parser) -> Result<QueryNode> {
    let mut left = parse_term(p)?;
    while p.eat(TokenKind::Or) {
        let right = parse_term(p)?;
        left = QueryNode::or(left, right);
    }
    Ok(left)
}

fn parse_term(p: &mut Parser) -> Result<QueryNode> {
    let mut left = parse_factor(p)?;
    while p.eat(TokenKind::And) {
        let right = parse_factor(p)?;
        left = QueryNode::and(left, right);
    }
    Ok(left)
}

fn parse_factor(p: &mut Parser) -> Result<QueryNode> {
    match p.peek_kind() {
        TokenKind::Not => {
            let at = p.advance().span.start;
            p.enter(at)?;
            let child = parse_factor(p)?;
            p.leave();
            Ok(QueryNode::not(child))
        }
        TokenKind::LParen => {
            let open = p.advance().span.start;
            p.enter(open)?;
            let inner = parse_expression(p)?;
            if !p.eat(TokenKind::RParen) {
                return Err(p.error_at(open, "Unmatched '('".into()));
            }
            p.leave();
            Ok(QueryNode::group(inner))
        }
        TokenKind::Word => {
            let tok = p.peek();
            let is_link = tok.text == LINK_FIELD
                && p.peek_next().is_some_and(|next| {
                    next.kind == TokenKind::LParen && next.span.start == tok.span.end
                });
            let cond = if is_link { parse_link(p)? } else { parse_field_condition(p)? };
            Ok(QueryNode::Condition(cond))
        }
        TokenKind::Colon => Err(p.error("Empty field name".into())),
        TokenKind::RParen => Err(p.error("Unmatched ')'".into())),
        TokenKind::Eof => Err(p.error("Unexpected end of query".into())),
        kind => Err(p.error(format!("Expected condition, got {:?} '{}'", kind, p.peek().text))),
    }
}

// ============================================================================
// Conditions
// ============================================================================

fn parse_field_condition(p: &mut Parser) -> Result<Condition> {
    let field = p.advance();
    if !(p.at(TokenKind::Colon) && p.adjacent(field.span.end)) {
        return Err(p.error_at(
            field.span.start,
            format!("Expected ':' after field '{}'", field.text),
        ));
    }
    let colon = p.advance();

    // Optional operator segment: only a known operator directly followed by ':'.
    let mut operator = Operator::Eq;
    let mut end = colon.span.end;
    let candidate = p.peek();
    if candidate.kind == TokenKind::Word && candidate.span.start == end {
        if let Some(op) = Operator::from_token(&candidate.text) {
            let closes = p.peek_next().is_some_and(|next| {
                next.kind == TokenKind::Colon && next.span.start == candidate.span.end
            });
            if closes {
                p.advance();
                end = p.advance().span.end;
                operator = op;
            }
        }
    }

    let value = parse_run(p, Some(end)).unwrap_or_default();
    Ok(Condition::field(field.text.clone(), operator, value))
}

fn parse_link(p: &mut Parser) -> Result<Condition> {
    let link_pos = p.advance().span.start;
    p.advance(); // (

    let unclosed = |p: &Parser<'_>| p.error_at(link_pos, "Unclosed 'link('".into());

    let link_type = parse_run(p, None);
    match p.peek_kind() {
        TokenKind::Comma => { p.advance(); }
        TokenKind::Eof => return Err(unclosed(p)),
        _ => return Err(p.error("Expected ',' between link arguments".into())),
    }

    let link_target = parse_run(p, None);
    match p.peek_kind() {
        TokenKind::RParen => { p.advance(); }
        TokenKind::Comma => return Err(p.error("link() takes exactly two arguments".into())),
        TokenKind::Eof => return Err(unclosed(p)),
        _ => return Err(p.error("Expected ')' after link arguments".into())),
    }

    Ok(Condition::link(link_type, link_target))
}

/// Collect a contiguous run of value tokens into one string.
///
/// With `after` set, the run must start exactly at that byte offset.
/// Returns `None` if no token was consumed.
fn parse_run(p: &mut Parser, mut after: Option<usize>) -> Option<String> {
    let mut text: Option<String> = None;
    loop {
        let tok = p.peek();
        if !is_value_token(tok.kind) || after.is_some_and(|end| tok.span.start != end) {
            break;
        }
        p.advance();
        after = Some(tok.span.end);
        text.get_or_insert_with(String::new).push_str(&tok.text);
    }
    text
}

fn is_value_token(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Word | TokenKind::StringLiteral | TokenKind::Colon) || kind.is_keyword()
}

// ============================================================================
// Tests
// ============================================================================
