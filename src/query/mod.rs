//! # Query Language
//!
//! Structured queries over entries: field predicates, link predicates,
//! `AND` / `OR` / `NOT` and parentheses. Parsing is a pure function of the
//! query string; evaluation reads entries (and optionally the graph) but
//! never mutates them.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use crate::Result;

pub use ast::{Condition, LinkArgs, LogicalOp, Operator, QueryNode};
pub use eval::Evaluator;

/// Parse a query string into an AST.
pub fn parse(query: &str) -> Result<QueryNode> {
    let tokens = lexer::tokenize(query)?;
    parser::parse_query(&tokens)
}

/// A parsed query: the source text plus the tree it produced.
///
/// The root is owned here and read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    source: String,
    root: QueryNode,
}

impl Query {
    pub fn parse(source: &str) -> Result<Self> {
        let root = parse(source)?;
        Ok(Self { source: source.to_string(), root })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &QueryNode {
        &self.root
    }

    pub fn has_link_condition(&self) -> bool {
        self.root.has_link_condition()
    }
}

impl std::str::FromStr for Query {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Query::parse(s)
    }
}

/// Field names that mark an input as a structured query.
const KNOWN_FIELDS: &[&str] = &["type", "tag", "id", "title"];

/// Cheap pre-check: does `input` look like a structured query rather than
/// free text for a search backend?
///
/// True on `link(`, or on a `:` together with either a logical keyword or a
/// known field name (`type:`, `tag:`, `id:`, `title:`, `context.*:`).
pub fn is_structured_query(input: &str) -> bool {
    if input.contains("link(") {
        return true;
    }
    if !input.contains(':') {
        return false;
    }

    let has_keyword = input
        .split_whitespace()
        .any(|w| matches!(w.trim_start_matches('('), "AND" | "OR" | "NOT"));
    if has_keyword {
        return true;
    }

    input.split_whitespace().any(|word| {
        let word = word.trim_start_matches('(');
        word.split_once(':').is_some_and(|(field, _)| {
            KNOWN_FIELDS.contains(&field)
                || field
                    .strip_prefix(eval::CONTEXT_PREFIX)
                    .is_some_and(|key| !key.is_empty())
        })
    })
}
