//! Query AST (Abstract Syntax Tree)
//!
//! These types represent parsed queries. They are pure data with no behavior
//! beyond inspection and display, no entry or graph references. A tree is
//! built once by the parser and never mutated afterwards; every child is
//! exclusively owned by its parent.

use std::fmt;

/// Field name carried by link conditions.
pub const LINK_FIELD: &str = "link";

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    /// Leaf predicate: `field:op:value` or `link(type, target)`
    Condition(Condition),
    /// `left AND right`, `left OR right`
    Logical { left: Box<QueryNode>, op: LogicalOp, right: Box<QueryNode> },
    /// `NOT child`
    Not(Box<QueryNode>),
    /// `( child )`
    Group(Box<QueryNode>),
}

/// Leaf predicate.
///
/// Only `link(type, target)` conditions carry `link`. A field condition whose
/// field happens to be named `link` (`link:x`) is an ordinary unknown field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: String,
    pub link: Option<LinkArgs>,
}

/// Arguments of `link(type, target)`; an omitted argument is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkArgs {
    pub link_type: Option<String>,
    pub target: Option<String>,
}

impl Condition {
    pub fn field(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            link: None,
        }
    }

    pub fn link(link_type: Option<String>, target: Option<String>) -> Self {
        Self {
            field: LINK_FIELD.to_string(),
            operator: Operator::Eq,
            value: String::new(),
            link: Some(LinkArgs { link_type, target }),
        }
    }

    pub fn is_link(&self) -> bool {
        self.link.is_some()
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Operator {
    #[default]
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    NotContains,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
        }
    }

    /// Exact-match lookup of an operator token.
    pub fn from_token(s: &str) -> Option<Self> {
        Some(match s {
            "eq" => Operator::Eq,
            "neq" => Operator::Neq,
            "gt" => Operator::Gt,
            "lt" => Operator::Lt,
            "gte" => Operator::Gte,
            "lte" => Operator::Lte,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            _ => return None,
        })
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte)
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

// ============================================================================
// Construction & inspection
// ============================================================================

impl QueryNode {
    pub fn condition(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        QueryNode::Condition(Condition::field(field, operator, value))
    }

    pub fn and(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::Logical { left: Box::new(left), op: LogicalOp::And, right: Box::new(right) }
    }

    pub fn or(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::Logical { left: Box::new(left), op: LogicalOp::Or, right: Box::new(right) }
    }

    pub fn not(child: QueryNode) -> Self {
        QueryNode::Not(Box::new(child))
    }

    pub fn group(child: QueryNode) -> Self {
        QueryNode::Group(Box::new(child))
    }

    /// Visit every leaf condition, left to right.
    pub fn for_each_condition<'a>(&'a self, f: &mut impl FnMut(&'a Condition)) {
        match self {
            QueryNode::Condition(c) => f(c),
            QueryNode::Logical { left, right, .. } => {
                left.for_each_condition(f);
                right.for_each_condition(f);
            }
            QueryNode::Not(child) | QueryNode::Group(child) => child.for_each_condition(f),
        }
    }

    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.for_each_condition(&mut |c| out.push(c));
        out
    }

    /// True if any leaf is a link condition (the engine then needs a graph).
    pub fn has_link_condition(&self) -> bool {
        self.conditions().iter().any(|c| c.is_link())
    }
}

// ============================================================================
// Display (re-parseable canonical form)
// ============================================================================

/// Logical children are parenthesised wherever the grammar would otherwise
/// regroup them, so parsing the output gives back the same tree modulo
/// `Group` nodes.
impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Condition(c) => write!(f, "{c}"),
            QueryNode::Logical { left, op, right } => {
                // Left-associative: only an OR under an AND needs parentheses on the left.
                let wrap_left = *op == LogicalOp::And && left.logical_op() == Some(LogicalOp::Or);
                // On the right only an AND under an OR binds without them.
                let wrap_right = match right.logical_op() {
                    Some(inner) => !(*op == LogicalOp::Or && inner == LogicalOp::And),
                    None => false,
                };
                write_child(f, left, wrap_left)?;
                write!(f, " {} ", op.as_str())?;
                write_child(f, right, wrap_right)
            }
            QueryNode::Not(child) => {
                write!(f, "NOT ")?;
                write_child(f, child, child.logical_op().is_some())
            }
            QueryNode::Group(child) => write!(f, "({child})"),
        }
    }
}

impl QueryNode {
    fn logical_op(&self) -> Option<LogicalOp> {
        match self {
            QueryNode::Logical { op, .. } => Some(*op),
            _ => None,
        }
    }
}

fn write_child(f: &mut fmt::Formatter<'_>, child: &QueryNode, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({child})")
    } else {
        write!(f, "{child}")
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(args) = &self.link {
            let ty = args.link_type.as_deref().map(quote_if_needed).unwrap_or_default();
            let target = args.target.as_deref().map(quote_if_needed).unwrap_or_default();
            return write!(f, "link({ty}, {target})");
        }
        write!(f, "{}:{}:{}", self.field, self.operator.as_str(), quote_if_needed(&self.value))
    }
}

fn quote_if_needed(s: &str) -> String {
    let bare = !s.is_empty()
        && !matches!(s, "AND" | "OR" | "NOT")
        && !s.chars().any(|c| c.is_whitespace() || matches!(c, '(' | ')' | ',' | '"' | '\'' | '\\'));
    if bare {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tokens() {
        for op in [
            Operator::Eq, Operator::Neq, Operator::Gt, Operator::Lt,
            Operator::Gte, Operator::Lte, Operator::Contains, Operator::NotContains,
        ] {
            assert_eq!(Operator::from_token(op.as_str()), Some(op));
        }
        assert_eq!(Operator::from_token("EQ"), None);
        assert_eq!(Operator::from_token("equals"), None);
    }

    #[test]
    fn test_has_link_condition() {
        let plain = QueryNode::and(
            QueryNode::condition("type", Operator::Eq, "issue"),
            QueryNode::condition("tag", Operator::Eq, "p1"),
        );
        assert!(!plain.has_link_condition());

        let linked = QueryNode::not(QueryNode::group(QueryNode::Condition(Condition::link(
            Some("validates".into()),
            Some("req.001".into()),
        ))));
        assert!(linked.has_link_condition());
    }

    #[test]
    fn test_display() {
        let q = QueryNode::or(
            QueryNode::condition("type", Operator::Eq, "issue"),
            QueryNode::group(QueryNode::and(
                QueryNode::not(QueryNode::condition("tag", Operator::Neq, "p1")),
                QueryNode::condition("title", Operator::Contains, "Rock AND Roll"),
            )),
        );
        assert_eq!(
            q.to_string(),
            r#"type:eq:issue OR (NOT tag:neq:p1 AND title:contains:"Rock AND Roll")"#
        );
    }

    #[test]
    fn test_display_link_with_omitted_half() {
        let c = Condition::link(None, Some("req.001".into()));
        assert_eq!(c.to_string(), "link(, req.001)");
    }

    #[test]
    fn test_field_named_link_is_not_a_link() {
        let c = Condition::field("link", Operator::Neq, "x");
        assert!(!c.is_link());
        assert!(!QueryNode::Condition(c.clone()).has_link_condition());
        assert_eq!(c.to_string(), "link:neq:x");
    }

    #[test]
    fn test_display_parenthesises_logical_children() {
        let a = || QueryNode::condition("tag", Operator::Eq, "p1");
        let b = || QueryNode::condition("type", Operator::Eq, "issue");
        let c = || QueryNode::condition("id", Operator::Eq, "x");

        assert_eq!(QueryNode::not(QueryNode::and(a(), b())).to_string(), "NOT (tag:eq:p1 AND type:eq:issue)");
        assert_eq!(
            QueryNode::and(QueryNode::or(a(), b()), c()).to_string(),
            "(tag:eq:p1 OR type:eq:issue) AND id:eq:x"
        );
        assert_eq!(
            QueryNode::and(a(), QueryNode::and(b(), c())).to_string(),
            "tag:eq:p1 AND (type:eq:issue AND id:eq:x)"
        );
        // already unambiguous
        assert_eq!(
            QueryNode::or(QueryNode::or(a(), b()), QueryNode::and(b(), c())).to_string(),
            "tag:eq:p1 OR type:eq:issue OR type:eq:issue AND id:eq:x"
        );
    }
}
