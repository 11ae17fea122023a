//! Query evaluator.
//!
//! Walks a `QueryNode` against one `Entry` and returns whether it matches.
//! Evaluation is total: unknown fields, missing context keys and entries
//! without connections all resolve to `false`, never to an error.

use std::cmp::Ordering;

use super::ast::{Condition, LinkArgs, LogicalOp, Operator, QueryNode};
use crate::graph::Graph;
use crate::model::{compare_text, Entry, Value};

/// Prefix of open-schema context fields (`context.status`, ...).
pub const CONTEXT_PREFIX: &str = "context.";

/// Evaluates query trees against entries.
///
/// Holds no per-entry state, so one evaluator serves a whole scan.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'g> {
    graph: Option<&'g Graph>,
    numeric_ordering: bool,
}

impl Default for Evaluator<'_> {
    fn default() -> Self {
        Self { graph: None, numeric_ordering: true }
    }
}

impl<'g> Evaluator<'g> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult `graph` for untyped link predicates.
    pub fn with_graph(mut self, graph: &'g Graph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Toggle numeric-aware ordering for `gt`/`lt`/`gte`/`lte`.
    pub fn numeric_ordering(mut self, enabled: bool) -> Self {
        self.numeric_ordering = enabled;
        self
    }

    /// Evaluate `node` against `entry`.
    pub fn matches(&self, node: &QueryNode, entry: &Entry) -> bool {
        match node {
            QueryNode::Condition(cond) => self.condition(cond, entry),
            QueryNode::Logical { left, op, right } => {
                // Both sides are always evaluated; evaluation has no side effects.
                let l = self.matches(left, entry);
                let r = self.matches(right, entry);
                match op {
                    LogicalOp::And => l && r,
                    LogicalOp::Or => l || r,
                }
            }
            QueryNode::Not(child) => !self.matches(child, entry),
            QueryNode::Group(child) => self.matches(child, entry),
        }
    }

    fn condition(&self, cond: &Condition, entry: &Entry) -> bool {
        if let Some(args) = &cond.link {
            return self.link(args, entry);
        }
        let value = cond.value.as_str();
        match cond.field.as_str() {
            "type" => self.exact(entry.entry_type.as_str(), cond.operator, value),
            "id" => self.exact(&entry.id, cond.operator, value),
            "title" => self.substring(&entry.title, cond.operator, value),
            "tag" => entry.tags.iter().any(|tag| self.exact(tag, cond.operator, value)),
            field => match field.strip_prefix(CONTEXT_PREFIX) {
                Some(key) if !key.is_empty() => entry
                    .context_value(key)
                    .is_some_and(|v| self.context(v, cond.operator, value)),
                _ => false,
            },
        }
    }

    /// Link predicate: some connection matching the type label (if given)
    /// and the target id (if given).
    fn link(&self, args: &LinkArgs, entry: &Entry) -> bool {
        let link_type = args.link_type.as_deref();
        let target = args.target.as_deref();

        match (link_type, self.graph) {
            // Graph edges carry no type; only untyped predicates can use them.
            (None, Some(graph)) => match target {
                Some(target) => graph.adjacent(&entry.id).iter().any(|n| n.id == target),
                None => graph.degree(&entry.id) > 0,
            },
            _ => entry.all_connections().any(|(kind, conn)| {
                link_type.is_none_or(|t| kind.as_str() == t)
                    && target.is_none_or(|t| conn.target_id == t)
            }),
        }
    }

    /// Equality-based comparison (`type`, `id`, `tag`).
    fn exact(&self, actual: &str, op: Operator, expected: &str) -> bool {
        match op {
            Operator::Eq => actual == expected,
            Operator::Neq => actual != expected,
            Operator::Contains => actual.contains(expected),
            Operator::NotContains => !actual.contains(expected),
            _ => self.ordered(actual, op, expected),
        }
    }

    /// Substring-based comparison (`title`).
    fn substring(&self, actual: &str, op: Operator, expected: &str) -> bool {
        match op {
            Operator::Eq | Operator::Contains => actual.contains(expected),
            Operator::Neq | Operator::NotContains => !actual.contains(expected),
            _ => self.ordered(actual, op, expected),
        }
    }

    fn context(&self, actual: &Value, op: Operator, expected: &str) -> bool {
        match actual {
            Value::List(items) => items.iter().any(|item| self.context(item, op, expected)),
            other if op.is_ordering() => {
                holds(op, other.compare_to(expected, self.numeric_ordering))
            }
            other => self.exact(&other.as_text(), op, expected),
        }
    }

    fn ordered(&self, actual: &str, op: Operator, expected: &str) -> bool {
        holds(op, compare_text(actual, expected, self.numeric_ordering))
    }
}

/// Whether `ord` (actual against expected) satisfies an ordering operator.
fn holds(op: Operator, ord: Ordering) -> bool {
    match op {
        Operator::Gt => ord.is_gt(),
        Operator::Lt => ord.is_lt(),
        Operator::Gte => ord.is_ge(),
        Operator::Lte => ord.is_le(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectionType, EntryType};
    use crate::query::parse;

    fn eval(query: &str, entry: &Entry) -> bool {
        let node = parse(query).unwrap();
        Evaluator::new().matches(&node, entry)
    }

    fn issue() -> Entry {
        Entry::new("iss.007", EntryType::Issue, "Sensor drift on cold start")
            .with_tags(["p1", "sensor"])
            .with_connection(ConnectionType::Blocks, "feat.002", 70)
            .with_context("status", "open")
            .with_context("priority", 9)
            .with_context("reviewers", vec!["ana", "li"])
    }

    #[test]
    fn test_type_and_id() {
        let e = issue();
        assert!(eval("type:issue", &e));
        assert!(!eval("type:requirement", &e));
        assert!(eval("type:neq:requirement", &e));
        assert!(eval("id:iss.007", &e));
        assert!(!eval("id:iss", &e));
        assert!(eval("id:contains:iss", &e));
    }

    #[test]
    fn test_title_is_substring() {
        let e = issue();
        assert!(eval("title:drift", &e));
        assert!(eval("title:contains:\"cold start\"", &e));
        assert!(!eval("title:neq:drift", &e));
        assert!(eval("title:not_contains:warm", &e));
        // case-sensitive
        assert!(!eval("title:sensor", &e));
    }

    #[test]
    fn test_tag_any_semantics() {
        let e = issue();
        assert!(eval("tag:p1", &e));
        assert!(!eval("tag:p2", &e));
        // some tag differs from p1
        assert!(eval("tag:neq:p1", &e));

        let only_p1 = Entry::new("a", EntryType::Issue, "A").with_tags(["p1"]);
        assert!(!eval("tag:neq:p1", &only_p1));

        let untagged = Entry::new("b", EntryType::Issue, "B");
        assert!(!eval("tag:neq:p1", &untagged));
        assert!(!eval("tag:p1", &untagged));
    }

    #[test]
    fn test_unknown_field_is_false() {
        let e = issue();
        assert!(!eval("priority:1", &e));
        assert!(!eval("owner:neq:nobody", &e));
        assert!(!eval("context.:x", &e));
        // negating a non-match is a match
        assert!(eval("NOT priority:1", &e));
    }

    #[test]
    fn test_context_fields() {
        let e = issue();
        assert!(eval("context.status:open", &e));
        assert!(eval("context.status:neq:closed", &e));
        assert!(eval("context.status:contains:pe", &e));
        assert!(!eval("context.missing:anything", &e));
        assert!(!eval("context.missing:neq:anything", &e));
        // list values: any element
        assert!(eval("context.reviewers:li", &e));
        assert!(!eval("context.reviewers:bo", &e));
    }

    #[test]
    fn test_numeric_ordering() {
        let e = issue();
        assert!(eval("context.priority:lt:10", &e));
        assert!(eval("context.priority:gte:9", &e));
        assert!(!eval("context.priority:gt:9", &e));
    }

    #[test]
    fn test_lexicographic_ordering_when_disabled() {
        let e = issue();
        let node = parse("context.priority:lt:10").unwrap();
        // "9" > "10" byte-wise
        assert!(!Evaluator::new().numeric_ordering(false).matches(&node, &e));
    }

    #[test]
    fn test_ordering_on_float_and_bool_context() {
        let e = Entry::new("m", EntryType::Concept, "M")
            .with_context("score", 2.5)
            .with_context("flaky", true);
        assert!(eval("context.score:gt:2.25", &e));
        assert!(eval("context.score:lte:2.50", &e));
        assert!(!eval("context.score:gte:10", &e));
        // no numeric form: bytes of "true"
        assert!(eval("context.flaky:gt:false", &e));
    }

    #[test]
    fn test_field_named_link_is_unknown() {
        let e = issue();
        assert!(!eval("link:x", &e));
        assert!(!eval("link:neq:x", &e));
        assert!(eval("NOT link:neq:x", &e));
    }

    #[test]
    fn test_ordering_falls_back_to_bytes() {
        let e = issue();
        assert!(eval("context.status:gt:abc", &e));
        assert!(eval("title:lt:T", &e));
    }

    #[test]
    fn test_link_predicates() {
        let ok = Entry::new("t1", EntryType::TestCase, "T1")
            .with_connection(ConnectionType::Validates, "req.001", 90);
        let other = Entry::new("t2", EntryType::TestCase, "T2")
            .with_connection(ConnectionType::Validates, "req.002", 90);

        assert!(eval("link(validates, req.001)", &ok));
        assert!(!eval("link(validates, req.001)", &other));
        assert!(eval("link(validates,)", &other));
        assert!(eval("link(, req.002)", &other));
        assert!(!eval("link(blocks, req.002)", &other));
        assert!(!eval("link(nonsense, req.002)", &other));
    }

    #[test]
    fn test_link_without_connections() {
        let bare = Entry::new("n", EntryType::Concept, "N");
        assert!(!eval("link(,)", &bare));
        assert!(eval("link(,)", &issue()));
    }

    #[test]
    fn test_link_via_graph_agrees() {
        let entries = vec![
            issue(),
            Entry::new("n", EntryType::Concept, "N"),
        ];
        let graph = Graph::from_entries(&entries).unwrap();
        let with = Evaluator::new().with_graph(&graph);
        let without = Evaluator::new();
        for q in ["link(, feat.002)", "link(,)", "link(blocks, feat.002)", "link(, nope)"] {
            let node = parse(q).unwrap();
            for e in &entries {
                assert_eq!(with.matches(&node, e), without.matches(&node, e), "{q} on {}", e.id);
            }
        }
    }

    #[test]
    fn test_group_and_double_negation() {
        let e = issue();
        for q in ["type:issue", "tag:p9", "link(blocks, feat.002)"] {
            let plain = eval(q, &e);
            assert_eq!(eval(&format!("({q})"), &e), plain);
            assert_eq!(eval(&format!("NOT NOT {q}"), &e), plain);
        }
    }

    #[test]
    fn test_logical() {
        let e = issue();
        assert!(eval("type:issue AND tag:p1", &e));
        assert!(!eval("type:issue AND tag:p2", &e));
        assert!(eval("type:bug OR tag:p1", &e));
        assert!(eval("(type:issue OR type:bug) AND context.priority:9", &e));
    }
}
