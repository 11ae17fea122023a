//! ContextMap: the open-schema metadata carried by an entry.

use std::collections::BTreeMap;
use super::Value;

/// A map of context keys (`status`, `priority`, `assignee`, ...) to values.
pub type ContextMap = BTreeMap<String, Value>;

/// Build a ContextMap from (key, value) pairs.
pub fn context_from<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> ContextMap
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_pairs() {
        let ctx = context_from([("status", Value::from("open")), ("priority", Value::from(2))]);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx["priority"].as_text(), "2");
        assert_eq!(ctx["status"].as_text(), "open");
    }
}
