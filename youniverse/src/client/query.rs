//! PostgREST query parameters.

use std::fmt::Display;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    fn suffix(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// Row selection, filters, ordering and paging for one table request.
///
/// Parameters are kept in insertion order so the generated query string is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns and embedded resources to return.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// `column = value`.
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("eq.{value}"))
    }

    /// `column IS value` for `null`, `true` or `false`.
    pub fn is(self, column: &str, value: &str) -> Self {
        self.filter(column, format!("is.{value}"))
    }

    /// `column IN (values)`.
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let joined = values
            .into_iter()
            .map(|v| quote(&v.to_string()))
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, format!("in.({joined})"))
    }

    /// Case-insensitive `LIKE`; `*` is the wildcard.
    pub fn ilike(self, column: &str, pattern: impl Display) -> Self {
        self.filter(column, format!("ilike.{pattern}"))
    }

    /// Disjunction of raw PostgREST conditions, e.g. `sender_id.eq.x`.
    pub fn or<I, S>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined = conditions
            .into_iter()
            .map(Into::into)
            .collect::<Vec<String>>()
            .join(",");
        self.filter("or", format!("({joined})"))
    }

    /// Raw filter parameter.
    pub fn filter(mut self, column: &str, expr: impl Into<String>) -> Self {
        self.filters.push((column.to_owned(), expr.into()));
        self
    }

    /// Sort by a column. May be called repeatedly for secondary keys.
    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order.push(format!("{column}.{}", order.suffix()));
        self
    }

    /// Maximum rows to return.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Rows to skip.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// One-based page of `per_page` rows.
    pub fn page(self, page: u32, per_page: u32) -> Self {
        let page = page.max(1);
        self.limit(per_page).offset((page - 1) * per_page)
    }

    /// Check whether any row filter is set.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Flatten into query-string pairs.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 4);
        if let Some(ref select) = self.select {
            pairs.push(("select".to_owned(), select.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_owned(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_owned(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_owned(), offset.to_string()));
        }
        pairs
    }
}

/// Quote list values containing reserved characters.
fn quote(value: &str) -> String {
    if value.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(q: &Query) -> Vec<(String, String)> {
        q.to_pairs()
    }

    fn owned(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_query_pairs() {
        let q = Query::new()
            .select("*,author:profiles!posts_author_id_fkey(*)")
            .eq("author_id", "u1")
            .is("parent_comment_id", "null")
            .order("created_at", Order::Desc)
            .page(2, 20);

        assert_eq!(
            pairs(&q),
            owned(&[
                ("select", "*,author:profiles!posts_author_id_fkey(*)"),
                ("author_id", "eq.u1"),
                ("parent_comment_id", "is.null"),
                ("order", "created_at.desc"),
                ("limit", "20"),
                ("offset", "20"),
            ])
        );
    }

    #[test]
    fn test_in_list_quotes_reserved() {
        let q = Query::new().in_list("country", ["India", "New Zealand", "a,b"]);
        assert_eq!(
            pairs(&q),
            owned(&[("country", r#"in.(India,"New Zealand","a,b")"#)])
        );
    }

    #[test]
    fn test_or_group() {
        let q = Query::new().or(["sender_id.eq.me", "receiver_id.eq.me"]);
        assert_eq!(pairs(&q), owned(&[("or", "(sender_id.eq.me,receiver_id.eq.me)")]));
        assert!(q.has_filters());
        assert!(!Query::new().select("*").has_filters());
    }

    #[test]
    fn test_page_clamps_to_first() {
        let q = Query::new().page(0, 10);
        assert_eq!(pairs(&q), owned(&[("limit", "10"), ("offset", "0")]));
    }
}
