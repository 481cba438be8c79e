/// Query shaping options shared by batch reads, updates, deletes and counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySetter {
    pub table_suffix: Option<String>,
    /// Field names to load; empty loads every mapped column.
    pub select: Vec<String>,
    pub distinct: bool,
    /// Field names; a leading `-` sorts descending.
    pub orders: Vec<String>,
    pub groups: Vec<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Take row locks on the matched rows.
    pub for_update: bool,
    /// Route the statement to the primary (writer) database.
    pub force_master: bool,
}

impl QuerySetter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn table_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.table_suffix = Some(suffix.into());
        self
    }

    #[must_use]
    pub fn select<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn order_by<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.orders.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn group_by<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.groups.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    #[must_use]
    pub fn force_master(mut self) -> Self {
        self.force_master = true;
        self
    }

    pub(crate) fn suffix(&self) -> Option<&str> {
        self.table_suffix.as_deref()
    }
}

/// Split an order token into field name and direction.
pub(crate) fn order_token(token: &str) -> (&str, bool) {
    match token.strip_prefix('-') {
        Some(field) => (field, true),
        None => (token, false),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_options() {
        let qs = QuerySetter::new()
            .table_suffix("2024")
            .select(["id", "kind"])
            .order_by(["-id", "kind"])
            .group_by(["kind"])
            .limit(10)
            .offset(20)
            .distinct()
            .for_update()
            .force_master();
        assert_eq!(qs.suffix(), Some("2024"));
        assert_eq!(qs.select, vec!["id".to_owned(), "kind".to_owned()]);
        assert_eq!(qs.orders, vec!["-id".to_owned(), "kind".to_owned()]);
        assert_eq!(qs.groups, vec!["kind".to_owned()]);
        assert_eq!((qs.limit, qs.offset), (Some(10), Some(20)));
        assert!(qs.distinct && qs.for_update && qs.force_master);
    }

    #[test]
    fn order_tokens() {
        assert_eq!(order_token("-id"), ("id", true));
        assert_eq!(order_token("id"), ("id", false));
    }
}
