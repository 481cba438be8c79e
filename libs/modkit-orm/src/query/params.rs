use std::collections::BTreeMap;

use sea_orm::sea_query::{Alias, Expr, SimpleExpr, Value};

/// Arithmetic applied to a column by [`ColValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColOp {
    Add,
    Minus,
    Multiply,
    /// Division.
    Except,
}

/// In-place column update, `SET col = col <op> value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColValue {
    pub op: ColOp,
    pub value: i64,
}

impl ColValue {
    #[must_use]
    pub fn new(op: ColOp, value: i64) -> Self {
        Self { op, value }
    }

    fn apply(self, column: &str) -> SimpleExpr {
        let col = Expr::col(Alias::new(column));
        match self.op {
            ColOp::Add => col.add(self.value),
            ColOp::Minus => col.sub(self.value),
            ColOp::Multiply => col.mul(self.value),
            ColOp::Except => col.div(self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Value(Value),
    Col(ColValue),
}

impl ParamValue {
    /// Right-hand side of the assignment to `column`.
    #[must_use]
    pub fn assignment(&self, column: &str) -> SimpleExpr {
        match self {
            Self::Value(value) => SimpleExpr::Value(value.clone()),
            Self::Col(col) => col.apply(column),
        }
    }
}

/// Field name to new value, for batch updates.
///
/// Keys are field or column names. Ordered, so the rendered `SET` list is
/// stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, ParamValue::Value(value.into()));
        self
    }

    /// `SET field = field <op> value`.
    #[must_use]
    pub fn col(mut self, field: impl Into<String>, op: ColOp, value: i64) -> Self {
        self.insert(field, ParamValue::Col(ColValue::new(op, value)));
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: ParamValue) {
        self.0.insert(field.into(), value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |params, (field, value)| params.set(field, value))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Query, QueryStatementWriter, SqliteQueryBuilder};

    fn render(params: &Params) -> String {
        let mut stmt = Query::update();
        stmt.table(Alias::new("items"));
        for (name, value) in params.iter() {
            stmt.value(Alias::new(name), value.assignment(name));
        }
        stmt.to_string(SqliteQueryBuilder)
    }

    #[test]
    fn col_values_render_arithmetic() {
        let params = Params::new()
            .col("hits", ColOp::Add, 1)
            .col("stock", ColOp::Minus, 2)
            .col("price", ColOp::Multiply, 3)
            .col("ratio", ColOp::Except, 4);
        let sql = render(&params);
        assert!(sql.contains(r#""hits" = "hits" + 1"#), "{sql}");
        assert!(sql.contains(r#""stock" = "stock" - 2"#), "{sql}");
        assert!(sql.contains(r#""price" = "price" * 3"#), "{sql}");
        assert!(sql.contains(r#""ratio" = "ratio" / 4"#), "{sql}");
    }

    #[test]
    fn plain_values_and_ordering() {
        let params: Params = [("name", "b"), ("kind", "a")].into_iter().collect();
        assert_eq!(params.len(), 2);
        let names: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["kind", "name"]);
        let sql = render(&params);
        assert!(sql.contains(r#""kind" = 'a', "name" = 'b'"#), "{sql}");
    }
}
