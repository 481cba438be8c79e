use sea_orm::sea_query::{self, Alias, Expr, LikeExpr, SimpleExpr, Value};

use crate::meta::ModelDescriptor;

/// Separator between a field name and its operator, as in `age__gte`.
pub const EXPR_SEP: &str = "__";

/// Comparison operator of a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Exact,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    IsNull,
    Contains,
    StartsWith,
    EndsWith,
}

impl Operator {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::IsNull => "isnull",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "exact" => Self::Exact,
            "ne" => Self::Ne,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "in" => Self::In,
            "isnull" => Self::IsNull,
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            _ => return None,
        })
    }
}

/// Split `expr` into field name and operator; no known suffix means `exact`.
#[must_use]
pub fn parse_expr(expr: &str) -> (&str, Operator) {
    expr.rsplit_once(EXPR_SEP)
        .and_then(|(field, suffix)| Operator::from_suffix(suffix).map(|op| (field, op)))
        .unwrap_or((expr, Operator::Exact))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joint {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Expr {
        field: String,
        op: Operator,
        args: Vec<Value>,
    },
    Group(Condition),
}

#[derive(Debug, Clone, PartialEq)]
struct Item {
    joint: Joint,
    negated: bool,
    term: Term,
}

/// Filter tree for batch reads, updates, deletes and counts.
///
/// Terms are combined left to right: `a.and(b).or(c)` is `(a AND b) OR c`.
/// Use [`Condition::and_cond`] / [`Condition::or_cond`] for other groupings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    items: Vec<Item>,
}

impl Condition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(mut self, joint: Joint, negated: bool, term: Term) -> Self {
        self.items.push(Item {
            joint,
            negated,
            term,
        });
        self
    }

    fn expr(expr: &str, args: Vec<Value>) -> Term {
        let (field, op) = parse_expr(expr);
        Term::Expr {
            field: field.to_owned(),
            op,
            args,
        }
    }

    #[must_use]
    pub fn and(self, expr: &str, value: impl Into<Value>) -> Self {
        self.push(Joint::And, false, Self::expr(expr, vec![value.into()]))
    }

    #[must_use]
    pub fn and_not(self, expr: &str, value: impl Into<Value>) -> Self {
        self.push(Joint::And, true, Self::expr(expr, vec![value.into()]))
    }

    #[must_use]
    pub fn or(self, expr: &str, value: impl Into<Value>) -> Self {
        self.push(Joint::Or, false, Self::expr(expr, vec![value.into()]))
    }

    #[must_use]
    pub fn or_not(self, expr: &str, value: impl Into<Value>) -> Self {
        self.push(Joint::Or, true, Self::expr(expr, vec![value.into()]))
    }

    /// `field IN (values)`; `expr` may omit the `__in` suffix.
    #[must_use]
    pub fn and_in<V: Into<Value>>(self, expr: &str, values: impl IntoIterator<Item = V>) -> Self {
        let (field, _) = parse_expr(expr);
        let term = Term::Expr {
            field: field.to_owned(),
            op: Operator::In,
            args: values.into_iter().map(Into::into).collect(),
        };
        self.push(Joint::And, false, term)
    }

    #[must_use]
    pub fn and_cond(self, cond: Condition) -> Self {
        self.push(Joint::And, false, Term::Group(cond))
    }

    #[must_use]
    pub fn and_not_cond(self, cond: Condition) -> Self {
        self.push(Joint::And, true, Term::Group(cond))
    }

    #[must_use]
    pub fn or_cond(self, cond: Condition) -> Self {
        self.push(Joint::Or, false, Term::Group(cond))
    }

    #[must_use]
    pub fn or_not_cond(self, cond: Condition) -> Self {
        self.push(Joint::Or, true, Term::Group(cond))
    }

    /// Render the tree against the columns of `model`.
    ///
    /// # Panics
    /// Panics on a field unknown to `model`, or on a pattern operator
    /// (`contains`, `startswith`, `endswith`) given a non-string value.
    #[must_use]
    pub fn to_condition(&self, model: &ModelDescriptor) -> sea_query::Condition {
        let mut acc: Option<sea_query::Condition> = None;
        for item in &self.items {
            let mut cond = match &item.term {
                Term::Expr { field, op, args } => {
                    sea_query::Condition::all().add(term_expr(model, field, *op, args))
                }
                Term::Group(group) => group.to_condition(model),
            };
            if item.negated {
                cond = cond.not();
            }
            acc = Some(match (acc, item.joint) {
                (None, _) => cond,
                (Some(left), Joint::And) => sea_query::Condition::all().add(left).add(cond),
                (Some(left), Joint::Or) => sea_query::Condition::any().add(left).add(cond),
            });
        }
        acc.unwrap_or_else(sea_query::Condition::all)
    }
}

fn is_null(value: &Value) -> bool {
    *value == value.as_null()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(Some(b)) => *b,
        Value::TinyInt(Some(n)) => *n != 0,
        Value::SmallInt(Some(n)) => *n != 0,
        Value::Int(Some(n)) => *n != 0,
        Value::BigInt(Some(n)) => *n != 0,
        Value::String(Some(s)) => matches!(s.as_str(), "1" | "t" | "T" | "true" | "TRUE" | "True"),
        _ => false,
    }
}

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn like_pattern(field: &str, op: Operator, value: &Value) -> LikeExpr {
    let Value::String(Some(text)) = value else {
        panic!(
            "operator `{}` on `{field}` expects a string value",
            op.as_str()
        );
    };
    let text = like_escape(text);
    let pattern = match op {
        Operator::StartsWith => format!("{text}%"),
        Operator::EndsWith => format!("%{text}"),
        _ => format!("%{text}%"),
    };
    LikeExpr::new(pattern).escape('\\')
}

fn term_expr(model: &ModelDescriptor, field: &str, op: Operator, args: &[Value]) -> SimpleExpr {
    let col = Expr::col(Alias::new(model.field(field).column));
    if op == Operator::In {
        if args.is_empty() {
            // IN () matches nothing
            return Expr::cust("1=0");
        }
        return col.is_in(args.iter().cloned());
    }

    let Some(value) = args.first().cloned() else {
        panic!("operator `{}` on `{field}` needs a value", op.as_str());
    };
    match op {
        Operator::Exact if is_null(&value) => col.is_null(),
        Operator::Ne if is_null(&value) => col.is_not_null(),
        Operator::Exact | Operator::In => col.eq(value),
        Operator::Ne => col.ne(value),
        Operator::Gt => col.gt(value),
        Operator::Gte => col.gte(value),
        Operator::Lt => col.lt(value),
        Operator::Lte => col.lte(value),
        Operator::IsNull if truthy(&value) => col.is_null(),
        Operator::IsNull => col.is_not_null(),
        Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
            col.like(like_pattern(field, op, &value))
        }
    }
}
