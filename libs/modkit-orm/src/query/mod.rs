//! Caller intent for batch operations: filters, update params and query shape.

mod condition;
mod params;
mod setter;

pub use condition::{Condition, EXPR_SEP, Operator, parse_expr};
pub use params::{ColOp, ColValue, ParamValue, Params};
pub use setter::QuerySetter;

pub(crate) use setter::order_token;
