use super::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Expression tree used by computation nodes, operation parameters and edge guards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    // Arithmetic
    Sum(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Abs(Box<Expression>),

    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),

    // Leaf nodes
    Literal(Value),
    Variable(String),
}

macro_rules! binary_constructor {
    ($( $fn_name:ident => $variant:ident ),* $(,)?) => {
        $(
            pub fn $fn_name(self, rhs: Expression) -> Expression {
                Expression::$variant(Box::new(self), Box::new(rhs))
            }
        )*
    };
}

impl Expression {
    pub fn number(value: f64) -> Self {
        Expression::Literal(Value::Number(value))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Literal(Value::Bool(value))
    }

    pub fn var(name: &str) -> Self {
        Expression::Variable(name.to_string())
    }

    binary_constructor! {
        plus => Sum,
        minus => Subtract,
        times => Multiply,
        divided_by => Divide,
        and => And,
        or => Or,
        equals => Equal,
        not_equals => NotEqual,
        gt => GreaterThan,
        ge => GreaterThanOrEqual,
        lt => SmallerThan,
        le => SmallerThanOrEqual,
    }

    pub fn negate(self) -> Expression {
        Expression::Not(Box::new(self))
    }

    /// Collects every variable name read by the expression.
    pub fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Expression::Variable(name) => {
                names.insert(name.clone());
            }
            Expression::Sum(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r) => {
                l.collect_variables(names);
                r.collect_variables(names);
            }
            Expression::Abs(v) | Expression::Not(v) => v.collect_variables(names),
            Expression::Literal(_) => {}
        }
    }

    fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            Expression::Sum(..) => "+",
            Expression::Subtract(..) => "-",
            Expression::Multiply(..) => "*",
            Expression::Divide(..) => "/",
            Expression::And(..) => "&&",
            Expression::Or(..) => "||",
            Expression::Equal(..) => "==",
            Expression::NotEqual(..) => "!=",
            Expression::GreaterThan(..) => ">",
            Expression::GreaterThanOrEqual(..) => ">=",
            Expression::SmallerThan(..) => "<",
            Expression::SmallerThanOrEqual(..) => "<=",
            _ => return None,
        };
        Some(symbol)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(v) => write!(f, "{}", v),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::Abs(v) => write!(f, "abs({})", v),
            Expression::Not(v) => write!(f, "!{}", v),
            Expression::Sum(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r) => {
                // symbol() is Some for every binary variant
                let op = self.symbol().unwrap_or("?");
                write!(f, "({} {} {})", l, op, r)
            }
        }
    }
}
