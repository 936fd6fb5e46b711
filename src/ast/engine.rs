use crate::ast::{Expression, Value};
use crate::error::ProtocolError;

/// Read access to variable values during expression evaluation.
pub trait VariableSource {
    fn lookup(&self, name: &str) -> Option<f64>;
}

// This macro generates a match arm for a binary operation.
macro_rules! eval_op {
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, number) => {
        $self.eval_binary($l, $r, $op_str, $op_fn)
    };
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, bool) => {
        $self.eval_comparison($l, $r, $op_str, $op_fn)
    };
}

/// Recursive evaluator for protocol expressions against a variable source.
pub struct ExpressionEngine<'a, S: VariableSource + ?Sized> {
    variables: &'a S,
}

impl<'a, S: VariableSource + ?Sized> ExpressionEngine<'a, S> {
    pub fn new(variables: &'a S) -> Self {
        Self { variables }
    }

    pub fn evaluate(&self, expr: &Expression) -> Result<Value, ProtocolError> {
        match expr {
            // --- Arithmetic Operations ---
            Expression::Sum(l, r) => eval_op!(self, l, r, "+", |a, b| a + b, number),
            Expression::Subtract(l, r) => eval_op!(self, l, r, "-", |a, b| a - b, number),
            Expression::Multiply(l, r) => eval_op!(self, l, r, "*", |a, b| a * b, number),
            Expression::Divide(l, r) => eval_op!(self, l, r, "/", |a, b| a / b, number),
            Expression::Abs(v) => match self.evaluate(v)? {
                Value::Number(n) => Ok(Value::Number(n.abs())),
                other => Err(type_mismatch("abs", "Number", other)),
            },

            // --- Comparison Operations ---
            Expression::GreaterThan(l, r) => eval_op!(self, l, r, ">", |a, b| a > b, bool),
            Expression::SmallerThan(l, r) => eval_op!(self, l, r, "<", |a, b| a < b, bool),
            Expression::GreaterThanOrEqual(l, r) => {
                eval_op!(self, l, r, ">=", |a, b| a >= b, bool)
            }
            Expression::SmallerThanOrEqual(l, r) => {
                eval_op!(self, l, r, "<=", |a, b| a <= b, bool)
            }

            // --- Equality ---
            // Booleans and numbers compare through their numeric view so that
            // flags stored as 1.0 / 0.0 can be tested against `true`.
            Expression::Equal(l, r) => {
                let left = self.evaluate(l)?;
                let right = self.evaluate(r)?;
                Ok(Value::Bool(left.as_number() == right.as_number()))
            }
            Expression::NotEqual(l, r) => {
                let left = self.evaluate(l)?;
                let right = self.evaluate(r)?;
                Ok(Value::Bool(left.as_number() != right.as_number()))
            }

            // --- Logical Operations ---
            Expression::And(l, r) => {
                if !self.evaluate_bool(l, "&&")? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.evaluate_bool(r, "&&")?))
            }
            Expression::Or(l, r) => {
                if self.evaluate_bool(l, "||")? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.evaluate_bool(r, "||")?))
            }
            Expression::Not(v) => Ok(Value::Bool(!self.evaluate_bool(v, "!")?)),

            // --- Leaves ---
            Expression::Literal(val) => Ok(*val),
            Expression::Variable(name) => self
                .variables
                .lookup(name)
                .map(Value::Number)
                .ok_or_else(|| ProtocolError::UnknownVariable(name.clone())),
        }
    }

    /// Evaluates an expression that must produce a number.
    pub fn evaluate_number(&self, expr: &Expression) -> Result<f64, ProtocolError> {
        match self.evaluate(expr)? {
            Value::Number(n) => Ok(n),
            other => Err(type_mismatch("numeric parameter", "Number", other)),
        }
    }

    /// Evaluates an expression that must produce a boolean.
    pub fn evaluate_bool(&self, expr: &Expression, op: &str) -> Result<bool, ProtocolError> {
        match self.evaluate(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(type_mismatch(op, "Bool", other)),
        }
    }

    fn eval_binary<F>(
        &self,
        l: &Expression,
        r: &Expression,
        op: &str,
        f: F,
    ) -> Result<Value, ProtocolError>
    where
        F: Fn(f64, f64) -> f64,
    {
        match (self.evaluate(l)?, self.evaluate(r)?) {
            (Value::Number(lv), Value::Number(rv)) => Ok(Value::Number(f(lv, rv))),
            (Value::Number(_), r_val) => Err(type_mismatch(op, "Number", r_val)),
            (l_val, _) => Err(type_mismatch(op, "Number", l_val)),
        }
    }

    fn eval_comparison<F>(
        &self,
        l: &Expression,
        r: &Expression,
        op: &str,
        f: F,
    ) -> Result<Value, ProtocolError>
    where
        F: Fn(f64, f64) -> bool,
    {
        match (self.evaluate(l)?, self.evaluate(r)?) {
            (Value::Number(lv), Value::Number(rv)) => Ok(Value::Bool(f(lv, rv))),
            (Value::Number(_), r_val) => Err(type_mismatch(op, "Number", r_val)),
            (l_val, _) => Err(type_mismatch(op, "Number", l_val)),
        }
    }
}

fn type_mismatch(op: &str, expected: &str, found: Value) -> ProtocolError {
    ProtocolError::TypeMismatch {
        operation: op.to_string(),
        expected: expected.to_string(),
        found,
    }
}
