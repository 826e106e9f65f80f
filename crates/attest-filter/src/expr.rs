//! Block-form predicates as an expression tree.
//!
//! The same tree is interpreted twice: against real rows to decide inclusion, and
//! symbolically to render the predicate into the table's description without touching data.

use crate::Record;
use crate::condition::{display_value, loose_eq};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

/// Method-call vocabulary available on field values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Includes,
    StartsWith,
    EndsWith,
    IsEmpty,
    Len,
}

impl Method {
    fn name(self) -> &'static str {
        match self {
            Method::Includes => "include?",
            Method::StartsWith => "start_with?",
            Method::EndsWith => "end_with?",
            Method::IsEmpty => "empty?",
            Method::Len => "length",
        }
    }
}

#[derive(Clone, Debug)]
pub enum Expr {
    Field(String),
    Literal(Value),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Matches {
        negated: bool,
        subject: Box<Expr>,
        pattern: Regex,
    },
    Call(Box<Expr>, Method, Vec<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field(name.into())
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    fn compare(self, op: CompareOp, rhs: impl Into<Expr>) -> Self {
        Expr::Compare(op, Box::new(self), Box::new(rhs.into()))
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Eq, rhs)
    }

    pub fn ne(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Ne, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Gt, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Ge, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Lt, rhs)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Self {
        self.compare(CompareOp::Le, rhs)
    }

    /// `=~`
    pub fn matches(self, pattern: Regex) -> Self {
        Expr::Matches {
            negated: false,
            subject: Box::new(self),
            pattern,
        }
    }

    /// `!~`
    pub fn not_matches(self, pattern: Regex) -> Self {
        Expr::Matches {
            negated: true,
            subject: Box::new(self),
            pattern,
        }
    }

    pub fn includes(self, needle: impl Into<Expr>) -> Self {
        Expr::Call(Box::new(self), Method::Includes, vec![needle.into()])
    }

    pub fn starts_with(self, prefix: impl Into<Expr>) -> Self {
        Expr::Call(Box::new(self), Method::StartsWith, vec![prefix.into()])
    }

    pub fn ends_with(self, suffix: impl Into<Expr>) -> Self {
        Expr::Call(Box::new(self), Method::EndsWith, vec![suffix.into()])
    }

    pub fn empty(self) -> Self {
        Expr::Call(Box::new(self), Method::IsEmpty, Vec::new())
    }

    pub fn len(self) -> Self {
        Expr::Call(Box::new(self), Method::Len, Vec::new())
    }

    pub fn and(self, rhs: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(rhs))
    }

    /// Field names the expression reads, in first-seen order.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Field(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Literal(_) => {}
            Expr::Compare(_, l, r) | Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_fields(out);
                r.collect_fields(out);
            }
            Expr::Matches { subject, .. } => subject.collect_fields(out),
            Expr::Call(recv, _, args) => {
                recv.collect_fields(out);
                for a in args {
                    a.collect_fields(out);
                }
            }
            Expr::Not(inner) => inner.collect_fields(out),
        }
    }

    /// Evaluate against one row. Missing fields read as `null`.
    pub fn eval(&self, row: &Record) -> Value {
        match self {
            Expr::Field(name) => row.get(name).cloned().unwrap_or(Value::Null),
            Expr::Literal(v) => v.clone(),
            Expr::Compare(op, l, r) => Value::Bool(compare(*op, &l.eval(row), &r.eval(row))),
            Expr::Matches {
                negated,
                subject,
                pattern,
            } => {
                let subject = subject.eval(row);
                let hit = !subject.is_null() && pattern.is_match(&display_value(&subject));
                Value::Bool(hit != *negated)
            }
            Expr::Call(recv, method, args) => {
                let recv = recv.eval(row);
                let args: Vec<Value> = args.iter().map(|a| a.eval(row)).collect();
                call(*method, &recv, &args)
            }
            Expr::And(l, r) => Value::Bool(truthy(&l.eval(row)) && truthy(&r.eval(row))),
            Expr::Or(l, r) => Value::Bool(truthy(&l.eval(row)) || truthy(&r.eval(row))),
            Expr::Not(inner) => Value::Bool(!truthy(&inner.eval(row))),
        }
    }

    pub fn test(&self, row: &Record) -> bool {
        truthy(&self.eval(row))
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Literal(v)
    }
}

impl From<&str> for Expr {
    fn from(v: &str) -> Self {
        Expr::Literal(Value::String(v.to_string()))
    }
}

impl From<String> for Expr {
    fn from(v: String) -> Self {
        Expr::Literal(Value::String(v))
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr::Literal(v.into())
    }
}

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Expr::Literal(v.into())
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::Literal(v.into())
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Expr::Literal(Value::Bool(v))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(name) => f.write_str(name),
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Compare(op, l, r) => write!(f, "{l} {} {r}", op.symbol()),
            Expr::Matches {
                negated,
                subject,
                pattern,
            } => {
                let op = if *negated { "!~" } else { "=~" };
                write!(f, "{subject} {op} /{}/", pattern.as_str())
            }
            Expr::Call(recv, method, args) if args.is_empty() => {
                write!(f, "{recv}.{}", method.name())
            }
            Expr::Call(recv, method, args) => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{recv}.{}({})", method.name(), args.join(", "))
            }
            Expr::And(l, r) => write!(f, "{l} && {r}"),
            Expr::Or(l, r) => write!(f, "({l} || {r})"),
            Expr::Not(inner) => write!(f, "!({inner})"),
        }
    }
}

fn truthy(v: &Value) -> bool {
    !matches!(v, Value::Null | Value::Bool(false))
}

fn compare(op: CompareOp, l: &Value, r: &Value) -> bool {
    match op {
        CompareOp::Eq => loose_eq(l, r),
        CompareOp::Ne => !loose_eq(l, r),
        _ => {
            let Some(ord) = order(l, r) else {
                return false;
            };
            match op {
                CompareOp::Gt => ord == Ordering::Greater,
                CompareOp::Ge => ord != Ordering::Less,
                CompareOp::Lt => ord == Ordering::Less,
                CompareOp::Le => ord != Ordering::Greater,
                CompareOp::Eq | CompareOp::Ne => false,
            }
        }
    }
}

fn order(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn call(method: Method, recv: &Value, args: &[Value]) -> Value {
    let arg = args.first();
    match method {
        Method::Includes => Value::Bool(match (recv, arg) {
            (Value::String(s), Some(Value::String(needle))) => s.contains(needle.as_str()),
            (Value::Array(items), Some(needle)) => items.iter().any(|i| loose_eq(i, needle)),
            (Value::Object(map), Some(Value::String(key))) => map.contains_key(key),
            _ => false,
        }),
        Method::StartsWith => Value::Bool(match (recv, arg) {
            (Value::String(s), Some(Value::String(p))) => s.starts_with(p.as_str()),
            _ => false,
        }),
        Method::EndsWith => Value::Bool(match (recv, arg) {
            (Value::String(s), Some(Value::String(p))) => s.ends_with(p.as_str()),
            _ => false,
        }),
        Method::IsEmpty => Value::Bool(match recv {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }),
        Method::Len => match recv {
            Value::String(s) => s.chars().count().into(),
            Value::Array(items) => items.len().into(),
            Value::Object(map) => map.len().into(),
            _ => Value::Null,
        },
    }
}
