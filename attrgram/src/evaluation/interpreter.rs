//! Rule Interpreter: evaluates one expression against a local environment

use super::error::{EvalResult, EvaluationError};
use super::value::Value;
use crate::rules::{BinaryOp, Expr};

/// Read access to the values a rule may see: lexemes (`attribute` is `None`)
/// and attributes of the symbols named by `R`
pub trait Environment<R> {
    fn lookup(&self, symbol: &R, attribute: Option<&str>) -> Option<Value>;

    /// Human-readable name of a reference, for diagnostics
    fn describe(&self, symbol: &R, attribute: Option<&str>) -> String;
}

/// Evaluate an expression. Pure; no implicit coercion between types.
pub fn evaluate<R, E>(expr: &Expr<R>, env: &E) -> EvalResult<Value>
where
    E: Environment<R> + ?Sized,
{
    match expr {
        Expr::Literal { value } => Ok(value.clone()),
        Expr::Lexeme { symbol } => read(env, symbol, None),
        Expr::Attribute { symbol, attribute } => read(env, symbol, Some(attribute)),
        Expr::Binary { op, left, right } => match op {
            BinaryOp::And | BinaryOp::Or => short_circuit(*op, left, right, env),
            _ => {
                let lhs = evaluate(left, env)?;
                let rhs = evaluate(right, env)?;
                apply(*op, lhs, rhs)
            }
        },
    }
}

fn read<R, E>(env: &E, symbol: &R, attribute: Option<&str>) -> EvalResult<Value>
where
    E: Environment<R> + ?Sized,
{
    env.lookup(symbol, attribute)
        .ok_or_else(|| EvaluationError::unbound(env.describe(symbol, attribute)))
}

fn short_circuit<R, E>(op: BinaryOp, left: &Expr<R>, right: &Expr<R>, env: &E) -> EvalResult<Value>
where
    E: Environment<R> + ?Sized,
{
    let lhs = expect_bool(op, evaluate(left, env)?)?;
    match (op, lhs) {
        (BinaryOp::And, false) => Ok(Value::Bool(false)),
        (BinaryOp::Or, true) => Ok(Value::Bool(true)),
        _ => Ok(Value::Bool(expect_bool(op, evaluate(right, env)?)?)),
    }
}

fn expect_bool(op: BinaryOp, value: Value) -> EvalResult<bool> {
    value.as_bool().ok_or_else(|| {
        EvaluationError::type_mismatch(format!(
            "'{}' needs bool operands, found {} {}",
            op,
            value.attr_type(),
            value
        ))
    })
}

fn apply(op: BinaryOp, lhs: Value, rhs: Value) -> EvalResult<Value> {
    match (op, lhs, rhs) {
        (BinaryOp::Concat, Value::Str(mut l), Value::Str(r)) => {
            l.push_str(&r);
            Ok(Value::Str(l))
        }
        (BinaryOp::Add, Value::Int(l), Value::Int(r)) => l
            .checked_add(r)
            .map(Value::Int)
            .ok_or_else(EvaluationError::overflow),
        (BinaryOp::Eq, l, r) if l.attr_type() == r.attr_type() => Ok(Value::Bool(l == r)),
        (BinaryOp::Eq, l, r) => Err(EvaluationError::type_mismatch(format!(
            "'=' compares values of one type, found {} and {}",
            l.attr_type(),
            r.attr_type()
        ))),
        (op, l, r) => {
            let wanted = match op {
                BinaryOp::Add => "int",
                _ => "string",
            };
            Err(EvaluationError::type_mismatch(format!(
                "'{}' needs {} operands, found {} and {}",
                op,
                wanted,
                l.attr_type(),
                r.attr_type()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{parse_rule, SymbolRef};
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    /// Environment keyed by the reference as written
    #[derive(Default)]
    struct MapEnv(HashMap<String, Value>);

    impl MapEnv {
        fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
            self.0.insert(key.to_string(), value.into());
            self
        }
    }

    impl Environment<SymbolRef> for MapEnv {
        fn lookup(&self, symbol: &SymbolRef, attribute: Option<&str>) -> Option<Value> {
            self.0.get(&self.describe(symbol, attribute)).cloned()
        }

        fn describe(&self, symbol: &SymbolRef, attribute: Option<&str>) -> String {
            format!("{}.{}", symbol, attribute.unwrap_or("lexeme"))
        }
    }

    fn eval(rule: &str, env: &MapEnv) -> EvalResult<Value> {
        evaluate(&parse_rule(rule).unwrap().expr, env)
    }

    #[test]
    fn test_concatenation() {
        let env = MapEnv::default()
            .with("ColList[1].sql", "a,b")
            .with("ID.lexeme", "c");

        let value = eval("ColList[0].sql := ColList[1].sql || ',' || ID.lexeme", &env).unwrap();
        assert_eq!(value, Value::from("a,b,c"));
    }

    #[test]
    fn test_counter_and_equality() {
        let env = MapEnv::default()
            .with("ColList[1].count", 2i64)
            .with("ColList[2].count", 1i64);

        assert_eq!(eval("X.n := ColList[1].count + 1", &env).unwrap(), Value::Int(3));
        assert_eq!(
            eval("X.ok := ColList[1].count = ColList[2].count", &env).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(eval("X.ok := 'a' = 'a'", &env).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_short_circuit_skips_unbound() {
        let env = MapEnv::default();

        assert_eq!(eval("X.ok := false and Missing.ok", &env).unwrap(), Value::Bool(false));
        assert_eq!(eval("X.ok := true or Missing.ok", &env).unwrap(), Value::Bool(true));
        assert_matches!(
            eval("X.ok := true and Missing.ok", &env),
            Err(EvaluationError::UnboundAttribute { reference, .. }) if reference == "Missing.ok"
        );
    }

    #[test]
    fn test_type_mismatches() {
        let env = MapEnv::default().with("A.n", 1i64);

        assert_matches!(eval("X.s := 'a' || A.n", &env), Err(EvaluationError::TypeMismatch { .. }));
        assert_matches!(eval("X.n := A.n + 'a'", &env), Err(EvaluationError::TypeMismatch { .. }));
        assert_matches!(eval("X.ok := A.n = 'a'", &env), Err(EvaluationError::TypeMismatch { .. }));
        assert_matches!(eval("X.ok := A.n and true", &env), Err(EvaluationError::TypeMismatch { .. }));
        assert_matches!(eval("X.ok := true and 'x'", &env), Err(EvaluationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_overflow() {
        let env = MapEnv::default().with("A.n", i64::MAX);
        assert_matches!(eval("X.n := A.n + 1", &env), Err(EvaluationError::ArithmeticOverflow { .. }));
    }
}
