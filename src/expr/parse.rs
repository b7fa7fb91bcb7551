//! Normalizer for the untyped where-condition input.
//!
//! All shape and operator validation happens here, once, before anything is
//! written: unknown ternary operators, non-sequence operands for `in`,
//! `between`, `and` and `or`, and malformed node shapes abort the whole
//! build. Two quirks are preserved deliberately: an `in` list with no
//! elements produces no condition at all, and a `between` list with a single
//! bound duplicates it.

use smol_str::SmolStr;

use crate::{
    error::{Error, Result, fail},
    expr::WhereArg,
    expr::cond::{Condition, Conditions},
    operator::{Conjunction, Op, parse_operator},
    value::Value,
};

/// Compile a sequence of untyped nodes into one level of the condition
/// tree, joined by `conjunction`. The top-level invocation always joins
/// with `and`.
pub(crate) fn parse_where(args: &[WhereArg], conjunction: Conjunction) -> Result<Conditions> {
    let mut conditions = Conditions::new(conjunction);
    for arg in args {
        match arg {
            WhereArg::Value(Value::String(raw)) => conditions.push(Condition::Raw(raw.clone())),
            WhereArg::Value(_) => {
                return fail(Error::InvalidCondition(
                    "a condition must be a string or a sequence",
                ));
            }
            WhereArg::List(items) => {
                if let Some(condition) = parse_node(items)? {
                    conditions.push(condition);
                }
            }
        }
    }
    Ok(conditions)
}

fn parse_node(items: &[WhereArg]) -> Result<Option<Condition>> {
    match items {
        [] => fail(Error::InvalidCondition("a condition sequence is empty")),
        [raw] => Ok(Some(Condition::Raw(field_of(raw)?))),
        [head, operand] => parse_pair(head, operand),
        [field, operator, operand] => {
            let field = field_of(field)?;
            let operator = operator_of(operator)?;
            ternary(field, operator, operand)
        }
        _ => fail(Error::InvalidCondition(
            "a condition sequence takes 1, 2 or 3 elements",
        )),
    }
}

/// Two-element nodes: `and`/`or` groups, `$string` literals, the alternate
/// ternary encoding `[field, [operator, value]]`, and the equality
/// shorthand `[field, value]` everything else falls back to.
fn parse_pair(head: &WhereArg, operand: &WhereArg) -> Result<Option<Condition>> {
    let head = field_of(head)?;
    let keyword = head.trim().to_ascii_lowercase();

    if let Some(conjunction) = Conjunction::parse(&keyword) {
        let WhereArg::List(children) = operand else {
            return fail(Error::ExpectedSequence(conjunction.as_str()));
        };
        let inner = parse_where(children, conjunction)?;
        // an empty recursive result is spliced out entirely
        if inner.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Condition::Group(inner)));
    }

    if keyword == "$string" {
        let WhereArg::Value(Value::String(literal)) = operand else {
            return fail(Error::InvalidCondition("`$string` expects a literal string"));
        };
        return Ok(Some(Condition::Raw(literal.clone())));
    }

    match operand {
        WhereArg::List(tail) => {
            let [operator, rest @ ..] = tail.as_slice() else {
                return fail(Error::InvalidCondition("an operator sequence is empty"));
            };
            let operator = operator_of(operator)?;
            let [operand] = rest else {
                return fail(Error::InvalidCondition(
                    "an operator sequence takes exactly one operand",
                ));
            };
            ternary(head, operator, operand)
        }
        WhereArg::Value(value) => Ok(Some(Condition::Binary {
            field: head,
            operator: crate::operator::Operator::Eq,
            value: value.clone(),
        })),
    }
}

fn ternary(field: SmolStr, operator: Op, operand: &WhereArg) -> Result<Option<Condition>> {
    match operator {
        Op::Cmp(operator) => {
            let WhereArg::Value(value) = operand else {
                return fail(Error::InvalidCondition(
                    "a comparison operand must be a scalar",
                ));
            };
            Ok(Some(Condition::Binary {
                field,
                operator,
                value: value.clone(),
            }))
        }
        Op::In(operator) => {
            let WhereArg::List(items) = operand else {
                return fail(Error::ExpectedSequence(operator.as_str()));
            };
            let values = scalars_of(items)?;
            // documented quirk: an empty list drops the whole condition
            if values.is_empty() {
                return Ok(None);
            }
            Ok(Some(Condition::In {
                field,
                operator,
                values,
            }))
        }
        Op::Between(operator) => {
            let WhereArg::List(items) = operand else {
                return fail(Error::ExpectedSequence(operator.as_str()));
            };
            let bounds = scalars_of(items)?;
            let (low, high) = match bounds.as_slice() {
                [] => return Ok(None),
                [single] => (single.clone(), single.clone()),
                [low, high, ..] => (low.clone(), high.clone()),
            };
            Ok(Some(Condition::Between {
                field,
                operator,
                low,
                high,
            }))
        }
    }
}

fn field_of(arg: &WhereArg) -> Result<SmolStr> {
    match arg {
        WhereArg::Value(Value::String(field)) => Ok(field.clone()),
        _ => fail(Error::InvalidCondition(
            "a condition field must be a string",
        )),
    }
}

fn operator_of(arg: &WhereArg) -> Result<Op> {
    let WhereArg::Value(Value::String(raw)) = arg else {
        return fail(Error::InvalidCondition(
            "a condition operator must be a string",
        ));
    };
    match parse_operator(raw) {
        Some(op) => Ok(op),
        None => fail(Error::UnknownOperator(raw.to_string())),
    }
}

fn scalars_of(items: &[WhereArg]) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| match item {
            WhereArg::Value(value) => Ok(value.clone()),
            WhereArg::List(_) => fail(Error::InvalidCondition(
                "sequence operands must hold scalars",
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cond, dialect::Dialect, operator::Operator, tests::format_writer};

    fn compile(args: &[WhereArg]) -> (String, Vec<Value>) {
        let conditions = parse_where(args, Conjunction::And).unwrap();
        format_writer(conditions, Dialect::MySql)
    }

    #[test]
    fn test_ternary_comparison() {
        let (sql, binds) = compile(&[cond!["age", ">", 18]]);
        assert_eq!("age>?", sql);
        assert_eq!(vec![Value::I32(18)], binds);
    }

    #[test]
    fn test_equality_shorthand() {
        let (sql, binds) = compile(&[cond!["name", "fizz"]]);
        assert_eq!("name = ?", sql);
        assert_eq!(vec![Value::String(SmolStr::new("fizz"))], binds);
    }

    #[test]
    fn test_raw_string_node() {
        let (sql, binds) = compile(&[WhereArg::value("status = 1")]);
        assert_eq!("status = 1", sql);
        assert!(binds.is_empty());
    }

    #[test]
    fn test_string_keyword() {
        let (sql, binds) = compile(&[cond!["$string", "status = 1"]]);
        assert_eq!("status = 1", sql);
        assert!(binds.is_empty());
    }

    #[test]
    fn test_or_group() {
        let (sql, binds) = compile(&[cond![
            "$or",
            [["name", "3232"], ["name", "like", "sss"]]
        ]]);
        assert_eq!("(name = ? or name like ?)", sql);
        assert_eq!(2, binds.len());
    }

    #[test]
    fn test_alternate_ternary_encoding() {
        let (sql, binds) = compile(&[cond!["money", [">", 10]]]);
        assert_eq!("money>?", sql);
        assert_eq!(vec![Value::I32(10)], binds);

        let (sql, binds) = compile(&[cond!["type", ["$in", [2, 3]]]]);
        assert_eq!("type in (?,?)", sql);
        assert_eq!(vec![Value::I32(2), Value::I32(3)], binds);
    }

    #[test]
    fn test_empty_in_is_dropped() {
        let (sql, binds) = compile(&[cond!["type", "in", []], cond!["age", ">", 18]]);
        assert_eq!("age>?", sql);
        assert_eq!(1, binds.len());
    }

    #[test]
    fn test_between_single_bound_duplicated() {
        let (sql, binds) = compile(&[cond!["age", "between", [7]]]);
        assert_eq!("age between ? and ?", sql);
        assert_eq!(vec![Value::I32(7), Value::I32(7)], binds);
    }

    #[test]
    fn test_empty_group_spliced_out() {
        let (sql, binds) = compile(&[cond!["$or", []], cond!["age", ">", 18]]);
        assert_eq!("age>?", sql);
        assert_eq!(1, binds.len());
    }

    #[test]
    fn test_unknown_operator_errors() {
        let err = parse_where(&[cond!["age", "~", 18]], Conjunction::And).unwrap_err();
        assert_eq!(Error::UnknownOperator("~".to_string()), err);
    }

    #[test]
    fn test_in_requires_sequence() {
        let err = parse_where(&[cond!["type", "in", 2]], Conjunction::And).unwrap_err();
        assert_eq!(Error::ExpectedSequence("in"), err);
    }

    #[test]
    fn test_group_requires_sequence() {
        let err = parse_where(&[cond!["$or", 1]], Conjunction::And).unwrap_err();
        assert_eq!(Error::ExpectedSequence("or"), err);
    }

    #[test]
    fn test_string_keyword_requires_literal() {
        let err = parse_where(&[cond!["$string", 1]], Conjunction::And).unwrap_err();
        assert!(matches!(err, Error::InvalidCondition(_)));
    }

    #[test]
    fn test_case_insensitive_operator() {
        let (sql, _) = compile(&[cond!["name", "LIKE", "s%"]]);
        assert_eq!("name like ?", sql);
        let conditions =
            parse_where(&[cond!["OR", [["a", 1], ["b", 2]]]], Conjunction::And).unwrap();
        let (sql, _) = format_writer(conditions, Dialect::MySql);
        assert_eq!("(a = ? or b = ?)", sql);
    }

    #[test]
    fn test_default_equality_spelling() {
        // ternary `=` keeps the spaced form of the equality shorthand
        let (sql, _) = compile(&[cond!["age", "=", 18]]);
        assert_eq!("age = ?", sql);
        assert_eq!("=", Operator::Eq.as_str());
    }
}
