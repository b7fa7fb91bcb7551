use crate::writer::{FormatContext, FormatWriter};

/// Comparison operators accepted in ternary conditions.
///
/// `NotEq` and `LtGt` are kept apart so the compiled text preserves the
/// spelling the caller used (`!=` versus `<>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    LtGt,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
}

impl Operator {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::LtGt => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "like",
            Operator::NotLike => "not like",
        }
    }

    /// Word operators and `=` are padded with spaces; the symbolic
    /// comparisons are glued to their operands to match the legacy SQL
    /// formatting (`age>?`).
    pub(crate) fn is_spaced(&self) -> bool {
        matches!(self, Operator::Eq | Operator::Like | Operator::NotLike)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InOperator {
    In,
    NotIn,
}

impl InOperator {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            InOperator::In => "in",
            InOperator::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetweenOperator {
    Between,
    NotBetween,
}

impl BetweenOperator {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            BetweenOperator::Between => "between",
            BetweenOperator::NotBetween => "not between",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Conjunction::And => "and",
            Conjunction::Or => "or",
        }
    }

    /// Recognize the `and`/`or` group keywords and their symbolic aliases.
    pub(crate) fn parse(raw: &str) -> Option<Conjunction> {
        match raw {
            "and" | "$and" => Some(Conjunction::And),
            "or" | "$or" => Some(Conjunction::Or),
            _ => None,
        }
    }
}

/// An operator drawn from the whitelist, sorted by the condition shape it
/// compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Cmp(Operator),
    In(InOperator),
    Between(BetweenOperator),
}

/// Parse a ternary operator against the whitelist, accepting the symbolic
/// aliases `$like`, `$in` and `$not_in`. Returns `None` for anything else.
pub(crate) fn parse_operator(raw: &str) -> Option<Op> {
    let lowered = raw.trim().to_ascii_lowercase();
    let op = match lowered.as_str() {
        "=" => Op::Cmp(Operator::Eq),
        "!=" => Op::Cmp(Operator::NotEq),
        "<>" => Op::Cmp(Operator::LtGt),
        ">" => Op::Cmp(Operator::Gt),
        ">=" => Op::Cmp(Operator::Gte),
        "<" => Op::Cmp(Operator::Lt),
        "<=" => Op::Cmp(Operator::Lte),
        "like" | "$like" => Op::Cmp(Operator::Like),
        "not like" => Op::Cmp(Operator::NotLike),
        "in" | "$in" => Op::In(InOperator::In),
        "not in" | "$not_in" => Op::In(InOperator::NotIn),
        "between" => Op::Between(BetweenOperator::Between),
        "not between" => Op::Between(BetweenOperator::NotBetween),
        _ => return None,
    };
    Some(op)
}

impl FormatWriter for Operator {
    fn format_writer<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> std::fmt::Result {
        context.writer.write_str(self.as_str())
    }
}

impl FormatWriter for InOperator {
    fn format_writer<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> std::fmt::Result {
        context.writer.write_str(self.as_str())
    }
}

impl FormatWriter for BetweenOperator {
    fn format_writer<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> std::fmt::Result {
        context.writer.write_str(self.as_str())
    }
}

impl FormatWriter for Conjunction {
    fn format_writer<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> std::fmt::Result {
        context.writer.write_str(self.as_str())
    }
}
