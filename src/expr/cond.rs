use smol_str::SmolStr;

use crate::{
    operator::{BetweenOperator, Conjunction, InOperator, Operator},
    value::Value,
    writer::{FormatContext, FormatWriter},
};

/// One validated node of the condition tree.
///
/// Formatting is infallible: every shape error was rejected by the
/// normalizer, so the writers below never need defensive checks.
#[derive(Debug, Clone)]
pub(crate) enum Condition {
    /// A pre-validated literal fragment, emitted verbatim.
    Raw(SmolStr),
    Binary {
        field: SmolStr,
        operator: Operator,
        value: Value,
    },
    In {
        field: SmolStr,
        operator: InOperator,
        values: Vec<Value>,
    },
    Between {
        field: SmolStr,
        operator: BetweenOperator,
        low: Value,
        high: Value,
    },
    Group(Conditions),
}

/// One level of the tree: its conditions and the joiner between them.
#[derive(Debug, Clone)]
pub(crate) struct Conditions {
    pub(crate) conjunction: Conjunction,
    pub(crate) items: Vec<Condition>,
}

impl Conditions {
    pub(crate) fn new(conjunction: Conjunction) -> Self {
        Self {
            conjunction,
            items: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, condition: Condition) {
        self.items.push(condition);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FormatWriter for Condition {
    fn format_writer<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> std::fmt::Result {
        match self {
            Condition::Raw(raw) => context.writer.write_str(raw),
            Condition::Binary {
                field,
                operator,
                value,
            } => {
                context.writer.write_str(field)?;
                if operator.is_spaced() {
                    context.writer.write_char(' ')?;
                    operator.format_writer(context)?;
                    context.writer.write_char(' ')?;
                } else {
                    operator.format_writer(context)?;
                }
                context.write_value(value.clone())
            }
            Condition::In {
                field,
                operator,
                values,
            } => {
                context.writer.write_str(field)?;
                context.writer.write_char(' ')?;
                operator.format_writer(context)?;
                context.writer.write_str(" (")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        context.writer.write_char(',')?;
                    }
                    context.write_value(value.clone())?;
                }
                context.writer.write_char(')')
            }
            Condition::Between {
                field,
                operator,
                low,
                high,
            } => {
                context.writer.write_str(field)?;
                context.writer.write_char(' ')?;
                operator.format_writer(context)?;
                context.writer.write_char(' ')?;
                context.write_value(low.clone())?;
                context.writer.write_str(" and ")?;
                context.write_value(high.clone())
            }
            Condition::Group(inner) => {
                context.writer.write_char('(')?;
                inner.format_writer(context)?;
                context.writer.write_char(')')
            }
        }
    }
}

impl FormatWriter for Conditions {
    fn format_writer<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> std::fmt::Result {
        for (index, condition) in self.items.iter().enumerate() {
            if index > 0 {
                context.writer.write_char(' ')?;
                self.conjunction.format_writer(context)?;
                context.writer.write_char(' ')?;
            }
            condition.format_writer(context)?;
        }
        Ok(())
    }
}
