use std::{fmt::Write, ops::Deref};

use crate::{
    dialect::Dialect,
    value::{Value, Values},
};

pub(crate) trait FormatWriter {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> std::fmt::Result;
}

/// Per-build compile context.
///
/// One context is allocated per statement build and owns both the
/// placeholder counter and the bound-value accumulator, so numbering always
/// restarts at `$1` and no state is shared between builds. Values are pushed
/// in the same call that emits their placeholder, which keeps the bind list
/// aligned with the placeholders left to right.
pub(crate) struct FormatContext<'a, W: Write> {
    pub(crate) writer: &'a mut W,
    pub(crate) dialect: Dialect,
    placeholder: u16,
    binds: Values,
}

impl<'a, W: Write> FormatContext<'a, W> {
    pub(crate) fn new(writer: &'a mut W, dialect: Dialect) -> Self {
        Self {
            writer,
            dialect,
            placeholder: 0,
            binds: Values::new(),
        }
    }

    pub(crate) fn write_placeholder(&mut self) -> std::fmt::Result {
        match self.dialect {
            Dialect::Postgres => {
                self.placeholder += 1;
                write!(self.writer, "${}", self.placeholder)
            }
            Dialect::MySql | Dialect::Sqlite => self.writer.write_char('?'),
        }
    }

    /// Emit the next placeholder and bind `value` to it.
    pub(crate) fn write_value(&mut self, value: Value) -> std::fmt::Result {
        self.write_placeholder()?;
        self.binds.push(value);
        Ok(())
    }

    pub(crate) fn into_binds(self) -> Values {
        self.binds
    }
}

impl<D> FormatWriter for D
where
    D: Deref,
    D::Target: FormatWriter,
{
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> std::fmt::Result {
        self.deref().format_writer(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_numbering() {
        let mut str = String::new();
        let mut context = FormatContext::new(&mut str, Dialect::Postgres);
        context.write_value(Value::I32(1)).unwrap();
        context.write_value(Value::I32(2)).unwrap();
        assert_eq!("$1$2", str);

        let mut str = String::new();
        let mut context = FormatContext::new(&mut str, Dialect::MySql);
        context.write_value(Value::I32(1)).unwrap();
        context.write_value(Value::I32(2)).unwrap();
        assert_eq!("??", str);
    }

    #[test]
    fn test_binds_follow_placeholders() {
        let mut str = String::new();
        let mut context = FormatContext::new(&mut str, Dialect::Postgres);
        context.write_value(Value::I32(7)).unwrap();
        context.write_value(Value::Bool(true)).unwrap();
        assert_eq!(vec![Value::I32(7), Value::Bool(true)], context.into_binds());
    }
}
