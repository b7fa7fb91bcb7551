use crate::error::{Error, Result, fail};

/// Placeholder style of the target driver.
///
/// Postgres numbers its placeholders per statement (`$1`, `$2`, ...); MySql
/// and Sqlite use a bare positional mark. This is the only driver-specific
/// part of the generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Look up a dialect by its driver name, the way a driver registry
    /// would, but as plain configuration instead of global state.
    pub fn for_driver(driver: &str) -> Result<Dialect> {
        match driver {
            "postgres" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => fail(Error::UnknownDriver(other.to_string())),
        }
    }
}

pub trait HasDialect {
    const DIALECT: Dialect;
}

pub struct Postgres;

impl HasDialect for Postgres {
    const DIALECT: Dialect = Dialect::Postgres;
}

pub struct MySql;

impl HasDialect for MySql {
    const DIALECT: Dialect = Dialect::MySql;
}

pub struct Sqlite;

impl HasDialect for Sqlite {
    const DIALECT: Dialect = Dialect::Sqlite;
}

#[cfg(feature = "postgres")]
impl HasDialect for sqlx::Postgres {
    const DIALECT: Dialect = Dialect::Postgres;
}

#[cfg(feature = "mysql")]
impl HasDialect for sqlx::MySql {
    const DIALECT: Dialect = Dialect::MySql;
}

#[cfg(feature = "sqlite")]
impl HasDialect for sqlx::Sqlite {
    const DIALECT: Dialect = Dialect::Sqlite;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_driver() {
        assert_eq!(Ok(Dialect::Postgres), Dialect::for_driver("postgres"));
        assert_eq!(Ok(Dialect::MySql), Dialect::for_driver("mysql"));
        assert_eq!(Ok(Dialect::Sqlite), Dialect::for_driver("sqlite"));
        assert_eq!(
            Err(Error::UnknownDriver("oracle".to_string())),
            Dialect::for_driver("oracle")
        );
    }
}
