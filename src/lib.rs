//! A statement synthesis engine for query-builder style data access.
//!
//! A [`Query`] accumulates state through fluent setters; a [`Builder`]
//! compiles that state into one SQL statement plus its ordered bound
//! values, without touching a database. Building never mutates the state,
//! so the same query can be compiled any number of times with identical
//! output.
//!
//! ```
//! use sqlforge::{Builder, MySql, Query, cond};
//!
//! let mut query = Query::table("users");
//! query
//!     .select(["id", "name"])
//!     .where_cond(cond!["age", ">", 18])
//!     .limit(10);
//!
//! let (sql, binds) = Builder::of::<MySql>().build_query(&query)?;
//! assert_eq!("SELECT id,name FROM users WHERE age>? LIMIT 10", sql);
//! assert_eq!(1, binds.len());
//! # Ok::<(), sqlforge::Error>(())
//! ```
//!
//! Mutations go through [`Builder::build_execute`]; update and delete
//! refuse to compile without a where clause unless [`Query::force`] was
//! called:
//!
//! ```
//! use sqlforge::{Builder, Operation, Postgres, Query, cond, record};
//!
//! let mut query = Query::table("users");
//! query
//!     .data(record! { "name" => "fizz", "website" => "fizzday.net" })
//!     .where_cond(cond!["id", 3]);
//!
//! let builder = Builder::of::<Postgres>();
//! let (sql, binds) = builder.build_execute(&query, Operation::Update)?;
//! assert_eq!("UPDATE users SET name = $1,website = $2 WHERE id = $3", sql);
//! assert_eq!(3, binds.len());
//! # Ok::<(), sqlforge::Error>(())
//! ```

mod builder;
mod dialect;
mod error;
mod expr;
mod mutation;
mod operator;
mod query;
mod value;
mod writer;

pub use builder::{Builder, Operation};
pub use dialect::{Dialect, HasDialect, MySql, Postgres, Sqlite};
pub use error::{Error, Result};
pub use expr::{IntoWhereArg, WhereArg};
pub use mutation::{MutationData, Record};
pub use operator::{BetweenOperator, Conjunction, InOperator, Operator};
pub use query::{IntoJoinArgs, Join, JoinKind, Query};
pub use value::{IntoValue, Value, Values};

/// Build one where-condition node from nested bracket syntax.
///
/// Scalars become bound values, brackets become nested sequences:
///
/// ```
/// use sqlforge::cond;
///
/// cond!["age", ">", 18];
/// cond!["type", "in", [2, 3]];
/// cond!["$or", [["name", "3232"], ["name", "like", "sss"]]];
/// ```
#[macro_export]
macro_rules! cond {
    ( $($arg:tt),* $(,)? ) => {
        $crate::WhereArg::List(::std::vec![ $($crate::__cond_arg!($arg)),* ])
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __cond_arg {
    ([ $($inner:tt),* $(,)? ]) => {
        $crate::WhereArg::List(::std::vec![ $($crate::__cond_arg!($inner)),* ])
    };
    ($value:expr) => {
        $crate::IntoWhereArg::into_where_arg($value)
    };
}

/// Build a [`Record`] from `key => value` pairs, preserving pair order.
///
/// ```
/// use sqlforge::{Value, record};
///
/// let record = record! { "name" => "fizz", "age" => 18 };
/// assert_eq!(Some(&Value::I32(18)), record.get("age"));
/// ```
#[macro_export]
macro_rules! record {
    ( $($key:expr => $value:expr),* $(,)? ) => {{
        let mut record = $crate::Record::new();
        $( $crate::__record_pair(&mut record, $key, $value); )*
        record
    }};
}

#[doc(hidden)]
pub fn __record_pair<K, V>(record: &mut Record, key: K, value: V)
where
    K: Into<smol_str::SmolStr>,
    V: IntoValue,
{
    record.insert(key.into(), value.into_value());
}
