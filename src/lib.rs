//! Translation of LINQ-style expression trees into a PostgreSQL SQL
//!  expression tree.
//!
//! Build a [`translate::postgres::Translator`] with a column lookup and
//!  [`options::ProviderOptions`], then hand it source [`ast::Expression`]s. A
//!  `None` result means the shape has no server-side translation.

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod factory;
pub mod methods;
pub mod options;
pub mod sql;
pub mod translate;
pub mod type_mapping;
