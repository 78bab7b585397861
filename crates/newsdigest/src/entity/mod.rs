//! SeaORM entity definitions for the newsdigest database schema.

pub mod article;
pub mod prelude;
