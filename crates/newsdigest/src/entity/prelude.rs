//! Common re-exports for convenient entity usage.

pub use super::article::{
    ActiveModel as ArticleActiveModel, Column as ArticleColumn, Entity as ArticleEntity,
    Model as ArticleModel,
};
