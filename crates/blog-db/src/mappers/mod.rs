//! Model to entity mappers
//!
//! - `From<Model> for Entity` where every column value maps cleanly
//! - `TryFrom<Model>` where a text column must parse into an enum

mod content;
mod reaction;
