//! Pure page parsers: HTML text in, typed records out.

pub mod catalog;
pub mod context;
pub mod homework;
pub mod marks;
pub mod messages;
pub mod periods;
pub mod script;
pub mod teachers;
