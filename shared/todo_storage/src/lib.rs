//! Storage services for the todo backend
//!
//! This crate owns everything that touches the todo table: the persisted item shape,
//! the attribute names used in expressions, and the store implementations behind the
//! [`todo::TodoStore`] trait.

pub mod todo;
