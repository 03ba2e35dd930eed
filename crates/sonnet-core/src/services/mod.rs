//! Shared services layered over the database.

mod store;

pub use store::BlogStore;
