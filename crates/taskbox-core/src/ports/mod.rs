//! Port traits (interfaces) for dependency injection

pub mod store;

pub use store::TodoStore;
