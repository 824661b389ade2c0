//! Affinity write operations
//!
//! Every remote mutation this client performs is described by an [`Operation`]
//! and reported back as an [`OperationResult`].

pub mod operation;

pub use operation::{Operation, OperationResult};
