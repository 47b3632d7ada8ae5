//! Access control
//!
//! Every authorization decision in the crate goes through [`authorize`];
//! handlers and the lifecycle service never compare roles themselves.

mod policy;

pub use policy::{Decision, DenyReason, ListScope, Operation, authorize};
