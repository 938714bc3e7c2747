//! Ports Layer
//!
//! Defines the interfaces (traits) the tree depends on:
//! - `MembershipFilter`: the probabilistic set stored in every node (driven port)

pub mod filter;

pub use filter::MembershipFilter;
