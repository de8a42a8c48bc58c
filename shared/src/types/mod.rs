//! Core types used throughout the aggregation pipeline

pub mod node;
pub mod packet;
pub mod test_tree;
pub mod trace;

pub use node::*;
pub use packet::*;
pub use test_tree::*;
pub use trace::*;
