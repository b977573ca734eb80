//! One module per protocol operation.

pub mod capabilities;
pub mod describe;
pub mod domain;
pub mod fetch;
pub mod harvest;
pub mod search;
pub mod transaction;
