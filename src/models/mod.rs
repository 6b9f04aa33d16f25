pub mod job;
pub mod result;
pub mod store;
pub mod visit;
