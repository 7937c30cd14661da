pub mod entity;
pub mod job;
