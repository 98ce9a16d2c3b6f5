pub mod collision;
pub mod constants;
pub mod engine;
pub mod error;
pub mod maze;
pub mod rng;
pub mod types;
