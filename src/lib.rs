pub mod audit;
pub mod bounded;
pub mod case_file;
pub mod constants;
pub mod engine;
pub mod error;
pub mod house;
pub mod logging;
pub mod path_stack;
pub mod report;
pub mod rng;
pub mod roster;
pub mod types;
