/// Price-threshold battery controller.
pub mod controller;
pub mod engine;
/// Synthetic price signal.
pub mod price;
/// Daily reset trigger.
pub mod reset;
pub mod types;
