// Core data models for shiptrack
// These structs represent the tracked orders and the shipment lifecycle

pub mod order;
pub mod stage;

pub use order::*;
pub use stage::*;
