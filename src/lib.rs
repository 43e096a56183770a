//! Shiptrack - simulated shipment tracking for demo orders
//!
//! This library provides the core functionality for shiptrack, including:
//! - Order and stage models
//! - The stage calculator (current stage and per-stage progress from elapsed time)
//! - The order store with key-value persistence on SQLite
//! - A fixed-interval ticker for live status recomputation
//! - CLI command parsing, execution and terminal output
//!
//! # Example
//!
//! ```
//! use shiptrack::models::{NewOrder, NewProduct, StageTable};
//! use shiptrack::store::OrderStore;
//! use shiptrack::utils::ManualClock;
//!
//! let conn = shiptrack::db::DbConnection::connect_in_memory().unwrap();
//! let clock = ManualClock::new(0);
//! let mut store = OrderStore::new(conn, clock.clone(), StageTable::default());
//!
//! let ids = store.add(vec![NewOrder::new(vec![NewProduct::new("Lamp", 19.99)])]);
//! clock.advance(4_000);
//!
//! let snapshot = store.snapshot(&ids[0]).unwrap();
//! assert_eq!(snapshot.stage_name, "Shipped");
//! assert_eq!(snapshot.rounded_progress(), vec![100, 80, 0, 0, 0]);
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod models;
pub mod repo;
pub mod store;
pub mod tracking;
pub mod utils;
