pub mod order_store;
pub mod storage;

pub use order_store::*;
pub use storage::*;
