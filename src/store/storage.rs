use anyhow::Result;
use rusqlite::Connection;
use crate::repo::KvRepo;

/// Persistent key-value storage the order store writes through
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl KeyValueStorage for Connection {
    fn get(&self, key: &str) -> Result<Option<String>> {
        KvRepo::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        KvRepo::set(self, key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        KvRepo::remove(self, key).map(|_| ())
    }
}
