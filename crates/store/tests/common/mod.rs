//! Shared fixtures for the store integration tests.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use certfleet_store::StoreFS;

/// In-memory backing store standing in for a distributed store.
#[derive(Default)]
pub struct MemStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.lock().unwrap().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl StoreFS for MemStore {
    async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.entries
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no entry {name}")))
    }

    async fn write(&self, name: &str, data: &[u8], _mode: u32) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn delete(&self, name: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no entry {name}")))
    }
}

/// Names of the entries directly under `dir`, sorted.
pub fn dir_entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}
