use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// In-process store for development and tests
#[derive(Clone, Debug, Default)]
pub struct MemoryCacheStore {
    entries: Arc<Mutex<HashMap<String, (Vec<u8>, Instant)>>>,
}

impl MemoryCacheStore {
    pub async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((_, expires)) if *expires <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    pub async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> anyhow::Result<()> {
        let expires = Instant::now() + Duration::from_secs(ttl_seconds);
        self.entries.lock().await.insert(key.to_string(), (value, expires));
        Ok(())
    }

    pub async fn set_nx(&self, key: &str, ttl_millis: u64) -> anyhow::Result<bool> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        if entries.get(key).is_some_and(|(_, expires)| *expires > now) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            (b"1".to_vec(), now + Duration::from_millis(ttl_millis)),
        );
        Ok(true)
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
