use std::collections::{HashMap, VecDeque};
use tickerlens_domain::repositories::cache::{AnalysisCache, RecentSymbols};

/// In-memory cache with least-recently-used eviction.
#[derive(Debug, Clone)]
pub struct LruAnalysisCache<V> {
    capacity: usize,
    entries: HashMap<String, V>,
    // Front is least recently used.
    access_order: VecDeque<String>,
}

impl<V> LruAnalysisCache<V> {
    /// A zero capacity disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            access_order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            if let Some(k) = self.access_order.remove(pos) {
                self.access_order.push_back(k);
            }
        }
    }
}

impl<V: Clone> AnalysisCache<V> for LruAnalysisCache<V> {
    fn get(&mut self, key: &str) -> Option<V> {
        let value = self.entries.get(key).cloned();
        match value {
            Some(_) => {
                self.touch(key);
                metrics::counter!("tickerlens.infra.cache.lookups_total", "result" => "hit")
                    .increment(1);
            }
            None => {
                metrics::counter!("tickerlens.infra.cache.lookups_total", "result" => "miss")
                    .increment(1);
            }
        }
        value
    }

    fn put(&mut self, key: &str, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.to_string(), value).is_some() {
            self.touch(key);
            return;
        }
        self.access_order.push_back(key.to_string());
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.access_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            metrics::counter!("tickerlens.infra.cache.evictions_total").increment(1);
        }
    }

    fn evict(&mut self, key: &str) -> Option<V> {
        let removed = self.entries.remove(key)?;
        self.access_order.retain(|k| k != key);
        Some(removed)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Bounded most-recent-first symbol history without duplicates.
#[derive(Debug, Clone)]
pub struct RecentSymbolList {
    capacity: usize,
    symbols: VecDeque<String>,
}

impl RecentSymbolList {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            symbols: VecDeque::with_capacity(capacity),
        }
    }
}

impl RecentSymbols for RecentSymbolList {
    fn record(&mut self, symbol: &str) {
        let symbol = symbol.trim();
        if symbol.is_empty() || self.capacity == 0 {
            return;
        }
        self.symbols.retain(|s| s != symbol);
        self.symbols.push_front(symbol.to_string());
        self.symbols.truncate(self.capacity);
    }

    fn list(&self) -> Vec<String> {
        self.symbols.iter().cloned().collect()
    }
}
