/// Keyed store with recency-based eviction, injected into the use cases that want it.
pub trait AnalysisCache<V> {
    fn get(&mut self, key: &str) -> Option<V>;
    fn put(&mut self, key: &str, value: V);
    fn evict(&mut self, key: &str) -> Option<V>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Last-N symbols the user looked at, newest first.
pub trait RecentSymbols {
    fn record(&mut self, symbol: &str);
    fn list(&self) -> Vec<String>;
}
