use std::sync::Arc;

use crate::analysis::result::AnalysisResult;

/// Holds the most recently received analysis so it can be replayed
/// without another upload. Empty until the first successful analysis;
/// every later one overwrites it.
#[derive(Default)]
pub struct PlaybackCache {
    slot: Option<Arc<AnalysisResult>>,
}

impl PlaybackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, result: AnalysisResult) -> Arc<AnalysisResult> {
        let result = Arc::new(result);
        self.slot = Some(Arc::clone(&result));
        result
    }

    pub fn current(&self) -> Option<Arc<AnalysisResult>> {
        self.slot.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let cache = PlaybackCache::new();
        assert!(cache.is_empty());
        assert!(cache.current().is_none());
    }

    #[test]
    fn store_overwrites() {
        let mut cache = PlaybackCache::new();
        cache.store(AnalysisResult::new(vec![0.1], 1));
        cache.store(AnalysisResult::new(vec![0.2, 0.3], 2));
        let current = cache.current().unwrap();
        assert_eq!(current.samples, vec![0.2, 0.3]);
        assert_eq!(current.frame_count, 2);
    }

    #[test]
    fn reading_does_not_consume() {
        let mut cache = PlaybackCache::new();
        cache.store(AnalysisResult::new(vec![0.1], 1));
        assert!(cache.current().is_some());
        assert!(cache.current().is_some());
        assert!(!cache.is_empty());
    }
}
