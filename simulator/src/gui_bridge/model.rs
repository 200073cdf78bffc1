use pacecore::TrackerState;
use serde::Serialize;

/// Ordered buffer contents handed to exporters.
#[derive(Debug, Clone, Serialize)]
pub struct BufferExport<T> {
    pub kind: &'static str,
    pub count: usize,
    pub entries: Vec<T>,
}

impl<T> BufferExport<T> {
    pub fn new(kind: &'static str, entries: Vec<T>) -> Self {
        Self {
            kind,
            count: entries.len(),
            entries,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReply {
    pub received: usize,
    pub accepted: usize,
    pub track_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LifecycleReply {
    pub state: TrackerState,
    pub track_count: usize,
}
