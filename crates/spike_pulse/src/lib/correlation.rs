use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::Utc;

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Per-request identifier attached to every log line and to the response.
/// Only used for tracing; it is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn next() -> Self {
        let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        CorrelationId(format!(
            "ins-{}-{:06}",
            Utc::now().timestamp_millis(),
            sequence
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CorrelationId> for String {
    fn from(value: CorrelationId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_have_expected_shape() {
        let id = CorrelationId::next();
        assert!(id.as_str().starts_with("ins-"));
        assert_eq!(id.as_str().split('-').count(), 3);
    }

    #[test]
    fn test_ids_are_unique_across_threads() {
        let handles = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..250)
                        .map(|_| CorrelationId::next().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        let ids = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        let unique = ids.iter().collect::<HashSet<_>>();

        assert_eq!(ids.len(), 2000);
        assert_eq!(unique.len(), ids.len());
    }
}
