//! Fan-out sink.

use async_trait::async_trait;
use conclave_application::ports::durable_sink::{DurableSink, SinkError};
use conclave_domain::{LogRecord, SessionIdentity};
use std::sync::Arc;

/// Persists through several sinks in order, stopping at the first failure.
#[derive(Default)]
pub struct CompositeSink {
    sinks: Vec<Arc<dyn DurableSink>>,
}

impl CompositeSink {
    pub fn new(sinks: Vec<Arc<dyn DurableSink>>) -> Self {
        Self { sinks }
    }

    pub fn with(mut self, sink: Arc<dyn DurableSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl DurableSink for CompositeSink {
    async fn persist(
        &self,
        records: &[LogRecord],
        identity: &SessionIdentity,
    ) -> Result<(), SinkError> {
        for sink in &self.sinks {
            sink.persist(records, identity).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Counting {
        calls: Mutex<usize>,
        fail: bool,
    }

    impl Counting {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl DurableSink for Counting {
        async fn persist(
            &self,
            _records: &[LogRecord],
            _identity: &SessionIdentity,
        ) -> Result<(), SinkError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                Err(SinkError::Rejected("nope".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let first = Counting::new(false);
        let failing = Counting::new(true);
        let never = Counting::new(false);
        let sink = CompositeSink::default()
            .with(first.clone())
            .with(failing.clone())
            .with(never.clone());

        let result = sink.persist(&[], &SessionIdentity::new("x")).await;

        assert!(matches!(result, Err(SinkError::Rejected(_))));
        assert_eq!(*first.calls.lock().unwrap(), 1);
        assert_eq!(*failing.calls.lock().unwrap(), 1);
        assert_eq!(*never.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_composite_succeeds() {
        let sink = CompositeSink::new(Vec::new());
        assert!(sink.is_empty());
        assert!(sink.persist(&[], &SessionIdentity::new("x")).await.is_ok());
    }
}
