//! Observable values fed by live store queries.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use crate::dao::ItemStream;
use crate::scope::ViewModelScope;

/// Latest value of a live query, observable by any number of consumers.
///
/// A background task in the owning [`ViewModelScope`] pumps the source
/// stream into the value. Observers get the current value (once there is
/// one) followed by every change. When the scope goes away the pump is
/// aborted and observer streams end; when the last handle and observer are
/// dropped the pump stops and releases its source.
#[derive(Debug, Clone)]
pub struct LiveData<T> {
    value: watch::Receiver<Option<T>>,
}

impl<T> LiveData<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start pumping `source` inside `scope`.
    pub fn launch(scope: &ViewModelScope, label: &'static str, mut source: ItemStream<T>) -> Self {
        let (tx, value) = watch::channel(None);

        scope.launch_pump(label, async move {
            loop {
                tokio::select! {
                    next = source.next() => match next {
                        Some(next) => {
                            if tx.send(Some(next)).is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                    // Every handle is gone; release the source right away.
                    () = tx.closed() => break,
                }
            }
        });

        Self { value }
    }

    /// The most recent value; `None` until the source has produced one.
    pub fn value(&self) -> Option<T> {
        self.value.borrow().clone()
    }

    /// Current value followed by every change.
    ///
    /// Dropping the stream only stops this observer.
    pub fn observe(&self) -> impl Stream<Item = T> + Send + 'static {
        WatchStream::new(self.value.clone()).filter_map(|value| value)
    }

    /// Wait for the first value matching `predicate`.
    ///
    /// Returns `None` if the source stops first.
    pub async fn wait_for(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<T> {
        let mut value = self.value.clone();
        let found = match value
            .wait_for(|current| current.as_ref().is_some_and(&mut predicate))
            .await
        {
            Ok(current) => (*current).clone(),
            Err(_) => None,
        };
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::sync::mpsc;
    use tokio_stream::wrappers::ReceiverStream;

    fn channel_source() -> (mpsc::Sender<u32>, ItemStream<u32>) {
        let (tx, rx) = mpsc::channel(8);
        (tx, Box::pin(ReceiverStream::new(rx)))
    }

    #[tokio::test]
    async fn value_is_absent_until_first_emission() {
        let scope = ViewModelScope::new("test").unwrap();
        let (tx, source) = channel_source();
        let live = LiveData::launch(&scope, "numbers", source);

        assert_eq!(live.value(), None);

        tx.send(7).await.unwrap();
        assert_eq!(live.wait_for(|n| *n == 7).await, Some(7));
        assert_eq!(live.value(), Some(7));
    }

    #[tokio::test]
    async fn observers_see_current_value_then_changes() {
        let scope = ViewModelScope::new("test").unwrap();
        let (tx, source) = channel_source();
        let live = LiveData::launch(&scope, "numbers", source);

        tx.send(1).await.unwrap();
        live.wait_for(|n| *n == 1).await.unwrap();

        let mut observer = Box::pin(live.observe());
        assert_eq!(observer.next().await, Some(1));

        tx.send(2).await.unwrap();
        assert_eq!(observer.next().await, Some(2));
    }

    #[tokio::test]
    async fn observers_end_when_the_scope_is_dropped() {
        let scope = ViewModelScope::new("test").unwrap();
        let (_tx, source) = channel_source();
        let live = LiveData::launch(&scope, "numbers", source);
        let mut observer = Box::pin(live.observe());

        drop(scope);

        let ended = tokio::time::timeout(Duration::from_secs(1), observer.next())
            .await
            .unwrap();
        assert_eq!(ended, None);
        assert_eq!(live.wait_for(|_| true).await, None);
    }

    #[tokio::test]
    async fn dropping_every_handle_stops_the_pump() {
        let scope = ViewModelScope::new("test").unwrap();
        let (tx, source) = channel_source();
        let live = LiveData::launch(&scope, "numbers", source);
        drop(live);

        // No emission needed: the task ends and drops the source.
        tokio::time::timeout(Duration::from_secs(1), tx.closed())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn open_observers_keep_the_pump_alive() {
        let scope = ViewModelScope::new("test").unwrap();
        let (tx, source) = channel_source();
        let live = LiveData::launch(&scope, "numbers", source);
        let mut observer = Box::pin(live.observe());
        drop(live);

        tx.send(4).await.unwrap();
        assert_eq!(observer.next().await, Some(4));
    }
}
