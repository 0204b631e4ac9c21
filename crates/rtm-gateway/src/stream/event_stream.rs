//! Bounded, ordered event stream
//!
//! Single producer appends decoded events; any number of consumers take them
//! in FIFO order. Each event goes to exactly one consumer.

use futures::Stream;
use parking_lot::Mutex;
use rtm_common::{BackpressurePolicy, StreamConfig};
use rtm_core::{EventVariant, StreamError};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Lifecycle of an event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Accepting events
    Open,
    /// Closed, still holding undelivered events
    Closing,
    /// Closed and fully drained
    Closed,
}

struct Queue {
    events: VecDeque<EventVariant>,
    closed: bool,
}

struct Inner {
    config: StreamConfig,
    queue: Mutex<Queue>,
    /// Signalled when an event is queued or the stream closes
    readable: Notify,
    /// Signalled when an event is taken or the stream closes
    writable: Notify,
    dropped: AtomicU64,
}

/// Handle to a shared event stream
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct EventStream {
    inner: Arc<Inner>,
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

impl EventStream {
    /// Create an open stream
    ///
    /// A zero capacity is treated as one.
    pub fn new(config: StreamConfig) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            inner: Arc::new(Inner {
                config: StreamConfig { capacity, ..config },
                queue: Mutex::new(Queue {
                    events: VecDeque::with_capacity(capacity),
                    closed: false,
                }),
                readable: Notify::new(),
                writable: Notify::new(),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Create an open stream with the blocking policy
    pub fn bounded(capacity: usize) -> Self {
        Self::new(StreamConfig::blocking(capacity))
    }

    pub fn config(&self) -> &StreamConfig {
        &self.inner.config
    }

    pub fn capacity(&self) -> usize {
        self.inner.config.capacity
    }

    /// Number of buffered, undelivered events
    pub fn len(&self) -> usize {
        self.inner.queue.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.lock().events.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.queue.lock().closed
    }

    /// Events discarded by the drop-oldest policy
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> StreamState {
        let queue = self.inner.queue.lock();
        match (queue.closed, queue.events.is_empty()) {
            (false, _) => StreamState::Open,
            (true, false) => StreamState::Closing,
            (true, true) => StreamState::Closed,
        }
    }

    /// Append an event at the tail
    ///
    /// Under the blocking policy this waits for buffer space, bounded by the
    /// configured append timeout if any. Under drop-oldest it never waits.
    ///
    /// # Errors
    /// [`StreamError::Closed`] once the stream is closed,
    /// [`StreamError::Timeout`] if the append timeout elapsed first.
    pub async fn append(&self, event: EventVariant) -> Result<(), StreamError> {
        match self.inner.config.policy {
            BackpressurePolicy::DropOldest => self.push_evicting(event),
            BackpressurePolicy::Blocking => match self.inner.config.append_timeout {
                Some(limit) => tokio::time::timeout(limit, self.push_blocking(event))
                    .await
                    .map_err(|_| StreamError::Timeout(limit))?,
                None => self.push_blocking(event).await,
            },
        }
    }

    async fn push_blocking(&self, event: EventVariant) -> Result<(), StreamError> {
        loop {
            let notified = self.inner.writable.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut queue = self.inner.queue.lock();
                if queue.closed {
                    return Err(StreamError::Closed);
                }
                if queue.events.len() < self.inner.config.capacity {
                    queue.events.push_back(event);
                    drop(queue);
                    self.inner.readable.notify_one();
                    return Ok(());
                }
            }

            tracing::trace!(capacity = self.inner.config.capacity, "Event stream full, producer waiting");
            notified.await;
        }
    }

    fn push_evicting(&self, event: EventVariant) -> Result<(), StreamError> {
        let evicted = {
            let mut queue = self.inner.queue.lock();
            if queue.closed {
                return Err(StreamError::Closed);
            }
            let evicted = if queue.events.len() >= self.inner.config.capacity {
                queue.events.pop_front()
            } else {
                None
            };
            queue.events.push_back(event);
            evicted
        };

        if let Some(old) = evicted {
            self.inner.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                discriminant = %old.discriminant(),
                capacity = self.inner.config.capacity,
                "Event stream full, dropped oldest event"
            );
        }

        self.inner.readable.notify_one();
        Ok(())
    }

    /// Take the next event in arrival order
    ///
    /// Waits until an event is available or the stream is closed and drained.
    ///
    /// # Errors
    /// [`StreamError::Closed`] once the stream is closed and empty.
    pub async fn next(&self) -> Result<EventVariant, StreamError> {
        self.recv(None).await
    }

    /// Like [`next`](Self::next), but gives up with
    /// [`StreamError::Cancelled`] as soon as `cancel` fires
    pub async fn next_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<EventVariant, StreamError> {
        self.recv(Some(cancel)).await
    }

    /// Take the next event without waiting
    ///
    /// `Ok(None)` means the stream is open but currently empty.
    pub fn try_next(&self) -> Result<Option<EventVariant>, StreamError> {
        let event = {
            let mut queue = self.inner.queue.lock();
            match queue.events.pop_front() {
                Some(event) => event,
                None if queue.closed => return Err(StreamError::Closed),
                None => return Ok(None),
            }
        };
        self.inner.writable.notify_one();
        Ok(Some(event))
    }

    async fn recv(&self, cancel: Option<&CancellationToken>) -> Result<EventVariant, StreamError> {
        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(StreamError::Cancelled);
            }

            let notified = self.inner.readable.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(event) = self.try_next()? {
                return Ok(event);
            }

            tokio::select! {
                () = &mut notified => {}
                () = cancelled(cancel) => return Err(StreamError::Cancelled),
            }
        }
    }

    /// Close the stream
    ///
    /// Idempotent. Buffered events stay available to consumers; waiting
    /// producers and consumers are woken. Returns `true` for the call that
    /// actually closed the stream.
    pub fn close(&self) -> bool {
        let (newly_closed, pending) = {
            let mut queue = self.inner.queue.lock();
            let newly_closed = !queue.closed;
            queue.closed = true;
            (newly_closed, queue.events.len())
        };

        if newly_closed {
            tracing::debug!(pending, "Event stream closed");
        }

        self.inner.readable.notify_waiters();
        self.inner.writable.notify_waiters();
        newly_closed
    }

    /// Consume events as a [`Stream`] that ends when the stream is closed and drained
    pub fn events(&self) -> impl Stream<Item = EventVariant> + Send + 'static {
        futures::stream::unfold(self.clone(), |stream| async move {
            let event = stream.next().await.ok()?;
            Some((event, stream))
        })
    }

    /// Consume events as a [`Stream`] that also ends when `cancel` fires
    pub fn events_until(
        &self,
        cancel: CancellationToken,
    ) -> impl Stream<Item = EventVariant> + Send + 'static {
        futures::stream::unfold((self.clone(), cancel), |(stream, cancel)| async move {
            let event = stream.next_with_cancel(&cancel).await.ok()?;
            Some((event, (stream, cancel)))
        })
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("capacity", &self.inner.config.capacity)
            .field("policy", &self.inner.config.policy)
            .field("state", &self.state())
            .field("len", &self.len())
            .field("dropped", &self.dropped_count())
            .finish()
    }
}
