//! Streaming chat completion responses

use crate::{Context, error::Cancelled, message::MessagePart};
use anyhow::Result;
use futures_core::Stream;
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::{
    fmt,
    pin::Pin,
    sync::Arc,
    task::{self, Poll},
};

pub use deltas::{ToolCallDelta, ToolCallDeltas};
pub use meta::{ChatCompleteResponseMetadata, FinishReason, MetaWriter, Usage};

mod deltas;
mod meta;

type PartStream = Pin<Box<dyn Stream<Item = Result<MessagePart>> + Send>>;

/// Where a response is in its single pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Nothing pulled yet
    NotStarted,
    /// At least one pull made, end not reached
    Streaming,
    /// The producer reached its natural end
    Exhausted,
    /// An error was yielded, no further parts follow
    Failed,
}

/// A lazy, single-pass stream of message parts with its metadata
///
/// Parts are yielded in the order the backend emits them. After the first
/// error the stream ends. Cancelling the context the response was built with
/// makes the next pull yield [`Cancelled`].
pub struct StreamingResponse {
    inner: PartStream,
    meta: Arc<Mutex<ChatCompleteResponseMetadata>>,
    state: StreamState,
}

impl StreamingResponse {
    /// Build a response from a producer.
    ///
    /// The producer receives the only writer of the response metadata.
    pub fn new<F, S>(ctx: &Context, producer: F) -> Self
    where
        F: FnOnce(MetaWriter) -> S,
        S: Stream<Item = Result<MessagePart>> + Send + 'static,
    {
        let meta = Arc::new(Mutex::new(ChatCompleteResponseMetadata::default()));
        let parts = producer(MetaWriter(meta.clone()));
        Self {
            inner: Box::pin(cancellable(ctx.clone(), parts)),
            meta,
            state: StreamState::NotStarted,
        }
    }

    /// Build a response over parts already at hand.
    pub fn from_parts(
        ctx: &Context,
        parts: Vec<MessagePart>,
        meta: ChatCompleteResponseMetadata,
    ) -> Self {
        Self::new(ctx, move |writer| {
            writer.update(|m| *m = meta);
            futures_util::stream::iter(parts.into_iter().map(Ok))
        })
    }

    /// The current state of the stream.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Whether the stream reached its natural end, making the metadata final.
    pub fn is_exhausted(&self) -> bool {
        self.state == StreamState::Exhausted
    }

    /// A snapshot of the metadata.
    ///
    /// Usage and finish reason are only complete once [`Self::is_exhausted`].
    pub fn meta(&self) -> ChatCompleteResponseMetadata {
        self.meta.lock().clone()
    }

    /// Drain the rest of the stream, keeping every part.
    pub async fn collect_parts(&mut self) -> Result<Vec<MessagePart>> {
        let mut parts = Vec::new();
        while let Some(part) = self.next().await {
            parts.push(part?);
        }
        Ok(parts)
    }

    /// Drain the rest of the stream and concatenate its text parts.
    pub async fn text(&mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(part) = self.next().await {
            let part = part?;
            if part.is_text() {
                text.push_str(&part.try_text()?);
            }
        }
        Ok(text)
    }
}

impl Stream for StreamingResponse {
    type Item = Result<MessagePart>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.state {
            StreamState::Exhausted | StreamState::Failed => return Poll::Ready(None),
            StreamState::NotStarted => this.state = StreamState::Streaming,
            StreamState::Streaming => {}
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(part))) => Poll::Ready(Some(Ok(part))),
            Poll::Ready(Some(Err(e))) => {
                if e.is::<Cancelled>() {
                    tracing::warn!("chat completion stream cancelled");
                } else {
                    tracing::error!("Error in chat completion stream: {:?}", e);
                }
                this.state = StreamState::Failed;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                let meta = this.meta.lock();
                tracing::debug!(
                    usage = ?meta.usage,
                    finish_reason = ?meta.finish_reason,
                    "chat completion stream exhausted"
                );
                drop(meta);
                this.state = StreamState::Exhausted;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            StreamState::Exhausted | StreamState::Failed => (0, Some(0)),
            _ => (0, None),
        }
    }
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("state", &self.state)
            .field("meta", &*self.meta.lock())
            .finish_non_exhaustive()
    }
}

/// Race every pull against the cancellation of `ctx`.
fn cancellable<S>(ctx: Context, parts: S) -> impl Stream<Item = Result<MessagePart>> + Send
where
    S: Stream<Item = Result<MessagePart>> + Send + 'static,
{
    async_stream::stream! {
        futures_util::pin_mut!(parts);
        loop {
            let next = tokio::select! {
                biased;
                _ = ctx.cancelled() => None,
                next = parts.next() => Some(next),
            };

            match next {
                Some(Some(item)) => {
                    yield item;
                }
                Some(None) => break,
                None => {
                    yield Err(anyhow::Error::from(Cancelled));
                    break;
                }
            }
        }
    }
}
