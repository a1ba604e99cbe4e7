//! The chat completion contract every backend adapter implements

use crate::{Context, request::ChatCompleteRequest, stream::StreamingResponse};
use anyhow::Result;
use std::future::Future;

/// A backend able to complete chats.
///
/// Request-level failures (the backend rejecting the request outright) are
/// returned here, before any streaming starts. Failures after that surface as
/// errors inside the [`StreamingResponse`], whose parts must keep the order
/// the backend emitted them in. Uses RPITIT for async without boxing.
pub trait ChatCompleter: Send + Sync {
    /// Start a chat completion.
    fn chat_complete(
        &self,
        ctx: &Context,
        request: &ChatCompleteRequest,
    ) -> impl Future<Output = Result<StreamingResponse>> + Send;
}

/// `()` as a completer that rejects every request.
impl ChatCompleter for () {
    async fn chat_complete(
        &self,
        _ctx: &Context,
        _request: &ChatCompleteRequest,
    ) -> Result<StreamingResponse> {
        anyhow::bail!("no chat completer configured")
    }
}

impl<C: ChatCompleter> ChatCompleter for &C {
    fn chat_complete(
        &self,
        ctx: &Context,
        request: &ChatCompleteRequest,
    ) -> impl Future<Output = Result<StreamingResponse>> + Send {
        (**self).chat_complete(ctx, request)
    }
}
