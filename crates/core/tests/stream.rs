//! Tests for streaming responses.

use futures_util::StreamExt;
use gai_core::{
    Cancelled, ChatCompleteRequest, ChatCompleteResponseMetadata, ChatCompleter, Context,
    FinishReason, Message, MessagePart, StreamState, StreamingResponse, ToolCallDelta,
    ToolCallDeltas, Usage,
    testing::{ScriptedCompleter, ScriptedTurn},
};
use std::time::Duration;

fn request() -> ChatCompleteRequest {
    ChatCompleteRequest::new(vec![Message::user("Say hello")])
}

#[tokio::test]
async fn parts_arrive_in_order() {
    let completer = ScriptedCompleter::new([ScriptedTurn::text(["Hello ", "world"])]);
    let ctx = Context::new();
    let mut response = completer.chat_complete(&ctx, &request()).await.unwrap();
    assert_eq!(response.state(), StreamState::NotStarted);

    let mut output = String::new();
    while let Some(part) = response.next().await {
        output.push_str(&part.unwrap().as_text());
    }
    assert_eq!(output, "Hello world");
    assert!(response.is_exhausted());
    assert!(response.next().await.is_none());
}

#[tokio::test]
async fn metadata_is_final_after_drain() {
    let usage = Usage {
        prompt_tokens: 12,
        thoughts_tokens: 3,
        completion_tokens: 5,
    };
    let completer = ScriptedCompleter::new([ScriptedTurn::text(["Hi"]).with_usage(usage)]);
    let ctx = Context::new();
    let mut response = completer.chat_complete(&ctx, &request()).await.unwrap();

    assert_eq!(response.meta(), ChatCompleteResponseMetadata::default());
    let first = response.next().await.unwrap().unwrap();
    assert_eq!(first.as_text(), "Hi");
    assert_eq!(response.state(), StreamState::Streaming);
    assert!(!response.is_exhausted());

    assert!(response.next().await.is_none());
    let meta = response.meta();
    assert_eq!(meta.usage, usage);
    assert_eq!(meta.usage.total(), 20);
    assert_eq!(meta.finish_reason, Some(FinishReason::Stop));
}

#[tokio::test]
async fn error_ends_the_stream() {
    let completer = ScriptedCompleter::new([
        ScriptedTurn::text(["partial"]).with_error("connection reset")
    ]);
    let ctx = Context::new();
    let mut response = completer.chat_complete(&ctx, &request()).await.unwrap();

    let partial = response.next().await.unwrap().unwrap();
    assert_eq!(partial.as_text(), "partial");

    let err = response.next().await.unwrap().unwrap_err();
    assert_eq!(err.to_string(), "connection reset");
    assert_eq!(response.state(), StreamState::Failed);
    assert!(response.next().await.is_none());
    assert!(response.meta().finish_reason.is_none());
}

#[tokio::test]
async fn rejected_requests_fail_before_streaming() {
    let completer = ScriptedCompleter::new([ScriptedTurn::rejected("invalid api key")]);
    let err = completer
        .chat_complete(&Context::new(), &request())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid api key");
}

#[tokio::test]
async fn cancellation_fails_the_next_pull() {
    let completer = ScriptedCompleter::new([ScriptedTurn::text(["never"]).hanging()]);
    let ctx = Context::new();
    let mut response = completer.chat_complete(&ctx, &request()).await.unwrap();

    assert_eq!(response.next().await.unwrap().unwrap().as_text(), "never");

    let cancel = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
    });

    let next = tokio::time::timeout(Duration::from_secs(5), response.next())
        .await
        .expect("cancellation must not block");
    let err = next.unwrap().unwrap_err();
    assert!(err.is::<Cancelled>());
    assert_eq!(response.state(), StreamState::Failed);
    assert!(response.next().await.is_none());
}

#[tokio::test]
async fn cancelled_before_first_pull() {
    let ctx = Context::new();
    let mut response = StreamingResponse::from_parts(
        &ctx,
        vec![MessagePart::text("unseen")],
        ChatCompleteResponseMetadata::default(),
    );
    ctx.cancel();
    assert!(response.next().await.unwrap().unwrap_err().is::<Cancelled>());
}

#[tokio::test]
async fn child_context_follows_parent() {
    let parent = Context::new();
    let child = parent.child();
    let mut response = StreamingResponse::from_parts(
        &child,
        vec![MessagePart::text("unseen")],
        ChatCompleteResponseMetadata::default(),
    );
    parent.cancel();
    assert!(child.is_cancelled());
    assert!(response.next().await.unwrap().is_err());
}

#[tokio::test]
async fn collect_helpers() {
    let ctx = Context::new();
    let meta = ChatCompleteResponseMetadata {
        finish_reason: Some(FinishReason::Length),
        ..Default::default()
    };
    let mut response = StreamingResponse::from_parts(
        &ctx,
        vec![MessagePart::text("a"), MessagePart::text("b")],
        meta.clone(),
    );
    assert_eq!(response.text().await.unwrap(), "ab");
    assert_eq!(response.meta(), meta);

    let mut response = StreamingResponse::from_parts(
        &ctx,
        vec![MessagePart::text("a"), MessagePart::text("b")],
        meta,
    );
    assert_eq!(response.collect_parts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn producer_writes_metadata_as_frames_arrive() {
    let ctx = Context::new();
    let mut response = StreamingResponse::new(&ctx, |meta| {
        async_stream::try_stream! {
            meta.update(|m| m.usage.prompt_tokens = 7);
            yield MessagePart::text("one");
            meta.update(|m| m.usage.completion_tokens += 1);
            yield MessagePart::text("two");
            meta.update(|m| m.usage.completion_tokens += 1);
            meta.set_finish_reason(FinishReason::Stop);
        }
    });

    response.next().await.unwrap().unwrap();
    assert_eq!(response.meta().usage.prompt_tokens, 7);
    assert!(response.meta().finish_reason.is_none());

    while response.next().await.is_some() {}
    let meta = response.meta();
    assert_eq!(meta.usage.completion_tokens, 2);
    assert_eq!(meta.finish_reason, Some(FinishReason::Stop));
}

#[test]
fn tool_call_deltas_merge_by_index() {
    let mut deltas = ToolCallDeltas::new();
    assert!(deltas.is_empty());

    let fragments = [
        (0, "call_a", "search", "{\"q\":"),
        (1, "call_b", "clock", ""),
        (0, "", "", "\"rust\"}"),
    ];
    for (index, id, name, arguments) in fragments {
        deltas.accept(&ToolCallDelta {
            index,
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        });
    }

    let parts = deltas.finish().unwrap();
    assert_eq!(parts.len(), 2);
    let search = parts[0].as_tool_call();
    assert_eq!(search.id, "call_a");
    assert_eq!(search.name, "search");
    assert_eq!(search.args, serde_json::json!({ "q": "rust" }));
    assert_eq!(parts[1].as_tool_call().args, serde_json::json!({}));
}

#[test]
fn tool_call_deltas_reject_broken_arguments() {
    let mut deltas = ToolCallDeltas::new();
    deltas.accept(&ToolCallDelta {
        index: 0,
        id: "x".into(),
        name: "search".into(),
        arguments: "{\"q\":".into(),
    });
    assert!(deltas.finish().is_err());
}

#[test]
fn usage_total_saturates() {
    let usage = Usage {
        prompt_tokens: u32::MAX,
        thoughts_tokens: 1,
        completion_tokens: 1,
    };
    assert_eq!(usage.total(), u32::MAX);
}

#[test]
fn finish_reasons_use_snake_case() {
    assert_eq!(
        serde_json::to_value(FinishReason::ContentFilter).unwrap(),
        "content_filter"
    );
    assert_eq!(
        serde_json::from_value::<FinishReason>("tool_calls".into()).unwrap(),
        FinishReason::ToolCalls
    );
}
