//! Embedding contract for converting text to vector representations.

use crate::Context;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A single component of an embedding vector.
pub trait VectorComponent: Copy + Send + Sync + 'static {}

impl VectorComponent for i32 {}
impl VectorComponent for i64 {}
impl VectorComponent for f32 {}
impl VectorComponent for f64 {}

/// Input to an [`Embedder`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EmbedRequest {
    /// The text to embed
    pub input: String,
}

impl EmbedRequest {
    /// Create a new embed request
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Output of an [`Embedder`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbedResponse<T: VectorComponent> {
    /// The embedding vector
    pub embedding: Vec<T>,
}

/// Converts text into a dense vector embedding.
///
/// Satisfied by backends supporting embedding. Uses RPITIT for async
/// without boxing.
pub trait Embedder<T: VectorComponent>: Send + Sync {
    /// Embed the input.
    fn embed(
        &self,
        ctx: &Context,
        request: EmbedRequest,
    ) -> impl Future<Output = Result<EmbedResponse<T>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::{EmbedRequest, EmbedResponse, Embedder};
    use crate::Context;

    struct ConstantEmbedder(Vec<f32>);

    impl Embedder<f32> for ConstantEmbedder {
        async fn embed(
            &self,
            _ctx: &Context,
            _request: EmbedRequest,
        ) -> anyhow::Result<EmbedResponse<f32>> {
            Ok(EmbedResponse {
                embedding: self.0.clone(),
            })
        }
    }

    struct LengthEmbedder;

    impl Embedder<i64> for LengthEmbedder {
        async fn embed(
            &self,
            ctx: &Context,
            request: EmbedRequest,
        ) -> anyhow::Result<EmbedResponse<i64>> {
            ctx.check()?;
            Ok(EmbedResponse {
                embedding: vec![request.input.len() as i64],
            })
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[tokio::test]
    async fn embedder_trait_bounds() {
        assert_send_sync::<ConstantEmbedder>();
        let embedder = ConstantEmbedder(vec![0.1, 0.2, 0.3]);
        let result = embedder
            .embed(&Context::new(), EmbedRequest::new("hello"))
            .await
            .unwrap();
        assert_eq!(result.embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn embedder_sees_cancellation() {
        let ctx = Context::new();
        assert_eq!(
            LengthEmbedder
                .embed(&ctx, EmbedRequest::new("four"))
                .await
                .unwrap()
                .embedding,
            vec![4]
        );

        ctx.cancel();
        assert!(LengthEmbedder.embed(&ctx, EmbedRequest::new("four")).await.is_err());
    }
}
