//! Tool abstractions for the unified LLM interface

use crate::{Context, Schema, Schematic, schema::schema_for};
use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt, future::Future, pin::Pin, sync::Arc};

/// The boxed future returned by tool functions.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

/// A type-erased tool function over raw JSON arguments.
pub type ToolFn = Arc<dyn Fn(Context, Value) -> ToolFuture + Send + Sync>;

/// A tool the model may call
///
/// `execute` performs the action. `summarize`, when present, renders a short
/// human-readable line for logs and audits and must not have side effects.
#[derive(Clone)]
pub struct Tool {
    /// The name of the tool, unique within a request
    pub name: String,

    /// The description of the tool
    pub description: String,

    /// The schema of the arguments
    pub schema: Schema,

    execute: ToolFn,

    summarize: Option<ToolFn>,
}

impl Tool {
    /// Create a tool over raw JSON arguments.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Schema,
        execute: F,
    ) -> Self
    where
        F: Fn(Context, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            execute: erase(execute),
            summarize: None,
        }
    }

    /// Create a tool whose schema and argument parsing come from `A`.
    ///
    /// Arguments that do not deserialize into `A` fail the call with the
    /// deserialization error.
    pub fn typed<A, F, Fut>(name: impl Into<String>, description: impl Into<String>, execute: F) -> Self
    where
        A: Schematic + DeserializeOwned + Send + 'static,
        F: Fn(Context, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        let name = name.into();
        let label = name.clone();
        let execute = Arc::new(execute);
        Self::new(name, description, schema_for::<A>(), move |ctx, args| {
            let execute = execute.clone();
            let parsed = serde_json::from_value::<A>(args).map_err(|e| {
                anyhow::anyhow!("error unmarshaling {label} args from JSON: {e}")
            });
            async move { execute(ctx, parsed?).await }
        })
    }

    /// Attach a side-effect free summarize function.
    pub fn with_summarize<F, Fut>(mut self, summarize: F) -> Self
    where
        F: Fn(Context, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        self.summarize = Some(erase(summarize));
        self
    }

    /// Whether the tool has a summarize function.
    pub fn has_summarize(&self) -> bool {
        self.summarize.is_some()
    }

    /// Run the tool.
    pub async fn execute(&self, ctx: Context, args: Value) -> Result<String> {
        (self.execute)(ctx, args).await
    }

    /// Summarize a call, or `None` if the tool has no summarize function.
    pub async fn summarize(&self, ctx: Context, args: Value) -> Option<Result<String>> {
        let summarize = self.summarize.as_ref()?;
        Some(summarize(ctx, args).await)
    }

    /// Execute a tool call and wrap the outcome as its result.
    ///
    /// Execution errors are carried in [`ToolResult::err`], never returned.
    pub async fn call(&self, ctx: &Context, call: &ToolCall) -> ToolResult {
        match self.execute(ctx.clone(), call.args.clone()).await {
            Ok(content) => ToolResult::ok(&call.id, &call.name, content),
            Err(err) => ToolResult::failed(&call.id, &call.name, err),
        }
    }

    /// The provider-neutral function declaration of this tool.
    pub fn declaration(&self) -> ToolDeclaration<'_> {
        ToolDeclaration {
            name: &self.name,
            description: &self.description,
            parameters: &self.schema,
        }
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .field("summarize", &self.summarize.is_some())
            .finish_non_exhaustive()
    }
}

fn erase<F, Fut>(f: F) -> ToolFn
where
    F: Fn(Context, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    Arc::new(move |ctx, args| Box::pin(f(ctx, args)))
}

/// Find a tool by name, first match wins.
pub fn find<'t>(tools: &'t [Tool], name: &str) -> Option<&'t Tool> {
    tools.iter().find(|tool| tool.name == name)
}

/// The declaration backends embed in their function-calling payloads
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolDeclaration<'t> {
    /// The name of the tool
    pub name: &'t str,

    /// The description of the tool
    pub description: &'t str,

    /// The schema of the arguments
    pub parameters: &'t Schema,
}

/// A tool call made by the model
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolCall {
    /// The ID of the tool call
    pub id: String,

    /// The name of the tool to call
    pub name: String,

    /// The raw arguments, expected to match the tool's schema
    pub args: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    /// Deserialize the arguments.
    pub fn parse_args<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.args.clone()).map_err(Into::into)
    }
}

/// The caller's reply to a tool call, correlated by id
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolResult {
    /// The ID of the tool call this answers
    pub id: String,

    /// The name of the tool that was called
    pub name: String,

    /// The output of the tool
    pub content: String,

    /// The error of a failed call, shown to the model as content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<ToolError>,
}

impl ToolResult {
    /// A successful result.
    pub fn ok(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
            err: None,
        }
    }

    /// A failed result.
    pub fn failed(id: impl Into<String>, name: impl Into<String>, err: anyhow::Error) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: String::new(),
            err: Some(err.into()),
        }
    }

    /// Whether the call failed.
    pub fn is_err(&self) -> bool {
        self.err.is_some()
    }
}

/// A shared, cloneable tool execution error
#[derive(Clone)]
pub struct ToolError(Arc<anyhow::Error>);

impl ToolError {
    /// The underlying error.
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        Self(Arc::new(err))
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.0)
    }
}

impl fmt::Debug for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl std::error::Error for ToolError {}

impl Serialize for ToolError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ToolError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let message = String::deserialize(deserializer)?;
        Ok(anyhow::Error::msg(message).into())
    }
}
