//! Invocation contract shared by the registry and external runtimes.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{ToolError, ToolResult};
use crate::signature::Signature;

/// Future alias produced by generated tool bindings.
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult<Value>> + Send>>;

type BoundCall = dyn Fn(Map<String, Value>) -> ToolFuture + Send + Sync;

/// Trait implemented by tool executors.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invokes the tool with the given JSON input, returning JSON output.
    async fn invoke(&self, input: Value) -> ToolResult<Value>;
}

#[async_trait]
impl<F, Fut> Tool for F
where
    F: Send + Sync + Fn(Value) -> Fut,
    Fut: Future<Output = ToolResult<Value>> + Send,
{
    async fn invoke(&self, input: Value) -> ToolResult<Value> {
        (self)(input).await
    }
}

/// Callable handle that binds named arguments against a [`Signature`] before
/// running the tool body.
///
/// The body receives a map holding exactly one entry per declared argument,
/// with defaults already applied.
#[derive(Clone)]
pub struct ToolInvoker {
    signature: Arc<Signature>,
    call: Arc<BoundCall>,
}

impl fmt::Debug for ToolInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolInvoker")
            .field("signature", &self.signature.name())
            .field(
                "arguments",
                &self.signature.arguments().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl ToolInvoker {
    /// Creates an invoker from a signature and a body returning [`ToolFuture`].
    #[must_use]
    pub fn new<F>(signature: Signature, call: F) -> Self
    where
        F: Fn(Map<String, Value>) -> ToolFuture + Send + Sync + 'static,
    {
        Self {
            signature: Arc::new(signature),
            call: Arc::new(call),
        }
    }

    /// Creates an invoker from an async closure.
    #[must_use]
    pub fn from_async<F, Fut>(signature: Signature, call: F) -> Self
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult<Value>> + Send + 'static,
    {
        Self::new(signature, move |args| -> ToolFuture { Box::pin(call(args)) })
    }

    /// Creates an invoker from a synchronous closure.
    #[must_use]
    pub fn from_sync<F>(signature: Signature, call: F) -> Self
    where
        F: Fn(Map<String, Value>) -> ToolResult<Value> + Send + Sync + 'static,
    {
        Self::new(signature, move |args| -> ToolFuture {
            let output = call(args);
            Box::pin(async move { output })
        })
    }

    /// Returns the signature arguments are bound against.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Binds `params` and runs the tool body.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] when binding fails and
    /// propagates any error produced by the body.
    pub async fn call(&self, params: Map<String, Value>) -> ToolResult<Value> {
        let bound = self.signature.bind(params)?;
        (self.call)(bound).await
    }
}

#[async_trait]
impl Tool for ToolInvoker {
    async fn invoke(&self, input: Value) -> ToolResult<Value> {
        match input {
            Value::Object(params) => self.call(params).await,
            Value::Null => self.call(Map::new()).await,
            other => Err(ToolError::invalid_arguments(
                self.signature.name(),
                format!("expected a JSON object of named arguments, got `{other}`"),
            )),
        }
    }
}
