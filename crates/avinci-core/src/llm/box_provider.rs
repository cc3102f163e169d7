//! BoxLlmProvider / BoxVisionProvider -- object-safe dynamic dispatch wrappers.
//!
//! Same blanket-impl pattern for both capabilities:
//! 1. Define an object-safe `*Dyn` trait with boxed futures
//! 2. Blanket-impl it for every type implementing the RPITIT trait
//! 3. The `Box*` wrapper holds `Box<dyn *Dyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use avinci_types::llm::{CompletionRequest, CompletionResponse, LlmError, VisionRequest};

use super::provider::{LlmProvider, VisionProvider};

/// Object-safe version of [`LlmProvider`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn LlmProviderDyn`).
pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;
}

impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased text-generation provider.
///
/// Since `LlmProvider` uses RPITIT, it cannot be used as a trait object directly.
/// `BoxLlmProvider` provides the same methods by delegating to `LlmProviderDyn`.
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn + Send + Sync>,
}

impl BoxLlmProvider {
    /// Wrap a concrete `LlmProvider` in a type-erased box.
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Send a completion request and receive the full response.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        self.inner.complete_boxed(request).await
    }
}

/// Object-safe version of [`VisionProvider`] with boxed futures.
pub trait VisionProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn describe_image_boxed<'a>(
        &'a self,
        request: &'a VisionRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}

impl<T: VisionProvider> VisionProviderDyn for T {
    fn name(&self) -> &str {
        VisionProvider::name(self)
    }

    fn describe_image_boxed<'a>(
        &'a self,
        request: &'a VisionRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.describe_image(request))
    }
}

/// Type-erased image captioning provider.
pub struct BoxVisionProvider {
    inner: Box<dyn VisionProviderDyn + Send + Sync>,
}

impl BoxVisionProvider {
    /// Wrap a concrete `VisionProvider` in a type-erased box.
    pub fn new<T: VisionProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Describe an image following the request's instruction.
    pub async fn describe_image(&self, request: &VisionRequest<'_>) -> Result<String, LlmError> {
        self.inner.describe_image_boxed(request).await
    }
}
