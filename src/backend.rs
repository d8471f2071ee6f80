//! 后端抽象：任务描述 → 任务输出。远程管道与本地模型共享同一契约。
//!
//! The `TaskDescriptor → TaskOutput` contract.
//!
//! [`crate::PipelineClient`] is the remote implementation. A local-model
//! backend, or a test double, implements the same trait so that callers such
//! as [`crate::service::PipelineService`] do not care which one they talk to.

use crate::client::{PipelineClient, RetryPolicy};
use crate::types::{TaskDescriptor, TaskOutput};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn execute(&self, task: &TaskDescriptor) -> Result<TaskOutput>;
}

#[async_trait]
impl TaskBackend for PipelineClient {
    fn name(&self) -> &str {
        "ulca-pipeline"
    }

    async fn execute(&self, task: &TaskDescriptor) -> Result<TaskOutput> {
        PipelineClient::execute(self, task).await
    }
}

/// Wraps a backend with an explicit [`RetryPolicy`].
pub struct RetryingBackend<B> {
    inner: B,
    policy: RetryPolicy,
}

impl<B: TaskBackend> RetryingBackend<B> {
    pub fn new(inner: B, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<B: TaskBackend> TaskBackend for RetryingBackend<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute(&self, task: &TaskDescriptor) -> Result<TaskOutput> {
        self.policy.run(|| self.inner.execute(task)).await
    }
}
