// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Boundary contract towards agent-orchestration frameworks.
//!
//! The runtime never talks to a framework directly. A predictor exposes its
//! agent objects as [`AgentHandle`]s, and an [`AgentAdapter`] per framework
//! knows how to describe their workflow graph and how to attach or detach
//! [`Tool`]s.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An agent object exposed by a predictor, keyed by the attribute holding it.
#[derive(Clone)]
pub struct AgentHandle {
    pub attribute: String,
    pub framework: String,
    pub agent: Arc<dyn Any + Send + Sync>,
}

impl AgentHandle {
    pub fn new<A: Any + Send + Sync>(
        attribute: impl Into<String>,
        framework: impl Into<String>,
        agent: A,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            framework: framework.into(),
            agent: Arc::new(agent),
        }
    }

    pub fn downcast<A: Any + Send + Sync>(&self) -> Option<&A> {
        self.agent.downcast_ref::<A>()
    }
}

impl fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentHandle")
            .field("attribute", &self.attribute)
            .field("framework", &self.framework)
            .finish()
    }
}

/// Node/edge description of an agent workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub nodes: Vec<Value>,
    pub edges: Vec<Value>,
}

impl Workflow {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn merge(&mut self, other: Workflow) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
    }
}

/// Something an agent can call.
#[async_trait]
pub trait ToolFn: Send + Sync {
    async fn invoke(&self, arguments: Map<String, Value>) -> anyhow::Result<Value>;
}

/// A named, described, schema-typed callable handed to agents.
#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub schema: Value,
    pub callable: Arc<dyn ToolFn>,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Per-framework adapter.
pub trait AgentAdapter: Send + Sync {
    /// Framework key matched against [`AgentHandle::framework`].
    fn framework(&self) -> &str;

    /// Below this many agents, tool registration is skipped.
    fn min_agents(&self) -> usize {
        1
    }

    fn get_workflow(&self, agents: &[AgentHandle]) -> anyhow::Result<Workflow>;

    fn add_tool(&self, tool: &Tool, agents: &[AgentHandle]) -> anyhow::Result<()>;

    /// Must tolerate a tool that was never added.
    fn remove_tool(&self, name: &str, description: &str, agents: &[AgentHandle]) -> anyhow::Result<()>;
}
