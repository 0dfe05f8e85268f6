// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::traits::{AgentAdapter, AgentHandle, Tool, Workflow};

/// Dispatches workflow and tool requests to per-framework adapters.
///
/// Agents are grouped by [`AgentHandle::framework`]; frameworks without a
/// registered adapter are ignored.
#[derive(Default)]
pub struct ToolRegistry {
    adapters: BTreeMap<String, Arc<dyn AgentAdapter>>,
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn AgentAdapter>) -> Self {
        self.register_adapter(adapter);
        self
    }

    pub fn register_adapter(&mut self, adapter: Arc<dyn AgentAdapter>) {
        self.adapters.insert(adapter.framework().to_string(), adapter);
    }

    /// Names of the tools currently registered, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Combined node/edge graph of every framework that has agents.
    pub fn workflow(&self, agents: &[AgentHandle]) -> anyhow::Result<Workflow> {
        let mut combined = Workflow::default();
        for (adapter, members) in self.grouped(agents) {
            if members.is_empty() {
                continue;
            }
            combined.merge(adapter.get_workflow(&members)?);
        }
        Ok(combined)
    }

    /// Hand a tool to every framework with enough agents.
    ///
    /// Adding a tool that is already registered does nothing. Returns whether
    /// the tool was newly registered. If any adapter fails, the ones that
    /// already took the tool have it withdrawn again and nothing is recorded.
    pub fn add_tool(&mut self, tool: Tool, agents: &[AgentHandle]) -> anyhow::Result<bool> {
        if self.tools.contains_key(&tool.name) {
            return Ok(false);
        }
        let mut added: Vec<(Arc<dyn AgentAdapter>, Vec<AgentHandle>)> = Vec::new();
        for (adapter, members) in self.grouped(agents) {
            if members.len() < adapter.min_agents() {
                continue;
            }
            if let Err(e) = adapter.add_tool(&tool, &members) {
                for (adapter, members) in added {
                    // best effort
                    let _ = adapter.remove_tool(&tool.name, &tool.description, &members);
                }
                return Err(e);
            }
            added.push((adapter, members));
        }
        self.tools.insert(tool.name.clone(), tool);
        Ok(true)
    }

    /// Take a tool away from every framework. Unknown tools are fine.
    ///
    /// Returns whether the tool had been registered.
    pub fn remove_tool(&mut self, name: &str, description: &str, agents: &[AgentHandle]) -> anyhow::Result<bool> {
        for (adapter, members) in self.grouped(agents) {
            if members.is_empty() {
                continue;
            }
            adapter.remove_tool(name, description, &members)?;
        }
        Ok(self.tools.remove(name).is_some())
    }

    fn grouped(&self, agents: &[AgentHandle]) -> Vec<(Arc<dyn AgentAdapter>, Vec<AgentHandle>)> {
        self.adapters
            .iter()
            .map(|(framework, adapter)| {
                let members: Vec<AgentHandle> = agents
                    .iter()
                    .filter(|agent| &agent.framework == framework)
                    .cloned()
                    .collect();
                (Arc::clone(adapter), members)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ToolFn;
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use std::sync::Mutex;

    /// Records calls and keeps a tool list per adapter.
    struct RecordingAdapter {
        framework: &'static str,
        min_agents: usize,
        tools: Mutex<Vec<String>>,
        /// add_tool calls left to refuse.
        refusals: Mutex<usize>,
    }

    impl RecordingAdapter {
        fn new(framework: &'static str, min_agents: usize) -> Arc<Self> {
            Self::refusing(framework, min_agents, 0)
        }

        fn refusing(framework: &'static str, min_agents: usize, refusals: usize) -> Arc<Self> {
            Arc::new(Self {
                framework,
                min_agents,
                tools: Mutex::new(Vec::new()),
                refusals: Mutex::new(refusals),
            })
        }

        fn tools(&self) -> Vec<String> {
            self.tools.lock().unwrap().clone()
        }
    }

    impl AgentAdapter for RecordingAdapter {
        fn framework(&self) -> &str {
            self.framework
        }

        fn min_agents(&self) -> usize {
            self.min_agents
        }

        fn get_workflow(&self, agents: &[AgentHandle]) -> anyhow::Result<Workflow> {
            Ok(Workflow {
                nodes: agents.iter().map(|a| json!({"id": a.attribute, "framework": self.framework})).collect(),
                edges: Vec::new(),
            })
        }

        fn add_tool(&self, tool: &Tool, _agents: &[AgentHandle]) -> anyhow::Result<()> {
            let mut refusals = self.refusals.lock().unwrap();
            if *refusals > 0 {
                *refusals -= 1;
                anyhow::bail!("{} refused {}", self.framework, tool.name);
            }
            self.tools.lock().unwrap().push(tool.name.clone());
            Ok(())
        }

        fn remove_tool(&self, name: &str, _description: &str, _agents: &[AgentHandle]) -> anyhow::Result<()> {
            self.tools.lock().unwrap().retain(|t| t != name);
            Ok(())
        }
    }

    struct Noop;

    #[async_trait]
    impl ToolFn for Noop {
        async fn invoke(&self, _arguments: Map<String, Value>) -> anyhow::Result<Value> {
            Ok(Value::Null)
        }
    }

    fn tool(name: &str) -> Tool {
        Tool {
            name: name.to_string(),
            description: format!("{} tool", name),
            schema: json!({"type": "object"}),
            callable: Arc::new(Noop),
        }
    }

    fn agents() -> Vec<AgentHandle> {
        vec![
            AgentHandle::new("planner", "graph", ()),
            AgentHandle::new("writer", "graph", ()),
            AgentHandle::new("chat", "chat", ()),
        ]
    }

    #[test]
    fn test_workflow_merges_frameworks() {
        let registry = ToolRegistry::new()
            .with_adapter(RecordingAdapter::new("graph", 1))
            .with_adapter(RecordingAdapter::new("chat", 1))
            .with_adapter(RecordingAdapter::new("unused", 1));

        let workflow = registry.workflow(&agents()).unwrap();
        assert_eq!(workflow.nodes.len(), 3);
        assert_eq!(workflow.nodes[0]["framework"], "chat");

        assert!(registry.workflow(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_add_tool_respects_min_agents_and_is_idempotent() {
        let graph = RecordingAdapter::new("graph", 2);
        let chat = RecordingAdapter::new("chat", 2);
        let mut registry = ToolRegistry::new()
            .with_adapter(graph.clone())
            .with_adapter(chat.clone());

        assert!(registry.add_tool(tool("search"), &agents()).unwrap());
        assert!(!registry.add_tool(tool("search"), &agents()).unwrap());

        assert_eq!(graph.tools(), vec!["search".to_string()]);
        assert!(chat.tools().is_empty());
        assert_eq!(registry.tool_names(), vec!["search"]);
    }

    #[test]
    fn test_failed_add_is_rolled_back_and_retry_does_not_duplicate() {
        let chat = RecordingAdapter::new("chat", 1);
        let graph = RecordingAdapter::refusing("graph", 1, 1);
        let mut registry = ToolRegistry::new()
            .with_adapter(chat.clone())
            .with_adapter(graph.clone());

        let error = registry.add_tool(tool("search"), &agents()).unwrap_err();
        assert_eq!(error.to_string(), "graph refused search");
        assert!(chat.tools().is_empty());
        assert!(registry.tool("search").is_none());

        assert!(registry.add_tool(tool("search"), &agents()).unwrap());
        assert_eq!(chat.tools(), vec!["search".to_string()]);
        assert_eq!(graph.tools(), vec!["search".to_string()]);
    }

    #[test]
    fn test_remove_tool_tolerates_absence() {
        let graph = RecordingAdapter::new("graph", 1);
        let mut registry = ToolRegistry::new().with_adapter(graph.clone());

        assert!(!registry.remove_tool("never-added", "", &agents()).unwrap());

        registry.add_tool(tool("search"), &agents()).unwrap();
        assert!(registry.remove_tool("search", "search tool", &agents()).unwrap());
        assert!(graph.tools().is_empty());
        assert!(registry.tool("search").is_none());
    }
}
