use crate::error::ToolError;
use crate::tools::{
    Tool, ToolEnv, edit_slide_and_export, edit_slide_text, error_result, export_slides,
    list_slides, read_slide, success_result,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Name → tool table plus the environment every call runs in. Built once at
/// startup; dispatch only reads it.
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn Tool>>,
    env: ToolEnv,
}

impl ToolRegistry {
    pub fn new(env: ToolEnv) -> Self {
        Self {
            tools: BTreeMap::new(),
            env,
        }
    }

    pub fn with_builtin_tools(env: ToolEnv) -> Self {
        let mut registry = Self::new(env);
        registry.register(Box::new(list_slides::ListSlides));
        registry.register(Box::new(read_slide::ReadSlide));
        registry.register(Box::new(edit_slide_text::EditSlideText));
        registry.register(Box::new(export_slides::ExportSlides));
        registry.register(Box::new(edit_slide_and_export::EditSlideAndExport));
        registry
    }

    /// # Panics
    ///
    /// Panics if a tool with the same name is already registered.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name();
        assert!(
            !self.tools.contains_key(name),
            "tool registered twice: {name}"
        );
        self.tools.insert(name, tool);
        tracing::debug!("registered tool: {name}");
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.keys().copied()
    }

    pub fn definitions(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema()
                })
            })
            .collect()
    }

    pub fn dispatch(&self, name: &str, args: &Value) -> Result<String, ToolError> {
        let Some(tool) = self.tools.get(name) else {
            return Err(ToolError::UnknownTool(name.to_string()));
        };
        tracing::info!(tool = name, "dispatching tool call");
        tool.invoke(&self.env, args)
            .map_err(|err| err.context(name))
    }

    /// Dispatches and shapes the outcome as an MCP tool result.
    pub fn call(&self, name: &str, args: &Value) -> Value {
        match self.dispatch(name, args) {
            Ok(text) => success_result(text),
            Err(err) => {
                tracing::warn!(tool = name, kind = err.kind(), "tool call failed: {err}");
                error_result(err.kind(), err.to_string(), Some(name))
            }
        }
    }
}
