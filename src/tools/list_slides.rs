use crate::config::Config;
use crate::error::ToolError;
use crate::input::{decode, require_text};
use crate::mcp::contracts::{LIST_SLIDES_FIELDS, LIST_SLIDES_SCRIPT, TOOL_LIST_SLIDES, object_schema};
use crate::process::Invocation;
use crate::tools::{Tool, ToolEnv};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct ListSlides;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListSlidesInput {
    pub presentation_path: String,
}

impl ListSlidesInput {
    pub fn validate(&self) -> Result<(), ToolError> {
        require_text("presentation_path", &self.presentation_path)?;
        Ok(())
    }
}

pub fn command(config: &Config, input: &ListSlidesInput) -> Invocation {
    Invocation::new(&config.python)
        .arg(config.script_path(LIST_SLIDES_SCRIPT))
        .arg(&input.presentation_path)
}

impl Tool for ListSlides {
    fn name(&self) -> &'static str {
        TOOL_LIST_SLIDES
    }

    fn description(&self) -> &'static str {
        "List all slides in a PowerPoint presentation with basic information.\n\n\
         Use this tool to get an overview of the presentation structure, including slide \
         numbers, titles, and layout information. This is typically the first tool to use \
         when working with a presentation."
    }

    fn input_schema(&self) -> Value {
        object_schema(LIST_SLIDES_FIELDS)
    }

    fn invoke(&self, env: &ToolEnv, args: &Value) -> Result<String, ToolError> {
        let input: ListSlidesInput = decode(args)?;
        input.validate()?;
        tracing::debug!(path = %input.presentation_path, "listing slides");
        env.run_script(&command(&env.config, &input))
    }
}
