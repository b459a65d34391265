use crate::config::Config;
use crate::error::ToolError;
use crate::input::{SlideNumber, decode, require_slide_number, require_text};
use crate::mcp::contracts::{READ_SLIDE_FIELDS, READ_SLIDE_SCRIPT, TOOL_READ_SLIDE, object_schema};
use crate::process::Invocation;
use crate::tools::{Tool, ToolEnv};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct ReadSlide;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadSlideInput {
    pub presentation_path: String,
    pub slide_number: Option<i64>,
}

#[derive(Debug)]
pub struct ReadSlideRequest<'a> {
    pub presentation_path: &'a str,
    pub slide: SlideNumber,
}

impl ReadSlideInput {
    pub fn validate(&self) -> Result<ReadSlideRequest<'_>, ToolError> {
        let presentation_path = require_text("presentation_path", &self.presentation_path)?;
        let slide = require_slide_number("slide_number", self.slide_number)?;
        Ok(ReadSlideRequest {
            presentation_path,
            slide,
        })
    }
}

/// The script takes the 1-based number as given.
pub fn command(config: &Config, request: &ReadSlideRequest<'_>) -> Invocation {
    Invocation::new(&config.python)
        .arg(config.script_path(READ_SLIDE_SCRIPT))
        .arg(request.presentation_path)
        .arg(request.slide.to_string())
}

impl Tool for ReadSlide {
    fn name(&self) -> &'static str {
        TOOL_READ_SLIDE
    }

    fn description(&self) -> &'static str {
        "Read the full content of one slide: every shape with its type, name, position, \
         and text.\n\nUse this before editing so the edit can target the right shape. \
         Slide numbers start at 1."
    }

    fn input_schema(&self) -> Value {
        object_schema(READ_SLIDE_FIELDS)
    }

    fn invoke(&self, env: &ToolEnv, args: &Value) -> Result<String, ToolError> {
        let input: ReadSlideInput = decode(args)?;
        let request = input.validate()?;
        env.run_script(&command(&env.config, &request))
    }
}
