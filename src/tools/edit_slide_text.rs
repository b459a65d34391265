use crate::config::Config;
use crate::error::ToolError;
use crate::input::{SlideNumber, decode, require_slide_number, require_text};
use crate::mcp::contracts::{
    EDIT_SLIDE_SCRIPT, EDIT_SLIDE_TEXT_FIELDS, TARGET_TEXT_REPLACE, TARGET_TYPES,
    TOOL_EDIT_SLIDE_TEXT, edit_schema,
};
use crate::process::Invocation;
use crate::tools::{Tool, ToolEnv};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct EditSlideText;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditSlideTextInput {
    pub presentation_path: String,
    pub slide_number: Option<i64>,
    pub target_type: String,
    pub target_value: String,
    pub new_text: String,
    pub old_text: Option<String>,
}

#[derive(Debug)]
pub struct EditRequest<'a> {
    pub presentation_path: &'a str,
    pub slide: SlideNumber,
    pub target_type: &'a str,
    pub target_value: &'a str,
    pub new_text: &'a str,
    pub old_text: Option<&'a str>,
}

impl EditSlideTextInput {
    /// Checks fields in declaration order and stops at the first problem.
    pub fn validate(&self) -> Result<EditRequest<'_>, ToolError> {
        let presentation_path = require_text("presentation_path", &self.presentation_path)?;
        let slide = require_slide_number("slide_number", self.slide_number)?;
        let target_type = require_text("target_type", &self.target_type)?;
        if !TARGET_TYPES.contains(&target_type) {
            return Err(ToolError::validation(format!(
                "target_type must be one of: {}",
                TARGET_TYPES.join(", ")
            )));
        }
        let target_value = require_text("target_value", &self.target_value)?;
        let new_text = require_text("new_text", &self.new_text)?;

        let old_text = self
            .old_text
            .as_deref()
            .filter(|text| !text.is_empty());
        if target_type == TARGET_TEXT_REPLACE && old_text.is_none() {
            return Err(ToolError::validation(
                "old_text is required when target_type is text_replace",
            ));
        }

        Ok(EditRequest {
            presentation_path,
            slide,
            target_type,
            target_value,
            new_text,
            old_text,
        })
    }
}

pub fn command(config: &Config, request: &EditRequest<'_>) -> Invocation {
    let invocation = Invocation::new(&config.python)
        .arg(config.script_path(EDIT_SLIDE_SCRIPT))
        .arg(request.presentation_path)
        .arg(request.slide.to_string())
        .arg(request.target_type)
        .arg(request.target_value)
        .arg(request.new_text);
    match request.old_text {
        Some(old_text) => invocation.arg(old_text),
        None => invocation,
    }
}

/// Validates, runs the edit script and returns its JSON report.
pub fn run(env: &ToolEnv, input: &EditSlideTextInput) -> Result<String, ToolError> {
    let request = input.validate()?;
    tracing::info!(
        path = request.presentation_path,
        slide = request.slide.get(),
        target_type = request.target_type,
        "editing slide text"
    );
    env.run_script(&command(&env.config, &request))
}

impl Tool for EditSlideText {
    fn name(&self) -> &'static str {
        TOOL_EDIT_SLIDE_TEXT
    }

    fn description(&self) -> &'static str {
        "Change text on one slide and save the presentation in place.\n\n\
         target_type selects the shape: title (the slide title), shape_index (0-based \
         shape position from read_slide), shape_name, or text_replace (replace old_text \
         with new_text inside the shape named by target_value). old_text is required for \
         text_replace. Slide numbers start at 1."
    }

    fn input_schema(&self) -> Value {
        edit_schema(EDIT_SLIDE_TEXT_FIELDS)
    }

    fn invoke(&self, env: &ToolEnv, args: &Value) -> Result<String, ToolError> {
        let input: EditSlideTextInput = decode(args)?;
        run(env, &input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::errors;
    use crate::process::fake::{RecordingRunner, captured};
    use crate::tools::testing::{env_with, schema_and_record_fields};
    use serde_json::json;

    fn full_args() -> Value {
        json!({
            "presentation_path": "deck.pptx",
            "slide_number": 1,
            "target_type": "title",
            "target_value": "Hello",
            "new_text": "Goodbye"
        })
    }

    fn without(field: &str) -> Value {
        let mut args = full_args();
        args.as_object_mut().expect("object").remove(field);
        args
    }

    #[test]
    fn command_appends_old_text_last() {
        let input = EditSlideTextInput {
            presentation_path: "deck.pptx".to_string(),
            slide_number: Some(2),
            target_type: "text_replace".to_string(),
            target_value: "Body".to_string(),
            new_text: "Q4".to_string(),
            old_text: Some("Q3".to_string()),
        };
        let request = input.validate().expect("valid");
        let invocation = command(&Config::default(), &request);
        assert_eq!(
            invocation.args,
            [
                "./uno_edit_slide.py",
                "deck.pptx",
                "2",
                "text_replace",
                "Body",
                "Q4",
                "Q3"
            ]
        );
    }

    #[test]
    fn command_omits_absent_old_text() {
        let input: EditSlideTextInput = decode(&full_args()).expect("decoded");
        let request = input.validate().expect("valid");
        let invocation = command(&Config::default(), &request);
        assert_eq!(
            invocation.args,
            ["./uno_edit_slide.py", "deck.pptx", "1", "title", "Hello", "Goodbye"]
        );
    }

    #[test]
    fn each_required_field_is_checked_before_spawning() {
        let (env, runner) = env_with(RecordingRunner::new());
        for field in [
            "presentation_path",
            "slide_number",
            "target_type",
            "target_value",
            "new_text",
        ] {
            let err = EditSlideText
                .invoke(&env, &without(field))
                .expect_err("error");
            assert_eq!(err.kind(), errors::INVALID_INPUT);
            assert_eq!(err.to_string(), format!("{field} is required"));
        }
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn first_missing_field_wins() {
        let (env, _) = env_with(RecordingRunner::new());
        let err = EditSlideText
            .invoke(&env, &json!({"slide_number": 0}))
            .expect_err("error");
        assert_eq!(err.to_string(), "presentation_path is required");
    }

    #[test]
    fn text_replace_requires_old_text() {
        let (env, runner) = env_with(RecordingRunner::new());
        let mut args = full_args();
        args["target_type"] = json!("text_replace");

        let err = EditSlideText.invoke(&env, &args).expect_err("error");
        assert_eq!(
            err.to_string(),
            "old_text is required when target_type is text_replace"
        );

        args["old_text"] = json!("");
        let err = EditSlideText.invoke(&env, &args).expect_err("error");
        assert_eq!(err.kind(), errors::INVALID_INPUT);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn unknown_target_type_is_rejected() {
        let (env, _) = env_with(RecordingRunner::new());
        let mut args = full_args();
        args["target_type"] = json!("footer");
        let err = EditSlideText.invoke(&env, &args).expect_err("error");
        assert!(err.to_string().starts_with("target_type must be one of"));
    }

    #[test]
    fn successful_edit_returns_script_report() {
        let payload = "{\"success\": true, \"old_text\": \"Hello\", \"new_text\": \"Goodbye\"}";
        let (env, runner) = env_with(RecordingRunner::replying(vec![Ok(captured(payload))]));
        let result = EditSlideText.invoke(&env, &full_args()).expect("edited");
        assert_eq!(result, payload);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn whitespace_new_text_is_passed_through() {
        let (env, runner) = env_with(RecordingRunner::new());
        let mut args = full_args();
        args["new_text"] = json!(" ");
        EditSlideText.invoke(&env, &args).expect("edited");
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args.get(5).map(String::as_str), Some(" "));
    }

    #[test]
    fn schema_matches_input_fields() {
        let (declared, actual) = schema_and_record_fields(
            &EditSlideText.input_schema(),
            &EditSlideTextInput::default(),
        );
        assert_eq!(declared, actual);
    }
}
