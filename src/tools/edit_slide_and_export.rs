use crate::error::{ResultExt, ToolError};
use crate::input::{decode, optional_text};
use crate::mcp::contracts::{EDIT_SLIDE_AND_EXPORT_FIELDS, TOOL_EDIT_SLIDE_AND_EXPORT, edit_schema};
use crate::tools::edit_slide_text::{self, EditSlideTextInput};
use crate::tools::export_slides::{self, ExportResult};
use crate::tools::{Tool, ToolEnv, to_json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Edit, then re-render so the caller can see the result.
pub struct EditSlideAndExport;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditSlideAndExportInput {
    pub presentation_path: String,
    pub slide_number: Option<i64>,
    pub target_type: String,
    pub target_value: String,
    pub new_text: String,
    pub old_text: Option<String>,
    pub output_dir: Option<String>,
}

impl EditSlideAndExportInput {
    fn edit_input(&self) -> EditSlideTextInput {
        EditSlideTextInput {
            presentation_path: self.presentation_path.clone(),
            slide_number: self.slide_number,
            target_type: self.target_type.clone(),
            target_value: self.target_value.clone(),
            new_text: self.new_text.clone(),
            old_text: self.old_text.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EditAndExportResult {
    edit: Value,
    export: ExportResult,
}

impl Tool for EditSlideAndExport {
    fn name(&self) -> &'static str {
        TOOL_EDIT_SLIDE_AND_EXPORT
    }

    fn description(&self) -> &'static str {
        "Edit text on one slide, then export that slide as a JPEG preview.\n\n\
         Takes the same arguments as edit_slide_text plus an optional output_dir. \
         Nothing is rendered if the edit fails. If the export fails, the edit has \
         already been saved and the error says so."
    }

    fn input_schema(&self) -> Value {
        edit_schema(EDIT_SLIDE_AND_EXPORT_FIELDS)
    }

    fn invoke(&self, env: &ToolEnv, args: &Value) -> Result<String, ToolError> {
        let input: EditSlideAndExportInput = decode(args)?;
        let edit_input = input.edit_input();
        let request = edit_input.validate()?;
        let output_dir = optional_text("output_dir", input.output_dir.as_deref())?;
        let output_dir = env.config.export_dir(output_dir);

        let report = edit_slide_text::run(env, &edit_input).context("edit")?;
        let edit: Value = serde_json::from_str(&report)
            .map_err(|source| ToolError::OutputFormat { source })?;

        let export = export_slides::export(
            env,
            request.presentation_path,
            Some(std::slice::from_ref(&request.slide)),
            &output_dir,
        )
        .context("edit applied; export failed")?;

        to_json(&EditAndExportResult { edit, export })
    }
}
