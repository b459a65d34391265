use crate::config::Config;
use crate::error::ToolError;
use crate::process::{Invocation, ProcessRunner, SystemRunner};
use crate::validate;
use serde_json::{Value, json};

pub mod edit_slide_and_export;
pub mod edit_slide_text;
pub mod export_slides;
pub mod list_slides;
pub mod read_slide;
pub mod registry;

pub use registry::ToolRegistry;

/// A named operation callers can select. Implementations validate their own
/// input before anything external runs.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    fn invoke(&self, env: &ToolEnv, args: &Value) -> Result<String, ToolError>;
}

/// Everything a tool may touch outside its own input.
pub struct ToolEnv {
    pub config: Config,
    pub runner: Box<dyn ProcessRunner>,
}

impl ToolEnv {
    pub fn new(config: Config) -> Self {
        let runner = SystemRunner::new(config.timeout);
        Self::with_runner(config, Box::new(runner))
    }

    pub fn with_runner(config: Config, runner: Box<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// Runs an automation script and returns its validated JSON output.
    pub fn run_script(&self, invocation: &Invocation) -> Result<String, ToolError> {
        let output = self.runner.run(invocation)?;
        validate::json_output(output)
    }
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string(value).map_err(ToolError::Serialize)
}

pub fn success_result(text: String) -> Value {
    let mut result = json!({
        "content": [{"type": "text", "text": text}],
        "isError": false
    });

    if let Ok(structured @ Value::Object(_)) = serde_json::from_str::<Value>(&text)
        && let Some(obj) = result.as_object_mut()
    {
        obj.insert("structuredContent".to_string(), structured);
    }

    result
}

pub fn error_result(
    kind: &'static str,
    message: impl Into<String>,
    source: Option<&str>,
) -> Value {
    let message = message.into();
    let mut error = json!({
        "kind": kind,
        "message": message,
    });

    if let Some(source) = source
        && let Some(obj) = error.as_object_mut()
    {
        obj.insert("source".to_string(), json!(source));
    }

    json!({
        "content": [{"type": "text", "text": format!("Error: {message}")}],
        "structuredContent": {"error": error},
        "isError": true
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::pipeline::expected_pdf;
    use crate::process::CapturedOutput;
    use crate::process::fake::{RecordingRunner, captured};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Shares the runner so tests can inspect calls after the env takes it.
    pub struct SharedRunner(pub Arc<RecordingRunner>);

    impl ProcessRunner for SharedRunner {
        fn run(
            &self,
            invocation: &Invocation,
        ) -> Result<crate::process::CapturedOutput, ToolError> {
            self.0.run(invocation)
        }
    }

    pub fn env_with(runner: RecordingRunner) -> (ToolEnv, Arc<RecordingRunner>) {
        env_with_config(Config::default(), runner)
    }

    pub fn env_with_config(
        config: Config,
        runner: RecordingRunner,
    ) -> (ToolEnv, Arc<RecordingRunner>) {
        let runner = Arc::new(runner);
        let env = ToolEnv::with_runner(config, Box::new(SharedRunner(Arc::clone(&runner))));
        (env, runner)
    }

    /// Stands in for the renderer and rasterizer, producing `pages` images.
    /// Any other program is treated as a successful automation script.
    pub fn fake_converter(pages: usize) -> RecordingRunner {
        RecordingRunner::with_responder(move |invocation| {
            match invocation.program.as_str() {
                "libreoffice" => {
                    let pdf = expected_pdf(
                        Path::new(&invocation.args[5]),
                        Path::new(&invocation.args[4]),
                    )?;
                    fs::write(pdf, b"%PDF-1.7").expect("write pdf");
                    Ok(CapturedOutput::default())
                }
                "convert" => {
                    let pattern = PathBuf::from(&invocation.args[3]);
                    let dir = pattern.parent().expect("parent").to_path_buf();
                    for page in 1..=pages {
                        fs::write(dir.join(format!("slide-{page:03}.jpg")), b"jpg")
                            .expect("write jpg");
                    }
                    Ok(CapturedOutput::default())
                }
                _ => Ok(captured("{\"success\": true}")),
            }
        })
    }

    /// Property names of an input schema next to the field names of its record.
    pub fn schema_and_record_fields<T: serde::Serialize>(
        schema: &Value,
        record: &T,
    ) -> (Vec<String>, Vec<String>) {
        let declared = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default();
        let actual = serde_json::to_value(record)
            .ok()
            .and_then(|value| value.as_object().map(|obj| obj.keys().cloned().collect()))
            .unwrap_or_default();
        (declared, actual)
    }
}
