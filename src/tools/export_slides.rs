use crate::error::ToolError;
use crate::input::{SlideNumber, decode, optional_text, parse_slide_number, require_text};
use crate::mcp::contracts::{EXPORT_SLIDES_FIELDS, TOOL_EXPORT_SLIDES, object_schema};
use crate::pipeline::{self, ExportedSlide, Pipeline};
use crate::tools::{Tool, ToolEnv, to_json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub struct ExportSlides;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSlidesInput {
    pub presentation_path: String,
    pub slide_numbers: Option<Vec<i64>>,
    pub output_dir: Option<String>,
}

#[derive(Debug)]
pub struct ExportRequest<'a> {
    pub presentation_path: &'a str,
    pub slides: Option<Vec<SlideNumber>>,
    pub output_dir: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub output_dir: String,
    pub slide_count: usize,
    pub slides: Vec<ExportedSlide>,
}

impl ExportSlidesInput {
    pub fn validate(&self) -> Result<ExportRequest<'_>, ToolError> {
        let presentation_path = require_text("presentation_path", &self.presentation_path)?;
        let slides = self
            .slide_numbers
            .as_ref()
            .filter(|numbers| !numbers.is_empty())
            .map(|numbers| {
                numbers
                    .iter()
                    .map(|number| parse_slide_number("slide_numbers", *number))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        let output_dir = optional_text("output_dir", self.output_dir.as_deref())?;
        Ok(ExportRequest {
            presentation_path,
            slides,
            output_dir,
        })
    }
}

/// Renders the whole presentation and returns the requested slides.
pub fn export(
    env: &ToolEnv,
    presentation_path: &str,
    slides: Option<&[SlideNumber]>,
    output_dir: &Path,
) -> Result<ExportResult, ToolError> {
    let images = Pipeline::new(&env.config, env.runner.as_ref())
        .convert(Path::new(presentation_path), output_dir)?;
    let selected = pipeline::select(&images, slides)?;
    Ok(ExportResult {
        output_dir: output_dir.to_string_lossy().into_owned(),
        slide_count: images.len(),
        slides: selected,
    })
}

impl Tool for ExportSlides {
    fn name(&self) -> &'static str {
        TOOL_EXPORT_SLIDES
    }

    fn description(&self) -> &'static str {
        "Export slides as JPEG images (150 DPI) so they can be looked at.\n\n\
         The presentation is rendered to PDF and rasterized into slide-001.jpg, \
         slide-002.jpg, ... in output_dir (default: the configured output directory). \
         Existing images with the same names are overwritten. Pass slide_numbers \
         (1-based) to return only some slides; numbers past the end of the \
         presentation are an error."
    }

    fn input_schema(&self) -> Value {
        object_schema(EXPORT_SLIDES_FIELDS)
    }

    fn invoke(&self, env: &ToolEnv, args: &Value) -> Result<String, ToolError> {
        let input: ExportSlidesInput = decode(args)?;
        let request = input.validate()?;
        let output_dir: PathBuf = env.config.export_dir(request.output_dir);
        let result = export(
            env,
            request.presentation_path,
            request.slides.as_deref(),
            &output_dir,
        )?;
        to_json(&result)
    }
}
