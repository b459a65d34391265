//! Presentation → PDF → JPEG conversion.
//!
//! The renderer writes `<stem>.pdf` into a private temporary directory, the
//! rasterizer expands that PDF into `slide-NNN.jpg` files in the output
//! directory, and the result is whatever matches `slide-*.jpg` afterwards.
//! Existing images in the output directory are overwritten by name and never
//! cleared.

use crate::config::Config;
use crate::error::{ResultExt, ToolError};
use crate::input::SlideNumber;
use crate::mcp::contracts::{IMAGE_GLOB, IMAGE_PATTERN};
use crate::process::{Invocation, ProcessRunner};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedSlide {
    pub slide_number: u32,
    pub path: String,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    runner: &'a dyn ProcessRunner,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, runner: &'a dyn ProcessRunner) -> Self {
        Self { config, runner }
    }

    /// Returns every produced image, in slide order.
    pub fn convert(&self, source: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, ToolError> {
        fs::create_dir_all(output_dir).map_err(|err| {
            ToolError::io(
                format!("failed to create output directory {}", output_dir.display()),
                err,
            )
        })?;

        // Dropped on every return path, removing the intermediate PDF.
        let workspace = tempfile::Builder::new()
            .prefix("slides-pdf-")
            .tempdir()
            .map_err(|err| ToolError::io("failed to create temp directory", err))?;

        let pdf = self.render(source, workspace.path()).context("render stage")?;
        self.rasterize(&pdf, output_dir)
            .context("rasterize stage")?;
        discover(output_dir).context("discovery")
    }

    fn render(&self, source: &Path, workspace: &Path) -> Result<PathBuf, ToolError> {
        let pdf = expected_pdf(source, workspace)?;
        tracing::info!(source = %source.display(), "converting presentation to PDF");
        self.runner.run(&self.render_command(source, workspace))?;

        if !pdf.is_file() {
            return Err(ToolError::ArtifactMissing(format!(
                "PDF file not found at {}",
                pdf.display()
            )));
        }
        Ok(pdf)
    }

    fn rasterize(&self, pdf: &Path, output_dir: &Path) -> Result<(), ToolError> {
        tracing::info!(pdf = %pdf.display(), density = self.config.density, "rasterizing PDF");
        self.runner.run(&self.rasterize_command(pdf, output_dir))?;
        Ok(())
    }

    pub fn render_command(&self, source: &Path, workspace: &Path) -> Invocation {
        Invocation::new(&self.config.renderer)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(workspace.to_string_lossy())
            .arg(source.to_string_lossy())
    }

    pub fn rasterize_command(&self, pdf: &Path, output_dir: &Path) -> Invocation {
        Invocation::new(&self.config.rasterizer)
            .arg("-density")
            .arg(self.config.density.to_string())
            .arg(pdf.to_string_lossy())
            .arg(output_dir.join(IMAGE_PATTERN).to_string_lossy())
    }
}

/// The renderer names its output after the source file stem.
pub fn expected_pdf(source: &Path, workspace: &Path) -> Result<PathBuf, ToolError> {
    let stem = source
        .file_stem()
        .ok_or_else(|| ToolError::validation("presentation_path must name a file"))?;
    let mut name = stem.to_os_string();
    name.push(".pdf");
    Ok(workspace.join(name))
}

/// Relies on zero-padded names: glob yields paths in lexical order.
pub fn discover(output_dir: &Path) -> Result<Vec<PathBuf>, ToolError> {
    let escaped = glob::Pattern::escape(&output_dir.to_string_lossy());
    let pattern = Path::new(&escaped).join(IMAGE_GLOB);
    let pattern = pattern.to_string_lossy();

    let entries = glob::glob(&pattern).map_err(|err| {
        ToolError::io(
            format!("invalid image pattern {pattern}"),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, err.msg),
        )
    })?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| {
            ToolError::io(format!("failed to read {}", err.path().display()), err.into_error())
        })?;
        images.push(path);
    }

    if images.is_empty() {
        return Err(ToolError::ArtifactMissing(format!(
            "no images were generated in {}",
            output_dir.display()
        )));
    }
    tracing::info!(count = images.len(), "discovered slide images");
    Ok(images)
}

/// Pairs images with their slide numbers, keeping only `wanted` when given.
/// Numbers past the produced count are reported rather than dropped.
pub fn select(
    images: &[PathBuf],
    wanted: Option<&[SlideNumber]>,
) -> Result<Vec<ExportedSlide>, ToolError> {
    let numbered = images.iter().enumerate().map(|(index, path)| ExportedSlide {
        slide_number: u32::try_from(index + 1).unwrap_or(u32::MAX),
        path: path.to_string_lossy().into_owned(),
    });

    let Some(wanted) = wanted else {
        return Ok(numbered.collect());
    };

    let wanted: BTreeSet<SlideNumber> = wanted.iter().copied().collect();
    let missing: Vec<String> = wanted
        .iter()
        .filter(|number| number.index() >= images.len())
        .map(|number| number.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ToolError::validation(format!(
            "slide numbers out of range: {} (presentation has {} slides)",
            missing.join(", "),
            images.len()
        )));
    }

    let indices: BTreeSet<usize> = wanted.iter().map(|number| number.index()).collect();
    Ok(numbered
        .enumerate()
        .filter(|(index, _)| indices.contains(index))
        .map(|(_, slide)| slide)
        .collect())
}
