use crate::error::ToolError;
use crate::process::CapturedOutput;
use serde_json::Value;

/// Confirms a script's captured output is one JSON document and hands it back untouched.
pub fn json_output(output: CapturedOutput) -> Result<String, ToolError> {
    serde_json::from_slice::<Value>(&output.bytes)
        .map_err(|source| ToolError::OutputFormat { source })?;
    // serde_json has already rejected invalid UTF-8.
    Ok(output.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::errors;
    use crate::process::fake::captured;

    #[test]
    fn passes_payload_through_verbatim() {
        let payload = "{ \"slides\": [ {\"number\": 1, \"title\": \"Hello\"} ] }\n";
        assert_eq!(json_output(captured(payload)).expect("valid"), payload);
    }

    #[test]
    fn rejects_garbage_as_output_format_error() {
        let err = json_output(captured("not json")).expect_err("error");
        assert!(matches!(err, ToolError::OutputFormat { .. }));
        assert_eq!(err.kind(), errors::INVALID_OUTPUT);
    }

    #[test]
    fn rejects_trailing_chatter() {
        let err = json_output(captured("{\"ok\": true}\nSaving document...")).expect_err("error");
        assert_eq!(err.kind(), errors::INVALID_OUTPUT);
    }

    #[test]
    fn diagnostics_in_the_capture_fail_validation() {
        let output = captured("warning: font substituted\n[1, 2]");
        let err = json_output(output).expect_err("error");
        assert_eq!(err.kind(), errors::INVALID_OUTPUT);
    }
}
