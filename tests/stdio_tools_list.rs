use std::collections::HashSet;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

#[test]
fn tools_list_includes_expected_tools() -> Result<(), Box<dyn std::error::Error>> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_mcp-slides"))
        .args(["serve", "--stdio"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;

    let mut stdin = child.stdin.take().expect("stdin available");
    let mut stdout = BufReader::new(child.stdout.take().expect("stdout available"));

    // Blank lines, garbage, and notifications produce no response.
    writeln!(stdin)?;
    writeln!(stdin, "not json")?;
    writeln!(
        stdin,
        "{}",
        serde_json::json!({"jsonrpc": "2.0", "method": "notifications/initialized"})
    )?;

    let request = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/list",
        "params": {}
    });
    let serialized = serde_json::to_string(&request)?;
    writeln!(stdin, "{serialized}")?;
    stdin.flush()?;

    let mut line = String::new();
    stdout.read_line(&mut line)?;

    let response: serde_json::Value = serde_json::from_str(line.trim())?;
    assert_eq!(response.get("id").and_then(|v| v.as_i64()), Some(2));
    let tools = response
        .get("result")
        .and_then(|value| value.get("tools"))
        .and_then(|value| value.as_array())
        .expect("tools array present");

    let names: HashSet<&str> = tools
        .iter()
        .filter_map(|tool| tool.get("name").and_then(|value| value.as_str()))
        .collect();

    let expected: HashSet<&str> = [
        "list_slides",
        "read_slide",
        "edit_slide_text",
        "export_slides",
        "edit_slide_and_export",
    ]
    .into_iter()
    .collect();

    assert_eq!(names, expected);

    let edit = tools
        .iter()
        .find(|tool| tool.get("name").and_then(|v| v.as_str()) == Some("edit_slide_text"))
        .expect("edit tool present");
    let required = edit
        .pointer("/inputSchema/required")
        .and_then(|v| v.as_array())
        .expect("required list");
    assert_eq!(required.len(), 5);

    let _ = child.kill();
    Ok(())
}
