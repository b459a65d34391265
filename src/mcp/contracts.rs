use serde_json::{Map, Value, json};

pub const PROTOCOL_VERSION: &str = "2025-11-25";

pub const TOOL_LIST_SLIDES: &str = "list_slides";
pub const TOOL_READ_SLIDE: &str = "read_slide";
pub const TOOL_EDIT_SLIDE_TEXT: &str = "edit_slide_text";
pub const TOOL_EXPORT_SLIDES: &str = "export_slides";
pub const TOOL_EDIT_SLIDE_AND_EXPORT: &str = "edit_slide_and_export";

pub const LIST_SLIDES_SCRIPT: &str = "uno_list_slides.py";
pub const READ_SLIDE_SCRIPT: &str = "uno_read_slide.py";
pub const EDIT_SLIDE_SCRIPT: &str = "uno_edit_slide.py";

pub const DEFAULT_OUTPUT_DIR: &str = "slides";
pub const DEFAULT_DENSITY: u32 = 150;
/// Rasterizer output pattern; the zero padding keeps lexical order equal to slide order.
pub const IMAGE_PATTERN: &str = "slide-%03d.jpg";
pub const IMAGE_GLOB: &str = "slide-*.jpg";

pub const TARGET_TEXT_REPLACE: &str = "text_replace";
pub const TARGET_TYPES: &[&str] = &["title", "shape_index", "shape_name", TARGET_TEXT_REPLACE];

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Path,
    SlideNumber,
    SlideNumberList,
    Text,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
    pub description: &'static str,
}

const PRESENTATION_PATH: FieldSpec = FieldSpec {
    name: "presentation_path",
    required: true,
    kind: FieldKind::Path,
    description: "Path to the PowerPoint (.pptx) file",
};

const SLIDE_NUMBER: FieldSpec = FieldSpec {
    name: "slide_number",
    required: true,
    kind: FieldKind::SlideNumber,
    description: "Slide number (1-based)",
};

const OUTPUT_DIR: FieldSpec = FieldSpec {
    name: "output_dir",
    required: false,
    kind: FieldKind::Path,
    description: "Directory for the exported images (default: the configured output directory)",
};

const EDIT_FIELDS: [FieldSpec; 6] = [
    PRESENTATION_PATH,
    SLIDE_NUMBER,
    FieldSpec {
        name: "target_type",
        required: true,
        kind: FieldKind::Choice(TARGET_TYPES),
        description: "How the shape to edit is located",
    },
    FieldSpec {
        name: "target_value",
        required: true,
        kind: FieldKind::Text,
        description: "Shape locator: title text, shape index, shape name, or the shape whose text is replaced",
    },
    FieldSpec {
        name: "new_text",
        required: true,
        kind: FieldKind::Text,
        description: "Replacement text",
    },
    FieldSpec {
        name: "old_text",
        required: false,
        kind: FieldKind::Text,
        description: "Text to replace; required when target_type is text_replace",
    },
];

pub const LIST_SLIDES_FIELDS: &[FieldSpec] = &[PRESENTATION_PATH];

pub const READ_SLIDE_FIELDS: &[FieldSpec] = &[PRESENTATION_PATH, SLIDE_NUMBER];

pub const EDIT_SLIDE_TEXT_FIELDS: &[FieldSpec] = &EDIT_FIELDS;

pub const EXPORT_SLIDES_FIELDS: &[FieldSpec] = &[
    PRESENTATION_PATH,
    FieldSpec {
        name: "slide_numbers",
        required: false,
        kind: FieldKind::SlideNumberList,
        description: "Slides to return (1-based); all slides when omitted",
    },
    OUTPUT_DIR,
];

pub const EDIT_SLIDE_AND_EXPORT_FIELDS: &[FieldSpec] = &[
    EDIT_FIELDS[0],
    EDIT_FIELDS[1],
    EDIT_FIELDS[2],
    EDIT_FIELDS[3],
    EDIT_FIELDS[4],
    EDIT_FIELDS[5],
    OUTPUT_DIR,
];

fn field_schema(field: &FieldSpec) -> Value {
    let mut schema = match field.kind {
        FieldKind::Path | FieldKind::Text => json!({ "type": "string" }),
        FieldKind::SlideNumber => json!({ "type": "integer", "minimum": 1 }),
        FieldKind::SlideNumberList => json!({
            "type": "array",
            "items": { "type": "integer", "minimum": 1 }
        }),
        FieldKind::Choice(values) => json!({ "type": "string", "enum": values }),
    };
    if let Some(obj) = schema.as_object_mut() {
        obj.insert("description".to_string(), json!(field.description));
    }
    schema
}

pub fn object_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        properties.insert(field.name.to_string(), field_schema(field));
    }
    let required: Vec<&str> = fields
        .iter()
        .filter(|field| field.required)
        .map(|field| field.name)
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

/// Edit schemas additionally require `old_text` for text replacement.
pub fn edit_schema(fields: &[FieldSpec]) -> Value {
    let mut schema = object_schema(fields);
    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "allOf".to_string(),
            json!([{
                "if": {
                    "properties": { "target_type": { "const": TARGET_TEXT_REPLACE } },
                    "required": ["target_type"]
                },
                "then": { "required": ["old_text"] }
            }]),
        );
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_list_follows_field_table() {
        let schema = object_schema(READ_SLIDE_FIELDS);
        assert_eq!(
            schema.get("required"),
            Some(&json!(["presentation_path", "slide_number"]))
        );
        assert_eq!(
            schema.pointer("/properties/slide_number/minimum"),
            Some(&json!(1))
        );
    }

    #[test]
    fn export_fields_are_optional_except_path() {
        let schema = object_schema(EXPORT_SLIDES_FIELDS);
        assert_eq!(schema.get("required"), Some(&json!(["presentation_path"])));
        assert_eq!(
            schema.pointer("/properties/slide_numbers/type"),
            Some(&json!("array"))
        );
    }

    #[test]
    fn edit_schema_requires_old_text_for_replace() {
        let schema = edit_schema(EDIT_SLIDE_TEXT_FIELDS);
        assert_eq!(
            schema.pointer("/allOf/0/then/required"),
            Some(&json!(["old_text"]))
        );
        assert_eq!(
            schema.pointer("/properties/target_type/enum"),
            Some(&json!(TARGET_TYPES))
        );
    }
}
