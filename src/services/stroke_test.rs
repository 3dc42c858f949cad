use super::*;
use serde_json::json;

fn brush_json() -> Value {
    json!({
        "tool": "brush",
        "lineWidth": 4,
        "from": {"x": 10, "y": 20},
        "to": {"x": 30.5, "y": 40},
        "color": "#000000",
    })
}

// =============================================================================
// parse_operation: accepted shapes
// =============================================================================

#[test]
fn parse_brush() {
    let op = parse_operation(&brush_json()).expect("valid brush");
    assert_eq!(op.tool, Tool::Brush);
    assert!((op.line_width - 4.0).abs() < f64::EPSILON);
    assert_eq!(op.from, Point { x: 10.0, y: 20.0 });
    assert_eq!(op.to, Point { x: 30.5, y: 40.0 });
    assert_eq!(op.color.as_deref(), Some("#000000"));
}

#[test]
fn parse_eraser_without_color() {
    let raw = json!({"tool": "eraser", "lineWidth": 20, "from": {"x": 0, "y": 0}, "to": {"x": 1, "y": 1}});
    let op = parse_operation(&raw).expect("valid eraser");
    assert_eq!(op.tool, Tool::Eraser);
    assert!(op.color.is_none());
}

#[test]
fn parse_eraser_drops_color() {
    let raw = json!({
        "tool": "eraser", "lineWidth": 20,
        "from": {"x": 0, "y": 0}, "to": {"x": 1, "y": 1},
        "color": "#ff0000",
    });
    let op = parse_operation(&raw).expect("valid eraser");
    assert!(op.color.is_none());
}

#[test]
fn line_width_bounds_are_inclusive() {
    for width in [1, 100] {
        let mut raw = brush_json();
        raw["lineWidth"] = json!(width);
        assert!(parse_operation(&raw).is_ok(), "width {width} should be accepted");
    }
}

#[test]
fn extra_fields_are_discarded() {
    let mut raw = brush_json();
    raw["pressure"] = json!(0.7);
    let op = parse_operation(&raw).expect("valid");
    let out = serde_json::to_value(&op).expect("serialize");
    assert!(out.get("pressure").is_none());
    assert_eq!(out["lineWidth"], json!(4.0));
}

// =============================================================================
// parse_operation: rejections
// =============================================================================

#[test]
fn reject_line_width_too_large() {
    let mut raw = brush_json();
    raw["lineWidth"] = json!(500);
    assert_eq!(parse_operation(&raw), Err(ValidationError::LineWidthOutOfRange(500.0)));
}

#[test]
fn reject_line_width_too_small() {
    let mut raw = brush_json();
    raw["lineWidth"] = json!(0.5);
    assert_eq!(parse_operation(&raw), Err(ValidationError::LineWidthOutOfRange(0.5)));
}

#[test]
fn reject_unknown_tool() {
    let mut raw = brush_json();
    raw["tool"] = json!("spray");
    assert!(matches!(parse_operation(&raw), Err(ValidationError::UnknownTool(_))));
}

#[test]
fn reject_missing_tool() {
    let mut raw = brush_json();
    raw.as_object_mut().expect("object").remove("tool");
    assert_eq!(parse_operation(&raw), Err(ValidationError::MissingField("tool")));
}

#[test]
fn reject_brush_without_color() {
    let mut raw = brush_json();
    raw.as_object_mut().expect("object").remove("color");
    assert_eq!(parse_operation(&raw), Err(ValidationError::MissingColor));
}

#[test]
fn reject_brush_with_empty_color() {
    let mut raw = brush_json();
    raw["color"] = json!("");
    assert_eq!(parse_operation(&raw), Err(ValidationError::MissingColor));
}

#[test]
fn reject_non_numeric_coordinate() {
    let mut raw = brush_json();
    raw["from"]["x"] = json!("10");
    assert_eq!(parse_operation(&raw), Err(ValidationError::NotNumeric("x")));
}

#[test]
fn reject_missing_endpoint() {
    let mut raw = brush_json();
    raw.as_object_mut().expect("object").remove("to");
    assert_eq!(parse_operation(&raw), Err(ValidationError::MissingField("to")));
}

#[test]
fn reject_non_object_payload() {
    assert_eq!(parse_operation(&json!([1, 2])), Err(ValidationError::NotAnObject("operation")));
    assert_eq!(parse_operation(&Value::Null), Err(ValidationError::NotAnObject("operation")));
}

// =============================================================================
// Operation::check
// =============================================================================

#[test]
fn check_rejects_non_finite_coordinates() {
    let mut op = parse_operation(&brush_json()).expect("valid");
    op.to.y = f64::NAN;
    assert_eq!(op.check(), Err(ValidationError::NotFinite("to")));
}

#[test]
fn check_rejects_brush_without_color() {
    let mut op = parse_operation(&brush_json()).expect("valid");
    op.color = None;
    assert_eq!(op.check(), Err(ValidationError::MissingColor));
}

// =============================================================================
// parse_cursor
// =============================================================================

#[test]
fn parse_cursor_position() {
    let p = parse_cursor(&json!({"pos": {"x": 5, "y": -3.25}})).expect("valid cursor");
    assert_eq!(p, Point { x: 5.0, y: -3.25 });
}

#[test]
fn reject_cursor_without_pos() {
    assert_eq!(parse_cursor(&json!({"x": 1, "y": 2})), Err(ValidationError::MissingField("pos")));
}

#[test]
fn reject_cursor_with_string_coordinate() {
    assert_eq!(
        parse_cursor(&json!({"pos": {"x": 1, "y": "2"}})),
        Err(ValidationError::NotNumeric("y"))
    );
}
