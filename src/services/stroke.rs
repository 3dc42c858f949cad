//! Stroke model and shape validation.
//!
//! DESIGN
//! ======
//! A stroke (operation) is one brush or eraser segment between two points.
//! The server never interprets geometry; it only checks shape before any
//! state is touched. Validation walks the raw JSON by hand so every rejection
//! carries a typed reason instead of a generic serde message.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::frame::ErrorCode;

pub const MIN_LINE_WIDTH: f64 = 1.0;
pub const MAX_LINE_WIDTH: f64 = 100.0;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Brush,
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One immutable drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub tool: Tool,
    pub line_width: f64,
    pub from: Point,
    pub to: Point,
    /// Present only for `Tool::Brush`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must be an object")]
    NotAnObject(&'static str),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("field {0} must be a number")]
    NotNumeric(&'static str),
    #[error("field {0} must be finite")]
    NotFinite(&'static str),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("lineWidth {0} outside [1, 100]")]
    LineWidthOutOfRange(f64),
    #[error("brush operation requires a color")]
    MissingColor,
}

impl ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        "E_INVALID_OPERATION"
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

impl Operation {
    /// Re-check the shape rules on an already-typed operation.
    ///
    /// # Errors
    ///
    /// Returns the first rule the operation violates.
    pub fn check(&self) -> Result<(), ValidationError> {
        check_finite(self.line_width, "lineWidth")?;
        if !(MIN_LINE_WIDTH..=MAX_LINE_WIDTH).contains(&self.line_width) {
            return Err(ValidationError::LineWidthOutOfRange(self.line_width));
        }
        check_point(self.from, "from")?;
        check_point(self.to, "to")?;
        match (self.tool, self.color.as_deref()) {
            (Tool::Brush, None | Some("")) => Err(ValidationError::MissingColor),
            _ => Ok(()),
        }
    }
}

/// Parse and validate a raw `DRAW` payload.
///
/// # Errors
///
/// Returns a `ValidationError` naming the offending field.
pub fn parse_operation(value: &Value) -> Result<Operation, ValidationError> {
    let obj = value
        .as_object()
        .ok_or(ValidationError::NotAnObject("operation"))?;

    let tool = match obj.get("tool") {
        None => return Err(ValidationError::MissingField("tool")),
        Some(Value::String(s)) if s == "brush" => Tool::Brush,
        Some(Value::String(s)) if s == "eraser" => Tool::Eraser,
        Some(other) => return Err(ValidationError::UnknownTool(other.to_string())),
    };

    let line_width = number(obj, "lineWidth")?;
    let from = point(obj.get("from"), "from")?;
    let to = point(obj.get("to"), "to")?;

    // Eraser strokes never carry a color, even if the client sent one.
    let color = match tool {
        Tool::Brush => match obj.get("color").and_then(Value::as_str) {
            Some(c) if !c.is_empty() => Some(c.to_owned()),
            _ => return Err(ValidationError::MissingColor),
        },
        Tool::Eraser => None,
    };

    let op = Operation { tool, line_width, from, to, color };
    op.check()?;
    Ok(op)
}

/// Parse and validate a raw `CURSOR_MOVE` payload (`{pos: {x, y}}`).
///
/// # Errors
///
/// Returns a `ValidationError` if `pos` is missing or malformed.
pub fn parse_cursor(value: &Value) -> Result<Point, ValidationError> {
    let obj = value
        .as_object()
        .ok_or(ValidationError::NotAnObject("cursor"))?;
    point(obj.get("pos"), "pos")
}

// =============================================================================
// HELPERS
// =============================================================================

fn number(obj: &Map<String, Value>, field: &'static str) -> Result<f64, ValidationError> {
    let value = obj.get(field).ok_or(ValidationError::MissingField(field))?;
    let n = value.as_f64().ok_or(ValidationError::NotNumeric(field))?;
    check_finite(n, field)?;
    Ok(n)
}

fn point(value: Option<&Value>, field: &'static str) -> Result<Point, ValidationError> {
    let obj = value
        .ok_or(ValidationError::MissingField(field))?
        .as_object()
        .ok_or(ValidationError::NotAnObject(field))?;
    Ok(Point { x: number(obj, "x")?, y: number(obj, "y")? })
}

fn check_point(p: Point, field: &'static str) -> Result<(), ValidationError> {
    check_finite(p.x, field)?;
    check_finite(p.y, field)
}

fn check_finite(n: f64, field: &'static str) -> Result<(), ValidationError> {
    if n.is_finite() { Ok(()) } else { Err(ValidationError::NotFinite(field)) }
}

#[cfg(test)]
#[path = "stroke_test.rs"]
mod tests;
