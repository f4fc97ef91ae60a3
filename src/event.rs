use serde_json::{json, Value};

pub const ENTERED: &str = "entered";
pub const UPDATED: &str = "updated";
pub const EXITED: &str = "exited";
/// Wire name of the drop-completed message.
pub const PERFORM_OPERATION: &str = "performOperation";

/// A position in window client coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropEvent {
    /// The pointer entered the window carrying a payload. `files` holds base
    /// names and is empty for non-file payloads.
    Entered { point: Point, files: Vec<String> },
    /// The pointer moved inside the window. `files` is the list captured on
    /// enter.
    Updated { point: Point, files: Vec<String> },
    Exited,
    /// The payload was released. `paths` are full paths in OS order.
    DropCompleted { paths: Vec<String> },
}

impl DropEvent {
    pub fn method(&self) -> &'static str {
        match self {
            DropEvent::Entered { .. } => ENTERED,
            DropEvent::Updated { .. } => UPDATED,
            DropEvent::Exited => EXITED,
            DropEvent::DropCompleted { .. } => PERFORM_OPERATION,
        }
    }

    /// Positional arguments as sent over the channel.
    pub fn arguments(&self) -> Value {
        match self {
            DropEvent::Entered { point, files } | DropEvent::Updated { point, files } => {
                let mut args = vec![json!(point.x), json!(point.y)];
                if !files.is_empty() {
                    args.push(json!(files));
                }
                Value::Array(args)
            }
            DropEvent::Exited => Value::Array(Vec::new()),
            DropEvent::DropCompleted { paths } => json!([paths]),
        }
    }
}
