//! Calendar tools exposed to MCP clients and their dispatch.

use crate::components::OutlookCalendarHandle;
use crate::error::{validation_error, CalendarResult};
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde_json::Value;
use std::sync::Arc;

// Export submodules
pub mod calendar;

use calendar::{
    parse_args, CreateEventArgs, EventIdArgs, ListEventsArgs, SearchEventsArgs, UpdateEventArgs,
};

/// The six calendar tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarTool {
    ListEvents,
    GetEvent,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    SearchEvents,
}

impl CalendarTool {
    pub const ALL: [CalendarTool; 6] = [
        CalendarTool::ListEvents,
        CalendarTool::GetEvent,
        CalendarTool::CreateEvent,
        CalendarTool::UpdateEvent,
        CalendarTool::DeleteEvent,
        CalendarTool::SearchEvents,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CalendarTool::ListEvents => "outlook_list_events",
            CalendarTool::GetEvent => "outlook_get_event",
            CalendarTool::CreateEvent => "outlook_create_event",
            CalendarTool::UpdateEvent => "outlook_update_event",
            CalendarTool::DeleteEvent => "outlook_delete_event",
            CalendarTool::SearchEvents => "outlook_search_events",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            CalendarTool::ListEvents => "List calendar events from Outlook. Optionally filter by date range (ISO 8601 format: YYYY-MM-DDTHH:mm:ss)",
            CalendarTool::GetEvent => "Get details of a specific calendar event by ID",
            CalendarTool::CreateEvent => "Create a new calendar event in Outlook",
            CalendarTool::UpdateEvent => "Update an existing calendar event",
            CalendarTool::DeleteEvent => "Delete a calendar event from Outlook",
            CalendarTool::SearchEvents => "Search calendar events by query string (searches in subject and body)",
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            CalendarTool::ListEvents => schema::<ListEventsArgs>(),
            CalendarTool::GetEvent | CalendarTool::DeleteEvent => schema::<EventIdArgs>(),
            CalendarTool::CreateEvent => schema::<CreateEventArgs>(),
            CalendarTool::UpdateEvent => schema::<UpdateEventArgs>(),
            CalendarTool::SearchEvents => schema::<SearchEventsArgs>(),
        }
    }

    /// The tool as advertised by `tools/list`
    pub fn definition(self) -> Tool {
        let input_schema = match self.input_schema() {
            Value::Object(object) => object,
            _ => JsonObject::new(),
        };
        Tool::new(self.name(), self.description(), Arc::new(input_schema))
    }
}

/// Text result of one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn success(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn error(message: impl std::fmt::Display) -> Self {
        Self {
            text: format!("Error: {}", message),
            is_error: true,
        }
    }
}

/// All application tools
pub fn get_all_tools() -> Vec<Tool> {
    CalendarTool::ALL.into_iter().map(CalendarTool::definition).collect()
}

/// Route a tool call to the calendar and render the outcome as text.
///
/// Failures never escape: they come back as an error-flagged output so the
/// server keeps serving.
pub async fn dispatch(
    handle: &OutlookCalendarHandle,
    name: &str,
    arguments: Option<Value>,
) -> ToolOutput {
    let result = match CalendarTool::from_name(name) {
        Some(tool) => run_tool(handle, tool, arguments).await,
        None => Err(validation_error(&format!("Unknown tool: {}", name))),
    };

    let rendered = result.and_then(|value| Ok(serde_json::to_string_pretty(&value)?));
    match rendered {
        Ok(text) => ToolOutput::success(text),
        Err(e) => {
            tracing::warn!(tool = name, error = %e, "tool call failed");
            ToolOutput::error(e)
        }
    }
}

async fn run_tool(
    handle: &OutlookCalendarHandle,
    tool: CalendarTool,
    arguments: Option<Value>,
) -> CalendarResult<Value> {
    let name = tool.name();
    match tool {
        CalendarTool::ListEvents => calendar::list_events(handle, parse_args(name, arguments)?).await,
        CalendarTool::GetEvent => calendar::get_event(handle, parse_args(name, arguments)?).await,
        CalendarTool::CreateEvent => {
            calendar::create_event(handle, parse_args(name, arguments)?).await
        }
        CalendarTool::UpdateEvent => {
            calendar::update_event(handle, parse_args(name, arguments)?).await
        }
        CalendarTool::DeleteEvent => {
            calendar::delete_event(handle, parse_args(name, arguments)?).await
        }
        CalendarTool::SearchEvents => {
            calendar::search_events(handle, parse_args(name, arguments)?).await
        }
    }
}

/// JSON Schema of a tool's argument type, without the meta-schema header
fn schema<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}
