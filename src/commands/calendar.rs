use crate::components::outlook_calendar::{EventUpdate, NewEvent, OutlookCalendarHandle};
use crate::error::{validation_error, CalendarResult};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments of `outlook_list_events`
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsArgs {
    /// Start date/time in ISO 8601 format (e.g., "2024-01-01T00:00:00")
    pub start_date: Option<String>,
    /// End date/time in ISO 8601 format (e.g., "2024-12-31T23:59:59")
    pub end_date: Option<String>,
}

/// Arguments of the tools that address one event
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventIdArgs {
    /// The EntryID of the event
    pub event_id: String,
}

/// Arguments of `outlook_create_event`
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventArgs {
    /// The title/subject of the event
    pub subject: String,
    /// Start date/time in ISO 8601 format
    pub start: String,
    /// End date/time in ISO 8601 format
    pub end: String,
    /// Event description/body
    pub body: Option<String>,
    /// Event location
    pub location: Option<String>,
    /// List of attendee email addresses
    pub attendees: Option<Vec<String>>,
    /// Whether this is an all-day event
    #[serde(default)]
    pub is_all_day: bool,
}

/// Arguments of `outlook_update_event`
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventArgs {
    /// The EntryID of the event to update
    pub event_id: String,
    /// The title/subject of the event
    pub subject: Option<String>,
    /// Start date/time in ISO 8601 format
    pub start: Option<String>,
    /// End date/time in ISO 8601 format
    pub end: Option<String>,
    /// Event description/body
    pub body: Option<String>,
    /// Event location
    pub location: Option<String>,
}

/// Arguments of `outlook_search_events`
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchEventsArgs {
    /// Search query to find events
    pub query: String,
}

impl From<CreateEventArgs> for NewEvent {
    fn from(args: CreateEventArgs) -> Self {
        NewEvent {
            subject: args.subject,
            start: args.start,
            end: args.end,
            body: args.body,
            location: args.location,
            attendees: args.attendees.unwrap_or_default(),
            is_all_day: args.is_all_day,
        }
    }
}

impl UpdateEventArgs {
    fn into_parts(self) -> (String, EventUpdate) {
        let update = EventUpdate {
            subject: self.subject,
            start: self.start,
            end: self.end,
            body: self.body,
            location: self.location,
        };
        (self.event_id, update)
    }
}

/// Deserialize tool arguments, treating a missing object as empty
pub fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Option<Value>) -> CalendarResult<T> {
    let arguments = match arguments {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(arguments) => arguments,
    };
    serde_json::from_value(arguments)
        .map_err(|e| validation_error(&format!("invalid arguments for {}: {}", tool, e)))
}

fn to_value<T: Serialize>(result: T) -> CalendarResult<Value> {
    Ok(serde_json::to_value(result)?)
}

pub async fn list_events(handle: &OutlookCalendarHandle, args: ListEventsArgs) -> CalendarResult<Value> {
    to_value(handle.list_events(args.start_date, args.end_date).await?)
}

pub async fn get_event(handle: &OutlookCalendarHandle, args: EventIdArgs) -> CalendarResult<Value> {
    to_value(handle.get_event(args.event_id).await?)
}

pub async fn create_event(
    handle: &OutlookCalendarHandle,
    args: CreateEventArgs,
) -> CalendarResult<Value> {
    to_value(handle.create_event(args.into()).await?)
}

pub async fn update_event(
    handle: &OutlookCalendarHandle,
    args: UpdateEventArgs,
) -> CalendarResult<Value> {
    let (event_id, update) = args.into_parts();
    to_value(handle.update_event(event_id, update).await?)
}

pub async fn delete_event(handle: &OutlookCalendarHandle, args: EventIdArgs) -> CalendarResult<Value> {
    to_value(handle.delete_event(args.event_id).await?)
}

pub async fn search_events(
    handle: &OutlookCalendarHandle,
    args: SearchEventsArgs,
) -> CalendarResult<Value> {
    to_value(handle.search_events(args.query).await?)
}
