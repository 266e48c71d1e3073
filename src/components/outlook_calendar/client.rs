use super::models::{CalendarEvent, DeleteStatus, EventUpdate, NewEvent};
use crate::bridge::{Action, Params, ScriptRunner};
use crate::error::{validation_error, CalendarResult, Error};
use crate::utils::time::check_timestamp;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Separator the script expects between attendee addresses
pub const ATTENDEE_SEPARATOR: &str = ";";

/// Typed calendar operations on top of a [`ScriptRunner`]
#[derive(Clone)]
pub struct OutlookCalendarClient {
    runner: Arc<dyn ScriptRunner>,
}

impl OutlookCalendarClient {
    /// Create a client that runs actions through the given runner
    pub fn new(runner: Arc<dyn ScriptRunner>) -> Self {
        Self { runner }
    }

    /// List events, optionally limited to a date range
    pub async fn list_events(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        check_timestamp("startDate", start_date);
        check_timestamp("endDate", end_date);

        let params = list_params(start_date, end_date);
        let payload = self.runner.execute(Action::List, params).await?;
        events_from_payload(payload)
    }

    /// Get a single event by its EntryID
    pub async fn get_event(&self, event_id: &str) -> CalendarResult<CalendarEvent> {
        require("eventId", event_id)?;

        let params = Params::new().with("EventId", event_id);
        let payload = self.runner.execute(Action::Get, params).await?;
        from_payload(payload)
    }

    /// Create an event and return it as Outlook saved it
    pub async fn create_event(&self, event: &NewEvent) -> CalendarResult<CalendarEvent> {
        require("subject", &event.subject)?;
        require("start", &event.start)?;
        require("end", &event.end)?;
        check_timestamp("start", Some(&event.start));
        check_timestamp("end", Some(&event.end));

        let params = create_params(event);
        let payload = self.runner.execute(Action::Create, params).await?;
        from_payload(payload)
    }

    /// Apply the given changes to an existing event
    pub async fn update_event(
        &self,
        event_id: &str,
        update: &EventUpdate,
    ) -> CalendarResult<CalendarEvent> {
        require("eventId", event_id)?;
        check_timestamp("start", update.start.as_deref());
        check_timestamp("end", update.end.as_deref());

        if update.is_empty() {
            tracing::debug!(event_id, "update requested without any changed fields");
        }

        let params = update_params(event_id, update);
        let payload = self.runner.execute(Action::Update, params).await?;
        from_payload(payload)
    }

    /// Delete an event by its EntryID
    pub async fn delete_event(&self, event_id: &str) -> CalendarResult<DeleteStatus> {
        require("eventId", event_id)?;

        let params = Params::new().with("EventId", event_id);
        let payload = self.runner.execute(Action::Delete, params).await?;
        from_payload(payload)
    }

    /// Search subjects and bodies for the query text
    pub async fn search_events(&self, query: &str) -> CalendarResult<Vec<CalendarEvent>> {
        require("query", query)?;

        let params = Params::new().with("Query", query);
        let payload = self.runner.execute(Action::Search, params).await?;
        events_from_payload(payload)
    }
}

/// Parameter mapping for `list`
pub fn list_params(start_date: Option<&str>, end_date: Option<&str>) -> Params {
    Params::new()
        .with_opt("StartDate", start_date)
        .with_opt("EndDate", end_date)
}

/// Parameter mapping for `create`
pub fn create_params(event: &NewEvent) -> Params {
    let attendees = (!event.attendees.is_empty()).then(|| event.attendees.join(ATTENDEE_SEPARATOR));

    Params::new()
        .with("Subject", &event.subject)
        .with("StartDate", &event.start)
        .with("EndDate", &event.end)
        .with_opt("Body", event.body.as_deref())
        .with_opt("Location", event.location.as_deref())
        .with_opt("Attendees", attendees)
        // The script treats a missing switch as false
        .with_opt("IsAllDay", event.is_all_day.then_some(true))
}

/// Parameter mapping for `update`
pub fn update_params(event_id: &str, update: &EventUpdate) -> Params {
    Params::new()
        .with("EventId", event_id)
        .with_opt("Subject", update.subject.as_deref())
        .with_opt("StartDate", update.start.as_deref())
        .with_opt("EndDate", update.end.as_deref())
        .with_opt("Body", update.body.as_deref())
        .with_opt("Location", update.location.as_deref())
}

fn require(field: &str, value: &str) -> CalendarResult<()> {
    if value.trim().is_empty() {
        return Err(validation_error(&format!("{} is required", field)));
    }
    Ok(())
}

fn from_payload<T: DeserializeOwned>(payload: Value) -> CalendarResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| Error::Serialization(format!("unexpected script output: {}", e)))
}

/// PowerShell collapses one-element arrays into a bare object
fn events_from_payload(payload: Value) -> CalendarResult<Vec<CalendarEvent>> {
    match payload {
        Value::Array(_) => from_payload(payload),
        Value::Null => Ok(Vec::new()),
        single => Ok(vec![from_payload(single)?]),
    }
}
