use super::actor::{OutlookCalendarActor, OutlookCalendarActorHandle};
use super::client::OutlookCalendarClient;
use super::models::{CalendarEvent, DeleteStatus, EventUpdate, NewEvent};
use crate::error::CalendarResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Outlook calendar actor
#[derive(Clone)]
pub struct OutlookCalendarHandle {
    actor_handle: OutlookCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl OutlookCalendarHandle {
    /// Create a new OutlookCalendarHandle and spawn the actor
    pub fn new(client: OutlookCalendarClient) -> Self {
        // Create the actor and get its handle
        let (mut actor, handle) = OutlookCalendarActor::new(client);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// List events, optionally limited to a date range
    pub async fn list_events(
        &self,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        self.actor_handle.list_events(start_date, end_date).await
    }

    /// Get a single event by id
    pub async fn get_event(&self, event_id: impl Into<String>) -> CalendarResult<CalendarEvent> {
        self.actor_handle.get_event(event_id.into()).await
    }

    /// Create a new event
    pub async fn create_event(&self, event: NewEvent) -> CalendarResult<CalendarEvent> {
        self.actor_handle.create_event(event).await
    }

    /// Update an existing event
    pub async fn update_event(
        &self,
        event_id: impl Into<String>,
        update: EventUpdate,
    ) -> CalendarResult<CalendarEvent> {
        self.actor_handle.update_event(event_id.into(), update).await
    }

    /// Delete an event
    pub async fn delete_event(&self, event_id: impl Into<String>) -> CalendarResult<DeleteStatus> {
        self.actor_handle.delete_event(event_id.into()).await
    }

    /// Search events by subject and body
    pub async fn search_events(
        &self,
        query: impl Into<String>,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        self.actor_handle.search_events(query.into()).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        self.actor_handle.shutdown().await
    }
}
