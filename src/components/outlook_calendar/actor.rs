use super::client::OutlookCalendarClient;
use super::models::{CalendarEvent, DeleteStatus, EventUpdate, NewEvent};
use crate::error::{component_error, CalendarResult};
use std::future::Future;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

type Reply<T> = oneshot::Sender<CalendarResult<T>>;

/// The Outlook calendar actor that processes messages
pub struct OutlookCalendarActor {
    client: OutlookCalendarClient,
    command_rx: mpsc::Receiver<OutlookCalendarCommand>,
}

/// Commands that can be sent to the Outlook calendar actor
pub enum OutlookCalendarCommand {
    ListEvents {
        start_date: Option<String>,
        end_date: Option<String>,
        reply: Reply<Vec<CalendarEvent>>,
    },
    GetEvent {
        event_id: String,
        reply: Reply<CalendarEvent>,
    },
    CreateEvent {
        event: NewEvent,
        reply: Reply<CalendarEvent>,
    },
    UpdateEvent {
        event_id: String,
        update: EventUpdate,
        reply: Reply<CalendarEvent>,
    },
    DeleteEvent {
        event_id: String,
        reply: Reply<DeleteStatus>,
    },
    SearchEvents {
        query: String,
        reply: Reply<Vec<CalendarEvent>>,
    },
    Shutdown,
}

/// Handle for communicating with the Outlook calendar actor
#[derive(Clone)]
pub struct OutlookCalendarActorHandle {
    command_tx: mpsc::Sender<OutlookCalendarCommand>,
}

impl OutlookCalendarActorHandle {
    /// Send a command and wait for its reply
    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> OutlookCalendarCommand,
    ) -> CalendarResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        reply_rx
            .await
            .map_err(|_| component_error("Response channel closed"))?
    }

    pub async fn list_events(
        &self,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> CalendarResult<Vec<CalendarEvent>> {
        self.request(|reply| OutlookCalendarCommand::ListEvents {
            start_date,
            end_date,
            reply,
        })
        .await
    }

    pub async fn get_event(&self, event_id: String) -> CalendarResult<CalendarEvent> {
        self.request(|reply| OutlookCalendarCommand::GetEvent { event_id, reply })
            .await
    }

    pub async fn create_event(&self, event: NewEvent) -> CalendarResult<CalendarEvent> {
        self.request(|reply| OutlookCalendarCommand::CreateEvent { event, reply })
            .await
    }

    pub async fn update_event(
        &self,
        event_id: String,
        update: EventUpdate,
    ) -> CalendarResult<CalendarEvent> {
        self.request(|reply| OutlookCalendarCommand::UpdateEvent {
            event_id,
            update,
            reply,
        })
        .await
    }

    pub async fn delete_event(&self, event_id: String) -> CalendarResult<DeleteStatus> {
        self.request(|reply| OutlookCalendarCommand::DeleteEvent { event_id, reply })
            .await
    }

    pub async fn search_events(&self, query: String) -> CalendarResult<Vec<CalendarEvent>> {
        self.request(|reply| OutlookCalendarCommand::SearchEvents { query, reply })
            .await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        let _ = self.command_tx.send(OutlookCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl OutlookCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(client: OutlookCalendarClient) -> (Self, OutlookCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self { client, command_rx };
        let handle = OutlookCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop.
    ///
    /// Each request runs in its own task so a slow script run never holds up
    /// the mailbox.
    pub async fn run(&mut self) {
        info!("Outlook calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            let client = self.client.clone();
            match cmd {
                OutlookCalendarCommand::ListEvents {
                    start_date,
                    end_date,
                    reply,
                } => spawn_reply(reply, async move {
                    client
                        .list_events(start_date.as_deref(), end_date.as_deref())
                        .await
                }),
                OutlookCalendarCommand::GetEvent { event_id, reply } => {
                    spawn_reply(reply, async move { client.get_event(&event_id).await })
                }
                OutlookCalendarCommand::CreateEvent { event, reply } => {
                    spawn_reply(reply, async move { client.create_event(&event).await })
                }
                OutlookCalendarCommand::UpdateEvent {
                    event_id,
                    update,
                    reply,
                } => spawn_reply(reply, async move {
                    client.update_event(&event_id, &update).await
                }),
                OutlookCalendarCommand::DeleteEvent { event_id, reply } => {
                    spawn_reply(reply, async move { client.delete_event(&event_id).await })
                }
                OutlookCalendarCommand::SearchEvents { query, reply } => {
                    spawn_reply(reply, async move { client.search_events(&query).await })
                }
                OutlookCalendarCommand::Shutdown => {
                    info!("Outlook calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Outlook calendar actor shut down");
    }
}

/// Run one request and deliver its result.
///
/// If the caller stops waiting, the request future is dropped, which kills
/// the script process it may have started.
fn spawn_reply<T, F>(mut reply: Reply<T>, work: F)
where
    T: Send + 'static,
    F: Future<Output = CalendarResult<T>> + Send + 'static,
{
    tokio::spawn(async move {
        let result = tokio::select! {
            result = work => Some(result),
            _ = reply.closed() => None,
        };

        match result {
            Some(result) => {
                let _ = reply.send(result);
            }
            None => debug!("caller went away; abandoned calendar request"),
        }
    });
}
