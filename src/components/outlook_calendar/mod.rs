mod actor;
pub mod client;
mod handle;
pub mod models;

pub use client::OutlookCalendarClient;
pub use handle::OutlookCalendarHandle;
pub use models::{CalendarEvent, DeleteStatus, EventUpdate, NewEvent};

use crate::bridge::{PowerShellBridge, ScriptRunner};
use crate::config::Config;
use crate::error::CalendarResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Outlook calendar component, backed by the PowerShell bridge
#[derive(Default)]
pub struct OutlookCalendar {
    handle: RwLock<Option<OutlookCalendarHandle>>,
    runner: Option<Arc<dyn ScriptRunner>>,
}

impl OutlookCalendar {
    /// Create a component that builds its bridge from the config on init
    pub fn new() -> Self {
        Self {
            handle: RwLock::new(None),
            runner: None,
        }
    }

    /// Create a component that runs actions through the given runner instead
    pub fn with_runner(runner: Arc<dyn ScriptRunner>) -> Self {
        Self {
            handle: RwLock::new(None),
            runner: Some(runner),
        }
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<OutlookCalendarHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for OutlookCalendar {
    fn name(&self) -> &'static str {
        "outlook_calendar"
    }

    async fn init(&self, config: Arc<RwLock<Config>>) -> CalendarResult<()> {
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_some() {
            return Ok(());
        }

        let runner = match &self.runner {
            Some(runner) => Arc::clone(runner),
            None => {
                let bridge_config = config.read().await.bridge_config();
                info!(
                    interpreter = %bridge_config.interpreter,
                    script = %bridge_config.script_path.display(),
                    timeout_secs = ?bridge_config.timeout.map(|t| t.as_secs()),
                    "Using PowerShell bridge"
                );
                Arc::new(PowerShellBridge::new(bridge_config)) as Arc<dyn ScriptRunner>
            }
        };

        *handle_lock = Some(OutlookCalendarHandle::new(OutlookCalendarClient::new(runner)));
        Ok(())
    }

    async fn shutdown(&self) -> CalendarResult<()> {
        // Shutdown the handle if it exists
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
