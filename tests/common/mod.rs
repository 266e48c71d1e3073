#![allow(dead_code)]

use async_trait::async_trait;
use outlook_calendar::bridge::{Action, BridgeError, Params, ScriptRunner};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded script invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub action: Action,
    pub args: Vec<String>,
}

/// Canned reply for an action
#[derive(Debug, Clone)]
pub enum Reply {
    Payload(Value),
    Failure(String),
    /// Never completes; used to exercise cancellation
    Hang,
}

/// Script runner that records calls and answers from a table
#[derive(Default)]
pub struct MockRunner {
    replies: Mutex<HashMap<Action, Reply>>,
    calls: Mutex<Vec<Invocation>>,
    pub abandoned: Arc<AtomicBool>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, action: Action, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(action, reply);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

/// Sets the flag when a hanging run is dropped before completing
struct AbandonGuard(Arc<AtomicBool>);

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScriptRunner for MockRunner {
    async fn execute(&self, action: Action, params: Params) -> Result<Value, BridgeError> {
        self.calls.lock().unwrap().push(Invocation {
            action,
            args: params.to_args(),
        });

        let reply = self.replies.lock().unwrap().get(&action).cloned();
        match reply {
            Some(Reply::Payload(value)) => Ok(value),
            Some(Reply::Failure(message)) => Err(BridgeError::ToolReported(message)),
            Some(Reply::Hang) => {
                let _guard = AbandonGuard(Arc::clone(&self.abandoned));
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(BridgeError::ToolReported(format!(
                "no reply configured for {}",
                action
            ))),
        }
    }
}
