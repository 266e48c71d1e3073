use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Calendar event as exchanged with the Outlook script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Outlook EntryID; absent on events that have not been saved yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_attendees",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub is_all_day: bool,
    /// Any other fields the script emits, passed through as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields for a new event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewEvent {
    pub subject: String,
    pub start: String,
    pub end: String,
    pub body: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub is_all_day: bool,
}

impl NewEvent {
    pub fn new(
        subject: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            start: start.into(),
            end: end.into(),
            ..Default::default()
        }
    }
}

/// Changes to an existing event; `None` leaves the field untouched
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventUpdate {
    pub subject: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub body: Option<String>,
    pub location: Option<String>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        [
            &self.subject,
            &self.start,
            &self.end,
            &self.body,
            &self.location,
        ]
        .iter()
        .all(|field| field.as_deref().map_or(true, str::is_empty))
    }
}

/// Result of a delete operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeleteStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Outlook hands attendees back either as a list or as one `;`-separated string
fn deserialize_attendees<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Attendees {
        List(Vec<String>),
        Joined(String),
        Missing(()),
    }

    Ok(match Attendees::deserialize(deserializer)? {
        Attendees::List(list) => list,
        Attendees::Joined(joined) => joined
            .split(';')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect(),
        Attendees::Missing(()) => Vec::new(),
    })
}
