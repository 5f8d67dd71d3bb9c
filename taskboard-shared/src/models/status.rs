/// Lifecycle status shared by projects and tasks
///
/// A flat, closed set with no transition rules: any status may be replaced by
/// any other on update. Stored as TEXT and serialised as the display string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Project/task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Not Started")]
    NotStarted,

    #[serde(rename = "In Progress")]
    InProgress,

    #[serde(rename = "Completed")]
    Completed,
}

/// Returned when a string is not one of the three status values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status. Status must be one of 'Not Started', 'In Progress', or 'Completed'")]
pub struct InvalidStatus(pub String);

impl Status {
    /// Every accepted value, in display order
    pub const ALL: [Status; 3] = [Status::NotStarted, Status::InProgress, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = InvalidStatus;

    /// Matching is exact: case and spacing must agree with [`Status::as_str`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

impl TryFrom<String> for Status {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
