use std::fmt;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex};

use serde::{Deserialize, Serialize};
use uuid::timestamp::context::ContextV7;
use uuid::{Timestamp, Uuid};

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Sentinel page number meaning "no such page" in `next`/`previous`.
pub const NO_PAGE: u64 = 0;

static ID_CONTEXT: LazyLock<Mutex<ContextV7>> = LazyLock::new(|| Mutex::new(ContextV7::new()));

#[derive(Debug, thiserror::Error)]
#[error("malformed task id: {0:?}")]
pub struct ParseTaskIdError(String);

/// Store-native task identifier: a time-ordered UUID, always rendered as
/// 32 lowercase hex characters. Parsing accepts either case and
/// canonicalizes to lowercase. Ids generated by one process are strictly
/// monotonic, so descending id order is newest-first insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v7(Timestamp::now(&*ID_CONTEXT)))
    }

    pub fn parse(s: &str) -> Result<Self, ParseTaskIdError> {
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseTaskIdError(s.to_string()));
        }
        let uuid = Uuid::try_parse(s).map_err(|_| ParseTaskIdError(s.to_string()))?;
        Ok(Self(uuid))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for TaskId {
    type Err = ParseTaskIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaskId {
    type Error = ParseTaskIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// One page of tasks plus paging metadata. Field names are part of the wire
/// contract and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub results: Vec<Task>,
    #[serde(rename = "current-page")]
    pub current_page: u64,
    #[serde(rename = "total-pages")]
    pub total_pages: u64,
    #[serde(rename = "total-results")]
    pub total_results: u64,
    pub next: u64,
    pub previous: u64,
}

/// Parameters of a paginated task listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub page: u64,
    pub page_size: u64,
    pub search: String,
    pub completed: Option<bool>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
            completed: None,
        }
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::new()
    }
}
