use std::future::IntoFuture;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::{FilterOptions, Pagination, Task, TaskId, NO_PAGE};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use crate::error::{Error, Result};

const TASK_FIELDS: &str = "record::id(id) AS id, title, description, completed";

/// Task storage over the embedded document database. The handle is cheap to
/// clone and safe for concurrent use; every query is bounded by the configured
/// deadline.
#[derive(Debug, Clone)]
pub struct TaskStorage {
    db: Surreal<Db>,
    timeout: Duration,
}

/// The search/completed filter of a listing, compiled into a SurrealQL WHERE
/// clause plus bound parameters. The same compiled filter drives both the
/// count and the window fetch so the page contents always match the totals.
#[derive(Debug, Clone, Default)]
struct TaskFilter {
    search: Option<String>,
    completed: Option<bool>,
}

#[derive(Debug, Serialize)]
struct FilterParams {
    search: Option<String>,
    completed: Option<bool>,
}

impl TaskFilter {
    fn from_options(opts: &FilterOptions) -> Self {
        Self {
            search: (!opts.search.is_empty()).then(|| opts.search.to_lowercase()),
            completed: opts.completed,
        }
    }

    fn where_clause(&self) -> String {
        let mut conditions: Vec<&str> = Vec::new();
        if self.search.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(title), $search) \
                 OR string::contains(string::lowercase(description), $search))",
            );
        }
        if self.completed.is_some() {
            conditions.push("completed = $completed");
        }
        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }

    fn params(&self) -> FilterParams {
        FilterParams {
            search: self.search.clone(),
            completed: self.completed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

fn total_pages(total_results: u64, page_size: u64) -> u64 {
    total_results.div_ceil(page_size).max(1)
}

impl TaskStorage {
    pub fn new(db: Surreal<Db>, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// List tasks matching the filter options, newest first, as one page plus
    /// paging metadata.
    pub async fn list(&self, opts: &FilterOptions) -> Result<Pagination> {
        if opts.page < 1 {
            return Err(Error::InvalidArgument(
                "page number must be greater than 0".to_string(),
            ));
        }
        if opts.page_size < 1 {
            return Err(Error::InvalidArgument(
                "page size must be greater than 0".to_string(),
            ));
        }

        let filter = TaskFilter::from_options(opts);
        let total_results = self.count(&filter).await?;
        let total_pages = total_pages(total_results, opts.page_size);
        if opts.page > total_pages {
            return Err(Error::InvalidArgument(
                "page number exceeds total pages".to_string(),
            ));
        }

        let start = (opts.page - 1) * opts.page_size;
        let results = self.fetch_window(&filter, start, opts.page_size).await?;

        Ok(Pagination {
            results,
            current_page: opts.page,
            total_pages,
            total_results,
            previous: if opts.page > 1 { opts.page - 1 } else { NO_PAGE },
            next: if opts.page < total_pages {
                opts.page + 1
            } else {
                NO_PAGE
            },
        })
    }

    /// Insert a new task with `completed = false` and return its id.
    pub async fn create(&self, title: &str, description: &str) -> Result<TaskId> {
        let id = TaskId::new();
        let query = self
            .db
            .query(
                "CREATE type::thing('task', $id) \
                 SET title = $title, description = $description, completed = false",
            )
            .bind(("id", id.to_string()))
            .bind(("title", title.to_string()))
            .bind(("description", description.to_string()));
        self.with_deadline(query).await?.check()?;
        tracing::debug!(%id, "created task");
        Ok(id)
    }

    /// Fetch one task by its hex identifier.
    pub async fn get(&self, id: &str) -> Result<Task> {
        let id = TaskId::parse(id)?;
        self.get_by_id(id).await
    }

    /// Set the completion flag of a task. Idempotent; fails with `NotFound`
    /// when no task has the identifier.
    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<Task> {
        let id = TaskId::parse(id)?;
        self.set_completed_by_id(id, completed).await
    }

    /// Flip the completion flag of a task. Read-modify-write without
    /// compare-and-set: concurrent toggles on the same task race and the last
    /// write wins.
    pub async fn toggle(&self, id: &str) -> Result<Task> {
        let id = TaskId::parse(id)?;
        let current = self.get_by_id(id).await?;
        self.set_completed_by_id(id, !current.completed).await
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Task> {
        let query = self
            .db
            .query(format!(
                "SELECT {TASK_FIELDS} FROM type::thing('task', $id)"
            ))
            .bind(("id", id.to_string()));
        let task: Option<Task> = self.with_deadline(query).await?.take(0)?;
        task.ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn set_completed_by_id(&self, id: TaskId, completed: bool) -> Result<Task> {
        let query = self
            .db
            .query(format!(
                "UPDATE type::thing('task', $id) SET completed = $completed \
                 RETURN {TASK_FIELDS}"
            ))
            .bind(("id", id.to_string()))
            .bind(("completed", completed));
        let task: Option<Task> = self.with_deadline(query).await?.take(0)?;
        task.ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn count(&self, filter: &TaskFilter) -> Result<u64> {
        let query = self
            .db
            .query(format!(
                "SELECT count() FROM task{} GROUP ALL",
                filter.where_clause()
            ))
            .bind(filter.params());
        let row: Option<CountRow> = self.with_deadline(query).await?.take(0)?;
        Ok(row.map_or(0, |r| r.count))
    }

    async fn fetch_window(&self, filter: &TaskFilter, start: u64, limit: u64) -> Result<Vec<Task>> {
        let query = self
            .db
            .query(format!(
                "SELECT {TASK_FIELDS} FROM task{} \
                 ORDER BY id DESC LIMIT {limit} START {start}",
                filter.where_clause()
            ))
            .bind(filter.params());
        let tasks: Vec<Task> = self.with_deadline(query).await?.take(0)?;
        Ok(tasks)
    }

    async fn with_deadline<T>(
        &self,
        fut: impl IntoFuture<Output = surrealdb::Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut.into_future()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout),
        }
    }
}
