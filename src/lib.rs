pub mod dashboard;
pub mod date_util;
pub mod error;
pub mod import;
pub mod llm;
pub mod model;
pub mod storage;

pub use dashboard::{Dashboard, DashboardParams, DashboardSummary, IssueFilter};
pub use error::{Error, Result};
pub use import::{ExportFile, ImportReport};
pub use model::{
    Issue, IssueStatus, JournalEntry, Priority, Project, Snapshot, Tracker, User, Version,
};
pub use storage::repository::WarehouseStatus;
pub use storage::Database;

use chrono::NaiveDate;
use storage::repository;

/// Main entry point for the Redmine dashboard warehouse.
pub struct RedmineDW {
    db: Database,
}

impl RedmineDW {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Import ─────────────────────────────────────────────────────

    /// Load a JSON data export into the warehouse.
    pub async fn import(&self, path: impl AsRef<std::path::Path>) -> Result<ImportReport> {
        import::import_file(&self.db, path).await
    }

    // ── Dashboard ──────────────────────────────────────────────────

    /// Fetch one consistent snapshot scoped to `project_id` and its
    /// descendants. Fails with `NotFound` when the project is unknown.
    pub async fn snapshot(&self, project_id: i64) -> Result<Snapshot> {
        let (project, snapshot) = self
            .db
            .reader()
            .call(move |conn| {
                let project = repository::fetch_project(conn, project_id)?;
                let snapshot = repository::fetch_snapshot(conn, project_id)?;
                Ok::<_, rusqlite::Error>((project, snapshot))
            })
            .await?;
        if project.is_none() {
            return Err(Error::NotFound(project_id.to_string()));
        }
        Ok(snapshot)
    }

    /// Compute the full dashboard payload for a project as of the given day.
    /// All analytics derive from one snapshot, so the result is a pure
    /// function of the warehouse contents and the parameters.
    pub async fn dashboard(
        &self,
        project_id: i64,
        params: &DashboardParams,
        as_of: NaiveDate,
    ) -> Result<DashboardSummary> {
        let snapshot = self.snapshot(project_id).await?;
        let dashboard = Dashboard::new(&snapshot, project_id, params, as_of)?;
        Ok(dashboard.summary())
    }

    /// Compute the dashboard and ask the configured LLM for an executive
    /// status report over it.
    pub async fn analyze(
        &self,
        project_id: i64,
        params: &DashboardParams,
        as_of: NaiveDate,
    ) -> Result<String> {
        let snapshot = self.snapshot(project_id).await?;
        let project_name = snapshot
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| project_id.to_string());
        let dashboard = Dashboard::new(&snapshot, project_id, params, as_of)?;
        let summary = dashboard.summary();

        let agent = llm::create_agent(&self.db).await?;
        llm::report::analyze(&agent, &summary, &project_name).await
    }

    // ── Status ─────────────────────────────────────────────────────

    /// Row counts and last-import time for the warehouse.
    pub async fn status(&self) -> Result<WarehouseStatus> {
        self.db
            .reader()
            .call(|conn| repository::warehouse_status(conn))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ── Config commands ────────────────────────────────────────────

    pub async fn config_get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .reader()
            .call({
                let key = key.to_string();
                move |conn| repository::get_config(conn, &key)
            })
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub async fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .writer()
            .call({
                let key = key.to_string();
                let value = value.to_string();
                move |conn| repository::set_config(conn, &key, &value)
            })
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub async fn config_list(&self) -> Result<Vec<(String, String)>> {
        self.db
            .reader()
            .call(|conn| repository::list_config(conn))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}
