use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Issue, IssueStatus, JournalEntry, Priority, Project, Tracker, User, Version};
use crate::storage::{repository, Database};

/// A data export file: one JSON document holding every record type. Sections
/// may be omitted, so partial exports (e.g. issues only) load cleanly.
#[derive(Debug, Default, Deserialize)]
pub struct ExportFile {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub statuses: Vec<IssueStatus>,
    #[serde(default)]
    pub trackers: Vec<Tracker>,
    #[serde(default)]
    pub priorities: Vec<Priority>,
    #[serde(default)]
    pub versions: Vec<Version>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub journals: Vec<JournalEntry>,
}

/// Per-record-type counts returned after an import completes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub projects: u64,
    pub users: u64,
    pub statuses: u64,
    pub trackers: u64,
    pub priorities: u64,
    pub versions: u64,
    pub issues: u64,
    pub journals: u64,
}

impl ImportReport {
    pub fn total(&self) -> u64 {
        self.projects
            + self.users
            + self.statuses
            + self.trackers
            + self.priorities
            + self.versions
            + self.issues
            + self.journals
    }
}

/// Parse an export document from JSON text.
pub fn parse_export(json: &str) -> Result<ExportFile> {
    serde_json::from_str(json).map_err(|e| Error::Import(e.to_string()))
}

/// Read and load an export file into the warehouse.
pub async fn import_file(db: &Database, path: impl AsRef<Path>) -> Result<ImportReport> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Import(format!("{}: {e}", path.display())))?;
    let export = parse_export(&text)?;
    import_export(db, export).await
}

/// Load an export into the warehouse in one transaction. Records are
/// upserted by id, so re-importing the same export is idempotent.
pub async fn import_export(db: &Database, export: ExportFile) -> Result<ImportReport> {
    let report = db
        .writer()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let report = ImportReport {
                projects: export.projects.len() as u64,
                users: export.users.len() as u64,
                statuses: export.statuses.len() as u64,
                trackers: export.trackers.len() as u64,
                priorities: export.priorities.len() as u64,
                versions: export.versions.len() as u64,
                issues: export.issues.len() as u64,
                journals: export.journals.len() as u64,
            };

            for project in &export.projects {
                repository::upsert_project(&tx, project)?;
            }
            for user in &export.users {
                repository::upsert_user(&tx, user)?;
            }
            for status in &export.statuses {
                repository::upsert_status(&tx, status)?;
            }
            for tracker in &export.trackers {
                repository::upsert_tracker(&tx, tracker)?;
            }
            for priority in &export.priorities {
                repository::upsert_priority(&tx, priority)?;
            }
            for version in &export.versions {
                repository::upsert_version(&tx, version)?;
            }
            for issue in &export.issues {
                repository::upsert_issue(&tx, issue)?;
            }
            for entry in &export.journals {
                repository::upsert_journal(&tx, entry)?;
            }
            repository::touch_last_import(&tx)?;
            tx.commit()?;

            Ok::<ImportReport, rusqlite::Error>(report)
        })
        .await?;

    log::info!("Imported {} records", report.total());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "projects": [
            {"id": 1, "name": "Platform", "parent_id": null},
            {"id": 2, "name": "API", "parent_id": 1}
        ],
        "users": [{"id": 5, "name": "Morgan"}],
        "statuses": [
            {"id": 1, "name": "New", "is_closed": false},
            {"id": 3, "name": "Done", "is_closed": true}
        ],
        "trackers": [{"id": 1, "name": "Bug"}],
        "priorities": [{"id": 2, "name": "Normal", "position": 2}],
        "versions": [
            {"id": 7, "project_id": 1, "name": "1.0", "status": "open",
             "effective_date": "2026-04-01", "completed_percent": 25.0}
        ],
        "issues": [
            {"id": 10, "project_id": 2, "tracker_id": 1, "priority_id": 2,
             "status_id": 1, "assigned_to_id": 5, "subject": "Fix pagination",
             "created_on": "2026-01-05T09:00:00",
             "updated_on": "2026-01-08T15:30:00",
             "due_date": "2026-01-20", "estimated_hours": 3.5}
        ],
        "journals": [
            {"id": 100, "issue_id": 10, "created_on": "2026-01-06T11:00:00",
             "old_status_id": 1, "new_status_id": 2}
        ]
    }"#;

    #[test]
    fn test_parse_export_counts_sections() {
        let export = parse_export(EXPORT).unwrap();
        assert_eq!(export.projects.len(), 2);
        assert_eq!(export.issues.len(), 1);
        assert_eq!(export.journals.len(), 1);
        assert_eq!(export.issues[0].spent_hours, None);
    }

    #[test]
    fn test_parse_export_allows_missing_sections() {
        let export = parse_export(r#"{"issues": []}"#).unwrap();
        assert!(export.projects.is_empty());
        assert!(export.journals.is_empty());
    }

    #[test]
    fn test_parse_export_rejects_malformed_json() {
        assert!(matches!(
            parse_export("{not json"),
            Err(Error::Import(_))
        ));
    }

    #[tokio::test]
    async fn test_import_loads_warehouse() {
        let db = Database::open_memory().await.unwrap();
        let report = import_export(&db, parse_export(EXPORT).unwrap())
            .await
            .unwrap();
        assert_eq!(report.projects, 2);
        assert_eq!(report.issues, 1);
        assert_eq!(report.total(), 9);

        let status = db
            .reader()
            .call(|conn| repository::warehouse_status(conn))
            .await
            .unwrap();
        assert_eq!(status.issues, 1);
        assert_eq!(status.journals, 1);
        assert!(status.last_import.is_some());
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let db = Database::open_memory().await.unwrap();
        import_export(&db, parse_export(EXPORT).unwrap())
            .await
            .unwrap();
        import_export(&db, parse_export(EXPORT).unwrap())
            .await
            .unwrap();

        let status = db
            .reader()
            .call(|conn| repository::warehouse_status(conn))
            .await
            .unwrap();
        assert_eq!(status.projects, 2);
        assert_eq!(status.issues, 1);
        assert_eq!(status.journals, 1);
    }

    #[tokio::test]
    async fn test_imported_snapshot_feeds_dashboard() {
        let db = Database::open_memory().await.unwrap();
        import_export(&db, parse_export(EXPORT).unwrap())
            .await
            .unwrap();

        let snapshot = db
            .reader()
            .call(|conn| repository::fetch_snapshot(conn, 1))
            .await
            .unwrap();
        assert_eq!(snapshot.issues.len(), 1);
        assert_eq!(snapshot.issues[0].subject, "Fix pagination");
        assert_eq!(snapshot.versions.len(), 1);
        assert_eq!(snapshot.versions[0].completed_percent, 25.0);
    }
}
