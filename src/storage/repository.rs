use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{
    Issue, IssueStatus, JournalEntry, Priority, Project, Snapshot, Tracker, User, Version,
};

// ── Upserts (import path) ──────────────────────────────────────────

pub fn upsert_project(conn: &Connection, project: &Project) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO projects (id, name, parent_id, cached_at)
         VALUES (?1, ?2, ?3, datetime('now'))",
        params![project.id, project.name, project.parent_id],
    )?;
    Ok(())
}

pub fn upsert_user(conn: &Connection, user: &User) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO users (id, name, cached_at)
         VALUES (?1, ?2, datetime('now'))",
        params![user.id, user.name],
    )?;
    Ok(())
}

pub fn upsert_status(conn: &Connection, status: &IssueStatus) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO issue_statuses (id, name, is_closed, cached_at)
         VALUES (?1, ?2, ?3, datetime('now'))",
        params![status.id, status.name, status.is_closed as i32],
    )?;
    Ok(())
}

pub fn upsert_tracker(conn: &Connection, tracker: &Tracker) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO trackers (id, name, cached_at)
         VALUES (?1, ?2, datetime('now'))",
        params![tracker.id, tracker.name],
    )?;
    Ok(())
}

pub fn upsert_priority(conn: &Connection, priority: &Priority) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO priorities (id, name, position, cached_at)
         VALUES (?1, ?2, ?3, datetime('now'))",
        params![priority.id, priority.name, priority.position],
    )?;
    Ok(())
}

pub fn upsert_version(conn: &Connection, version: &Version) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO versions (
            id, project_id, name, status, effective_date,
            completed_percent, estimated_hours, spent_hours, cached_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'))",
        params![
            version.id,
            version.project_id,
            version.name,
            version.status,
            version.effective_date,
            version.completed_percent,
            version.estimated_hours,
            version.spent_hours,
        ],
    )?;
    Ok(())
}

pub fn upsert_issue(conn: &Connection, issue: &Issue) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO issues (
            id, project_id, tracker_id, priority_id, status_id,
            assigned_to_id, fixed_version_id, subject,
            created_on, updated_on, closed_on, due_date,
            estimated_hours, spent_hours, cached_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, datetime('now'))",
        params![
            issue.id,
            issue.project_id,
            issue.tracker_id,
            issue.priority_id,
            issue.status_id,
            issue.assigned_to_id,
            issue.fixed_version_id,
            issue.subject,
            issue.created_on,
            issue.updated_on,
            issue.closed_on,
            issue.due_date,
            issue.estimated_hours,
            issue.spent_hours,
        ],
    )?;
    Ok(())
}

pub fn upsert_journal(conn: &Connection, entry: &JournalEntry) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO status_journals (
            id, issue_id, created_on, old_status_id, new_status_id, cached_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))",
        params![
            entry.id,
            entry.issue_id,
            entry.created_on,
            entry.old_status_id,
            entry.new_status_id,
        ],
    )?;
    Ok(())
}

/// Record when the warehouse last ingested an export.
pub fn touch_last_import(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO app_config (key, value, updated_at)
         VALUES ('last_import_at', datetime('now'), datetime('now'))",
        [],
    )?;
    Ok(())
}

// ── Config ─────────────────────────────────────────────────────────

pub fn get_config(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM app_config WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO app_config (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))",
        params![key, value],
    )?;
    Ok(())
}

pub fn list_config(conn: &Connection) -> Result<Vec<(String, String)>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT key, value FROM app_config ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

// ── Snapshot fetch (dashboard path) ────────────────────────────────

pub fn fetch_project(conn: &Connection, id: i64) -> Result<Option<Project>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, name, parent_id FROM projects WHERE id = ?1",
        params![id],
        |row| {
            Ok(Project {
                id: row.get(0)?,
                name: row.get(1)?,
                parent_id: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Fetch one consistent snapshot of everything visible under `project_id`
/// and its descendants. A fixed number of bulk queries, never one per issue.
pub fn fetch_snapshot(conn: &Connection, project_id: i64) -> Result<Snapshot, rusqlite::Error> {
    let projects = fetch_all_projects(conn)?;

    let mut snapshot = Snapshot {
        projects,
        ..Default::default()
    };
    let subtree = snapshot.project_subtree(project_id);

    snapshot.users = fetch_all_users(conn)?;
    snapshot.statuses = fetch_all_statuses(conn)?;
    snapshot.trackers = fetch_all_trackers(conn)?;
    snapshot.priorities = fetch_all_priorities(conn)?;
    snapshot.versions = fetch_versions_for_projects(conn, &subtree)?;
    snapshot.issues = fetch_issues_for_projects(conn, &subtree)?;
    snapshot.journals = fetch_journals_for_projects(conn, &subtree)?;

    Ok(snapshot)
}

fn fetch_all_projects(conn: &Connection) -> Result<Vec<Project>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT id, name, parent_id FROM projects ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
        })
    })?;
    rows.collect()
}

fn fetch_all_users(conn: &Connection) -> Result<Vec<User>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT id, name FROM users ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect()
}

fn fetch_all_statuses(conn: &Connection) -> Result<Vec<IssueStatus>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT id, name, is_closed FROM issue_statuses ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(IssueStatus {
            id: row.get(0)?,
            name: row.get(1)?,
            is_closed: row.get::<_, i64>(2)? != 0,
        })
    })?;
    rows.collect()
}

fn fetch_all_trackers(conn: &Connection) -> Result<Vec<Tracker>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT id, name FROM trackers ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Tracker {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect()
}

fn fetch_all_priorities(conn: &Connection) -> Result<Vec<Priority>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT id, name, position FROM priorities ORDER BY position, id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Priority {
            id: row.get(0)?,
            name: row.get(1)?,
            position: row.get(2)?,
        })
    })?;
    rows.collect()
}

fn fetch_versions_for_projects(
    conn: &Connection,
    project_ids: &[i64],
) -> Result<Vec<Version>, rusqlite::Error> {
    let sql = format!(
        "SELECT id, project_id, name, status, effective_date,
                completed_percent, estimated_hours, spent_hours
         FROM versions WHERE project_id IN ({}) ORDER BY id",
        placeholders(project_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    bind_ids(&mut stmt, project_ids)?;
    let mut rows = stmt.raw_query();
    let mut versions = Vec::new();
    while let Some(row) = rows.next()? {
        versions.push(Version {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            status: row.get(3)?,
            effective_date: row.get::<_, Option<NaiveDate>>(4)?,
            completed_percent: row.get(5)?,
            estimated_hours: row.get(6)?,
            spent_hours: row.get(7)?,
        });
    }
    Ok(versions)
}

fn fetch_issues_for_projects(
    conn: &Connection,
    project_ids: &[i64],
) -> Result<Vec<Issue>, rusqlite::Error> {
    let sql = format!(
        "SELECT id, project_id, tracker_id, priority_id, status_id,
                assigned_to_id, fixed_version_id, subject,
                created_on, updated_on, closed_on, due_date,
                estimated_hours, spent_hours
         FROM issues WHERE project_id IN ({}) ORDER BY id",
        placeholders(project_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    bind_ids(&mut stmt, project_ids)?;
    let mut rows = stmt.raw_query();
    let mut issues = Vec::new();
    while let Some(row) = rows.next()? {
        issues.push(Issue {
            id: row.get(0)?,
            project_id: row.get(1)?,
            tracker_id: row.get(2)?,
            priority_id: row.get(3)?,
            status_id: row.get(4)?,
            assigned_to_id: row.get(5)?,
            fixed_version_id: row.get(6)?,
            subject: row.get(7)?,
            created_on: row.get::<_, NaiveDateTime>(8)?,
            updated_on: row.get::<_, NaiveDateTime>(9)?,
            closed_on: row.get::<_, Option<NaiveDateTime>>(10)?,
            due_date: row.get::<_, Option<NaiveDate>>(11)?,
            estimated_hours: row.get(12)?,
            spent_hours: row.get(13)?,
        });
    }
    Ok(issues)
}

fn fetch_journals_for_projects(
    conn: &Connection,
    project_ids: &[i64],
) -> Result<Vec<JournalEntry>, rusqlite::Error> {
    let sql = format!(
        "SELECT j.id, j.issue_id, j.created_on, j.old_status_id, j.new_status_id
         FROM status_journals j
         JOIN issues i ON i.id = j.issue_id
         WHERE i.project_id IN ({})
         ORDER BY j.issue_id, j.created_on, j.id",
        placeholders(project_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    bind_ids(&mut stmt, project_ids)?;
    let mut rows = stmt.raw_query();
    let mut journals = Vec::new();
    while let Some(row) = rows.next()? {
        journals.push(JournalEntry {
            id: row.get(0)?,
            issue_id: row.get(1)?,
            created_on: row.get::<_, NaiveDateTime>(2)?,
            old_status_id: row.get(3)?,
            new_status_id: row.get(4)?,
        });
    }
    Ok(journals)
}

fn placeholders(n: usize) -> String {
    let mut s = String::new();
    for i in 1..=n {
        if i > 1 {
            s.push(',');
        }
        s.push('?');
    }
    s
}

fn bind_ids(stmt: &mut rusqlite::Statement<'_>, ids: &[i64]) -> Result<(), rusqlite::Error> {
    for (i, id) in ids.iter().enumerate() {
        stmt.raw_bind_parameter(i + 1, id)?;
    }
    Ok(())
}

// ── Warehouse status ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WarehouseStatus {
    pub projects: i64,
    pub issues: i64,
    pub journals: i64,
    pub users: i64,
    pub last_import: Option<String>,
}

pub fn warehouse_status(conn: &Connection) -> Result<WarehouseStatus, rusqlite::Error> {
    let projects: i64 = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
    let issues: i64 = conn.query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
    let journals: i64 =
        conn.query_row("SELECT COUNT(*) FROM status_journals", [], |row| row.get(0))?;
    let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    let last_import = get_config(conn, "last_import_at")?;
    Ok(WarehouseStatus {
        projects,
        issues,
        journals,
        users,
        last_import,
    })
}
