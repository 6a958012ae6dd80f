use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A project node. Projects form a tree via `parent_id`; the dashboard is
/// always scoped to a project and its descendants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// A workflow status. The set is small and shared globally across projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueStatus {
    pub id: i64,
    pub name: String,
    pub is_closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracker {
    pub id: i64,
    pub name: String,
}

/// An issue priority. `position` is the administrative ordering used when
/// presenting priority distributions (not alphabetical, not by count).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Priority {
    pub id: i64,
    pub name: String,
    pub position: i64,
}

/// A release/milestone. `completed_percent` is optional in exports and
/// resolves to 0 at the data boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_percent: f64,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub spent_hours: Option<f64>,
}

/// A read-only issue record as of the snapshot instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub project_id: i64,
    pub tracker_id: i64,
    pub priority_id: i64,
    pub status_id: i64,
    #[serde(default)]
    pub assigned_to_id: Option<i64>,
    #[serde(default)]
    pub fixed_version_id: Option<i64>,
    pub subject: String,
    pub created_on: NaiveDateTime,
    pub updated_on: NaiveDateTime,
    #[serde(default)]
    pub closed_on: Option<NaiveDateTime>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub spent_hours: Option<f64>,
}

/// One status transition from an issue's audit log. Entries for an issue are
/// totally ordered by `(created_on, id)` — the journal id breaks ties between
/// entries sharing a timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub issue_id: i64,
    pub created_on: NaiveDateTime,
    pub old_status_id: i64,
    pub new_status_id: i64,
}

/// One consistent in-memory snapshot of everything visible under a project,
/// fetched up-front by a fixed number of bulk queries. All aggregation reads
/// from this and never re-queries mid-computation.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub users: Vec<User>,
    pub statuses: Vec<IssueStatus>,
    pub trackers: Vec<Tracker>,
    pub priorities: Vec<Priority>,
    pub versions: Vec<Version>,
    pub issues: Vec<Issue>,
    pub journals: Vec<JournalEntry>,
}

impl Snapshot {
    /// Ids of the given project and all its descendants.
    pub fn project_subtree(&self, root_id: i64) -> Vec<i64> {
        let mut ids = vec![root_id];
        let mut frontier = vec![root_id];
        while let Some(pid) = frontier.pop() {
            for p in &self.projects {
                if p.parent_id == Some(pid) && !ids.contains(&p.id) {
                    ids.push(p.id);
                    frontier.push(p.id);
                }
            }
        }
        ids
    }
}
