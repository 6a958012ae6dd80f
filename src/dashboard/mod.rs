//! The metrics aggregation engine. One [`Dashboard`] is constructed per
//! request from an immutable [`Snapshot`] and a filter, and every metric is a
//! pure function of that pair plus the caller-supplied "as of" date — no
//! ambient clock, no I/O, no mutation.

pub mod filter;
pub mod kpi;
pub mod labels;
pub mod replay;
pub mod series;
pub mod types;

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::date_util::parse_date;
use crate::error::Result;
use crate::model::{Issue, JournalEntry, Snapshot};

pub use filter::IssueFilter;
pub use types::*;

/// Caller-supplied dashboard parameters. All fields are optional; dates are
/// ISO `YYYY-MM-DD` strings and default to the trailing 30 days.
#[derive(Debug, Clone, Default)]
pub struct DashboardParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub target_project_ids: Option<Vec<i64>>,
    pub version_id: Option<i64>,
    pub tracker_id: Option<i64>,
    pub assigned_to_id: Option<i64>,
}

impl DashboardParams {
    fn filter(&self) -> IssueFilter {
        IssueFilter {
            project_ids: self.target_project_ids.clone(),
            version_id: self.version_id,
            tracker_id: self.tracker_id,
            assigned_to_id: self.assigned_to_id,
        }
    }
}

/// One dashboard computation, scoped to a project subtree and filter.
#[derive(Debug)]
pub struct Dashboard<'a> {
    snapshot: &'a Snapshot,
    subtree: Vec<i64>,
    issues: Vec<&'a Issue>,
    transitions: HashMap<i64, Vec<&'a JournalEntry>>,
    closed_ids: HashSet<i64>,
    start: NaiveDate,
    end: NaiveDate,
    as_of: NaiveDate,
}

impl<'a> Dashboard<'a> {
    /// Scope the snapshot to `project_id` and its descendants, apply the
    /// filter, and resolve the date range. Fails only on a malformed
    /// explicit date string.
    pub fn new(
        snapshot: &'a Snapshot,
        project_id: i64,
        params: &DashboardParams,
        as_of: NaiveDate,
    ) -> Result<Self> {
        let start = match &params.start_date {
            Some(s) => parse_date(s)?,
            None => as_of - Duration::days(30),
        };
        let end = match &params.end_date {
            Some(s) => parse_date(s)?,
            None => as_of,
        };

        let subtree = snapshot.project_subtree(project_id);
        let base: Vec<&Issue> = snapshot
            .issues
            .iter()
            .filter(|i| subtree.contains(&i.project_id))
            .collect();
        let issues = filter::apply(&base, &params.filter());

        let closed_ids = snapshot
            .statuses
            .iter()
            .filter(|s| s.is_closed)
            .map(|s| s.id)
            .collect();
        let transitions = replay::transitions_by_issue(&snapshot.journals);

        Ok(Self {
            snapshot,
            subtree,
            issues,
            transitions,
            closed_ids,
            start,
            end,
            as_of,
        })
    }

    fn open_issues(&self) -> Vec<&'a Issue> {
        self.issues
            .iter()
            .copied()
            .filter(|i| !self.closed_ids.contains(&i.status_id))
            .collect()
    }

    fn closed_issues(&self) -> Vec<&'a Issue> {
        self.issues
            .iter()
            .copied()
            .filter(|i| self.closed_ids.contains(&i.status_id))
            .collect()
    }

    pub fn kpi_summary(&self) -> KpiSummary {
        kpi::kpi_summary(&self.issues, &self.closed_ids, self.as_of)
    }

    pub fn burndown(&self) -> BurndownChart {
        series::burndown(&self.issues, self.start, self.end)
    }

    pub fn status_distribution(&self) -> StatusDistribution {
        replay::status_distribution(
            &self.issues,
            &self.transitions,
            &self.snapshot.statuses,
            self.start,
            self.end,
        )
    }

    pub fn cumulative_flow(&self) -> CumulativeFlow {
        replay::cumulative_flow(
            &self.issues,
            &self.transitions,
            &self.snapshot.statuses,
            self.start,
            self.end,
        )
    }

    pub fn cycle_time(&self) -> CycleTimeReport {
        replay::cycle_time(&self.closed_issues(), &self.transitions, &self.snapshot.statuses)
    }

    pub fn delay_analysis(&self) -> DelayAnalysis {
        series::delay_analysis(
            &self.issues,
            &self.open_issues(),
            self.start,
            self.end,
            self.as_of,
        )
    }

    pub fn velocity(&self) -> VelocityChart {
        series::velocity(&self.closed_issues(), self.as_of)
    }

    pub fn workload(&self) -> WorkloadAnalysis {
        series::workload(&self.open_issues(), &self.snapshot.users)
    }

    pub fn tracker_distribution(&self) -> Distribution {
        series::tracker_distribution(&self.issues, &self.snapshot.trackers)
    }

    pub fn priority_distribution(&self) -> PriorityDistribution {
        series::priority_distribution(&self.issues, &self.snapshot.priorities)
    }

    pub fn version_progress(&self) -> VersionProgress {
        series::version_progress(&self.snapshot.versions, &self.subtree)
    }

    /// Flat listing of the filtered issues with per-issue delay and
    /// stagnation ages, ordered by id.
    pub fn issue_list(&self) -> Vec<IssueRow> {
        let project_names: HashMap<i64, &str> = self
            .snapshot
            .projects
            .iter()
            .map(|p| (p.id, p.name.as_str()))
            .collect();
        let status_names: HashMap<i64, &str> = self
            .snapshot
            .statuses
            .iter()
            .map(|s| (s.id, s.name.as_str()))
            .collect();
        let user_names: HashMap<i64, &str> = self
            .snapshot
            .users
            .iter()
            .map(|u| (u.id, u.name.as_str()))
            .collect();

        let mut rows: Vec<IssueRow> = self
            .issues
            .iter()
            .map(|i| {
                let delay_days = match i.due_date {
                    Some(due) if due < self.as_of => (self.as_of - due).num_days(),
                    _ => 0,
                };
                IssueRow {
                    id: i.id,
                    project_name: project_names
                        .get(&i.project_id)
                        .copied()
                        .unwrap_or_default()
                        .to_string(),
                    subject: i.subject.clone(),
                    status: status_names
                        .get(&i.status_id)
                        .copied()
                        .unwrap_or(replay::UNKNOWN_STATUS)
                        .to_string(),
                    assigned_to: i
                        .assigned_to_id
                        .and_then(|id| user_names.get(&id).copied())
                        .unwrap_or_default()
                        .to_string(),
                    due_date: i.due_date,
                    delay_days,
                    stagnation_days: (self.as_of - i.updated_on.date()).num_days(),
                }
            })
            .collect();
        rows.sort_by_key(|r| r.id);
        rows
    }

    /// The selectable sub-projects: the scoped project and its descendants.
    pub fn available_projects(&self) -> Vec<ProjectOption> {
        let mut options: Vec<ProjectOption> = self
            .snapshot
            .projects
            .iter()
            .filter(|p| self.subtree.contains(&p.id))
            .map(|p| ProjectOption {
                id: p.id,
                name: p.name.clone(),
            })
            .collect();
        options.sort_by_key(|p| p.id);
        options
    }

    /// Assemble every metric into the single payload consumed by the
    /// rendering layer.
    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            kpis: self.kpi_summary(),
            burndown: self.burndown(),
            status_distribution: self.status_distribution(),
            workload: self.workload(),
            delay_analysis: self.delay_analysis(),
            tracker_distribution: self.tracker_distribution(),
            version_progress: self.version_progress(),
            velocity: self.velocity(),
            priority_distribution: self.priority_distribution(),
            cumulative_flow: self.cumulative_flow(),
            cycle_time: self.cycle_time(),
            issues: self.issue_list(),
            available_projects: self.available_projects(),
            labels: labels::labels(),
        }
    }
}
