//! Status history replay. Issue status is not stored historically — only the
//! current status plus an append-only journal of transitions. Everything here
//! is built on one primitive, [`StatusTimeline`], which reconstructs an
//! issue's status as of any day from that pair.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};

use crate::date_util::{fractional_days, round1};
use crate::model::{Issue, IssueStatus, JournalEntry};

use super::types::{
    CfdPoint, CumulativeFlow, CycleTimeReport, CycleTimeRow, StatusDistribution, StatusSeries,
};

/// Label used when a journal or issue references a status id with no record.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Group status-change journal entries by issue, each list sorted by
/// `(created_on, id)`. The journal id is the deterministic tie-break for
/// entries sharing a timestamp; input order is never relied on.
pub fn transitions_by_issue(journals: &[JournalEntry]) -> HashMap<i64, Vec<&JournalEntry>> {
    let mut map: HashMap<i64, Vec<&JournalEntry>> = HashMap::new();
    for entry in journals {
        map.entry(entry.issue_id).or_default().push(entry);
    }
    for list in map.values_mut() {
        list.sort_by_key(|j| (j.created_on, j.id));
    }
    map
}

/// An issue's reconstructed status history: current status plus its ordered
/// transitions.
///
/// `status_on(d)` answers "what was the status at the end of day `d`": the
/// `new_status_id` of the last transition on or before `d`, else the
/// `old_status_id` of the earliest transition. An issue with no recorded
/// transitions keeps its current status for its entire visible history.
pub struct StatusTimeline<'a> {
    current: i64,
    transitions: &'a [&'a JournalEntry],
}

impl<'a> StatusTimeline<'a> {
    pub fn new(current: i64, transitions: &'a [&'a JournalEntry]) -> Self {
        Self {
            current,
            transitions,
        }
    }

    /// Build the timeline for `issue` from a [`transitions_by_issue`] map.
    pub fn for_issue(
        issue: &Issue,
        transitions: &'a HashMap<i64, Vec<&'a JournalEntry>>,
    ) -> Self {
        let list = transitions
            .get(&issue.id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        Self::new(issue.status_id, list)
    }

    pub fn status_on(&self, day: NaiveDate) -> i64 {
        let idx = self
            .transitions
            .partition_point(|j| j.created_on.date() <= day);
        if idx > 0 {
            self.transitions[idx - 1].new_status_id
        } else {
            self.transitions
                .first()
                .map(|j| j.old_status_id)
                .unwrap_or(self.current)
        }
    }
}

fn status_name_map(statuses: &[IssueStatus]) -> HashMap<i64, &str> {
    statuses.iter().map(|s| (s.id, s.name.as_str())).collect()
}

/// Per-day status counts over `[start, end]`, tallied by replaying each
/// issue's timeline and pivoted into one series per status name. Issues are
/// only counted from their creation day onward, so the per-day total equals
/// the number of issues created on or before that day.
pub fn status_distribution(
    issues: &[&Issue],
    transitions: &HashMap<i64, Vec<&JournalEntry>>,
    statuses: &[IssueStatus],
    start: NaiveDate,
    end: NaiveDate,
) -> StatusDistribution {
    let names = status_name_map(statuses);
    let timelines: Vec<(NaiveDate, StatusTimeline)> = issues
        .iter()
        .map(|i| (i.created_on.date(), StatusTimeline::for_issue(i, transitions)))
        .collect();

    let mut dates = Vec::new();
    let mut per_day: Vec<HashMap<&str, u64>> = Vec::new();
    let mut saw_unknown = false;

    let mut day = start;
    while day <= end {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for (created, timeline) in &timelines {
            if *created > day {
                continue;
            }
            let status_id = timeline.status_on(day);
            let name = match names.get(&status_id) {
                Some(name) => *name,
                None => {
                    saw_unknown = true;
                    UNKNOWN_STATUS
                }
            };
            *counts.entry(name).or_insert(0) += 1;
        }
        dates.push(day.to_string());
        per_day.push(counts);
        day += Duration::days(1);
    }

    let mut series: Vec<StatusSeries> = statuses
        .iter()
        .map(|s| StatusSeries {
            name: s.name.clone(),
            data: per_day
                .iter()
                .map(|c| c.get(s.name.as_str()).copied().unwrap_or(0))
                .collect(),
        })
        .collect();
    if saw_unknown {
        series.push(StatusSeries {
            name: UNKNOWN_STATUS.to_string(),
            data: per_day
                .iter()
                .map(|c| c.get(UNKNOWN_STATUS).copied().unwrap_or(0))
                .collect(),
        });
    }

    StatusDistribution { dates, series }
}

/// Cumulative flow: the same creation-gated replay as
/// [`status_distribution`], emitted as one `{date, status → count}` row per
/// day for stacked rendering.
pub fn cumulative_flow(
    issues: &[&Issue],
    transitions: &HashMap<i64, Vec<&JournalEntry>>,
    statuses: &[IssueStatus],
    start: NaiveDate,
    end: NaiveDate,
) -> CumulativeFlow {
    let names = status_name_map(statuses);
    let timelines: Vec<(NaiveDate, StatusTimeline)> = issues
        .iter()
        .map(|i| (i.created_on.date(), StatusTimeline::for_issue(i, transitions)))
        .collect();

    let mut series = Vec::new();
    let mut day = start;
    while day <= end {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for (created, timeline) in &timelines {
            if *created > day {
                continue;
            }
            let status_id = timeline.status_on(day);
            let name = names
                .get(&status_id)
                .copied()
                .unwrap_or(UNKNOWN_STATUS)
                .to_string();
            *counts.entry(name).or_insert(0) += 1;
        }
        series.push(CfdPoint {
            date: day.to_string(),
            statuses: counts,
        });
        day += Duration::days(1);
    }

    CumulativeFlow {
        series,
        status_names: statuses.iter().map(|s| s.name.clone()).collect(),
    }
}

/// Per-status sojourn durations over currently-closed issues.
///
/// For each issue, walk its transitions in ascending order starting from the
/// creation timestamp; each interval between transitions is attributed to the
/// status the issue held during it, and the final interval runs from the last
/// transition to the closing timestamp. Durations are fractional days.
pub fn cycle_time(
    closed_issues: &[&Issue],
    transitions: &HashMap<i64, Vec<&JournalEntry>>,
    statuses: &[IssueStatus],
) -> CycleTimeReport {
    let names = status_name_map(statuses);
    let mut durations: HashMap<&str, Vec<f64>> = HashMap::new();

    for issue in closed_issues {
        let list = transitions
            .get(&issue.id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        let mut prev_status: Option<i64> = None;
        let mut prev_time = issue.created_on;
        for entry in list {
            if let Some(status_id) = prev_status {
                let name = names.get(&status_id).copied().unwrap_or(UNKNOWN_STATUS);
                durations
                    .entry(name)
                    .or_default()
                    .push(round1(fractional_days(prev_time, entry.created_on)));
            }
            prev_status = Some(entry.new_status_id);
            prev_time = entry.created_on;
        }

        if let (Some(status_id), Some(closed_on)) = (prev_status, issue.closed_on) {
            let name = names.get(&status_id).copied().unwrap_or(UNKNOWN_STATUS);
            durations
                .entry(name)
                .or_default()
                .push(round1(fractional_days(prev_time, closed_on)));
        }
    }

    let mut rows: Vec<CycleTimeRow> = durations
        .into_iter()
        .map(|(name, samples)| {
            let avg_days = if samples.is_empty() {
                0.0
            } else {
                round1(samples.iter().sum::<f64>() / samples.len() as f64)
            };
            CycleTimeRow {
                name: name.to_string(),
                avg_days,
                count: samples.len() as u64,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.avg_days
            .partial_cmp(&a.avg_days)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    CycleTimeReport { statuses: rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn statuses() -> Vec<IssueStatus> {
        vec![
            IssueStatus {
                id: 1,
                name: "New".into(),
                is_closed: false,
            },
            IssueStatus {
                id: 2,
                name: "InProgress".into(),
                is_closed: false,
            },
            IssueStatus {
                id: 3,
                name: "Done".into(),
                is_closed: true,
            },
        ]
    }

    fn issue(id: i64, status_id: i64, created: u32, closed: Option<u32>) -> Issue {
        Issue {
            id,
            project_id: 1,
            tracker_id: 1,
            priority_id: 1,
            status_id,
            assigned_to_id: None,
            fixed_version_id: None,
            subject: format!("issue {id}"),
            created_on: at(created, 9),
            updated_on: at(created, 9),
            closed_on: closed.map(|d| at(d, 17)),
            due_date: None,
            estimated_hours: None,
            spent_hours: None,
        }
    }

    fn entry(id: i64, issue_id: i64, ts: NaiveDateTime, old: i64, new: i64) -> JournalEntry {
        JournalEntry {
            id,
            issue_id,
            created_on: ts,
            old_status_id: old,
            new_status_id: new,
        }
    }

    #[test]
    fn test_timeline_no_transitions_keeps_current_status() {
        let timeline = StatusTimeline::new(2, &[]);
        assert_eq!(timeline.status_on(day(1)), 2);
        assert_eq!(timeline.status_on(day(31)), 2);
    }

    #[test]
    fn test_timeline_before_first_transition_uses_old_value() {
        let journals = vec![entry(1, 1, at(10, 12), 1, 2), entry(2, 1, at(20, 12), 2, 3)];
        let refs: Vec<&JournalEntry> = journals.iter().collect();
        let timeline = StatusTimeline::new(3, &refs);

        assert_eq!(timeline.status_on(day(5)), 1); // before any change
        assert_eq!(timeline.status_on(day(10)), 2); // day of first change
        assert_eq!(timeline.status_on(day(15)), 2);
        assert_eq!(timeline.status_on(day(20)), 3);
        assert_eq!(timeline.status_on(day(25)), 3);
    }

    #[test]
    fn test_timeline_same_timestamp_breaks_tie_by_id() {
        // Two changes at the same instant: id order decides which is final.
        let ts = at(10, 12);
        let journals = vec![entry(7, 1, ts, 2, 3), entry(5, 1, ts, 1, 2)];
        let mut map = transitions_by_issue(&journals);
        let list = map.remove(&1).unwrap();
        assert_eq!(list[0].id, 5);
        assert_eq!(list[1].id, 7);

        let timeline = StatusTimeline::new(3, &list);
        assert_eq!(timeline.status_on(day(10)), 3);
        assert_eq!(timeline.status_on(day(9)), 1);
    }

    #[test]
    fn test_distribution_counts_sum_to_created_population() {
        // A: created d1, New -> InProgress on d3; B: created d2, no changes;
        // C: created d5, no changes.
        let issues = vec![issue(1, 2, 1, None), issue(2, 1, 2, None), issue(3, 1, 5, None)];
        let journals = vec![entry(1, 1, at(3, 10), 1, 2)];
        let refs: Vec<&Issue> = issues.iter().collect();
        let transitions = transitions_by_issue(&journals);

        let dist = status_distribution(&refs, &transitions, &statuses(), day(1), day(6));
        assert_eq!(dist.dates.len(), 6);

        // Per-day sums must equal the number of issues created by that day.
        let expected_totals = [1u64, 2, 2, 2, 3, 3];
        for (i, expected) in expected_totals.iter().enumerate() {
            let total: u64 = dist.series.iter().map(|s| s.data[i]).sum();
            assert_eq!(total, *expected, "day index {i}");
        }

        // A is New before its transition day, InProgress from it.
        let new_series = dist.series.iter().find(|s| s.name == "New").unwrap();
        let wip_series = dist.series.iter().find(|s| s.name == "InProgress").unwrap();
        assert_eq!(new_series.data, vec![1, 2, 1, 1, 2, 2]);
        assert_eq!(wip_series.data, vec![0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_distribution_empty_range_when_start_after_end() {
        let issues = vec![issue(1, 1, 1, None)];
        let refs: Vec<&Issue> = issues.iter().collect();
        let transitions = HashMap::new();
        let dist = status_distribution(&refs, &transitions, &statuses(), day(10), day(5));
        assert!(dist.dates.is_empty());
        for s in &dist.series {
            assert!(s.data.is_empty());
        }
    }

    #[test]
    fn test_cumulative_flow_excludes_not_yet_created_and_matches_distribution() {
        let issues = vec![issue(1, 2, 1, None), issue(2, 1, 4, None)];
        let journals = vec![entry(1, 1, at(2, 10), 1, 2)];
        let refs: Vec<&Issue> = issues.iter().collect();
        let transitions = transitions_by_issue(&journals);

        let cfd = cumulative_flow(&refs, &transitions, &statuses(), day(1), day(5));
        assert_eq!(cfd.series.len(), 5);
        assert_eq!(cfd.status_names, vec!["New", "InProgress", "Done"]);

        // Day 1: only issue 1, still New.
        assert_eq!(cfd.series[0].statuses.get("New"), Some(&1));
        assert_eq!(cfd.series[0].statuses.get("InProgress"), None);
        // Day 3: issue 1 moved, issue 2 not yet created.
        assert_eq!(cfd.series[2].statuses.get("InProgress"), Some(&1));
        assert_eq!(cfd.series[2].statuses.get("New"), None);
        // Day 4: both visible.
        assert_eq!(cfd.series[3].statuses.get("New"), Some(&1));
        assert_eq!(cfd.series[3].statuses.get("InProgress"), Some(&1));

        // Both replay paths are the same computation: totals agree per day.
        let dist = status_distribution(&refs, &transitions, &statuses(), day(1), day(5));
        for (i, point) in cfd.series.iter().enumerate() {
            let cfd_total: u64 = point.statuses.values().sum();
            let dist_total: u64 = dist.series.iter().map(|s| s.data[i]).sum();
            assert_eq!(cfd_total, dist_total);
        }
    }

    #[test]
    fn test_unmapped_status_resolves_to_unknown() {
        let issues = vec![issue(1, 99, 1, None)];
        let refs: Vec<&Issue> = issues.iter().collect();
        let transitions = HashMap::new();

        let dist = status_distribution(&refs, &transitions, &statuses(), day(1), day(2));
        let unknown = dist.series.iter().find(|s| s.name == UNKNOWN_STATUS).unwrap();
        assert_eq!(unknown.data, vec![1, 1]);

        let cfd = cumulative_flow(&refs, &transitions, &statuses(), day(1), day(1));
        assert_eq!(cfd.series[0].statuses.get(UNKNOWN_STATUS), Some(&1));
    }

    #[test]
    fn test_cycle_time_attributes_intervals_to_prior_status() {
        // Created d1 09:00, New -> InProgress d2 09:00, InProgress -> Done
        // d4 21:00, closed d5 09:00.
        let mut issue = issue(1, 3, 1, Some(5));
        issue.closed_on = Some(at(5, 9));
        let journals = vec![
            entry(1, 1, at(2, 9), 1, 2),
            entry(2, 1, at(4, 21), 2, 3),
        ];
        let issues = [&issue];
        let transitions = transitions_by_issue(&journals);

        let report = cycle_time(&issues, &transitions, &statuses());

        // No interval before the first transition has a known prior status,
        // so "New" (pre-journal creation state) records nothing.
        assert!(report.statuses.iter().all(|r| r.name != "New"));

        let wip = report.statuses.iter().find(|r| r.name == "InProgress").unwrap();
        assert_eq!(wip.count, 1);
        assert_eq!(wip.avg_days, 2.5); // d2 09:00 -> d4 21:00

        let done = report.statuses.iter().find(|r| r.name == "Done").unwrap();
        assert_eq!(done.count, 1);
        assert_eq!(done.avg_days, 0.5); // d4 21:00 -> d5 09:00

        // Sorted descending by mean duration.
        assert_eq!(report.statuses[0].name, "InProgress");
    }

    #[test]
    fn test_cycle_time_no_transitions_or_no_issues() {
        // An issue with no journal entries contributes no samples.
        let mut closed = issue(1, 3, 1, None);
        closed.closed_on = Some(at(5, 9));
        let issues = [&closed];
        let report = cycle_time(&issues, &HashMap::new(), &statuses());
        assert!(report.statuses.is_empty());

        let empty = cycle_time(&[], &HashMap::new(), &statuses());
        assert!(empty.statuses.is_empty());
    }

    #[test]
    fn test_cycle_time_skips_final_interval_without_closing_timestamp() {
        // Closed status but no closed_on timestamp: the trailing interval is
        // dropped rather than invented.
        let issue = issue(1, 3, 1, None);
        let journals = vec![entry(1, 1, at(2, 9), 1, 3)];
        let issues = [&issue];
        let transitions = transitions_by_issue(&journals);

        let report = cycle_time(&issues, &transitions, &statuses());
        assert!(report.statuses.is_empty());
    }
}
