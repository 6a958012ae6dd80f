use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::date_util::{round1, week_start};
use crate::model::{Issue, Priority, Tracker, User, Version};

use super::types::{
    BurndownChart, DelayAnalysis, Distribution, HistogramBuckets, IdealPoint, NameValue,
    PriorityDistribution, PrioritySlice, SeriesPoint, VelocityChart, VelocityPoint, VersionProgress,
    VersionRow, WorkloadAnalysis, WorkloadRow,
};

/// Label for the no-assignee bucket in workload grouping.
pub const UNASSIGNED: &str = "Unassigned";

/// Daily open-issue counts over `[start, end]`: an issue is open on day `d`
/// when it was created on or before `d` and not yet closed by the end of `d`.
pub fn burndown(issues: &[&Issue], start: NaiveDate, end: NaiveDate) -> BurndownChart {
    let mut series = Vec::new();
    let mut day = start;
    while day <= end {
        let count = issues
            .iter()
            .filter(|i| {
                i.created_on.date() <= day && i.closed_on.is_none_or(|c| c.date() > day)
            })
            .count() as u64;
        series.push(SeriesPoint {
            date: day.to_string(),
            count,
        });
        day += Duration::days(1);
    }
    let ideal = ideal_line(&series, start, end);
    BurndownChart { series, ideal }
}

/// Straight line from the first day's open count down to zero across the
/// span, clamped at zero. Empty when the series is empty or the span is a
/// single day.
fn ideal_line(series: &[SeriesPoint], start: NaiveDate, end: NaiveDate) -> Vec<IdealPoint> {
    let Some(first) = series.first() else {
        return Vec::new();
    };
    let start_value = first.count as f64;
    let total_days = (end - start).num_days();
    if total_days <= 0 {
        return Vec::new();
    }

    (0..=total_days)
        .map(|offset| {
            let ideal = start_value - start_value * (offset as f64 / total_days as f64);
            IdealPoint {
                date: (start + Duration::days(offset)).to_string(),
                count: round1(ideal.max(0.0)),
            }
        })
        .collect()
}

/// Daily counts of issues that were already late on day `d`: due date set,
/// created on or before `d`, still open at the end of `d`, and due strictly
/// before `d` (due exactly on `d` is not yet late).
pub fn delay_trend(issues: &[&Issue], start: NaiveDate, end: NaiveDate) -> Vec<SeriesPoint> {
    let dated: Vec<&&Issue> = issues.iter().filter(|i| i.due_date.is_some()).collect();
    let mut trend = Vec::new();
    let mut day = start;
    while day <= end {
        let count = dated
            .iter()
            .filter(|i| {
                i.created_on.date() <= day
                    && i.closed_on.is_none_or(|c| c.date() > day)
                    && i.due_date.is_some_and(|due| due < day)
            })
            .count() as u64;
        trend.push(SeriesPoint {
            date: day.to_string(),
            count,
        });
        day += Duration::days(1);
    }
    trend
}

/// Fixed age buckets used for both the delay-age and stagnation-age
/// distributions. Bucket counts always sum to the input length.
pub fn histogram_buckets(days: &[i64]) -> HistogramBuckets {
    let mut buckets = HistogramBuckets::default();
    for &d in days {
        if d <= 3 {
            buckets.zero_to_three += 1;
        } else if d <= 7 {
            buckets.four_to_seven += 1;
        } else if d <= 14 {
            buckets.eight_to_fourteen += 1;
        } else {
            buckets.fifteen_plus += 1;
        }
    }
    buckets
}

/// Delay trend plus age histograms over the currently-open issues.
pub fn delay_analysis(
    issues: &[&Issue],
    open_issues: &[&Issue],
    start: NaiveDate,
    end: NaiveDate,
    as_of: NaiveDate,
) -> DelayAnalysis {
    let delay_days: Vec<i64> = open_issues
        .iter()
        .filter_map(|i| i.due_date.filter(|due| *due < as_of))
        .map(|due| (as_of - due).num_days())
        .collect();

    let stagnation_days: Vec<i64> = open_issues
        .iter()
        .map(|i| (as_of - i.updated_on.date()).num_days())
        .collect();

    DelayAnalysis {
        trend: delay_trend(issues, start, end),
        delay_histogram: histogram_buckets(&delay_days),
        stagnation_histogram: histogram_buckets(&stagnation_days),
    }
}

/// Weekly closed-issue counts and summed estimated hours over the trailing
/// twelve full weeks through the current week. Weeks start on Monday.
pub fn velocity(closed_issues: &[&Issue], as_of: NaiveDate) -> VelocityChart {
    let start = week_start(as_of - Duration::weeks(12));
    let mut series = Vec::new();
    let mut week = start;
    while week <= as_of {
        let in_week: Vec<&&Issue> = closed_issues
            .iter()
            .filter(|i| i.closed_on.is_some_and(|c| week_start(c.date()) == week))
            .collect();
        let points = round1(
            in_week
                .iter()
                .map(|i| i.estimated_hours.unwrap_or(0.0))
                .sum(),
        );
        series.push(VelocityPoint {
            week: week.to_string(),
            count: in_week.len() as u64,
            points,
        });
        week += Duration::weeks(1);
    }
    VelocityChart { series }
}

/// Open issues grouped by assignee with per-group effort sums, heaviest
/// group first.
pub fn workload(open_issues: &[&Issue], users: &[User]) -> WorkloadAnalysis {
    let names: HashMap<i64, &str> = users.iter().map(|u| (u.id, u.name.as_str())).collect();

    let mut groups: HashMap<String, (u64, f64, f64)> = HashMap::new();
    for issue in open_issues {
        let name = match issue.assigned_to_id {
            None => UNASSIGNED.to_string(),
            Some(id) => names
                .get(&id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("User #{id}")),
        };
        let entry = groups.entry(name).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += issue.estimated_hours.unwrap_or(0.0);
        entry.2 += issue.spent_hours.unwrap_or(0.0);
    }

    let mut series: Vec<WorkloadRow> = groups
        .into_iter()
        .map(|(name, (count, estimated, spent))| WorkloadRow {
            name,
            count,
            estimated_hours: round1(estimated),
            spent_hours: round1(spent),
        })
        .collect();
    series.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    WorkloadAnalysis { series }
}

/// Filtered issues grouped by tracker name, largest group first. Issues
/// referencing an unknown tracker are dropped, as a join would drop them.
pub fn tracker_distribution(issues: &[&Issue], trackers: &[Tracker]) -> Distribution {
    let names: HashMap<i64, &str> = trackers.iter().map(|t| (t.id, t.name.as_str())).collect();

    let mut groups: HashMap<&str, u64> = HashMap::new();
    for issue in issues {
        if let Some(name) = names.get(&issue.tracker_id) {
            *groups.entry(name).or_insert(0) += 1;
        }
    }

    let mut series: Vec<NameValue> = groups
        .into_iter()
        .map(|(name, value)| NameValue {
            name: name.to_string(),
            value,
        })
        .collect();
    series.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));

    Distribution { series }
}

/// Filtered issues grouped by priority name, ordered by the administrative
/// priority position rather than alphabetically or by count.
pub fn priority_distribution(issues: &[&Issue], priorities: &[Priority]) -> PriorityDistribution {
    let mut counts: HashMap<i64, u64> = HashMap::new();
    for issue in issues {
        *counts.entry(issue.priority_id).or_insert(0) += 1;
    }

    let mut series: Vec<PrioritySlice> = priorities
        .iter()
        .filter_map(|p| {
            counts.get(&p.id).map(|&value| PrioritySlice {
                name: p.name.clone(),
                value,
                position: p.position,
            })
        })
        .collect();
    series.sort_by_key(|s| s.position);

    PriorityDistribution { series }
}

/// Progress rows for the open versions visible under the project subtree,
/// due soonest first; versions without a due date sort last.
pub fn version_progress(versions: &[Version], subtree: &[i64]) -> VersionProgress {
    let mut rows: Vec<VersionRow> = versions
        .iter()
        .filter(|v| v.status == "open" && subtree.contains(&v.project_id))
        .map(|v| VersionRow {
            id: v.id,
            name: v.name.clone(),
            status: v.status.clone(),
            due_date: v.effective_date,
            completed_rate: v.completed_percent,
            estimated_hours: v.estimated_hours.unwrap_or(0.0),
            spent_hours: v.spent_hours.unwrap_or(0.0),
        })
        .collect();
    rows.sort_by(|a, b| {
        let a_due = a.due_date.unwrap_or(NaiveDate::MAX);
        let b_due = b.due_date.unwrap_or(NaiveDate::MAX);
        a_due.cmp(&b_due).then_with(|| a.name.cmp(&b.name))
    });

    VersionProgress { versions: rows }
}
