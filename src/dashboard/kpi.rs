use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::date_util::round1;
use crate::model::Issue;

use super::types::{ConcentrationLevel, KpiSummary};

/// Scalar KPIs over the filtered set as of `as_of`. Every aggregator here is
/// pure and independent of the others; an empty set degrades to zeros rather
/// than erroring.
pub fn kpi_summary(issues: &[&Issue], closed_ids: &HashSet<i64>, as_of: NaiveDate) -> KpiSummary {
    let total_count = issues.len() as u64;
    let closed: Vec<&&Issue> = issues
        .iter()
        .filter(|i| closed_ids.contains(&i.status_id))
        .collect();
    let open: Vec<&&Issue> = issues
        .iter()
        .filter(|i| !closed_ids.contains(&i.status_id))
        .collect();
    let closed_count = closed.len() as u64;
    let open_count = open.len() as u64;

    let completion_rate = if total_count > 0 {
        round1(closed_count as f64 / total_count as f64 * 100.0)
    } else {
        0.0
    };

    let delayed_count = open
        .iter()
        .filter(|i| i.due_date.is_some_and(|due| due < as_of))
        .count() as u64;

    // Lead time: whole days from creation to closing, over closed issues
    // that carry a closing timestamp.
    let lead_times: Vec<i64> = closed
        .iter()
        .filter_map(|i| {
            i.closed_on
                .map(|closed_on| (closed_on.date() - i.created_on.date()).num_days())
        })
        .collect();
    let avg_lead_time = if lead_times.is_empty() {
        0.0
    } else {
        round1(lead_times.iter().sum::<i64>() as f64 / lead_times.len() as f64)
    };

    let week_ago = as_of - Duration::days(7);
    let throughput = closed
        .iter()
        .filter(|i| i.closed_on.is_some_and(|c| c.date() > week_ago))
        .count() as u64;

    let due_date_set_count = open.iter().filter(|i| i.due_date.is_some()).count() as u64;
    let due_date_rate = if open_count > 0 {
        round1(due_date_set_count as f64 / open_count as f64 * 100.0)
    } else {
        0.0
    };
    let unset_due_date_count = open_count - due_date_set_count;

    let stagnant_count = open
        .iter()
        .filter(|i| i.updated_on.date() < week_ago)
        .count() as u64;
    let bottleneck_rate = if open_count > 0 {
        round1(stagnant_count as f64 / open_count as f64 * 100.0)
    } else {
        0.0
    };

    // Concentration: the unassigned bucket competes like any assignee.
    let mut assignee_counts: HashMap<Option<i64>, u64> = HashMap::new();
    for issue in &open {
        *assignee_counts.entry(issue.assigned_to_id).or_insert(0) += 1;
    }
    let top_assignee_count = assignee_counts.values().copied().max().unwrap_or(0);
    let concentration_high = open_count > 2
        && (top_assignee_count as f64 / open_count as f64 > 0.5 || top_assignee_count > 5);

    KpiSummary {
        completion_rate,
        delayed_count,
        avg_lead_time,
        wip_count: open_count,
        throughput,
        due_date_rate,
        unset_due_date_count,
        bottleneck_rate,
        stagnant_count,
        assignee_concentration: if concentration_high {
            ConcentrationLevel::High
        } else {
            ConcentrationLevel::Normal
        },
        top_assignee_count,
    }
}
