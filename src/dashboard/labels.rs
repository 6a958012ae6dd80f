use std::collections::BTreeMap;

/// Display strings passed through to the rendering layer. The engine never
/// interprets these; the map is deterministically ordered so identical
/// snapshots serialize to identical payloads.
const LABELS: &[(&str, &str)] = &[
    ("kpi", "KPI Summary"),
    ("burndown", "Burndown Chart"),
    ("velocity", "Velocity"),
    ("status_dist", "Status Distribution"),
    ("tracker_dist", "Tracker Distribution"),
    ("priority_dist", "Priority Distribution"),
    ("workload", "Workload"),
    ("delay", "Delay Analysis"),
    ("version_progress", "Version Progress"),
    ("cumulative_flow", "Cumulative Flow"),
    ("cycle_time", "Cycle Time"),
    ("issue_list", "Issue List"),
    ("completion_rate", "Completion Rate"),
    ("delayed_tickets", "Delayed Tickets"),
    ("avg_lead_time", "Avg Lead Time"),
    ("wip_count", "WIP"),
    ("throughput", "Throughput (7d)"),
    ("due_date_rate", "Due Date Rate"),
    ("bottleneck_rate", "Bottleneck Rate"),
    ("assignee_concentration", "Assignee Concentration"),
    ("days", "days"),
    ("ideal_line", "Ideal"),
    ("remaining_issues", "Remaining Issues"),
    ("unassigned", "Unassigned"),
    ("text_items_per_week", "items/week"),
    ("text_unset", "unset"),
    ("text_stagnant_ratio", "stagnant"),
    ("text_concentration_high", "High concentration"),
    ("loading", "Loading dashboard..."),
    ("error", "Failed to load dashboard data"),
];

pub fn labels() -> BTreeMap<&'static str, &'static str> {
    LABELS.iter().copied().collect()
}
