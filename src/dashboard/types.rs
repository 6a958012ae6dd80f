use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Assignee concentration flag: `High` when one assignee holds a majority
/// (or more than five) of the open issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConcentrationLevel {
    High,
    Normal,
}

/// Scalar KPIs over the filtered issue set as of "today".
#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub completion_rate: f64,
    pub delayed_count: u64,
    pub avg_lead_time: f64,
    pub wip_count: u64,
    pub throughput: u64,
    pub due_date_rate: f64,
    pub unset_due_date_count: u64,
    pub bottleneck_rate: f64,
    pub stagnant_count: u64,
    pub assignee_concentration: ConcentrationLevel,
    pub top_assignee_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdealPoint {
    pub date: String,
    pub count: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BurndownChart {
    pub series: Vec<SeriesPoint>,
    pub ideal: Vec<IdealPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSeries {
    pub name: String,
    pub data: Vec<u64>,
}

/// Per-day status counts pivoted into one series per status name.
#[derive(Debug, Clone, Serialize)]
pub struct StatusDistribution {
    pub dates: Vec<String>,
    pub series: Vec<StatusSeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkloadRow {
    pub name: String,
    pub count: u64,
    pub estimated_hours: f64,
    pub spent_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkloadAnalysis {
    pub series: Vec<WorkloadRow>,
}

/// Fixed age buckets: 0–3, 4–7, 8–14 and open-ended 15+.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistogramBuckets {
    #[serde(rename = "0-3")]
    pub zero_to_three: u64,
    #[serde(rename = "4-7")]
    pub four_to_seven: u64,
    #[serde(rename = "8-14")]
    pub eight_to_fourteen: u64,
    #[serde(rename = "15+")]
    pub fifteen_plus: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DelayAnalysis {
    pub trend: Vec<SeriesPoint>,
    pub delay_histogram: HistogramBuckets,
    pub stagnation_histogram: HistogramBuckets,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameValue {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    pub series: Vec<NameValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrioritySlice {
    pub name: String,
    pub value: u64,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityDistribution {
    pub series: Vec<PrioritySlice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionRow {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub completed_rate: f64,
    pub estimated_hours: f64,
    pub spent_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionProgress {
    pub versions: Vec<VersionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VelocityPoint {
    pub week: String,
    pub count: u64,
    pub points: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VelocityChart {
    pub series: Vec<VelocityPoint>,
}

/// One day of the cumulative flow diagram; only statuses with a nonzero
/// count appear in the map.
#[derive(Debug, Clone, Serialize)]
pub struct CfdPoint {
    pub date: String,
    pub statuses: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CumulativeFlow {
    pub series: Vec<CfdPoint>,
    pub status_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleTimeRow {
    pub name: String,
    pub avg_days: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleTimeReport {
    pub statuses: Vec<CycleTimeRow>,
}

/// One row of the flat issue listing shown beside the charts.
#[derive(Debug, Clone, Serialize)]
pub struct IssueRow {
    pub id: i64,
    pub project_name: String,
    pub subject: String,
    pub status: String,
    pub assigned_to: String,
    pub due_date: Option<NaiveDate>,
    pub delay_days: i64,
    pub stagnation_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectOption {
    pub id: i64,
    pub name: String,
}

/// The full dashboard payload: every metric plus the display-string
/// dictionary and the selectable sub-project list, under stable field names.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub kpis: KpiSummary,
    pub burndown: BurndownChart,
    pub status_distribution: StatusDistribution,
    pub workload: WorkloadAnalysis,
    pub delay_analysis: DelayAnalysis,
    pub tracker_distribution: Distribution,
    pub version_progress: VersionProgress,
    pub velocity: VelocityChart,
    pub priority_distribution: PriorityDistribution,
    pub cumulative_flow: CumulativeFlow,
    pub cycle_time: CycleTimeReport,
    pub issues: Vec<IssueRow>,
    pub available_projects: Vec<ProjectOption>,
    pub labels: BTreeMap<&'static str, &'static str>,
}
