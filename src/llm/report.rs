use crate::dashboard::DashboardSummary;
use crate::error::{Error, Result};

/// How many trailing burndown points and leading issues the prompt carries.
const BURNDOWN_TAIL: usize = 5;
const ISSUE_LIMIT: usize = 10;

/// Generate an executive status report for a computed dashboard.
pub async fn analyze(
    agent: &mixtape_core::Agent,
    summary: &DashboardSummary,
    project_name: &str,
) -> Result<String> {
    let prompt = build_prompt(summary, project_name);
    let response = agent
        .run(&prompt)
        .await
        .map_err(|e| Error::Llm(e.to_string()))?;
    Ok(response.text().trim().to_string())
}

/// Render the computed metrics into the analysis prompt. The engine output
/// is the single source of numbers here; the model adds no data of its own.
pub fn build_prompt(summary: &DashboardSummary, project_name: &str) -> String {
    let kpis = &summary.kpis;

    let burndown_tail: Vec<String> = summary
        .burndown
        .series
        .iter()
        .rev()
        .take(BURNDOWN_TAIL)
        .rev()
        .map(|p| format!("- {}: {} open", p.date, p.count))
        .collect();

    let top_issues: Vec<String> = summary
        .issues
        .iter()
        .take(ISSUE_LIMIT)
        .map(|i| {
            format!(
                "- #{} [{}] {} (delay: {}d, idle: {}d)",
                i.id, i.status, i.subject, i.delay_days, i.stagnation_days
            )
        })
        .collect();

    format!(
        r#"You are a project manager reviewing the "{project_name}" project. Using only
the metrics below, write a concise status report in Markdown with these
sections: Summary, Risks, Bottlenecks, Next Actions. Base every claim on the
numbers given; state the cause alongside each recommendation, and mark each
risk as Critical, Warning, or Watch.

## KPIs
- Completion rate: {completion_rate}%
- Delayed issues: {delayed_count}
- Average lead time: {avg_lead_time} days
- WIP: {wip_count}
- Throughput (last 7 days): {throughput}
- Due date rate: {due_date_rate}% (unset: {unset_due_date_count})
- Bottleneck rate: {bottleneck_rate}% (stagnant: {stagnant_count})
- Assignee concentration: {concentration:?} (top assignee holds {top_assignee_count})

## Burndown (last {tail_len} days)
{burndown}

## Issues (first {issue_len})
{issues}

Respond with the report only, no preamble."#,
        completion_rate = kpis.completion_rate,
        delayed_count = kpis.delayed_count,
        avg_lead_time = kpis.avg_lead_time,
        wip_count = kpis.wip_count,
        throughput = kpis.throughput,
        due_date_rate = kpis.due_date_rate,
        unset_due_date_count = kpis.unset_due_date_count,
        bottleneck_rate = kpis.bottleneck_rate,
        stagnant_count = kpis.stagnant_count,
        concentration = kpis.assignee_concentration,
        top_assignee_count = kpis.top_assignee_count,
        tail_len = burndown_tail.len(),
        burndown = burndown_tail.join("\n"),
        issue_len = top_issues.len(),
        issues = top_issues.join("\n"),
    )
}
