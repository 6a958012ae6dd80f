use crate::model::Issue;

/// Optional selection criteria applied to the base issue collection. An
/// absent field means "no constraint"; present fields combine with AND.
/// Nonexistent ids simply yield an empty result.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub project_ids: Option<Vec<i64>>,
    pub version_id: Option<i64>,
    pub tracker_id: Option<i64>,
    pub assigned_to_id: Option<i64>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(ref ids) = self.project_ids {
            if !ids.contains(&issue.project_id) {
                return false;
            }
        }
        if let Some(version_id) = self.version_id {
            if issue.fixed_version_id != Some(version_id) {
                return false;
            }
        }
        if let Some(tracker_id) = self.tracker_id {
            if issue.tracker_id != tracker_id {
                return false;
            }
        }
        if let Some(assigned_to_id) = self.assigned_to_id {
            if issue.assigned_to_id != Some(assigned_to_id) {
                return false;
            }
        }
        true
    }
}

/// Returns a new filtered view over `base`; the base collection is never
/// mutated.
pub fn apply<'a>(base: &[&'a Issue], filter: &IssueFilter) -> Vec<&'a Issue> {
    base.iter().copied().filter(|i| filter.matches(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn issue(id: i64, project_id: i64, tracker_id: i64, assignee: Option<i64>) -> Issue {
        let ts = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Issue {
            id,
            project_id,
            tracker_id,
            priority_id: 1,
            status_id: 1,
            assigned_to_id: assignee,
            fixed_version_id: Some(id % 2),
            subject: format!("issue {id}"),
            created_on: ts,
            updated_on: ts,
            closed_on: None,
            due_date: None,
            estimated_hours: None,
            spent_hours: None,
        }
    }

    #[test]
    fn test_no_constraints_returns_all() {
        let issues = vec![issue(1, 10, 1, None), issue(2, 11, 2, Some(5))];
        let base: Vec<&Issue> = issues.iter().collect();
        let filtered = apply(&base, &IssueFilter::default());
        assert_eq!(filtered.len(), 2);
        // base is untouched
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let issues = vec![
            issue(1, 10, 1, Some(5)),
            issue(2, 10, 2, Some(5)),
            issue(3, 11, 1, Some(5)),
            issue(4, 10, 1, None),
        ];
        let base: Vec<&Issue> = issues.iter().collect();
        let filter = IssueFilter {
            project_ids: Some(vec![10]),
            tracker_id: Some(1),
            assigned_to_id: Some(5),
            ..Default::default()
        };
        let filtered = apply(&base, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn test_version_filter() {
        let issues = vec![issue(1, 10, 1, None), issue(2, 10, 1, None)];
        let base: Vec<&Issue> = issues.iter().collect();
        let filter = IssueFilter {
            version_id: Some(0),
            ..Default::default()
        };
        let filtered = apply(&base, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_unknown_ids_yield_empty_not_error() {
        let issues = vec![issue(1, 10, 1, Some(5))];
        let base: Vec<&Issue> = issues.iter().collect();
        let filter = IssueFilter {
            project_ids: Some(vec![999]),
            ..Default::default()
        };
        assert!(apply(&base, &filter).is_empty());
    }

    #[test]
    fn test_unassigned_never_matches_assignee_filter() {
        let issues = vec![issue(1, 10, 1, None)];
        let base: Vec<&Issue> = issues.iter().collect();
        let filter = IssueFilter {
            assigned_to_id: Some(5),
            ..Default::default()
        };
        assert!(apply(&base, &filter).is_empty());
    }
}
