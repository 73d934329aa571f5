use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::entities::sea_orm_active_enums::StudentStatus;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStatsResponse {
    pub total_students: u64,
    pub total_teachers: u64,
    pub total_classes: u64,
    pub total_subjects: u64,
    /// Every status is present, zero when no student has it.
    #[schema(example = json!({"active": 120, "inactive": 3, "graduated": 40, "transferred": 2}))]
    pub students_by_status: BTreeMap<String, i64>,
}

/// Fills in zero counts for statuses no student has.
pub fn status_breakdown(counts: Vec<(StudentStatus, i64)>) -> BTreeMap<String, i64> {
    let mut breakdown: BTreeMap<String, i64> = [
        StudentStatus::Active,
        StudentStatus::Inactive,
        StudentStatus::Graduated,
        StudentStatus::Transferred,
    ]
    .into_iter()
    .map(|status| (status_key(status).to_string(), 0))
    .collect();

    for (status, count) in counts {
        breakdown.insert(status_key(status).to_string(), count);
    }
    breakdown
}

fn status_key(status: StudentStatus) -> &'static str {
    match status {
        StudentStatus::Active => "active",
        StudentStatus::Inactive => "inactive",
        StudentStatus::Graduated => "graduated",
        StudentStatus::Transferred => "transferred",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_lists_every_status() {
        let breakdown = status_breakdown(vec![
            (StudentStatus::Active, 12),
            (StudentStatus::Graduated, 3),
        ]);
        assert_eq!(breakdown.len(), 4);
        assert_eq!(breakdown["active"], 12);
        assert_eq!(breakdown["graduated"], 3);
        assert_eq!(breakdown["inactive"], 0);
        assert_eq!(breakdown["transferred"], 0);
    }
}
