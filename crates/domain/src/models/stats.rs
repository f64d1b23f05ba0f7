//! Aggregate statistics for the admin dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::content::{ContentItem, ContentKind};
use super::registrant::{Department, Registrant, RegistrantKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCount {
    pub department: Department,
    pub count: i64,
}

/// Registrant aggregates across both kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStats {
    pub total: i64,
    pub participants: i64,
    pub volunteers: i64,
    pub confirmed: i64,
    pub checked_in: i64,
    pub leaders: i64,
    /// Volunteer head-count per department, in vocabulary order, zeros included.
    pub departments: Vec<DepartmentCount>,
}

impl RegistrationStats {
    pub fn from_registrants<'a>(registrants: impl IntoIterator<Item = &'a Registrant>) -> Self {
        let mut stats = RegistrationStats::default();
        let mut per_department = [0i64; Department::ALL.len()];

        for r in registrants {
            stats.total += 1;
            match r.kind {
                RegistrantKind::Participant => stats.participants += 1,
                RegistrantKind::Volunteer => stats.volunteers += 1,
            }
            if r.is_confirmed {
                stats.confirmed += 1;
            }
            if r.check_in_status {
                stats.checked_in += 1;
            }
            if r.is_leader.is_leader() {
                stats.leaders += 1;
            }
            for dept in &r.departments {
                if let Some(idx) = Department::ALL.iter().position(|d| d == dept) {
                    per_department[idx] += 1;
                }
            }
        }

        stats.departments = Self::department_counts(|d| {
            Department::ALL
                .iter()
                .position(|x| *x == d)
                .map(|idx| per_department[idx])
                .unwrap_or(0)
        });
        stats
    }

    /// Builds the per-department list in vocabulary order.
    pub fn department_counts(mut count_for: impl FnMut(Department) -> i64) -> Vec<DepartmentCount> {
        Department::ALL
            .iter()
            .map(|d| DepartmentCount {
                department: *d,
                count: count_for(*d),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentKindStats {
    pub kind: ContentKind,
    pub count: i64,
    pub views: i64,
    pub plays: i64,
    pub downloads: i64,
}

impl ContentKindStats {
    pub fn empty(kind: ContentKind) -> Self {
        Self {
            kind,
            count: 0,
            views: 0,
            plays: 0,
            downloads: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub total_items: i64,
    pub total_views: i64,
    pub total_plays: i64,
    pub total_downloads: i64,
    pub by_kind: Vec<ContentKindStats>,
}

impl ContentStats {
    /// Combines per-kind rows into totals. Kinds without rows are reported as zero.
    pub fn from_kind_rows(rows: Vec<ContentKindStats>) -> Self {
        let by_kind: Vec<ContentKindStats> = ContentKind::ALL
            .iter()
            .map(|kind| {
                rows.iter()
                    .find(|r| r.kind == *kind)
                    .cloned()
                    .unwrap_or_else(|| ContentKindStats::empty(*kind))
            })
            .collect();

        Self {
            total_items: by_kind.iter().map(|k| k.count).sum(),
            total_views: by_kind.iter().map(|k| k.views).sum(),
            total_plays: by_kind.iter().map(|k| k.plays).sum(),
            total_downloads: by_kind.iter().map(|k| k.downloads).sum(),
            by_kind,
        }
    }

    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a ContentItem>) -> Self {
        let mut rows: Vec<ContentKindStats> = Vec::new();
        for item in items {
            let pos = match rows.iter().position(|r| r.kind == item.kind) {
                Some(pos) => pos,
                None => {
                    rows.push(ContentKindStats::empty(item.kind));
                    rows.len() - 1
                }
            };
            let row = &mut rows[pos];
            row.count += 1;
            row.views += item.views;
            row.plays += item.plays;
            row.downloads += item.downloads;
        }
        Self::from_kind_rows(rows)
    }
}

/// Combined response for `GET /api/v1/admin/stats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub registrations: RegistrationStats,
    pub content: ContentStats,
    pub generated_at: DateTime<Utc>,
}
