//! Registrant entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::registrant::{
    Department, Gender, LeaderStatus, MaritalStatus, Registrant, RegistrantKind,
};
use domain::models::stats::{DepartmentCount, RegistrationStats};
use domain::repositories::StoreError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for `registrant_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "registrant_kind", rename_all = "lowercase")]
pub enum RegistrantKindDb {
    Participant,
    Volunteer,
}

impl From<RegistrantKindDb> for RegistrantKind {
    fn from(db: RegistrantKindDb) -> Self {
        match db {
            RegistrantKindDb::Participant => RegistrantKind::Participant,
            RegistrantKindDb::Volunteer => RegistrantKind::Volunteer,
        }
    }
}

impl From<RegistrantKind> for RegistrantKindDb {
    fn from(kind: RegistrantKind) -> Self {
        match kind {
            RegistrantKind::Participant => RegistrantKindDb::Participant,
            RegistrantKind::Volunteer => RegistrantKindDb::Volunteer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
pub enum GenderDb {
    Male,
    Female,
}

impl From<GenderDb> for Gender {
    fn from(db: GenderDb) -> Self {
        match db {
            GenderDb::Male => Gender::Male,
            GenderDb::Female => Gender::Female,
        }
    }
}

impl From<Gender> for GenderDb {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => GenderDb::Male,
            Gender::Female => GenderDb::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "marital_status", rename_all = "lowercase")]
pub enum MaritalStatusDb {
    Single,
    Engaged,
    Married,
}

impl From<MaritalStatusDb> for MaritalStatus {
    fn from(db: MaritalStatusDb) -> Self {
        match db {
            MaritalStatusDb::Single => MaritalStatus::Single,
            MaritalStatusDb::Engaged => MaritalStatus::Engaged,
            MaritalStatusDb::Married => MaritalStatus::Married,
        }
    }
}

impl From<MaritalStatus> for MaritalStatusDb {
    fn from(status: MaritalStatus) -> Self {
        match status {
            MaritalStatus::Single => MaritalStatusDb::Single,
            MaritalStatus::Engaged => MaritalStatusDb::Engaged,
            MaritalStatus::Married => MaritalStatusDb::Married,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "leader_status", rename_all = "lowercase")]
pub enum LeaderStatusDb {
    Yes,
    No,
}

impl From<LeaderStatusDb> for LeaderStatus {
    fn from(db: LeaderStatusDb) -> Self {
        match db {
            LeaderStatusDb::Yes => LeaderStatus::Yes,
            LeaderStatusDb::No => LeaderStatus::No,
        }
    }
}

impl From<LeaderStatus> for LeaderStatusDb {
    fn from(status: LeaderStatus) -> Self {
        match status {
            LeaderStatus::Yes => LeaderStatusDb::Yes,
            LeaderStatus::No => LeaderStatusDb::No,
        }
    }
}

/// Database row mapping for the registrants table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrantEntity {
    pub id: Uuid,
    pub kind: RegistrantKindDb,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub gender: GenderDb,
    pub marital_status: MaritalStatusDb,
    pub is_leader: LeaderStatusDb,
    pub ministry: Option<String>,
    pub custom_ministry: Option<String>,
    pub departments: Vec<String>,
    pub registration_code: String,
    pub is_confirmed: bool,
    pub check_in_status: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RegistrantEntity> for Registrant {
    type Error = StoreError;

    fn try_from(entity: RegistrantEntity) -> Result<Self, Self::Error> {
        let departments = entity
            .departments
            .iter()
            .map(|d| d.parse::<Department>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Backend)?;

        Ok(Self {
            id: entity.id,
            kind: entity.kind.into(),
            first_name: entity.first_name,
            last_name: entity.last_name,
            email: entity.email,
            phone: entity.phone,
            address: entity.address,
            gender: entity.gender.into(),
            marital_status: entity.marital_status.into(),
            is_leader: entity.is_leader.into(),
            ministry: entity.ministry,
            custom_ministry: entity.custom_ministry,
            departments,
            registration_code: entity.registration_code,
            is_confirmed: entity.is_confirmed,
            check_in_status: entity.check_in_status,
            check_in_time: entity.check_in_time,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

/// Row shape for the registrant totals aggregate.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationTotalsRow {
    pub total: i64,
    pub participants: i64,
    pub volunteers: i64,
    pub confirmed: i64,
    pub checked_in: i64,
    pub leaders: i64,
}

/// Row shape for the per-department volunteer count.
#[derive(Debug, Clone, FromRow)]
pub struct DepartmentCountRow {
    pub department: String,
    pub count: i64,
}

impl RegistrationTotalsRow {
    /// Merges totals with department rows. Departments missing from the rows count as zero.
    pub fn into_stats(self, departments: &[DepartmentCountRow]) -> RegistrationStats {
        RegistrationStats {
            total: self.total,
            participants: self.participants,
            volunteers: self.volunteers,
            confirmed: self.confirmed,
            checked_in: self.checked_in,
            leaders: self.leaders,
            departments: department_counts(departments),
        }
    }
}

fn department_counts(rows: &[DepartmentCountRow]) -> Vec<DepartmentCount> {
    RegistrationStats::department_counts(|d| {
        rows.iter()
            .find(|row| row.department == d.as_str())
            .map(|row| row.count)
            .unwrap_or(0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> RegistrantEntity {
        let now = Utc::now();
        RegistrantEntity {
            id: Uuid::new_v4(),
            kind: RegistrantKindDb::Volunteer,
            first_name: "Dorothy".to_string(),
            last_name: "Vaughan".to_string(),
            email: "dorothy@x.com".to_string(),
            phone: "08031234567".to_string(),
            address: "Hampton".to_string(),
            gender: GenderDb::Female,
            marital_status: MaritalStatusDb::Married,
            is_leader: LeaderStatusDb::Yes,
            ministry: Some("choir".to_string()),
            custom_ministry: None,
            departments: vec!["technical".to_string(), "welfare".to_string()],
            registration_code: "VOL-000001-ABCD".to_string(),
            is_confirmed: true,
            check_in_status: false,
            check_in_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_entity_into_registrant() {
        let r = Registrant::try_from(entity()).unwrap();
        assert_eq!(r.kind, RegistrantKind::Volunteer);
        assert_eq!(r.is_leader, LeaderStatus::Yes);
        assert_eq!(
            r.departments,
            vec![Department::Technical, Department::Welfare]
        );
    }

    #[test]
    fn test_unknown_department_is_backend_error() {
        let mut e = entity();
        e.departments = vec!["catering".to_string()];
        assert!(matches!(
            Registrant::try_from(e),
            Err(StoreError::Backend(_))
        ));
    }

    #[test]
    fn test_totals_into_stats_fills_missing_departments() {
        let totals = RegistrationTotalsRow {
            total: 3,
            participants: 1,
            volunteers: 2,
            confirmed: 3,
            checked_in: 1,
            leaders: 0,
        };
        let rows = vec![DepartmentCountRow {
            department: "media".to_string(),
            count: 2,
        }];
        let stats = totals.into_stats(&rows);
        assert_eq!(stats.volunteers, 2);
        assert_eq!(stats.departments.len(), Department::ALL.len());
        assert_eq!(stats.departments[0].department, Department::Media);
        assert_eq!(stats.departments[0].count, 2);
        assert!(stats.departments[1..].iter().all(|d| d.count == 0));
    }

    #[test]
    fn test_enum_round_trip() {
        for kind in [RegistrantKind::Participant, RegistrantKind::Volunteer] {
            assert_eq!(RegistrantKind::from(RegistrantKindDb::from(kind)), kind);
        }
    }
}
