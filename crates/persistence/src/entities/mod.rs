//! Database entity definitions.

pub mod content;
pub mod registrant;

pub use content::{ContentItemEntity, ContentKindDb, ContentKindStatsRow};
pub use registrant::{
    DepartmentCountRow, GenderDb, LeaderStatusDb, MaritalStatusDb, RegistrantEntity,
    RegistrantKindDb, RegistrationTotalsRow,
};
