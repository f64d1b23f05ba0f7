//! Domain services for event registration.
//!
//! Services contain business logic that operates on domain models.

pub mod notification;
pub mod registration;
pub mod registration_validator;

pub use notification::{
    MockNotifier, NotificationTemplate, NotificationVars, Notifier, NotifierError,
    SentNotification,
};
pub use registration::{BulkAction, Registered, RegistrationService, ServiceError};
pub use registration_validator::{
    generate_registration_code, validate, Field, RegistrationErrors, ValidationIssue,
};
