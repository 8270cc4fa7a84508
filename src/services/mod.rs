pub mod access;
pub mod accounts;
pub mod connections;
pub mod endorsements;
pub mod error;
pub mod messages;
pub mod profiles;
pub mod projects;
pub mod skills;
pub mod validate;

pub use access::{authorize, Resource};
pub use accounts::AccountService;
pub use connections::ConnectionService;
pub use endorsements::EndorsementService;
pub use error::ServiceError;
pub use messages::MessageService;
pub use profiles::ProfileService;
pub use projects::ProjectService;
pub use skills::SkillService;

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial updates.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
