pub mod connection;
pub mod endorsement;
pub mod message;
pub mod profile;
pub mod project;
pub mod skill;
pub mod user;

pub use connection::{Connection, ConnectionStatus};
pub use endorsement::Endorsement;
pub use message::Message;
pub use profile::Profile;
pub use project::Project;
pub use skill::{Proficiency, Skill};
pub use user::User;
