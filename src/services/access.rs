//! Access-control policy.
//!
//! Every service operation describes the record it touches as a `Resource`
//! and asks `authorize` before reaching the store. Anything not explicitly
//! allowed below is denied.

use uuid::Uuid;

use crate::database::models::{Connection, Endorsement, Message, Profile, Project, Skill};
use crate::types::{Action, Identity};

use super::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Profile { owner: Uuid },
    Skill { owner: Uuid },
    Project { owner: Uuid },
    Connection { initiator: Uuid, target: Uuid },
    Message { sender: Uuid, recipient: Uuid },
    Conversation { a: Uuid, b: Uuid },
    Endorsement { endorser: Uuid, skill_owner: Uuid },
}

impl From<&Profile> for Resource {
    fn from(profile: &Profile) -> Self {
        Resource::Profile { owner: profile.id }
    }
}

impl From<&Skill> for Resource {
    fn from(skill: &Skill) -> Self {
        Resource::Skill { owner: skill.profile_id }
    }
}

impl From<&Project> for Resource {
    fn from(project: &Project) -> Self {
        Resource::Project { owner: project.profile_id }
    }
}

impl From<&Connection> for Resource {
    fn from(connection: &Connection) -> Self {
        Resource::Connection {
            initiator: connection.initiator_id,
            target: connection.target_id,
        }
    }
}

impl From<&Message> for Resource {
    fn from(message: &Message) -> Self {
        Resource::Message {
            sender: message.sender_id,
            recipient: message.recipient_id,
        }
    }
}

impl From<&Endorsement> for Resource {
    fn from(endorsement: &Endorsement) -> Self {
        Resource::Endorsement {
            endorser: endorsement.endorser_id,
            skill_owner: endorsement.endorsee_id,
        }
    }
}

impl Resource {
    /// Publicly readable resources need no identity for `Read`
    fn is_public_read(&self, action: Action) -> bool {
        action == Action::Read
            && matches!(
                self,
                Resource::Profile { .. }
                    | Resource::Skill { .. }
                    | Resource::Project { .. }
                    | Resource::Endorsement { .. }
            )
    }
}

fn permits(actor: Uuid, action: Action, resource: &Resource) -> bool {
    use Action::*;

    match (*resource, action) {
        (Resource::Profile { owner }, Update | Delete) => actor == owner,
        (Resource::Skill { owner } | Resource::Project { owner }, Create | Update | Delete) => actor == owner,

        (Resource::Connection { initiator, target }, Read | Delete) => actor == initiator || actor == target,
        (Resource::Connection { initiator, target }, Create) => actor == initiator && initiator != target,
        (Resource::Connection { target, .. }, Respond) => actor == target,

        (Resource::Message { sender, recipient }, Read) => actor == sender || actor == recipient,
        (Resource::Message { sender, recipient }, Create) => actor == sender && sender != recipient,
        (Resource::Message { recipient, .. }, MarkRead) => actor == recipient,
        (Resource::Conversation { a, b }, Read) => actor == a || actor == b,

        (Resource::Endorsement { endorser, skill_owner }, Create) => actor == endorser && endorser != skill_owner,
        (Resource::Endorsement { endorser, .. }, Delete) => actor == endorser,

        _ => false,
    }
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// Anonymous callers get `Unauthenticated` for anything beyond public reads;
/// authenticated callers get `Forbidden` when the policy does not allow it.
pub fn authorize(actor: Option<&Identity>, action: Action, resource: &Resource) -> Result<(), ServiceError> {
    if resource.is_public_read(action) {
        return Ok(());
    }

    let actor = actor.ok_or_else(ServiceError::unauthenticated)?;
    if permits(actor.id, action, resource) {
        Ok(())
    } else {
        tracing::debug!(
            "Denied {:?} on {:?} for user '{}' ({})",
            action,
            resource,
            actor.username,
            actor.id
        );
        Err(ServiceError::forbidden())
    }
}
