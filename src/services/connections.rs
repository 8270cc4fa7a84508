use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Connection, ConnectionStatus};
use crate::database::{Page, Store};
use crate::types::{Action, Identity};

use super::access::{authorize, Resource};
use super::ServiceError;

/// The target's answer to a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    fn status(self) -> ConnectionStatus {
        match self {
            Decision::Accept => ConnectionStatus::Accepted,
            Decision::Reject => ConnectionStatus::Rejected,
        }
    }
}

/// Connection lifecycle: `pending -> accepted | rejected`.
///
/// A pair of profiles has at most one record. Revoking an accepted connection
/// deletes it; a rejected record is reopened by the next proposal.
pub struct ConnectionService {
    store: Arc<dyn Store>,
}

impl ConnectionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn propose(&self, actor: &Identity, target_id: Uuid) -> Result<Connection, ServiceError> {
        if actor.id == target_id {
            return Err(ServiceError::invalid_field("target", "You cannot connect with yourself"));
        }
        authorize(
            Some(actor),
            Action::Create,
            &Resource::Connection {
                initiator: actor.id,
                target: target_id,
            },
        )?;

        if self.store.get_profile(target_id).await?.is_none() {
            return Err(ServiceError::not_found("Profile"));
        }

        let connection = match self.store.find_connection_between(actor.id, target_id).await? {
            Some(existing) if existing.status == ConnectionStatus::Rejected => self
                .store
                .reopen_connection(existing.id, actor.id, target_id, Utc::now())
                .await?
                .ok_or_else(already_exists)?,
            Some(_) => return Err(already_exists()),
            None => {
                let connection = Connection::pending(actor.id, target_id);
                self.store.insert_connection(&connection).await.map_err(|e| match ServiceError::from(e) {
                    ServiceError::Conflict(_) => already_exists(),
                    other => other,
                })?;
                connection
            }
        };

        tracing::info!(
            "Connection {} proposed by '{}' to profile {}",
            connection.id,
            actor.username,
            target_id
        );
        Ok(connection)
    }

    pub async fn respond(&self, actor: &Identity, id: Uuid, decision: Decision) -> Result<Connection, ServiceError> {
        let connection = self.find(id).await?;
        authorize(Some(actor), Action::Respond, &Resource::from(&connection))?;

        if connection.status != ConnectionStatus::Pending {
            return Err(not_pending());
        }

        let updated = self
            .store
            .transition_connection(id, ConnectionStatus::Pending, decision.status(), Utc::now())
            .await?
            .ok_or_else(not_pending)?;

        tracing::info!("Connection {} {:?} by '{}'", id, updated.status, actor.username);
        Ok(updated)
    }

    /// Remove an accepted connection so either party may propose again
    pub async fn revoke(&self, actor: &Identity, id: Uuid) -> Result<(), ServiceError> {
        let connection = self.find(id).await?;
        authorize(Some(actor), Action::Delete, &Resource::from(&connection))?;

        if connection.status != ConnectionStatus::Accepted {
            return Err(ServiceError::InvalidState(
                "Only accepted connections can be removed".to_string(),
            ));
        }
        if !self.store.delete_connection(id, ConnectionStatus::Accepted).await? {
            return Err(ServiceError::InvalidState(
                "Connection is no longer accepted".to_string(),
            ));
        }

        tracing::info!("Connection {} revoked by '{}'", id, actor.username);
        Ok(())
    }

    pub async fn get(&self, actor: &Identity, id: Uuid) -> Result<Connection, ServiceError> {
        let connection = self.find(id).await?;
        authorize(Some(actor), Action::Read, &Resource::from(&connection))?;
        Ok(connection)
    }

    /// Accepted connections of the actor, most recent acceptance first
    pub async fn list(&self, actor: &Identity, page: Page) -> Result<Vec<Connection>, ServiceError> {
        Ok(self.store.list_accepted_connections(actor.id, page).await?)
    }

    /// Pending requests the actor sent or received
    pub async fn requests(&self, actor: &Identity, page: Page) -> Result<Vec<Connection>, ServiceError> {
        Ok(self.store.list_pending_connections(actor.id, page).await?)
    }

    async fn find(&self, id: Uuid) -> Result<Connection, ServiceError> {
        self.store
            .get_connection(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Connection"))
    }
}

fn already_exists() -> ServiceError {
    ServiceError::Conflict("A connection between these profiles already exists".to_string())
}

fn not_pending() -> ServiceError {
    ServiceError::InvalidState("Connection request is not pending".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    async fn setup() -> (ConnectionService, Identity, Identity, Identity) {
        let ctx = TestContext::new();
        let alice = ctx.user("alice").await;
        let bob = ctx.user("bob").await;
        let carol = ctx.user("carol").await;
        (ConnectionService::new(ctx.store.clone()), alice, bob, carol)
    }

    #[tokio::test]
    async fn propose_to_self_is_a_validation_error() {
        let (service, alice, _, _) = setup().await;
        let err = service.propose(&alice, alice.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some("target"), .. }));
    }

    #[tokio::test]
    async fn propose_to_missing_profile_is_not_found() {
        let (service, alice, _, _) = setup().await;
        let err = service.propose(&alice, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn accepted_connection_is_listed_for_both_parties() {
        let (service, alice, bob, _) = setup().await;

        let pending = service.propose(&alice, bob.id).await.unwrap();
        assert_eq!(pending.status, ConnectionStatus::Pending);
        assert!(pending.responded_at.is_none());

        let accepted = service.respond(&bob, pending.id, Decision::Accept).await.unwrap();
        assert_eq!(accepted.status, ConnectionStatus::Accepted);
        assert!(accepted.responded_at.is_some());

        let listed = service.list(&alice, Page::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].other_party(alice.id), bob.id);
        assert_eq!(service.list(&bob, Page::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_orders_by_most_recent_acceptance() {
        let (service, alice, bob, carol) = setup().await;

        let to_bob = service.propose(&alice, bob.id).await.unwrap();
        let to_carol = service.propose(&alice, carol.id).await.unwrap();
        service.respond(&bob, to_bob.id, Decision::Accept).await.unwrap();
        service.respond(&carol, to_carol.id, Decision::Accept).await.unwrap();

        let listed: Vec<Uuid> = service
            .list(&alice, Page::default())
            .await
            .unwrap()
            .iter()
            .map(|c| c.other_party(alice.id))
            .collect();
        assert_eq!(listed, vec![carol.id, bob.id]);
    }

    #[tokio::test]
    async fn one_connection_per_pair_in_either_direction() {
        let (service, alice, bob, _) = setup().await;
        service.propose(&alice, bob.id).await.unwrap();

        let err = service.propose(&alice, bob.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        let err = service.propose(&bob, alice.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn only_target_may_respond() {
        let (service, alice, bob, carol) = setup().await;
        let pending = service.propose(&alice, bob.id).await.unwrap();

        let err = service.respond(&alice, pending.id, Decision::Accept).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = service.respond(&carol, pending.id, Decision::Reject).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn respond_requires_pending() {
        let (service, alice, bob, _) = setup().await;
        let pending = service.propose(&alice, bob.id).await.unwrap();
        service.respond(&bob, pending.id, Decision::Reject).await.unwrap();

        for decision in [Decision::Accept, Decision::Reject] {
            let err = service.respond(&bob, pending.id, decision).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidState(_)));
        }
    }

    #[tokio::test]
    async fn rejected_connection_can_be_reproposed_by_either_party() {
        let (service, alice, bob, _) = setup().await;
        let first = service.propose(&alice, bob.id).await.unwrap();
        service.respond(&bob, first.id, Decision::Reject).await.unwrap();

        let reopened = service.propose(&bob, alice.id).await.unwrap();
        assert_eq!(reopened.id, first.id);
        assert_eq!(reopened.status, ConnectionStatus::Pending);
        assert_eq!(reopened.initiator_id, bob.id);
        assert_eq!(reopened.target_id, alice.id);
        assert!(reopened.responded_at.is_none());

        // Alice is now the target
        service.respond(&alice, reopened.id, Decision::Accept).await.unwrap();
    }

    #[tokio::test]
    async fn revoke_requires_accepted_and_a_party() {
        let (service, alice, bob, carol) = setup().await;
        let pending = service.propose(&alice, bob.id).await.unwrap();

        let err = service.revoke(&alice, pending.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        service.respond(&bob, pending.id, Decision::Accept).await.unwrap();
        let err = service.revoke(&carol, pending.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        service.revoke(&bob, pending.id).await.unwrap();
        assert!(service.list(&alice, Page::default()).await.unwrap().is_empty());

        // A fresh proposal is possible afterwards
        service.propose(&alice, bob.id).await.unwrap();
    }

    #[tokio::test]
    async fn get_is_limited_to_parties() {
        let (service, alice, bob, carol) = setup().await;
        let pending = service.propose(&alice, bob.id).await.unwrap();

        assert_eq!(service.get(&bob, pending.id).await.unwrap().id, pending.id);
        let err = service.get(&carol, pending.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn requests_lists_incoming_and_outgoing() {
        let (service, alice, bob, carol) = setup().await;
        service.propose(&alice, bob.id).await.unwrap();
        service.propose(&carol, alice.id).await.unwrap();

        let requests = service.requests(&alice, Page::default()).await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|c| c.status == ConnectionStatus::Pending));
        assert!(service.list(&alice, Page::default()).await.unwrap().is_empty());
    }
}
