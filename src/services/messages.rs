use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::models::Message;
use crate::database::{Page, Store};
use crate::types::{Action, Identity};

use super::access::{authorize, Resource};
use super::ServiceError;

const MAX_BODY_LENGTH: usize = 10_000;

pub struct MessageService {
    store: Arc<dyn Store>,
}

impl MessageService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn send(&self, actor: &Identity, recipient_id: Uuid, body: &str) -> Result<Message, ServiceError> {
        if body.trim().is_empty() {
            return Err(ServiceError::invalid_field("body", "Message body may not be blank"));
        }
        if body.chars().count() > MAX_BODY_LENGTH {
            return Err(ServiceError::invalid_field(
                "body",
                format!("Ensure this field has no more than {} characters", MAX_BODY_LENGTH),
            ));
        }
        if actor.id == recipient_id {
            return Err(ServiceError::invalid_field("recipient", "You cannot message yourself"));
        }

        let message = Message::new(actor.id, recipient_id, body);
        authorize(Some(actor), Action::Create, &Resource::from(&message))?;

        if self.store.get_profile(recipient_id).await?.is_none() {
            return Err(ServiceError::not_found("Profile"));
        }
        self.store.insert_message(&message).await?;

        tracing::debug!("Message {} sent by '{}'", message.id, actor.username);
        Ok(message)
    }

    pub async fn get(&self, actor: &Identity, id: Uuid) -> Result<Message, ServiceError> {
        let message = self.find(id).await?;
        authorize(Some(actor), Action::Read, &Resource::from(&message))?;
        Ok(message)
    }

    /// Idempotent; the first `read_at` is kept
    pub async fn mark_read(&self, actor: &Identity, id: Uuid) -> Result<Message, ServiceError> {
        let message = self.find(id).await?;
        authorize(Some(actor), Action::MarkRead, &Resource::from(&message))?;

        if message.read {
            return Ok(message);
        }
        self.store
            .mark_message_read(id, Utc::now())
            .await?
            .ok_or_else(|| ServiceError::not_found("Message"))
    }

    /// Messages exchanged between `a` and `b`, oldest first
    pub async fn conversation(&self, actor: &Identity, a: Uuid, b: Uuid, page: Page) -> Result<Vec<Message>, ServiceError> {
        authorize(Some(actor), Action::Read, &Resource::Conversation { a, b })?;
        Ok(self.store.list_conversation(a, b, page).await?)
    }

    /// Messages received by the actor, newest first
    pub async fn inbox(&self, actor: &Identity, unread_only: bool, page: Page) -> Result<Vec<Message>, ServiceError> {
        Ok(self.store.list_inbox(actor.id, unread_only, page).await?)
    }

    async fn find(&self, id: Uuid) -> Result<Message, ServiceError> {
        self.store
            .get_message(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    async fn setup() -> (MessageService, Identity, Identity, Identity) {
        let ctx = TestContext::new();
        let alice = ctx.user("alice").await;
        let bob = ctx.user("bob").await;
        let carol = ctx.user("carol").await;
        (MessageService::new(ctx.store.clone()), alice, bob, carol)
    }

    #[tokio::test]
    async fn send_rejects_blank_and_self() {
        let (service, alice, bob, _) = setup().await;

        let err = service.send(&alice, bob.id, "   \n").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some("body"), .. }));
        let err = service.send(&alice, alice.id, "note to self").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some("recipient"), .. }));
        let err = service.send(&alice, Uuid::new_v4(), "hello?").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn recipient_marks_read_and_sender_cannot() {
        let (service, alice, bob, _) = setup().await;
        let sent = service.send(&alice, bob.id, "Hi Bob").await.unwrap();
        assert!(!sent.read);

        let read = service.mark_read(&bob, sent.id).await.unwrap();
        assert!(read.read);
        assert!(read.read_at.is_some());

        let err = service.mark_read(&alice, sent.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let (service, alice, bob, _) = setup().await;
        let sent = service.send(&alice, bob.id, "Hi Bob").await.unwrap();

        let first = service.mark_read(&bob, sent.id).await.unwrap();
        let second = service.mark_read(&bob, sent.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn only_parties_read_messages_and_conversations() {
        let (service, alice, bob, carol) = setup().await;
        let sent = service.send(&alice, bob.id, "private").await.unwrap();

        assert_eq!(service.get(&bob, sent.id).await.unwrap().body, "private");
        let err = service.get(&carol, sent.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = service
            .conversation(&carol, alice.id, bob.id, Page::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn conversation_is_oldest_first() {
        let (service, alice, bob, carol) = setup().await;
        service.send(&alice, bob.id, "one").await.unwrap();
        service.send(&bob, alice.id, "two").await.unwrap();
        service.send(&carol, alice.id, "elsewhere").await.unwrap();
        service.send(&alice, bob.id, "three").await.unwrap();

        let bodies: Vec<String> = service
            .conversation(&bob, bob.id, alice.id, Page::default())
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.body)
            .collect();
        assert_eq!(bodies, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn inbox_filters_unread() {
        let (service, alice, bob, carol) = setup().await;
        let first = service.send(&alice, bob.id, "first").await.unwrap();
        service.send(&carol, bob.id, "second").await.unwrap();
        service.mark_read(&bob, first.id).await.unwrap();

        assert_eq!(service.inbox(&bob, false, Page::default()).await.unwrap().len(), 2);
        let unread = service.inbox(&bob, true, Page::default()).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].body, "second");
        assert!(service.inbox(&alice, false, Page::default()).await.unwrap().is_empty());
    }
}
