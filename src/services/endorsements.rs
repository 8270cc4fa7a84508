use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::Endorsement;
use crate::database::{DatabaseError, EndorsementFilter, Page, Store};
use crate::types::{Action, Identity};

use super::access::{authorize, Resource};
use super::ServiceError;

pub struct EndorsementService {
    store: Arc<dyn Store>,
}

impl EndorsementService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Vouch for another profile's skill. The endorsee is always the skill owner.
    pub async fn endorse(&self, actor: &Identity, skill_id: Uuid) -> Result<Endorsement, ServiceError> {
        let skill = self
            .store
            .get_skill(skill_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Skill"))?;

        if skill.profile_id == actor.id {
            return Err(ServiceError::invalid_field("skill", "You cannot endorse your own skill"));
        }

        let endorsement = Endorsement::new(actor.id, &skill);
        authorize(Some(actor), Action::Create, &Resource::from(&endorsement))?;

        match self.store.insert_endorsement(&endorsement).await {
            Ok(()) => {}
            Err(DatabaseError::UniqueViolation(_)) => {
                return Err(ServiceError::Conflict("You have already endorsed this skill".to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            "Skill {} of profile {} endorsed by '{}'",
            skill.id,
            skill.profile_id,
            actor.username
        );
        Ok(endorsement)
    }

    pub async fn withdraw(&self, actor: &Identity, id: Uuid) -> Result<(), ServiceError> {
        let endorsement = self.get(id).await?;
        authorize(Some(actor), Action::Delete, &Resource::from(&endorsement))?;

        if !self.store.delete_endorsement(id).await? {
            return Err(ServiceError::not_found("Endorsement"));
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Endorsement, ServiceError> {
        self.store
            .get_endorsement(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Endorsement"))
    }

    pub async fn list(&self, filter: &EndorsementFilter, page: Page) -> Result<Vec<Endorsement>, ServiceError> {
        Ok(self.store.list_endorsements(filter, page).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Proficiency, Skill};
    use crate::testing::TestContext;

    async fn setup() -> (TestContext, EndorsementService, Identity, Identity, Skill) {
        let ctx = TestContext::new();
        let alice = ctx.user("alice").await;
        let carol = ctx.user("carol").await;
        let rust = Skill::new(alice.id, "Rust", Proficiency::Expert);
        ctx.store.insert_skill(&rust).await.unwrap();
        let service = EndorsementService::new(ctx.store.clone());
        (ctx, service, alice, carol, rust)
    }

    #[tokio::test]
    async fn endorsee_is_the_skill_owner() {
        let (_ctx, service, alice, carol, rust) = setup().await;
        let endorsement = service.endorse(&carol, rust.id).await.unwrap();
        assert_eq!(endorsement.endorser_id, carol.id);
        assert_eq!(endorsement.endorsee_id, alice.id);
        assert_eq!(endorsement.skill_id, rust.id);
    }

    #[tokio::test]
    async fn owner_cannot_endorse_own_skill() {
        let (_ctx, service, alice, carol, rust) = setup().await;
        service.endorse(&carol, rust.id).await.unwrap();

        let err = service.endorse(&alice, rust.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn repeated_endorsement_conflicts() {
        let (ctx, service, _alice, carol, rust) = setup().await;
        service.endorse(&carol, rust.id).await.unwrap();

        let err = service.endorse(&carol, rust.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == "You have already endorsed this skill"));
        assert_eq!(ctx.store.count_endorsements(rust.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_skill_is_not_found() {
        let (_ctx, service, _alice, carol, _rust) = setup().await;
        let err = service.endorse(&carol, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn only_endorser_may_withdraw() {
        let (ctx, service, alice, carol, rust) = setup().await;
        let endorsement = service.endorse(&carol, rust.id).await.unwrap();

        let err = service.withdraw(&alice, endorsement.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        service.withdraw(&carol, endorsement.id).await.unwrap();
        assert_eq!(ctx.store.count_endorsements(rust.id).await.unwrap(), 0);

        // Endorsing again is allowed once withdrawn
        service.endorse(&carol, rust.id).await.unwrap();
    }

    #[tokio::test]
    async fn list_by_skill_and_endorsee() {
        let (ctx, service, alice, carol, rust) = setup().await;
        let dave = ctx.user("dave").await;
        let go = Skill::new(carol.id, "Go", Proficiency::Beginner);
        ctx.store.insert_skill(&go).await.unwrap();

        service.endorse(&carol, rust.id).await.unwrap();
        service.endorse(&dave, rust.id).await.unwrap();
        service.endorse(&dave, go.id).await.unwrap();

        let by_skill = EndorsementFilter {
            skill_id: Some(rust.id),
            ..Default::default()
        };
        assert_eq!(service.list(&by_skill, Page::default()).await.unwrap().len(), 2);

        let by_endorsee = EndorsementFilter {
            endorsee_id: Some(alice.id),
            ..Default::default()
        };
        assert_eq!(service.list(&by_endorsee, Page::default()).await.unwrap().len(), 2);
        assert_eq!(service.list(&EndorsementFilter::default(), Page::default()).await.unwrap().len(), 3);
    }
}
