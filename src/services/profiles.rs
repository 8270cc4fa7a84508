use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Profile;
use crate::database::{Page, Store};
use crate::types::{Action, Identity};

use super::access::{authorize, Resource};
use super::{nullable, validate, ServiceError};

/// Partial profile update. Absent fields are left alone; `null` clears a
/// nullable field.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileChanges {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub github_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub linkedin_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub twitter_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub years_experience: Option<Option<i32>>,
    pub open_to_work: Option<bool>,
}

impl ProfileChanges {
    /// Validate and merge into `profile`
    fn apply(self, profile: &mut Profile) -> Result<(), ServiceError> {
        if let Some(email) = self.email {
            let email = email.trim().to_string();
            validate::email(&email)?;
            profile.email = email;
        }
        if let Some(v) = self.full_name {
            profile.full_name = validate::optional_name("full_name", v)?;
        }
        if let Some(v) = self.bio {
            profile.bio = validate::optional_text(v);
        }
        if let Some(v) = self.location {
            profile.location = validate::optional_name("location", v)?;
        }
        if let Some(v) = self.avatar_url {
            profile.avatar_url = validate::optional_url("avatar_url", v)?;
        }
        if let Some(v) = self.website {
            profile.website = validate::optional_url("website", v)?;
        }
        if let Some(v) = self.github_url {
            profile.github_url = validate::optional_url("github_url", v)?;
        }
        if let Some(v) = self.linkedin_url {
            profile.linkedin_url = validate::optional_url("linkedin_url", v)?;
        }
        if let Some(v) = self.twitter_url {
            profile.twitter_url = validate::optional_url("twitter_url", v)?;
        }
        if let Some(v) = self.years_experience {
            if v.is_some_and(|years| years < 0) {
                return Err(ServiceError::invalid_field(
                    "years_experience",
                    "Ensure this value is greater than or equal to 0",
                ));
            }
            profile.years_experience = v;
        }
        if let Some(v) = self.open_to_work {
            profile.open_to_work = v;
        }
        Ok(())
    }
}

pub struct ProfileService {
    store: Arc<dyn Store>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Profile>, ServiceError> {
        Ok(self.store.list_profiles(page).await?)
    }

    pub async fn get(&self, actor: Option<&Identity>, id: Uuid) -> Result<Profile, ServiceError> {
        let profile = self
            .store
            .get_profile(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile"))?;
        authorize(actor, Action::Read, &Resource::from(&profile))?;
        Ok(profile)
    }

    pub async fn update(&self, actor: &Identity, id: Uuid, changes: ProfileChanges) -> Result<Profile, ServiceError> {
        let mut profile = self.get(Some(actor), id).await?;
        authorize(Some(actor), Action::Update, &Resource::from(&profile))?;

        changes.apply(&mut profile)?;
        profile.updated_at = Utc::now();
        self.store.update_profile(&profile).await?;
        Ok(profile)
    }

    /// Delete a profile and close its account; dependents cascade
    pub async fn delete(&self, actor: &Identity, id: Uuid) -> Result<(), ServiceError> {
        let profile = self.get(Some(actor), id).await?;
        authorize(Some(actor), Action::Delete, &Resource::from(&profile))?;

        if !self.store.delete_profile(id).await? {
            return Err(ServiceError::not_found("Profile"));
        }
        tracing::info!("Profile {} deleted by '{}'", id, actor.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Connection, Message, Proficiency, Project, Skill};
    use crate::database::models::Endorsement;
    use crate::database::EndorsementFilter;
    use crate::testing::TestContext;

    fn changes(json: serde_json::Value) -> ProfileChanges {
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn owner_updates_profile_fields() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice").await;
        let service = ProfileService::new(ctx.store.clone());

        let updated = service
            .update(
                &alice,
                alice.id,
                changes(serde_json::json!({
                    "full_name": "Alice Liddell",
                    "github_url": "https://github.com/alice",
                    "years_experience": 7,
                    "open_to_work": true
                })),
            )
            .await
            .unwrap();

        assert_eq!(updated.full_name.as_deref(), Some("Alice Liddell"));
        assert_eq!(updated.years_experience, Some(7));
        assert!(updated.open_to_work);
        assert_eq!(service.get(None, alice.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn null_clears_and_absent_keeps() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice").await;
        let service = ProfileService::new(ctx.store.clone());

        service
            .update(&alice, alice.id, changes(serde_json::json!({ "bio": "Rustacean", "location": "Oslo" })))
            .await
            .unwrap();
        let updated = service
            .update(&alice, alice.id, changes(serde_json::json!({ "bio": null })))
            .await
            .unwrap();

        assert_eq!(updated.bio, None);
        assert_eq!(updated.location.as_deref(), Some("Oslo"));
    }

    #[tokio::test]
    async fn rejects_invalid_fields() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice").await;
        let service = ProfileService::new(ctx.store.clone());

        for body in [
            serde_json::json!({ "email": "not-an-email" }),
            serde_json::json!({ "website": "javascript:alert(1)" }),
            serde_json::json!({ "years_experience": -1 }),
        ] {
            let err = service.update(&alice, alice.id, changes(body)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation { .. }), "{:?}", err);
        }
    }

    #[tokio::test]
    async fn overlong_text_is_a_validation_error() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice").await;
        let service = ProfileService::new(ctx.store.clone());

        for (field, body) in [
            ("email", serde_json::json!({ "email": format!("{}@example.com", "a".repeat(300)) })),
            ("full_name", serde_json::json!({ "full_name": "n".repeat(300) })),
            ("location", serde_json::json!({ "location": "l".repeat(256) })),
        ] {
            let err = service.update(&alice, alice.id, changes(body)).await.unwrap_err();
            assert!(
                matches!(err, ServiceError::Validation { field: Some(f), .. } if f == field),
                "{:?}",
                err
            );
        }

        let unchanged = service.get(None, alice.id).await.unwrap();
        assert_eq!(unchanged.email, "alice@example.com");
        assert_eq!(unchanged.full_name, None);
    }

    #[tokio::test]
    async fn only_owner_may_update_or_delete() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice").await;
        let bob = ctx.user("bob").await;
        let service = ProfileService::new(ctx.store.clone());

        let err = service.update(&bob, alice.id, ProfileChanges::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = service.delete(&bob, alice.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_cascades_to_dependents() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice").await;
        let bob = ctx.user("bob").await;
        let store = ctx.store.clone();

        let alice_skill = Skill::new(alice.id, "Rust", Proficiency::Expert);
        let bob_skill = Skill::new(bob.id, "Go", Proficiency::Advanced);
        store.insert_skill(&alice_skill).await.unwrap();
        store.insert_skill(&bob_skill).await.unwrap();
        store.insert_project(&Project::new(alice.id, "Blitz")).await.unwrap();
        store.insert_connection(&Connection::pending(alice.id, bob.id)).await.unwrap();
        store.insert_message(&Message::new(bob.id, alice.id, "hi")).await.unwrap();
        store.insert_endorsement(&Endorsement::new(bob.id, &alice_skill)).await.unwrap();
        store.insert_endorsement(&Endorsement::new(alice.id, &bob_skill)).await.unwrap();

        ProfileService::new(store.clone()).delete(&alice, alice.id).await.unwrap();

        assert!(store.get_profile(alice.id).await.unwrap().is_none());
        assert!(store.find_user(alice.id).await.unwrap().is_none());
        assert!(store.get_skill(alice_skill.id).await.unwrap().is_none());
        assert!(store.list_projects(Some(alice.id), Page::default()).await.unwrap().is_empty());
        assert!(store.find_connection_between(alice.id, bob.id).await.unwrap().is_none());
        assert!(store.list_inbox(alice.id, false, Page::default()).await.unwrap().is_empty());
        assert!(store
            .list_endorsements(&EndorsementFilter::default(), Page::default())
            .await
            .unwrap()
            .is_empty());

        // Bob and his skill survive
        assert!(store.get_profile(bob.id).await.unwrap().is_some());
        assert!(store.get_skill(bob_skill.id).await.unwrap().is_some());
    }
}
