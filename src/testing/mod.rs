use std::sync::Arc;

use crate::database::models::{Profile, User};
use crate::database::{MemoryStore, Store};
use crate::types::Identity;

/// Test utilities: an isolated in-memory store plus account helpers
pub struct TestContext {
    pub store: Arc<dyn Store>,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Create an identity and its profile directly in the store
    pub async fn user(&self, username: &str) -> Identity {
        let user = User::new(username, "pbkdf2_sha256$1$c2FsdA==$a2V5");
        let profile = Profile::new(user.id, format!("{}@example.com", username));
        self.store
            .create_account(&user, &profile)
            .await
            .expect("failed to create test account");
        Identity::new(user.id, username)
    }
}
