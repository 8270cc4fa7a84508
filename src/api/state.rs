use std::sync::Arc;

use crate::database::Store;
use crate::services::{
    AccountService, ConnectionService, EndorsementService, MessageService, ProfileService, ProjectService,
    SkillService,
};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.store.clone())
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.store.clone())
    }

    pub fn skills(&self) -> SkillService {
        SkillService::new(self.store.clone())
    }

    pub fn projects(&self) -> ProjectService {
        ProjectService::new(self.store.clone())
    }

    pub fn connections(&self) -> ConnectionService {
        ConnectionService::new(self.store.clone())
    }

    pub fn messages(&self) -> MessageService {
        MessageService::new(self.store.clone())
    }

    pub fn endorsements(&self) -> EndorsementService {
        EndorsementService::new(self.store.clone())
    }
}
