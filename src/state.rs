use crate::{
    gateway::Gateway,
    services::{account_service::AccountService, publication_service::PublicationService},
};
use axum::extract::FromRef;
use std::sync::Arc;

/// Router state: the injected gateway and the services built on top of it.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub accounts: AccountService,
    pub publications: PublicationService,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            accounts: AccountService::new(gateway.clone()),
            publications: PublicationService::new(gateway.clone()),
            gateway,
        }
    }
}

impl FromRef<AppState> for Arc<dyn Gateway> {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl FromRef<AppState> for AccountService {
    fn from_ref(state: &AppState) -> Self {
        state.accounts.clone()
    }
}

impl FromRef<AppState> for PublicationService {
    fn from_ref(state: &AppState) -> Self {
        state.publications.clone()
    }
}
