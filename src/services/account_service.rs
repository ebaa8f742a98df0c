//! Registration and credential lookup against the `users` table.

use super::{ServiceError, ServiceResult};
use crate::{
    gateway::Gateway,
    models::user::{NewUser, UserSummary},
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AccountService {
    gateway: Arc<dyn Gateway>,
}

impl AccountService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Insert a new account.
    ///
    /// Every gateway failure collapses into [`ServiceError::DuplicateAccount`];
    /// which constraint fired (username or email) is never reported back.
    pub async fn register(&self, user: NewUser) -> ServiceResult<()> {
        match self.gateway.insert_user(&user).await {
            Ok(()) => {
                info!(username = %user.username, "registered user");
                Ok(())
            }
            Err(err) => {
                warn!(username = %user.username, "registration rejected: {}", err);
                Err(ServiceError::DuplicateAccount)
            }
        }
    }

    /// Find the single account matching both credentials.
    ///
    /// No match, an ambiguous match and a failed lookup all yield
    /// [`ServiceError::InvalidCredentials`].
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<UserSummary> {
        let mut rows = match self.gateway.find_users(username, password).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(username, "credential lookup failed: {}", err);
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if rows.len() != 1 {
            info!(username, matches = rows.len(), "login refused");
            return Err(ServiceError::InvalidCredentials);
        }

        let user = rows.remove(0);
        info!(username = %user.username, id = %user.id, "login succeeded");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryGateway;

    fn user(name: &str, email: &str) -> NewUser {
        NewUser {
            username: name.into(),
            email: email.into(),
            password: "pw".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected_without_new_row() {
        let gateway = Arc::new(MemoryGateway::new());
        let accounts = AccountService::new(gateway.clone());

        accounts.register(user("ana", "ana@example.com")).await.unwrap();

        let same_name = accounts.register(user("ana", "other@example.com")).await;
        let same_email = accounts.register(user("bia", "ana@example.com")).await;

        assert!(matches!(same_name, Err(ServiceError::DuplicateAccount)));
        assert!(matches!(same_email, Err(ServiceError::DuplicateAccount)));
        assert_eq!(gateway.user_count(), 1);
    }

    #[tokio::test]
    async fn login_requires_exact_credentials() {
        let gateway = Arc::new(MemoryGateway::new());
        let accounts = AccountService::new(gateway);
        accounts.register(user("ana", "ana@example.com")).await.unwrap();

        let found = accounts.login("ana", "pw").await.unwrap();
        assert_eq!(found.username, "ana");

        assert!(matches!(
            accounts.login("ana", "PW").await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            accounts.login("nobody", "pw").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }
}
