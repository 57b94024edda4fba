//! Business logic services

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod profiles;

use crate::{
    config::{AuthConfig, CatalogConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub profiles: profiles::ProfilesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, catalog_config: CatalogConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone(), catalog_config),
            loans: loans::LoansService::new(repository.clone()),
            profiles: profiles::ProfilesService::new(repository),
        }
    }
}
