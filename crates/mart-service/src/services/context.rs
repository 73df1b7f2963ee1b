//! Service context - dependency container for services
//!
//! Holds the repository ports, the JWT service, the ID generator and the
//! importer's HTTP client. Nothing here is global; tests build a context
//! over in-memory repositories.

use std::sync::Arc;

use mart_common::JwtService;
use mart_core::traits::{
    CategoryRepository, ConversationRepository, FavoriteRepository, ListingRepository,
    ReportRepository, UserRepository,
};
use mart_core::{Snowflake, SnowflakeGenerator};
use mart_import::ListingImporter;

use super::error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    listing_repo: Arc<dyn ListingRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    report_repo: Arc<dyn ReportRepository>,
    favorite_repo: Arc<dyn FavoriteRepository>,

    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    importer: Arc<ListingImporter>,
}

impl ServiceContext {
    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn listing_repo(&self) -> &dyn ListingRepository {
        self.listing_repo.as_ref()
    }

    /// Owned handle for work that outlives the request, such as view counting
    pub fn listing_repo_handle(&self) -> Arc<dyn ListingRepository> {
        Arc::clone(&self.listing_repo)
    }

    pub fn category_repo(&self) -> &dyn CategoryRepository {
        self.category_repo.as_ref()
    }

    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    pub fn report_repo(&self) -> &dyn ReportRepository {
        self.report_repo.as_ref()
    }

    pub fn favorite_repo(&self) -> &dyn FavoriteRepository {
        self.favorite_repo.as_ref()
    }

    // === Services ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    pub fn importer(&self) -> &ListingImporter {
        self.importer.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    listing_repo: Option<Arc<dyn ListingRepository>>,
    category_repo: Option<Arc<dyn CategoryRepository>>,
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    report_repo: Option<Arc<dyn ReportRepository>>,
    favorite_repo: Option<Arc<dyn FavoriteRepository>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    importer: Option<Arc<ListingImporter>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn listing_repo(mut self, repo: Arc<dyn ListingRepository>) -> Self {
        self.listing_repo = Some(repo);
        self
    }

    pub fn category_repo(mut self, repo: Arc<dyn CategoryRepository>) -> Self {
        self.category_repo = Some(repo);
        self
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn report_repo(mut self, repo: Arc<dyn ReportRepository>) -> Self {
        self.report_repo = Some(repo);
        self
    }

    pub fn favorite_repo(mut self, repo: Arc<dyn FavoriteRepository>) -> Self {
        self.favorite_repo = Some(repo);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn importer(mut self, importer: Arc<ListingImporter>) -> Self {
        self.importer = Some(importer);
        self
    }

    /// # Errors
    /// Returns `ServiceError::Validation` if any dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext {
            user_repo: required(self.user_repo, "user_repo")?,
            listing_repo: required(self.listing_repo, "listing_repo")?,
            category_repo: required(self.category_repo, "category_repo")?,
            conversation_repo: required(self.conversation_repo, "conversation_repo")?,
            report_repo: required(self.report_repo, "report_repo")?,
            favorite_repo: required(self.favorite_repo, "favorite_repo")?,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            snowflake_generator: required(self.snowflake_generator, "snowflake_generator")?,
            importer: required(self.importer, "importer")?,
        })
    }
}
