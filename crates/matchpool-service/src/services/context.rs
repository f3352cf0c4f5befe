//! Service context - dependency container for services
//!
//! Holds the repository and provider ports, the ID generator, and the
//! matching weights every engine call is made with.

use std::sync::Arc;

use matchpool_core::traits::{
    CompatibilityProvider, MatchResultRepository, MembershipProvider, NotificationDispatcher,
    PoolMemberRepository, PoolRepository,
};
use matchpool_core::{MatchingConfig, PairingEngine, Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone: every port sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    pool_repo: Arc<dyn PoolRepository>,
    member_repo: Arc<dyn PoolMemberRepository>,
    match_repo: Arc<dyn MatchResultRepository>,

    // External collaborators
    membership: Arc<dyn MembershipProvider>,
    compatibility: Arc<dyn CompatibilityProvider>,
    notifier: Arc<dyn NotificationDispatcher>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    matching_config: MatchingConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool_repo: Arc<dyn PoolRepository>,
        member_repo: Arc<dyn PoolMemberRepository>,
        match_repo: Arc<dyn MatchResultRepository>,
        membership: Arc<dyn MembershipProvider>,
        compatibility: Arc<dyn CompatibilityProvider>,
        notifier: Arc<dyn NotificationDispatcher>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        matching_config: MatchingConfig,
    ) -> Self {
        Self {
            pool_repo,
            member_repo,
            match_repo,
            membership,
            compatibility,
            notifier,
            snowflake_generator,
            matching_config,
        }
    }

    // === Repositories ===

    pub fn pool_repo(&self) -> &dyn PoolRepository {
        self.pool_repo.as_ref()
    }

    pub fn member_repo(&self) -> &dyn PoolMemberRepository {
        self.member_repo.as_ref()
    }

    pub fn match_repo(&self) -> &dyn MatchResultRepository {
        self.match_repo.as_ref()
    }

    // === Collaborators ===

    /// Source of the members a round is generated from
    pub fn membership(&self) -> &dyn MembershipProvider {
        self.membership.as_ref()
    }

    pub fn compatibility(&self) -> &dyn CompatibilityProvider {
        self.compatibility.as_ref()
    }

    pub fn notifier(&self) -> &dyn NotificationDispatcher {
        self.notifier.as_ref()
    }

    // === Matching ===

    pub fn matching_config(&self) -> MatchingConfig {
        self.matching_config
    }

    /// Engine configured with this context's weights
    pub fn engine(&self) -> PairingEngine {
        PairingEngine::new(self.matching_config)
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
            .field("providers", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("matching_config", &self.matching_config)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool_repo: Option<Arc<dyn PoolRepository>>,
    member_repo: Option<Arc<dyn PoolMemberRepository>>,
    match_repo: Option<Arc<dyn MatchResultRepository>>,
    membership: Option<Arc<dyn MembershipProvider>>,
    compatibility: Option<Arc<dyn CompatibilityProvider>>,
    notifier: Option<Arc<dyn NotificationDispatcher>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    matching_config: Option<MatchingConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool_repo(mut self, repo: Arc<dyn PoolRepository>) -> Self {
        self.pool_repo = Some(repo);
        self
    }

    pub fn member_repo(mut self, repo: Arc<dyn PoolMemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn match_repo(mut self, repo: Arc<dyn MatchResultRepository>) -> Self {
        self.match_repo = Some(repo);
        self
    }

    pub fn membership(mut self, provider: Arc<dyn MembershipProvider>) -> Self {
        self.membership = Some(provider);
        self
    }

    pub fn compatibility(mut self, provider: Arc<dyn CompatibilityProvider>) -> Self {
        self.compatibility = Some(provider);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn matching_config(mut self, config: MatchingConfig) -> Self {
        self.matching_config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    /// or the matching weights are out of range
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let matching_config = self
            .matching_config
            .ok_or_else(|| ServiceError::validation("matching_config is required"))?;
        matching_config
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        Ok(ServiceContext::new(
            self.pool_repo.ok_or_else(|| ServiceError::validation("pool_repo is required"))?,
            self.member_repo.ok_or_else(|| ServiceError::validation("member_repo is required"))?,
            self.match_repo.ok_or_else(|| ServiceError::validation("match_repo is required"))?,
            self.membership.ok_or_else(|| ServiceError::validation("membership is required"))?,
            self.compatibility.ok_or_else(|| ServiceError::validation("compatibility is required"))?,
            self.notifier.ok_or_else(|| ServiceError::validation("notifier is required"))?,
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
            matching_config,
        ))
    }
}
