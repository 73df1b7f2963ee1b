//! Import service (experimental, admin only)
//!
//! Turns a shop page into pending listings. Extraction is heuristic and
//! makes no correctness promises; every candidate goes through the normal
//! listing-creation checks and lands in the moderation queue.

use chrono::Utc;
use mart_core::{Actor, ContactMethod, Condition};
use mart_import::ImportCandidate;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    CreateListingRequest, ImportFailure, ImportPreviewResponse, ImportRequest,
    ImportResultResponse, ListingResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::listing::ListingService;
use super::require_admin;

pub struct ImportService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ImportService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fetch and analyze without writing anything
    #[instrument(skip(self, request), fields(admin_id = %actor.id, url = %request.url))]
    pub async fn preview_import(
        &self,
        actor: &Actor,
        request: ImportRequest,
    ) -> ServiceResult<ImportPreviewResponse> {
        require_admin(actor)?;
        request.validate()?;
        let analysis = self.ctx.importer().inspect(&request.url).await?;
        Ok(ImportPreviewResponse {
            kind: analysis.kind,
            candidates: analysis.candidates,
        })
    }

    /// Create a pending listing per candidate. Candidates that fail
    /// validation are reported by index and do not stop the rest.
    #[instrument(skip(self, request), fields(admin_id = %actor.id, url = %request.url))]
    pub async fn import_listings(
        &self,
        actor: &Actor,
        request: ImportRequest,
    ) -> ServiceResult<ImportResultResponse> {
        require_admin(actor)?;
        request.validate()?;
        let analysis = self.ctx.importer().inspect(&request.url).await?;

        let listings = ListingService::new(self.ctx);
        let mut created = Vec::new();
        let mut errors = Vec::new();

        for (index, candidate) in analysis.candidates.into_iter().enumerate() {
            let title = candidate.title.clone();
            match self.import_one(&listings, actor, &request, candidate).await {
                Ok(listing) => created.push(listing),
                Err(e) => {
                    warn!(index, title = %title, error = %e, "Import candidate skipped");
                    errors.push(ImportFailure {
                        index,
                        title,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(created = created.len(), failed = errors.len(), "Import finished");
        Ok(ImportResultResponse {
            kind: analysis.kind,
            created,
            errors,
        })
    }

    async fn import_one(
        &self,
        listings: &ListingService<'_>,
        actor: &Actor,
        request: &ImportRequest,
        candidate: ImportCandidate,
    ) -> ServiceResult<ListingResponse> {
        let price = candidate
            .price
            .ok_or_else(|| ServiceError::validation("No price found"))?;

        let description = candidate.description.unwrap_or_else(|| {
            let source = candidate.source_url.as_deref().unwrap_or(&request.url);
            format!("{}. Source: {source}", candidate.title)
        });

        let create = CreateListingRequest {
            title: candidate.title,
            description,
            price,
            currency: candidate.currency,
            condition: Condition::default(),
            category_id: request.category_id,
            location: request.location.clone(),
            images: candidate.images,
            featured_image: None,
            contact_phone: None,
            contact_email: None,
            contact_method: ContactMethod::default(),
            status: None,
        };
        create.validate()?;

        let listing = listings.build_listing(actor, create, Utc::now()).await?;
        self.ctx.listing_repo().create(&listing).await?;
        Ok(listing.into())
    }
}
