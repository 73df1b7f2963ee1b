//! Category service
//!
//! Public reads of the category tree and the admin CRUD around it.

use chrono::Utc;
use mart_core::value_objects::slugify;
use mart_core::{build_tree, would_create_cycle, Actor, Category, DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    CategoryDeletion, CategoryQuery, CategoryResponse, CategoryTreeResponse, CreateCategoryRequest,
    UpdateCategoryRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::require_admin;

pub struct CategoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CategoryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Flat list. Inactive categories are only included for admins who ask.
    #[instrument(skip(self, viewer))]
    pub async fn list_categories(
        &self,
        viewer: Option<&Actor>,
        query: CategoryQuery,
    ) -> ServiceResult<Vec<CategoryResponse>> {
        let include_inactive = query.include_inactive && viewer.is_some_and(Actor::is_admin);
        let categories = self.ctx.category_repo().list(include_inactive).await?;
        let locale = query.lang.as_deref();
        Ok(categories
            .into_iter()
            .map(|c| CategoryResponse::localized(c, locale))
            .collect())
    }

    #[instrument(skip(self, viewer))]
    pub async fn category_tree(
        &self,
        viewer: Option<&Actor>,
        query: CategoryQuery,
    ) -> ServiceResult<Vec<CategoryTreeResponse>> {
        let include_inactive = query.include_inactive && viewer.is_some_and(Actor::is_admin);
        let categories = self.ctx.category_repo().list(include_inactive).await?;
        let locale = query.lang.as_deref();
        Ok(build_tree(categories)
            .into_iter()
            .map(|node| CategoryTreeResponse::from_node(node, locale))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_category(
        &self,
        category_id: Snowflake,
        lang: Option<&str>,
    ) -> ServiceResult<CategoryResponse> {
        let category = self.load(category_id).await?;
        Ok(CategoryResponse::localized(category, lang))
    }

    #[instrument(skip(self))]
    pub async fn get_category_by_slug(
        &self,
        slug: &str,
        lang: Option<&str>,
    ) -> ServiceResult<CategoryResponse> {
        let category = self
            .ctx
            .category_repo()
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category", slug))?;
        Ok(CategoryResponse::localized(category, lang))
    }

    #[instrument(skip(self, viewer))]
    pub async fn get_children(
        &self,
        viewer: Option<&Actor>,
        category_id: Snowflake,
        query: CategoryQuery,
    ) -> ServiceResult<Vec<CategoryResponse>> {
        self.load(category_id).await?;
        let include_inactive = query.include_inactive && viewer.is_some_and(Actor::is_admin);
        let children = self
            .ctx
            .category_repo()
            .children(category_id, include_inactive)
            .await?;
        let locale = query.lang.as_deref();
        Ok(children
            .into_iter()
            .map(|c| CategoryResponse::localized(c, locale))
            .collect())
    }

    // ------------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------------

    #[instrument(skip(self, request), fields(admin_id = %actor.id, name = %request.name))]
    pub async fn create_category(
        &self,
        actor: &Actor,
        request: CreateCategoryRequest,
    ) -> ServiceResult<CategoryResponse> {
        require_admin(actor)?;
        request.validate()?;

        let name = request.name.trim().to_string();
        let slug = slugify(request.slug.as_deref().unwrap_or(&name));
        if self.ctx.category_repo().slug_exists(&slug).await? {
            return Err(DomainError::SlugAlreadyExists(slug).into());
        }
        if let Some(parent_id) = request.parent_id {
            self.load(parent_id).await?;
        }

        let mut category = Category::new(self.ctx.generate_id(), name, slug);
        category.parent_id = request.parent_id;
        category.is_active = request.is_active.unwrap_or(true);
        category.display_order = request.display_order.unwrap_or(0);
        category.translations = request.translations;
        if let Some(attributes) = request.attributes {
            category.attributes = attributes;
        }
        category.image = request.image;
        category.icon = request.icon;

        self.ctx.category_repo().create(&category).await?;
        info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category.into())
    }

    /// Reparenting walks the whole ancestor chain and refuses any loop
    #[instrument(skip(self, request), fields(admin_id = %actor.id))]
    pub async fn update_category(
        &self,
        actor: &Actor,
        category_id: Snowflake,
        request: UpdateCategoryRequest,
    ) -> ServiceResult<CategoryResponse> {
        require_admin(actor)?;
        request.validate()?;
        let mut category = self.load(category_id).await?;

        if let Some(name) = request.name {
            category.name = name.trim().to_string();
        }
        if let Some(slug) = request.slug {
            let slug = slugify(&slug);
            if slug != category.slug && self.ctx.category_repo().slug_exists(&slug).await? {
                return Err(DomainError::SlugAlreadyExists(slug).into());
            }
            category.slug = slug;
        }
        if let Some(parent_id) = request.parent_id {
            if let Some(parent) = parent_id {
                self.load(parent).await?;
                let all = self.ctx.category_repo().list(true).await?;
                if would_create_cycle(&all, category.id, parent) {
                    return Err(DomainError::CategoryCycle.into());
                }
            }
            category.parent_id = parent_id;
        }
        if let Some(is_active) = request.is_active {
            category.is_active = is_active;
        }
        if let Some(order) = request.display_order {
            category.display_order = order;
        }
        if let Some(translations) = request.translations {
            category.translations = translations;
        }
        if let Some(attributes) = request.attributes {
            category.attributes = attributes;
        }
        if let Some(image) = request.image {
            category.image = Some(image).filter(|i| !i.is_empty());
        }
        if let Some(icon) = request.icon {
            category.icon = Some(icon).filter(|i| !i.is_empty());
        }
        category.updated_at = Utc::now();

        self.ctx.category_repo().update(&category).await?;
        info!(category_id = %category.id, "Category updated");
        Ok(category.into())
    }

    /// Categories with subcategories cannot go. Categories still holding
    /// listings are deactivated instead of removed.
    #[instrument(skip(self), fields(admin_id = %actor.id))]
    pub async fn delete_category(
        &self,
        actor: &Actor,
        category_id: Snowflake,
    ) -> ServiceResult<CategoryDeletion> {
        require_admin(actor)?;
        let mut category = self.load(category_id).await?;

        if self.ctx.category_repo().count_children(category_id).await? > 0 {
            return Err(DomainError::CategoryHasChildren.into());
        }

        let listings = self.ctx.listing_repo().count_in_category(category_id).await?;
        if listings > 0 {
            category.is_active = false;
            category.updated_at = Utc::now();
            self.ctx.category_repo().update(&category).await?;
            info!(category_id = %category_id, listings, "Category deactivated instead of deleted");
            return Ok(CategoryDeletion::Deactivated);
        }

        self.ctx.category_repo().delete(category_id).await?;
        info!(category_id = %category_id, "Category deleted");
        Ok(CategoryDeletion::Removed)
    }

    async fn load(&self, category_id: Snowflake) -> ServiceResult<Category> {
        self.ctx
            .category_repo()
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| DomainError::CategoryNotFound(category_id).into())
    }
}
