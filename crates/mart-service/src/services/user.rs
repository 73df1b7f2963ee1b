//! User service
//!
//! Profile reads and edits, plus the admin account console.

use chrono::Utc;
use mart_core::{Actor, PageRequest, Snowflake, User, UserFilter};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    PageResponse, PublicUserResponse, UpdateProfileRequest, UpdateRoleRequest, UpdateStatusRequest,
    UserQuery, UserResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::require_admin;

pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn get_current_user(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        Ok(self.load(user_id).await?.into())
    }

    #[instrument(skip(self))]
    pub async fn get_public_profile(&self, user_id: Snowflake) -> ServiceResult<PublicUserResponse> {
        Ok(self.load(user_id).await?.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Snowflake,
        request: UpdateProfileRequest,
    ) -> ServiceResult<UserResponse> {
        request.validate()?;
        let mut user = self.load(user_id).await?;

        if let Some(first_name) = request.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(phone) = request.phone {
            user.phone = Some(phone).filter(|p| !p.trim().is_empty());
        }
        if let Some(image) = request.profile_image {
            user.profile_image = Some(image).filter(|i| !i.trim().is_empty());
        }
        user.updated_at = Utc::now();

        self.ctx.user_repo().update(&user).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user.into())
    }

    // ------------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------------

    #[instrument(skip(self, query))]
    pub async fn list_users(
        &self,
        actor: &Actor,
        query: UserQuery,
        page: PageRequest,
    ) -> ServiceResult<PageResponse<UserResponse>> {
        require_admin(actor)?;
        let filter = UserFilter {
            role: query.role,
            status: query.status,
            search: query.search.filter(|s| !s.trim().is_empty()),
        };
        let users = self.ctx.user_repo().list(&filter, page).await?;
        Ok(PageResponse::from_page(users, UserResponse::from))
    }

    #[instrument(skip(self, request), fields(role = %request.role))]
    pub async fn update_user_role(
        &self,
        actor: &Actor,
        user_id: Snowflake,
        request: UpdateRoleRequest,
    ) -> ServiceResult<UserResponse> {
        let mut user = self.load(user_id).await?;
        user.change_role(actor, request.role)?;
        self.ctx.user_repo().update(&user).await?;
        info!(admin_id = %actor.id, user_id = %user.id, role = %user.role, "User role changed");
        Ok(user.into())
    }

    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_user_status(
        &self,
        actor: &Actor,
        user_id: Snowflake,
        request: UpdateStatusRequest,
    ) -> ServiceResult<UserResponse> {
        let mut user = self.load(user_id).await?;
        user.change_status(actor, request.status)?;
        self.ctx.user_repo().update(&user).await?;
        info!(admin_id = %actor.id, user_id = %user.id, status = %user.status, "User status changed");
        Ok(user.into())
    }

    async fn load(&self, user_id: Snowflake) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }
}
