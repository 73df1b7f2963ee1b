//! User row -> entity

use mart_core::entities::User;
use mart_core::error::DomainError;
use mart_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::UserModel;

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(User {
            id: Snowflake::new(model.id),
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            role: parse_column("role", &model.role)?,
            status: parse_column("status", &model.status)?,
            profile_image: model.profile_image,
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
