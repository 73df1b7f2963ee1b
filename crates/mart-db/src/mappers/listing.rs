//! Listing row -> entity

use mart_core::entities::Listing;
use mart_core::error::DomainError;
use mart_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::ListingModel;

impl TryFrom<ListingModel> for Listing {
    type Error = DomainError;

    fn try_from(model: ListingModel) -> Result<Self, Self::Error> {
        Ok(Listing {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            category_id: model.category_id.map(Snowflake::new),
            title: model.title,
            slug: model.slug,
            description: model.description,
            price: model.price,
            currency: parse_column("currency", &model.currency)?,
            condition: parse_column("condition", &model.condition)?,
            location: model.location,
            images: model.images,
            featured_image: model.featured_image,
            status: parse_column("status", &model.status)?,
            is_promoted: model.is_promoted,
            promotion_end_date: model.promotion_end_date,
            is_featured: model.is_featured,
            featured_until: model.featured_until,
            views: model.views,
            contact_phone: model.contact_phone,
            contact_email: model.contact_email,
            contact_method: parse_column("contact_method", &model.contact_method)?,
            rejection_reason: model.rejection_reason,
            expiry_date: model.expiry_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
