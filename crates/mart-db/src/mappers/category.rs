//! Category row -> entity

use mart_core::entities::Category;
use mart_core::value_objects::Snowflake;

use crate::models::CategoryModel;

impl From<CategoryModel> for Category {
    fn from(model: CategoryModel) -> Self {
        Category {
            id: Snowflake::new(model.id),
            name: model.name,
            slug: model.slug,
            parent_id: model.parent_id.map(Snowflake::new),
            is_active: model.is_active,
            display_order: model.display_order,
            translations: model.translations.0,
            attributes: model.attributes.0,
            image: model.image,
            icon: model.icon,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
