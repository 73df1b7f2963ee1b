//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use mart_common::TokenPair;
use mart_core::{
    CategoryNode, Category, Conversation, Favorite, Listing, ListingReport, Message, Snowflake,
    SweepCounts, User,
};

use super::responses::{
    AuthResponse, CategoryResponse, CategoryTreeResponse, ConversationResponse, FavoriteResponse,
    ListingResponse, ListingSummary, MessageResponse, PublicUserResponse, ReportResponse,
    SweepResponse, TokenResponse, UserResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            role: user.role,
            status: user.status,
            profile_image: user.profile_image.clone(),
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<User> for PublicUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_image: user.profile_image,
            created_at: user.created_at,
        }
    }
}

impl AuthResponse {
    pub fn new(tokens: TokenPair, user: &User) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
            user: UserResponse::from(user),
        }
    }
}

impl From<TokenPair> for TokenResponse {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        }
    }
}

// ============================================================================
// Listing Mappers
// ============================================================================

impl From<Listing> for ListingResponse {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
            user_id: l.user_id,
            category_id: l.category_id,
            title: l.title,
            slug: l.slug,
            description: l.description,
            price: l.price,
            currency: l.currency,
            condition: l.condition,
            location: l.location,
            images: l.images,
            featured_image: l.featured_image,
            status: l.status,
            is_promoted: l.is_promoted,
            promotion_end_date: l.promotion_end_date,
            is_featured: l.is_featured,
            featured_until: l.featured_until,
            views: l.views,
            contact_phone: l.contact_phone,
            contact_email: l.contact_email,
            contact_method: l.contact_method,
            rejection_reason: l.rejection_reason,
            expiry_date: l.expiry_date,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

impl From<Listing> for ListingSummary {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
            title: l.title,
            slug: l.slug,
            price: l.price,
            currency: l.currency,
            featured_image: l.featured_image,
            status: l.status,
            location: l.location,
        }
    }
}

impl From<SweepCounts> for SweepResponse {
    fn from(c: SweepCounts) -> Self {
        Self {
            featured_cleared: c.featured_cleared,
            promotions_cleared: c.promotions_cleared,
            listings_expired: c.listings_expired,
        }
    }
}

// ============================================================================
// Category Mappers
// ============================================================================

impl CategoryResponse {
    /// `locale` picks a translated name, falling back to the base name
    pub fn localized(category: Category, locale: Option<&str>) -> Self {
        let name = match locale {
            Some(locale) => category.name_for(locale).to_string(),
            None => category.name.clone(),
        };
        Self {
            id: category.id,
            name,
            slug: category.slug,
            parent_id: category.parent_id,
            is_active: category.is_active,
            display_order: category.display_order,
            translations: category.translations,
            attributes: category.attributes,
            image: category.image,
            icon: category.icon,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self::localized(category, None)
    }
}

impl CategoryTreeResponse {
    pub fn from_node(node: CategoryNode, locale: Option<&str>) -> Self {
        Self {
            category: CategoryResponse::localized(node.category, locale),
            children: node
                .children
                .into_iter()
                .map(|child| Self::from_node(child, locale))
                .collect(),
        }
    }
}

// ============================================================================
// Conversation Mappers
// ============================================================================

impl ConversationResponse {
    /// Project the per-side columns for `viewer`. The caller has already
    /// checked that `viewer` is a participant.
    pub fn for_participant(conversation: &Conversation, viewer: Snowflake) -> Self {
        let side = conversation.side_of(viewer);
        let other_user_id = if conversation.user1_id == viewer {
            conversation.user2_id
        } else {
            conversation.user1_id
        };
        Self {
            id: conversation.id,
            other_user_id,
            listing_id: conversation.listing_id,
            unread_count: side.map_or(0, |s| conversation.unread_for(s)),
            is_archived: side.is_some_and(|s| conversation.is_archived_for(s)),
            last_message_at: conversation.last_message_at,
            created_at: conversation.created_at,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            content: m.content,
            is_read: m.is_read,
            read_at: m.read_at,
            created_at: m.created_at,
        }
    }
}

// ============================================================================
// Report / Favorite Mappers
// ============================================================================

impl From<ListingReport> for ReportResponse {
    fn from(r: ListingReport) -> Self {
        Self {
            id: r.id,
            listing_id: r.listing_id,
            reporter_id: r.reporter_id,
            reason: r.reason,
            additional_info: r.additional_info,
            status: r.status,
            admin_note: r.admin_note,
            last_updated_by: r.last_updated_by,
            status_updated_at: r.status_updated_at,
            action_taken: r.action_taken,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl FavoriteResponse {
    pub fn new(favorite: Favorite, listing: Option<Listing>) -> Self {
        Self {
            id: favorite.id,
            item_type: favorite.item_type,
            item_id: favorite.item_id,
            listing: listing.map(ListingSummary::from),
            created_at: favorite.created_at,
        }
    }
}
