//! In-memory repositories and fixtures for service tests
//!
//! One `MemoryStore` implements every repository port over `parking_lot`
//! mutexes, following the same semantics as the Postgres implementations
//! (relative counters, `update` never writing `views`, partial uniqueness on
//! active reports, one conversation per pair and listing).

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mart_common::{ImportConfig, JwtService};
use mart_core::traits::{
    CategoryRepository, ConversationRepository, FavoriteRepository, ListingRepository,
    ReportRepository, UserRepository,
};
use mart_core::{
    Actor, Category, Conversation, ConversationSide, DomainError, Favorite, FavoriteItemType,
    Listing, ListingFilter, ListingReport, ListingSort, ListingStatus, Message, Page, PageRequest,
    RepoResult, ReportFilter, ReportStatus, ReportUpdate, Snowflake, SnowflakeGenerator, User,
    UserFilter, UserRole,
};
use mart_import::ListingImporter;
use mart_service::ServiceContext;
use mart_service::ServiceContextBuilder;
use parking_lot::Mutex;
use rust_decimal::Decimal;

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<(User, String)>>,
    listings: Mutex<Vec<Listing>>,
    categories: Mutex<Vec<Category>>,
    conversations: Mutex<Vec<Conversation>>,
    messages: Mutex<Vec<Message>>,
    reports: Mutex<Vec<ListingReport>>,
    favorites: Mutex<Vec<Favorite>>,
    /// `find_between` calls that miss regardless of contents
    hidden_lookups: Mutex<u32>,
}

impl MemoryStore {
    pub fn listing(&self, id: Snowflake) -> Option<Listing> {
        self.listings.lock().iter().find(|l| l.id == id).cloned()
    }

    pub fn put_listing(&self, listing: Listing) {
        let mut listings = self.listings.lock();
        listings.retain(|l| l.id != listing.id);
        listings.push(listing);
    }

    pub fn category(&self, id: Snowflake) -> Option<Category> {
        self.categories.lock().iter().find(|c| c.id == id).cloned()
    }

    pub fn conversation(&self, id: Snowflake) -> Option<Conversation> {
        self.conversations.lock().iter().find(|c| c.id == id).cloned()
    }

    /// Make the next `n` pair lookups miss, as if another writer had not committed yet
    pub fn hide_next_lookups(&self, n: u32) {
        *self.hidden_lookups.lock() = n;
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.lock().len()
    }

    pub fn messages_in(&self, conversation_id: Snowflake) -> Vec<Message> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    pub fn report(&self, id: Snowflake) -> Option<ListingReport> {
        self.reports.lock().iter().find(|r| r.id == id).cloned()
    }

    pub fn put_report(&self, report: ListingReport) {
        self.reports.lock().push(report);
    }

    pub fn user(&self, id: Snowflake) -> Option<User> {
        self.users
            .lock()
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone())
    }
}

// ============================================================================
// Users
// ============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.user(id))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .iter()
            .find(|(u, _)| u.email.eq_ignore_ascii_case(email))
            .map(|(u, _)| u.clone()))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self
            .users
            .lock()
            .iter()
            .any(|(u, _)| u.email.eq_ignore_ascii_case(email)))
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut users = self.users.lock();
        if users.iter().any(|(u, _)| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(DomainError::EmailAlreadyExists);
        }
        users.push((user.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.lock();
        let slot = users
            .iter_mut()
            .find(|(u, _)| u.id == user.id)
            .ok_or(DomainError::UserNotFound(user.id))?;
        slot.0 = user.clone();
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(self
            .users
            .lock()
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(_, h)| h.clone()))
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> RepoResult<Page<User>> {
        let mut users: Vec<User> = self
            .users
            .lock()
            .iter()
            .map(|(u, _)| u.clone())
            .filter(|u| filter.matches(u))
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(Page::slice(users, page))
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.users.lock().len() as i64)
    }
}

// ============================================================================
// Listings
// ============================================================================

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Listing>> {
        Ok(self.listing(id))
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Listing>> {
        Ok(self.listings.lock().iter().find(|l| l.slug == slug).cloned())
    }

    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Listing>> {
        Ok(self
            .listings
            .lock()
            .iter()
            .filter(|l| ids.contains(&l.id))
            .cloned()
            .collect())
    }

    async fn slug_exists(&self, slug: &str) -> RepoResult<bool> {
        Ok(self.listings.lock().iter().any(|l| l.slug == slug))
    }

    async fn create(&self, listing: &Listing) -> RepoResult<()> {
        let mut listings = self.listings.lock();
        if listings.iter().any(|l| l.slug == listing.slug) {
            return Err(DomainError::SlugAlreadyExists(listing.slug.clone()));
        }
        listings.push(listing.clone());
        Ok(())
    }

    async fn update(&self, listing: &Listing) -> RepoResult<()> {
        let mut listings = self.listings.lock();
        let slot = listings
            .iter_mut()
            .find(|l| l.id == listing.id)
            .ok_or(DomainError::ListingNotFound(listing.id))?;
        let views = slot.views;
        *slot = listing.clone();
        slot.views = views;
        Ok(())
    }

    async fn increment_views(&self, id: Snowflake) -> RepoResult<()> {
        let mut listings = self.listings.lock();
        let listing = listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(DomainError::ListingNotFound(id))?;
        listing.views += 1;
        Ok(())
    }

    async fn search(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
        page: PageRequest,
    ) -> RepoResult<Page<Listing>> {
        let mut found: Vec<Listing> = self
            .listings
            .lock()
            .iter()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        let now = Utc::now();
        found.sort_by(|a, b| sort.compare(a, b, now));
        Ok(Page::slice(found, page))
    }

    async fn featured(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<Listing>> {
        let mut found: Vec<Listing> = self
            .listings
            .lock()
            .iter()
            .filter(|l| {
                l.status == ListingStatus::Active
                    && l.is_featured
                    && l.featured_until.is_some_and(|until| until >= now)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn count_by_status(&self) -> RepoResult<Vec<(ListingStatus, i64)>> {
        let listings = self.listings.lock();
        Ok(ListingStatus::ALL
            .into_iter()
            .map(|s| (s, listings.iter().filter(|l| l.status == s).count() as i64))
            .filter(|(_, n)| *n > 0)
            .collect())
    }

    async fn count_in_category(&self, category_id: Snowflake) -> RepoResult<i64> {
        Ok(self
            .listings
            .lock()
            .iter()
            .filter(|l| l.category_id == Some(category_id))
            .count() as i64)
    }

    async fn clear_expired_featured(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut listings = self.listings.lock();
        Ok(listings
            .iter_mut()
            .filter(|l| l.status != ListingStatus::Deleted)
            .map(|l| l.clear_elapsed_feature(now))
            .filter(|changed| *changed)
            .count() as u64)
    }

    async fn clear_expired_promotions(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut listings = self.listings.lock();
        Ok(listings
            .iter_mut()
            .filter(|l| l.status != ListingStatus::Deleted)
            .map(|l| l.clear_elapsed_promotion(now))
            .filter(|changed| *changed)
            .count() as u64)
    }

    async fn expire_elapsed(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut listings = self.listings.lock();
        Ok(listings
            .iter_mut()
            .map(|l| l.expire_if_elapsed(now))
            .filter(|changed| *changed)
            .count() as u64)
    }
}

// ============================================================================
// Categories
// ============================================================================

fn category_order(a: &Category, b: &Category) -> std::cmp::Ordering {
    a.display_order
        .cmp(&b.display_order)
        .then_with(|| a.name.cmp(&b.name))
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Category>> {
        Ok(self.category(id))
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        Ok(self.categories.lock().iter().find(|c| c.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> RepoResult<bool> {
        Ok(self.categories.lock().iter().any(|c| c.slug == slug))
    }

    async fn list(&self, include_inactive: bool) -> RepoResult<Vec<Category>> {
        let mut all: Vec<Category> = self
            .categories
            .lock()
            .iter()
            .filter(|c| include_inactive || c.is_active)
            .cloned()
            .collect();
        all.sort_by(category_order);
        Ok(all)
    }

    async fn children(&self, parent_id: Snowflake, include_inactive: bool) -> RepoResult<Vec<Category>> {
        let mut children: Vec<Category> = self
            .categories
            .lock()
            .iter()
            .filter(|c| c.parent_id == Some(parent_id) && (include_inactive || c.is_active))
            .cloned()
            .collect();
        children.sort_by(category_order);
        Ok(children)
    }

    async fn count_children(&self, parent_id: Snowflake) -> RepoResult<i64> {
        Ok(self
            .categories
            .lock()
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .count() as i64)
    }

    async fn create(&self, category: &Category) -> RepoResult<()> {
        let mut categories = self.categories.lock();
        if categories.iter().any(|c| c.slug == category.slug) {
            return Err(DomainError::SlugAlreadyExists(category.slug.clone()));
        }
        categories.push(category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> RepoResult<()> {
        let mut categories = self.categories.lock();
        if categories
            .iter()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(DomainError::SlugAlreadyExists(category.slug.clone()));
        }
        let slot = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or(DomainError::CategoryNotFound(category.id))?;
        *slot = category.clone();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut categories = self.categories.lock();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Err(DomainError::CategoryNotFound(id));
        }
        Ok(())
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.categories.lock().len() as i64)
    }
}

// ============================================================================
// Conversations
// ============================================================================

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        Ok(self.conversation(id))
    }

    async fn find_between(
        &self,
        a: Snowflake,
        b: Snowflake,
        listing_id: Option<Snowflake>,
    ) -> RepoResult<Option<Conversation>> {
        {
            let mut hidden = self.hidden_lookups.lock();
            if *hidden > 0 {
                *hidden -= 1;
                return Ok(None);
            }
        }
        Ok(self
            .conversations
            .lock()
            .iter()
            .find(|c| c.connects(a, b, listing_id))
            .cloned())
    }

    async fn create(&self, conversation: &Conversation, first_message: &Message) -> RepoResult<()> {
        let mut conversations = self.conversations.lock();
        if conversations.iter().any(|c| {
            c.connects(conversation.user1_id, conversation.user2_id, conversation.listing_id)
        }) {
            return Err(DomainError::ConversationAlreadyExists);
        }
        conversations.push(conversation.clone());
        drop(conversations);
        self.messages.lock().push(first_message.clone());
        Ok(())
    }

    async fn append_message(&self, message: &Message) -> RepoResult<Conversation> {
        let mut conversations = self.conversations.lock();
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
            .ok_or(DomainError::ConversationNotFound(message.conversation_id))?;
        conversation.record_message(message)?;
        self.messages.lock().push(message.clone());
        Ok(conversation.clone())
    }

    async fn mark_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let mut conversations = self.conversations.lock();
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or(DomainError::ConversationNotFound(conversation_id))?;
        let side = conversation.require_side(user_id)?;

        let mut read = 0;
        for message in self.messages.lock().iter_mut().filter(|m| {
            m.conversation_id == conversation_id && m.receiver_id == user_id && !m.is_read
        }) {
            message.mark_read(at);
            read += 1;
        }
        conversation.reset_unread(side);
        Ok(read)
    }

    async fn set_archived(
        &self,
        conversation_id: Snowflake,
        side: ConversationSide,
        archived: bool,
    ) -> RepoResult<()> {
        let mut conversations = self.conversations.lock();
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or(DomainError::ConversationNotFound(conversation_id))?;
        conversation.set_archived(side, archived);
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Snowflake,
        archived: bool,
        page: PageRequest,
    ) -> RepoResult<Page<Conversation>> {
        let mut found: Vec<Conversation> = self
            .conversations
            .lock()
            .iter()
            .filter(|c| c.side_of(user_id).is_some_and(|s| c.is_archived_for(s) == archived))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(Page::slice(found, page))
    }

    async fn messages(&self, conversation_id: Snowflake, page: PageRequest) -> RepoResult<Page<Message>> {
        let mut found = self.messages_in(conversation_id);
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(Page::slice(found, page))
    }

    async fn unread_summary(&self, user_id: Snowflake) -> RepoResult<(i64, i64)> {
        let conversations = self.conversations.lock();
        let counts: Vec<i64> = conversations
            .iter()
            .filter_map(|c| c.side_of(user_id).map(|s| i64::from(c.unread_for(s))))
            .collect();
        Ok((
            counts.iter().sum(),
            counts.iter().filter(|n| **n > 0).count() as i64,
        ))
    }
}

// ============================================================================
// Reports
// ============================================================================

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ListingReport>> {
        Ok(self.report(id))
    }

    async fn find_active(
        &self,
        listing_id: Snowflake,
        reporter_id: Snowflake,
    ) -> RepoResult<Option<ListingReport>> {
        Ok(self
            .reports
            .lock()
            .iter()
            .find(|r| r.listing_id == listing_id && r.reporter_id == reporter_id && r.status.is_active())
            .cloned())
    }

    async fn create(&self, report: &ListingReport) -> RepoResult<()> {
        let mut reports = self.reports.lock();
        if reports.iter().any(|r| {
            r.listing_id == report.listing_id
                && r.reporter_id == report.reporter_id
                && r.status.is_active()
        }) {
            return Err(DomainError::AlreadyReported);
        }
        reports.push(report.clone());
        Ok(())
    }

    async fn update(&self, report: &ListingReport) -> RepoResult<()> {
        let mut reports = self.reports.lock();
        let slot = reports
            .iter_mut()
            .find(|r| r.id == report.id)
            .ok_or(DomainError::ReportNotFound(report.id))?;
        *slot = report.clone();
        Ok(())
    }

    async fn bulk_update(&self, ids: &[Snowflake], update: &ReportUpdate) -> RepoResult<u64> {
        let mut touched = 0;
        for report in self.reports.lock().iter_mut().filter(|r| ids.contains(&r.id)) {
            update.apply(report);
            touched += 1;
        }
        Ok(touched)
    }

    async fn update_active_for_listing(
        &self,
        listing_id: Snowflake,
        update: &ReportUpdate,
    ) -> RepoResult<u64> {
        let mut touched = 0;
        for report in self
            .reports
            .lock()
            .iter_mut()
            .filter(|r| r.listing_id == listing_id && r.status.is_active())
        {
            update.apply(report);
            touched += 1;
        }
        Ok(touched)
    }

    async fn list(&self, filter: &ReportFilter, page: PageRequest) -> RepoResult<Page<ListingReport>> {
        let mut found: Vec<ListingReport> = self
            .reports
            .lock()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(Page::slice(found, page))
    }

    async fn count_by_status(&self) -> RepoResult<Vec<(ReportStatus, i64)>> {
        let reports = self.reports.lock();
        Ok(ReportStatus::ALL
            .into_iter()
            .map(|s| (s, reports.iter().filter(|r| r.status == s).count() as i64))
            .filter(|(_, n)| *n > 0)
            .collect())
    }

    async fn top_reasons(&self, limit: i64) -> RepoResult<Vec<(String, i64)>> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for report in self.reports.lock().iter() {
            *counts.entry(report.reason.clone()).or_default() += 1;
        }
        let mut ranked: Vec<(String, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn daily_counts(&self, since: DateTime<Utc>) -> RepoResult<Vec<(NaiveDate, i64)>> {
        let mut counts: HashMap<NaiveDate, i64> = HashMap::new();
        for report in self.reports.lock().iter().filter(|r| r.created_at >= since) {
            *counts.entry(report.created_at.date_naive()).or_default() += 1;
        }
        let mut days: Vec<(NaiveDate, i64)> = counts.into_iter().collect();
        days.sort();
        Ok(days)
    }
}

// ============================================================================
// Favorites
// ============================================================================

#[async_trait]
impl FavoriteRepository for MemoryStore {
    async fn find(
        &self,
        user_id: Snowflake,
        item_type: FavoriteItemType,
        item_id: Snowflake,
    ) -> RepoResult<Option<Favorite>> {
        Ok(self
            .favorites
            .lock()
            .iter()
            .find(|f| f.user_id == user_id && f.item_type == item_type && f.item_id == item_id)
            .cloned())
    }

    async fn create(&self, favorite: &Favorite) -> RepoResult<()> {
        let mut favorites = self.favorites.lock();
        if favorites.iter().any(|f| {
            f.user_id == favorite.user_id
                && f.item_type == favorite.item_type
                && f.item_id == favorite.item_id
        }) {
            return Err(DomainError::FavoriteAlreadyExists);
        }
        favorites.push(favorite.clone());
        Ok(())
    }

    async fn delete(
        &self,
        user_id: Snowflake,
        item_type: FavoriteItemType,
        item_id: Snowflake,
    ) -> RepoResult<()> {
        let mut favorites = self.favorites.lock();
        let before = favorites.len();
        favorites.retain(|f| !(f.user_id == user_id && f.item_type == item_type && f.item_id == item_id));
        if favorites.len() == before {
            return Err(DomainError::FavoriteNotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        user_id: Snowflake,
        item_type: Option<FavoriteItemType>,
        page: PageRequest,
    ) -> RepoResult<Page<Favorite>> {
        let mut found: Vec<Favorite> = self
            .favorites
            .lock()
            .iter()
            .filter(|f| f.user_id == user_id && item_type.is_none_or(|t| f.item_type == t))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(Page::slice(found, page))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub ctx: ServiceContext,
    ids: SnowflakeGenerator,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let ctx = ServiceContextBuilder::new()
            .user_repo(store.clone())
            .listing_repo(store.clone())
            .category_repo(store.clone())
            .conversation_repo(store.clone())
            .report_repo(store.clone())
            .favorite_repo(store.clone())
            .jwt_service(Arc::new(JwtService::new(
                "service-test-secret-that-is-long-enough",
                "mart-test",
                900,
                86_400,
            )))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1).unwrap()))
            .importer(Arc::new(ListingImporter::new(ImportConfig::default()).unwrap()))
            .build()
            .unwrap();

        Self {
            store,
            ctx,
            ids: SnowflakeGenerator::new(2).unwrap(),
        }
    }

    pub fn id(&self) -> Snowflake {
        self.ids.generate()
    }

    /// Insert an account directly and return its actor
    pub fn user(&self, first_name: &str, role: UserRole) -> Actor {
        let id = self.id();
        let mut user = User::new(
            id,
            format!("{}.{id}@mart.az", first_name.to_lowercase()),
            first_name.to_string(),
            "Test".to_string(),
        );
        user.role = role;
        let actor = user.actor();
        self.store.users.lock().push((user, "unused".to_string()));
        actor
    }

    /// Insert a listing in the given status
    pub fn listing(&self, owner: &Actor, title: &str, status: ListingStatus) -> Listing {
        let id = self.id();
        let mut listing = Listing::new(
            id,
            owner.id,
            title.to_string(),
            format!("{}-{id}", mart_core::slugify(title)),
            format!("{title} in good condition"),
            Decimal::new(250, 0),
            Utc::now(),
        );
        listing.status = status;
        if status == ListingStatus::Active {
            listing.expiry_date = Some(Utc::now() + chrono::Duration::days(30));
        }
        self.store.put_listing(listing.clone());
        listing
    }

    pub fn category(&self, name: &str, parent: Option<Snowflake>) -> Category {
        let mut category = Category::new(self.id(), name.to_string(), mart_core::slugify(name));
        category.parent_id = parent;
        self.store.categories.lock().push(category.clone());
        category
    }
}

/// Let spawned fire-and-forget tasks run to completion
pub async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}
