mod support;

use mart_core::{ConversationSide, DomainError, ListingStatus, PageRequest, Snowflake, UserRole};
use mart_service::dto::{ConversationQuery, CreateConversationRequest, SendMessageRequest};
use mart_service::{ConversationService, ServiceError};
use serde_json::json;
use support::TestApp;

fn opener(recipient: Snowflake, listing: Option<Snowflake>, text: &str) -> CreateConversationRequest {
    serde_json::from_value(json!({
        "recipient_id": recipient.to_string(),
        "listing_id": listing.map(|id| id.to_string()),
        "message": text,
    }))
    .unwrap()
}

fn reply(text: &str) -> SendMessageRequest {
    serde_json::from_value(json!({ "content": text })).unwrap()
}

#[tokio::test]
async fn is_this_available() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let buyer = app.user("Elvin", UserRole::User);
    let listing = app.listing(&seller, "Red Bicycle", ListingStatus::Active);
    let service = ConversationService::new(&app.ctx);

    let started = service
        .create_conversation(&buyer, opener(seller.id, Some(listing.id), "Is this available?"))
        .await
        .unwrap();
    assert!(!started.reused);
    assert_eq!(started.conversation.other_user_id, seller.id);
    assert_eq!(started.conversation.unread_count, 0);
    assert_eq!(started.message.receiver_id, seller.id);

    let conversation_id = started.conversation.id;
    let seller_view = service.get_conversation(&seller, conversation_id).await.unwrap();
    assert_eq!(seller_view.unread_count, 1);

    // Asking again about the same listing reuses the thread
    let again = service
        .create_conversation(&buyer, opener(seller.id, Some(listing.id), "Still there?"))
        .await
        .unwrap();
    assert!(again.reused);
    assert_eq!(again.conversation.id, conversation_id);
    assert_eq!(app.store.conversation_count(), 1);

    // The seller opening from their side lands in the same thread
    let from_seller = service
        .create_conversation(&seller, opener(buyer.id, Some(listing.id), "Yes, come by"))
        .await
        .unwrap();
    assert!(from_seller.reused);
    assert_eq!(from_seller.conversation.id, conversation_id);

    let summary = service.unread_summary(&seller).await.unwrap();
    assert_eq!(summary.total_unread, 2);
    assert_eq!(summary.conversations_with_unread, 1);

    let read = service.mark_as_read(&seller, conversation_id).await.unwrap();
    assert_eq!(read.messages_read, 2);
    assert!(app
        .store
        .messages_in(conversation_id)
        .iter()
        .filter(|m| m.receiver_id == seller.id)
        .all(|m| m.is_read && m.read_at.is_some()));
    assert_eq!(service.unread_summary(&seller).await.unwrap().total_unread, 0);
    assert_eq!(service.unread_summary(&buyer).await.unwrap().total_unread, 1);

    let messages = service
        .get_messages(&buyer, conversation_id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(messages.total, 3);
}

#[tokio::test]
async fn a_different_listing_is_a_different_thread() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let buyer = app.user("Elvin", UserRole::User);
    let bike = app.listing(&seller, "Bike", ListingStatus::Active);
    let helmet = app.listing(&seller, "Helmet", ListingStatus::Active);
    let service = ConversationService::new(&app.ctx);

    let first = service
        .create_conversation(&buyer, opener(seller.id, Some(bike.id), "Hi"))
        .await
        .unwrap();
    let second = service
        .create_conversation(&buyer, opener(seller.id, Some(helmet.id), "Hi"))
        .await
        .unwrap();
    let general = service
        .create_conversation(&buyer, opener(seller.id, None, "Hello"))
        .await
        .unwrap();

    assert_ne!(first.conversation.id, second.conversation.id);
    assert_ne!(first.conversation.id, general.conversation.id);
    assert_eq!(app.store.conversation_count(), 3);
}

#[tokio::test]
async fn losing_the_insert_race_joins_the_existing_thread() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let buyer = app.user("Elvin", UserRole::User);
    let listing = app.listing(&seller, "Red Bicycle", ListingStatus::Active);
    let service = ConversationService::new(&app.ctx);

    let first = service
        .create_conversation(&buyer, opener(seller.id, Some(listing.id), "Is this available?"))
        .await
        .unwrap();

    app.store.hide_next_lookups(1);
    let second = service
        .create_conversation(&buyer, opener(seller.id, Some(listing.id), "Hello?"))
        .await
        .unwrap();

    assert!(second.reused);
    assert_eq!(second.conversation.id, first.conversation.id);
    assert_eq!(app.store.conversation_count(), 1);
    assert_eq!(app.store.messages_in(first.conversation.id).len(), 2);
    assert_eq!(
        app.store
            .conversation(first.conversation.id)
            .unwrap()
            .unread_for(ConversationSide::Second),
        2
    );
}

#[tokio::test]
async fn outsiders_cannot_read_or_write() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let buyer = app.user("Elvin", UserRole::User);
    let outsider = app.user("Kamran", UserRole::Admin);
    let service = ConversationService::new(&app.ctx);

    let started = service
        .create_conversation(&buyer, opener(seller.id, None, "Hello"))
        .await
        .unwrap();
    let id = started.conversation.id;

    let err = service.send_message(&outsider, id, reply("hi")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::NotParticipant)));
    assert_eq!(err.status_code(), 403);

    let err = service
        .get_messages(&outsider, id, PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert_eq!(service.mark_as_read(&outsider, id).await.unwrap_err().status_code(), 403);
    assert_eq!(service.archive(&outsider, id).await.unwrap_err().status_code(), 403);
}

#[tokio::test]
async fn opening_rules() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let buyer = app.user("Elvin", UserRole::User);
    let pending = app.listing(&seller, "Draft", ListingStatus::Pending);
    let service = ConversationService::new(&app.ctx);

    let err = service
        .create_conversation(&buyer, opener(buyer.id, None, "Me again"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::CannotMessageSelf)));

    let err = service
        .create_conversation(&buyer, opener(seller.id, Some(pending.id), "Hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::ListingNotActive)));

    let err = service
        .create_conversation(&buyer, opener(app.id(), None, "Anyone?"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = service
        .create_conversation(&buyer, opener(seller.id, None, ""))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(app.store.conversation_count(), 0);
}

#[tokio::test]
async fn archive_is_per_participant_and_new_messages_unarchive() {
    let app = TestApp::new();
    let seller = app.user("Aysel", UserRole::User);
    let buyer = app.user("Elvin", UserRole::User);
    let service = ConversationService::new(&app.ctx);

    let id = service
        .create_conversation(&buyer, opener(seller.id, None, "Hello"))
        .await
        .unwrap()
        .conversation
        .id;

    service.archive(&seller, id).await.unwrap();
    let archived = ConversationQuery { archived: true };
    let seller_archive = service
        .list_conversations(&seller, archived.clone(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(seller_archive.total, 1);
    let buyer_archive = service
        .list_conversations(&buyer, archived.clone(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(buyer_archive.total, 0);

    service.send_message(&buyer, id, reply("Any news?")).await.unwrap();
    let after = service
        .list_conversations(&seller, archived, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(after.total, 0);

    service.archive(&buyer, id).await.unwrap();
    service.unarchive(&buyer, id).await.unwrap();
    let inbox = service
        .list_conversations(&buyer, ConversationQuery::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(inbox.total, 1);
    assert!(!inbox.items[0].is_archived);
}
