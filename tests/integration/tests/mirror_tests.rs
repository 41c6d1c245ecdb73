//! End-to-end tests for mirrored conversations
//!
//! Drives the services against the in-memory store, so no external
//! services are needed. The final test runs against live PostgreSQL and
//! Redis when DATABASE_URL and REDIS_URL are set.
//!
//! Run with: cargo test -p integration-tests --test mirror_tests

use std::sync::Arc;

use integration_tests::*;
use mirror_cache::{CacheKey, CacheStore};
use mirror_core::{ReactionEmoji, Snowflake};
use mirror_service::dto::{MessageResponse, SendMessageRequest, SendMessageResponse};
use mirror_service::{
    ConversationMirrorService, ErrorKind, MessageMirrorService, MessagingSettings,
    ReactionSyncService, ServiceContext,
};

fn id(raw: &str) -> Snowflake {
    raw.parse().unwrap()
}

async fn send(ctx: &ServiceContext, sender: Snowflake, request: SendMessageRequest) -> SendMessageResponse {
    MessageMirrorService::new(ctx).send(sender, request).await.unwrap()
}

// ============================================================================
// First Send
// ============================================================================

#[tokio::test]
async fn test_first_send_creates_symmetric_pair() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();

    let response = send(&h.ctx, u1, text_to(u2, "hi")).await;

    assert_eq!(h.store.conversation_count(), 2);
    assert_eq!(h.store.message_count(), 2);

    let a = h.store.conversation(id(&response.message.conversation_id)).unwrap();
    let b = h.store.conversation(id(&response.mirror_message.conversation_id)).unwrap();
    assert_eq!((a.owner_id, a.counterpart_id), (u1, u2));
    assert_eq!((b.owner_id, b.counterpart_id), (u2, u1));
    assert_eq!(a.mirror_id, b.id);
    assert_eq!(b.mirror_id, a.id);
    assert!(!a.unread);
    assert!(b.unread);
    assert_eq!(a.last_message_at, b.last_message_at);

    let m = h.store.message(id(&response.message.id)).unwrap();
    let mirror = h.store.message(id(&response.mirror_message.id)).unwrap();
    assert!(m.is_mirror_of(&mirror));
    assert_eq!((m.sender_id, m.receiver_id), (u1, u2));
    assert_eq!((mirror.sender_id, mirror.receiver_id), (u2, u1));
    assert_eq!(m.content, "hi");
    assert_eq!(mirror.content, "hi");
    assert_eq!(a.last_message_at, Some(m.created_at));

    let snapshot = response.mirror_conversation.expect("pair created by this send");
    assert_eq!(snapshot.id, b.id.to_string());
    assert!(snapshot.unread);
    assert_eq!(snapshot.last_message_at, b.last_message_at);
}

#[tokio::test]
async fn test_later_sends_reuse_pair() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();

    let first = send(&h.ctx, u1, text_to(u2, "one")).await;
    let reply = send(&h.ctx, u2, text_to(u1, "two")).await;
    let hinted = send(&h.ctx, u1, text_in(u2, &first.message.conversation_id, "three")).await;

    assert_eq!(h.store.conversation_count(), 2);
    assert!(reply.mirror_conversation.is_none());
    assert!(hinted.mirror_conversation.is_none());
    assert_eq!(reply.message.conversation_id, first.mirror_message.conversation_id);
    assert_eq!(hinted.message.conversation_id, first.message.conversation_id);

    // u2 replied, then u1 wrote again: u2 has unseen activity, u1 does not
    let a = h.store.conversation(id(&first.message.conversation_id)).unwrap();
    let b = h.store.conversation(id(&first.mirror_message.conversation_id)).unwrap();
    assert!(!a.unread);
    assert!(b.unread);
}

#[tokio::test]
async fn test_display_is_mirrored_on_creation() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();

    let mut request = text_to(u2, "hey");
    request.display = Some(display("me", "you"));
    let response = send(&h.ctx, u1, request).await;

    let a = h.store.conversation(id(&response.message.conversation_id)).unwrap();
    let b = h.store.conversation(id(&response.mirror_message.conversation_id)).unwrap();
    assert_eq!(a.display.nickname_owner.as_deref(), Some("me"));
    assert_eq!(a.display.nickname_counterpart.as_deref(), Some("you"));
    assert_eq!(b.display.nickname_owner.as_deref(), Some("you"));
    assert_eq!(b.display.nickname_counterpart.as_deref(), Some("me"));
    assert_eq!(a.display.color, b.display.color);
    assert_eq!(a.display.emoji, b.display.emoji);
}

#[tokio::test]
async fn test_n_sends_create_2n_mirrored_messages() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let n = 5;

    for i in 0..n {
        let (from, to) = if i % 2 == 0 { (u1, u2) } else { (u2, u1) };
        let mut request = text_to(to, &format!("message {i}"));
        request.message_type = Some(if i == 3 { "IMAGE" } else { "TEXT" }.to_string());
        send(&h.ctx, from, request).await;
    }

    let messages = h.store.messages();
    assert_eq!(messages.len(), 2 * n);

    for message in &messages {
        let mirrors: Vec<_> = messages.iter().filter(|m| m.is_mirror_of(message)).collect();
        assert_eq!(mirrors.len(), 1);
        let mirror = mirrors[0];
        assert_eq!(mirror.content, message.content);
        assert_eq!(mirror.message_type, message.message_type);
        assert_eq!(mirror.created_at, message.created_at);
        assert_eq!(mirror.sender_id, message.receiver_id);
        assert_eq!(mirror.receiver_id, message.sender_id);
        assert_ne!(mirror.conversation_id, message.conversation_id);
    }
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_first_sends_share_one_pair() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let service = MessageMirrorService::new(&h.ctx);

    let (a, b) = tokio::join!(
        service.send(u1, text_to(u2, "from u1")),
        service.send(u2, text_to(u1, "from u2")),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(h.store.conversation_count(), 2);
    assert_eq!(h.store.message_count(), 4);
    assert_eq!(a.message.conversation_id, b.mirror_message.conversation_id);
    assert_eq!(b.message.conversation_id, a.mirror_message.conversation_id);
    // Exactly one of the calls created the pair
    assert!(a.mirror_conversation.is_some() ^ b.mirror_conversation.is_some());
}

#[tokio::test]
async fn test_concurrent_sends_same_direction() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let service = MessageMirrorService::new(&h.ctx);

    let (a, b) = tokio::join!(
        service.send(u1, text_to(u2, "first")),
        service.send(u1, text_to(u2, "second")),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(h.store.conversation_count(), 2);
    assert_eq!(a.message.conversation_id, b.message.conversation_id);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_rejected_sends_write_nothing() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let service = MessageMirrorService::new(&h.ctx);

    let blank = service.send(u1, text_to(u2, "   ")).await.unwrap_err();
    assert_eq!(blank.error_code(), "INVALID_CONTENT");

    let mut bad_type = text_to(u2, "hi");
    bad_type.message_type = Some("STICKER".to_string());
    let bad_type = service.send(u1, bad_type).await.unwrap_err();
    assert_eq!(bad_type.error_code(), "INVALID_CONTENT");

    let mut no_type = text_to(u2, "hi");
    no_type.message_type = None;
    let no_type = service.send(u1, no_type).await.unwrap_err();
    assert_eq!(no_type.error_code(), "INVALID_CONTENT");

    let to_self = service.send(u1, text_to(u1, "hi")).await.unwrap_err();
    assert_eq!(to_self.error_code(), "SELF_MESSAGE");

    let mut long_nickname = text_to(u2, "hi");
    long_nickname.display = Some(display(&"x".repeat(65), "you"));
    let long_nickname = service.send(u1, long_nickname).await.unwrap_err();
    assert_eq!(long_nickname.kind(), ErrorKind::Validation);

    let mut bad_receiver = text_to(u2, "hi");
    bad_receiver.receiver_id = "not-a-snowflake".to_string();
    let bad_receiver = service.send(u1, bad_receiver).await.unwrap_err();
    assert_eq!(bad_receiver.kind(), ErrorKind::Validation);

    assert_eq!(h.store.conversation_count(), 0);
    assert_eq!(h.store.message_count(), 0);
}

#[tokio::test]
async fn test_resolve_pair_rejects_same_participant() {
    let h = TestHarness::new();
    let u1 = new_user();

    let err = ConversationMirrorService::new(&h.ctx)
        .resolve_pair(u1, u1, None, Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_PARTICIPANTS");
    assert_eq!(h.store.conversation_count(), 0);
}

#[tokio::test]
async fn test_hint_must_belong_to_sender_and_receiver() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let u3 = new_user();

    let first = send(&h.ctx, u1, text_to(u2, "hi")).await;
    let service = MessageMirrorService::new(&h.ctx);

    // Receiver's conversation used as the sender's
    let err = service
        .send(u1, text_in(u2, &first.mirror_message.conversation_id, "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Right conversation, wrong receiver
    let err = service
        .send(u1, text_in(u3, &first.message.conversation_id, "x"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_CONVERSATION");

    assert_eq!(h.store.conversation_count(), 2);
    assert_eq!(h.store.message_count(), 2);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test]
async fn test_failed_commit_leaves_no_trace() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();

    let first = send(&h.ctx, u1, text_to(u2, "kept")).await;
    let a_id = id(&first.message.conversation_id);
    let b_id = id(&first.mirror_message.conversation_id);
    let a_before = h.store.conversation(a_id).unwrap();
    let b_before = h.store.conversation(b_id).unwrap();

    h.store.fail_message_commits(true);
    let err = MessageMirrorService::new(&h.ctx)
        .send(u2, text_to(u1, "lost"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WriteFailure);
    assert_eq!(err.error_code(), "WRITE_FAILURE");
    assert_eq!(h.store.message_count(), 2);
    assert_eq!(h.store.conversation(a_id).unwrap(), a_before);
    assert_eq!(h.store.conversation(b_id).unwrap(), b_before);
}

#[tokio::test]
async fn test_failed_first_send_creates_no_conversation() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();

    h.store.fail_message_commits(true);
    let err = MessageMirrorService::new(&h.ctx)
        .send(u1, text_to(u2, "lost"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WriteFailure);
    assert_eq!(h.store.conversation_count(), 0);
    assert_eq!(h.store.message_count(), 0);
    let listed = ConversationMirrorService::new(&h.ctx)
        .list_conversations(u2)
        .await
        .unwrap();
    assert!(listed.is_empty());

    // The retry is the real first send, so the receiver still gets the snapshot
    h.store.fail_message_commits(false);
    let retry = send(&h.ctx, u1, text_to(u2, "again")).await;
    let snapshot = retry.mirror_conversation.expect("retry creates the pair");
    assert_eq!(snapshot.id, retry.mirror_message.conversation_id);
    assert!(snapshot.unread);
    assert_eq!(h.store.conversation_count(), 2);

    let listed = ConversationMirrorService::new(&h.ctx)
        .list_conversations(u2)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_content_is_stored_trimmed() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();

    let response = send(&h.ctx, u1, text_to(u2, "  hi there \n")).await;

    assert_eq!(response.message.content, "hi there");
    assert_eq!(response.mirror_message.content, "hi there");
    for message in h.store.messages() {
        assert_eq!(message.content, "hi there");
    }
}

#[tokio::test]
async fn test_send_timestamps_match_stored_precision() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();

    let response = send(&h.ctx, u1, text_to(u2, "hi")).await;

    assert_eq!(response.message.created_at.timestamp_subsec_nanos() % 1_000, 0);
    let snapshot = response.mirror_conversation.unwrap();
    assert_eq!(snapshot.last_message_at, Some(response.mirror_message.created_at));
    assert_eq!(snapshot.created_at.timestamp_subsec_nanos() % 1_000, 0);
}

#[tokio::test]
async fn test_unreachable_cache_never_fails_mutations() {
    let h = TestHarness::with_cache_store(Arc::new(UnreachableCache));
    let (u1, u2) = new_users();

    let response = send(&h.ctx, u1, text_to(u2, "hi")).await;
    ReactionSyncService::new(&h.ctx)
        .react(react(Some("👍"), &response.message.id, &response.mirror_message.id))
        .await
        .unwrap();

    let page = MessageMirrorService::new(&h.ctx)
        .list_messages(u2, id(&response.mirror_message.conversation_id), 0)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].reaction.as_deref(), Some("👍"));
}

#[tokio::test]
async fn test_stalled_cache_is_bounded() {
    let h = TestHarness::with_cache_store(Arc::new(StalledCache));
    let (u1, u2) = new_users();

    let response = send(&h.ctx, u1, text_to(u2, "hi")).await;
    ReactionSyncService::new(&h.ctx)
        .react(react(Some("😮"), &response.mirror_message.id, &response.message.id))
        .await
        .unwrap();

    assert_eq!(h.store.message_count(), 2);
}

// ============================================================================
// Cache Coherence
// ============================================================================

#[tokio::test]
async fn test_send_invalidates_cached_pages() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let service = MessageMirrorService::new(&h.ctx);

    let first = send(&h.ctx, u1, text_to(u2, "one")).await;
    let a_id = id(&first.message.conversation_id);
    let b_id = id(&first.mirror_message.conversation_id);

    let before = service.list_messages(u1, a_id, 0).await.unwrap();
    service.list_messages(u2, b_id, 0).await.unwrap();
    assert_eq!(before.len(), 1);

    let page_key = CacheKey::message_page(a_id, 0).name();
    let cached: Vec<MessageResponse> =
        serde_json::from_str(&h.cache_store.get(&page_key).await.unwrap().unwrap()).unwrap();
    assert_eq!(cached, before);

    send(&h.ctx, u2, text_to(u1, "two")).await;

    assert!(!h.cache_store.contains(&page_key));
    assert!(!h.cache_store.contains(&CacheKey::message_page(b_id, 0).name()));

    let after = service.list_messages(u1, a_id, 0).await.unwrap();
    assert_ne!(after, before);
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].content, "two");
}

#[tokio::test]
async fn test_send_invalidates_both_conversation_lists() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let conversations = ConversationMirrorService::new(&h.ctx);

    let first = send(&h.ctx, u1, text_to(u2, "one")).await;
    conversations.list_conversations(u1).await.unwrap();
    let listed = conversations.list_conversations(u2).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].unread);

    send(&h.ctx, u2, text_to(u1, "two")).await;

    assert!(!h.cache_store.contains(&CacheKey::conversation_list(u1).name()));
    assert!(!h.cache_store.contains(&CacheKey::conversation_list(u2).name()));

    let listed = conversations.list_conversations(u1).await.unwrap();
    assert_eq!(listed[0].id, first.message.conversation_id);
    assert!(listed[0].unread);
}

#[tokio::test]
async fn test_reaction_invalidates_both_sides() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let service = MessageMirrorService::new(&h.ctx);

    let sent = send(&h.ctx, u1, text_to(u2, "react to me")).await;
    let b_id = id(&sent.mirror_message.conversation_id);
    let stale = service.list_messages(u2, b_id, 0).await.unwrap();
    assert!(stale[0].reaction.is_none());

    ReactionSyncService::new(&h.ctx)
        .react(react(Some("😂"), &sent.message.id, &sent.mirror_message.id))
        .await
        .unwrap();

    let fresh = service.list_messages(u2, b_id, 0).await.unwrap();
    assert_eq!(fresh[0].reaction.as_deref(), Some("😂"));
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_reaction_reaches_mirror() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();

    let sent = send(&h.ctx, u1, text_to(u2, "hi")).await;
    let response = ReactionSyncService::new(&h.ctx)
        .react(react(Some("👍"), &sent.message.id, &sent.mirror_message.id))
        .await
        .unwrap();
    assert_eq!(response.emoji.as_deref(), Some("👍"));

    let mirror = h.store.message(id(&sent.mirror_message.id)).unwrap();
    assert_eq!(mirror.reaction, Some(ReactionEmoji::ThumbsUp));
}

#[tokio::test]
async fn test_repeated_reaction_is_idempotent() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let reactions = ReactionSyncService::new(&h.ctx);

    let sent = send(&h.ctx, u1, text_to(u2, "hi")).await;
    for _ in 0..2 {
        reactions
            .react(react(Some("❤️"), &sent.mirror_message.id, &sent.message.id))
            .await
            .unwrap();
    }

    assert_eq!(h.store.message_count(), 2);
    for message_id in [&sent.message.id, &sent.mirror_message.id] {
        let message = h.store.message(id(message_id)).unwrap();
        assert_eq!(message.reaction, Some(ReactionEmoji::Heart));
    }

    // Blank clears both sides
    reactions
        .react(react(Some(" "), &sent.message.id, &sent.mirror_message.id))
        .await
        .unwrap();
    assert!(h.store.message(id(&sent.mirror_message.id)).unwrap().reaction.is_none());
}

#[tokio::test]
async fn test_reaction_on_unrelated_messages_is_rejected() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let reactions = ReactionSyncService::new(&h.ctx);

    let x = send(&h.ctx, u1, text_to(u2, "x")).await;
    let y = send(&h.ctx, u2, text_to(u1, "y")).await;

    let err = reactions
        .react(react(Some("😂"), &x.message.id, &y.message.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.error_code(), "MISMATCHED_MIRROR");

    assert!(h.store.messages().iter().all(|m| m.reaction.is_none()));
}

#[tokio::test]
async fn test_reaction_errors() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let reactions = ReactionSyncService::new(&h.ctx);
    let sent = send(&h.ctx, u1, text_to(u2, "hi")).await;

    let err = reactions
        .react(react(Some("🍕"), &sent.message.id, &sent.mirror_message.id))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_EMOJI");

    let missing = new_user().to_string();
    let err = reactions
        .react(react(Some("👍"), &sent.message.id, &missing))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.error_code(), "MISMATCHED_MIRROR");

    let err = reactions
        .react(react(Some("👍"), &missing, &sent.mirror_message.id))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "MISMATCHED_MIRROR");

    assert!(h.store.messages().iter().all(|m| m.reaction.is_none()));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_messages_requires_ownership() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let sent = send(&h.ctx, u1, text_to(u2, "private")).await;

    let err = MessageMirrorService::new(&h.ctx)
        .list_messages(u2, id(&sent.message.conversation_id), 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_list_messages_pages_newest_first() {
    let h = TestHarness::with_settings(MessagingSettings {
        page_size: 2,
        ..MessagingSettings::default()
    });
    let (u1, u2) = new_users();

    let mut conversation_id = String::new();
    for content in ["one", "two", "three"] {
        conversation_id = send(&h.ctx, u1, text_to(u2, content)).await.message.conversation_id;
    }

    let service = MessageMirrorService::new(&h.ctx);
    let first = service.list_messages(u1, id(&conversation_id), 0).await.unwrap();
    let second = service.list_messages(u1, id(&conversation_id), 1).await.unwrap();

    let contents: Vec<_> = first.iter().chain(&second).map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["three", "two", "one"]);
}

#[tokio::test]
async fn test_list_conversations_most_recent_first() {
    let h = TestHarness::new();
    let u1 = new_user();
    let (u2, u3) = new_users();

    let older = send(&h.ctx, u1, text_to(u2, "old")).await;
    let newer = send(&h.ctx, u3, text_to(u1, "new")).await;

    let listed = ConversationMirrorService::new(&h.ctx)
        .list_conversations(u1)
        .await
        .unwrap();
    let ids: Vec<_> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            newer.mirror_message.conversation_id.as_str(),
            older.message.conversation_id.as_str()
        ]
    );
}

#[tokio::test]
async fn test_mark_read() {
    let h = TestHarness::new();
    let (u1, u2) = new_users();
    let conversations = ConversationMirrorService::new(&h.ctx);

    let sent = send(&h.ctx, u1, text_to(u2, "hi")).await;
    let b_id = id(&sent.mirror_message.conversation_id);
    assert!(conversations.list_conversations(u2).await.unwrap()[0].unread);

    conversations.mark_read(u2, b_id).await.unwrap();

    assert!(!h.store.conversation(b_id).unwrap().unread);
    assert!(!conversations.list_conversations(u2).await.unwrap()[0].unread);

    let err = conversations.mark_read(u1, b_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ============================================================================
// Live Backends
// ============================================================================

#[tokio::test]
async fn test_live_send_and_react() {
    let Some(config) = live_test_config() else {
        return;
    };
    init_test_tracing();

    let ctx = ServiceContext::connect(&config).await.unwrap();
    let (u1, u2) = new_users();

    let sent = send(&ctx, u1, text_to(u2, "hello over the wire")).await;
    assert!(sent.mirror_conversation.is_some());

    ReactionSyncService::new(&ctx)
        .react(react(Some("👍"), &sent.message.id, &sent.mirror_message.id))
        .await
        .unwrap();

    let page = MessageMirrorService::new(&ctx)
        .list_messages(u2, id(&sent.mirror_message.conversation_id), 0)
        .await
        .unwrap();
    assert_eq!(page[0].id, sent.mirror_message.id);
    assert_eq!(page[0].reaction.as_deref(), Some("👍"));
}
