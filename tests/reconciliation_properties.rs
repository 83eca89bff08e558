//! Property tests for cache reconciliation.
//!
//! Reconciling the same decoded event twice must leave the cache exactly
//! as reconciling it once, whatever the cache held beforehand.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

use escrow_sync::adapters::InMemoryEntityCache;
use escrow_sync::domain::cache::CacheKey;
use escrow_sync::domain::foundation::{ConversationId, Timestamp, TransactionId};
use escrow_sync::ports::EntityCache;
use escrow_sync::{CacheReconciler, DomainEvent};

// =============================================================================
// Test Infrastructure
// =============================================================================

const TRANSACTIONS: [&str; 3] = ["T1", "T2", "T3"];
const CONVERSATIONS: [&str; 2] = ["C1", "C2"];
const STATUSES: [&str; 4] = ["funded", "shipped", "delivered", "disputed"];

fn setup() -> (Arc<InMemoryEntityCache>, CacheReconciler) {
    let cache = Arc::new(InMemoryEntityCache::new());
    let reconciler = CacheReconciler::new(cache.clone());
    (cache, reconciler)
}

fn transaction_key(id: &str) -> CacheKey {
    CacheKey::Transaction(TransactionId::new(id).unwrap())
}

fn messages_key(id: &str) -> CacheKey {
    CacheKey::ConversationMessages(ConversationId::new(id).unwrap())
}

fn arb_transaction_event() -> impl Strategy<Value = Value> {
    (
        prop::sample::select(vec![
            "status_changed",
            "transaction_updated",
            "participant_assigned",
            "seller_assigned",
        ]),
        prop::sample::select(TRANSACTIONS.to_vec()),
        prop::option::of(prop::sample::select(STATUSES.to_vec())),
        prop::option::of("[a-z]{1,8}"),
        prop::bool::ANY,
    )
        .prop_map(|(kind, id, status, title, with_time)| {
            let mut event = json!({ "type": kind, "transactionId": id });
            if let Some(status) = status {
                event["status"] = json!(status);
            }
            if let Some(title) = title {
                event["payload"] = json!({ "title": title });
            }
            if with_time {
                event["timestamp"] = json!("2024-05-01T12:00:00Z");
            }
            event
        })
}

fn arb_chat_event() -> impl Strategy<Value = Value> {
    (
        prop::sample::select(vec!["new_message", "messages_read", "typing"]),
        prop::sample::select(CONVERSATIONS.to_vec()),
        prop::option::of(0u8..6),
        prop::sample::select(vec!["hello", "are you there?", "shipped it"]),
        prop::sample::select(vec!["u1", "u2"]),
    )
        .prop_map(|(kind, conversation, message_id, content, sender)| {
            let mut event = json!({ "type": kind, "conversationId": conversation });
            if kind == "new_message" {
                let mut payload = json!({ "content": content, "sender_id": sender });
                if let Some(n) = message_id {
                    payload["id"] = json!(format!("m{}", n));
                }
                event["payload"] = payload;
            }
            event
        })
}

fn arb_event() -> impl Strategy<Value = Value> {
    prop_oneof![arb_transaction_event(), arb_chat_event()]
}

/// Arbitrary prior cache contents, including optimistic messages.
fn arb_seed() -> impl Strategy<Value = Vec<(u8, bool)>> {
    prop::collection::vec((0u8..8, prop::bool::ANY), 0..8)
}

fn seed_cache(cache: &InMemoryEntityCache, seed: &[(u8, bool)]) {
    for (slot, stale) in seed {
        let (key, value) = match *slot {
            0..=2 => {
                let id = TRANSACTIONS[*slot as usize];
                (transaction_key(id), json!({ "id": id, "status": "funded" }))
            }
            3 => (CacheKey::Transactions, json!([{ "id": "T1" }])),
            4 => (CacheKey::Conversations, json!([{ "id": "C1" }])),
            5 | 6 => {
                let id = CONVERSATIONS[(*slot - 5) as usize];
                (
                    messages_key(id),
                    json!([
                        { "id": "m0", "content": "hello", "sender_id": "u2" },
                        { "id": "temp-1", "content": "shipped it", "sender_id": "u1" },
                    ]),
                )
            }
            _ => (messages_key("C1"), json!({ "unexpected": "shape" })),
        };
        cache.write(key.clone(), value);
        if *stale {
            cache.invalidate(&key);
        }
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn reconciling_twice_equals_reconciling_once(seed in arb_seed(), raw in arb_event()) {
        let (cache, reconciler) = setup();
        seed_cache(&cache, &seed);
        let event = DomainEvent::decode(&raw.to_string(), Timestamp::now()).unwrap();

        reconciler.apply(&event);
        let once = cache.snapshot();
        reconciler.apply(&event);

        prop_assert_eq!(cache.snapshot(), once);
    }

    #[test]
    fn stream_of_events_is_idempotent_per_event(
        seed in arb_seed(),
        raws in prop::collection::vec(arb_event(), 1..10),
    ) {
        let (cache, reconciler) = setup();
        seed_cache(&cache, &seed);

        for raw in raws {
            let event = DomainEvent::decode(&raw.to_string(), Timestamp::now()).unwrap();
            reconciler.apply(&event);
            let once = cache.snapshot();
            reconciler.apply(&event);
            prop_assert_eq!(cache.snapshot(), once);
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn optimistic_message_is_replaced_not_duplicated() {
    let (cache, reconciler) = setup();
    let conversation = ConversationId::new("C1").unwrap();
    cache.write(
        messages_key("C1"),
        json!([{ "id": "m1", "content": "hi", "sender_id": "u2" }]),
    );

    let temp_id = reconciler.add_optimistic_message(&conversation, "deal?", "u1");
    let before = cache.read(&messages_key("C1")).unwrap().value;
    assert_eq!(before.as_array().unwrap().len(), 2);

    let raw = r#"{"type":"new_message","conversationId":"C1","payload":{"id":"m2","content":"deal?","sender_id":"u1"}}"#;
    reconciler.apply(&DomainEvent::decode(raw, Timestamp::now()).unwrap());

    let after = cache.read(&messages_key("C1")).unwrap().value;
    let after = after.as_array().unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after[1]["id"], "m2");
    assert!(after.iter().all(|m| m["id"] != temp_id.as_str()));
}

#[test]
fn optimistic_message_from_numeric_sender_is_matched() {
    let (cache, reconciler) = setup();
    let conversation = ConversationId::new("C1").unwrap();
    reconciler.add_optimistic_message(&conversation, "ok", "7");

    let raw = r#"{"type":"new_message","conversationId":"C1","payload":{"id":99,"content":"ok","sender_id":7}}"#;
    reconciler.apply(&DomainEvent::decode(raw, Timestamp::now()).unwrap());

    let list = cache.read(&messages_key("C1")).unwrap().value;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], 99);
}

#[test]
fn delivered_status_is_visible_immediately_and_marks_lists_stale() {
    let (cache, reconciler) = setup();
    cache.write(transaction_key("T1"), json!({ "id": "T1", "status": "shipped" }));
    cache.write(CacheKey::Transactions, json!([{ "id": "T1", "status": "shipped" }]));

    let raw = r#"{"type":"status_changed","transactionId":"T1","previousStatus":"shipped","status":"delivered"}"#;
    reconciler.apply(&DomainEvent::decode(raw, Timestamp::now()).unwrap());

    let detail = cache.read(&transaction_key("T1")).unwrap();
    assert_eq!(detail.value["status"], "delivered");
    assert!(detail.stale);
    assert!(cache.read(&CacheKey::Transactions).unwrap().stale);
}
