use super::polling::classify_message;
use super::types::{TgMessage, TgResponse, TgUpdate};
use streak_core::message::{ChatEvent, ServiceKind};

fn parse(json: serde_json::Value) -> TgMessage {
    serde_json::from_value(json).unwrap()
}

fn group_msg(extra: serde_json::Value) -> TgMessage {
    let mut base = serde_json::json!({
        "message_id": 10,
        "date": 1_704_153_600,
        "chat": { "id": -100123, "type": "supergroup", "title": "Night Owls 3🔥" },
        "from": { "id": 42, "is_bot": false, "first_name": "Ann", "username": "ann" },
    });
    if let (Some(obj), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    parse(base)
}

#[test]
fn test_text_message_is_regular_event() {
    let event = classify_message(group_msg(serde_json::json!({ "text": "hello" }))).unwrap();
    match event {
        ChatEvent::Message(m) => {
            assert_eq!(m.chat_id, -100123);
            assert_eq!(m.message_id, 10);
            assert_eq!(m.sender_id, Some(42));
            assert_eq!(m.sender_name.as_deref(), Some("@ann"));
            assert_eq!(m.text.as_deref(), Some("hello"));
            assert!(!m.anonymous_admin);
            assert_eq!(m.timestamp.timestamp(), 1_704_153_600);
        }
        other => panic!("expected message, got {other:?}"),
    }
}

#[test]
fn test_sticker_without_text_still_counts() {
    let event = classify_message(group_msg(serde_json::json!({ "sticker": { "file_id": "x" } })));
    assert!(matches!(event, Some(ChatEvent::Message(ref m)) if m.text.is_none()));
}

#[test]
fn test_caption_used_as_text() {
    let event = classify_message(group_msg(serde_json::json!({ "caption": "look" }))).unwrap();
    assert!(matches!(event, ChatEvent::Message(ref m) if m.text.as_deref() == Some("look")));
}

#[test]
fn test_private_chat_ignored() {
    let msg = parse(serde_json::json!({
        "message_id": 1,
        "chat": { "id": 42, "type": "private" },
        "from": { "id": 42, "first_name": "Ann" },
        "text": "hi",
    }));
    assert!(classify_message(msg).is_none());
}

#[test]
fn test_service_kinds() {
    let cases = [
        (
            serde_json::json!({ "new_chat_title": "Renamed" }),
            ServiceKind::NewTitle("Renamed".into()),
        ),
        (
            serde_json::json!({ "new_chat_photo": [] }),
            ServiceKind::NewPhoto,
        ),
        (
            serde_json::json!({ "delete_chat_photo": true }),
            ServiceKind::DeletePhoto,
        ),
        (
            serde_json::json!({ "left_chat_member": { "id": 7, "first_name": "Bo" } }),
            ServiceKind::MemberLeft,
        ),
        (
            serde_json::json!({ "new_chat_members": [{ "id": 7, "first_name": "Bo" }] }),
            ServiceKind::MembersJoined,
        ),
        (
            serde_json::json!({ "pinned_message": { "message_id": 3 } }),
            ServiceKind::Pinned,
        ),
        (
            serde_json::json!({ "group_chat_created": true }),
            ServiceKind::ChatCreated,
        ),
    ];
    for (extra, expected) in cases {
        match classify_message(group_msg(extra)) {
            Some(ChatEvent::Service(s)) => {
                assert_eq!(s.kind, expected);
                assert_eq!(s.chat_id, -100123);
                assert_eq!(s.message_id, 10);
            }
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_other_bot_messages_ignored() {
    let msg = group_msg(serde_json::json!({
        "from": { "id": 99, "is_bot": true, "first_name": "Other" },
        "text": "beep",
    }));
    assert!(classify_message(msg).is_none());
}

#[test]
fn test_anonymous_admin_detected() {
    let msg = group_msg(serde_json::json!({
        "from": { "id": 1087968824, "is_bot": true, "first_name": "Group" },
        "sender_chat": { "id": -100123, "type": "supergroup" },
        "text": "/reset",
    }));
    match classify_message(msg) {
        Some(ChatEvent::Message(m)) => {
            assert!(m.anonymous_admin);
            assert!(m.sender_id.is_none());
        }
        other => panic!("expected message, got {other:?}"),
    }
}

#[test]
fn test_update_envelope_parses() {
    let raw = r#"{"ok":true,"result":[{"update_id":5,"message":{"message_id":1,"chat":{"id":-1,"type":"group"},"text":"x"}},{"update_id":6}]}"#;
    let resp: TgResponse<Vec<TgUpdate>> = serde_json::from_str(raw).unwrap();
    assert!(resp.ok);
    let updates = resp.result.unwrap();
    assert_eq!(updates.len(), 2);
    assert!(updates[1].message.is_none());
}

#[test]
fn test_error_envelope_with_retry_after() {
    let raw = r#"{"ok":false,"description":"Too Many Requests","parameters":{"retry_after":12}}"#;
    let resp: TgResponse<bool> = serde_json::from_str(raw).unwrap();
    assert!(!resp.ok);
    assert_eq!(resp.parameters.unwrap().retry_after, Some(12));
}
