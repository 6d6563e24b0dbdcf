use super::*;

fn ann() -> SessionUser {
    SessionUser {
        uid: "u1".into(),
        email: Some("a@b.com".into()),
        display_name: Some("Ann".into()),
        photo_url: None,
    }
}

// =============================================================================
// greeting_name
// =============================================================================

#[test]
fn greeting_name_uses_display_name() {
    assert_eq!(ann().greeting_name(), "Ann");
}

#[test]
fn greeting_name_falls_back_when_absent() {
    let user = SessionUser { display_name: None, ..ann() };
    assert_eq!(user.greeting_name(), "there");
}

#[test]
fn greeting_name_falls_back_when_blank() {
    let user = SessionUser { display_name: Some("   ".into()), ..ann() };
    assert_eq!(user.greeting_name(), "there");
}

#[test]
fn greeting_name_trims_whitespace() {
    let user = SessionUser { display_name: Some("  Ann  ".into()), ..ann() };
    assert_eq!(user.greeting_name(), "Ann");
}

// =============================================================================
// serde
// =============================================================================

#[test]
fn session_user_serialize_round_trip() {
    let json = serde_json::to_string(&ann()).unwrap();
    let restored: SessionUser = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, ann());
}

#[test]
fn session_user_serialize_none_fields() {
    let user = SessionUser { email: None, display_name: None, photo_url: None, ..ann() };
    let json = serde_json::to_string(&user).unwrap();
    let restored: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(restored["uid"], "u1");
    assert!(restored["email"].is_null());
    assert!(restored["photo_url"].is_null());
}
