use serde_json::json;
use whiteboard::{
    classify, pack, unpack, AuthorizationPolicy, ElementRecord, ElementStore, FileCategory,
    Role, RoleGatedPolicy,
};

#[test]
fn it_keeps_board_state_consistent_through_an_edit_session() {
    let mut store = ElementStore::new();
    let policy = RoleGatedPolicy;

    // Teacher draws an image, a student moves it via the override flag.
    let image = ElementRecord::new("img-1", "image")
        .with_attr("src", json!("data:image/png;base64,..."))
        .with_attr("allowStudentEdit", json!(true));
    assert!(policy.can_edit(Role::Teacher, &image));
    store.upsert(image);

    let moved = ElementRecord::new("img-1", "image")
        .with_attr("allowStudentEdit", json!(true))
        .with_attr("x", json!(42));
    assert!(policy.can_edit(Role::Student, &moved));
    store.upsert(moved);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].attrs["src"], json!("data:image/png;base64,..."));
    assert_eq!(snapshot[0].attrs["x"], json!(42));
    // dimensions were defaulted on first insert and survive the merge
    assert_eq!(snapshot[0].attrs["width"], json!(200));

    // Only the teacher may wipe the board.
    assert!(!policy.can_clear(Role::Student));
    assert!(policy.can_clear(Role::Teacher));
    store.clear();
    assert!(store.is_empty());
}

#[test]
fn it_compresses_only_non_text_file_payloads() {
    assert_eq!(classify("image/png", "photo.png"), FileCategory::Media);
    assert_eq!(classify("text/html", "page.html"), FileCategory::TextOrUrl);

    let payload = json!({
        "fileName": "photo.png",
        "fileType": "image/png",
        "fileData": "aGVsbG8="
    });
    let packed = pack(&payload).expect("pack");
    let restored: serde_json::Value = unpack(&packed).expect("unpack");
    assert_eq!(restored, payload);
}
