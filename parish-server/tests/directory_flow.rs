//! Directory store against a real JSON file

use std::sync::Arc;

use chrono::NaiveDate;
use parish_server::birthdays::upcoming;
use parish_server::directory::DirectoryStore;
use parish_server::photos::{LocalPhotoStore, PhotoStore};
use shared::models::{Member, MemberCreate, MemberUpdate};

fn candidate(name: &str, phone: &str, birthday: &str) -> MemberCreate {
    MemberCreate {
        name: name.to_string(),
        phone: phone.to_string(),
        birthday: birthday.to_string(),
        ..Default::default()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_add_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.json");

    let mut c = candidate("John Okafor", "08012345678", "1990-06-01");
    c.email = Some("john@example.com".to_string());
    let added = DirectoryStore::open_json(&path).add(c).unwrap();

    let reopened = DirectoryStore::open_json(&path);
    let loaded = reopened.load().unwrap();
    assert_eq!(loaded, vec![added]);
    assert_eq!(loaded[0].birthday, "01-06-1990");
    assert_eq!(loaded[0].email.as_deref(), Some("john@example.com"));
    assert!(loaded[0].joined.is_some());
    assert_ne!(loaded[0].id, 0);
}

#[test]
fn test_document_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.json");
    DirectoryStore::open_json(&path)
        .add(candidate("Ada", "1", "01-01-2000"))
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[\n    {"));
    assert!(!text.contains("null"));

    let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(raw[0]["email"], "");
    assert_eq!(raw[0]["photo"], "");
    assert_eq!(raw[0]["birthday"], "01-01-2000");

    // No temp files left beside the document
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_missing_file_is_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let store = DirectoryStore::open_json(&path);
    assert!(store.load().unwrap().is_empty());
    assert!(!path.exists());
}

#[test]
fn test_invalid_add_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.json");
    let store = DirectoryStore::open_json(&path);
    store.add(candidate("Ada", "1", "01-01-2000")).unwrap();
    let before = std::fs::read(&path).unwrap();

    let err = store
        .add(candidate("", "08012345678", "01-01-2000"))
        .unwrap_err();
    assert_eq!(err.fields(), ["name"]);
    let err = store.add(candidate("A", "1", "30-02-2000")).unwrap_err();
    assert_eq!(err.fields(), ["birthday"]);

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_search_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirectoryStore::open_json(dir.path().join("members.json"));
    store.add(candidate("John Okafor", "0801", "01-01-1980")).unwrap();
    store.add(candidate("Mary Johnson", "0802", "01-01-1981")).unwrap();
    store.add(candidate("Peter Obi", "0803", "01-01-1982")).unwrap();

    assert_eq!(store.search("jo", 3).unwrap().len(), 3);

    let hits = store.search("JOH", 3).unwrap();
    let mut names: Vec<_> = hits.iter().map(|m| m.name.as_str()).collect();
    names.sort();
    assert_eq!(names, ["John Okafor", "Mary Johnson"]);

    let by_phone = store.search("0803", 3).unwrap();
    assert_eq!(by_phone.len(), 1);
    assert_eq!(by_phone[0].name, "Peter Obi");
}

#[test]
fn test_delete_then_update_or_delete_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirectoryStore::open_json(dir.path().join("members.json"));
    let m = store.add(candidate("Ada", "1", "01-01-2000")).unwrap();

    store.delete(m.id).unwrap();
    assert!(
        store
            .update(m.id, MemberUpdate::default())
            .unwrap_err()
            .is_not_found()
    );
    assert!(store.delete(m.id).unwrap_err().is_not_found());
}

#[test]
fn test_update_ignores_foreign_id_and_joined() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirectoryStore::open_json(dir.path().join("members.json"));
    let m = store.add(candidate("Ada", "1", "01-06-1990")).unwrap();

    let patch: MemberUpdate = serde_json::from_value(serde_json::json!({
        "id": 42,
        "name": "Ada Lovelace",
        "birthday": "01-06-1990",
        "joined": "1999-01-01 00:00"
    }))
    .unwrap();

    let updated = store.update(m.id, patch).unwrap();
    assert_eq!(updated.id, m.id);
    assert_eq!(updated.joined, m.joined);
    assert_eq!(updated.name, "Ada Lovelace");
    assert_eq!(updated.birthday, "01-06-1990");
}

#[test]
fn test_legacy_document_gets_ids_written_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.json");
    std::fs::write(
        &path,
        r#"[
    {"name": "Old Timer", "phone": "0800", "email": "", "address": "", "birthday": "05-01-1980", "photo": "", "joined": "2019-03-04 09:15"},
    {"name": "No Joined", "phone": "0801", "birthday": "06-01-1981"}
]"#,
    )
    .unwrap();

    let store = DirectoryStore::open_json(&path);
    let first = store.load().unwrap();
    assert!(first.iter().all(|m| m.id != 0));
    assert_eq!(first[1].joined, None);

    let on_disk: Vec<Member> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, first);
    assert_eq!(store.load().unwrap(), first);
}

#[test]
fn test_legacy_photo_is_available_and_reclaimed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("members.json");
    std::fs::create_dir_all(dir.path().join("photos")).unwrap();
    std::fs::write(dir.path().join("photos").join("face.jpg"), b"jpeg bytes").unwrap();
    std::fs::write(
        &path,
        r#"[
    {"name": "Old Timer", "phone": "0800", "birthday": "05-01-1980", "photo": "photos/face.jpg"}
]"#,
    )
    .unwrap();

    let store = DirectoryStore::open_json(&path);
    let photos = LocalPhotoStore::new(dir.path().join("photos"));
    let loaded = store.load().unwrap();
    assert_eq!(loaded[0].photo.as_deref(), Some("face.jpg"));
    assert!(photos.exists("face.jpg"));
    assert!(photos.exists("photos/face.jpg"));
    assert_eq!(
        photos.read("face.jpg").unwrap().as_deref(),
        Some(&b"jpeg bytes"[..])
    );

    let deleted = store.delete(loaded[0].id).unwrap();
    let orphan = deleted.orphaned_photo.unwrap();
    photos.delete(&orphan).unwrap();
    assert!(!dir.path().join("photos").join("face.jpg").exists());
}

#[test]
fn test_concurrent_adds_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DirectoryStore::open_json(dir.path().join("members.json")));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..5 {
                    store
                        .add(candidate(&format!("Member {t}-{i}"), "1", "01-01-2000"))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.count().unwrap(), 40);
}

#[test]
fn test_upcoming_birthdays_from_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirectoryStore::open_json(dir.path().join("members.json"));
    store.add(candidate("Today", "1", "01-06-1990")).unwrap();
    store.add(candidate("Fortnight", "2", "15-06-1995")).unwrap();
    store.add(candidate("July", "3", "01-07-1990")).unwrap();

    let members = store.load().unwrap();
    let today = date(2024, 6, 1);

    let within_30: Vec<(String, i64)> = upcoming(&members, today, 30)
        .iter()
        .map(|b| (b.member.name.clone(), b.days_until))
        .collect();
    assert_eq!(
        within_30,
        vec![("Today".to_string(), 0), ("Fortnight".to_string(), 14)]
    );

    let within_31 = upcoming(&members, today, 31);
    assert_eq!(within_31.len(), 3);
    assert_eq!(within_31[2].member.name, "July");
    assert_eq!(within_31[2].days_until, 30);

    store.add(candidate("Rollover", "4", "05-01-1980")).unwrap();
    let members = store.load().unwrap();
    let next = upcoming(&members, date(2024, 12, 20), 30);
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].days_until, 16);
    assert_eq!(next[0].date, date(2025, 1, 5));
    assert_eq!(next[0].turning, 45);
}
