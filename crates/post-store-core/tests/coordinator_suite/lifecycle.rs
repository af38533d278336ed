//! Full post lifecycle against the key-value backend: create, failed
//! takeover by another user, owner update with in-place image
//! replacement, delete.

use bytes::Bytes;
use post_store_core::{object_name_from_url, BackendKind, Error};
use uuid::Uuid;

use super::helpers::{build_store, caller, image};

#[tokio::test]
async fn key_value_post_lifecycle() {
    let store = build_store();
    let kind = BackendKind::Redis;

    // u1 creates a post; the coordinator generates the id since Redis
    // cannot.
    let saved = store
        .save(&caller("u1"), kind, "hello", image("IMG1"))
        .await
        .unwrap();
    assert!(Uuid::parse_str(&saved.id).is_ok());
    assert_eq!(saved.user_id, "u1");
    assert_eq!(saved.text, "hello");

    let object_name = object_name_from_url(&saved.image_url).to_string();
    assert_eq!(
        store.blob().retrieve(&object_name).await.unwrap(),
        Bytes::from("IMG1")
    );

    // u2 cannot take the post over.
    let err = store
        .update(&caller("u2"), kind, &saved.id, "stolen", image("EVIL"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AccessDenied(_)));
    assert_eq!(store.get_by_id(kind, &saved.id).await.unwrap(), saved);

    // u1 updates; the image object is replaced in place under the same
    // name.
    let updated = store
        .update(&caller("u1"), kind, &saved.id, "bye", image("IMG2"))
        .await
        .unwrap();
    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.user_id, "u1");
    assert_eq!(updated.text, "bye");
    assert_eq!(object_name_from_url(&updated.image_url), object_name);
    assert_eq!(
        store.blob().retrieve(&object_name).await.unwrap(),
        Bytes::from("IMG2")
    );

    // u1 deletes; record and object are both gone.
    store.delete(&caller("u1"), kind, &saved.id).await.unwrap();
    assert!(matches!(
        store.get_by_id(kind, &saved.id).await.unwrap_err(),
        Error::NotFound { .. }
    ));
    assert!(store.blob().retrieve(&object_name).await.is_err());
}
