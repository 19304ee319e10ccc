use axum::{http::StatusCode, response::IntoResponse};
use blog_api::{
    binding::{BindError, bind},
    error::ApiError,
    models::{Comment, Post, Reference, Tag, User},
    repository::{InMemoryRepository, RepositoryError, RepositoryState},
    response::{Message, ResponseBuilder},
    validation::{ALREADY_USED, NOT_BLANK, ValidationGate, Violation, ViolationFormat, ViolationList},
    views::{PostListView, TagView, project},
};
use serde_json::json;
use std::{collections::HashMap, sync::Arc};

fn stored_post() -> Post {
    Post {
        id: 10,
        title: "Hello".to_string(),
        content: "Hello world".to_string(),
        created_by: User {
            id: 1,
            username: "alexbobson".to_string(),
        },
        tags: vec![Reference::Resolved(Tag {
            id: 101,
            name: "goodToKnow".to_string(),
        })],
        ..Default::default()
    }
}

fn gate() -> ValidationGate {
    let repo: RepositoryState = Arc::new(InMemoryRepository::with_fixtures());
    ValidationGate::new(repo)
}

// --- Binding ---

#[test]
fn test_bind_partial_update_keeps_absent_fields() {
    let post = bind(&json!({"title": "New title"}), stored_post()).unwrap();

    assert_eq!(post.title, "New title");
    assert_eq!(post.content, "Hello world");
    assert_eq!(post.tag_ids(), vec![101]);
}

#[test]
fn test_bind_ignores_keys_outside_field_group() {
    let post = bind(
        &json!({"id": 99, "createdBy": {"id": 3}, "createdAt": "2020-01-01", "comments": []}),
        stored_post(),
    )
    .unwrap();

    assert_eq!(post, stored_post());
}

#[test]
fn test_bind_tag_references_are_deferred_and_deduplicated() {
    let post = bind(
        &json!({"tags": [{"id": 102}, {"id": "999"}, {"id": 102}]}),
        stored_post(),
    )
    .unwrap();

    // Unknown ids are accepted here; the repository reports them on save.
    assert_eq!(post.tags, vec![Reference::Id(102), Reference::Id(999)]);
}

#[test]
fn test_bind_empty_tag_list_clears_tags() {
    let post = bind(&json!({"tags": []}), stored_post()).unwrap();

    assert!(post.tags.is_empty());
}

#[test]
fn test_bind_null_becomes_blank_string() {
    let comment = bind(&json!({"content": null}), Comment {
        content: "before".to_string(),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(comment.content, "");
}

#[test]
fn test_bind_scalars_are_coerced_to_text() {
    let tag = bind(&json!({"name": 2024}), Tag::default()).unwrap();

    assert_eq!(tag.name, "2024");
}

#[test]
fn test_bind_rejects_non_object_input() {
    let result = bind(&json!(["Hello", "world"]), Post::default());

    assert!(matches!(result, Err(BindError::NotAnObject)));
}

#[test]
fn test_bind_rejects_malformed_reference() {
    let result = bind(&json!({"tags": [{"name": "rust"}]}), Post::default());

    assert!(matches!(result, Err(BindError::Shape(_))));
}

// --- Validation ---

#[test]
fn test_post_blank_fields_are_reported_in_order() {
    let violations = gate().validate_post(&Post::default());

    assert_eq!(
        violations.detailed(),
        vec![
            format!("{NOT_BLANK} [title]"),
            format!("{NOT_BLANK} [content]")
        ]
    );
}

#[test]
fn test_valid_comment_has_no_violations() {
    let violations = gate().validate_comment(&Comment {
        content: "ok".to_string(),
        ..Default::default()
    });

    assert!(violations.is_empty());
}

#[tokio::test]
async fn test_tag_name_must_be_unique() {
    let violations = gate()
        .validate_tag(&Tag {
            id: 0,
            name: "rust".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(violations.detailed(), vec![format!("{ALREADY_USED} [name]")]);
}

#[tokio::test]
async fn test_existing_tag_does_not_collide_with_itself() {
    let violations = gate()
        .validate_tag(&Tag {
            id: 102,
            name: "rust".to_string(),
        })
        .await
        .unwrap();

    assert!(violations.is_empty());
}

#[tokio::test]
async fn test_blank_tag_name_skips_uniqueness_lookup() {
    let violations = gate().validate_tag(&Tag::default()).await.unwrap();

    assert_eq!(violations.detailed(), vec![format!("{NOT_BLANK} [name]")]);
}

#[tokio::test]
async fn test_whitespace_only_values_are_not_blank() {
    let gate = gate();

    let tag_violations = gate
        .validate_tag(&Tag {
            id: 0,
            name: "   ".to_string(),
        })
        .await
        .unwrap();
    let post_violations = gate.validate_post(&Post {
        title: " ".to_string(),
        content: "\n".to_string(),
        ..Default::default()
    });

    assert!(tag_violations.is_empty());
    assert!(post_violations.is_empty());
}

#[test]
fn test_violation_projections() {
    let violations = ViolationList::from(vec![
        Violation::new("title", NOT_BLANK),
        Violation::new("content", NOT_BLANK),
    ]);

    assert_eq!(
        violations.brief(),
        "This value should not be blank. [title]\nThis value should not be blank. [content]"
    );
    assert_eq!(violations.detailed().len(), 2);
}

// --- Envelopes ---

#[test]
fn test_success_envelope_shape() {
    let envelope = ResponseBuilder::success(json!({"id": 1}));

    assert_eq!(envelope.status, StatusCode::OK);
    assert_eq!(envelope.body, Some(json!({"status": true, "data": {"id": 1}})));
}

#[test]
fn test_unserializable_data_is_internal_error() {
    // JSON object keys must be strings.
    let data: HashMap<(i64, i64), &str> = HashMap::from([((1, 2), "pair")]);

    let envelope = ResponseBuilder::success(data);

    assert_eq!(envelope.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        envelope.body,
        Some(json!({"status": false, "message": "Internal server error."}))
    );
}

#[test]
fn test_created_and_empty_envelopes() {
    assert_eq!(ResponseBuilder::created(json!([])).status, StatusCode::CREATED);

    let empty = ResponseBuilder::success_empty();
    assert_eq!(empty.status, StatusCode::NO_CONTENT);
    assert!(empty.body.is_none());
}

#[test]
fn test_bad_envelope_accepts_list_or_text() {
    let list = ResponseBuilder::bad(Message::from(vec!["a".to_string(), "b".to_string()]));
    assert_eq!(list.body, Some(json!({"status": false, "message": ["a", "b"]})));

    let text = ResponseBuilder::bad("Can not create a tag.");
    assert_eq!(
        text.body,
        Some(json!({"status": false, "message": "Can not create a tag."}))
    );
}

#[test]
fn test_auth_failures_are_indistinguishable() {
    let authentication = ApiError::Authentication.into_envelope(ViolationFormat::Detailed);
    let authorization = ApiError::Authorization.into_envelope(ViolationFormat::Detailed);

    assert_eq!(authentication, authorization);
    assert_eq!(authentication.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        authentication.body,
        Some(json!({"status": false, "message": null}))
    );
}

#[test]
fn test_not_found_message_format() {
    let envelope = ApiError::not_found("Post", 13).into_envelope(ViolationFormat::Brief);

    assert_eq!(envelope.status, StatusCode::NOT_FOUND);
    assert_eq!(
        envelope.body,
        Some(json!({"status": false, "message": "Post is not found [13]."}))
    );
}

#[test]
fn test_infrastructure_failure_is_opaque() {
    let response =
        ApiError::from(RepositoryError::Unavailable("pool exhausted".to_string())).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// --- Views ---

#[test]
fn test_post_list_view_serializes_camel_case() {
    let views: Vec<PostListView> = project(&[stored_post()]);

    assert_eq!(
        serde_json::to_value(&views).unwrap(),
        json!([{
            "id": 10,
            "title": "Hello",
            "createdBy": {"id": 1, "username": "alexbobson"},
            "tags": [{"id": 101, "name": "goodToKnow"}]
        }])
    );
}

#[test]
fn test_tag_view_from_unresolved_reference_keeps_id() {
    let view = TagView::from(&Reference::<Tag>::Id(7));

    assert_eq!(view.id, 7);
}
