use crate::{
    auth::Auth,
    error::ApiError,
    extract::{NumericId, RawInput},
    response::{Envelope, ResponseBuilder},
    services::{CommentService, PostService, TagService},
    validation::ViolationFormat,
    views::{
        self, CommentCreateView, CommentListView, CommentShowView, PostCreateView, PostListView,
        PostShowView, TagView,
    },
};
use axum::extract::State;

/// Finishes a pipeline: success goes through `ok`, failure through the error envelope.
fn respond<T>(
    result: Result<T, ApiError>,
    format: ViolationFormat,
    ok: impl FnOnce(T) -> Envelope,
) -> Envelope {
    match result {
        Ok(value) => ok(value),
        Err(err) => err.into_envelope(format),
    }
}

// --- Posts ---

/// list_posts
///
/// [Public Route] All posts under the `post_list` field-group.
#[utoipa::path(
    get,
    path = "/post",
    tag = "Post",
    responses((status = 200, description = "List posts", body = [PostListView]))
)]
pub async fn list_posts(
    State(posts): State<PostService>,
    State(format): State<ViolationFormat>,
) -> Envelope {
    respond(posts.get_all().await, format, |entities| {
        ResponseBuilder::success(views::project::<_, PostListView>(&entities))
    })
}

/// show_post
///
/// [Public Route] One post under the `post_show` field-group, comments included.
#[utoipa::path(
    get,
    path = "/post/{id}",
    tag = "Post",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Show post", body = PostShowView),
        (status = 404, description = "Post not found")
    )
)]
pub async fn show_post(
    State(posts): State<PostService>,
    State(format): State<ViolationFormat>,
    NumericId(id): NumericId,
) -> Envelope {
    respond(posts.get_by_id(id).await, format, |post| {
        ResponseBuilder::success(PostShowView::from(&post))
    })
}

/// create_post
///
/// [Authenticated Route] Creates a post owned by the caller. Body: `title`, `content`,
/// `tags: [{"id": N}]`. Tag ids are checked when the post is stored, not while binding.
#[utoipa::path(
    post,
    path = "/post",
    tag = "Post",
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Create post", body = PostCreateView),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn create_post(
    auth: Auth,
    State(posts): State<PostService>,
    State(format): State<ViolationFormat>,
    RawInput(raw): RawInput,
) -> Envelope {
    respond(posts.create(raw.as_ref(), &auth).await, format, |post| {
        ResponseBuilder::created(PostCreateView::from(&post))
    })
}

/// update_post
///
/// [Authenticated Route] Partial update by the post's creator. Answers with the
/// `post_create` field-group.
#[utoipa::path(
    patch,
    path = "/post/{id}",
    tag = "Post",
    params(("id" = i64, Path, description = "Post id")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Update post", body = PostCreateView),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Not logged in or not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    auth: Auth,
    State(posts): State<PostService>,
    State(format): State<ViolationFormat>,
    NumericId(id): NumericId,
    RawInput(raw): RawInput,
) -> Envelope {
    respond(posts.update(raw.as_ref(), id, &auth).await, format, |post| {
        ResponseBuilder::success(PostCreateView::from(&post))
    })
}

/// delete_post
///
/// [Authenticated Route] Removes a post and its comments. Creator only.
#[utoipa::path(
    delete,
    path = "/post/{id}",
    tag = "Post",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 204, description = "Delete post"),
        (status = 401, description = "Not logged in or not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    auth: Auth,
    State(posts): State<PostService>,
    State(format): State<ViolationFormat>,
    NumericId(id): NumericId,
) -> Envelope {
    respond(posts.delete(id, &auth).await, format, |()| {
        ResponseBuilder::success_empty()
    })
}

// --- Comments ---

/// list_comments
///
/// [Public Route] Every comment, `comment_list` field-group.
#[utoipa::path(
    get,
    path = "/comment",
    tag = "Comment",
    responses((status = 200, description = "List comments", body = [CommentListView]))
)]
pub async fn list_comments(
    State(comments): State<CommentService>,
    State(format): State<ViolationFormat>,
) -> Envelope {
    respond(comments.get_all().await, format, |entities| {
        ResponseBuilder::success(views::project::<_, CommentListView>(&entities))
    })
}

/// list_comments_for_post
///
/// [Public Route] Comments of one post. 404 when the post does not exist.
#[utoipa::path(
    get,
    path = "/post/{post_id}/comment",
    tag = "Comment",
    params(("post_id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "List comments for post", body = [CommentListView]),
        (status = 404, description = "Post not found")
    )
)]
pub async fn list_comments_for_post(
    State(comments): State<CommentService>,
    State(format): State<ViolationFormat>,
    NumericId(post_id): NumericId,
) -> Envelope {
    respond(comments.get_for_post(post_id).await, format, |entities| {
        ResponseBuilder::success(views::project::<_, CommentListView>(&entities))
    })
}

/// show_comment
#[utoipa::path(
    get,
    path = "/comment/{id}",
    tag = "Comment",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Show comment", body = CommentShowView),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn show_comment(
    State(comments): State<CommentService>,
    State(format): State<ViolationFormat>,
    NumericId(id): NumericId,
) -> Envelope {
    respond(comments.get_by_id(id).await, format, |comment| {
        ResponseBuilder::success(CommentShowView::from(&comment))
    })
}

/// create_comment_for_post
///
/// [Authenticated Route] Adds a comment by the caller to an existing post. Body: `content`.
#[utoipa::path(
    post,
    path = "/post/{post_id}/comment",
    tag = "Comment",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Create comment for post", body = CommentCreateView),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn create_comment_for_post(
    auth: Auth,
    State(comments): State<CommentService>,
    State(format): State<ViolationFormat>,
    NumericId(post_id): NumericId,
    RawInput(raw): RawInput,
) -> Envelope {
    respond(comments.create(raw.as_ref(), post_id, &auth).await, format, |comment| {
        ResponseBuilder::created(CommentCreateView::from(&comment))
    })
}

/// delete_comment
///
/// [Authenticated Route] Removes a comment. Creator only.
#[utoipa::path(
    delete,
    path = "/comment/{id}",
    tag = "Comment",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Delete comment"),
        (status = 401, description = "Not logged in or not the author"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    auth: Auth,
    State(comments): State<CommentService>,
    State(format): State<ViolationFormat>,
    NumericId(id): NumericId,
) -> Envelope {
    respond(comments.delete(id, &auth).await, format, |()| {
        ResponseBuilder::success_empty()
    })
}

// --- Tags ---

#[utoipa::path(
    get,
    path = "/tag",
    tag = "Tag",
    responses((status = 200, description = "List tags", body = [TagView]))
)]
pub async fn list_tags(
    State(tags): State<TagService>,
    State(format): State<ViolationFormat>,
) -> Envelope {
    respond(tags.get_all().await, format, |entities| {
        ResponseBuilder::success(views::project::<_, TagView>(&entities))
    })
}

#[utoipa::path(
    get,
    path = "/tag/{id}",
    tag = "Tag",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Show tag", body = TagView),
        (status = 404, description = "Tag not found")
    )
)]
pub async fn show_tag(
    State(tags): State<TagService>,
    State(format): State<ViolationFormat>,
    NumericId(id): NumericId,
) -> Envelope {
    respond(tags.get_by_id(id).await, format, |tag| {
        ResponseBuilder::success(TagView::from(&tag))
    })
}

/// create_tag
///
/// [Public Route] Tags have no owner, so no principal is required. Body: `name`, which must
/// be unique.
#[utoipa::path(
    post,
    path = "/tag",
    tag = "Tag",
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Create tag", body = TagView),
        (status = 400, description = "Invalid input data")
    )
)]
pub async fn create_tag(
    State(tags): State<TagService>,
    State(format): State<ViolationFormat>,
    RawInput(raw): RawInput,
) -> Envelope {
    respond(tags.create(raw.as_ref()).await, format, |tag| {
        ResponseBuilder::created(TagView::from(&tag))
    })
}
