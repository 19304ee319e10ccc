use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{Repository, RepositoryError};
use crate::models::{Comment, Post, Reference, Tag, User};

const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.created_by, u.username AS creator_username, p.created_at
    FROM posts p
    JOIN users u ON u.id = p.created_by
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.content, c.created_by, u.username AS creator_username, c.post_id, c.created_at
    FROM comments c
    JOIN users u ON u.id = c.created_by
"#;

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    created_by: i64,
    creator_username: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PostTagRow {
    post_id: i64,
    id: i64,
    name: String,
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    created_by: i64,
    creator_username: String,
    post_id: i64,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            content: row.content,
            created_by: User {
                id: row.created_by,
                username: row.creator_username,
            },
            post_id: row.post_id,
            created_at: row.created_at,
        }
    }
}

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Schema lives in `migrations/`; post removal relies on `ON DELETE CASCADE` for
/// comments and tag links.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attaches tags and comments to a batch of post rows with one query each.
    async fn hydrate(&self, rows: Vec<PostRow>) -> Result<Vec<Post>, RepositoryError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let tag_rows = sqlx::query_as::<_, PostTagRow>(
            r#"SELECT pt.post_id, t.id, t.name
               FROM post_tags pt
               JOIN tags t ON t.id = pt.tag_id
               WHERE pt.post_id = ANY($1)
               ORDER BY t.id"#,
        )
        .bind(ids.as_slice())
        .fetch_all(&self.pool)
        .await?;

        let comment_rows =
            sqlx::query_as::<_, CommentRow>(&format!("{COMMENT_SELECT} WHERE c.post_id = ANY($1) ORDER BY c.id"))
                .bind(ids.as_slice())
                .fetch_all(&self.pool)
                .await?;

        let mut tags: HashMap<i64, Vec<Reference<Tag>>> = HashMap::new();
        for row in tag_rows {
            tags.entry(row.post_id).or_default().push(Reference::Resolved(Tag {
                id: row.id,
                name: row.name,
            }));
        }

        let mut comments: HashMap<i64, Vec<Comment>> = HashMap::new();
        for row in comment_rows {
            comments.entry(row.post_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| Post {
                id: row.id,
                title: row.title,
                content: row.content,
                created_by: User {
                    id: row.created_by,
                    username: row.creator_username,
                },
                created_at: row.created_at,
                tags: tags.remove(&row.id).unwrap_or_default(),
                comments: comments.remove(&row.id).unwrap_or_default(),
            })
            .collect())
    }
}

fn log_failure(operation: &str, err: sqlx::Error) -> RepositoryError {
    tracing::error!("{} error: {:?}", operation, err);
    RepositoryError::Database(err)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_all_posts(&self) -> Result<Vec<Post>, RepositoryError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} ORDER BY p.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| log_failure("find_all_posts", e))?;
        self.hydrate(rows).await
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| log_failure("find_post", e))?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// save_post
    ///
    /// Single transaction: verifies every referenced tag exists, writes the post row and
    /// replaces its tag links. A dangling tag id rolls the whole write back.
    async fn save_post(&self, post: Post) -> Result<Post, RepositoryError> {
        let tag_ids = post.tag_ids();
        let mut tx = self.pool.begin().await?;

        let existing: Vec<i64> = sqlx::query_scalar("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(tag_ids.as_slice())
            .fetch_all(&mut *tx)
            .await?;
        if let Some(missing) = tag_ids.iter().find(|id| !existing.contains(*id)) {
            return Err(RepositoryError::UnknownReference {
                kind: "Tag",
                id: *missing,
            });
        }

        let id: i64 = if post.is_new() {
            sqlx::query_scalar(
                "INSERT INTO posts (title, content, created_by) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.created_by.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| log_failure("save_post", e))?
        } else {
            let updated = sqlx::query("UPDATE posts SET title = $1, content = $2 WHERE id = $3")
                .bind(&post.title)
                .bind(&post.content)
                .bind(post.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| log_failure("save_post", e))?;
            // Removed between lookup and save.
            if updated.rows_affected() == 0 {
                return Err(RepositoryError::UnknownReference {
                    kind: "Post",
                    id: post.id,
                });
            }
            post.id
        };

        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if !tag_ids.is_empty() {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) SELECT $1, UNNEST($2::BIGINT[])")
                .bind(id)
                .bind(tag_ids.as_slice())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_post(id)
            .await?
            .ok_or_else(|| RepositoryError::Unavailable(format!("post {id} vanished after save")))
    }

    async fn remove_post(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| log_failure("remove_post", e))?;
        Ok(())
    }

    async fn find_all_comments(&self) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!("{COMMENT_SELECT} ORDER BY c.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| log_failure("find_all_comments", e))?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn find_comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE c.post_id = $1 ORDER BY c.id"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| log_failure("find_comments_for_post", e))?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, RepositoryError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!("{COMMENT_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| log_failure("find_comment", e))?;
        Ok(row.map(Comment::from))
    }

    async fn add_comment(&self, comment: Comment) -> Result<Comment, RepositoryError> {
        let inserted: Result<i64, sqlx::Error> = sqlx::query_scalar(
            "INSERT INTO comments (content, created_by, post_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&comment.content)
        .bind(comment.created_by.id)
        .bind(comment.post_id)
        .fetch_one(&self.pool)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                return Err(RepositoryError::UnknownReference {
                    kind: "Post",
                    id: comment.post_id,
                });
            }
            Err(e) => return Err(log_failure("add_comment", e)),
        };

        self.find_comment(id)
            .await?
            .ok_or_else(|| RepositoryError::Unavailable(format!("comment {id} vanished after insert")))
    }

    async fn remove_comment(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| log_failure("remove_comment", e))?;
        Ok(())
    }

    async fn find_all_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| log_failure("find_all_tags", e))
    }

    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, RepositoryError> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| log_failure("find_tag", e))
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, RepositoryError> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| log_failure("find_tag_by_name", e))
    }

    async fn add_tag(&self, tag: Tag) -> Result<Tag, RepositoryError> {
        let inserted = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&tag.name)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(tag) => Ok(tag),
            // Two concurrent creates can both pass the uniqueness check; the index decides.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                RepositoryError::Duplicate(format!("Tag name is already used [{}].", tag.name)),
            ),
            Err(e) => Err(log_failure("add_tag", e)),
        }
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| log_failure("find_user", e))
    }
}
