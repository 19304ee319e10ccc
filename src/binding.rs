//! Maps raw request input onto entities.
//!
//! Each bindable entity declares an input struct holding only the fields of its
//! create field-group. Keys outside the group (`id`, `createdBy`, ...) are dropped by
//! serde, keys missing from the input leave the target untouched. That single rule gives
//! both the create path (bind into a default entity) and the partial update path (bind
//! into the loaded entity).

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::models::{Comment, Post, Reference, Tag};

/// Raised when the input shape cannot be mapped onto the target at all.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("request body is not valid JSON")]
    Malformed,
    #[error("input must be a key-value object")]
    NotAnObject,
    #[error("cannot bind input: {0}")]
    Shape(#[from] serde_json::Error),
}

/// An entity that accepts a field-group input.
pub trait Bindable: Sized {
    type Input: DeserializeOwned;

    fn apply(&mut self, input: Self::Input);
}

/// Binds `raw` onto `target`. `raw` must be a JSON object.
pub fn bind<T: Bindable>(raw: &Value, mut target: T) -> Result<T, BindError> {
    if !raw.is_object() {
        return Err(BindError::NotAnObject);
    }
    let input = T::Input::deserialize(raw)?;
    target.apply(input);
    Ok(target)
}

// --- Field-group inputs ---

/// post_create: title, content, tags.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostInput {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub content: Option<String>,
    pub tags: Option<Vec<ReferenceInput>>,
}

impl Bindable for Post {
    type Input = PostInput;

    fn apply(&mut self, input: PostInput) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(content) = input.content {
            self.content = content;
        }
        if let Some(tags) = input.tags {
            let mut references: Vec<Reference<Tag>> = Vec::with_capacity(tags.len());
            for ReferenceInput { id } in tags {
                if !references.iter().any(|r| r.id() == id) {
                    references.push(Reference::Id(id));
                }
            }
            self.tags = references;
        }
    }
}

/// comment_create: content.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentInput {
    #[serde(deserialize_with = "lenient_string")]
    pub content: Option<String>,
}

impl Bindable for Comment {
    type Input = CommentInput;

    fn apply(&mut self, input: CommentInput) {
        if let Some(content) = input.content {
            self.content = content;
        }
    }
}

/// tag_create: name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagInput {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

impl Bindable for Tag {
    type Input = TagInput;

    fn apply(&mut self, input: TagInput) {
        if let Some(name) = input.name {
            self.name = name;
        }
    }
}

/// `{"id": N}`: a reference by identifier. Nothing is looked up here.
#[derive(Debug, Deserialize)]
pub struct ReferenceInput {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
}

// --- Lenient scalars ---

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null(()),
}

/// Accepts strings, numbers and booleans as text. `null` binds as an empty string so the
/// field is still overwritten and left for validation to reject.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Null(()) => String::new(),
    };
    Ok(Some(text))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Integer(i64),
    Text(String),
}

fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawId::deserialize(deserializer)? {
        RawId::Integer(id) => Ok(id),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid reference id `{s}`"))),
    }
}
