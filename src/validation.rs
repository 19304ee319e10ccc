use serde::{Deserialize, Serialize};

use crate::{
    models::{Comment, Post, Tag},
    repository::{RepositoryError, RepositoryState},
};

pub const NOT_BLANK: &str = "This value should not be blank.";
pub const ALREADY_USED: &str = "This value is already used.";

/// Violation
///
/// A single failed rule, tied to the input field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub property_path: String,
    pub message: String,
}

impl Violation {
    pub fn new(property_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_path: property_path.into(),
            message: message.into(),
        }
    }

    /// `"{message} [{property_path}]"`, the shape both projections are built from.
    pub fn render(&self) -> String {
        format!("{} [{}]", self.message, self.property_path)
    }
}

/// ViolationFormat
///
/// Which projection of a violation list a 400 response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViolationFormat {
    /// One string per violation.
    #[default]
    Detailed,
    /// All violations joined into one newline-separated string.
    Brief,
}

/// ViolationList
///
/// Ordered result of a validation pass. Empty means valid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViolationList(Vec<Violation>);

impl ViolationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn detailed(&self) -> Vec<String> {
        self.0.iter().map(Violation::render).collect()
    }

    pub fn brief(&self) -> String {
        self.detailed().join("\n")
    }
}

impl From<Vec<Violation>> for ViolationList {
    fn from(value: Vec<Violation>) -> Self {
        Self(value)
    }
}

/// Empty only; whitespace counts as content.
fn require_not_blank(violations: &mut ViolationList, path: &str, value: &str) {
    if value.is_empty() {
        violations.add(Violation::new(path, NOT_BLANK));
    }
}

/// ValidationGate
///
/// Runs the per-entity rules. Field rules are checked in process; tag name uniqueness
/// needs an existence check against the repository.
#[derive(Clone)]
pub struct ValidationGate {
    repo: RepositoryState,
}

impl ValidationGate {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub fn validate_post(&self, post: &Post) -> ViolationList {
        let mut violations = ViolationList::new();
        require_not_blank(&mut violations, "title", &post.title);
        require_not_blank(&mut violations, "content", &post.content);
        violations
    }

    pub fn validate_comment(&self, comment: &Comment) -> ViolationList {
        let mut violations = ViolationList::new();
        require_not_blank(&mut violations, "content", &comment.content);
        violations
    }

    pub async fn validate_tag(&self, tag: &Tag) -> Result<ViolationList, RepositoryError> {
        let mut violations = ViolationList::new();
        require_not_blank(&mut violations, "name", &tag.name);

        if violations.is_empty() {
            if let Some(existing) = self.repo.find_tag_by_name(&tag.name).await? {
                if existing.id != tag.id {
                    violations.add(Violation::new("name", ALREADY_USED));
                }
            }
        }

        Ok(violations)
    }
}
