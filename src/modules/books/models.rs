use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Allowed title length, in characters.
pub const TITLE_LENGTH: RangeInclusive<usize> = 3..=100;
/// Minimum author length, in characters. There is no upper bound.
pub const AUTHOR_MIN_LENGTH: usize = 1;
/// Allowed description length, in characters.
pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 1..=100;
/// Allowed rating values.
pub const RATING_RANGE: RangeInclusive<i64> = 1..=5;
/// Allowed publication years.
pub const PUBLISHED_YEAR_RANGE: RangeInclusive<i64> = 2000..=2031;

/// A book held by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Catalog-assigned identifier
    pub id: i64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Short description
    pub description: String,
    /// Rating from 1 to 5
    pub rating: i64,
    /// Year of publication
    pub published_date: i64,
}

impl Book {
    /// Check the record against the same field constraints applied on create.
    pub fn validate(&self) -> Result<(), Vec<Violation>> {
        into_result(check_fields(
            &self.title,
            &self.author,
            &self.description,
            self.rating,
            self.published_date,
        ))
    }
}

/// Request model for creating a new book.
///
/// Any `id` sent by the client is ignored; the catalog assigns ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub description: String,
    pub rating: i64,
    pub published_date: i64,
}

impl BookInput {
    /// Validate every field, collecting all violations in field order.
    pub fn validate(&self) -> Result<(), Vec<Violation>> {
        into_result(check_fields(
            &self.title,
            &self.author,
            &self.description,
            self.rating,
            self.published_date,
        ))
    }

    pub(crate) fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            rating: self.rating,
            published_date: self.published_date,
        }
    }
}

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub constraint: Constraint,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, constraint: Constraint) -> Self {
        Self {
            field,
            message: format!("{} {}", field, constraint),
            constraint,
        }
    }

    /// JSON form used in error `details`; one entry per violation.
    pub fn detail(&self) -> serde_json::Value {
        let constraint = match self.constraint {
            Constraint::MinLength { limit } => json!({ "kind": "min_length", "limit": limit }),
            Constraint::MaxLength { limit } => json!({ "kind": "max_length", "limit": limit }),
            Constraint::Range { min, max } => json!({ "kind": "range", "min": min, "max": max }),
        };
        json!({
            "field": self.field,
            "constraint": constraint,
            "message": self.message,
        })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    MinLength { limit: usize },
    MaxLength { limit: usize },
    Range { min: i64, max: i64 },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::MinLength { limit } => {
                write!(f, "must be at least {} characters", limit)
            }
            Constraint::MaxLength { limit } => {
                write!(f, "must be at most {} characters", limit)
            }
            Constraint::Range { min, max } => write!(f, "must be between {} and {}", min, max),
        }
    }
}

fn into_result(violations: Vec<Violation>) -> Result<(), Vec<Violation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check_fields(
    title: &str,
    author: &str,
    description: &str,
    rating: i64,
    published_date: i64,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_length(
        &mut violations,
        "title",
        title,
        *TITLE_LENGTH.start(),
        Some(*TITLE_LENGTH.end()),
    );
    check_length(&mut violations, "author", author, AUTHOR_MIN_LENGTH, None);
    check_length(
        &mut violations,
        "description",
        description,
        *DESCRIPTION_LENGTH.start(),
        Some(*DESCRIPTION_LENGTH.end()),
    );
    check_range(&mut violations, "rating", rating, &RATING_RANGE);
    check_range(
        &mut violations,
        "published_date",
        published_date,
        &PUBLISHED_YEAR_RANGE,
    );
    violations
}

// Lengths are counted in chars, not bytes.
fn check_length(
    out: &mut Vec<Violation>,
    field: &'static str,
    value: &str,
    min: usize,
    max: Option<usize>,
) {
    let len = value.chars().count();
    if len < min {
        out.push(Violation::new(field, Constraint::MinLength { limit: min }));
    } else if let Some(max) = max.filter(|max| len > *max) {
        out.push(Violation::new(field, Constraint::MaxLength { limit: max }));
    }
}

fn check_range(
    out: &mut Vec<Violation>,
    field: &'static str,
    value: i64,
    range: &RangeInclusive<i64>,
) {
    if !range.contains(&value) {
        out.push(Violation::new(
            field,
            Constraint::Range {
                min: *range.start(),
                max: *range.end(),
            },
        ));
    }
}
