//! Value objects checked before any write.
//!
//! Every constructor trims its input, enforces the field bounds from
//! [`crate::defaults`] and returns `Error::InvalidInput` with a message
//! that is safe to show to the caller.

use chrono::{DateTime, Utc};

use crate::defaults::{
    PROJECT_DESCRIPTION_MAX, PROJECT_TITLE_MAX, TASK_DESCRIPTION_MAX, TASK_TITLE_MAX,
};
use crate::error::{Error, Result};
use crate::models::Attachment;

/// A required, trimmed, length-bounded title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Title of a project (at most 100 characters).
    pub fn project(raw: Option<&str>) -> Result<Self> {
        Self::parse(raw, PROJECT_TITLE_MAX)
    }

    /// Title of a task (at most 200 characters).
    pub fn task(raw: Option<&str>) -> Result<Self> {
        Self::parse(raw, TASK_TITLE_MAX)
    }

    fn parse(raw: Option<&str>, max: usize) -> Result<Self> {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("Title is required".to_string()));
        }
        if trimmed.chars().count() > max {
            return Err(Error::InvalidInput(format!(
                "Title must be at most {} characters",
                max
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// An optional, trimmed, length-bounded description.
///
/// Blank input is normalised to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(Option<String>);

impl Description {
    /// Description of a project (at most 500 characters).
    pub fn project(raw: Option<&str>) -> Result<Self> {
        Self::parse(raw, PROJECT_DESCRIPTION_MAX)
    }

    /// Description of a task (at most 1000 characters).
    pub fn task(raw: Option<&str>) -> Result<Self> {
        Self::parse(raw, TASK_DESCRIPTION_MAX)
    }

    fn parse(raw: Option<&str>, max: usize) -> Result<Self> {
        let trimmed = raw.map(str::trim).filter(|s| !s.is_empty());
        match trimmed {
            None => Ok(Self(None)),
            Some(text) if text.chars().count() > max => Err(Error::InvalidInput(format!(
                "Description must be at most {} characters",
                max
            ))),
            Some(text) => Ok(Self(Some(text.to_string()))),
        }
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

/// Ordered project tags; none may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn parse(raw: Option<Vec<String>>) -> Result<Self> {
        let tags = raw.unwrap_or_default();
        let mut out = Vec::with_capacity(tags.len());
        for tag in tags {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidInput(
                    "Tags cannot be empty strings".to_string(),
                ));
            }
            out.push(trimmed.to_string());
        }
        Ok(Self(out))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Unchecked attachment metadata as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct AttachmentInput {
    pub name: Option<String>,
    pub url: Option<String>,
    pub content_type: Option<String>,
    pub size: Option<i64>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl AttachmentInput {
    /// Check required fields and build the stored record.
    pub fn validate(self) -> Result<Attachment> {
        let name = required(self.name.as_deref(), "Attachment name is required")?;
        let url = required(self.url.as_deref(), "Attachment URL is required")?;
        let content_type = required(self.content_type.as_deref(), "Attachment type is required")?;

        if let Some(size) = self.size {
            if size < 0 {
                return Err(Error::InvalidInput(
                    "File size cannot be negative".to_string(),
                ));
            }
        }

        Ok(Attachment {
            name,
            url,
            content_type,
            size: self.size,
            uploaded_at: self.uploaded_at.unwrap_or_else(Utc::now),
        })
    }
}

fn required(raw: Option<&str>, message: &str) -> Result<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::InvalidInput(message.to_string()))
}
