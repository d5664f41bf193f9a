use serde::{Deserialize, Serialize};

pub type AuthorId = i64;

/// A catalog author. `name` and `slug` are both unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_index: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Values for an author that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub slug: String,
    pub h_index: Option<i32>,
    pub email: Option<String>,
}

impl NewAuthor {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            ..Default::default()
        }
    }

    pub fn with_h_index(mut self, h_index: i32) -> Self {
        self.h_index = Some(h_index);
        self
    }

    pub(crate) fn into_author(self, id: AuthorId) -> Author {
        Author {
            id,
            name: self.name,
            slug: self.slug,
            h_index: self.h_index,
            email: self.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_author_builder() {
        let author = NewAuthor::new("Doe, Jane", "doe-jane").with_h_index(12).into_author(7);
        assert_eq!(author.id, 7);
        assert_eq!(author.slug, "doe-jane");
        assert_eq!(author.h_index, Some(12));
        assert!(author.email.is_none());
    }

    #[test]
    fn test_author_json_skips_empty_optionals() {
        let author = NewAuthor::new("Doe, Jane", "doe-jane").into_author(1);
        let json = serde_json::to_string(&author).unwrap();
        assert!(!json.contains("h_index"));
        assert!(!json.contains("email"));
    }
}
