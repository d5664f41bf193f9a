use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type PublicationId = i64;

/// A stored publication.
///
/// `doi` is unique when present. `language`, `document_type`, `wos_id`,
/// `category` and `citations` are never written by the tagged-record import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: PublicationId,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub document_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wos_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub citations: i64,
}

impl Publication {
    /// A fresh publication built from import fields; every other column
    /// takes its default.
    pub fn from_fields(id: PublicationId, fields: &PublicationFields) -> Self {
        let mut publication = Self {
            id,
            title: String::new(),
            source: None,
            language: String::new(),
            document_type: String::new(),
            publication_date: None,
            volume: None,
            issue: None,
            pages: None,
            doi: fields.doi.clone(),
            wos_id: None,
            category: None,
            citations: 0,
        };
        publication.apply_fields(fields);
        publication
    }

    /// Overwrites the fields owned by the tagged-record import.
    pub fn apply_fields(&mut self, fields: &PublicationFields) {
        self.title = fields.title.clone();
        self.source = fields.source.clone();
        self.publication_date = fields.publication_date;
        self.volume = fields.volume.clone();
        self.issue = fields.issue.clone();
        self.pages = fields.pages.clone();
    }
}

/// The mutable slice of a publication that one imported record carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationFields {
    pub title: String,
    pub source: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub doi: Option<String>,
}

impl PublicationFields {
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::CatalogError::Validation(
                "publication title must not be empty".to_string(),
            ));
        }
        if matches!(self.doi.as_deref(), Some(doi) if doi.trim().is_empty()) {
            return Err(crate::CatalogError::Validation(
                "publication doi must be absent rather than empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> PublicationFields {
        PublicationFields {
            title: "Deep Learning".to_string(),
            source: Some("NATURE".to_string()),
            publication_date: NaiveDate::from_ymd_opt(2015, 5, 28),
            volume: Some("521".to_string()),
            issue: Some("7553".to_string()),
            pages: Some("436-444".to_string()),
            doi: Some("10.1038/nature14539".to_string()),
        }
    }

    #[test]
    fn test_from_fields_leaves_other_columns_default() {
        let publication = Publication::from_fields(3, &fields());
        assert_eq!(publication.title, "Deep Learning");
        assert_eq!(publication.doi.as_deref(), Some("10.1038/nature14539"));
        assert_eq!(publication.citations, 0);
        assert!(publication.language.is_empty());
        assert!(publication.wos_id.is_none());
    }

    #[test]
    fn test_apply_fields_keeps_doi_and_foreign_columns() {
        let mut publication = Publication::from_fields(3, &fields());
        publication.citations = 42;
        publication.category = Some("Computer Science".to_string());

        let mut update = fields();
        update.title = "Deep learning (corrected)".to_string();
        update.pages = None;
        publication.apply_fields(&update);

        assert_eq!(publication.title, "Deep learning (corrected)");
        assert!(publication.pages.is_none());
        assert_eq!(publication.citations, 42);
        assert_eq!(publication.category.as_deref(), Some("Computer Science"));
    }

    #[test]
    fn test_validate_rejects_blank_title_and_empty_doi() {
        let mut blank = fields();
        blank.title = "  ".to_string();
        assert!(blank.validate().is_err());

        let mut empty_doi = fields();
        empty_doi.doi = Some(String::new());
        assert!(empty_doi.validate().is_err());

        assert!(fields().validate().is_ok());
    }
}
