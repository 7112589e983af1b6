//! Paper submission commands and field validation.
//!
//! Validation mirrors what the catalog accepts at upload time: every rule
//! failure is collected so the client sees the full list in one response.

use serde::Deserialize;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use uuid::Uuid;

const TITLE_MAX: usize = 200;
const ABSTRACT_MAX: usize = 1000;
const AUTHORS_MAX: usize = 5;
const AUTHOR_NAME_MAX: usize = 100;
const KEYWORDS_MAX: usize = 5;
const KEYWORD_MAX: usize = 50;
const JOURNAL_MAX: usize = 200;
const CITATIONS_MAX: usize = 5;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Paper upload request body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPaper {
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub publication_date: String,
    #[serde(default)]
    pub journal_conference: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub citations: Vec<String>,
}

/// A `NewPaper` whose fields have passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedPaper {
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub publication_date: Date,
    pub journal_conference: String,
    pub keywords: Vec<String>,
    pub citations: Vec<Uuid>,
}

impl NewPaper {
    /// Check every field and either return the normalized submission or the
    /// full list of rule violations.
    pub fn validate(&self) -> Result<ValidatedPaper, Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Title is required".to_string());
        } else if self.title.chars().count() > TITLE_MAX {
            errors.push(format!("Title must be at most {TITLE_MAX} characters"));
        }

        if self.abstract_text.trim().is_empty() {
            errors.push("Abstract is required".to_string());
        } else if self.abstract_text.chars().count() > ABSTRACT_MAX {
            errors.push(format!(
                "Abstract must be at most {ABSTRACT_MAX} characters"
            ));
        }

        if self.authors.is_empty() {
            errors.push("At least one author is required".to_string());
        } else if self.authors.len() > AUTHORS_MAX {
            errors.push(format!("Maximum {AUTHORS_MAX} authors allowed"));
        } else if self.authors.iter().any(|a| a.trim().is_empty()) {
            errors.push("Author names cannot be empty".to_string());
        } else if self
            .authors
            .iter()
            .any(|a| a.chars().count() > AUTHOR_NAME_MAX)
        {
            errors.push(format!(
                "Each author name must be at most {AUTHOR_NAME_MAX} characters"
            ));
        }

        if self.keywords.is_empty() {
            errors.push("At least one keyword is required".to_string());
        } else if self.keywords.len() > KEYWORDS_MAX {
            errors.push(format!("Maximum {KEYWORDS_MAX} keywords allowed"));
        } else if self.keywords.iter().any(|k| k.trim().is_empty()) {
            errors.push("Keywords cannot be empty".to_string());
        } else if self
            .keywords
            .iter()
            .any(|k| k.chars().count() > KEYWORD_MAX)
        {
            errors.push(format!(
                "Each keyword must be at most {KEYWORD_MAX} characters"
            ));
        }

        let publication_date = if self.publication_date.is_empty() {
            errors.push("Publication date is required".to_string());
            None
        } else {
            match Date::parse(&self.publication_date, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(
                        "Publication date must be in ISO format (YYYY-MM-DD)".to_string(),
                    );
                    None
                }
            }
        };

        if self.journal_conference.chars().count() > JOURNAL_MAX {
            errors.push(format!(
                "Journal/conference must be at most {JOURNAL_MAX} characters"
            ));
        }

        let mut citations = Vec::with_capacity(self.citations.len());
        if self.citations.len() > CITATIONS_MAX {
            errors.push(format!("Maximum {CITATIONS_MAX} citations allowed"));
        } else {
            for raw in &self.citations {
                match Uuid::parse_str(raw) {
                    Ok(id) => citations.push(id),
                    Err(_) => errors.push(format!("Invalid citation ID format: {raw}")),
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedPaper {
            title: self.title.trim().to_string(),
            authors: self.authors.iter().map(|a| a.trim().to_string()).collect(),
            abstract_text: self.abstract_text.trim().to_string(),
            publication_date: publication_date.expect("validated above"),
            journal_conference: self.journal_conference.trim().to_string(),
            keywords: self.keywords.iter().map(|k| k.trim().to_string()).collect(),
            citations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewPaper {
        NewPaper {
            title: "Counter Reconciliation in Practice".to_string(),
            authors: vec!["R. Hartley".to_string()],
            abstract_text: "We study write-behind counters.".to_string(),
            publication_date: "2024-03-01".to_string(),
            journal_conference: "SYSTEMS '24".to_string(),
            keywords: vec!["counters".to_string()],
            citations: Vec::new(),
        }
    }

    #[test]
    fn accepts_a_complete_submission() {
        let validated = sample().validate().expect("valid paper");
        assert_eq!(validated.title, "Counter Reconciliation in Practice");
        assert_eq!(validated.publication_date.to_string(), "2024-03-01");
    }

    #[test]
    fn collects_all_field_errors_at_once() {
        let paper = NewPaper {
            title: String::new(),
            authors: Vec::new(),
            abstract_text: String::new(),
            publication_date: "March 2024".to_string(),
            journal_conference: String::new(),
            keywords: Vec::new(),
            citations: Vec::new(),
        };
        let errors = paper.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("Title")));
        assert!(errors.iter().any(|e| e.contains("Abstract")));
        assert!(errors.iter().any(|e| e.contains("author")));
        assert!(errors.iter().any(|e| e.contains("keyword")));
        assert!(errors.iter().any(|e| e.contains("ISO format")));
    }

    #[test]
    fn rejects_too_many_authors() {
        let mut paper = sample();
        paper.authors = (0..6).map(|i| format!("Author {i}")).collect();
        let errors = paper.validate().unwrap_err();
        assert_eq!(errors, vec!["Maximum 5 authors allowed".to_string()]);
    }

    #[test]
    fn rejects_malformed_citation_ids() {
        let mut paper = sample();
        paper.citations = vec!["not-a-uuid".to_string()];
        let errors = paper.validate().unwrap_err();
        assert_eq!(
            errors,
            vec!["Invalid citation ID format: not-a-uuid".to_string()]
        );
    }

    #[test]
    fn rejects_oversized_title() {
        let mut paper = sample();
        paper.title = "x".repeat(201);
        let errors = paper.validate().unwrap_err();
        assert_eq!(
            errors,
            vec!["Title must be at most 200 characters".to_string()]
        );
    }
}
