//! Author and subgenre essay payloads returned by the completion model.

use serde::{Deserialize, Serialize};

/// A notable author for a mystery subgenre
///
/// Field names match the JSON schema the author-list prompt asks the model
/// for, so a sanitized completion deserializes straight into this struct.
/// Every field is required: a reply missing `works` is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Author name
    pub name: String,

    /// Free-form life span ("1890-1976") or an active marker ("1950 - em atividade")
    pub dates: String,

    /// Short prose about the author's style and contribution
    pub description: String,

    /// Notable works, in the order returned (three are requested)
    pub works: Vec<String>,
}

impl Author {
    /// Create a new author with required fields
    pub fn new(name: impl Into<String>, dates: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dates: dates.into(),
            description: String::new(),
            works: Vec::new(),
        }
    }

    /// Whether the dates mark a living, still-publishing author
    pub fn is_active(&self) -> bool {
        self.dates.to_lowercase().contains("atividade")
    }
}

/// Builder for constructing Author objects
#[derive(Debug, Clone)]
pub struct AuthorBuilder {
    author: Author,
}

impl AuthorBuilder {
    /// Create a new builder with required fields
    pub fn new(name: impl Into<String>, dates: impl Into<String>) -> Self {
        Self {
            author: Author::new(name, dates),
        }
    }

    /// Set description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.author.description = description.into();
        self
    }

    /// Append a notable work
    pub fn work(mut self, work: impl Into<String>) -> Self {
        self.author.works.push(work.into());
        self
    }

    /// Build the Author
    pub fn build(self) -> Author {
        self.author
    }
}

/// Descriptive essay about a subgenre
///
/// `description` carries paragraph separators (`\n`) and `<i>` emphasis
/// tags produced by the model; both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgenreEssay {
    pub description: String,
}

impl SubgenreEssay {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// Non-empty paragraphs, split on line breaks
    pub fn paragraphs(&self) -> Vec<&str> {
        self.description
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_builder() {
        let author = AuthorBuilder::new("Agatha Christie", "1890-1976")
            .description("Rainha do crime.")
            .work("Assassinato no Expresso do Oriente")
            .work("E Não Sobrou Nenhum")
            .work("O Assassinato de Roger Ackroyd")
            .build();

        assert_eq!(author.name, "Agatha Christie");
        assert_eq!(author.works.len(), 3);
        assert!(!author.is_active());
    }

    #[test]
    fn test_author_requires_works() {
        let json = r#"{"name": "X", "dates": "1950 - em atividade", "description": "Y"}"#;
        assert!(serde_json::from_str::<Author>(json).is_err());
    }

    #[test]
    fn test_active_marker() {
        let author = Author::new("Louise Penny", "1958 - em atividade");
        assert!(author.is_active());
    }

    #[test]
    fn test_essay_paragraphs() {
        let essay = SubgenreEssay::new("P1\n\nP2\n\nP3");
        assert_eq!(essay.paragraphs(), vec!["P1", "P2", "P3"]);

        let single = SubgenreEssay::new("  only one  ");
        assert_eq!(single.paragraphs(), vec!["only one"]);
    }
}
