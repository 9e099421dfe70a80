//! Search request and response models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Author, SubgenreEssay};

/// What a search asks the model to produce
///
/// The wire values are the ones the web client posts as `searchType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchKind {
    /// A list of notable authors for the subgenre
    #[serde(rename = "escritores")]
    AuthorList,
    /// A descriptive essay about the subgenre
    #[serde(rename = "subgenero")]
    SubgenreEssay,
}

impl SearchKind {
    /// All recognized kinds
    pub const ALL: [SearchKind; 2] = [SearchKind::AuthorList, SearchKind::SubgenreEssay];

    /// The `searchType` value used on the wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            SearchKind::AuthorList => "escritores",
            SearchKind::SubgenreEssay => "subgenero",
        }
    }

    /// Parse a wire value, returning `None` for anything unrecognized
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "escritores" => Some(SearchKind::AuthorList),
            "subgenero" => Some(SearchKind::SubgenreEssay),
            _ => None,
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchKind::from_wire(s).ok_or_else(|| format!("unknown search type: {}", s))
    }
}

/// Raw body of `POST /api/search`
///
/// Both fields are optional here so that missing fields become a validation
/// error with a useful message instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgenre: Option<String>,

    #[serde(
        rename = "searchType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub search_type: Option<String>,
}

impl SearchBody {
    pub fn new(subgenre: impl Into<String>, kind: SearchKind) -> Self {
        Self {
            subgenre: Some(subgenre.into()),
            search_type: Some(kind.wire_name().to_string()),
        }
    }
}

impl From<&SearchRequest> for SearchBody {
    fn from(request: &SearchRequest) -> Self {
        SearchBody::new(request.subgenre.clone(), request.kind)
    }
}

/// A validated search: non-empty subgenre plus a recognized kind
///
/// Built fresh for every user-initiated search and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Subgenre identifier, used verbatim in the prompt
    pub subgenre: String,

    /// Requested output
    pub kind: SearchKind,
}

impl SearchRequest {
    /// Create a new search request
    pub fn new(subgenre: impl Into<String>, kind: SearchKind) -> Self {
        Self {
            subgenre: subgenre.into(),
            kind,
        }
    }

    /// Validate a raw body, naming every missing or unrecognized field
    pub fn from_body(body: &SearchBody) -> Result<Self, String> {
        let subgenre = body
            .subgenre
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let search_type = body
            .search_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (subgenre, search_type) {
            (None, None) => Err("O subgênero e o tipo de busca são obrigatórios.".to_string()),
            (None, Some(_)) => Err("O subgênero (\"subgenre\") é obrigatório.".to_string()),
            (Some(_), None) => {
                Err("O tipo de busca (\"searchType\") é obrigatório.".to_string())
            }
            (Some(subgenre), Some(search_type)) => match SearchKind::from_wire(search_type) {
                Some(kind) => Ok(Self::new(subgenre, kind)),
                None => Err(format!(
                    "Tipo de busca inválido: \"{}\". Use \"escritores\" ou \"subgenero\".",
                    search_type
                )),
            },
        }
    }
}

/// Successful search payload
///
/// Serialized untagged, so the wire shape differs by kind: a bare array of
/// authors, or an object with a `description` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResult {
    Authors(Vec<Author>),
    Essay(SubgenreEssay),
}

impl SearchResult {
    /// The kind of search this payload answers
    pub fn kind(&self) -> SearchKind {
        match self {
            SearchResult::Authors(_) => SearchKind::AuthorList,
            SearchResult::Essay(_) => SearchKind::SubgenreEssay,
        }
    }

    /// Parse a JSON value as the payload for `kind`
    pub fn from_value(kind: SearchKind, value: serde_json::Value) -> serde_json::Result<Self> {
        match kind {
            SearchKind::AuthorList => serde_json::from_value(value).map(SearchResult::Authors),
            SearchKind::SubgenreEssay => serde_json::from_value(value).map(SearchResult::Essay),
        }
    }
}

/// Terminal result of one logical search as seen by the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Success(SearchResult),
    Failure(String),
    Cancelled,
}

impl SearchOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchOutcome::Cancelled)
    }
}
