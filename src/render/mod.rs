//! Card renderer for search results.
//!
//! A [`ResultsContainer`] owns whatever is currently displayed. Rendering a
//! new result replaces the previous panel wholesale, and card toggles are
//! dispatched through the container by card id, so no per-card state
//! outlives the render that created it.

use std::fmt::Write as _;

use crate::models::{Author, SearchResult, SubgenreEssay};

/// Toggle label while a card is collapsed
pub const TOGGLE_COLLAPSED: &str = "Saiba mais";

/// Toggle label while a card is expanded
pub const TOGGLE_EXPANDED: &str = "Ocultar detalhes";

/// Heading above an author's works
pub const WORKS_HEADING: &str = "Principais Obras";

/// One author card with its own expand/collapse state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorCard {
    id: String,
    author: Author,
    expanded: bool,
}

impl AuthorCard {
    /// Create a collapsed card; `position` is 1-based
    pub fn new(position: usize, author: Author) -> Self {
        Self {
            id: format!("details-{}", position),
            author,
            expanded: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Whether description and works are visible
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.expanded {
            TOGGLE_EXPANDED
        } else {
            TOGGLE_COLLAPSED
        }
    }

    fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    fn write_html(&self, out: &mut String, index: usize) {
        let expanded = if self.expanded { " expanded" } else { "" };
        let _ = write!(
            out,
            "<div class=\"card{expanded}\" style=\"animation-delay: {delay}ms\">\
             <div class=\"card-header\"><h3>{name}</h3><span class=\"dates\">{dates}</span></div>\
             <div class=\"card-details{expanded}\" id=\"{id}\"><p>{description}</p>\
             <h4>{heading}</h4><ul>",
            delay = index * 50,
            name = escape_html(&self.author.name),
            dates = escape_html(&self.author.dates),
            id = self.id,
            description = escape_html(&self.author.description),
            heading = WORKS_HEADING,
        );
        for work in &self.author.works {
            let _ = write!(out, "<li>{}</li>", escape_html(work));
        }
        let _ = write!(
            out,
            "</ul></div><button class=\"toggle-btn\" data-target=\"{}\">{}</button></div>",
            self.id,
            self.toggle_label()
        );
    }
}

/// The single card holding a subgenre essay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssayCard {
    essay: SubgenreEssay,
}

impl EssayCard {
    pub fn new(essay: SubgenreEssay) -> Self {
        Self { essay }
    }

    /// Visually separate blocks, one per non-empty paragraph
    pub fn paragraphs(&self) -> Vec<&str> {
        self.essay.paragraphs()
    }

    // Paragraphs are emitted as-is: the model's <i> emphasis is part of the content.
    fn write_html(&self, out: &mut String) {
        out.push_str("<div class=\"card essay-card\">");
        for paragraph in self.paragraphs() {
            let _ = write!(out, "<p>{}</p>", paragraph);
        }
        out.push_str("</div>");
    }
}

/// Rendered contents of the results area
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsPanel {
    Authors(Vec<AuthorCard>),
    Essay(EssayCard),
}

impl ResultsPanel {
    /// Lay out a search result as cards, authors in input order
    pub fn from_result(result: SearchResult) -> Self {
        match result {
            SearchResult::Authors(authors) => ResultsPanel::Authors(
                authors
                    .into_iter()
                    .enumerate()
                    .map(|(i, author)| AuthorCard::new(i + 1, author))
                    .collect(),
            ),
            SearchResult::Essay(essay) => ResultsPanel::Essay(EssayCard::new(essay)),
        }
    }

    /// Author cards; empty for an essay
    pub fn author_cards(&self) -> &[AuthorCard] {
        match self {
            ResultsPanel::Authors(cards) => cards,
            ResultsPanel::Essay(_) => &[],
        }
    }

    pub fn card(&self, id: &str) -> Option<&AuthorCard> {
        self.author_cards().iter().find(|card| card.id == id)
    }

    /// The data behind the cards
    pub fn to_result(&self) -> SearchResult {
        match self {
            ResultsPanel::Authors(cards) => {
                SearchResult::Authors(cards.iter().map(|card| card.author.clone()).collect())
            }
            ResultsPanel::Essay(card) => SearchResult::Essay(card.essay.clone()),
        }
    }

    /// HTML fragment for the card grid
    pub fn to_html(&self) -> String {
        let mut out = String::from("<div class=\"card-grid\">");
        match self {
            ResultsPanel::Authors(cards) => {
                for (index, card) in cards.iter().enumerate() {
                    card.write_html(&mut out, index);
                }
            }
            ResultsPanel::Essay(card) => card.write_html(&mut out),
        }
        out.push_str("</div>");
        out
    }
}

impl From<SearchResult> for ResultsPanel {
    fn from(result: SearchResult) -> Self {
        ResultsPanel::from_result(result)
    }
}

/// Owner of the displayed results
#[derive(Debug, Clone, Default)]
pub struct ResultsContainer {
    panel: Option<ResultsPanel>,
}

impl ResultsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything currently displayed with `result`
    pub fn replace(&mut self, result: SearchResult) -> &ResultsPanel {
        self.panel.insert(ResultsPanel::from_result(result))
    }

    /// Drop the current contents
    pub fn clear(&mut self) {
        self.panel = None;
    }

    pub fn panel(&self) -> Option<&ResultsPanel> {
        self.panel.as_ref()
    }

    /// Flip the card with `card_id`, returning its new expanded state
    ///
    /// Returns `None` when no such card is displayed.
    pub fn toggle(&mut self, card_id: &str) -> Option<bool> {
        match self.panel.as_mut()? {
            ResultsPanel::Authors(cards) => cards
                .iter_mut()
                .find(|card| card.id == card_id)
                .map(AuthorCard::toggle),
            ResultsPanel::Essay(_) => None,
        }
    }

    /// HTML for the current contents (empty when nothing is displayed)
    pub fn to_html(&self) -> String {
        self.panel
            .as_ref()
            .map(ResultsPanel::to_html)
            .unwrap_or_default()
    }
}

/// Escape text for inclusion in HTML element content or attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
