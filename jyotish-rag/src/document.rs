//! Data types for retrievable units, indexed entries, and search results.

use serde::{Deserialize, Serialize};

/// Structured provenance for one retrievable unit.
///
/// The `type` field always serializes and drives downstream display; the
/// remaining fields are the type-specific keys needed to explain where the
/// unit came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tag {
    /// One astrological house record.
    House {
        /// The house number (1-12).
        house_number: u8,
        /// The zodiac sign naturally associated with the house, if recorded.
        #[serde(skip_serializing_if = "Option::is_none")]
        zodiac_sign: Option<String>,
        /// The domain source file the record came from.
        source_file: String,
    },
    /// One planet record.
    Planet {
        /// The planet's name.
        planet_name: String,
        /// The domain source file the record came from.
        source_file: String,
    },
    /// One planet-in-house relationship record.
    PlanetInHouse {
        /// The house number (1-12).
        house_number: u8,
        /// The occupying planet's name.
        planet_name: String,
        /// The domain source file the record came from.
        source_file: String,
    },
}

/// One chunk of domain knowledge prepared for indexing.
///
/// Created by normalization, immutable afterwards. A unit has no identity
/// until the ingestion pipeline assigns it an id at index-insertion time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    /// The exact text to embed and to surface as evidence. Non-empty.
    pub text: String,
    /// Structured provenance classification.
    pub tag: Tag,
}

/// A [`Unit`] after id assignment and embedding, as persisted by a vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Globally unique id, assigned at insertion, never reused.
    pub id: String,
    /// The unit's text.
    pub text: String,
    /// Fixed-dimension embedding; every entry in a collection has the same dimension.
    pub embedding: Vec<f32>,
    /// Structured provenance classification.
    pub tag: Tag,
}

/// One ranked candidate returned by a similarity search.
///
/// `score` is always cosine similarity: higher is more relevant, for every
/// backend. Transient — produced fresh per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The id of the matching entry.
    pub id: String,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
    /// The entry's text.
    pub text: String,
    /// The entry's provenance tag.
    pub tag: Tag,
}

impl Tag {
    /// The source file this tag points at.
    pub fn source_file(&self) -> &str {
        match self {
            Tag::House { source_file, .. }
            | Tag::Planet { source_file, .. }
            | Tag::PlanetInHouse { source_file, .. } => source_file,
        }
    }
}
