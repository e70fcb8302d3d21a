//! Domain source records and the document normalizer.
//!
//! The domain knowledge ships as structured JSON: house records, planet
//! records, and planet-in-house relationship records. Normalization flattens
//! them into [`Unit`]s — exactly one unit per source record, each with a
//! deterministic human-readable rendering of all of the record's fields.
//! Re-running normalization over unchanged sources yields byte-identical
//! text, which keeps index rebuilds idempotent at the text level.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::document::{Tag, Unit};
use crate::error::{RagError, Result};

/// Placeholder rendered for absent optional fields.
///
/// Missing data is shown explicitly rather than silently omitted, so two
/// records that differ only in which fields are present never normalize to
/// the same text.
const PLACEHOLDER: &str = "N/A";

/// One parsed domain source file together with its origin path.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path the document was loaded from, recorded in provenance tags.
    pub path: String,
    /// The parsed document.
    pub doc: DomainDoc,
}

/// Top-level shape of a domain source document.
///
/// A valid document carries at least one of the known sections; a document
/// with neither is structurally malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainDoc {
    #[serde(default)]
    vedic_astrology: Option<VedicSections>,
    #[serde(default)]
    planets_in_house: Option<PlanetsInHouse>,
}

#[derive(Debug, Clone, Deserialize)]
struct VedicSections {
    #[serde(default)]
    houses: Vec<HouseRecord>,
    #[serde(default)]
    planets: Vec<PlanetRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct HouseRecord {
    house_number: u8,
    #[serde(default)]
    house_name: Option<String>,
    #[serde(default)]
    zodiac_sign: Option<String>,
    #[serde(default)]
    ruling_planet: Option<String>,
    #[serde(default)]
    meaning: Option<String>,
    #[serde(default)]
    influence: Option<String>,
    #[serde(default)]
    recommended_gemstone: Option<Gemstone>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlanetRecord {
    name: String,
    #[serde(default)]
    sanskrit_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    influence: Option<String>,
    #[serde(default)]
    gemstone: Option<Gemstone>,
}

#[derive(Debug, Clone, Deserialize)]
struct Gemstone {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    effects: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlanetsInHouse {
    house_number: u8,
    #[serde(default)]
    planets: Vec<PlanetInHouseRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlanetInHouseRecord {
    planet: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, alias = "positive_traits")]
    positive_manifestations: Vec<String>,
    #[serde(default, alias = "negative_traits")]
    negative_manifestations: Vec<String>,
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(PLACEHOLDER)
}

/// Load every `*.json` document under `dir`, in file-name order.
///
/// File-name ordering keeps the resulting unit sequence deterministic
/// regardless of directory enumeration order.
pub fn load_domain_dir(dir: impl AsRef<Path>) -> Result<Vec<SourceFile>> {
    let dir = dir.as_ref();
    let mut paths: Vec<_> = fs::read_dir(dir)
        .map_err(|e| RagError::MalformedDomainData {
            source_file: dir.display().to_string(),
            message: format!("cannot read domain directory: {e}"),
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let display = path.display().to_string();
        let raw = fs::read_to_string(&path).map_err(|e| RagError::MalformedDomainData {
            source_file: display.clone(),
            message: format!("cannot read file: {e}"),
        })?;
        let doc: DomainDoc =
            serde_json::from_str(&raw).map_err(|e| RagError::MalformedDomainData {
                source_file: display.clone(),
                message: format!("invalid JSON: {e}"),
            })?;
        files.push(SourceFile { path: display, doc });
    }
    debug!(dir = %dir.display(), file_count = files.len(), "loaded domain sources");
    Ok(files)
}

/// Flatten parsed domain documents into retrievable units.
///
/// One unit per house record, one per planet record, one per planet-in-house
/// record. Records are never merged and never split. Pure transform: same
/// input, byte-identical output.
///
/// # Errors
///
/// Returns [`RagError::MalformedDomainData`] if a document contains none of
/// the known top-level sections. A known section that is present but empty
/// simply contributes zero units.
pub fn normalize(files: &[SourceFile]) -> Result<Vec<Unit>> {
    let mut units = Vec::new();
    for file in files {
        normalize_file(file, &mut units)?;
    }
    debug!(unit_count = units.len(), "normalized domain sources");
    Ok(units)
}

fn normalize_file(file: &SourceFile, units: &mut Vec<Unit>) -> Result<()> {
    let src = &file.path;
    let doc = &file.doc;

    if doc.vedic_astrology.is_none() && doc.planets_in_house.is_none() {
        return Err(RagError::MalformedDomainData {
            source_file: src.clone(),
            message: "expected a 'vedic_astrology' or 'planets_in_house' top-level key".into(),
        });
    }

    if let Some(sections) = &doc.vedic_astrology {
        for house in &sections.houses {
            units.push(render_house(house, src));
        }
        for planet in &sections.planets {
            units.push(render_planet(planet, src));
        }
    }

    if let Some(relations) = &doc.planets_in_house {
        for record in &relations.planets {
            units.push(render_planet_in_house(record, relations.house_number, src));
        }
    }

    Ok(())
}

fn render_house(house: &HouseRecord, src: &str) -> Unit {
    let gem = house.recommended_gemstone.as_ref();
    let text = format!(
        "House {} - {}:\n\
         Sign: {}\n\
         Ruling Planet(s): {}\n\
         Meaning: {}\n\
         Influence: {}\n\
         Gemstone: {}\n\
         Gemstone Effects: {}\n\
         Notes: {}\n",
        house.house_number,
        opt(&house.house_name),
        opt(&house.zodiac_sign),
        opt(&house.ruling_planet),
        opt(&house.meaning),
        opt(&house.influence),
        gem.map_or(PLACEHOLDER, |g| opt(&g.name)),
        gem.map_or(PLACEHOLDER, |g| opt(&g.effects)),
        opt(&house.note),
    );
    Unit {
        text,
        tag: Tag::House {
            house_number: house.house_number,
            zodiac_sign: house.zodiac_sign.clone(),
            source_file: src.to_string(),
        },
    }
}

fn render_planet(planet: &PlanetRecord, src: &str) -> Unit {
    let gem = planet.gemstone.as_ref();
    let text = format!(
        "Planet: {}\n\
         Sanskrit: {}\n\
         Description: {}\n\
         Influence: {}\n\
         Gemstone: {}, Color: {}, Effects: {}\n",
        planet.name,
        opt(&planet.sanskrit_name),
        opt(&planet.description),
        opt(&planet.influence),
        gem.map_or(PLACEHOLDER, |g| opt(&g.name)),
        gem.map_or(PLACEHOLDER, |g| opt(&g.color)),
        gem.map_or(PLACEHOLDER, |g| opt(&g.effects)),
    );
    Unit {
        tag: Tag::Planet { planet_name: planet.name.clone(), source_file: src.to_string() },
        text,
    }
}

fn render_planet_in_house(record: &PlanetInHouseRecord, house_number: u8, src: &str) -> Unit {
    let text = format!(
        "Planet {} in House {}:\n\
         Summary: {}\n\
         Positive: {}\n\
         Negative: {}\n",
        record.planet,
        house_number,
        opt(&record.summary),
        join_or_placeholder(&record.positive_manifestations),
        join_or_placeholder(&record.negative_manifestations),
    );
    Unit {
        text,
        tag: Tag::PlanetInHouse {
            house_number,
            planet_name: record.planet.clone(),
            source_file: src.to_string(),
        },
    }
}

fn join_or_placeholder(items: &[String]) -> String {
    if items.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        items.join(", ")
    }
}
