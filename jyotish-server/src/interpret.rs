//! Static chart interpretation: joins a user's house occupancy against the
//! house-lords table and a built-in placement library.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One row of the house-lords table.
#[derive(Debug, Clone, Deserialize)]
pub struct HouseLord {
    pub house_number: u8,
    pub house_name: String,
    pub theme: String,
    pub natural_lord: String,
}

#[derive(Debug, Deserialize)]
struct HouseLordsFile {
    house_lords: Vec<HouseLord>,
}

/// House-lords table keyed by house number.
#[derive(Debug, Clone)]
pub struct HouseLordsMap {
    by_number: HashMap<u8, HouseLord>,
}

impl HouseLordsMap {
    /// Load the table from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading house lords table {}", path.display()))?;
        let file: HouseLordsFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing house lords table {}", path.display()))?;
        let by_number = file
            .house_lords
            .into_iter()
            .map(|lord| (lord.house_number, lord))
            .collect();
        Ok(Self { by_number })
    }

    fn get(&self, house_number: u8) -> Option<&HouseLord> {
        self.by_number.get(&house_number)
    }
}

/// Chart interpretation request.
#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub lat: Option<f64>,
    #[serde(rename = "long")]
    pub long_: Option<f64>,
    /// House number (as a string key) to occupying planet.
    #[serde(default)]
    pub houses: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct ChartUser {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub lat: Option<f64>,
    #[serde(rename = "long")]
    pub long_: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PlacementReading {
    pub summary: String,
    pub host_guest_dynamics: String,
    pub positive_traits_current: Vec<String>,
    pub negative_traits_current: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HouseInterpretation {
    pub house_number: u8,
    pub house_name: String,
    pub house_theme: String,
    pub natural_lord: String,
    pub occupying_planet: String,
    pub interpretation: PlacementReading,
}

/// Full interpretation payload returned to the caller.
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub user: ChartUser,
    pub interpretations: Vec<HouseInterpretation>,
    pub summary_for_user: String,
}

/// Interpret a chart against the house-lords table.
///
/// Houses with keys that are not valid house numbers, or that are missing
/// from the table, are skipped. Output is ordered by house number.
pub fn interpret_chart(request: ChartRequest, lords: &HouseLordsMap) -> ChartResponse {
    let mut placements: Vec<(u8, String)> = request
        .houses
        .into_iter()
        .filter_map(|(key, planet)| key.parse::<u8>().ok().map(|n| (n, planet)))
        .collect();
    placements.sort_by_key(|(house, _)| *house);

    let mut interpretations = Vec::new();
    let mut summary_points = Vec::new();

    for (house_number, planet) in placements {
        let Some(lord) = lords.get(house_number) else {
            continue;
        };

        let (summary, positive, negative) = match placement_reading(house_number, &planet) {
            Some(entry) => (
                entry.summary.to_string(),
                entry.positive.iter().map(|s| s.to_string()).collect(),
                entry.negative.iter().map(|s| s.to_string()).collect(),
            ),
            None => (
                format!(
                    "{} in the {} influences {}.",
                    planet,
                    lord.house_name,
                    lord.theme.to_lowercase()
                ),
                vec!["Positive traits not yet defined for this placement.".to_string()],
                vec!["Challenging traits not yet defined for this placement.".to_string()],
            ),
        };

        let host_guest_dynamics = format!(
            "{planet} is operating inside a house that is naturally guided by {lord}. \
             This creates a 'guest in someone else's home' effect, where {planet} expresses \
             its nature through the style and rules of {lord}.",
            planet = planet,
            lord = lord.natural_lord,
        );

        summary_points.push(format!("{planet} in House {house_number}: {summary}"));

        interpretations.push(HouseInterpretation {
            house_number,
            house_name: lord.house_name.clone(),
            house_theme: lord.theme.clone(),
            natural_lord: lord.natural_lord.clone(),
            occupying_planet: planet,
            interpretation: PlacementReading {
                summary,
                host_guest_dynamics,
                positive_traits_current: positive,
                negative_traits_current: negative,
            },
        });
    }

    ChartResponse {
        user: ChartUser {
            name: request.name,
            dob: request.dob,
            lat: request.lat,
            long_: request.long_,
        },
        interpretations,
        summary_for_user: summary_points.join(" | "),
    }
}

struct PlacementEntry {
    summary: &'static str,
    positive: &'static [&'static str],
    negative: &'static [&'static str],
}

macro_rules! entry {
    ($summary:expr, [$($pos:expr),+ $(,)?], [$($neg:expr),+ $(,)?]) => {
        Some(PlacementEntry {
            summary: $summary,
            positive: &[$($pos),+],
            negative: &[$($neg),+],
        })
    };
}

/// Built-in planet-in-house reading library. Grows over time; placements not
/// covered yet fall back to a generic line built from the house theme.
fn placement_reading(house: u8, planet: &str) -> Option<PlacementEntry> {
    match (house, planet) {
        (1, "Sun") => entry!(
            "Sun in the 1st house creates a powerful, visible personality.",
            [
                "Leadership aura and natural authority.",
                "High confidence and willpower.",
                "Strong physical presence, noticeable energy."
            ],
            [
                "Ego clashes and 'my way only' attitude.",
                "Impatience with others.",
                "Can strain relationships by being too dominant."
            ]
        ),
        (1, "Moon") => entry!(
            "Moon in the 1st house makes the self emotional, intuitive, and sensitive.",
            [
                "Warm, caring presence that people trust.",
                "Strong empathy and emotional intelligence.",
                "Magnetic softness in personality."
            ],
            [
                "Mood swings and emotional dependency.",
                "Restlessness and anxiety if unsupported.",
                "Easily hurt by criticism."
            ]
        ),
        (1, "Mars") => entry!(
            "Mars in the 1st house gives force, competitiveness, survival instinct.",
            [
                "Fearless, bold, courageous.",
                "Action taker, natural fighter under pressure.",
                "Determined and intense presence."
            ],
            [
                "Short temper and impulsive reactions.",
                "Can intimidate or dominate others.",
                "Relationship friction (Manglik-type tension)."
            ]
        ),
        (1, "Mercury") => entry!(
            "Mercury in the 1st house makes identity revolve around intelligence, words, and adaptability.",
            [
                "Smart, witty, fast communicator.",
                "Socially flexible, can read rooms fast.",
                "Youthful and curious energy."
            ],
            [
                "Overthinking and nervousness.",
                "Scattered attention.",
                "Blunt honesty can offend people."
            ]
        ),
        (1, "Venus") => entry!(
            "Venus in the 1st house adds charm, grace, social attractiveness.",
            [
                "Pleasant personality and aesthetic sense.",
                "Diplomatic and likable in first impressions.",
                "Naturally magnetic in social situations."
            ],
            [
                "Vanity and image-obsession.",
                "Can manipulate with sweetness.",
                "Romantic drama if seeking constant attention."
            ]
        ),
        (1, "Jupiter") => entry!(
            "Jupiter in the 1st house makes the self wise, ethical, and protective.",
            [
                "Guiding, mentor-like presence.",
                "Optimistic and morally grounded.",
                "Respected by others, seen as reliable."
            ],
            [
                "Overconfidence: 'I know what's best for everyone.'",
                "Unrealistic optimism.",
                "Overindulgence, comfort-seeking."
            ]
        ),
        (1, "Saturn") => entry!(
            "Saturn in the 1st house makes the person serious, responsible, disciplined.",
            [
                "High endurance, can handle pressure.",
                "Mature beyond age.",
                "Shows reliability and duty."
            ],
            [
                "Self-doubt, heaviness, pessimism.",
                "Slow to trust or open up.",
                "Carries emotional weight alone."
            ]
        ),
        (1, "Rahu") => entry!(
            "Rahu in the 1st house creates extreme hunger for identity, fame, and impact.",
            [
                "Magnetic, unforgettable presence.",
                "Bold risk-taker who doesn't fear judgment.",
                "Can gain influence quickly."
            ],
            [
                "Identity confusion and restlessness.",
                "Obsession with status or public image.",
                "Impulsive, addictive patterns."
            ]
        ),
        (1, "Ketu") => entry!(
            "Ketu in the 1st house gives spiritual detachment and mysterious aura.",
            [
                "Deep intuition and insight.",
                "Can stay calm in ego games.",
                "Feels 'older than their age' spiritually."
            ],
            [
                "Low self-esteem in youth.",
                "Social withdrawal or coldness.",
                "Difficulty forming stable identity."
            ]
        ),
        (2, "Mars") => entry!(
            "Mars in the 2nd house makes speech bold and money approach aggressive.",
            [
                "Protective about family resources.",
                "Courage to earn independently.",
                "Can negotiate hard and win."
            ],
            [
                "Harsh words that hurt loved ones.",
                "Money fights in family.",
                "Impulse spending and risky bets."
            ]
        ),
        (3, "Venus") => entry!(
            "Venus in the 3rd house makes communication stylish, attractive, and persuasive.",
            [
                "Great at relationship-building through words.",
                "Good for branding, marketing, content creation.",
                "Naturally socially likable voice."
            ],
            [
                "May manipulate emotionally to avoid conflict.",
                "Can sugarcoat instead of being direct.",
                "Image can matter more than truth."
            ]
        ),
        (4, "Saturn") => entry!(
            "Saturn in the 4th house creates emotional heaviness but huge loyalty to family.",
            [
                "Takes responsibility at home.",
                "Thinks long-term about security and property.",
                "Very resilient under emotional stress."
            ],
            [
                "Feels lonely or unsupported emotionally.",
                "Heavy bond with mother or homeland.",
                "Difficulty relaxing or feeling safe."
            ]
        ),
        (5, "Moon") => entry!(
            "Moon in the 5th house makes romance and creativity emotional and nurturing.",
            [
                "Loving, caring romantic style.",
                "Strong imagination and artistic intuition.",
                "Good with kids / mentoring younger people."
            ],
            [
                "Mood swings in love life.",
                "Needs attention/validation in romance.",
                "Emotions affect focus and creative output."
            ]
        ),
        (6, "Jupiter") => entry!(
            "Jupiter in the 6th house wants to solve problems ethically and guide others.",
            [
                "Supportive teammate and advisor.",
                "Wins conflicts through fairness and wisdom.",
                "Good for service, consulting, mentoring."
            ],
            [
                "May act morally superior at work.",
                "Overextends trying to save others.",
                "Ignores own health to help everyone else."
            ]
        ),
        (7, "Jupiter") => entry!(
            "Jupiter in the 7th house attracts wise, supportive partners.",
            [
                "Partners who bring growth and encouragement.",
                "Long-term mindset in relationships.",
                "Honesty and loyalty valued."
            ],
            [
                "Over-idealizing the partner.",
                "Turning every argument into a 'teaching moment'.",
                "Control disguised as guidance."
            ]
        ),
        (8, "Rahu") => entry!(
            "Rahu in the 8th house is obsession with power, secrets, intensity, taboo.",
            [
                "Fearless in crisis situations.",
                "Deep psychological insight.",
                "Access to transformation others can't handle."
            ],
            [
                "Paranoia, control issues, secrecy.",
                "Rollercoaster mental states.",
                "Tangled or hidden power struggles."
            ]
        ),
        (9, "Ketu") => entry!(
            "Ketu in the 9th house rejects shallow belief systems and chases real truth.",
            [
                "Strong inner spiritual compass.",
                "Doesn't fall for fake gurus.",
                "Wisdom through introspection."
            ],
            [
                "Disconnection from mentors or father figures.",
                "Restlessness with traditional education.",
                "Temporary loss of 'clear purpose' feeling."
            ]
        ),
        (10, "Sun") => entry!(
            "Sun in the 10th house flags public recognition, leadership, and visible career ambition.",
            [
                "Strong reputation and authority energy.",
                "Wants to build something significant.",
                "Can lead, command, or run operations."
            ],
            [
                "Workaholic identity (self-worth = career status).",
                "Clashes with bosses / authority structures.",
                "Low tolerance for incompetence in teams."
            ]
        ),
        (11, "Mars") => entry!(
            "Mars in the 11th house is raw drive to hit big goals fast.",
            [
                "Willpower to scale income and influence.",
                "Can mobilize networks quickly.",
                "Competitive hunger to win socially."
            ],
            [
                "Rivalries and jealousy in friend circles.",
                "Burns bridges if results are slow.",
                "Treats allies like soldiers, not humans."
            ]
        ),
        (12, "Venus") => entry!(
            "Venus in the 12th house creates private fantasies, secret pleasures, and healing through beauty.",
            [
                "Art, music, romance become forms of escape and restoration.",
                "Can find peace in solitude, travel, retreat.",
                "Very loving in private, soft with trusted people."
            ],
            [
                "Escapism via pleasure / fantasy / spending.",
                "Hidden relationships, secrecy in love.",
                "Spends quietly on comfort or indulgence."
            ]
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lords() -> HouseLordsMap {
        let mut by_number = HashMap::new();
        by_number.insert(
            1,
            HouseLord {
                house_number: 1,
                house_name: "1st House".to_string(),
                theme: "Self, body, and identity".to_string(),
                natural_lord: "Mars".to_string(),
            },
        );
        by_number.insert(
            10,
            HouseLord {
                house_number: 10,
                house_name: "10th House".to_string(),
                theme: "Career and public standing".to_string(),
                natural_lord: "Saturn".to_string(),
            },
        );
        HouseLordsMap { by_number }
    }

    #[test]
    fn known_placement_uses_library_reading() {
        let request = ChartRequest {
            name: Some("Asha".to_string()),
            dob: None,
            lat: None,
            long_: None,
            houses: HashMap::from([("1".to_string(), "Sun".to_string())]),
        };
        let out = interpret_chart(request, &lords());
        assert_eq!(out.interpretations.len(), 1);
        let reading = &out.interpretations[0];
        assert_eq!(reading.occupying_planet, "Sun");
        assert!(reading.interpretation.summary.starts_with("Sun in the 1st house"));
        assert!(reading
            .interpretation
            .host_guest_dynamics
            .contains("naturally guided by Mars"));
        assert!(out.summary_for_user.starts_with("Sun in House 1:"));
    }

    #[test]
    fn unknown_placement_falls_back_to_theme_line() {
        let request = ChartRequest {
            name: None,
            dob: None,
            lat: None,
            long_: None,
            houses: HashMap::from([("10".to_string(), "Moon".to_string())]),
        };
        let out = interpret_chart(request, &lords());
        let reading = &out.interpretations[0];
        assert_eq!(
            reading.interpretation.summary,
            "Moon in the 10th House influences career and public standing."
        );
        assert_eq!(
            reading.interpretation.positive_traits_current,
            vec!["Positive traits not yet defined for this placement."]
        );
    }

    #[test]
    fn houses_missing_from_table_are_skipped_and_output_is_ordered() {
        let request = ChartRequest {
            name: None,
            dob: None,
            lat: None,
            long_: None,
            houses: HashMap::from([
                ("10".to_string(), "Sun".to_string()),
                ("1".to_string(), "Moon".to_string()),
                ("7".to_string(), "Jupiter".to_string()),
                ("nope".to_string(), "Mars".to_string()),
            ]),
        };
        let out = interpret_chart(request, &lords());
        let numbers: Vec<u8> = out.interpretations.iter().map(|i| i.house_number).collect();
        assert_eq!(numbers, vec![1, 10]);
    }
}
