// 🏰 House Model - The four fixed categories and their scoring tables
// Identity, narrative text and keyword tables live here; scoring logic
// that consumes them lives in sorting.rs and quiz.rs

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// HOUSE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum House {
    Gryffindor,
    Ravenclaw,
    Hufflepuff,
    Slytherin,
}

/// Declaration order doubles as tie-break order: on exact score ties the
/// first house in this list wins.
pub const ALL_HOUSES: [House; 4] = [
    House::Gryffindor,
    House::Ravenclaw,
    House::Hufflepuff,
    House::Slytherin,
];

impl House {
    pub fn as_str(&self) -> &'static str {
        match self {
            House::Gryffindor => "gryffindor",
            House::Ravenclaw => "ravenclaw",
            House::Hufflepuff => "hufflepuff",
            House::Slytherin => "slytherin",
        }
    }

    /// Parse from the lowercase storage form
    pub fn parse(s: &str) -> Option<House> {
        match s {
            "gryffindor" => Some(House::Gryffindor),
            "ravenclaw" => Some(House::Ravenclaw),
            "hufflepuff" => Some(House::Hufflepuff),
            "slytherin" => Some(House::Slytherin),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            House::Gryffindor => "Gryffindor",
            House::Ravenclaw => "Ravenclaw",
            House::Hufflepuff => "Hufflepuff",
            House::Slytherin => "Slytherin",
        }
    }

    pub fn crest(&self) -> &'static str {
        match self {
            House::Gryffindor => "🦁",
            House::Ravenclaw => "🦅",
            House::Hufflepuff => "🦡",
            House::Slytherin => "🐍",
        }
    }

    pub fn motto(&self) -> &'static str {
        match self {
            House::Gryffindor => "Their daring, nerve, and chivalry set Gryffindors apart",
            House::Ravenclaw => "Wit beyond measure is man's greatest treasure",
            House::Hufflepuff => "Those patient Hufflepuffs are true and unafraid of toil",
            House::Slytherin => "Slytherin will help you on the way to greatness",
        }
    }

    pub fn traits(&self) -> [&'static str; 4] {
        match self {
            House::Gryffindor => ["Brave", "Daring", "Chivalrous", "Courageous"],
            House::Ravenclaw => ["Wise", "Clever", "Creative", "Curious"],
            House::Hufflepuff => ["Loyal", "Kind", "Patient", "Hardworking"],
            House::Slytherin => ["Ambitious", "Cunning", "Resourceful", "Determined"],
        }
    }

    /// Fixed narrative paragraph spoken on classification.
    /// Authored text - never derived from submission input.
    pub fn description(&self) -> &'static str {
        match self {
            House::Gryffindor => {
                "I see great courage and bravery within you! You face challenges head-on \
                 and stand up for what's right. Your boldness and determination shine \
                 brightly, making you a natural leader who inspires others to be their best."
            }
            House::Ravenclaw => {
                "Your mind is sharp and curious, always seeking knowledge and understanding! \
                 You approach problems with wisdom and creativity, finding elegant solutions \
                 others might miss. Your love of learning makes you truly special."
            }
            House::Hufflepuff => {
                "What a loyal and kind heart you have! You value friendship, fairness, and \
                 hard work above all else. Your dedication to helping others and your \
                 unwavering patience make you a treasured friend and ally."
            }
            House::Slytherin => {
                "Ah, ambitious and cunning! You know what you want and you're determined to \
                 achieve it. Your resourcefulness and strategic mind will take you far. You \
                 understand that sometimes great things require great sacrifices."
            }
        }
    }

    /// Keywords matched against free-text personality descriptions (bonus +2 each)
    pub fn personality_keywords(&self) -> &'static [&'static str] {
        match self {
            House::Gryffindor => &["brave", "courage", "bold", "adventure", "hero", "leader"],
            House::Ravenclaw => &["smart", "learn", "study", "knowledge", "book", "creative"],
            House::Hufflepuff => &["kind", "loyal", "friend", "help", "patient", "fair"],
            House::Slytherin => &[
                "ambitious",
                "cunning",
                "power",
                "success",
                "strategic",
                "determined",
            ],
        }
    }

    /// Keywords matched against selected answer texts (bonus +1 each)
    pub fn answer_keywords(&self) -> &'static [&'static str] {
        match self {
            House::Gryffindor => &["face it head-on", "courage", "adventure"],
            House::Ravenclaw => &["analyze", "intelligence", "reading"],
            House::Hufflepuff => &["help others", "loyalty", "friends"],
            House::Slytherin => &["strategic", "ambition", "goals"],
        }
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// HOUSE SCORES
// ============================================================================

/// Running score totals for all four houses (default zero).
/// Shared by the keyword classifier and the hint-weight accumulator so
/// both use the same winner rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseScores {
    pub gryffindor: f64,
    pub ravenclaw: f64,
    pub hufflepuff: f64,
    pub slytherin: f64,
}

impl HouseScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, house: House) -> f64 {
        match house {
            House::Gryffindor => self.gryffindor,
            House::Ravenclaw => self.ravenclaw,
            House::Hufflepuff => self.hufflepuff,
            House::Slytherin => self.slytherin,
        }
    }

    pub fn add(&mut self, house: House, weight: f64) {
        match house {
            House::Gryffindor => self.gryffindor += weight,
            House::Ravenclaw => self.ravenclaw += weight,
            House::Hufflepuff => self.hufflepuff += weight,
            House::Slytherin => self.slytherin += weight,
        }
    }

    /// House with the strictly highest total; exact ties resolve to the
    /// first house in declaration order.
    pub fn leader(&self) -> House {
        let mut best = House::Gryffindor;
        for house in ALL_HOUSES {
            if self.get(house) > self.get(best) {
                best = house;
            }
        }
        best
    }

    /// Totals in declaration order, for display
    pub fn totals(&self) -> [(House, f64); 4] {
        [
            (House::Gryffindor, self.gryffindor),
            (House::Ravenclaw, self.ravenclaw),
            (House::Hufflepuff, self.hufflepuff),
            (House::Slytherin, self.slytherin),
        ]
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_roundtrip() {
        for house in ALL_HOUSES {
            assert_eq!(House::parse(house.as_str()), Some(house));
        }
        assert_eq!(House::parse("durmstrang"), None);
    }

    #[test]
    fn test_house_serde_lowercase() {
        let json = serde_json::to_string(&House::Gryffindor).unwrap();
        assert_eq!(json, "\"gryffindor\"");

        let back: House = serde_json::from_str("\"slytherin\"").unwrap();
        assert_eq!(back, House::Slytherin);
    }

    #[test]
    fn test_scores_default_zero() {
        let scores = HouseScores::new();
        for house in ALL_HOUSES {
            assert_eq!(scores.get(house), 0.0);
        }
    }

    #[test]
    fn test_scores_accumulate() {
        let mut scores = HouseScores::new();
        scores.add(House::Ravenclaw, 2.0);
        scores.add(House::Ravenclaw, 1.0);
        scores.add(House::Slytherin, 1.5);

        assert_eq!(scores.get(House::Ravenclaw), 3.0);
        assert_eq!(scores.get(House::Slytherin), 1.5);
        assert_eq!(scores.get(House::Gryffindor), 0.0);
    }

    #[test]
    fn test_leader_strictly_highest() {
        let mut scores = HouseScores::new();
        scores.add(House::Hufflepuff, 4.0);
        scores.add(House::Gryffindor, 3.9);

        assert_eq!(scores.leader(), House::Hufflepuff);
    }

    #[test]
    fn test_leader_tie_first_in_order_wins() {
        // All zero: first house in declaration order wins
        assert_eq!(HouseScores::new().leader(), House::Gryffindor);

        let mut scores = HouseScores::new();
        scores.add(House::Ravenclaw, 2.0);
        scores.add(House::Slytherin, 2.0);
        assert_eq!(scores.leader(), House::Ravenclaw);
    }

    #[test]
    fn test_every_house_has_narrative() {
        for house in ALL_HOUSES {
            assert!(!house.description().is_empty());
            assert!(!house.motto().is_empty());
            assert!(!house.personality_keywords().is_empty());
            assert!(!house.answer_keywords().is_empty());
        }
    }
}
