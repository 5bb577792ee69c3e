//! Environment catalog and prompt matching
//!
//! Environments only label the overlay; the diorama itself never changes.

use serde::{Deserialize, Serialize};

/// Lighting mood an environment is meant for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Day,
    Night,
    Sunset,
    Dynamic,
}

/// A selectable environment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    pub description: String,
    pub time_of_day: TimeOfDay,
}

/// `(id, name, description, time of day)`
const CATALOG: [(&str, &str, &str, TimeOfDay); 5] = [
    ("cozy-room", "Cozy Bedroom", "A snug private space under warm lights", TimeOfDay::Night),
    ("tokyo-cafe", "Rainy Tokyo Cafe", "A small cafe with rain on the windows", TimeOfDay::Day),
    ("forest-cabin", "Forest Cabin", "Dense woods full of birdsong", TimeOfDay::Day),
    ("study-desk", "Focus Study", "A quiet study with lo-fi playing", TimeOfDay::Sunset),
    ("mountain-view", "Mountain Lookout", "A peaceful mountain panorama", TimeOfDay::Dynamic),
];

/// Keywords checked in order; the first rule with a hit wins
const PROMPT_RULES: [(&[&str], &str); 4] = [
    (&["카페", "비", "cafe", "rain"], "tokyo-cafe"),
    (&["숲", "자연", "forest", "nature"], "forest-cabin"),
    (&["서재", "공부", "study", "desk"], "study-desk"),
    (&["산", "mountain", "전망"], "mountain-view"),
];

const DEFAULT_ID: &str = "cozy-room";

impl Environment {
    fn from_entry((id, name, description, time_of_day): (&str, &str, &str, TimeOfDay)) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            time_of_day,
        }
    }

    /// Look up a catalog entry by id
    pub fn find(id: &str) -> Option<Self> {
        CATALOG
            .into_iter()
            .find(|entry| entry.0 == id)
            .map(Self::from_entry)
    }

    /// Pick the environment a free-text prompt asks for.
    ///
    /// The returned entry carries `"AI: <prompt>"` as its description.
    pub fn from_prompt(prompt: &str) -> Self {
        let keywords = prompt.to_lowercase();
        let id = PROMPT_RULES
            .iter()
            .find(|(words, _)| words.iter().any(|w| keywords.contains(w)))
            .map_or(DEFAULT_ID, |(_, id)| *id);

        let mut env = Self::find(id).unwrap_or_default();
        env.description = format!("AI: {}", prompt);
        env
    }

    /// Entry that follows this one in the catalog, wrapping around
    pub fn next(&self) -> Self {
        let index = CATALOG.iter().position(|entry| entry.0 == self.id).map_or(0, |i| i + 1);
        Self::from_entry(CATALOG[index % CATALOG.len()])
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::from_entry(CATALOG[0])
    }
}

/// Every environment in display order
pub fn catalog() -> Vec<Environment> {
    CATALOG.into_iter().map(Environment::from_entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        let all = catalog();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0], Environment::default());
        assert_eq!(all[0].time_of_day, TimeOfDay::Night);
        assert_eq!(Environment::find("study-desk").unwrap().time_of_day, TimeOfDay::Sunset);
        assert!(Environment::find("beach").is_none());
    }

    #[test]
    fn test_prompt_keywords() {
        assert_eq!(Environment::from_prompt("Rainy evening").id, "tokyo-cafe");
        assert_eq!(Environment::from_prompt("숲속의 아침").id, "forest-cabin");
        assert_eq!(Environment::from_prompt("late night STUDY session").id, "study-desk");
        assert_eq!(Environment::from_prompt("mountain sunrise").id, "mountain-view");
        assert_eq!(Environment::from_prompt("something calm").id, "cozy-room");
    }

    #[test]
    fn test_prompt_rules_in_order() {
        // cafe outranks forest
        assert_eq!(Environment::from_prompt("a cafe in the forest").id, "tokyo-cafe");
    }

    #[test]
    fn test_prompt_description() {
        let env = Environment::from_prompt("Quiet nature walk");
        assert_eq!(env.description, "AI: Quiet nature walk");
        assert_eq!(env.name, "Forest Cabin");
    }

    #[test]
    fn test_next_wraps() {
        let last = Environment::find("mountain-view").unwrap();
        assert_eq!(last.next(), Environment::default());
        assert_eq!(Environment::default().next().id, "tokyo-cafe");
    }
}
