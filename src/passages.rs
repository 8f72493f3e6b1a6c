use include_dir::{include_dir, Dir};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::Deserialize;

use crate::error::{Result, SessionError};

static TEXT_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/texts");

pub const DEFAULT_PASSAGE_SET: &str = "english";

/// Supplies the reference text for each new session.
pub trait TextProvider {
    fn next_text(&mut self) -> String;
}

impl<F> TextProvider for F
where
    F: FnMut() -> String,
{
    fn next_text(&mut self) -> String {
        self()
    }
}

/// A named list of passages embedded in the binary
#[derive(Deserialize, Clone, Debug)]
pub struct PassageSet {
    pub name: String,
    pub size: u32,
    pub passages: Vec<String>,
}

impl PassageSet {
    pub fn load(name: &str) -> Result<Self> {
        let file = TEXT_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| SessionError::UnknownPassageSet(name.to_string()))?;

        let mut set: PassageSet = serde_json::from_slice(file.contents())?;
        set.passages.retain(|p| !p.trim().is_empty());

        if set.passages.is_empty() {
            return Err(SessionError::EmptyPassageSet(set.name));
        }

        Ok(set)
    }

    /// Names of every embedded passage set, sorted.
    pub fn available() -> Vec<String> {
        let mut names: Vec<String> = TEXT_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .filter_map(|stem| stem.to_str())
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }
}

/// Picks a random passage from a set on every request
#[derive(Debug)]
pub struct PassageProvider {
    set: PassageSet,
    rng: StdRng,
}

impl PassageProvider {
    pub fn new(set: PassageSet) -> Self {
        Self {
            set,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(set: PassageSet, seed: u64) -> Self {
        Self {
            set,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_set_name(name: &str) -> Result<Self> {
        Ok(Self::new(PassageSet::load(name)?))
    }

    pub fn set(&self) -> &PassageSet {
        &self.set
    }
}

impl TextProvider for PassageProvider {
    fn next_text(&mut self) -> String {
        self.set
            .passages
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }
}

/// Always hands out the same text, used for custom prompts
#[derive(Clone, Debug)]
pub struct FixedText(pub String);

impl FixedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl TextProvider for FixedText {
    fn next_text(&mut self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn loads_default_set() {
        let set = PassageSet::load(DEFAULT_PASSAGE_SET).unwrap();

        assert_eq!(set.name, "english");
        assert_eq!(set.passages.len(), 5);
        assert!(set.passages.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn unknown_set_is_an_error() {
        assert_matches!(
            PassageSet::load("klingon"),
            Err(SessionError::UnknownPassageSet(name)) if name == "klingon"
        );
    }

    #[test]
    fn available_lists_embedded_sets() {
        let names = PassageSet::available();
        assert!(names.contains(&"english".to_string()));
        assert!(names.contains(&"pangrams".to_string()));
    }

    #[test]
    fn passage_deserialization() {
        let json_data = r#"
        {
            "name": "test",
            "size": 2,
            "passages": ["one two", "three four"]
        }
        "#;

        let set: PassageSet = serde_json::from_str(json_data).unwrap();

        assert_eq!(set.name, "test");
        assert_eq!(set.size, 2);
        assert_eq!(set.passages[1], "three four");
    }

    #[test]
    fn provider_only_returns_passages_from_its_set() {
        let set = PassageSet::load("pangrams").unwrap();
        let mut provider = PassageProvider::seeded(set.clone(), 7);

        for _ in 0..20 {
            let text = provider.next_text();
            assert!(set.passages.contains(&text));
        }
    }

    #[test]
    fn seeded_providers_agree() {
        let set = PassageSet::load(DEFAULT_PASSAGE_SET).unwrap();
        let mut a = PassageProvider::seeded(set.clone(), 42);
        let mut b = PassageProvider::seeded(set, 42);

        let from_a: Vec<String> = (0..5).map(|_| a.next_text()).collect();
        let from_b: Vec<String> = (0..5).map(|_| b.next_text()).collect();
        assert_eq!(from_a, from_b);
    }

    #[test]
    fn fixed_text_and_closures_are_providers() {
        let mut fixed = FixedText::new("cat");
        assert_eq!(fixed.next_text(), "cat");
        assert_eq!(fixed.next_text(), "cat");

        let mut calls = 0;
        let mut counting = || {
            calls += 1;
            format!("text {calls}")
        };
        assert_eq!(counting.next_text(), "text 1");
        assert_eq!(counting.next_text(), "text 2");
    }
}
