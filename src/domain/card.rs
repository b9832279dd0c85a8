use std::collections::HashSet;

use scraper::{ElementRef, Selector};

use super::fragment::{normalize_text, text_content};

/// Decides whether a fragment is a connection card.
pub trait CardDetector {
    fn matches(&self, fragment: &ElementRef<'_>) -> bool;
}

/// A card is any fragment carrying every one of the required class tags.
#[derive(Debug, Clone)]
pub struct TagSignature {
    required: Vec<String>,
}

impl TagSignature {
    pub fn new(required: Vec<String>) -> Self {
        TagSignature { required }
    }
}

impl CardDetector for TagSignature {
    fn matches(&self, fragment: &ElementRef<'_>) -> bool {
        let tags: HashSet<&str> = fragment.value().classes().collect();
        self.required.iter().all(|tag| tags.contains(tag.as_str()))
    }
}

/// A card is eligible when its action region holds a control whose text
/// contains the keyword.
#[derive(Debug, Clone)]
pub struct EligibilityRule {
    pub action_region: Selector,
    pub action_control: Selector,
    keyword: String,
}

impl EligibilityRule {
    pub fn new(action_region: Selector, action_control: Selector, keyword: &str) -> Self {
        EligibilityRule {
            action_region,
            action_control,
            keyword: keyword.to_lowercase(),
        }
    }

    pub fn is_eligible(&self, card: &ElementRef<'_>) -> bool {
        let Some(region) = card.select(&self.action_region).next() else {
            return false;
        };

        region.select(&self.action_control).any(|control| {
            normalize_text(&text_content(&control))
                .to_lowercase()
                .contains(&self.keyword)
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Card<'a> {
    pub fragment: ElementRef<'a>,
    pub eligible: bool,
}

/// Keeps the fragments that are cards, in document order. With
/// `eligibility_required` set, cards without the target action are dropped;
/// otherwise they are kept and marked.
pub fn classify_cards<'a>(
    fragments: impl IntoIterator<Item = ElementRef<'a>>,
    detector: &dyn CardDetector,
    eligibility: &EligibilityRule,
    eligibility_required: bool,
) -> Vec<Card<'a>> {
    fragments
        .into_iter()
        .filter(|fragment| detector.matches(fragment))
        .map(|fragment| Card {
            eligible: eligibility.is_eligible(&fragment),
            fragment,
        })
        .filter(|card| card.eligible || !eligibility_required)
        .collect()
}
