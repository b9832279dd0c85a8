use scraper::{ElementRef, Html, Selector};

use crate::{configuration::ExtractionSettings, error::ScrapeError};

use super::{
    card::{classify_cards, CardDetector, EligibilityRule, TagSignature},
    connection::{ConnectionRecord, FieldBinding, GenericField},
    fragment::{extract_value, label_text, normalize_text, text_content},
};

/// Compiled form of [`ExtractionSettings`].
pub struct ExtractionRules {
    pub cards: Selector,
    pub detector: Box<dyn CardDetector>,
    pub eligibility: EligibilityRule,
    pub eligibility_required: bool,
    pub field: Selector,
    pub label: Selector,
    pub emphasis: Selector,
    pub identity_marker: String,
    pub binding: FieldBinding,
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

impl ExtractionRules {
    pub fn from_settings(settings: &ExtractionSettings) -> Result<Self, ScrapeError> {
        Ok(ExtractionRules {
            cards: parse_selector(&settings.card_selector)?,
            detector: Box::new(TagSignature::new(settings.required_tags.clone())),
            eligibility: EligibilityRule::new(
                parse_selector(&settings.action_region)?,
                parse_selector(&settings.action_control)?,
                &settings.eligibility_keyword,
            ),
            eligibility_required: settings.eligibility_required,
            field: parse_selector(&settings.field_selector)?,
            label: parse_selector(&settings.label_selector)?,
            emphasis: parse_selector(&settings.emphasis_selector)?,
            identity_marker: settings.identity_marker.to_lowercase(),
            binding: settings.binding,
        })
    }
}

/// Parses a page snapshot and builds one record per card that survives
/// classification. Indices follow document order among the surviving cards.
pub fn extract_records(snapshot: &str, rules: &ExtractionRules) -> Vec<ConnectionRecord> {
    let document = Html::parse_document(snapshot);
    let candidates = document.select(&rules.cards);

    classify_cards(
        candidates,
        rules.detector.as_ref(),
        &rules.eligibility,
        rules.eligibility_required,
    )
    .into_iter()
    .enumerate()
    .map(|(index, card)| {
        let mut record = build_record(&card.fragment, index, rules);
        if !rules.eligibility_required {
            record.eligible = Some(card.eligible);
        }
        record
    })
    .collect()
}

pub fn build_record(card: &ElementRef<'_>, index: usize, rules: &ExtractionRules) -> ConnectionRecord {
    let mut record = ConnectionRecord::new(index);

    let identity = find_identity_fragment(card, rules);
    if let Some(identity) = identity {
        record.connection_name = extract_value(&identity, &rules.label);
        record.phone_number = sibling_value(&identity);
    }

    let generic: Vec<ElementRef<'_>> = card
        .select(&rules.field)
        .filter(|fragment| Some(fragment.id()) != identity.map(|i| i.id()))
        .filter(|fragment| fragment.select(&rules.emphasis).next().is_some())
        .collect();

    bind_generic_fields(&mut record, &generic, rules);

    record
}

/// First label/value fragment whose label mentions the identity marker.
fn find_identity_fragment<'a>(
    card: &ElementRef<'a>,
    rules: &ExtractionRules,
) -> Option<ElementRef<'a>> {
    card.select(&rules.field).find(|fragment| {
        label_text(fragment, &rules.label)
            .map(|label| label.trim().to_lowercase().contains(&rules.identity_marker))
            .unwrap_or(false)
    })
}

/// Text of the next element sibling, if it is the same kind of fragment.
fn sibling_value(fragment: &ElementRef<'_>) -> Option<String> {
    let sibling = fragment.next_siblings().find_map(ElementRef::wrap)?;
    if sibling.value().name() != fragment.value().name() {
        return None;
    }

    let text = normalize_text(&text_content(&sibling));
    match text.is_empty() {
        true => None,
        false => Some(text),
    }
}

fn bind_generic_fields(
    record: &mut ConnectionRecord,
    fragments: &[ElementRef<'_>],
    rules: &ExtractionRules,
) {
    let mut taken = [false; GenericField::ORDER.len()];
    let mut unmatched = Vec::new();

    for fragment in fragments {
        let label = label_text(fragment, &rules.emphasis)
            .map(|l| normalize_text(&l))
            .unwrap_or_default();
        let value = extract_value(fragment, &rules.emphasis);

        let matched = match rules.binding {
            FieldBinding::Keyword => GenericField::from_label(&label),
            FieldBinding::Positional => None,
        };

        match matched {
            Some(field) if !taken[field.position()] => {
                taken[field.position()] = true;
                record.set(field, value);
            }
            _ => unmatched.push((label, value)),
        }
    }

    for (label, value) in unmatched {
        let free = GenericField::ORDER
            .into_iter()
            .find(|field| !taken[field.position()]);

        match free {
            Some(field) => {
                taken[field.position()] = true;
                if rules.binding == FieldBinding::Keyword {
                    record
                        .binding_notes
                        .push(format!("`{}` bound to {} by position", label, field.as_str()));
                }
                record.set(field, value);
            }
            None => {
                record
                    .binding_notes
                    .push(format!("`{}` ignored, all fields already bound", label));
            }
        }
    }

    if !record.binding_notes.is_empty() {
        log::debug!(
            "Card {} field binding notes: {:?}",
            record.index,
            record.binding_notes
        );
    }
}
