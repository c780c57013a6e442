//! Stealth prose wrapping.
//!
//! Codewords are poured into sentence templates that read like ordinary
//! technical complaints. Nothing in the filler is a codeword, so
//! [`WordCodec::decode`](super::codec::WordCodec::decode) on the prose gives back
//! exactly the payload. There is no separate unwrap step.
//!
//! Generation runs as a small state machine:
//!
//! ```text
//! Remaining(n) --pick template--> Selected(t) --fill slots--> Remaining(n - slots(t))
//!      \-- n == 0 --> Done
//! ```
//!
//! When a picked template needs more slots than tokens remain, a single-slot
//! template is picked instead.

use std::ops::Range;

use rand::Rng;
use thiserror::Error;
use tracing::warn;

use super::codec::tokenize;
use super::vocabulary::Vocabulary;

/// Placeholder marking a codeword slot in a template.
pub const SLOT: &str = "{}";

/// Default chance of prefixing a sentence with a connector phrase.
pub const DEFAULT_CONNECTOR_PROBABILITY: f64 = 0.3;

/// Built-in templates. None of their words may be codewords.
pub const DEFAULT_TEMPLATES: &[&str] = &[
    "Honestly, I think the {} is causing the lag.",
    "Did you check if the {} configures the {} correctly?",
    "The documentation for {} says it depends on {} but that seems wrong.",
    "My logs are showing a weird fault in the {} tier.",
    "Why does the {} always break when I touch the {}?",
    "It is basically a {} issue, not an equipment problem.",
    "I rewrote the {} to improve the {} usage.",
    "The new update deprecated the {} handling.",
    "Can we talk about how bad the {} support is?",
    "Just use a {} wrapper around the {} and it should work.",
    "The {} velocity is bottlenecked by the {}.",
    "I suspect the {} is conflicting with the {}.",
    "Is there a reason the {} is not compatible with {}?",
    "The {} implementation in this project is terrible.",
    "Make sure to set the {} toggle before running the {}.",
    "We ended up replacing the {} with a custom {} last sprint.",
    "Not sure why, but the {} keeps timing out.",
    "Pretty sure the {} docs are outdated.",
    "Anyone else seeing the {} spike after the {} rollout?",
];

/// Built-in connector phrases. None of their words may be codewords.
pub const DEFAULT_CONNECTORS: &[&str] = &[
    "Anyway,",
    "Also,",
    "Not gonna lie,",
    "Side note:",
    "To be fair,",
    "Update:",
    "FWIW,",
    "In my experience,",
    "Quick question:",
];

/// Errors that can occur while building or running the stealth encoder.
#[derive(Error, Debug, PartialEq)]
pub enum StealthError {
    #[error("Filler word '{word}' in \"{phrase}\" collides with the vocabulary")]
    VocabularyCollision { word: String, phrase: String },

    #[error("Template \"{0}\" must have one or two slots")]
    InvalidTemplate(String),

    #[error("Template \"{0}\" has a slot touching a letter or another slot")]
    FusedSlot(String),

    #[error("Catalog needs at least one single-slot template")]
    NoSingleSlotTemplate,

    #[error("Connector probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
}

/// A sentence template with one or two codeword slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
    slots: usize,
}

impl Template {
    /// Parses a template, rejecting slots that would fuse with neighbouring text.
    ///
    /// A codeword glued to letters or to another codeword no longer tokenizes
    /// as itself and is lost on decode.
    pub fn parse(text: &str) -> Result<Self, StealthError> {
        let slots = text.matches(SLOT).count();
        if !(1..=2).contains(&slots) {
            return Err(StealthError::InvalidTemplate(text.to_string()));
        }
        let fused = text.match_indices(SLOT).any(|(pos, _)| {
            let before = &text[..pos];
            let after = &text[pos + SLOT.len()..];
            before.ends_with(SLOT)
                || after.starts_with(SLOT)
                || before.chars().next_back().is_some_and(|c| c.is_ascii_alphabetic())
                || after.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        });
        if fused {
            return Err(StealthError::FusedSlot(text.to_string()));
        }
        Ok(Self {
            text: text.to_string(),
            slots,
        })
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fills the slots left to right. `words.len()` must equal `slots()`.
    pub fn fill(&self, words: &[&str]) -> String {
        debug_assert_eq!(words.len(), self.slots);
        let mut out = String::with_capacity(self.text.len() + 16 * words.len());
        let mut rest = self.text.as_str();
        for word in words {
            match rest.find(SLOT) {
                Some(pos) => {
                    out.push_str(&rest[..pos]);
                    out.push_str(word);
                    rest = &rest[pos + SLOT.len()..];
                }
                None => break,
            }
        }
        out.push_str(rest);
        out
    }
}

/// Templates plus connector phrases, checked against a vocabulary.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
    single_slot: Vec<usize>,
    connectors: Vec<String>,
}

impl TemplateCatalog {
    /// Builds a catalog, rejecting any filler word that is also a codeword.
    ///
    /// A collision would make filler decode as payload, so callers should
    /// treat an error here as fatal at startup.
    pub fn new<S: AsRef<str>>(
        templates: &[S],
        connectors: &[S],
        vocab: &Vocabulary,
    ) -> Result<Self, StealthError> {
        let mut parsed = Vec::with_capacity(templates.len());
        for text in templates {
            let template = Template::parse(text.as_ref())?;
            check_disjoint(&template.text.replace(SLOT, " "), vocab)?;
            parsed.push(template);
        }

        let single_slot: Vec<usize> = parsed
            .iter()
            .enumerate()
            .filter(|(_, t)| t.slots == 1)
            .map(|(i, _)| i)
            .collect();
        if single_slot.is_empty() {
            return Err(StealthError::NoSingleSlotTemplate);
        }

        let mut phrases = Vec::with_capacity(connectors.len());
        for connector in connectors {
            check_disjoint(connector.as_ref(), vocab)?;
            phrases.push(connector.as_ref().to_string());
        }

        Ok(Self {
            templates: parsed,
            single_slot,
            connectors: phrases,
        })
    }

    /// The built-in catalog.
    pub fn standard(vocab: &Vocabulary) -> Result<Self, StealthError> {
        Self::new(DEFAULT_TEMPLATES, DEFAULT_CONNECTORS, vocab)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn connectors(&self) -> &[String] {
        &self.connectors
    }
}

fn check_disjoint(phrase: &str, vocab: &Vocabulary) -> Result<(), StealthError> {
    match tokenize(phrase).into_iter().find(|t| vocab.contains(t)) {
        Some(word) => {
            warn!(word = %word, "Stealth filler collides with vocabulary");
            Err(StealthError::VocabularyCollision {
                word,
                phrase: phrase.trim().to_string(),
            })
        }
        None => Ok(()),
    }
}

/// One planned sentence: which template, optional connector, and the token range it consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentencePlan {
    pub template: usize,
    pub connector: Option<usize>,
    pub tokens: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanState {
    Remaining(usize),
    Selected { template: usize, remaining: usize },
    Done,
}

/// Wraps codeword sequences in filler prose.
#[derive(Debug, Clone, Copy)]
pub struct StealthEncoder<'c> {
    catalog: &'c TemplateCatalog,
    connector_probability: f64,
}

impl<'c> StealthEncoder<'c> {
    pub fn new(catalog: &'c TemplateCatalog, connector_probability: f64) -> Result<Self, StealthError> {
        if !(0.0..=1.0).contains(&connector_probability) {
            return Err(StealthError::InvalidProbability(connector_probability));
        }
        Ok(Self {
            catalog,
            connector_probability,
        })
    }

    /// Picks a template for `remaining` tokens, falling back to a
    /// single-slot template when the pick needs more slots than remain.
    pub fn select_template<R: Rng + ?Sized>(&self, remaining: usize, rng: &mut R) -> usize {
        let templates = &self.catalog.templates;
        let pick = rng.gen_range(0..templates.len());
        if templates[pick].slots <= remaining {
            return pick;
        }
        // single_slot is non-empty by construction
        self.catalog.single_slot[rng.gen_range(0..self.catalog.single_slot.len())]
    }

    /// Plans the sentences for `token_count` tokens.
    pub fn plan<R: Rng + ?Sized>(&self, token_count: usize, rng: &mut R) -> Vec<SentencePlan> {
        let mut plans = Vec::new();
        let mut cursor = 0;
        let mut state = PlanState::Remaining(token_count);

        loop {
            state = match state {
                PlanState::Remaining(0) => PlanState::Done,
                PlanState::Remaining(remaining) => PlanState::Selected {
                    template: self.select_template(remaining, rng),
                    remaining,
                },
                PlanState::Selected { template, remaining } => {
                    let connector = self.pick_connector(rng);
                    let slots = self.catalog.templates[template].slots;
                    plans.push(SentencePlan {
                        template,
                        connector,
                        tokens: cursor..cursor + slots,
                    });
                    cursor += slots;
                    PlanState::Remaining(remaining - slots)
                }
                PlanState::Done => break,
            };
        }

        plans
    }

    /// Wraps tokens into prose using the supplied randomness.
    pub fn wrap_with_rng<R: Rng + ?Sized>(&self, tokens: &[&str], rng: &mut R) -> String {
        self.plan(tokens.len(), rng)
            .iter()
            .map(|plan| self.render(plan, tokens))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Wraps tokens into prose using thread-local randomness.
    pub fn wrap(&self, tokens: &[&str]) -> String {
        self.wrap_with_rng(tokens, &mut rand::thread_rng())
    }

    fn pick_connector<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.catalog.connectors.is_empty() || !rng.gen_bool(self.connector_probability) {
            return None;
        }
        Some(rng.gen_range(0..self.catalog.connectors.len()))
    }

    fn render(&self, plan: &SentencePlan, tokens: &[&str]) -> String {
        let sentence = self.catalog.templates[plan.template].fill(&tokens[plan.tokens.clone()]);
        match plan.connector {
            Some(c) => format!("{} {}", self.catalog.connectors[c], lower_first(&sentence)),
            None => sentence,
        }
    }
}

/// Lowercases the first letter unless the sentence opens with "I ".
fn lower_first(sentence: &str) -> String {
    if sentence.starts_with("I ") {
        return sentence.to_string();
    }
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::codec::WordCodec;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn setup() -> (Vocabulary, TemplateCatalog) {
        let vocab = Vocabulary::standard();
        let catalog = TemplateCatalog::standard(&vocab).unwrap();
        (vocab, catalog)
    }

    #[test]
    fn test_standard_catalog_is_disjoint() {
        let (_, catalog) = setup();
        assert_eq!(catalog.templates().len(), DEFAULT_TEMPLATES.len());
        assert_eq!(catalog.connectors().len(), DEFAULT_CONNECTORS.len());
    }

    #[test]
    fn test_collision_detected() {
        let vocab = Vocabulary::standard();
        let result = TemplateCatalog::new(
            &["The new update deprecated the {} logic."],
            &[],
            &vocab,
        );
        assert_eq!(
            result.unwrap_err(),
            StealthError::VocabularyCollision {
                word: "logic".to_string(),
                phrase: "The new update deprecated the   logic.".to_string(),
            }
        );

        let result = TemplateCatalog::new(&["Fine {} here."], &["Debug:"], &vocab);
        assert!(matches!(
            result,
            Err(StealthError::VocabularyCollision { ref word, .. }) if word == "debug"
        ));
    }

    #[test]
    fn test_template_validation() {
        assert!(Template::parse("no slots").is_err());
        assert!(Template::parse("{} {} {}").is_err());
        assert_eq!(Template::parse("a {} b {}").unwrap().slots(), 2);

        let vocab = Vocabulary::standard();
        assert_eq!(
            TemplateCatalog::new(&["both {} and {}"], &[], &vocab).unwrap_err(),
            StealthError::NoSingleSlotTemplate
        );
    }

    #[test]
    fn test_slot_must_stand_alone() {
        for text in ["The {}s are slow.", "{}{}", "re{} again"] {
            assert_eq!(
                Template::parse(text).unwrap_err(),
                StealthError::FusedSlot(text.to_string())
            );
        }

        // Punctuation and digits split tokens, so these stay decodable
        for text in ["({}) broke", "the {}'s fault", "the {}-{} link", "v2{} rollout"] {
            assert!(Template::parse(text).is_ok(), "{}", text);
        }

        let vocab = Vocabulary::standard();
        assert!(matches!(
            TemplateCatalog::new(&["The {}s are slow."], &[], &vocab),
            Err(StealthError::FusedSlot(_))
        ));
    }

    #[test]
    fn test_template_fill_order() {
        let t = Template::parse("first {} then {}.").unwrap();
        assert_eq!(t.fill(&["agent", "raw"]), "first agent then raw.");
    }

    #[test]
    fn test_fallback_to_single_slot() {
        let vocab = Vocabulary::standard();
        let catalog =
            TemplateCatalog::new(&["only {} and {} here", "just {} here"], &[], &vocab).unwrap();
        let encoder = StealthEncoder::new(&catalog, 0.0).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(7);

        for _ in 0..100 {
            let idx = encoder.select_template(1, &mut rng);
            assert_eq!(catalog.templates()[idx].slots(), 1);
        }

        let picks: std::collections::HashSet<usize> =
            (0..100).map(|_| encoder.select_template(2, &mut rng)).collect();
        assert_eq!(picks.len(), 2);
    }

    #[test]
    fn test_plan_consumes_every_token_in_order() {
        let (_, catalog) = setup();
        let encoder = StealthEncoder::new(&catalog, DEFAULT_CONNECTOR_PROBABILITY).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        for count in 0..60 {
            let plans = encoder.plan(count, &mut rng);
            let mut cursor = 0;
            for plan in &plans {
                assert_eq!(plan.tokens.start, cursor);
                assert_eq!(plan.tokens.len(), catalog.templates()[plan.template].slots());
                cursor = plan.tokens.end;
            }
            assert_eq!(cursor, count);
        }
    }

    #[test]
    fn test_wrap_decodes_back() {
        let (vocab, catalog) = setup();
        let codec = WordCodec::new(&vocab);
        let encoder = StealthEncoder::new(&catalog, 0.5).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        let data: Vec<u8> = (0..=255).collect();
        let words = codec.encode_words(&data);
        let prose = encoder.wrap_with_rng(&words, &mut rng);

        assert_eq!(codec.decode(&prose), data);
    }

    #[test]
    fn test_wrap_is_reproducible_with_seed() {
        let (vocab, catalog) = setup();
        let codec = WordCodec::new(&vocab);
        let encoder = StealthEncoder::new(&catalog, DEFAULT_CONNECTOR_PROBABILITY).unwrap();
        let words = codec.encode_words(b"reproducible");

        let a = encoder.wrap_with_rng(&words, &mut ChaCha20Rng::seed_from_u64(9));
        let b = encoder.wrap_with_rng(&words, &mut ChaCha20Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_connector_probability_bounds() {
        let (vocab, catalog) = setup();
        assert!(StealthEncoder::new(&catalog, 1.5).is_err());
        assert!(StealthEncoder::new(&catalog, -0.1).is_err());

        let codec = WordCodec::new(&vocab);
        let words = codec.encode_words(&[1, 2, 3, 4, 5, 6]);
        let encoder = StealthEncoder::new(&catalog, 1.0).unwrap();
        let plans = encoder.plan(words.len(), &mut ChaCha20Rng::seed_from_u64(3));
        assert!(plans.iter().all(|p| p.connector.is_some()));
    }

    #[test]
    fn test_empty_input_produces_empty_prose() {
        let (_, catalog) = setup();
        let encoder = StealthEncoder::new(&catalog, 0.3).unwrap();
        assert_eq!(encoder.wrap(&[]), "");
    }

    #[test]
    fn test_lower_first() {
        assert_eq!(lower_first("The thing"), "the thing");
        assert_eq!(lower_first("I rewrote it"), "I rewrote it");
        assert_eq!(lower_first(""), "");
    }
}
