//! Pre-written replies for greetings and thanks.
//!
//! These short messages are answered locally without contacting the model.

use rand::Rng;
use rand::seq::SliceRandom;

/// How a dictionary key is compared against the user's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The whole normalized text must equal the key
    Exact,
    /// The normalized text must start with the key as a whole word
    Prefix,
}

/// One dictionary entry: alternative spellings and the replies to pick from.
#[derive(Debug, Clone, Copy)]
pub struct CannedEntry {
    pub keys: &'static [&'static str],
    pub kind: MatchKind,
    pub replies: &'static [&'static str],
}

const BUILTIN: &[CannedEntry] = &[
    CannedEntry {
        keys: &["hola", "holi", "hey", "buenas"],
        kind: MatchKind::Exact,
        replies: &[
            "¡Hola! Soy Tigre, el asistente de HEX. ¿En qué te puedo ayudar hoy?",
            "¡Hola! ¿Qué tienes en mente?",
            "¡Hey! Aquí Tigre. Cuéntame, ¿qué necesitas?",
        ],
    },
    CannedEntry {
        keys: &["buenos días", "buenos dias", "buen día", "buen dia"],
        kind: MatchKind::Exact,
        replies: &[
            "¡Buenos días! ¿En qué te ayudo hoy?",
            "¡Buen día! ¿Qué vamos a hacer hoy?",
        ],
    },
    CannedEntry {
        keys: &["buenas tardes"],
        kind: MatchKind::Exact,
        replies: &["¡Buenas tardes! ¿En qué te puedo ayudar?"],
    },
    CannedEntry {
        keys: &["buenas noches"],
        kind: MatchKind::Exact,
        replies: &["¡Buenas noches! ¿Qué necesitas?"],
    },
    CannedEntry {
        keys: &["muchas gracias", "gracias", "mil gracias"],
        kind: MatchKind::Prefix,
        replies: &[
            "¡Con gusto! Si necesitas algo más, aquí estoy.",
            "¡De nada! Fue un placer ayudarte.",
            "¡Para eso estoy!",
        ],
    },
    CannedEntry {
        keys: &["adiós", "adios", "chao", "hasta luego", "nos vemos"],
        kind: MatchKind::Exact,
        replies: &["¡Hasta luego! Vuelve cuando quieras.", "¡Chao! Que te vaya bien."],
    },
    CannedEntry {
        keys: &["cómo estás", "como estas", "qué tal", "que tal"],
        kind: MatchKind::Exact,
        replies: &[
            "¡Muy bien, gracias por preguntar! ¿Y tú? ¿En qué te ayudo?",
            "¡Todo en orden por aquí! ¿Qué necesitas?",
        ],
    },
];

/// Lowercases, trims and drops surrounding punctuation.
pub fn normalize(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let trimmed = lower.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '!' | '¡' | '?' | '¿' | '.' | ',' | ';' | ':')
    });
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn key_matches(normalized: &str, key: &str, kind: MatchKind) -> bool {
    match kind {
        MatchKind::Exact => normalized == key,
        MatchKind::Prefix => match normalized.strip_prefix(key) {
            Some(rest) => rest.is_empty() || rest.starts_with(' '),
            None => false,
        },
    }
}

/// The canned-response dictionary.
#[derive(Debug, Clone)]
pub struct CannedResponses {
    entries: Vec<CannedEntry>,
}

impl Default for CannedResponses {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CannedResponses {
    /// Dictionary with the built-in Spanish greetings.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN.to_vec(),
        }
    }

    /// Dictionary that never matches.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Finds the entry matching `text`, if any.
    pub fn lookup(&self, text: &str) -> Option<&CannedEntry> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| {
            entry
                .keys
                .iter()
                .any(|key| key_matches(&normalized, key, entry.kind))
        })
    }

    /// Picks a reply for `text` using the given random source.
    pub fn respond_with<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Option<String> {
        self.lookup(text)
            .and_then(|entry| entry.replies.choose(rng))
            .map(|reply| reply.to_string())
    }

    /// Picks a reply for `text`.
    pub fn respond(&self, text: &str) -> Option<String> {
        self.respond_with(text, &mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  ¡Hola!  "), "hola");
        assert_eq!(normalize("¿Cómo   estás?"), "cómo estás");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_exact_greeting_matches() {
        let canned = CannedResponses::builtin();
        let reply = canned.respond("Hola").unwrap();
        let entry = canned.lookup("hola").unwrap();
        assert!(entry.replies.contains(&reply.as_str()));
    }

    #[test]
    fn test_exact_entry_does_not_match_longer_text() {
        let canned = CannedResponses::builtin();
        assert!(canned.lookup("hola, ¿cuál es el clima en Managua?").is_none());
    }

    #[test]
    fn test_prefix_entry_matches_whole_word() {
        let canned = CannedResponses::builtin();
        assert!(canned.lookup("Gracias por todo").is_some());
        assert!(canned.lookup("muchas gracias!").is_some());
        assert!(canned.lookup("graciasss").is_none());
    }

    #[test]
    fn test_question_goes_to_model() {
        let canned = CannedResponses::builtin();
        assert!(canned.respond("¿Cuál es el clima en Managua?").is_none());
        assert!(canned.respond("   ").is_none());
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let canned = CannedResponses::builtin();
        let a = canned.respond_with("gracias", &mut StdRng::seed_from_u64(7));
        let b = canned.respond_with("gracias", &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dictionary_never_matches() {
        assert!(CannedResponses::empty().respond("hola").is_none());
    }
}
