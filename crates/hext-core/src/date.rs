//! Local answer to "what day is it today?" in the asker's language.

use crate::canned::normalize;
use chrono::{Locale, NaiveDate};

/// Languages the date shortcut can answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLanguage {
    Spanish,
    English,
    Portuguese,
}

impl DateLanguage {
    fn locale(self) -> Locale {
        match self {
            DateLanguage::Spanish => Locale::es_ES,
            DateLanguage::English => Locale::en_US,
            DateLanguage::Portuguese => Locale::pt_BR,
        }
    }

    fn sentence(self, formatted: &str) -> String {
        match self {
            DateLanguage::Spanish => format!("Hoy es {formatted}."),
            DateLanguage::English => format!("Today is {formatted}."),
            DateLanguage::Portuguese => format!("Hoje é {formatted}."),
        }
    }
}

const QUESTIONS: &[(&str, DateLanguage)] = &[
    ("qué día es hoy", DateLanguage::Spanish),
    ("que dia es hoy", DateLanguage::Spanish),
    ("qué fecha es hoy", DateLanguage::Spanish),
    ("que fecha es hoy", DateLanguage::Spanish),
    ("cuál es la fecha de hoy", DateLanguage::Spanish),
    ("cual es la fecha de hoy", DateLanguage::Spanish),
    ("que dia é hoje", DateLanguage::Portuguese),
    ("que dia e hoje", DateLanguage::Portuguese),
    ("qual é a data de hoje", DateLanguage::Portuguese),
    ("qual a data de hoje", DateLanguage::Portuguese),
    ("what day is it", DateLanguage::English),
    ("what day is it today", DateLanguage::English),
    ("what day is today", DateLanguage::English),
    ("what's the date today", DateLanguage::English),
    ("what is the date today", DateLanguage::English),
    ("what's today's date", DateLanguage::English),
];

/// Detects a date question and returns the language it was asked in.
///
/// The question has to close the message, so a short lead-in ("oye, ...")
/// is accepted but trailing words ("... mañana", "... en Tokio") are not.
pub fn detect_date_question(text: &str) -> Option<DateLanguage> {
    let words = normalize(text)
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '¿' | '?' | '¡' | '!'))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    QUESTIONS
        .iter()
        .find(|(question, _)| ends_with_question(&words, question))
        .map(|(_, language)| *language)
}

fn ends_with_question(words: &str, question: &str) -> bool {
    match words.strip_suffix(question) {
        Some(lead_in) => lead_in.is_empty() || lead_in.ends_with(' '),
        None => false,
    }
}

/// Formats `today` as a full sentence in `language`.
pub fn format_today(today: NaiveDate, language: DateLanguage) -> String {
    let formatted = today
        .format_localized("%A, %-d %B %Y", language.locale())
        .to_string();
    language.sentence(&formatted)
}

/// Answers a date question for the given day, or `None` if `text` is not one.
pub fn date_reply(text: &str, today: NaiveDate) -> Option<String> {
    detect_date_question(text).map(|language| format_today(today, language))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_detects_languages() {
        assert_eq!(
            detect_date_question("¿Qué día es hoy?"),
            Some(DateLanguage::Spanish)
        );
        assert_eq!(
            detect_date_question("What day is it today?"),
            Some(DateLanguage::English)
        );
        assert_eq!(
            detect_date_question("Que dia é hoje?"),
            Some(DateLanguage::Portuguese)
        );
        assert_eq!(detect_date_question("¿Qué hora es?"), None);
    }

    #[test]
    fn test_question_must_end_the_message() {
        assert_eq!(
            detect_date_question("Oye, ¿qué día es hoy?"),
            Some(DateLanguage::Spanish)
        );
        assert_eq!(detect_date_question("what day is it tomorrow?"), None);
        assert_eq!(detect_date_question("¿Qué día es hoy en Tokio?"), None);
        assert_eq!(detect_date_question("Explica qué fecha es hoy según el calendario maya"), None);
    }

    #[test]
    fn test_spanish_reply() {
        let reply = date_reply("oye, ¿qué día es hoy?", day()).unwrap();
        assert!(reply.starts_with("Hoy es "));
        assert!(reply.contains("viernes"));
        assert!(reply.contains("octubre"));
        assert!(reply.contains("2026"));
    }

    #[test]
    fn test_english_reply() {
        let reply = date_reply("what day is it", day()).unwrap();
        assert_eq!(reply, "Today is Friday, 16 October 2026.");
    }

    #[test]
    fn test_non_date_text() {
        assert!(date_reply("Hola", day()).is_none());
    }
}
