//! Static, read-only code → text catalogs, one pair per API generation.
//!
//! Each generation carries two independent tables: API-level error codes and
//! message delivery-state codes. Codes are never shared across generations.
//! Looking up an unknown code returns `None`; callers must treat a missing
//! entry as a valid outcome, not an error.

pub mod classic;
pub mod rest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Language of resolved catalog text.
pub enum Language {
    #[default]
    English,
    Persian,
}

/// Text for the per-recipient success sentinel (outcome code `0`).
pub fn success_text(lang: Language) -> &'static str {
    match lang {
        Language::English => "success",
        Language::Persian => "ارسال شد",
    }
}

pub(crate) fn pick(lang: Language, en: &'static str, fa: &'static str) -> &'static str {
    match lang {
        Language::English => en,
        Language::Persian => fa,
    }
}
