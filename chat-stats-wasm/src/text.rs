use once_cell::sync::OnceCell;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use stopwords::{Language, Spark, Stopwords};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

// Extras seen in WhatsApp exports that should be filtered along with stopwords.
pub(crate) const WHATSAPP_EXTRAS: [&str; 12] = [
    "media",
    "omitted",
    "image",
    "audio",
    "video",
    "sticker",
    "gif",
    "deleted",
    "edited",
    "missed",
    "voice",
    "call",
];

// Bare gender signs left behind once ZWJ sequences are split apart.
const GENDER_SIGNS: [&str; 2] = ["\u{2640}", "\u{2642}"];

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}

pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| !is_invisible(*c)).nfkd().collect()
}

fn boilerplate_res() -> &'static [Regex] {
    static RES: OnceCell<Vec<Regex>> = OnceCell::new();
    RES.get_or_init(|| {
        [
            r"(?i)<Media omitted>",
            r"(?i)<This message was edited>",
            r"(?i)This message was deleted",
            r"(?i)live location shared",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("boilerplate regex"))
        .collect()
    })
}

fn non_word_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}'\-]").expect("non-word regex"))
}

fn emoji_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        // One pictograph plus any trailing presentation selector or skin tone.
        Regex::new(r"\p{Extended_Pictographic}[\x{FE0F}\x{1F3FB}-\x{1F3FF}]*").expect("emoji regex")
    })
}

pub(crate) fn strip_boilerplate(body: &str) -> Cow<'_, str> {
    let mut cleaned = Cow::Borrowed(body);
    for re in boilerplate_res() {
        if re.is_match(&cleaned) {
            cleaned = Cow::Owned(re.replace_all(&cleaned, "").into_owned());
        }
    }
    cleaned
}

pub(crate) fn contains_emoji(token: &str) -> bool {
    emoji_re().is_match(token)
}

pub fn tokenize(body: &str, skip_emojis: bool) -> Vec<String> {
    let cleaned = strip_boilerplate(body);
    cleaned
        .split_whitespace()
        .filter_map(|raw| {
            let lower = raw.to_lowercase();
            let word = non_word_re().replace_all(&lower, "");
            if word.is_empty() || (skip_emojis && contains_emoji(&word)) {
                None
            } else {
                Some(word.into_owned())
            }
        })
        .collect()
}

pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    let n = n.max(1);
    if tokens.len() < n {
        return Vec::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

// Keys drop U+FE0F so text and emoji presentation of one symbol count together.
pub fn extract_emojis(body: &str) -> Vec<String> {
    emoji_re()
        .find_iter(body)
        .map(|m| m.as_str().replace('\u{FE0F}', ""))
        .filter(|e| !GENDER_SIGNS.contains(&e.as_str()))
        .collect()
}

pub(crate) fn grapheme_len(body: &str) -> usize {
    body.graphemes(true).count()
}

pub(crate) fn stopwords_set() -> &'static HashSet<&'static str> {
    static STOPWORDS: OnceCell<HashSet<&'static str>> = OnceCell::new();
    STOPWORDS.get_or_init(|| {
        let mut set: HashSet<&'static str> = Spark::stopwords(Language::English)
            .unwrap_or_default()
            .iter()
            .copied()
            .collect();
        for extra in WHATSAPP_EXTRAS {
            set.insert(extra);
        }
        set
    })
}
