use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::text::normalize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub timestamp: NaiveDateTime,
    pub sender: Option<String>,
    pub body: String,
}

impl Message {
    pub fn user(timestamp: NaiveDateTime, sender: &str, body: &str) -> Self {
        Self {
            timestamp,
            sender: Some(sender.to_string()),
            body: body.to_string(),
        }
    }

    pub fn system(timestamp: NaiveDateTime, body: &str) -> Self {
        Self {
            timestamp,
            sender: None,
            body: body.to_string(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.sender.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedHeader {
    pub line: usize,
    pub date: String,
    pub time: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedChat {
    pub messages: Vec<Message>,
    pub skipped: Vec<SkippedHeader>,
}

impl ParsedChat {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn non_empty(self) -> Result<Self> {
        if self.messages.is_empty() {
            Err(ChatError::UnparseableInput {
                skipped: self.skipped.len(),
            })
        } else {
            Ok(self)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<'a> {
    pub sender: Option<&'a str>,
    pub body: &'a str,
}

pub trait SenderClassifier {
    fn classify<'a>(&self, block: &'a str) -> Classified<'a>;
}

// Text before the first colon is the sender, provided it is non-empty and
// on the same line. A display name containing a colon, or a notice with an
// early colon, is misread; this is a heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColonSplit;

impl SenderClassifier for ColonSplit {
    fn classify<'a>(&self, block: &'a str) -> Classified<'a> {
        let block = block.trim();
        if let Some(idx) = block.find(':') {
            let head = &block[..idx];
            let name = head.trim();
            if !name.is_empty() && !head.contains(['\n', '\r']) {
                return Classified {
                    sender: Some(name),
                    body: block[idx + 1..].trim(),
                };
            }
        }
        Classified {
            sender: None,
            body: block,
        }
    }
}

fn re_header() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?mx)
            ^\[?
            (?P<date>[0-9]{1,2}[/.\-][0-9]{1,2}[/.\-][0-9]{2,4}|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2})
            ,?[\ \t]+
            (?P<time>[0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?(?:[\ \t]?[AaPp]\.?[\ \t]?[Mm]\.?)?)
            (?:\][\ \t]*|[\ \t]*[\-\x{2013}][\ \t]*)
            ",
        )
        .expect("valid header regex")
    })
}

fn re_time() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<h>[0-9]{1,2}):(?P<m>[0-9]{2})(?::(?P<s>[0-9]{2}))?\s*(?:(?P<ampm>[AaPp])\.?\s*[Mm]\.?)?$",
        )
        .expect("valid time regex")
    })
}

// chrono's `%y` pivots at 1970; export years are always 20xx.
fn widen_year(date: &str, sep: char) -> Result<String> {
    let Some((head, year)) = date.rsplit_once(sep) else {
        return Err(ChatError::malformed(date, "", "expected three date fields"));
    };
    match year.len() {
        2 => Ok(format!("{head}{sep}20{year}")),
        4 => Ok(date.to_string()),
        _ => Err(ChatError::malformed(date, "", "year must have 2 or 4 digits")),
    }
}

fn resolve_date(date: &str) -> Result<NaiveDate> {
    let date = date.trim();
    let (sep, format) = if date.contains('/') {
        ('/', "%m/%d/%Y")
    } else if date.contains('.') {
        ('.', "%d.%m.%Y")
    } else {
        if date.split('-').next().map_or(true, |year| year.len() != 4) {
            return Err(ChatError::malformed(date, "", "dash dates must be YYYY-MM-DD"));
        }
        return NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| ChatError::malformed(date, "", e.to_string()));
    };

    let full = widen_year(date, sep)?;
    NaiveDate::parse_from_str(&full, format)
        .map_err(|e| ChatError::malformed(date, "", e.to_string()))
}

fn resolve_time(time: &str) -> Result<NaiveTime> {
    let time = time.trim();
    let caps = re_time()
        .captures(time)
        .ok_or_else(|| ChatError::malformed("", time, "unrecognised time"))?;
    let field = |name: &str, fallback: &'static str| {
        caps.name(name).map_or(fallback, |m| m.as_str())
    };
    let clock = format!("{}:{}:{}", field("h", ""), field("m", ""), field("s", "00"));

    let parsed = match caps.name("ampm") {
        Some(ampm) => {
            let meridiem = if ampm.as_str().eq_ignore_ascii_case("p") { "PM" } else { "AM" };
            NaiveTime::parse_from_str(&format!("{clock} {meridiem}"), "%I:%M:%S %p")
        }
        None => NaiveTime::parse_from_str(&clock, "%H:%M:%S"),
    };
    parsed.map_err(|e| ChatError::malformed("", time, e.to_string()))
}

// Slash dates are month-first, dot dates are day-first, anything else must
// already be `YYYY-MM-DD`.
pub fn resolve_timestamp(date: &str, time: &str) -> Result<NaiveDateTime> {
    let attach = |e: ChatError| match e {
        ChatError::MalformedTimestamp { reason, .. } => ChatError::malformed(date, time, reason),
        other => other,
    };
    let day = resolve_date(date).map_err(attach)?;
    let clock = resolve_time(time).map_err(attach)?;
    Ok(day.and_time(clock))
}

#[derive(Debug, Clone, Default)]
pub struct ChatParser<C = ColonSplit> {
    classifier: C,
}

impl ChatParser<ColonSplit> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: SenderClassifier> ChatParser<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn parse(&self, raw: &str) -> ParsedChat {
        let text = normalize(raw);
        let headers: Vec<_> = re_header().captures_iter(&text).collect();

        let mut chat = ParsedChat {
            messages: Vec::with_capacity(headers.len()),
            skipped: Vec::new(),
        };

        let mut line = 1usize;
        let mut scanned = 0usize;

        for (i, caps) in headers.iter().enumerate() {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let block_end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(text.len());
            let block = &text[whole.end()..block_end];

            let date = caps.name("date").map(|m| m.as_str()).unwrap_or("");
            let time = caps.name("time").map(|m| m.as_str()).unwrap_or("");

            match resolve_timestamp(date, time) {
                Ok(timestamp) => {
                    let Classified { sender, body } = self.classifier.classify(block);
                    chat.messages.push(Message {
                        timestamp,
                        sender: sender.map(str::to_string),
                        body: body.to_string(),
                    });
                }
                Err(err) => {
                    line += bytecount_newlines(&text[scanned..whole.start()]);
                    scanned = whole.start();
                    tracing::warn!(line, error = %err, "dropping message with malformed header");
                    let reason = match err {
                        ChatError::MalformedTimestamp { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    chat.skipped.push(SkippedHeader {
                        line,
                        date: date.to_string(),
                        time: time.to_string(),
                        reason,
                    });
                }
            }
        }

        tracing::debug!(
            headers = headers.len(),
            messages = chat.messages.len(),
            skipped = chat.skipped.len(),
            "parsed chat export"
        );
        chat
    }
}

fn bytecount_newlines(s: &str) -> usize {
    s.bytes().filter(|b| *b == b'\n').count()
}

pub fn parse(raw: &str) -> ParsedChat {
    ChatParser::new().parse(raw)
}
