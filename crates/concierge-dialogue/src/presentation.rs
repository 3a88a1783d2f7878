//! Response assembly: the text spoken for each turn outcome, split into
//! speech-sized chunks the telephony layer can play and interrupt.

use serde::{Deserialize, Serialize};

use concierge_core::config::DialogueConfig;
use concierge_core::models::{OpeningHours, RankedResult};

/// One piece of a spoken response, in playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseChunk {
    pub index: usize,
    pub text: String,
    pub is_final: bool,
}

const ORDINALS: [&str; 5] = ["First", "Second", "Third", "Fourth", "Fifth"];

const RESET_PREFIX: &str = "It's been a while, so I started a fresh search.";

/// Builds response text from outcomes. Pure: no state, no I/O.
#[derive(Debug, Clone, Default)]
pub struct Presenter {
    config: DialogueConfig,
}

impl Presenter {
    pub fn new(config: DialogueConfig) -> Self {
        Self { config }
    }

    pub fn shortlist_size(&self) -> usize {
        self.config.shortlist_size.max(1)
    }

    /// Intro, shortlist and a prompt for the rest.
    pub fn results(
        &self,
        results: &[RankedResult],
        broadened: bool,
        context_reset: bool,
    ) -> Vec<ResponseChunk> {
        let mut parts = Vec::new();
        if context_reset {
            parts.push(RESET_PREFIX.to_string());
        }
        if broadened {
            parts.push("I couldn't find an exact match, so I widened the search a bit.".to_string());
        }
        parts.push(match results.len() {
            1 => "I found one place.".to_string(),
            n => format!("I found {n} places."),
        });
        parts.push(self.shortlist_text(results));
        parts.push(self.follow_up(results.len()));
        self.chunk(&parts.join(" "))
    }

    /// Drill-down on one place.
    pub fn details(&self, result: &RankedResult, context_reset: bool) -> Vec<ResponseChunk> {
        let meta = &result.candidate.metadata;
        let mut parts = Vec::new();
        if context_reset {
            parts.push(RESET_PREFIX.to_string());
        }

        let kind = match &meta.cuisine {
            Some(cuisine) => format!("{cuisine} {}", meta.category),
            None => meta.category.clone(),
        };
        let place = match &meta.city {
            Some(city) => format!("{} is a {kind} in {city}.", display_name(result)),
            None => format!("{} is a {kind}.", display_name(result)),
        };
        parts.push(place);

        if let Some(description) = &meta.description {
            parts.push(sentence(description));
        }
        if let Some(rating) = meta.rating {
            match meta.review_count {
                Some(reviews) if reviews > 0 => {
                    parts.push(format!("It's rated {rating:.1} from {reviews} reviews."))
                }
                _ => parts.push(format!("It's rated {rating:.1}.")),
            }
        }
        if let Some(tier) = meta.price_tier() {
            parts.push(price_sentence(tier).to_string());
        }
        if let Some(hours) = meta.hours {
            parts.push(hours_sentence(&hours));
        }
        if let Some(address) = &meta.address {
            parts.push(format!("You'll find it at {address}."));
        }
        if let Some(phone) = &meta.phone {
            parts.push(format!("You can call them at {phone}."));
        }
        self.chunk(&parts.join(" "))
    }

    /// A reference could not be resolved.
    pub fn disambiguation(&self, mention: &str, held: usize) -> Vec<ResponseChunk> {
        let text = match held {
            0 => "I haven't suggested any places yet. What are you looking for?".to_string(),
            1 => format!("I only mentioned one place. Did you mean that one by \"{mention}\"?"),
            n => format!(
                "I mentioned {n} places. Which one did you mean by \"{mention}\"? You can say first, second or the name."
            ),
        };
        self.chunk(&text)
    }

    /// Backend unavailable. Reads the cached list if there is one.
    pub fn degraded(&self, cached: &[RankedResult], context_reset: bool) -> Vec<ResponseChunk> {
        if cached.is_empty() {
            return self.chunk(
                "I'm having trouble finding places right now. Could you try again in a moment?",
            );
        }
        let mut parts = Vec::new();
        if context_reset {
            parts.push(RESET_PREFIX.to_string());
        }
        parts.push("I'm having trouble searching right now, so here is what I found earlier.".to_string());
        parts.push(self.shortlist_text(cached));
        self.chunk(&parts.join(" "))
    }

    pub fn no_results(&self, context_reset: bool) -> Vec<ResponseChunk> {
        let text = "I couldn't find anything matching that. Could you tell me more about what you're in the mood for?";
        if context_reset {
            self.chunk(&format!("{RESET_PREFIX} {text}"))
        } else {
            self.chunk(text)
        }
    }

    pub fn reset(&self) -> Vec<ResponseChunk> {
        self.chunk("Okay, let's start over. What are you looking for?")
    }

    pub fn acknowledged(&self) -> Vec<ResponseChunk> {
        self.chunk("Okay.")
    }

    /// Continue the previous list after an interjection.
    pub fn resume(&self, remaining: &[RankedResult]) -> Vec<ResponseChunk> {
        if remaining.is_empty() {
            return self.chunk("That's everything I found. Want me to look for something else?");
        }
        let text = format!(
            "As I was saying. {} {}",
            self.shortlist_text(remaining),
            self.follow_up(remaining.len())
        );
        self.chunk(&text)
    }

    fn shortlist_text(&self, results: &[RankedResult]) -> String {
        results
            .iter()
            .take(self.shortlist_size())
            .enumerate()
            .map(|(i, r)| {
                let ordinal = ORDINALS.get(i).copied().unwrap_or("Next");
                let mut line = format!("{ordinal}, {}", display_name(r));
                if let Some(rating) = r.candidate.metadata.rating {
                    line.push_str(&format!(", rated {rating:.1}"));
                }
                if let Some(tier) = r.candidate.metadata.price_tier() {
                    line.push_str(&format!(", {}", price_phrase(tier)));
                }
                line.push('.');
                line
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn follow_up(&self, total: usize) -> String {
        let shown = total.min(self.shortlist_size());
        if total > shown {
            format!(
                "I have {} more. Want to hear more about any of these?",
                total - shown
            )
        } else {
            "Want to hear more about any of these?".to_string()
        }
    }

    /// Split `text` into chunks of at most `dialogue.chunk_chars` characters,
    /// breaking between sentences where possible and between words otherwise.
    pub fn chunk(&self, text: &str) -> Vec<ResponseChunk> {
        let limit = self.config.chunk_chars.max(1);
        let mut pieces: Vec<String> = Vec::new();
        let mut current = String::new();

        for sentence in sentences(text) {
            for piece in split_long(&sentence, limit) {
                let needed = if current.is_empty() {
                    piece.chars().count()
                } else {
                    current.chars().count() + 1 + piece.chars().count()
                };
                if needed > limit && !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&piece);
            }
        }
        if !current.is_empty() {
            pieces.push(current);
        }

        let last = pieces.len().saturating_sub(1);
        pieces
            .into_iter()
            .enumerate()
            .map(|(index, text)| ResponseChunk {
                index,
                text,
                is_final: index == last,
            })
            .collect()
    }
}

/// Join chunk texts back into one string.
pub fn spoken_text(chunks: &[ResponseChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn display_name(result: &RankedResult) -> &str {
    let name = result.name();
    if name.trim().is_empty() {
        "an unnamed place"
    } else {
        name
    }
}

fn sentence(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.ends_with(['.', '!', '?']) {
        trimmed.to_string()
    } else {
        format!("{trimmed}.")
    }
}

fn price_phrase(tier: u8) -> &'static str {
    match tier {
        1 => "budget friendly",
        2 => "moderately priced",
        3 => "on the upscale side",
        _ => "high end",
    }
}

fn price_sentence(tier: u8) -> &'static str {
    match tier {
        1 => "It's very budget friendly.",
        2 => "It's moderately priced.",
        3 => "It's on the upscale side.",
        _ => "It's a high-end spot.",
    }
}

fn hours_sentence(hours: &OpeningHours) -> String {
    if *hours == OpeningHours::always_open() {
        return "It's open around the clock.".to_string();
    }
    format!(
        "It's open from {} to {}.",
        clock(hours.open_minute),
        clock(hours.close_minute)
    )
}

fn clock(minute: u16) -> String {
    let minute = minute % concierge_core::constants::MINUTES_PER_DAY;
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Sentences with their terminal punctuation kept.
fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '?' | '!')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            let s = current.trim();
            if !s.is_empty() {
                out.push(s.to_string());
            }
            current.clear();
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

/// Break one sentence into word-aligned pieces of at most `limit` characters.
/// A single word longer than `limit` becomes its own piece.
fn split_long(sentence: &str, limit: usize) -> Vec<String> {
    if sentence.chars().count() <= limit {
        return vec![sentence.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    for word in sentence.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > limit && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
