/// A transcribed utterance normalized for phrase matching.
///
/// Lowercased, apostrophes dropped, every other non-alphanumeric character
/// (except a decimal point between digits) turned into a word break.
#[derive(Debug, Clone)]
pub struct Utterance {
    raw: String,
    tokens: Vec<String>,
    padded: String,
}

impl Utterance {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let normalized = normalize(&raw);
        let tokens: Vec<String> = normalized.split_whitespace().map(str::to_string).collect();
        let padded = format!(" {} ", tokens.join(" "));
        Self {
            raw,
            tokens,
            padded,
        }
    }

    /// The trimmed original text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Space-delimited normalized text, padded on both ends.
    pub fn padded(&self) -> &str {
        &self.padded
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whole-word phrase match.
    pub fn has(&self, phrase: &str) -> bool {
        !phrase.is_empty() && self.padded.contains(&format!(" {phrase} "))
    }

    pub fn first_of<'a>(&self, phrases: &[&'a str]) -> Option<&'a str> {
        phrases.iter().copied().find(|p| self.has(p))
    }

    pub fn has_any(&self, phrases: &[&str]) -> bool {
        self.first_of(phrases).is_some()
    }

    /// Token position of the first occurrence of a phrase.
    pub fn position_of(&self, phrase: &str) -> Option<usize> {
        let words: Vec<&str> = phrase.split(' ').collect();
        if words.is_empty() || words.len() > self.tokens.len() {
            return None;
        }
        (0..=self.tokens.len() - words.len())
            .find(|&i| words.iter().enumerate().all(|(j, w)| self.tokens[i + j] == *w))
    }
}

/// Normalize free text the same way utterances are normalized.
pub fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    let mut out = String::with_capacity(chars.len());
    for (i, c) in chars.iter().enumerate() {
        match c {
            c if c.is_alphanumeric() => out.push(*c),
            '\'' | '\u{2019}' => {}
            '.' => {
                let digit_before = i > 0 && chars[i - 1].is_ascii_digit();
                let digit_after = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
                out.push(if digit_before && digit_after { '.' } else { ' ' });
            }
            _ => out.push(' '),
        }
    }
    out
}
