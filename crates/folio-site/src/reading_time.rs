//! Reading-time estimate.
//!
//! Words are whitespace-separated tokens containing at least one
//! alphanumeric character. Each CJK ideograph, kana or hangul syllable
//! counts as a word of its own.

use serde::{Deserialize, Serialize};

/// Average reading speed.
pub const WORDS_PER_MINUTE: f64 = 200.0;

/// Estimated reading time of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadTime {
    /// Display text, e.g. `"3 min read"`.
    pub text: String,
    /// Fractional minutes.
    pub minutes: f64,
    /// Word count.
    pub words: usize,
    /// Reading time in milliseconds.
    pub time: u64,
}

/// Estimate the reading time of `text`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn reading_time(text: &str) -> ReadTime {
    let words = count_words(text);
    let minutes = words as f64 / WORDS_PER_MINUTE;
    let time = (minutes * 60_000.0).round() as u64;
    let displayed = ((minutes * 100.0).round() / 100.0).ceil() as u64;

    ReadTime {
        text: format!("{displayed} min read"),
        minutes,
        words,
        time,
    }
}

fn count_words(text: &str) -> usize {
    let mut words = 0;
    let mut in_word = false;

    for ch in text.chars() {
        if is_cjk(ch) {
            if in_word {
                words += 1;
                in_word = false;
            }
            words += 1;
        } else if ch.is_whitespace() {
            if in_word {
                words += 1;
                in_word = false;
            }
        } else if ch.is_alphanumeric() {
            in_word = true;
        }
    }
    if in_word {
        words += 1;
    }
    words
}

fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{3040}'..='\u{30FF}'     // hiragana, katakana
        | '\u{3400}'..='\u{4DBF}'   // CJK extension A
        | '\u{4E00}'..='\u{9FFF}'   // CJK unified ideographs
        | '\u{AC00}'..='\u{D7AF}'   // hangul syllables
        | '\u{F900}'..='\u{FAFF}'   // CJK compatibility ideographs
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_counts_words() {
        assert_eq!(count_words("Hello, world!  This is -- text."), 5);
        assert_eq!(count_words("---\ntitle: x\n---"), 2);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_counts_cjk_characters_individually() {
        assert_eq!(count_words("日本語 text"), 4);
        assert_eq!(count_words("abc漢字"), 3);
    }

    #[test]
    fn test_reading_time_values() {
        let text = "word ".repeat(400);

        let rt = reading_time(&text);

        assert_eq!(
            rt,
            ReadTime {
                text: "2 min read".to_owned(),
                minutes: 2.0,
                words: 400,
                time: 120_000,
            }
        );
    }

    #[test]
    fn test_partial_minutes_round_up() {
        let rt = reading_time(&"word ".repeat(250));

        assert_eq!(rt.text, "2 min read");
        assert_eq!(rt.time, 75_000);
    }

    #[test]
    fn test_empty_text() {
        let rt = reading_time("");

        assert_eq!(rt.text, "0 min read");
        assert_eq!(rt.time, 0);
    }

    #[test]
    fn test_monotonic_in_word_count() {
        let mut last = 0;
        for n in [0, 1, 50, 199, 200, 201, 1000] {
            let rt = reading_time(&"w ".repeat(n));
            assert!(rt.time >= last);
            last = rt.time;
        }
    }
}
