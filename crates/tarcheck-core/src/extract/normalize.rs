//! Raw document text cleanup applied before pattern matching.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::config::ExtractionConfig;

lazy_static! {
    static ref HORIZONTAL_WS: Regex = Regex::new(r"[ \t\r\f]+").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n\s*\n(?:\s*\n)+").unwrap();
    static ref TRAILING_SPACE: Regex = Regex::new(r" \n").unwrap();
    static ref DOLLAR_SPACE: Regex = Regex::new(r"\$\s+").unwrap();

    // OCR confusion fixes, digit-adjacent only. regex has no lookahead, so
    // the trailing digit is captured and re-emitted; applied to a fixpoint
    // to handle runs like "OO5".
    static ref OCR_O: Regex = Regex::new(r"[Oo](\d)").unwrap();
    static ref OCR_I: Regex = Regex::new(r"[Il](\d)").unwrap();
    static ref OCR_S: Regex = Regex::new(r"[Ss](\d)").unwrap();
}

/// Clean raw extracted document text.
///
/// Operations, in order: collapse horizontal whitespace runs to single
/// spaces, collapse multiple blank lines to one, strip characters outside
/// the allow-list, join "$ " to "$", then (when enabled) apply digit-
/// adjacent OCR confusion fixes. Empty input yields empty output; this
/// never fails.
pub fn normalize_text(raw: &str, config: &ExtractionConfig) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = HORIZONTAL_WS.replace_all(raw, " ");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    let text = TRAILING_SPACE.replace_all(&text, "\n");

    let text: String = text.chars().filter(|c| is_allowed(*c)).collect();
    let text = DOLLAR_SPACE.replace_all(&text, "$").into_owned();

    let text = if config.ocr_corrections {
        fix_ocr_confusions(text)
    } else {
        text
    };

    text.trim().to_string()
}

/// Allow-list: alphanumeric, common punctuation, currency symbol.
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '\n'
        || matches!(
            c,
            ' ' | '.' | ',' | ';' | ':' | '\'' | '"' | '(' | ')' | '-' | '/' | '#' | '$' | '%'
                | '&' | '@' | '+' | '*' | '='
        )
}

/// Letter-for-digit OCR swaps, only when the letter immediately precedes a
/// digit: O/o -> 0, I/l -> 1, S/s -> 5.
fn fix_ocr_confusions(mut text: String) -> String {
    loop {
        let pass = OCR_O.replace_all(&text, "0$1");
        let pass = OCR_I.replace_all(&pass, "1$1");
        let pass = OCR_S.replace_all(&pass, "5$1").into_owned();

        if pass == text {
            return text;
        }
        text = pass;
    }
}
