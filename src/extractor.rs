// src/extractor.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::question::Question;

/// Hard cap on extracted questions, bounds resource use against
/// adversarial input.
pub const MAX_QUESTIONS: usize = 100;

/// A question block needs at least this many options to survive; fewer is
/// treated as extraction noise.
pub const MIN_OPTIONS: usize = 3;

/// Leading question numbering: "12.", "3)", "7 -" etc.
static QUESTION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,4}\s*[.)\-]\s*").unwrap());

/// Latin option marker: "A)", "b.", "C )" etc.
static OPTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Da-d]\s*[.)]\s*").unwrap());

/// Kannada-script option marker, matched positionally: one or two
/// codepoints in the Kannada block followed by ')' or '.'. Two, because a
/// syllable like "ಬಿ" is a consonant plus a combining vowel sign. The
/// Latin letter is implied by the option's position in the list.
static KANNADA_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\u{0C80}-\u{0CFF}]{1,2}\s*[.)]\s*").unwrap());

/// Outcome of one extraction pass.
///
/// The heuristic is best-effort by nature; rather than collapsing a messy
/// document into an opaque "no questions found", every line the scanner
/// could not place is reported back for human review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub questions: Vec<Question>,
    pub unparsed_lines: Vec<String>,
}

struct Block {
    text: String,
    options: Vec<String>,
    /// Original lines, kept so a rejected block can be reported verbatim.
    raw_lines: Vec<String>,
}

impl Block {
    fn new(text: &str, raw: &str) -> Self {
        Block {
            text: text.to_string(),
            options: Vec::new(),
            raw_lines: vec![raw.to_string()],
        }
    }

    fn into_question(self) -> Question {
        Question {
            text: self.text,
            options: self.options,
            correct_answer: None,
        }
    }
}

/// Extracts multiple-choice questions from raw document text.
///
/// Line-oriented heuristic, not a grammar: a line starting with a number
/// opens a question block, option-marker lines fill its option list, and
/// unmarked lines before the first option continue the question text.
/// Deterministic and free of I/O.
pub fn extract_questions(text: &str) -> ExtractionReport {
    let mut report = ExtractionReport {
        questions: Vec::new(),
        unparsed_lines: Vec::new(),
    };
    let mut current: Option<Block> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if report.questions.len() >= MAX_QUESTIONS {
            break;
        }

        if let Some(m) = QUESTION_START.find(line) {
            flush(current.take(), &mut report);
            current = Some(Block::new(&line[m.end()..], line));
            continue;
        }

        let marker_end = OPTION_MARKER
            .find(line)
            .or_else(|| KANNADA_MARKER.find(line))
            .map(|m| m.end());

        match (&mut current, marker_end) {
            (Some(block), Some(end)) => {
                block.options.push(line[end..].trim().to_string());
                block.raw_lines.push(line.to_string());
            }
            // Unmarked line before any option: multi-line question text.
            (Some(block), None) if block.options.is_empty() => {
                if !block.text.is_empty() {
                    block.text.push(' ');
                }
                block.text.push_str(line);
                block.raw_lines.push(line.to_string());
            }
            _ => report.unparsed_lines.push(line.to_string()),
        }
    }

    flush(current, &mut report);
    report
}

fn flush(block: Option<Block>, report: &mut ExtractionReport) {
    let Some(block) = block else { return };
    if !block.text.is_empty()
        && block.options.len() >= MIN_OPTIONS
        && report.questions.len() < MAX_QUESTIONS
    {
        report.questions.push(block.into_question());
    } else {
        report.unparsed_lines.extend(block.raw_lines);
    }
}
