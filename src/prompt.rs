//! Prompt construction for the recommendation request.
//!
//! Pure string building: the same entries always render the same prompt.
//! The first line of every prompt is the persona preamble; [`RenderedPrompt`]
//! splits it off to become the system message.

use crate::entry::{BookEntry, ToReadEntry};
use serde::{Deserialize, Serialize};

const LIBRARIAN_PREAMBLE: &str = "You are a lifelong librarian known for giving spot-on book \
recommendations. You reason carefully from a reader's personal history, connecting themes, \
writing style, emotional tone, and authorship to what they have loved before.";

const CURATOR_PREAMBLE: &str = "You are a thoughtful book curator who specializes in \
recommending emotionally resonant reads. You reason carefully from how a reader's past books \
made them feel, matching shared emotional tones, themes, and personal journeys.";

const HISTORY_HEADER: &str = "Here are the books I have read, each with my reflection:";
const NO_HISTORY: &str =
    "I have not logged any books yet, so draw on widely loved titles across genres.";

const TO_READ_HEADER: &str =
    "These books are already on my to-read list, so do not recommend them:";
const NO_TO_READ: &str = "My to-read list is empty.";

const QUIZ_HEADER: &str = "Here are my answers to a reading preferences quiz:";

const CLOSING: &str = "Based on that, recommend exactly 3 books I might enjoy next. For each \
recommendation, include a short description (1-2 sentences) of why you picked it.
Format the response as a JSON array of exactly 3 objects. Each object must have the keys \
\"title\", \"author\", and \"description\", and may have the key \"link\".
Only include \"link\" when you are certain of the book's Goodreads page, in the form \
https://www.goodreads.com/book/show/<id>. Otherwise omit the \"link\" key entirely; never guess \
a link and never set it to null or an empty string.
Respond with only the JSON array, with no other text before or after it.";

/// Which persona the preamble adopts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptStyle {
    /// Librarian reasoning from themes, style, and authorship.
    #[default]
    Librarian,
    /// Curator focused on emotional resonance.
    Curator,
}

impl PromptStyle {
    fn preamble(self) -> &'static str {
        match self {
            PromptStyle::Librarian => LIBRARIAN_PREAMBLE,
            PromptStyle::Curator => CURATOR_PREAMBLE,
        }
    }
}

/// One question/answer pair from the preferences quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question: String,
    pub answer: String,
}

impl QuizAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Render a history entry.
pub fn render_book_entry(entry: &BookEntry) -> String {
    format!(
        "{} by {}. The reflection on this book is:\n {}",
        entry.book_name, entry.author_name, entry.reflection
    )
}

/// Render a to-read entry.
pub fn render_to_read_entry(entry: &ToReadEntry) -> String {
    format!("{} by {}", entry.book_name, entry.author_name)
}

/// Build the default (librarian) prompt from validated entries.
///
/// # Example
///
/// ```
/// use booklog_recs::entry::BookEntry;
/// use booklog_recs::prompt::build_prompt;
///
/// let history = vec![BookEntry {
///     book_name: "1984".into(),
///     author_name: "George Orwell".into(),
///     reflection: "surveillance and control".into(),
/// }];
/// let prompt = build_prompt(&history, &[]);
/// assert!(prompt.contains("1984 by George Orwell. The reflection on this book is:\n surveillance and control"));
/// ```
pub fn build_prompt(history: &[BookEntry], to_read: &[ToReadEntry]) -> String {
    PromptBuilder::new().build(history, to_read)
}

/// Prompt builder with a persona and optional quiz answers.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    style: PromptStyle,
    quiz: Vec<QuizAnswer>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: PromptStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_quiz(mut self, answers: Vec<QuizAnswer>) -> Self {
        self.quiz = answers;
        self
    }

    pub fn style(&self) -> PromptStyle {
        self.style
    }

    /// Render the full prompt. Sections appear in a fixed order: preamble,
    /// history, to-read, quiz (only when answers were given), closing.
    pub fn build(&self, history: &[BookEntry], to_read: &[ToReadEntry]) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(history.len() + to_read.len() + 8);
        lines.push(self.style.preamble().to_string());

        if history.is_empty() {
            lines.push(NO_HISTORY.to_string());
        } else {
            lines.push(HISTORY_HEADER.to_string());
            lines.extend(history.iter().map(render_book_entry));
        }

        if to_read.is_empty() {
            lines.push(NO_TO_READ.to_string());
        } else {
            lines.push(TO_READ_HEADER.to_string());
            lines.extend(to_read.iter().map(render_to_read_entry));
        }

        if !self.quiz.is_empty() {
            lines.push(QUIZ_HEADER.to_string());
            lines.extend(
                self.quiz
                    .iter()
                    .map(|qa| format!("{}: {}", qa.question, qa.answer)),
            );
        }

        lines.push(CLOSING.to_string());
        lines.join("\n")
    }
}

/// A prompt split into the system instruction and the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

impl RenderedPrompt {
    /// Split at the first newline: the preamble line becomes the system
    /// message, everything after it the user message.
    pub fn split(prompt: &str) -> Self {
        match prompt.split_once('\n') {
            Some((system, user)) => Self {
                system: system.to_string(),
                user: user.to_string(),
            },
            None => Self {
                system: String::new(),
                user: prompt.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orwell() -> BookEntry {
        BookEntry {
            book_name: "1984".into(),
            author_name: "George Orwell".into(),
            reflection: "surveillance and control".into(),
        }
    }

    fn herbert() -> BookEntry {
        BookEntry {
            book_name: "Dune".into(),
            author_name: "Frank Herbert".into(),
            reflection: "ecology and power".into(),
        }
    }

    fn austen() -> ToReadEntry {
        ToReadEntry {
            book_name: "Emma".into(),
            author_name: "Jane Austen".into(),
        }
    }

    #[test]
    fn test_render_book_entry() {
        assert_eq!(
            render_book_entry(&orwell()),
            "1984 by George Orwell. The reflection on this book is:\n surveillance and control"
        );
    }

    #[test]
    fn test_render_to_read_entry() {
        assert_eq!(render_to_read_entry(&austen()), "Emma by Jane Austen");
    }

    #[test]
    fn test_full_prompt_layout() {
        let prompt = build_prompt(&[orwell(), herbert()], &[austen()]);
        let expected = [
            LIBRARIAN_PREAMBLE,
            HISTORY_HEADER,
            "1984 by George Orwell. The reflection on this book is:\n surveillance and control",
            "Dune by Frank Herbert. The reflection on this book is:\n ecology and power",
            TO_READ_HEADER,
            "Emma by Jane Austen",
            CLOSING,
        ]
        .join("\n");
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let history = vec![orwell(), herbert()];
        let to_read = vec![austen()];
        let a = build_prompt(&history, &to_read);
        let b = build_prompt(&history, &to_read);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_empty_inputs_use_no_history_framing() {
        let prompt = build_prompt(&[], &[]);
        assert_eq!(
            prompt,
            [LIBRARIAN_PREAMBLE, NO_HISTORY, NO_TO_READ, CLOSING].join("\n")
        );
    }

    #[test]
    fn test_history_order_preserved() {
        let prompt = build_prompt(&[herbert(), orwell()], &[]);
        let dune = prompt.find("Dune by").unwrap();
        let nineteen = prompt.find("1984 by").unwrap();
        assert!(dune < nineteen);
    }

    #[test]
    fn test_closing_contract() {
        let prompt = build_prompt(&[orwell()], &[]);
        assert!(prompt.ends_with(CLOSING));
        assert!(CLOSING.contains("exactly 3"));
        assert!(CLOSING.contains("\"title\""));
        assert!(CLOSING.contains("\"author\""));
        assert!(CLOSING.contains("\"description\""));
        assert!(CLOSING.contains("omit the \"link\" key entirely"));
        assert!(CLOSING.contains("only the JSON array"));
    }

    #[test]
    fn test_curator_changes_only_preamble() {
        let librarian = build_prompt(&[orwell()], &[austen()]);
        let curator = PromptBuilder::new()
            .with_style(PromptStyle::Curator)
            .build(&[orwell()], &[austen()]);
        assert!(curator.starts_with(CURATOR_PREAMBLE));
        assert_eq!(
            librarian.split_once('\n').unwrap().1,
            curator.split_once('\n').unwrap().1
        );
    }

    #[test]
    fn test_quiz_section_before_closing() {
        let prompt = PromptBuilder::new()
            .with_quiz(vec![
                QuizAnswer::new("Favorite genre", "literary sci-fi"),
                QuizAnswer::new("Preferred length", "under 400 pages"),
            ])
            .build(&[orwell()], &[]);
        let quiz = prompt.find(QUIZ_HEADER).unwrap();
        let closing = prompt.find(CLOSING).unwrap();
        assert!(quiz < closing);
        assert!(prompt.contains("Favorite genre: literary sci-fi\nPreferred length: under 400 pages"));
    }

    #[test]
    fn test_no_quiz_matches_build_prompt() {
        let built = PromptBuilder::new().with_quiz(Vec::new()).build(&[orwell()], &[]);
        assert_eq!(built, build_prompt(&[orwell()], &[]));
    }

    #[test]
    fn test_split_preamble_is_system() {
        let prompt = build_prompt(&[orwell()], &[]);
        let rendered = RenderedPrompt::split(&prompt);
        assert_eq!(rendered.system, LIBRARIAN_PREAMBLE);
        assert!(rendered.user.starts_with(HISTORY_HEADER));
        assert!(rendered.user.ends_with(CLOSING));
    }

    #[test]
    fn test_split_single_line() {
        let rendered = RenderedPrompt::split("just one line");
        assert_eq!(rendered.system, "");
        assert_eq!(rendered.user, "just one line");
    }
}
