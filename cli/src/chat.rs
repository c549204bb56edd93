//! Input screening for `rea chat`.

const QUESTION_WORDS: &[&str] = &[
    "what", "how", "why", "when", "where", "who", "whom", "whose", "which", "can", "could",
    "would", "should", "will", "shall", "may", "might", "is", "are", "am", "was", "were", "do",
    "does", "did", "has", "have", "had",
];

const FAREWELLS: &[&str] = &[
    "thank you",
    "thanks",
    "goodbye",
    "bye",
    "i have no more questions",
    "no more questions",
    "that's all",
    "quit",
    "exit",
];

fn first_word(input: &str) -> String {
    input
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .split('\'')
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// True when `input` opens with an interrogative or auxiliary verb.
///
/// A trailing `?` alone is not enough: "I have no more questions?" is a
/// sign-off, not a question.
pub fn is_question(input: &str) -> bool {
    QUESTION_WORDS.contains(&first_word(input).as_str())
}

/// True when `input` ends the session rather than asking something.
pub fn is_farewell(input: &str) -> bool {
    let normalized = input
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase();

    FAREWELLS.iter().any(|farewell| {
        normalized == *farewell
            || normalized
                .strip_prefix(farewell)
                .is_some_and(|rest| rest.starts_with([' ', ',', '!', '.']))
    })
}
