const ACTION_PREFIX: &str = "Action: ";
const ANSWER_PREFIX: &str = "Answer:";

/// One `Action: <name>: <argument>` line from a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInvocation {
    pub name: String,
    pub argument: String,
}

/// Returns the first line of `response` that matches the action grammar.
///
/// Later matching lines are ignored. The argument is the rest of the line
/// after `": "`, passed through without trimming or unquoting.
pub fn extract_action(response: &str) -> Option<ActionInvocation> {
    response.lines().find_map(parse_action_line)
}

fn parse_action_line(line: &str) -> Option<ActionInvocation> {
    let rest = line.strip_prefix(ACTION_PREFIX)?;
    let (name, argument) = rest.split_once(": ")?;

    if name.is_empty() || !name.chars().all(is_identifier_char) {
        return None;
    }

    Some(ActionInvocation {
        name: name.to_string(),
        argument: argument.to_string(),
    })
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// The final answer payload, if `response` starts with `Answer:`.
pub fn parse_answer(response: &str) -> Option<&str> {
    response
        .strip_prefix(ANSWER_PREFIX)
        .map(|answer| answer.trim())
}
