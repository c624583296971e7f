//! Notification texts for status changes.

use crate::{errors::Error, status::WorkItem, Result};

/// Status code → verdict shown to the student.
pub const VERDICTS: [(&str, &str); 3] = [
    ("approved", "Работа проверена: ревьюеру всё понравилось. Ура!"),
    ("reviewing", "Работа взята на проверку ревьюером."),
    ("rejected", "Работа проверена: у ревьюера есть замечания."),
];

pub fn verdict_for(status: &str) -> Option<&'static str> {
    VERDICTS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, text)| *text)
}

/// Compose the status-change message for one homework.
pub fn format_status(item: &WorkItem) -> Result<String> {
    let name = item
        .homework_name
        .as_deref()
        .ok_or(Error::MissingField("homework_name"))?;
    let status = item
        .status
        .as_deref()
        .ok_or(Error::MissingField("status"))?;
    let verdict =
        verdict_for(status).ok_or_else(|| Error::UnknownVerdict(status.to_string()))?;

    let mut text = format!("Изменился статус проверки работы \"{name}\". {verdict}");
    if let Some(comment) = item.reviewer_comment.as_deref().map(str::trim) {
        if !comment.is_empty() {
            text.push_str("\nКомментарий ревьюера: ");
            text.push_str(comment);
        }
    }
    Ok(text)
}

/// Text sent to the operator chat when a cycle fails.
pub fn format_failure(err: &Error) -> String {
    format!("Сбой в работе программы: {err}")
}

/// Truncate to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}
