// File: ./src/model/parser.rs
// Handles smart text input parsing
use crate::model::item::{Priority, Task};
use chrono::{Duration, NaiveDate};

/// Fields pulled out of a line like `Buy milk !high @tomorrow #errands`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub tag: Option<String>,
}

impl NewTask {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    /// Parses inline `!priority`, `@date` and `#tag` tokens relative to `today`.
    pub fn parse(input: &str, today: NaiveDate) -> Self {
        let mut out = NewTask::default();
        let mut text_words = Vec::new();
        let mut tokens = input.split_whitespace().peekable();

        while let Some(word) = tokens.next() {
            if let Some(p) = word.strip_prefix('!') {
                let priority = match p {
                    "1" => Some(Priority::High),
                    "2" => Some(Priority::Medium),
                    "3" => Some(Priority::Low),
                    other => other.parse::<Priority>().ok(),
                };
                if priority.is_some() {
                    out.priority = priority;
                    continue;
                }
            }

            if let Some(stripped) = word.strip_prefix('#')
                && !stripped.is_empty()
            {
                out.tag = Some(stripped.to_string());
                continue;
            }

            if let Some(val) = word.strip_prefix('@') {
                if let Ok(date) = NaiveDate::parse_from_str(val, "%Y-%m-%d") {
                    out.due_date = Some(date);
                    continue;
                }
                if val == "today" {
                    out.due_date = Some(today);
                    continue;
                }
                if val == "tomorrow" {
                    out.due_date = Some(today + Duration::days(1));
                    continue;
                }
                if val == "next"
                    && let Some(unit_token) = tokens.peek()
                {
                    let unit = unit_token.to_lowercase();
                    let offset = match unit.as_str() {
                        "week" | "weeks" => 7,
                        "month" | "months" => 30,
                        "year" | "years" => 365,
                        _ => 0,
                    };
                    if offset > 0 {
                        tokens.next();
                        out.due_date = Some(today + Duration::days(offset));
                        continue;
                    }
                }
            }
            text_words.push(word);
        }
        out.text = text_words.join(" ");
        out
    }
}

impl Task {
    /// Inverse of [`NewTask::parse`], used to pre-fill edits.
    pub fn to_smart_string(&self) -> String {
        let mut s = self.text.clone();
        if self.priority != Priority::default() {
            s.push_str(&format!(" !{}", self.priority));
        }
        if let Some(d) = self.due_date {
            s.push_str(&format!(" @{}", d.format("%Y-%m-%d")));
        }
        if let Some(tag) = &self.tag {
            s.push_str(&format!(" #{}", tag));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn parses_all_tokens() {
        let parsed = NewTask::parse("Buy milk !high @tomorrow #errands", today());
        assert_eq!(parsed.text, "Buy milk");
        assert_eq!(parsed.priority, Some(Priority::High));
        assert_eq!(parsed.due_date, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(parsed.tag.as_deref(), Some("errands"));
    }

    #[test]
    fn numeric_priority_and_relative_dates() {
        let parsed = NewTask::parse("Renew passport !3 @next month", today());
        assert_eq!(parsed.text, "Renew passport");
        assert_eq!(parsed.priority, Some(Priority::Low));
        assert_eq!(parsed.due_date, NaiveDate::from_ymd_opt(2026, 11, 18));
    }

    #[test]
    fn unparseable_tokens_stay_in_text() {
        let parsed = NewTask::parse("Email @alice about !important # stuff", today());
        assert_eq!(parsed.text, "Email @alice about !important # stuff");
        assert_eq!(parsed, NewTask::plain("Email @alice about !important # stuff"));
    }

    #[test]
    fn next_needs_an_exact_unit() {
        let parsed = NewTask::parse("Hike @next weekend", today());
        assert_eq!(parsed.text, "Hike @next weekend");
        assert_eq!(parsed.due_date, None);

        let parsed = NewTask::parse("Review @next weeks", today());
        assert_eq!(parsed.text, "Review");
        assert_eq!(parsed.due_date, NaiveDate::from_ymd_opt(2026, 10, 26));
    }

    #[test]
    fn last_tag_wins() {
        let parsed = NewTask::parse("Call #home #work", today());
        assert_eq!(parsed.tag.as_deref(), Some("work"));
    }

    #[test]
    fn smart_string_round_trips() {
        let mut task = Task::new("Ship release");
        task.priority = Priority::High;
        task.due_date = Some(today());
        task.tag = Some("work".to_string());
        assert_eq!(task.to_smart_string(), "Ship release !high @2026-10-19 #work");

        let parsed = NewTask::parse(&task.to_smart_string(), today());
        assert_eq!(parsed.text, task.text);
        assert_eq!(parsed.priority, Some(task.priority));
        assert_eq!(parsed.due_date, task.due_date);
        assert_eq!(parsed.tag, task.tag);
    }
}
