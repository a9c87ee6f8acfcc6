use chrono::{Local, NaiveDateTime, Timelike};

use crate::{config::Config, prompt::ReportAnswers};

/// Format dates are rendered with in the subject and body, e.g. `12/24/2023`
const DATE_DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// Subject and body of one report mail. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReport {
    pub subject: String,
    pub body: String,
}

/// Salutation for the hour of the report date. The boundaries are inclusive
/// on the afternoon side: noon through 17:00 is "afternoon".
fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        12..=17 => "afternoon",
        h if h > 17 => "evening",
        _ => "morning",
    }
}

/// The moment the greeting and the displayed date derive from: the current
/// local time for a today-report, midnight of the entered date otherwise.
fn effective_moment(answers: &ReportAnswers) -> Option<NaiveDateTime> {
    if answers.today {
        Some(Local::now().naive_local())
    } else {
        answers.date.and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}

pub fn compose(answers: &ReportAnswers, config: &Config) -> ComposedReport {
    compose_at(answers, config, effective_moment(answers))
}

fn compose_at(
    answers: &ReportAnswers,
    config: &Config,
    moment: Option<NaiveDateTime>,
) -> ComposedReport {
    // The questionnaire validates the date, so a missing moment should not
    // happen in practice. The formatter still has a defined fallback.
    let greeting = moment.map_or("afternoon", |m| greeting_for_hour(m.hour()));
    let formatted_date = moment.map_or_else(
        || "??/??/????".to_string(),
        |m| m.format(DATE_DISPLAY_FORMAT).to_string(),
    );

    let day_phrase = if answers.today { "Today" } else { "That day" };
    let task_lines = answers
        .tasks
        .iter()
        .map(|task| format!("\t- {task}"))
        .collect::<Vec<_>>()
        .join("\n");

    let subject = format!(
        "Daily report - {formatted_date} ({} - {})",
        answers.start_time, answers.finish_time
    );
    let body = format!(
        "Good {greeting},\n\nI am attaching a daily report for the day {formatted_date}. {day_phrase} I was working on the following:\n\n{task_lines}\n\nKind regards,\n{}",
        config.signature
    );

    ComposedReport { subject, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn answers(today: bool, date: Option<NaiveDate>, tasks: &[&str]) -> ReportAnswers {
        ReportAnswers {
            today,
            date,
            start_time: "09:00".to_string(),
            finish_time: "17:00".to_string(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn config_with_signature(signature: &str) -> Config {
        Config {
            signature: signature.to_string(),
            ..Config::default()
        }
    }

    fn moment(hour: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(hour, 30, 0))
    }

    #[rstest]
    #[case(0, "morning")]
    #[case(10, "morning")]
    #[case(11, "morning")]
    #[case(12, "afternoon")]
    #[case(14, "afternoon")]
    #[case(17, "afternoon")]
    #[case(18, "evening")]
    #[case(23, "evening")]
    fn greeting_follows_hour(#[case] hour: u32, #[case] expected: &str) {
        assert_eq!(greeting_for_hour(hour), expected);
    }

    #[test]
    fn subject_contains_date_and_time_range() {
        // Arrange
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let answers = answers(false, date, &["Fixed bug #12"]);
        let config = config_with_signature("Jane Doe");

        // Act
        let report = compose_at(&answers, &config, moment(14));

        // Assert
        assert_eq!(report.subject, "Daily report - 03/01/2024 (09:00 - 17:00)");
    }

    #[test]
    fn body_lists_tasks_as_tab_indented_bullets() {
        // Arrange
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let answers = answers(false, date, &["Fixed bug #12", "Wrote tests"]);
        let config = config_with_signature("Jane Doe");

        // Act
        let report = compose_at(&answers, &config, moment(14));

        // Assert
        assert!(report.body.contains("\t- Fixed bug #12\n\t- Wrote tests"));
        assert!(report.body.starts_with("Good afternoon,\n\n"));
        assert!(report.body.contains("That day I was working on the following:"));
        assert!(report.body.ends_with("Kind regards,\nJane Doe"));
    }

    #[test]
    fn body_for_today_uses_today_phrase() {
        let answers = answers(true, None, &["Wrote tests"]);
        let config = config_with_signature("Jane Doe");

        let report = compose_at(&answers, &config, moment(9));

        assert!(report.body.starts_with("Good morning,"));
        assert!(report.body.contains("Today I was working on the following:"));
    }

    #[test]
    fn empty_task_list_keeps_template_structure() {
        // Scenario: "not today", 01.03.2024, no tasks entered
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let answers = answers(false, date, &[]);
        let config = config_with_signature("Jane Doe");

        let report = compose_at(&answers, &config, moment(0));

        assert_eq!(
            report.body,
            "Good morning,\n\nI am attaching a daily report for the day 03/01/2024. That day I was working on the following:\n\n\n\nKind regards,\nJane Doe"
        );
    }

    #[test]
    fn entered_date_at_midnight_greets_with_morning() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let answers = answers(false, date, &[]);
        let config = config_with_signature("Jane Doe");

        let report = compose(&answers, &config);

        assert!(report.body.starts_with("Good morning,"));
        assert!(report.subject.contains("03/01/2024"));
    }

    #[test]
    fn missing_date_falls_back_to_afternoon() {
        let answers = answers(false, None, &[]);
        let config = config_with_signature("Jane Doe");

        let report = compose_at(&answers, &config, None);

        assert!(report.body.starts_with("Good afternoon,"));
    }
}
