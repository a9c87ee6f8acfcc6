use chrono::NaiveDate;
use dialoguer::{Confirm, Input};

/// Format the date prompt expects, e.g. `24.12.2023`
pub const DATE_INPUT_FORMAT: &str = "%d.%m.%Y";

/// Everything the questionnaire gathers for one run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAnswers {
    /// Report covers the current day
    pub today: bool,

    /// Only collected when the report is not from today
    pub date: Option<NaiveDate>,

    /// Free text, no format enforced
    pub start_time: String,

    /// Free text, no format enforced
    pub finish_time: String,

    /// One entry per task, in the order they were entered
    pub tasks: Vec<String>,
}

pub fn parse_report_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_INPUT_FORMAT).ok()
}

/// Runs the fixed questionnaire. Every prompt blocks until answered; the
/// only way out is finishing it or interrupting the process.
pub fn collect_answers() -> anyhow::Result<ReportAnswers> {
    let today = Confirm::new()
        .with_prompt("Is the report from today?")
        .default(true)
        .interact()?;

    let date = if today {
        None
    } else {
        let raw: String = Input::new()
            .with_prompt("Please tell me the date (DD.MM.YYYY)")
            .validate_with(|input: &String| -> Result<(), &str> {
                if parse_report_date(input).is_some() {
                    Ok(())
                } else {
                    Err("Invalid date (expected date in format DD.MM.YYYY)!")
                }
            })
            .interact_text()?;
        parse_report_date(&raw)
    };

    let start_time: String = Input::new()
        .with_prompt("Start time (HH:mm)")
        .allow_empty(true)
        .interact_text()?;

    let finish_time: String = Input::new()
        .with_prompt("Finish time (HH:mm)")
        .allow_empty(true)
        .interact_text()?;

    println!("  Today's tasks (to finish adding items, leave empty & accept):");
    let mut tasks = Vec::new();
    loop {
        let task: String = Input::new()
            .with_prompt(" =>")
            .allow_empty(true)
            .interact_text()?;
        if task.is_empty() {
            break;
        }
        tasks.push(task);
    }

    Ok(ReportAnswers {
        today,
        date,
        start_time,
        finish_time,
        tasks,
    })
}

/// Final gate before anything leaves the machine.
pub fn confirm_send(recipients: &[String]) -> anyhow::Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Mail will be sent to: {}.\nDo you want to send it?",
            recipients.join(", ")
        ))
        .default(false)
        .interact()?;
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("01.03.2024", 2024, 3, 1)]
    #[case("24.12.2023", 2023, 12, 24)]
    #[case("1.3.2024", 2024, 3, 1)]
    #[case(" 15.06.2022 ", 2022, 6, 15)]
    #[case("29.02.2024", 2024, 2, 29)]
    fn accepts_valid_dates(#[case] input: &str, #[case] y: i32, #[case] m: u32, #[case] d: u32) {
        let expected = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(parse_report_date(input), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("tomorrow")]
    #[case("2024-03-01")]
    #[case("03/01/2024")]
    #[case("32.01.2024")]
    #[case("31.02.2024")]
    #[case("29.02.2023")]
    #[case("01.13.2024")]
    fn rejects_invalid_dates(#[case] input: &str) {
        assert_eq!(parse_report_date(input), None);
    }
}
