mod cli;
mod config;
mod mailer;
mod prompt;
mod recipients;
mod report;

pub use cli::Cli;
use config::Config;
use console::style;
use log::warn;
use mailer::Mailer;
use report::ComposedReport;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    print_banner();

    let recipients = recipients::load_or_init(&cli.get_recipients_path())?;
    if recipients.is_empty() {
        warn!("No recipients configured, sending will fail");
    }

    let config = Config::load_or_init(&cli.get_config_path())?;

    let mailer = Mailer::new(&config)?;
    match mailer.verify() {
        Ok(()) => println!("{}", style("Connected with SMTP server!").green()),
        Err(e) => {
            eprintln!("{}", style("Error connecting to SMTP server!").red());
            return Err(e);
        }
    }

    let answers = prompt::collect_answers()?;
    let report = report::compose(&answers, &config);

    print_preview(&report);

    if prompt::confirm_send(&recipients)? {
        let response = mailer.send(&report, &recipients)?;
        let detail = response.message().collect::<Vec<_>>().join(" ");
        println!(
            "{}",
            style(format!(
                "Mail successfully sent: {} {detail}",
                response.code()
            ))
            .green()
        );
    } else {
        println!("{}", style("Cancelled.").red());
    }

    Ok(())
}

fn print_banner() {
    let separator = style("===").yellow();
    let title = style(format!("(Daily) Reporter v{}", env!("CARGO_PKG_VERSION"))).blue();
    println!(" {separator} {title} {separator} ");
}

fn print_preview(report: &ComposedReport) {
    println!();
    println!("{}", "=".repeat(20));
    println!();
    println!("Mail preview:");
    println!();
    println!("{}", report.subject);
    println!("{}", "-".repeat(20));
    println!("{}", report.body);
    println!();
    println!("{}", "=".repeat(20));
    println!();
}
