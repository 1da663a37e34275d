use autocheck_domain::check::Severity;
use autocheck_domain::events::{EventReceiver, RunnerEvent, RunnerEventKind};
use std::io::Write;
use std::time::Duration;

/// What one event turns into on the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Permanent log line
    Line(String),
    /// Overwritten in place by the next transient line
    Transient(String),
}

/// Single reader of the runner event channel, printing to stdout
pub struct ConsolePresenter {
    color: bool,
}

impl ConsolePresenter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, event: &RunnerEvent) -> Option<Rendered> {
        let stamp = event.occurred_at.format("%H:%M:%S");
        let prefix = format!("[{}] [{}]", stamp, event.tab);

        let text = match &event.kind {
            RunnerEventKind::LogLine { message, severity } => self.paint(message, *severity),
            RunnerEventKind::WaitProgress { name, remaining } => {
                format!("{}: {} left", name, format_countdown(*remaining))
            }
            RunnerEventKind::LogCleared => "----".to_string(),
            RunnerEventKind::BatchFinished { summary } => {
                let severity = if summary.failed > 0 {
                    Severity::Error
                } else if summary.was_interrupted() {
                    Severity::Warning
                } else {
                    Severity::Success
                };
                self.paint(&format!("Summary: {}", summary), severity)
            }
            // Statuses are shown from the status board, not the log
            RunnerEventKind::CheckStarted { .. }
            | RunnerEventKind::CheckFinished { .. }
            | RunnerEventKind::StatusesReset => return None,
        };

        let line = format!("{} {}", prefix, text);
        Some(if event.kind.is_transient() {
            Rendered::Transient(line)
        } else {
            Rendered::Line(line)
        })
    }

    fn paint(&self, text: &str, severity: Severity) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match severity {
            Severity::Info => return text.to_string(),
            Severity::Success => "32",
            Severity::Warning => "33",
            Severity::Error => "31",
        };
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }

    /// Print events until `stop` says so or every sender is gone
    pub async fn run_until<F>(&self, rx: &mut EventReceiver, mut stop: F)
    where
        F: FnMut(&RunnerEvent) -> bool,
    {
        let mut terminal = Terminal::default();

        while let Some(event) = rx.recv().await {
            terminal.print(self.render(&event));
            if stop(&event) {
                break;
            }
        }

        terminal.finish();
    }

    /// Print whatever is already queued without waiting for more
    pub fn drain(&self, rx: &mut EventReceiver) -> usize {
        let mut terminal = Terminal::default();
        let mut count = 0;

        while let Ok(event) = rx.try_recv() {
            terminal.print(self.render(&event));
            count += 1;
        }

        terminal.finish();
        count
    }
}

#[derive(Default)]
struct Terminal {
    transient_open: bool,
}

impl Terminal {
    fn print(&mut self, rendered: Option<Rendered>) {
        let mut stdout = std::io::stdout();
        match rendered {
            Some(Rendered::Line(line)) => {
                if self.transient_open {
                    let _ = writeln!(stdout);
                    self.transient_open = false;
                }
                let _ = writeln!(stdout, "{}", line);
            }
            Some(Rendered::Transient(line)) => {
                let _ = write!(stdout, "\r{}", line);
                let _ = stdout.flush();
                self.transient_open = true;
            }
            None => {}
        }
    }

    fn finish(&mut self) {
        if self.transient_open {
            let _ = writeln!(std::io::stdout());
            self.transient_open = false;
        }
    }
}

/// `HH:MM`, minutes rounded down, as the countdown is shown to the operator
pub fn format_countdown(remaining: Duration) -> String {
    let minutes = remaining.as_secs() / 60;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocheck_domain::events::BatchSummary;
    use autocheck_domain::shared::{SystemId, TabId};
    use chrono::{Local, TimeZone};

    fn event(kind: RunnerEventKind) -> RunnerEvent {
        RunnerEvent {
            tab: TabId::from_string("П"),
            system: SystemId::from_string("P"),
            batch: None,
            kind,
            occurred_at: Local.with_ymd_and_hms(2024, 3, 4, 9, 0, 5).unwrap(),
        }
    }

    #[test]
    fn test_countdown_format() {
        assert_eq!(format_countdown(Duration::from_secs(75 * 60)), "01:15");
        assert_eq!(format_countdown(Duration::from_secs(59)), "00:00");
        assert_eq!(
            format_countdown(Duration::from_secs((23 * 60 + 15) * 60 + 30)),
            "23:15"
        );
    }

    #[test]
    fn test_log_line_rendering() {
        let presenter = ConsolePresenter::new(false);
        let rendered = presenter.render(&event(RunnerEventKind::LogLine {
            message: "Starting check: Проверка адаптера".to_string(),
            severity: Severity::Info,
        }));

        assert_eq!(
            rendered,
            Some(Rendered::Line(
                "[09:00:05] [П] Starting check: Проверка адаптера".to_string()
            ))
        );
    }

    #[test]
    fn test_error_lines_are_red_when_colored() {
        let presenter = ConsolePresenter::new(true);
        let rendered = presenter.render(&event(RunnerEventKind::LogLine {
            message: "boom".to_string(),
            severity: Severity::Error,
        }));

        assert_eq!(
            rendered,
            Some(Rendered::Line("[09:00:05] [П] \x1b[31mboom\x1b[0m".to_string()))
        );
    }

    #[test]
    fn test_progress_is_transient() {
        let presenter = ConsolePresenter::new(false);
        let rendered = presenter.render(&event(RunnerEventKind::WaitProgress {
            name: "Проверка PowerBi".to_string(),
            remaining: Duration::from_secs(15 * 60),
        }));

        assert_eq!(
            rendered,
            Some(Rendered::Transient(
                "[09:00:05] [П] Проверка PowerBi: 00:15 left".to_string()
            ))
        );
    }

    #[test]
    fn test_only_wait_progress_is_overwritten() {
        let presenter = ConsolePresenter::new(false);
        let progress = event(RunnerEventKind::WaitProgress {
            name: "Проверка PowerBi".to_string(),
            remaining: Duration::from_secs(90 * 60),
        });
        let line = event(RunnerEventKind::LogLine {
            message: "Waiting for 09:15".to_string(),
            severity: Severity::Info,
        });

        assert!(progress.kind.is_transient());
        assert!(matches!(presenter.render(&progress), Some(Rendered::Transient(_))));
        assert!(!line.kind.is_transient());
        assert!(matches!(presenter.render(&line), Some(Rendered::Line(_))));
        assert!(matches!(
            presenter.render(&event(RunnerEventKind::LogCleared)),
            Some(Rendered::Line(_))
        ));
    }

    #[test]
    fn test_lifecycle_events_are_not_printed() {
        let presenter = ConsolePresenter::new(false);
        assert!(presenter
            .render(&event(RunnerEventKind::CheckStarted {
                name: "x".to_string()
            }))
            .is_none());
        assert!(presenter
            .render(&event(RunnerEventKind::StatusesReset))
            .is_none());
    }

    #[test]
    fn test_batch_summary_line() {
        let presenter = ConsolePresenter::new(false);
        let mut summary = BatchSummary::new(2);
        summary.succeeded = 2;

        let rendered = presenter.render(&event(RunnerEventKind::BatchFinished { summary }));

        assert_eq!(
            rendered,
            Some(Rendered::Line(
                "[09:00:05] [П] Summary: total=2, succeeded=2, failed=0, cancelled=0, skipped=0"
                    .to_string()
            ))
        );
    }

    #[test]
    fn test_drain_consumes_queued_events() {
        let (tx, mut rx) = autocheck_domain::events::event_channel();
        tx.send(event(RunnerEventKind::LogCleared)).unwrap();
        tx.send(event(RunnerEventKind::StatusesReset)).unwrap();

        let presenter = ConsolePresenter::new(false);
        assert_eq!(presenter.drain(&mut rx), 2);
        assert_eq!(presenter.drain(&mut rx), 0);
    }
}
