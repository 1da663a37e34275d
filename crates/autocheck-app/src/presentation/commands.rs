use autocheck_domain::check::CheckStatus;
use autocheck_domain::events::{BatchSummary, EventReceiver, RunnerEventKind};
use autocheck_domain::shared::TabId;
use std::fmt::Write as _;
use tracing::{info, warn};

use super::console::ConsolePresenter;
use super::error::CommandError;
use super::state::AppState;
use crate::application::services::Dispatcher;
use crate::application::ResultExt;

/// One line per tab: id, system, checks in run order, scheduled check last
pub fn list_tabs(state: &AppState) -> String {
    let mut out = String::new();
    for dispatcher in state.registry.dispatchers() {
        let tab = dispatcher.tab();
        let checks = tab
            .checks()
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(out, "{} (system {}): {}", tab.id(), tab.system(), checks);
        if let Some(scheduled) = tab.scheduled() {
            let _ = write!(
                out,
                "; scheduled: {} at {}",
                scheduled.name(),
                state.timings.scheduled_at
            );
        }
        out.push('\n');
    }
    out
}

/// Run one check, or the whole tab, printing events until the batch ends.
///
/// Ctrl-C cancels every tab and waits the configured grace before aborting.
/// Returns `None` when the run was interrupted that way.
pub async fn run_tab(
    state: &AppState,
    rx: &mut EventReceiver,
    presenter: &ConsolePresenter,
    tab: &str,
    check: Option<&str>,
    with_scheduled: bool,
) -> Result<Option<BatchSummary>, CommandError> {
    let dispatcher = state.registry.tab(&TabId::from_string(tab))?;

    let batch = match check {
        Some(name) => dispatcher.run_single(name),
        None => dispatcher.run_all(with_scheduled),
    };
    let batch = match batch {
        Ok(batch) => batch,
        Err(e) => {
            presenter.drain(rx);
            return Err(e.into());
        }
    };
    info!("▶️  Batch {} started on tab {}", batch, tab);

    let mut summary = None;
    tokio::select! {
        _ = presenter.run_until(rx, |event| match &event.kind {
            RunnerEventKind::BatchFinished { summary: finished }
                if event.batch.as_ref() == Some(&batch) =>
            {
                summary = Some(finished.clone());
                true
            }
            _ => false,
        }) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.to_infra_err()?;
            warn!("🛑 Interrupted, shutting down");
            state.registry.shutdown(state.timings.shutdown_grace).await;
            presenter.drain(rx);
        }
    }

    print!("{}", status_table(&dispatcher));
    Ok(summary)
}

pub fn status_table(dispatcher: &Dispatcher) -> String {
    let statuses = dispatcher.statuses();
    let width = statuses
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (name, status) in statuses {
        let padding = width - name.chars().count();
        let _ = writeln!(
            out,
            "  {}{}  {}",
            name,
            " ".repeat(padding),
            status_label(status)
        );
    }
    out
}

fn status_label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Default => "-",
        CheckStatus::Running => "RUNNING",
        CheckStatus::Success => "OK",
        CheckStatus::Error => "ERROR",
    }
}
