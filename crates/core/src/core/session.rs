//! Session state: the current result set and the submission in flight.
//!
//! Every accepted submission gets a fresh [`Ticket`]. Only the response for
//! the most recent ticket is applied; a late response for an older submission
//! is reported as [`Completion::Stale`] and changes nothing.

use crate::controls::PanelVisibility;
use crate::response::{parse_response, DropdownOption, QueryEntry, ResponseError, ResultSet};
use crate::submission::{PendingSubmission, SubmissionForm, SubmitError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A response that was applied to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub ticket: Ticket,
    pub log_text: String,
    pub options: Vec<DropdownOption>,
    /// Index to render right away (`None` for an empty result set).
    pub show_first: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied(Applied),
    Stale(Ticket),
}

#[derive(Debug, Default)]
pub struct Session {
    issued: u64,
    in_flight: Option<Ticket>,
    results: ResultSet,
    log_text: String,
    selected: Option<usize>,
    panels: PanelVisibility,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and issue a ticket. On error nothing changes and nothing may be sent.
    pub fn begin(&mut self, form: SubmissionForm) -> Result<PendingSubmission, SubmitError> {
        form.check()?;
        self.issued += 1;
        let ticket = Ticket(self.issued);
        if let Some(prev) = self.in_flight.replace(ticket) {
            tracing::info!(superseded = prev.id(), ticket = ticket.id(), "submission superseded");
        }
        self.panels = PanelVisibility::computing();
        Ok(PendingSubmission { ticket, form })
    }

    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.in_flight == Some(ticket)
    }

    /// Apply a response body for `ticket`.
    ///
    /// Errors (the server sentinel included) leave the result set untouched and
    /// only hide the "computing" indicator.
    pub fn complete(&mut self, ticket: Ticket, body: &str) -> Result<Completion, ResponseError> {
        if !self.is_current(ticket) {
            tracing::warn!(ticket = ticket.id(), "dropping stale response");
            return Ok(Completion::Stale(ticket));
        }
        self.in_flight = None;

        let parsed = match parse_response(body) {
            Ok(p) => p,
            Err(e) => {
                self.panels = PanelVisibility::failed(self.panels);
                return Err(e);
            }
        };

        self.results = parsed.results;
        self.log_text = parsed.log_text;
        self.selected = (!self.results.is_empty()).then_some(0);
        if self.results.is_empty() {
            // No chart will report ready.
            self.panels = PanelVisibility::ready();
        }

        tracing::info!(ticket = ticket.id(), queries = self.results.len(), "response applied");
        Ok(Completion::Applied(Applied {
            ticket,
            log_text: self.log_text.clone(),
            options: self.results.dropdown_options(),
            show_first: self.selected,
        }))
    }

    /// The request for `ticket` never produced a body. Returns false for stale tickets.
    pub fn fail(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight = None;
        self.panels = PanelVisibility::failed(self.panels);
        true
    }

    /// The first chart of the current result set finished its first paint.
    pub fn chart_ready(&mut self) {
        self.panels = PanelVisibility::ready();
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn log_text(&self) -> &str {
        &self.log_text
    }

    pub fn panels(&self) -> PanelVisibility {
        self.panels
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Dropdown change. Out-of-range indexes are ignored.
    pub fn select(&mut self, index: usize) -> Option<&QueryEntry> {
        let entry = self.results.entry(index)?;
        self.selected = Some(index);
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::DisplayMode;

    const MODEL: &str = "random Boolean A ~ BooleanDistrib(0.6);\nquery A;";
    const EXAMPLE: &str = r#"[{"run1":{"samples":100,"queries":{"q1":{"query":"P(A)","distribution":[["A","p"],["true",0.6],["false",0.4]]}}}}, "log ok"]"#;
    const OTHER: &str = r#"[{"run2":{"samples":7,"queries":{"a":{"query":"Q1","distribution":[]},"b":{"query":"Q2","distribution":[]}}}}, "second"]"#;

    fn form(eng: &str) -> SubmissionForm {
        SubmissionForm::new(MODEL, "1000", eng, "default")
    }

    #[test]
    fn rejected_submission_issues_no_ticket() {
        let mut s = Session::new();
        assert!(s.begin(form("ParticleFilter")).is_err());
        assert_eq!(s.in_flight(), None);
        assert_eq!(s.panels(), PanelVisibility::idle());
    }

    #[test]
    fn successful_round_trip_shows_index_zero() {
        let mut s = Session::new();
        let pending = s.begin(form("LWSampler")).expect("valid");
        assert_eq!(s.panels(), PanelVisibility::computing());

        let done = s.complete(pending.ticket(), EXAMPLE).expect("well-formed");
        let Completion::Applied(applied) = done else {
            panic!("expected applied");
        };
        assert_eq!(applied.log_text, "log ok");
        assert_eq!(applied.options.len(), 1);
        assert_eq!(applied.options[0].label, "P(A)");
        assert_eq!(applied.show_first, Some(0));
        assert_eq!(s.selected(), Some(0));

        // Panels stay in "computing" until the chart reports ready.
        assert_eq!(s.panels().computing, DisplayMode::Block);
        s.chart_ready();
        assert_eq!(s.panels(), PanelVisibility::ready());
    }

    #[test]
    fn late_response_for_superseded_ticket_is_dropped() {
        let mut s = Session::new();
        let first = s.begin(form("LWSampler")).expect("valid");
        let second = s.begin(form("MHSampler")).expect("valid");
        assert!(second.ticket() > first.ticket());

        assert!(matches!(s.complete(second.ticket(), OTHER), Ok(Completion::Applied(_))));
        assert_eq!(
            s.complete(first.ticket(), EXAMPLE).expect("no parse"),
            Completion::Stale(first.ticket())
        );
        let titles: Vec<_> = s.results().titles().collect();
        assert_eq!(titles, vec!["Q1", "Q2"]);
        assert_eq!(s.log_text(), "second");
    }

    #[test]
    fn server_error_leaves_previous_results_in_place() {
        let mut s = Session::new();
        let p = s.begin(form("LWSampler")).expect("valid");
        s.complete(p.ticket(), EXAMPLE).expect("ok");

        let p = s.begin(form("LWSampler")).expect("valid");
        let err = s.complete(p.ticket(), "error occurred").unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(s.results().len(), 1);
        assert_eq!(s.log_text(), "log ok");
        assert!(!s.panels().computing.is_visible());
        assert_eq!(s.in_flight(), None);
    }

    #[test]
    fn transport_failure_only_counts_for_the_current_ticket() {
        let mut s = Session::new();
        let old = s.begin(form("LWSampler")).expect("valid");
        let new = s.begin(form("LWSampler")).expect("valid");
        assert!(!s.fail(old.ticket()));
        assert!(s.panels().computing.is_visible());
        assert!(s.fail(new.ticket()));
        assert!(!s.panels().computing.is_visible());
    }

    #[test]
    fn empty_result_set_reveals_panels_without_a_chart() {
        let mut s = Session::new();
        let p = s.begin(form("LWSampler")).expect("valid");
        let Ok(Completion::Applied(applied)) = s.complete(p.ticket(), r#"[{}, "nothing"]"#) else {
            panic!("expected applied");
        };
        assert_eq!(applied.show_first, None);
        assert_eq!(s.panels(), PanelVisibility::ready());
    }

    #[test]
    fn select_stays_in_bounds() {
        let mut s = Session::new();
        let p = s.begin(form("LWSampler")).expect("valid");
        s.complete(p.ticket(), OTHER).expect("ok");
        assert_eq!(s.select(1).map(|e| e.title.as_str()), Some("Q2"));
        assert!(s.select(2).is_none());
        assert_eq!(s.selected(), Some(1));
    }
}
