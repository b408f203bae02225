//! Linear step sequencing with gated advancement.
//!
//! A step that must approve leaving it claims a gate for its index. Asking
//! to advance from a gated step hands out a [`GateTicket`]; the step's
//! verdict comes back through [`Stepper::resolve`]. While a ticket is
//! outstanding further requests are refused, so a double click cannot run
//! a step twice.

use std::collections::BTreeSet;

use serde::Serialize;

/// Display state of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDescriptor {
    pub label: String,
    pub skippable: bool,
    /// `None` until the step has reported a result.
    pub error: Option<bool>,
}

impl StepDescriptor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            skippable: false,
            error: None,
        }
    }

    #[must_use]
    pub fn skippable(mut self) -> Self {
        self.skippable = true;
        self
    }
}

/// A step's verdict on leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub go_to_next: bool,
    pub error: Option<bool>,
}

impl StepResult {
    /// Step succeeded; move on.
    pub fn advance() -> Self {
        Self {
            go_to_next: true,
            error: Some(false),
        }
    }

    /// Step failed; stay and flag it.
    pub fn failed() -> Self {
        Self {
            go_to_next: false,
            error: Some(true),
        }
    }
}

/// Why the stepper left its step range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Advanced past the last step.
    Finished,
    /// Went back from the first step.
    Back,
}

/// Effect of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stayed,
    Moved { from: usize, to: usize },
    Exit(ExitReason),
}

/// Proof that the gated step at `step` was asked for its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateTicket {
    step: usize,
    seq: u64,
}

impl GateTicket {
    pub fn step(&self) -> usize {
        self.step
    }
}

/// Answer to [`Stepper::request_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRequest {
    /// A verdict is still outstanding; nothing happened.
    Busy,
    /// The active step had no gate and the stepper moved.
    Advanced(Transition),
    /// The active step must deliver a verdict for this ticket.
    Gate(GateTicket),
}

#[derive(Debug, Clone)]
pub struct Stepper {
    steps: Vec<StepDescriptor>,
    active: usize,
    gates: BTreeSet<usize>,
    pending: Option<GateTicket>,
    next_seq: u64,
}

impl Stepper {
    pub fn new(steps: Vec<StepDescriptor>) -> Self {
        Self {
            steps,
            active: 0,
            gates: BTreeSet::new(),
            pending: None,
            next_seq: 0,
        }
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    /// Index of the active step; equals `steps().len()` once finished.
    pub fn active_step_index(&self) -> usize {
        self.active
    }

    pub fn active_step(&self) -> Option<&StepDescriptor> {
        self.steps.get(self.active)
    }

    pub fn is_finished(&self) -> bool {
        self.active >= self.steps.len()
    }

    /// True while a gate verdict is outstanding.
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Gate advancement from `step` on its verdict.
    pub fn claim_gate(&mut self, step: usize) {
        self.gates.insert(step);
    }

    pub fn release_gate(&mut self, step: usize) {
        self.gates.remove(&step);
    }

    pub fn has_gate(&self, step: usize) -> bool {
        self.gates.contains(&step)
    }

    /// Asks to leave the active step.
    pub fn request_next(&mut self) -> NextRequest {
        if self.pending.is_some() {
            tracing::debug!(step = self.active, "Step verdict pending; ignoring next");
            return NextRequest::Busy;
        }
        if self.is_finished() {
            return NextRequest::Advanced(Transition::Stayed);
        }
        if !self.gates.contains(&self.active) {
            return NextRequest::Advanced(self.advance());
        }

        let ticket = GateTicket {
            step: self.active,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending = Some(ticket);
        NextRequest::Gate(ticket)
    }

    /// Delivers the verdict for `ticket`.
    ///
    /// The verdict's error flag is recorded on the ticket's step. A ticket
    /// that is not the outstanding one is ignored.
    pub fn resolve(&mut self, ticket: GateTicket, result: StepResult) -> Transition {
        if self.pending != Some(ticket) {
            tracing::warn!(step = ticket.step, "Ignoring verdict for a stale gate ticket");
            return Transition::Stayed;
        }
        self.pending = None;

        if let Some(step) = self.steps.get_mut(ticket.step) {
            step.error = result.error;
        }
        if result.go_to_next {
            self.advance()
        } else {
            Transition::Stayed
        }
    }

    /// Moves back one step. At the first step the index stays at 0 and the
    /// caller is told to leave backwards.
    pub fn prev_step(&mut self) -> Transition {
        if self.pending.is_some() {
            return Transition::Stayed;
        }
        if self.active == 0 {
            return Transition::Exit(ExitReason::Back);
        }
        let from = self.active;
        self.active -= 1;
        tracing::debug!(from, to = self.active, "Stepped back");
        Transition::Moved {
            from,
            to: self.active,
        }
    }

    fn advance(&mut self) -> Transition {
        let from = self.active;
        if from + 1 >= self.steps.len() {
            self.active = self.steps.len();
            tracing::debug!(from, "Left the last step");
            return Transition::Exit(ExitReason::Finished);
        }
        self.active = from + 1;
        tracing::debug!(from, to = self.active, "Advanced");
        Transition::Moved {
            from,
            to: self.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_steps() -> Stepper {
        Stepper::new(vec![
            StepDescriptor::new("one"),
            StepDescriptor::new("two"),
            StepDescriptor::new("three"),
        ])
    }

    #[test]
    fn ungated_steps_advance_directly() {
        let mut stepper = three_steps();
        assert_eq!(
            stepper.request_next(),
            NextRequest::Advanced(Transition::Moved { from: 0, to: 1 })
        );
        assert_eq!(stepper.active_step_index(), 1);
    }

    #[test]
    fn second_request_while_waiting_is_a_no_op() {
        let mut stepper = three_steps();
        stepper.claim_gate(0);

        let NextRequest::Gate(ticket) = stepper.request_next() else {
            panic!("gated step should hand out a ticket");
        };
        assert!(stepper.is_waiting());
        assert_eq!(stepper.request_next(), NextRequest::Busy);
        assert_eq!(stepper.active_step_index(), 0);

        assert_eq!(
            stepper.resolve(ticket, StepResult::advance()),
            Transition::Moved { from: 0, to: 1 }
        );
        assert!(!stepper.is_waiting());
    }

    #[test]
    fn failed_verdict_records_error_and_stays() {
        let mut stepper = three_steps();
        stepper.claim_gate(0);
        let NextRequest::Gate(ticket) = stepper.request_next() else {
            panic!("expected gate");
        };

        assert_eq!(stepper.resolve(ticket, StepResult::failed()), Transition::Stayed);
        assert_eq!(stepper.active_step_index(), 0);
        assert_eq!(stepper.steps()[0].error, Some(true));

        let NextRequest::Gate(ticket) = stepper.request_next() else {
            panic!("expected gate");
        };
        stepper.resolve(ticket, StepResult::advance());
        assert_eq!(stepper.steps()[0].error, Some(false));
        assert_eq!(stepper.active_step_index(), 1);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut stepper = three_steps();
        stepper.claim_gate(0);
        let NextRequest::Gate(first) = stepper.request_next() else {
            panic!("expected gate");
        };
        stepper.resolve(first, StepResult::failed());
        let NextRequest::Gate(second) = stepper.request_next() else {
            panic!("expected gate");
        };

        assert_eq!(stepper.resolve(first, StepResult::advance()), Transition::Stayed);
        assert!(stepper.is_waiting());
        assert_eq!(
            stepper.resolve(second, StepResult::advance()),
            Transition::Moved { from: 0, to: 1 }
        );
    }

    #[test]
    fn gate_of_another_step_does_not_apply() {
        let mut stepper = three_steps();
        stepper.claim_gate(0);
        let NextRequest::Gate(ticket) = stepper.request_next() else {
            panic!("expected gate");
        };
        stepper.resolve(ticket, StepResult::advance());

        // Step 0 still holds its gate, step 1 has none.
        assert!(stepper.has_gate(0));
        assert_eq!(
            stepper.request_next(),
            NextRequest::Advanced(Transition::Moved { from: 1, to: 2 })
        );

        stepper.claim_gate(2);
        stepper.release_gate(2);
        assert_eq!(
            stepper.request_next(),
            NextRequest::Advanced(Transition::Exit(ExitReason::Finished))
        );
    }

    #[test]
    fn advancing_past_last_step_exits() {
        let mut stepper = three_steps();
        stepper.request_next();
        stepper.request_next();
        assert_eq!(
            stepper.request_next(),
            NextRequest::Advanced(Transition::Exit(ExitReason::Finished))
        );
        assert!(stepper.is_finished());
        assert_eq!(stepper.active_step_index(), 3);
        assert!(stepper.active_step().is_none());
        assert_eq!(
            stepper.request_next(),
            NextRequest::Advanced(Transition::Stayed)
        );
    }

    #[test]
    fn prev_step_clamps_at_zero() {
        let mut stepper = three_steps();
        assert_eq!(stepper.prev_step(), Transition::Exit(ExitReason::Back));
        assert_eq!(stepper.active_step_index(), 0);

        stepper.request_next();
        assert_eq!(stepper.prev_step(), Transition::Moved { from: 1, to: 0 });
        assert_eq!(stepper.active_step_index(), 0);
    }
}
