// src/quiz/submission.rs

use crate::models::exam::QuizScore;

use super::client::ClientError;

/// Who asked for the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The learner pressed submit.
    Manual,
    /// The countdown ran out. Never asks for confirmation.
    TimerExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    /// Waiting for the learner to confirm submitting with unanswered questions.
    Confirming { unanswered: usize },
    /// Request in flight; every further trigger is ignored.
    Submitting,
    Completed(QuizScore),
    /// Last attempt failed; behaves like `Idle` for the next trigger.
    Failed { message: String },
}

/// Result of asking the pipeline to move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Ask the learner first.
    Confirm { unanswered: usize },
    /// Now in `Submitting`: build the payload and send it.
    Proceed,
    /// Nothing to do.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(QuizScore),
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPipeline {
    state: SubmissionState,
}

impl Default for SubmissionPipeline {
    fn default() -> Self {
        Self {
            state: SubmissionState::Idle,
        }
    }
}

impl SubmissionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, SubmissionState::Completed(_))
    }

    /// Handles a submit trigger. The busy flag is set here, before any I/O.
    pub fn request(&mut self, trigger: SubmitTrigger, unanswered: usize, time_left: bool) -> Gate {
        match (&self.state, trigger) {
            (SubmissionState::Submitting | SubmissionState::Completed(_), _) => Gate::Ignored,
            (SubmissionState::Confirming { .. }, SubmitTrigger::Manual) => Gate::Ignored,
            (_, SubmitTrigger::TimerExpired) => {
                self.state = SubmissionState::Submitting;
                Gate::Proceed
            }
            (_, SubmitTrigger::Manual) if unanswered > 0 && time_left => {
                self.state = SubmissionState::Confirming { unanswered };
                Gate::Confirm { unanswered }
            }
            (_, SubmitTrigger::Manual) => {
                self.state = SubmissionState::Submitting;
                Gate::Proceed
            }
        }
    }

    /// The learner's answer to the confirmation prompt.
    /// Declining returns to `Idle` with nothing else touched.
    pub fn confirm(&mut self, accepted: bool) -> Gate {
        if !matches!(self.state, SubmissionState::Confirming { .. }) {
            return Gate::Ignored;
        }
        if accepted {
            self.state = SubmissionState::Submitting;
            Gate::Proceed
        } else {
            self.state = SubmissionState::Idle;
            Gate::Ignored
        }
    }

    /// Records the network result. `None` unless a request was in flight.
    pub fn finish(&mut self, result: Result<QuizScore, ClientError>) -> Option<SubmitOutcome> {
        if !self.is_busy() {
            return None;
        }
        let outcome = match result {
            Ok(score) => {
                self.state = SubmissionState::Completed(score);
                SubmitOutcome::Completed(score)
            }
            Err(err) => {
                let message = err.user_message();
                self.state = SubmissionState::Failed {
                    message: message.clone(),
                };
                SubmitOutcome::Failed { message }
            }
        };
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::client::GENERIC_SUBMIT_FAILURE;

    const SCORE: QuizScore = QuizScore {
        score: 3,
        total_questions: 4,
    };

    #[test]
    fn complete_sheet_submits_without_confirmation() {
        let mut pipeline = SubmissionPipeline::new();
        assert_eq!(pipeline.request(SubmitTrigger::Manual, 0, true), Gate::Proceed);
        assert!(pipeline.is_busy());
    }

    #[test]
    fn unanswered_questions_need_confirmation() {
        let mut pipeline = SubmissionPipeline::new();
        assert_eq!(
            pipeline.request(SubmitTrigger::Manual, 2, true),
            Gate::Confirm { unanswered: 2 }
        );
        assert_eq!(pipeline.confirm(false), Gate::Ignored);
        assert_eq!(pipeline.state(), &SubmissionState::Idle);

        pipeline.request(SubmitTrigger::Manual, 2, true);
        assert_eq!(pipeline.confirm(true), Gate::Proceed);
        assert!(pipeline.is_busy());
    }

    #[test]
    fn no_confirmation_once_time_is_gone() {
        let mut pipeline = SubmissionPipeline::new();
        assert_eq!(pipeline.request(SubmitTrigger::Manual, 5, false), Gate::Proceed);
    }

    #[test]
    fn timer_bypasses_an_open_confirmation() {
        let mut pipeline = SubmissionPipeline::new();
        pipeline.request(SubmitTrigger::Manual, 1, true);
        assert_eq!(pipeline.request(SubmitTrigger::TimerExpired, 1, false), Gate::Proceed);
        assert_eq!(pipeline.confirm(true), Gate::Ignored);
    }

    #[test]
    fn triggers_while_submitting_are_ignored() {
        let mut pipeline = SubmissionPipeline::new();
        assert_eq!(pipeline.request(SubmitTrigger::Manual, 0, true), Gate::Proceed);
        assert_eq!(pipeline.request(SubmitTrigger::Manual, 0, true), Gate::Ignored);
        assert_eq!(pipeline.request(SubmitTrigger::TimerExpired, 0, false), Gate::Ignored);
    }

    #[test]
    fn failure_allows_a_manual_retry() {
        let mut pipeline = SubmissionPipeline::new();
        pipeline.request(SubmitTrigger::Manual, 0, true);
        let outcome = pipeline.finish(Err(ClientError::Decode("boom".to_string())));
        assert_eq!(
            outcome,
            Some(SubmitOutcome::Failed {
                message: GENERIC_SUBMIT_FAILURE.to_string()
            })
        );
        assert_eq!(pipeline.request(SubmitTrigger::Manual, 0, true), Gate::Proceed);
        assert_eq!(pipeline.finish(Ok(SCORE)), Some(SubmitOutcome::Completed(SCORE)));
        assert!(pipeline.is_completed());
        assert_eq!(pipeline.request(SubmitTrigger::Manual, 0, true), Gate::Ignored);
    }

    #[test]
    fn stray_results_are_dropped() {
        let mut pipeline = SubmissionPipeline::new();
        assert_eq!(pipeline.finish(Ok(SCORE)), None);
        assert_eq!(pipeline.state(), &SubmissionState::Idle);
    }
}
