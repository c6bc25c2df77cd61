// src/quiz/session.rs

use chrono::{DateTime, Utc};

use crate::models::exam::{OptionLetter, PublicExam, PublicQuestion, QuizScore, SubmitQuizRequest};

use super::{
    answers::AnswerSheet,
    client::ClientError,
    navigation::Navigator,
    submission::{Gate, SubmissionPipeline, SubmissionState, SubmitOutcome, SubmitTrigger},
    timer::{Countdown, TimeWarning, TimerEvent},
};

/// Who is taking the exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub name: String,
    pub usn: String,
}

/// What the view has to do after a submit trigger or confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStep {
    /// Ask whether to submit with this many unanswered questions.
    Confirm { unanswered: usize },
    /// Send exactly this payload, once. Answers are frozen at this point.
    Send(SubmitQuizRequest),
    Ignored,
}

/// Something a timer tick wants the view to show or do.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    Warning(TimeWarning),
    /// Time ran out; send this payload without asking.
    AutoSubmit(SubmitQuizRequest),
}

/// One learner's attempt at one exam: answers, position, clock and
/// submission state. Nothing here is persisted.
#[derive(Debug, Clone)]
pub struct ExamSession {
    exam: PublicExam,
    student: Student,
    started_at: DateTime<Utc>,
    answers: AnswerSheet,
    navigator: Navigator,
    countdown: Countdown,
    pipeline: SubmissionPipeline,
}

impl ExamSession {
    pub fn new(exam: PublicExam, student: Student, started_at: DateTime<Utc>) -> Self {
        let navigator = Navigator::new(exam.questions.len());
        let countdown = Countdown::from_minutes(exam.duration_minutes.max(0) as u32);
        Self {
            exam,
            student,
            started_at,
            answers: AnswerSheet::new(),
            navigator,
            countdown,
            pipeline: SubmissionPipeline::new(),
        }
    }

    pub fn exam(&self) -> &PublicExam {
        &self.exam
    }

    pub fn question_count(&self) -> usize {
        self.exam.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.navigator.current()
    }

    pub fn current_question(&self) -> Option<&PublicQuestion> {
        self.exam.questions.get(self.navigator.current())
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn submission_state(&self) -> &SubmissionState {
        self.pipeline.state()
    }

    pub fn selected(&self, index: usize) -> Option<OptionLetter> {
        self.answers.selected(index)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    pub fn unanswered_count(&self) -> usize {
        self.answers.unanswered_count(self.question_count())
    }

    pub fn select(&mut self, index: usize, letter: OptionLetter) {
        self.answers.select(index, letter);
    }

    pub fn select_current(&mut self, letter: OptionLetter) {
        self.answers.select(self.navigator.current(), letter);
    }

    pub fn next(&mut self) {
        self.navigator.next();
    }

    pub fn previous(&mut self) {
        self.navigator.previous();
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        self.navigator.jump_to(index)
    }

    /// Advances the clock by one second.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<TickEvent> {
        if self.pipeline.is_completed() {
            return None;
        }
        match self.countdown.tick()? {
            TimerEvent::Warning(warning) => Some(TickEvent::Warning(warning)),
            TimerEvent::Expired => match self.request_submit(SubmitTrigger::TimerExpired, now) {
                SubmitStep::Send(payload) => Some(TickEvent::AutoSubmit(payload)),
                _ => None,
            },
        }
    }

    pub fn request_submit(&mut self, trigger: SubmitTrigger, now: DateTime<Utc>) -> SubmitStep {
        let unanswered = self.unanswered_count();
        let time_left = self.countdown.has_time_left();
        let gate = self.pipeline.request(trigger, unanswered, time_left);
        self.step(gate, now)
    }

    pub fn confirm_submit(&mut self, accepted: bool, now: DateTime<Utc>) -> SubmitStep {
        let gate = self.pipeline.confirm(accepted);
        self.step(gate, now)
    }

    /// Feeds back the network result. Answers and position survive a failure.
    pub fn finish_submit(&mut self, result: Result<QuizScore, ClientError>) -> Option<SubmitOutcome> {
        self.pipeline.finish(result)
    }

    fn step(&self, gate: Gate, now: DateTime<Utc>) -> SubmitStep {
        match gate {
            Gate::Confirm { unanswered } => SubmitStep::Confirm { unanswered },
            Gate::Proceed => SubmitStep::Send(self.payload(now)),
            Gate::Ignored => SubmitStep::Ignored,
        }
    }

    fn payload(&self, submitted_at: DateTime<Utc>) -> SubmitQuizRequest {
        SubmitQuizRequest {
            exam_id: self.exam.id,
            student_name: self.student.name.clone(),
            usn: self.student.usn.clone(),
            answers: self.answers.snapshot(self.question_count()),
            started_at: self.started_at,
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        models::exam::AnswerEntry,
        quiz::client::ScoringClient,
    };

    struct CountingClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScoringClient for CountingClient {
        async fn submit(&self, request: &SubmitQuizRequest) -> Result<QuizScore, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(QuizScore {
                score: 0,
                total_questions: request.answers.len() as u32,
            })
        }
    }

    fn exam(questions: usize, minutes: i32) -> PublicExam {
        let options: BTreeMap<OptionLetter, String> = OptionLetter::ALL
            .into_iter()
            .map(|l| (l, format!("choice {l}")))
            .collect();
        PublicExam {
            id: 42,
            name: "Aptitude round".to_string(),
            duration_minutes: minutes,
            questions: (0..questions)
                .map(|i| PublicQuestion {
                    text: format!("Question {}", i + 1),
                    options: options.clone(),
                })
                .collect(),
        }
    }

    fn session(questions: usize, minutes: i32) -> ExamSession {
        let student = Student {
            name: "Asha Rao".to_string(),
            usn: "1AB21CS001".to_string(),
        };
        ExamSession::new(exam(questions, minutes), student, Utc::now())
    }

    #[test]
    fn selection_survives_navigation() {
        let mut s = session(3, 10);
        s.select_current(OptionLetter::C);
        s.next();
        s.next();
        s.jump_to(0);
        assert_eq!(s.selected(0), Some(OptionLetter::C));
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn timer_expiry_auto_submits_without_prompt() {
        let mut s = session(2, 1);
        s.select(0, OptionLetter::B);

        let mut auto = Vec::new();
        for n in 1..=60 {
            if let Some(TickEvent::AutoSubmit(payload)) = s.tick(Utc::now()) {
                auto.push((n, payload));
            }
        }

        assert_eq!(auto.len(), 1);
        let (tick, payload) = &auto[0];
        assert_eq!(*tick, 60);
        assert_eq!(
            payload.answers,
            vec![
                AnswerEntry { selected_option: Some(OptionLetter::B) },
                AnswerEntry { selected_option: None },
            ]
        );
        assert_eq!(payload.exam_id, 42);
        assert!(payload.submitted_at >= payload.started_at);
        assert_eq!(s.submission_state(), &SubmissionState::Submitting);
    }

    #[test]
    fn manual_submit_with_gaps_asks_first() {
        let mut s = session(3, 10);
        s.select(1, OptionLetter::A);
        assert_eq!(
            s.request_submit(SubmitTrigger::Manual, Utc::now()),
            SubmitStep::Confirm { unanswered: 2 }
        );
        assert_eq!(s.confirm_submit(false, Utc::now()), SubmitStep::Ignored);
        assert_eq!(s.submission_state(), &SubmissionState::Idle);
        assert_eq!(s.selected(1), Some(OptionLetter::A));
    }

    #[tokio::test]
    async fn double_submit_makes_one_network_call() {
        let client = CountingClient {
            calls: AtomicUsize::new(0),
        };
        let mut s = session(2, 10);
        s.select(0, OptionLetter::A);
        s.select(1, OptionLetter::D);

        let first = s.request_submit(SubmitTrigger::Manual, Utc::now());
        let second = s.request_submit(SubmitTrigger::Manual, Utc::now());
        assert_eq!(second, SubmitStep::Ignored);

        let mut results = Vec::new();
        for step in [first, second] {
            if let SubmitStep::Send(payload) = step {
                results.push(client.submit(&payload).await);
            }
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        let outcome = s.finish_submit(results.remove(0)).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Completed(score) if score.total_questions == 2));
    }

    #[test]
    fn answers_are_frozen_once_submitting() {
        let mut s = session(2, 10);
        s.select(0, OptionLetter::A);
        s.select(1, OptionLetter::B);
        let SubmitStep::Send(payload) = s.request_submit(SubmitTrigger::Manual, Utc::now()) else {
            panic!("expected a payload");
        };
        s.select(0, OptionLetter::D);
        assert_eq!(payload.answers[0].selected_option, Some(OptionLetter::A));
    }

    #[test]
    fn failed_submission_keeps_progress_and_allows_retry() {
        let mut s = session(2, 10);
        s.select(0, OptionLetter::A);
        s.select(1, OptionLetter::B);
        s.next();
        s.request_submit(SubmitTrigger::Manual, Utc::now());

        let outcome = s.finish_submit(Err(ClientError::Decode("eof".to_string())));
        assert!(matches!(outcome, Some(SubmitOutcome::Failed { .. })));
        assert_eq!(s.selected(0), Some(OptionLetter::A));
        assert_eq!(s.current_index(), 1);
        assert!(matches!(
            s.request_submit(SubmitTrigger::Manual, Utc::now()),
            SubmitStep::Send(_)
        ));
    }

    #[test]
    fn expiry_during_manual_submit_is_ignored() {
        let mut s = session(1, 1);
        s.select(0, OptionLetter::C);
        for _ in 0..59 {
            s.tick(Utc::now());
        }
        assert!(matches!(
            s.request_submit(SubmitTrigger::Manual, Utc::now()),
            SubmitStep::Send(_)
        ));
        assert_eq!(s.tick(Utc::now()), None);
        assert!(s.countdown().is_expired());
    }
}
