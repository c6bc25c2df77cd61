// src/quiz/mod.rs

//! Learner-side exam state: answers, navigation, countdown and the
//! submission pipeline, plus the tick source and HTTP client that drive them.
//!
//! Everything except [`ticker`] and [`client`] is synchronous and owns no I/O.
//! A view calls the [`session::ExamSession`] methods on input and on each
//! tick, and performs the network call itself when handed a payload.

pub mod answers;
pub mod client;
pub mod navigation;
pub mod session;
pub mod submission;
pub mod ticker;
pub mod timer;

pub use client::{ClientError, HttpExamClient, ScoringClient};
pub use session::{ExamSession, Student, SubmitStep, TickEvent};
pub use submission::{SubmissionState, SubmitOutcome, SubmitTrigger};
pub use ticker::Ticker;
