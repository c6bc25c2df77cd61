// src/models/exam.rs

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// One of the four choices of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [OptionLetter::A, OptionLetter::B, OptionLetter::C, OptionLetter::D];

    /// Parses `a`..`d` case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLetter::A),
            'B' => Some(OptionLetter::B),
            'C' => Some(OptionLetter::C),
            'D' => Some(OptionLetter::D),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
            OptionLetter::D => "D",
        };
        f.write_str(letter)
    }
}

/// A question with its answer key. Never sent to students as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Question {
    #[validate(length(min = 1, max = 2000, message = "Question text must be between 1 and 2000 characters"))]
    pub text: String,
    #[validate(custom(function = validate_options))]
    pub options: BTreeMap<OptionLetter, String>,
    pub answer: OptionLetter,
}

/// Represents the 'exams' table in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: i64,
    pub name: String,
    pub duration_minutes: i32,
    #[sqlx(json)]
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

impl Exam {
    pub fn to_public(&self) -> PublicExam {
        PublicExam {
            id: self.id,
            name: self.name.clone(),
            duration_minutes: self.duration_minutes,
            questions: self
                .questions
                .iter()
                .map(|q| PublicQuestion {
                    text: q.text.clone(),
                    options: q.options.clone(),
                })
                .collect(),
        }
    }

    pub fn summary(&self) -> ExamSummary {
        ExamSummary {
            id: self.id,
            name: self.name.clone(),
            duration_minutes: self.duration_minutes,
            question_count: self.questions.len(),
        }
    }
}

/// DTO for sending a question to students (excludes the answer key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub text: String,
    pub options: BTreeMap<OptionLetter, String>,
}

/// DTO for sending an exam to students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicExam {
    pub id: i64,
    pub name: String,
    pub duration_minutes: i32,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSummary {
    pub id: i64,
    pub name: String,
    pub duration_minutes: i32,
    pub question_count: usize,
}

/// DTO for creating an exam (admin).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 200, message = "Exam name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(range(min = 1, max = 300, message = "Duration must be between 1 and 300 minutes"))]
    pub duration_minutes: i32,
    #[validate(length(min = 1, max = 200, message = "An exam needs between 1 and 200 questions"), nested)]
    pub questions: Vec<Question>,
}

/// One entry of the ordered answer list; `None` means unanswered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub selected_option: Option<OptionLetter>,
}

/// Body of `POST /api/exams/submit-quiz`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    pub exam_id: i64,
    #[validate(length(min = 1, max = 100, message = "Student name must be between 1 and 100 characters"))]
    pub student_name: String,
    #[validate(length(min = 1, max = 20, message = "USN must be between 1 and 20 characters"))]
    pub usn: String,
    pub answers: Vec<AnswerEntry>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}

/// What the student gets back after submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    pub score: u32,
    pub total_questions: u32,
}

/// Represents the 'quiz_results' table in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: i64,
    pub exam_id: i64,
    pub student_name: String,
    pub usn: String,
    pub score: i32,
    pub total_questions: i32,
    #[sqlx(json)]
    pub answers: Vec<AnswerEntry>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A scored submission ready to be stored.
#[derive(Debug, Clone)]
pub struct NewQuizResult {
    pub exam_id: i64,
    pub student_name: String,
    pub usn: String,
    pub score: QuizScore,
    pub answers: Vec<AnswerEntry>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}

/// One point per answer matching the key. Missing and null entries score nothing.
pub fn score_answers(questions: &[Question], answers: &[AnswerEntry]) -> QuizScore {
    let score = questions
        .iter()
        .zip(answers)
        .filter(|(question, entry)| entry.selected_option == Some(question.answer))
        .count();

    QuizScore {
        score: score as u32,
        total_questions: questions.len() as u32,
    }
}

fn validate_options(options: &BTreeMap<OptionLetter, String>) -> Result<(), ValidationError> {
    let complete = OptionLetter::ALL.iter().all(|letter| {
        options
            .get(letter)
            .is_some_and(|text| !text.trim().is_empty() && text.len() <= 500)
    });
    if !complete {
        let mut err = ValidationError::new("options_incomplete");
        err.message = Some("Every question needs options A, B, C and D (max 500 characters each)".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: OptionLetter) -> Question {
        Question {
            text: "Pick one".to_string(),
            options: OptionLetter::ALL
                .into_iter()
                .map(|l| (l, format!("Option {l}")))
                .collect(),
            answer,
        }
    }

    #[test]
    fn scoring_counts_only_matching_letters() {
        let questions = vec![
            question(OptionLetter::B),
            question(OptionLetter::C),
            question(OptionLetter::A),
        ];
        let answers = vec![
            AnswerEntry { selected_option: Some(OptionLetter::B) },
            AnswerEntry { selected_option: None },
        ];
        let result = score_answers(&questions, &answers);
        assert_eq!(result, QuizScore { score: 1, total_questions: 3 });
    }

    #[test]
    fn public_view_hides_answers() {
        let exam = Exam {
            id: 7,
            name: "Aptitude".to_string(),
            duration_minutes: 10,
            questions: vec![question(OptionLetter::D)],
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(exam.to_public()).unwrap();
        assert!(json["questions"][0].get("answer").is_none());
        assert_eq!(json["questions"][0]["options"]["A"], "Option A");
        assert_eq!(json["durationMinutes"], 10);
    }

    #[test]
    fn submission_payload_uses_camel_case_and_nulls() {
        let req = SubmitQuizRequest {
            exam_id: 1,
            student_name: "Asha".to_string(),
            usn: "1AB21CS001".to_string(),
            answers: vec![
                AnswerEntry { selected_option: Some(OptionLetter::B) },
                AnswerEntry { selected_option: None },
            ],
            started_at: Utc::now(),
            submitted_at: Utc::now(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["answers"],
            serde_json::json!([{ "selectedOption": "B" }, { "selectedOption": null }])
        );
        assert!(json.get("examId").is_some());
        assert!(json.get("startedAt").is_some());
    }

    #[test]
    fn questions_need_all_four_options() {
        let mut q = question(OptionLetter::A);
        q.options.remove(&OptionLetter::D);
        assert!(q.validate().is_err());
    }
}
