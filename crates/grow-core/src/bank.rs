//! Question banks: the fixed multiple-choice sequences behind every
//! assessment.
//!
//! Banks ship inside the binary as JSON. A site can override one by dropping
//! a file of the same shape at `.grow/banks/<kind>.json`.

use crate::error::{GrowError, Result};
use crate::paths;
use crate::scoring::Answers;
use crate::types::AssessmentKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const CAREER_JSON: &str = include_str!("../banks/career.json");
const DIGITAL_TWIN_JSON: &str = include_str!("../banks/digital_twin.json");
const ORGANIZATION_JSON: &str = include_str!("../banks/organization.json");
const DIAGNOSTIC_JSON: &str = include_str!("../banks/diagnostic.json");
const GROWTH_SEEKER_JSON: &str = include_str!("../banks/growth_seeker.json");

/// Largest weight a single option may carry.
pub const MAX_OPTION_SCORE: u32 = 1000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Letter the respondent picks. Filled in by position when a bank omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    pub text: String,
    /// Author-assigned weight; a missing score counts as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl QuestionOption {
    pub fn letter(&self) -> &str {
        self.option.as_deref().unwrap_or("")
    }

    pub fn points(&self) -> u32 {
        self.score.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub category: String,
    pub question: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn option(&self, letter: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.letter() == letter)
    }

    /// Highest attainable score for this question.
    pub fn max_score(&self) -> u32 {
        self.options.iter().map(QuestionOption::points).max().unwrap_or(0)
    }
}

/// Static result text attached to a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub weakness: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub kind: AssessmentKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<CategoryInfo>,
    pub questions: Vec<Question>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl QuestionBank {
    /// Parse, fill in missing option letters, and validate a bank.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut bank: QuestionBank = serde_json::from_str(json)?;
        bank.normalize();
        bank.validate()?;
        Ok(bank)
    }

    /// The bank compiled into the binary for `kind`.
    pub fn builtin(kind: AssessmentKind) -> Result<Self> {
        let json = match kind {
            AssessmentKind::Career => CAREER_JSON,
            AssessmentKind::DigitalTwin => DIGITAL_TWIN_JSON,
            AssessmentKind::Organization => ORGANIZATION_JSON,
            AssessmentKind::Diagnostic => DIAGNOSTIC_JSON,
            AssessmentKind::GrowthSeeker => GROWTH_SEEKER_JSON,
        };
        let bank = Self::from_json(json)?;
        if bank.kind != kind {
            return Err(GrowError::InvalidBank(format!(
                "bundled bank for '{kind}' declares kind '{}'",
                bank.kind
            )));
        }
        Ok(bank)
    }

    /// The site override at `.grow/banks/<kind>.json` if present, otherwise
    /// the bundled bank.
    pub fn load(root: &Path, kind: AssessmentKind) -> Result<Self> {
        let path = paths::bank_override_path(root, kind);
        if !path.exists() {
            return Self::builtin(kind);
        }
        let json = std::fs::read_to_string(&path)?;
        let bank = Self::from_json(&json)?;
        if bank.kind != kind {
            return Err(GrowError::InvalidBank(format!(
                "{} declares kind '{}'",
                path.display(),
                bank.kind
            )));
        }
        tracing::debug!(kind = %kind, path = %path.display(), "using question bank override");
        Ok(bank)
    }

    fn normalize(&mut self) {
        for q in &mut self.questions {
            for (i, opt) in q.options.iter_mut().enumerate() {
                let missing = opt.option.as_deref().map(str::trim).unwrap_or("").is_empty();
                if missing {
                    opt.option = Some(position_letter(i));
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.questions.is_empty() {
            return Err(GrowError::InvalidBank(format!(
                "bank '{}' has no questions",
                self.kind
            )));
        }
        let mut ids = HashSet::new();
        for q in &self.questions {
            if !ids.insert(q.id) {
                return Err(GrowError::InvalidBank(format!(
                    "duplicate question id {}",
                    q.id
                )));
            }
            if q.category.trim().is_empty() {
                return Err(GrowError::InvalidBank(format!(
                    "question {} has no category",
                    q.id
                )));
            }
            if q.options.len() < 2 {
                return Err(GrowError::InvalidBank(format!(
                    "question {} needs at least two options",
                    q.id
                )));
            }
            let mut letters = HashSet::new();
            for opt in &q.options {
                if !letters.insert(opt.letter()) {
                    return Err(GrowError::InvalidBank(format!(
                        "question {} repeats option '{}'",
                        q.id,
                        opt.letter()
                    )));
                }
                if opt.points() > MAX_OPTION_SCORE {
                    return Err(GrowError::InvalidBank(format!(
                        "question {} option '{}' scores above {MAX_OPTION_SCORE}",
                        q.id,
                        opt.letter()
                    )));
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Every answer must name a question in this bank and one of its letters.
    pub fn check_answers(&self, answers: &Answers) -> Result<()> {
        for (&qid, letter) in answers {
            let q = self.question(qid).ok_or(GrowError::QuestionNotFound(qid))?;
            if q.option(letter).is_none() {
                return Err(GrowError::InvalidOption {
                    question: qid,
                    option: letter.clone(),
                });
            }
        }
        Ok(())
    }

    /// Category names in the order they first appear in the question list.
    pub fn category_order(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .map(|q| q.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn category_info(&self, name: &str) -> Option<&CategoryInfo> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// `0 -> "a"`, `1 -> "b"`, … `25 -> "z"`, then `"a2"`, `"b2"`, …
fn position_letter(i: usize) -> String {
    let letter = (b'a' + (i % 26) as u8) as char;
    match i / 26 {
        0 => letter.to_string(),
        n => format!("{letter}{}", n + 1),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_answers_rejects_unknown_question_and_letter() {
        let bank = QuestionBank::builtin(AssessmentKind::DigitalTwin).unwrap();
        let mut answers = Answers::new();
        answers.insert(1, "a".to_string());
        bank.check_answers(&answers).unwrap();

        answers.insert(1, "z".to_string());
        assert!(matches!(
            bank.check_answers(&answers),
            Err(GrowError::InvalidOption { question: 1, .. })
        ));

        let mut unknown = Answers::new();
        unknown.insert(999, "a".to_string());
        assert!(matches!(
            bank.check_answers(&unknown),
            Err(GrowError::QuestionNotFound(999))
        ));
    }

    #[test]
    fn all_bundled_banks_load() {
        for &kind in AssessmentKind::all() {
            let bank = QuestionBank::builtin(kind)
                .unwrap_or_else(|e| panic!("bank {kind} failed to load: {e}"));
            assert_eq!(bank.kind, kind);
            assert!(!bank.is_empty());
            for category in bank.category_order() {
                assert!(
                    bank.category_info(category).is_some(),
                    "{kind}: category '{category}' has no result text"
                );
            }
        }
    }

    #[test]
    fn digital_twin_has_ten_questions() {
        let bank = QuestionBank::builtin(AssessmentKind::DigitalTwin).unwrap();
        assert_eq!(bank.len(), 10);
    }

    #[test]
    fn missing_letters_filled_by_position() {
        let bank = QuestionBank::builtin(AssessmentKind::GrowthSeeker).unwrap();
        let q = bank.question(1).unwrap();
        let letters: Vec<&str> = q.options.iter().map(QuestionOption::letter).collect();
        assert_eq!(letters, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_score_counts_as_zero() {
        let bank = QuestionBank::builtin(AssessmentKind::GrowthSeeker).unwrap();
        let q = bank.question(5).unwrap();
        assert_eq!(q.option("a").unwrap().points(), 0);
        assert_eq!(q.max_score(), 3);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let json = r#"{
            "kind": "career", "title": "t",
            "questions": [
                {"id": 1, "category": "A", "question": "q", "options": [{"text": "x"}, {"text": "y"}]},
                {"id": 1, "category": "A", "question": "q", "options": [{"text": "x"}, {"text": "y"}]}
            ]
        }"#;
        let err = QuestionBank::from_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate question id 1"));
    }

    #[test]
    fn oversized_score_rejected() {
        let json = r#"{
            "kind": "career", "title": "t",
            "questions": [
                {"id": 1, "category": "A", "question": "q",
                 "options": [{"text": "x", "score": 0}, {"text": "y", "score": 4294967295}]}
            ]
        }"#;
        let err = QuestionBank::from_json(json).unwrap_err();
        assert!(matches!(err, GrowError::InvalidBank(_)));
        assert!(err.to_string().contains("question 1 option 'b'"));
    }

    #[test]
    fn single_option_question_rejected() {
        let json = r#"{
            "kind": "career", "title": "t",
            "questions": [
                {"id": 1, "category": "A", "question": "q", "options": [{"text": "only"}]}
            ]
        }"#;
        assert!(QuestionBank::from_json(json).is_err());
    }

    #[test]
    fn category_order_is_first_appearance() {
        let json = r#"{
            "kind": "career", "title": "t",
            "questions": [
                {"id": 1, "category": "B", "question": "q", "options": [{"text": "x"}, {"text": "y"}]},
                {"id": 2, "category": "A", "question": "q", "options": [{"text": "x"}, {"text": "y"}]},
                {"id": 3, "category": "B", "question": "q", "options": [{"text": "x"}, {"text": "y"}]}
            ]
        }"#;
        let bank = QuestionBank::from_json(json).unwrap();
        assert_eq!(bank.category_order(), vec!["B", "A"]);
    }

    #[test]
    fn override_file_takes_precedence() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = paths::bank_override_path(dir.path(), AssessmentKind::Career);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"kind": "career", "title": "Custom",
                "questions": [{"id": 7, "category": "Only", "question": "q",
                               "options": [{"text": "x", "score": 0}, {"text": "y", "score": 2}]}]}"#,
        )
        .unwrap();
        let bank = QuestionBank::load(dir.path(), AssessmentKind::Career).unwrap();
        assert_eq!(bank.title, "Custom");
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn override_with_wrong_kind_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = paths::bank_override_path(dir.path(), AssessmentKind::Career);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"kind": "diagnostic", "title": "Wrong",
                "questions": [{"id": 1, "category": "A", "question": "q",
                               "options": [{"text": "x"}, {"text": "y"}]}]}"#,
        )
        .unwrap();
        assert!(QuestionBank::load(dir.path(), AssessmentKind::Career).is_err());
    }

    #[test]
    fn position_letters_wrap() {
        assert_eq!(position_letter(0), "a");
        assert_eq!(position_letter(25), "z");
        assert_eq!(position_letter(26), "a2");
    }
}
