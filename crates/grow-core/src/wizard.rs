//! The multi-step assessment flow: identity, one question per step, results.

use crate::bank::{Question, QuestionBank};
use crate::config::ScoringConfig;
use crate::error::{GrowError, Result};
use crate::forms::Respondent;
use crate::insights::{self, ScoreReport};
use crate::scoring::Answers;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Identity,
    Question { index: usize },
    Results,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    bank: QuestionBank,
    scoring: ScoringConfig,
    step: Step,
    respondent: Option<Respondent>,
    answers: Answers,
    report: Option<ScoreReport>,
}

impl Wizard {
    pub fn new(bank: QuestionBank, scoring: ScoringConfig) -> Self {
        Self {
            bank,
            scoring,
            step: Step::Identity,
            respondent: None,
            answers: Answers::new(),
            report: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn respondent(&self) -> Option<&Respondent> {
        self.respondent.as_ref()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    /// `(answered, total)` for the progress bar.
    pub fn progress(&self) -> (usize, usize) {
        let answered = self
            .bank
            .questions
            .iter()
            .filter(|q| self.answers.contains_key(&q.id))
            .count();
        (answered, self.bank.len())
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.step {
            Step::Question { index } => self.bank.questions.get(index),
            _ => None,
        }
    }

    /// Selected letter for the current question, if any.
    pub fn current_answer(&self) -> Option<&str> {
        let q = self.current_question()?;
        self.answers.get(&q.id).map(String::as_str)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    pub fn set_identity(&mut self, respondent: Respondent) -> Result<()> {
        if self.step != Step::Identity {
            return Err(GrowError::InvalidStep(
                "identity can only be set on the first step".to_string(),
            ));
        }
        respondent.validate()?;
        self.respondent = Some(respondent);
        self.step = Step::Question { index: 0 };
        Ok(())
    }

    pub fn answer(&mut self, letter: &str) -> Result<()> {
        let q = self
            .current_question()
            .ok_or_else(|| GrowError::InvalidStep("no question on this step".to_string()))?;
        if q.option(letter).is_none() {
            return Err(GrowError::InvalidOption {
                question: q.id,
                option: letter.to_string(),
            });
        }
        let id = q.id;
        self.answers.insert(id, letter.to_string());
        Ok(())
    }

    /// Advance; past the last question this scores the answers.
    pub fn next(&mut self) -> Result<Step> {
        let Step::Question { index } = self.step else {
            return Err(GrowError::InvalidStep(format!(
                "cannot advance from {:?}",
                self.step
            )));
        };
        if self.current_answer().is_none() {
            return Err(GrowError::InvalidStep(
                "answer the current question before continuing".to_string(),
            ));
        }
        if index + 1 < self.bank.len() {
            self.step = Step::Question { index: index + 1 };
        } else {
            self.report = Some(insights::build_report(
                &self.bank,
                &self.answers,
                &self.scoring,
            ));
            self.step = Step::Results;
        }
        Ok(self.step)
    }

    /// Go back one step. Answers are kept; leaving the results discards the
    /// report so it is recomputed on the way forward.
    pub fn back(&mut self) -> Step {
        self.step = match self.step {
            Step::Identity | Step::Question { index: 0 } => Step::Identity,
            Step::Question { index } => Step::Question { index: index - 1 },
            Step::Results => {
                self.report = None;
                Step::Question {
                    index: self.bank.len().saturating_sub(1),
                }
            }
        };
        self.step
    }

    /// Consume the finished wizard, yielding what a submission needs.
    pub fn into_parts(self) -> Option<(Respondent, Answers, ScoreReport)> {
        match (self.respondent, self.report) {
            (Some(r), Some(report)) => Some((r, self.answers, report)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
