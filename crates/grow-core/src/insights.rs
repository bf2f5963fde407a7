//! Turns raw category scores into the result page: bands, chart series and
//! the bank's static strength/weakness text.

use crate::bank::QuestionBank;
use crate::config::ScoringConfig;
use crate::scoring::{self, Answers};
use crate::types::{AssessmentKind, Band};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub raw: u32,
    pub max: u32,
    pub percentage: u32,
    pub band: Band,
}

/// Parallel label/value arrays for the radar or bar chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub kind: AssessmentKind,
    pub categories: Vec<CategoryResult>,
    pub overall: u32,
    pub overall_band: Band,
    pub answered: usize,
    pub total: usize,
    pub chart: ChartSeries,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<Insight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weaknesses: Vec<Insight>,
}

impl ScoreReport {
    pub fn category(&self, name: &str) -> Option<&CategoryResult> {
        self.categories.iter().find(|c| c.category == name)
    }
}

pub fn band_for(percentage: u32, cfg: &ScoringConfig) -> Band {
    if percentage >= cfg.strength_threshold {
        Band::Strong
    } else if percentage < cfg.focus_threshold {
        Band::NeedsFocus
    } else {
        Band::Developing
    }
}

/// Score `answers` against `bank` and attach the result text.
pub fn build_report(bank: &QuestionBank, answers: &Answers, cfg: &ScoringConfig) -> ScoreReport {
    let scores = scoring::calculate_category_scores(&bank.questions, answers);
    let overall = scoring::calculate_overall_score(&scores);
    let answered = bank
        .questions
        .iter()
        .filter(|q| answers.contains_key(&q.id))
        .count();

    let mut chart = ChartSeries::default();
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut categories = Vec::with_capacity(scores.len());

    for s in scores {
        let band = band_for(s.percentage, cfg);
        chart.labels.push(s.category.clone());
        chart.values.push(s.percentage);

        if let Some(info) = bank.category_info(&s.category) {
            match band {
                Band::Strong if !info.strength.is_empty() => strengths.push(Insight {
                    category: s.category.clone(),
                    text: info.strength.clone(),
                }),
                Band::NeedsFocus if !info.weakness.is_empty() => weaknesses.push(Insight {
                    category: s.category.clone(),
                    text: info.weakness.clone(),
                }),
                _ => {}
            }
        }

        categories.push(CategoryResult {
            category: s.category,
            raw: s.raw,
            max: s.max,
            percentage: s.percentage,
            band,
        });
    }

    tracing::debug!(kind = %bank.kind, overall, answered, "scored assessment");

    ScoreReport {
        kind: bank.kind,
        categories,
        overall,
        overall_band: band_for(overall, cfg),
        answered,
        total: bank.len(),
        chart,
        strengths,
        weaknesses,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
