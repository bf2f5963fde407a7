use crate::bank::Question;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Question id -> selected option letter.
pub type Answers = BTreeMap<u32, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    /// Sum of the selected option scores.
    pub raw: u32,
    /// Sum of the best attainable score of every answered question.
    pub max: u32,
    pub percentage: u32,
}

/// Per-category percentages over the answered questions.
///
/// Unanswered questions are left out of both numerator and denominator, so a
/// partially completed assessment is scored on what was answered. An answer
/// naming no option scores 0 but still counts toward the maximum. Categories
/// come back in first-appearance order and only if something in them was
/// answered.
pub fn calculate_category_scores(questions: &[Question], answers: &Answers) -> Vec<CategoryScore> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<&str, (u32, u32)> = HashMap::new();

    for q in questions {
        let Some(selected) = answers.get(&q.id) else {
            continue;
        };
        let points = q.option(selected).map(|o| o.points()).unwrap_or(0);
        let entry = totals.entry(q.category.as_str()).or_insert_with(|| {
            order.push(q.category.clone());
            (0, 0)
        });
        entry.0 = entry.0.saturating_add(points);
        entry.1 = entry.1.saturating_add(q.max_score());
    }

    order
        .into_iter()
        .map(|category| {
            let (raw, max) = totals[category.as_str()];
            CategoryScore {
                percentage: percentage(raw, max),
                category,
                raw,
                max,
            }
        })
        .collect()
}

/// Rounded mean of the category percentages; 0 when nothing was answered.
pub fn calculate_overall_score(scores: &[CategoryScore]) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u32 = scores.iter().map(|s| s.percentage).sum();
    (f64::from(sum) / scores.len() as f64).round() as u32
}

/// `round(raw / max * 100)`, or 0 when `max` is 0.
pub fn percentage(raw: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    (f64::from(raw) / f64::from(max) * 100.0).round() as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{QuestionBank, QuestionOption};
    use crate::types::AssessmentKind;

    fn opt(letter: &str, score: Option<u32>) -> QuestionOption {
        QuestionOption {
            option: Some(letter.to_string()),
            text: format!("option {letter}"),
            score,
        }
    }

    fn question(id: u32, category: &str, scores: &[u32]) -> Question {
        let letters = ["a", "b", "c", "d", "e"];
        Question {
            id,
            category: category.to_string(),
            question: format!("question {id}"),
            options: scores
                .iter()
                .zip(letters)
                .map(|(s, l)| opt(l, Some(*s)))
                .collect(),
        }
    }

    fn answers(pairs: &[(u32, &str)]) -> Answers {
        pairs.iter().map(|(id, l)| (*id, l.to_string())).collect()
    }

    #[test]
    fn lowest_option_scores_zero_percent() {
        let qs = vec![question(1, "A", &[0, 5])];
        let scores = calculate_category_scores(&qs, &answers(&[(1, "a")]));
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].category, "A");
        assert_eq!(scores[0].percentage, 0);
    }

    #[test]
    fn highest_option_scores_hundred_percent() {
        let qs = vec![question(1, "A", &[0, 5])];
        let scores = calculate_category_scores(&qs, &answers(&[(1, "b")]));
        assert_eq!(scores[0].percentage, 100);
    }

    #[test]
    fn unanswered_questions_excluded_from_both_sides() {
        let qs = vec![question(1, "A", &[0, 5]), question(2, "A", &[0, 5])];
        let scores = calculate_category_scores(&qs, &answers(&[(1, "b")]));
        assert_eq!(scores[0].raw, 5);
        assert_eq!(scores[0].max, 5);
        assert_eq!(scores[0].percentage, 100);
    }

    #[test]
    fn category_with_nothing_answered_is_absent() {
        let qs = vec![question(1, "A", &[0, 5]), question(2, "B", &[0, 5])];
        let scores = calculate_category_scores(&qs, &answers(&[(2, "a")]));
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].category, "B");
    }

    #[test]
    fn unknown_letter_scores_zero_but_counts_max() {
        let qs = vec![question(1, "A", &[1, 4]), question(2, "A", &[1, 4])];
        let scores = calculate_category_scores(&qs, &answers(&[(1, "b"), (2, "z")]));
        assert_eq!(scores[0].raw, 4);
        assert_eq!(scores[0].max, 8);
        assert_eq!(scores[0].percentage, 50);
    }

    #[test]
    fn missing_option_scores_count_as_zero() {
        let qs = vec![Question {
            id: 1,
            category: "A".to_string(),
            question: "q".to_string(),
            options: vec![opt("a", None), opt("b", Some(3))],
        }];
        let scores = calculate_category_scores(&qs, &answers(&[(1, "a")]));
        assert_eq!(scores[0].max, 3);
        assert_eq!(scores[0].percentage, 0);
    }

    #[test]
    fn categories_follow_question_order() {
        let qs = vec![
            question(1, "Gamma", &[0, 1]),
            question(2, "Alpha", &[0, 1]),
            question(3, "Gamma", &[0, 1]),
        ];
        let scores =
            calculate_category_scores(&qs, &answers(&[(1, "a"), (2, "b"), (3, "b")]));
        let names: Vec<&str> = scores.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha"]);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn overall_is_rounded_mean() {
        let scores = vec![
            CategoryScore { category: "A".into(), raw: 0, max: 0, percentage: 50 },
            CategoryScore { category: "B".into(), raw: 0, max: 0, percentage: 75 },
        ];
        // 62.5 rounds up
        assert_eq!(calculate_overall_score(&scores), 63);
        assert_eq!(calculate_overall_score(&[]), 0);
    }

    #[test]
    fn fully_answered_banks_stay_within_bounds() {
        for &kind in AssessmentKind::all() {
            let bank = QuestionBank::builtin(kind).unwrap();
            let widest = bank.questions.iter().map(|q| q.options.len()).max().unwrap();
            for pick in 0..widest {
                let answers: Answers = bank
                    .questions
                    .iter()
                    .map(|q| {
                        let i = pick.min(q.options.len() - 1);
                        (q.id, q.options[i].letter().to_string())
                    })
                    .collect();
                let scores = calculate_category_scores(&bank.questions, &answers);
                assert_eq!(scores.len(), bank.category_order().len());
                for s in &scores {
                    assert!(s.percentage <= 100, "{kind}: {} = {}", s.category, s.percentage);
                }
                let mean = scores.iter().map(|s| s.percentage).sum::<u32>() as f64
                    / scores.len() as f64;
                assert_eq!(calculate_overall_score(&scores), mean.round() as u32);
            }
        }
    }
}
