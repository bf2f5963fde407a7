use crate::client::{self, ApiClient, PendingSubmission};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use grow_core::{
    bank::{Question, QuestionBank},
    config::Config,
    forms::Respondent,
    insights::{self, ScoreReport},
    response::AssessmentResponse,
    scoring::Answers,
    types::{AssessmentKind, Audience},
    wizard::{Step, Wizard},
};
use std::io::{BufRead, Write};
use std::path::Path;

#[derive(Subcommand)]
pub enum AssessSubcommand {
    /// List the available assessments
    List,

    /// Print every question of an assessment
    Questions { kind: String },

    /// Take an assessment in the terminal
    Take {
        kind: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        role: Option<String>,
        /// Comma-separated letters in question order (e.g. a,c,b). Prompts when omitted.
        #[arg(long)]
        answers: Option<String>,
        /// Send the result to the server instead of storing it locally
        #[arg(long)]
        submit: bool,
    },

    /// Score a set of answers without storing anything
    Score {
        kind: String,
        /// Question/letter pairs (e.g. 1=a,2=c)
        #[arg(long)]
        answers: String,
    },

    /// List stored responses
    Results {
        /// individual or organization
        #[arg(long)]
        audience: Option<String>,
    },

    /// Show one stored response
    Show { id: String },

    /// Retry submissions that could not reach the server
    Sync,
}

pub fn run(
    root: &Path,
    subcmd: AssessSubcommand,
    server: &str,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        AssessSubcommand::List => list(root, json),
        AssessSubcommand::Questions { kind } => questions(root, &kind, json),
        AssessSubcommand::Take {
            kind,
            name,
            email,
            organization,
            role,
            answers,
            submit,
        } => {
            let respondent = Respondent {
                name,
                email,
                organization,
                role,
            };
            take(root, &kind, respondent, answers.as_deref(), submit, server, json)
        }
        AssessSubcommand::Score { kind, answers } => score(root, &kind, &answers, json),
        AssessSubcommand::Results { audience } => results(root, audience.as_deref(), json),
        AssessSubcommand::Show { id } => show(root, &id, json),
        AssessSubcommand::Sync => sync(root, server, json),
    }
}

// ---------------------------------------------------------------------------
// Answer parsing
// ---------------------------------------------------------------------------

/// `a,c,b` answers the bank's questions in order.
fn parse_sequential(bank: &QuestionBank, raw: &str) -> anyhow::Result<Vec<String>> {
    let letters: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if letters.len() != bank.len() {
        anyhow::bail!(
            "{} has {} questions but {} answers were given",
            bank.kind,
            bank.len(),
            letters.len()
        );
    }
    Ok(letters)
}

/// `1=a,2=c` maps question IDs to letters.
fn parse_pairs(raw: &str) -> anyhow::Result<Answers> {
    let mut answers = Answers::new();
    for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (id, letter) = pair
            .split_once('=')
            .with_context(|| format!("expected QUESTION=LETTER, got '{pair}'"))?;
        let id: u32 = id
            .trim()
            .parse()
            .with_context(|| format!("bad question id in '{pair}'"))?;
        answers.insert(id, letter.trim().to_lowercase());
    }
    Ok(answers)
}

// ---------------------------------------------------------------------------
// list / questions
// ---------------------------------------------------------------------------

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut banks = Vec::new();
    for &kind in AssessmentKind::all() {
        banks.push(QuestionBank::load(root, kind)?);
    }

    if json {
        let items: Vec<serde_json::Value> = banks
            .iter()
            .map(|b| {
                serde_json::json!({
                    "kind": b.kind,
                    "audience": b.kind.audience(),
                    "title": b.title,
                    "question_count": b.len(),
                })
            })
            .collect();
        return print_json(&items);
    }

    let rows = banks
        .iter()
        .map(|b| {
            vec![
                b.kind.to_string(),
                b.kind.audience().to_string(),
                b.len().to_string(),
                b.title.clone(),
            ]
        })
        .collect();
    print_table(&["KIND", "AUDIENCE", "QUESTIONS", "TITLE"], rows);
    Ok(())
}

fn print_question(q: &Question, position: usize, total: usize) {
    println!("\n[{position}/{total}] {} ({})", q.question, q.category);
    for o in &q.options {
        println!("  {}) {}", o.letter(), o.text);
    }
}

fn questions(root: &Path, kind: &str, json: bool) -> anyhow::Result<()> {
    let kind: AssessmentKind = kind.parse()?;
    let bank = QuestionBank::load(root, kind)?;
    if json {
        return print_json(&bank);
    }
    println!("{}", bank.title);
    let total = bank.len();
    for (i, q) in bank.questions.iter().enumerate() {
        print_question(q, i + 1, total);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// take
// ---------------------------------------------------------------------------

fn prompt_answers(wizard: &mut Wizard) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let total = wizard.bank().len();

    while let Step::Question { index } = wizard.step() {
        if let Some(q) = wizard.current_question() {
            print_question(q, index + 1, total);
        }
        print!("answer (letter, < to go back): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            anyhow::bail!("input ended before the assessment was finished");
        };
        let input = line?.trim().to_lowercase();
        if input == "<" {
            // Identity came from flags, so the first question is as far back as it goes.
            if index > 0 {
                wizard.back();
            }
            continue;
        }
        if let Err(e) = wizard.answer(&input).and_then(|_| wizard.next()) {
            eprintln!("  {e}");
        }
    }
    Ok(())
}

fn take(
    root: &Path,
    kind: &str,
    respondent: Respondent,
    answers: Option<&str>,
    submit: bool,
    server: &str,
    json: bool,
) -> anyhow::Result<()> {
    let kind: AssessmentKind = kind.parse()?;
    let bank = QuestionBank::load(root, kind)?;
    let cfg = Config::load_or_default(root)?;

    let mut wizard = Wizard::new(bank.clone(), cfg.scoring.clone());
    wizard.set_identity(respondent)?;

    match answers {
        Some(raw) => {
            for letter in parse_sequential(wizard.bank(), raw)? {
                wizard.answer(&letter)?;
                wizard.next()?;
            }
        }
        None => prompt_answers(&mut wizard)?,
    }

    let (respondent, answers, report) = wizard
        .into_parts()
        .context("assessment did not reach the results step")?;

    if submit {
        let mut sub = PendingSubmission::new(kind, respondent, answers);
        return match ApiClient::new(server).submit(&mut sub) {
            Ok(id) => {
                if json {
                    print_json(&serde_json::json!({ "submitted": id, "report": report }))
                } else {
                    print_report(&report);
                    println!("\nSubmitted as {id}");
                    Ok(())
                }
            }
            Err(e) => {
                tracing::warn!("submission failed: {e:#}");
                let path = client::save_pending(root, &sub)?;
                if json {
                    print_json(&serde_json::json!({
                        "pending": sub.id,
                        "report": report,
                    }))
                } else {
                    print_report(&report);
                    println!(
                        "\nServer unreachable; saved to {} (run `grow assess sync` later)",
                        path.display()
                    );
                    Ok(())
                }
            }
        };
    }

    let mut response = AssessmentResponse::new(kind, respondent);
    response.record_answers(&bank, &answers)?;
    response.complete(&bank, &cfg.scoring)?;
    response.save(root)?;
    tracing::info!(id = %response.id, kind = %kind, "assessment completed");

    if json {
        return print_json(&response);
    }
    print_report(&report);
    println!("\nSaved as {}", response.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// score
// ---------------------------------------------------------------------------

fn score(root: &Path, kind: &str, raw: &str, json: bool) -> anyhow::Result<()> {
    let kind: AssessmentKind = kind.parse()?;
    let bank = QuestionBank::load(root, kind)?;
    let answers = parse_pairs(raw)?;

    let cfg = Config::load_or_default(root)?;
    let report = insights::build_report(&bank, &answers, &cfg.scoring);
    if json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &ScoreReport) {
    println!(
        "\n{}: {}% ({}), {}/{} answered",
        report.kind, report.overall, report.overall_band, report.answered, report.total
    );
    let rows = report
        .categories
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                format!("{}/{}", c.raw, c.max),
                format!("{}%", c.percentage),
                c.band.to_string(),
            ]
        })
        .collect();
    print_table(&["CATEGORY", "SCORE", "PERCENT", "BAND"], rows);

    for s in &report.strengths {
        println!("\n+ {}: {}", s.category, s.text);
    }
    for w in &report.weaknesses {
        println!("\n- {}: {}", w.category, w.text);
    }
}

// ---------------------------------------------------------------------------
// results / show
// ---------------------------------------------------------------------------

fn results(root: &Path, audience: Option<&str>, json: bool) -> anyhow::Result<()> {
    let audience: Option<Audience> = audience.map(str::parse).transpose()?;
    let responses = AssessmentResponse::list(root, audience)?;

    if json {
        return print_json(&responses);
    }
    if responses.is_empty() {
        println!("No responses.");
        return Ok(());
    }
    let rows = responses
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.kind.to_string(),
                r.respondent.email.clone(),
                if r.is_completed() { "completed" } else { "in_progress" }.to_string(),
                r.report
                    .as_ref()
                    .map(|rep| format!("{}%", rep.overall))
                    .unwrap_or_else(|| "-".to_string()),
                r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "KIND", "EMAIL", "STATUS", "OVERALL", "CREATED"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let response = AssessmentResponse::find(root, id)?;
    if json {
        return print_json(&response);
    }
    println!("ID:         {}", response.id);
    println!("Kind:       {}", response.kind);
    println!(
        "Respondent: {} <{}>",
        response.respondent.name, response.respondent.email
    );
    if let Some(org) = &response.respondent.organization {
        println!("Org:        {org}");
    }
    println!("Answers:    {}", response.answers.len());
    println!(
        "Created:    {}",
        response.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    match &response.report {
        Some(report) => print_report(report),
        None => println!("Status:     in progress"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

fn sync(root: &Path, server: &str, json: bool) -> anyhow::Result<()> {
    let pending = client::load_pending(root)?;
    let api = ApiClient::new(server);
    let mut sent = Vec::new();
    let mut failed = 0usize;

    for (path, mut sub) in pending {
        let had_server_id = sub.server_id.is_some();
        match api.submit(&mut sub) {
            Ok(id) => {
                std::fs::remove_file(&path)
                    .with_context(|| format!("failed to remove {}", path.display()))?;
                tracing::info!(pending = %sub.id, id = %id, "pending submission synced");
                sent.push(id);
            }
            Err(e) => {
                tracing::warn!(pending = %sub.id, "sync failed: {e:#}");
                if !had_server_id && sub.server_id.is_some() {
                    client::save_pending(root, &sub)?;
                }
                failed += 1;
            }
        }
    }

    if json {
        return print_json(&serde_json::json!({ "synced": sent, "failed": failed }));
    }
    println!("Synced {}, still pending {}", sent.len(), failed);
    Ok(())
}
