//! Lead store for every accepted form submission.
//!
//! Layout:
//!   .grow/leads.yaml   `seq` counter plus the leads, oldest first
//!
//! IDs are sequential (L1, L2, L3, …) and come from `seq`, which only grows,
//! so a deleted lead's ID is never handed out again.

use crate::error::{GrowError, Result};
use crate::forms::{CoachApplication, ContactForm, DigitalTwinEnrollment, PlaybookRequest};
use crate::{io, paths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Contact,
    Playbook,
    CoachApplication,
    DigitalTwin,
}

impl LeadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadKind::Contact => "contact",
            LeadKind::Playbook => "playbook",
            LeadKind::CoachApplication => "coach_application",
            LeadKind::DigitalTwin => "digital_twin",
        }
    }
}

impl fmt::Display for LeadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadKind {
    type Err = GrowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "contact" => Ok(LeadKind::Contact),
            "playbook" => Ok(LeadKind::Playbook),
            "coach_application" | "coach" => Ok(LeadKind::CoachApplication),
            "digital_twin" => Ok(LeadKind::DigitalTwin),
            _ => Err(GrowError::field("kind", format!("unknown lead kind '{s}'"))),
        }
    }
}

/// The validated form, tagged by which page it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeadForm {
    Contact(ContactForm),
    Playbook(PlaybookRequest),
    CoachApplication(CoachApplication),
    DigitalTwin(DigitalTwinEnrollment),
}

impl LeadForm {
    pub fn kind(&self) -> LeadKind {
        match self {
            LeadForm::Contact(_) => LeadKind::Contact,
            LeadForm::Playbook(_) => LeadKind::Playbook,
            LeadForm::CoachApplication(_) => LeadKind::CoachApplication,
            LeadForm::DigitalTwin(_) => LeadKind::DigitalTwin,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            LeadForm::Contact(f) => f.validate(),
            LeadForm::Playbook(f) => f.validate(),
            LeadForm::CoachApplication(f) => f.validate(),
            LeadForm::DigitalTwin(f) => f.validate(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LeadForm::Contact(f) => &f.name,
            LeadForm::Playbook(f) => &f.name,
            LeadForm::CoachApplication(f) => &f.name,
            LeadForm::DigitalTwin(f) => &f.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            LeadForm::Contact(f) => &f.email,
            LeadForm::Playbook(f) => &f.email,
            LeadForm::CoachApplication(f) => &f.email,
            LeadForm::DigitalTwin(f) => &f.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub form: LeadForm,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn kind(&self) -> LeadKind {
        self.form.kind()
    }
}

// ---------------------------------------------------------------------------
// Internal file I/O
// ---------------------------------------------------------------------------

/// On-disk shape of `.grow/leads.yaml`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LeadStore {
    /// Last sequence number handed out.
    #[serde(default)]
    seq: u64,
    #[serde(default)]
    leads: Vec<Lead>,
}

impl LeadStore {
    fn next_id(&mut self) -> String {
        // A hand-edited file may hold IDs past the counter; never collide with them.
        let highest = self
            .leads
            .iter()
            .filter_map(|l| l.id.strip_prefix('L')?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.seq = self.seq.max(highest) + 1;
        format!("L{}", self.seq)
    }
}

fn load_store(root: &Path) -> Result<LeadStore> {
    io::read_yaml_or_default(&paths::leads_path(root))
}

fn save_store(root: &Path, store: &LeadStore) -> Result<()> {
    io::write_yaml(&paths::leads_path(root), store)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate and store a submission. Returns the stored lead.
pub fn submit(root: &Path, form: LeadForm) -> Result<Lead> {
    form.validate()?;
    let mut store = load_store(root)?;
    let lead = Lead {
        id: store.next_id(),
        form,
        created_at: Utc::now(),
    };
    store.leads.push(lead.clone());
    save_store(root, &store)?;
    tracing::info!(id = %lead.id, kind = %lead.kind(), "lead submitted");
    Ok(lead)
}

/// List leads (oldest first), optionally only one kind.
pub fn list(root: &Path, kind: Option<LeadKind>) -> Result<Vec<Lead>> {
    let mut leads = load_store(root)?.leads;
    if let Some(k) = kind {
        leads.retain(|l| l.kind() == k);
    }
    Ok(leads)
}

pub fn get(root: &Path, id: &str) -> Result<Lead> {
    load_store(root)?
        .leads
        .into_iter()
        .find(|l| l.id == id)
        .ok_or_else(|| GrowError::LeadNotFound(id.to_string()))
}

/// Delete a lead by ID. Returns `false` if no such lead exists.
pub fn delete(root: &Path, id: &str) -> Result<bool> {
    let mut store = load_store(root)?;
    let before = store.leads.len();
    store.leads.retain(|l| l.id != id);
    if store.leads.len() == before {
        return Ok(false);
    }
    save_store(root, &store)?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
