use crate::error::{GrowError, Result};
use crate::types::{AssessmentKind, Audience};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const GROW_DIR: &str = ".grow";
pub const RESPONSES_DIR: &str = ".grow/responses";
pub const BANKS_DIR: &str = ".grow/banks";
pub const CARTS_DIR: &str = ".grow/carts";
pub const PENDING_DIR: &str = ".grow/pending";
pub const COMMUNITY_DIR: &str = ".grow/community";

pub const CONFIG_FILE: &str = ".grow/config.yaml";
pub const CATALOG_FILE: &str = ".grow/catalog.yaml";
pub const LEADS_FILE: &str = ".grow/leads.yaml";
pub const USERS_FILE: &str = ".grow/users.yaml";
pub const SESSIONS_FILE: &str = ".grow/sessions.yaml";
pub const PURCHASES_FILE: &str = ".grow/purchases.yaml";
pub const POSTS_FILE: &str = ".grow/community/posts.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn catalog_path(root: &Path) -> PathBuf {
    root.join(CATALOG_FILE)
}

pub fn leads_path(root: &Path) -> PathBuf {
    root.join(LEADS_FILE)
}

pub fn users_path(root: &Path) -> PathBuf {
    root.join(USERS_FILE)
}

pub fn sessions_path(root: &Path) -> PathBuf {
    root.join(SESSIONS_FILE)
}

pub fn purchases_path(root: &Path) -> PathBuf {
    root.join(PURCHASES_FILE)
}

pub fn posts_path(root: &Path) -> PathBuf {
    root.join(POSTS_FILE)
}

pub fn responses_dir(root: &Path, audience: Audience) -> PathBuf {
    root.join(RESPONSES_DIR).join(audience.as_str())
}

pub fn response_path(root: &Path, audience: Audience, id: &str) -> PathBuf {
    responses_dir(root, audience).join(format!("{id}.yaml"))
}

pub fn bank_override_path(root: &Path, kind: AssessmentKind) -> PathBuf {
    root.join(BANKS_DIR).join(format!("{}.json", kind.as_str()))
}

pub fn cart_path(root: &Path, user_id: &str) -> PathBuf {
    root.join(CARTS_DIR).join(format!("{user_id}.yaml"))
}

pub fn pending_dir(root: &Path) -> PathBuf {
    root.join(PENDING_DIR)
}

pub fn pending_path(root: &Path, id: &str) -> PathBuf {
    pending_dir(root).join(format!("{id}.json"))
}

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(GrowError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Response and user IDs end up as file names; only accept the hyphenated
/// uuid alphabet so a path segment can never escape its directory.
pub fn validate_file_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
