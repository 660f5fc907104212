//! Repository Activity Records
//!
//! What the reducer needs to know about a commit, independent of where the
//! history comes from. [`ActivitySource`] is the seam between the simulation
//! and version control: the git-backed implementation lives in
//! [`crate::git`], and a plain `Vec<CommitActivity>` works as an in-memory
//! source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Author of a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitAuthor {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl CommitAuthor {
    /// Create an author
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl std::fmt::Display for CommitAuthor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Activity summary of one commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitActivity {
    /// Commit id (hex)
    pub id: String,
    /// Commit timestamp
    pub committed_at: DateTime<Utc>,
    /// Commit author
    pub author: CommitAuthor,
    /// Number of files changed
    pub files_touched: u64,
    /// Number of lines inserted
    pub lines_inserted: u64,
    /// First line of the commit message
    pub summary: String,
}

// =============================================================================
// System Identity
// =============================================================================

/// The reserved identity gitpet commits its own checkpoints under.
///
/// Commits authored with this email never feed the pet, otherwise every save
/// would produce a commit that feeds the pet on the next run. Matching is on
/// the email address only, compared exactly (ignoring ASCII case), so a human
/// whose display name happens to contain "Gitpet" still counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemIdentity {
    /// Display name for adopt/release commits
    pub name: String,
    /// Reserved email address shared by every automatic commit
    pub email: String,
}

impl Default for SystemIdentity {
    fn default() -> Self {
        Self {
            name: "Gitpet".to_string(),
            email: "gitpet@users.noreply.invalid".to_string(),
        }
    }
}

impl SystemIdentity {
    /// Create an identity
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Whether `author` is this identity
    #[must_use]
    pub fn is_self(&self, author: &CommitAuthor) -> bool {
        author.email.trim().eq_ignore_ascii_case(self.email.trim())
    }

    /// Author used for store-wide commits (adopt, release)
    #[must_use]
    pub fn author(&self) -> CommitAuthor {
        CommitAuthor::new(self.name.clone(), self.email.clone())
    }

    /// Author used for commits made on behalf of a pet
    #[must_use]
    pub fn for_pet(&self, pet_name: &str) -> CommitAuthor {
        CommitAuthor::new(format!("{pet_name} (via {})", self.name), self.email.clone())
    }
}

// =============================================================================
// Activity Source
// =============================================================================

/// Iterator over commits, newest first. Items are fallible so a failure in the
/// middle of a scan can be reported.
pub type ActivityIter<'a> = Box<dyn Iterator<Item = Result<CommitActivity>> + 'a>;

/// Source of commit activity
///
/// Implementations must yield commits in non-increasing timestamp order; the
/// reducer stops at the first commit older than the checkpoint. Histories with
/// skewed timestamps (rebases, wrong clocks) can therefore be over- or
/// under-counted.
pub trait ActivitySource {
    /// Start a scan from the newest commit
    ///
    /// # Errors
    ///
    /// Fails if the history cannot be opened at all.
    fn commits_newest_first(&self) -> Result<ActivityIter<'_>>;
}

impl<T: ActivitySource + ?Sized> ActivitySource for &T {
    fn commits_newest_first(&self) -> Result<ActivityIter<'_>> {
        (**self).commits_newest_first()
    }
}

impl ActivitySource for Vec<CommitActivity> {
    fn commits_newest_first(&self) -> Result<ActivityIter<'_>> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_self_matches_email_exactly() {
        let identity = SystemIdentity::default();

        assert!(identity.is_self(&CommitAuthor::new(
            "anything",
            "gitpet@users.noreply.invalid"
        )));
        assert!(identity.is_self(&CommitAuthor::new(
            "tom (via Gitpet)",
            "GITPET@users.noreply.invalid"
        )));

        // Name alone is not enough
        assert!(!identity.is_self(&CommitAuthor::new("Gitpet Fan", "fan@example.com")));
        // Substrings are not enough
        assert!(!identity.is_self(&CommitAuthor::new(
            "x",
            "not-gitpet@users.noreply.invalid"
        )));
    }

    #[test]
    fn test_for_pet_uses_reserved_email() {
        let identity = SystemIdentity::new("Gitpet", "bot@pets.invalid");
        let author = identity.for_pet("tom");

        assert_eq!(author.name, "tom (via Gitpet)");
        assert!(identity.is_self(&author));
        assert!(identity.is_self(&identity.author()));
    }

    #[test]
    fn test_author_display() {
        let author = CommitAuthor::new("Ada", "ada@example.com");
        assert_eq!(author.to_string(), "Ada <ada@example.com>");
    }

    #[test]
    fn test_vec_source_preserves_order() {
        let commits: Vec<CommitActivity> = (0..3)
            .map(|i| CommitActivity {
                id: format!("c{i}"),
                committed_at: DateTime::from_timestamp(0, 0).unwrap(),
                author: CommitAuthor::new("Ada", "ada@example.com"),
                files_touched: 1,
                lines_inserted: 1,
                summary: String::new(),
            })
            .collect();

        let ids: Vec<String> = commits
            .commits_newest_first()
            .unwrap()
            .map(|c| c.unwrap().id)
            .collect();
        assert_eq!(ids, vec!["c0", "c1", "c2"]);
    }
}
