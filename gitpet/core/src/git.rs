//! Git Integration
//!
//! The repository is both where activity comes from and where pet records are
//! committed back to. [`GitRepository`] implements [`ActivitySource`] by walking
//! history from `HEAD`, and [`AutoCommitSink`] by committing the pet store.
//!
//! Diff statistics are computed against the first parent only; a merge commit
//! counts what it brought in relative to the branch it was merged into.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::{Commit, ErrorCode, IndexAddOption, Oid, Repository, Signature, Sort};
use tracing::{debug, info};

use crate::activity::{ActivityIter, ActivitySource, CommitActivity, CommitAuthor};
use crate::error::Result;

// =============================================================================
// Auto-commit Sink
// =============================================================================

/// Result of an automatic commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created (hex id)
    Committed(String),
    /// The store already matches `HEAD`
    NothingToCommit,
    /// Auto-commit is turned off
    Disabled,
    /// Committing failed; the pet state was still saved
    Failed(String),
}

impl CommitOutcome {
    /// Whether a new commit exists
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Records changes to the pet store in version control
pub trait AutoCommitSink {
    /// Stage every change below `store_root` (additions, edits, deletions)
    /// and commit it with `message` as `author`
    ///
    /// # Errors
    ///
    /// Any version-control failure.
    fn commit(&self, store_root: &Path, message: &str, author: &CommitAuthor)
        -> Result<CommitOutcome>;
}

impl<T: AutoCommitSink + ?Sized> AutoCommitSink for &T {
    fn commit(
        &self,
        store_root: &Path,
        message: &str,
        author: &CommitAuthor,
    ) -> Result<CommitOutcome> {
        (**self).commit(store_root, message, author)
    }
}

/// Sink that never commits, used when auto-commit is disabled or there is no
/// repository
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCommit;

impl AutoCommitSink for NoCommit {
    fn commit(&self, _: &Path, _: &str, _: &CommitAuthor) -> Result<CommitOutcome> {
        Ok(CommitOutcome::Disabled)
    }
}

// =============================================================================
// Repository
// =============================================================================

/// A git repository with a work tree
pub struct GitRepository {
    repo: Repository,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl GitRepository {
    /// Find the repository containing `path`
    ///
    /// # Errors
    ///
    /// `Git` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path.as_ref())?;
        debug!(path = %repo.path().display(), "Opened repository");
        Ok(Self { repo })
    }

    /// Wrap an already-open repository
    #[must_use]
    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// Work tree root
    ///
    /// # Errors
    ///
    /// `Git` for bare repositories.
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| git2::Error::from_str("repository has no work tree").into())
    }

    /// `HEAD` commit, or `None` before the first commit
    fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn activity(&self, oid: Oid) -> Result<CommitActivity> {
        let commit = self.repo.find_commit(oid)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        let stats = diff.stats()?;

        let seconds = commit.time().seconds();
        let committed_at = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
            git2::Error::from_str(&format!("commit {oid} has an out-of-range timestamp"))
        })?;

        let signature = commit.author();
        let author = CommitAuthor::new(
            String::from_utf8_lossy(signature.name_bytes()),
            String::from_utf8_lossy(signature.email_bytes()),
        );

        Ok(CommitActivity {
            id: oid.to_string(),
            committed_at,
            author,
            files_touched: stats.files_changed() as u64,
            lines_inserted: stats.insertions() as u64,
            summary: String::from_utf8_lossy(commit.summary_bytes().unwrap_or_default())
                .into_owned(),
        })
    }

    /// Path of `store_root` relative to the work tree, as a git pathspec
    fn pathspec(&self, store_root: &Path) -> Result<String> {
        let relative = if store_root.is_absolute() {
            let workdir = self.workdir()?;
            store_root
                .strip_prefix(&workdir)
                .ok()
                .map(Path::to_path_buf)
                .or_else(|| {
                    // libgit2 reports the resolved work tree; the store root
                    // may still go through a symlink (and may not exist yet)
                    let workdir = workdir.canonicalize().ok()?;
                    let root = store_root
                        .parent()?
                        .canonicalize()
                        .ok()?
                        .join(store_root.file_name()?);
                    root.strip_prefix(workdir).ok().map(Path::to_path_buf)
                })
                .ok_or_else(|| {
                    git2::Error::from_str(&format!(
                        "{} is outside the work tree {}",
                        store_root.display(),
                        workdir.display()
                    ))
                })?
        } else {
            store_root.to_path_buf()
        };

        Ok(relative.to_string_lossy().replace('\\', "/"))
    }
}

impl ActivitySource for GitRepository {
    fn commits_newest_first(&self) -> Result<ActivityIter<'_>> {
        if self.head_commit()?.is_none() {
            debug!("Unborn HEAD, no history to scan");
            return Ok(Box::new(std::iter::empty()));
        }

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        walk.push_head()?;

        Ok(Box::new(
            walk.map(move |oid| oid.map_err(Into::into).and_then(|oid| self.activity(oid))),
        ))
    }
}

impl AutoCommitSink for GitRepository {
    fn commit(
        &self,
        store_root: &Path,
        message: &str,
        author: &CommitAuthor,
    ) -> Result<CommitOutcome> {
        let pathspec = self.pathspec(store_root)?;

        let mut index = self.repo.index()?;
        // Pick up changes written by other processes since the index was loaded
        index.read(false)?;
        index.add_all([pathspec.as_str()], IndexAddOption::DEFAULT, None)?;
        index.update_all([pathspec.as_str()], None)?;
        index.write()?;
        let tree_id = index.write_tree()?;

        let parent = self.head_commit()?;
        if parent.as_ref().is_some_and(|p| p.tree_id() == tree_id) {
            debug!(pathspec = %pathspec, "Store unchanged, nothing to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let tree = self.repo.find_tree(tree_id)?;
        let signature = Signature::now(&author.name, &author.email)?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        info!(commit = %oid, message, "Committed pet store");
        Ok(CommitOutcome::Committed(oid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Time;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, GitRepository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, GitRepository::from_repository(repo))
    }

    /// Write `files`, stage them and commit at `seconds` as `email`
    fn commit_files(
        dir: &Path,
        git: &GitRepository,
        files: &[(&str, &str)],
        email: &str,
        seconds: i64,
    ) -> Oid {
        let mut index = git.repo.index().unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
            index.add_path(Path::new(name)).unwrap();
        }
        index.write().unwrap();
        let tree = git.repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = Signature::new("Dev", email, &Time::new(seconds, 0)).unwrap();
        let parent = git.head_commit().unwrap();
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        git.repo
            .commit(Some("HEAD"), &signature, &signature, "work", &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_unborn_head_is_empty_history() {
        let (_dir, git) = init_repo();
        assert_eq!(git.commits_newest_first().unwrap().count(), 0);
    }

    #[test]
    fn test_history_newest_first_with_stats() {
        let (dir, git) = init_repo();
        let first = commit_files(dir.path(), &git, &[("a.txt", "one\ntwo\n")], "dev@example.com", 1_000);
        let second = commit_files(
            dir.path(),
            &git,
            &[("a.txt", "one\ntwo\nthree\n"), ("b.txt", "x\n")],
            "dev@example.com",
            2_000,
        );

        let history: Vec<CommitActivity> = git
            .commits_newest_first()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.to_string());
        assert_eq!(history[0].files_touched, 2);
        assert_eq!(history[0].lines_inserted, 2);
        assert_eq!(history[0].committed_at.timestamp(), 2_000);

        // Root commit diffs against the empty tree
        assert_eq!(history[1].id, first.to_string());
        assert_eq!(history[1].files_touched, 1);
        assert_eq!(history[1].lines_inserted, 2);
        assert_eq!(history[1].author.email, "dev@example.com");
        assert_eq!(history[1].summary, "work");
    }

    #[test]
    fn test_auto_commit_store() {
        let (dir, git) = init_repo();
        commit_files(dir.path(), &git, &[("README", "hi\n")], "dev@example.com", 1_000);

        let store = dir.path().join(".gitpet");
        std::fs::create_dir_all(store.join("pets")).unwrap();
        std::fs::write(store.join("pets").join("tom.json"), "{}\n").unwrap();

        let author = CommitAuthor::new("tom (via Gitpet)", "bot@pets.invalid");
        let outcome = git.commit(&store, "Gitpet | Updated my needs", &author).unwrap();
        assert!(outcome.is_committed());

        let head = git.head_commit().unwrap().unwrap();
        assert_eq!(head.summary(), Some("Gitpet | Updated my needs"));
        assert_eq!(head.author().email(), Some("bot@pets.invalid"));
        assert!(head
            .tree()
            .unwrap()
            .get_path(Path::new(".gitpet/pets/tom.json"))
            .is_ok());

        // Same content again
        assert_eq!(
            git.commit(&store, "again", &author).unwrap(),
            CommitOutcome::NothingToCommit
        );
    }

    #[test]
    fn test_auto_commit_records_deletion() {
        let (dir, git) = init_repo();
        let store = dir.path().join(".gitpet");
        std::fs::create_dir_all(store.join("pets")).unwrap();
        std::fs::write(store.join("pets").join("tom.json"), "{}\n").unwrap();

        let author = CommitAuthor::new("Gitpet", "bot@pets.invalid");
        // Works on an unborn branch too
        assert!(git.commit(&store, "adopt", &author).unwrap().is_committed());

        std::fs::remove_dir_all(&store).unwrap();
        assert!(git.commit(&store, "release", &author).unwrap().is_committed());

        let head = git.head_commit().unwrap().unwrap();
        assert!(head
            .tree()
            .unwrap()
            .get_path(Path::new(".gitpet"))
            .is_err());
    }

    #[test]
    fn test_store_outside_work_tree_rejected() {
        let (_dir, git) = init_repo();
        let elsewhere = TempDir::new().unwrap();
        let author = CommitAuthor::new("Gitpet", "bot@pets.invalid");
        assert!(git.commit(elsewhere.path(), "nope", &author).is_err());
    }

    #[test]
    fn test_no_commit_sink() {
        let author = CommitAuthor::new("Gitpet", "bot@pets.invalid");
        assert_eq!(
            NoCommit.commit(Path::new(".gitpet"), "x", &author).unwrap(),
            CommitOutcome::Disabled
        );
    }
}
