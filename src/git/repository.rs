//! Git repository operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use git2::{Commit, ErrorCode, Oid, Repository, Sort};

/// Git repository wrapper
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Find the repository containing a path, searching parent directories
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        match Repository::discover(path) {
            Ok(repo) => Ok(Some(Self { repo })),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to discover git repository"),
        }
    }

    /// Path of `path` relative to the working directory, if it lies inside it
    fn relative_to_workdir(&self, path: &Path) -> Result<Option<PathBuf>> {
        let Some(workdir) = self.repo.workdir() else {
            return Ok(None);
        };
        let workdir = workdir
            .canonicalize()
            .context("Failed to resolve repository workdir")?;
        let path = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))?;

        Ok(path.strip_prefix(&workdir).ok().map(Path::to_path_buf))
    }

    /// Time of the most recent commit reachable from HEAD that changed `path`
    ///
    /// Returns `None` for an unborn HEAD, a bare repository, or a path no
    /// commit has touched.
    pub fn last_change(&self, path: &Path) -> Result<Option<DateTime<Utc>>> {
        let Some(relative) = self.relative_to_workdir(path)? else {
            return Ok(None);
        };

        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                return Ok(None)
            }
            Err(e) => return Err(e).context("Failed to get HEAD reference"),
        };
        let head_commit = head.peel_to_commit().context("HEAD is not a commit")?;

        if relative.as_os_str().is_empty() {
            return commit_time(&head_commit).map(Some);
        }

        let mut revwalk = self.repo.revwalk().context("Failed to create revwalk")?;
        revwalk
            .set_sorting(Sort::TIME)
            .context("Failed to sort revwalk")?;
        revwalk
            .push(head_commit.id())
            .context("Failed to push HEAD to revwalk")?;

        for oid in revwalk {
            let oid = oid.context("Failed to walk history")?;
            let commit = self
                .repo
                .find_commit(oid)
                .context("Failed to find commit")?;

            if touches(&commit, &relative)? {
                return commit_time(&commit).map(Some);
            }
        }

        Ok(None)
    }
}

/// Tree entry id of `path` in a commit, if present
fn entry_id(commit: &Commit, path: &Path) -> Result<Option<Oid>> {
    let tree = commit.tree().context("Failed to get commit tree")?;
    match tree.get_path(path) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e).context("Failed to read tree entry"),
    }
}

/// Whether a commit changed `path` relative to its first parent
fn touches(commit: &Commit, path: &Path) -> Result<bool> {
    let current = entry_id(commit, path)?;
    let previous = match commit.parents().next() {
        Some(parent) => entry_id(&parent, path)?,
        None => None,
    };
    Ok(current != previous)
}

fn commit_time(commit: &Commit) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(commit.time().seconds(), 0).context("Invalid commit timestamp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Signature, Time};
    use std::fs;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, relative: &str, content: &str, seconds: i64) -> Oid {
        let workdir = repo.workdir().unwrap();
        let file = workdir.join(relative);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(relative)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let signature = Signature::new("Test User", "test@example.com", &Time::new(seconds, 0)).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, "update", &tree, &parents)
            .unwrap()
    }

    #[test]
    fn discover_outside_repository() {
        let dir = TempDir::new().unwrap();
        // Only meaningful when the temp dir is not itself inside a repository.
        if Repository::discover(dir.path()).is_err() {
            assert!(GitRepository::discover(dir.path()).unwrap().is_none());
        }
    }

    #[test]
    fn unborn_head_has_no_last_change() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        let repo = GitRepository::discover(dir.path()).unwrap().unwrap();
        assert_eq!(repo.last_change(dir.path()).unwrap(), None);
    }

    #[test]
    fn root_uses_head_commit_time() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "one", 1_700_000_000);
        commit_file(&repo, "a.txt", "two", 1_700_100_000);

        let wrapper = GitRepository::discover(dir.path()).unwrap().unwrap();
        let last = wrapper.last_change(dir.path()).unwrap().unwrap();
        assert_eq!(last.timestamp(), 1_700_100_000);
    }

    #[test]
    fn subdirectory_uses_last_commit_touching_it() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "skills/weather/SKILL.md", "v1", 1_700_000_000);
        commit_file(&repo, "skills/other/SKILL.md", "v1", 1_700_200_000);

        let skill = dir.path().join("skills").join("weather");
        let wrapper = GitRepository::discover(&skill).unwrap().unwrap();
        let last = wrapper.last_change(&skill).unwrap().unwrap();
        assert_eq!(last.timestamp(), 1_700_000_000);
    }

    #[test]
    fn untracked_subdirectory_has_no_last_change() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "one", 1_700_000_000);
        let untracked = dir.path().join("scratch");
        fs::create_dir_all(&untracked).unwrap();

        let wrapper = GitRepository::discover(&untracked).unwrap().unwrap();
        assert_eq!(wrapper.last_change(&untracked).unwrap(), None);
    }
}
