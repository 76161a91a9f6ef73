use crate::domain::Commit;
use crate::error::Result;
use crate::git::Repository;

/// Mock repository for testing without actual git operations
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    /// Linear history, oldest first
    commits: Vec<Commit>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit on top of the history
    pub fn add_commit(&mut self, commit: Commit) {
        self.commits.push(commit);
    }

    /// Builder-style variant of [MockRepository::add_commit]
    pub fn with_commit(mut self, commit: Commit) -> Self {
        self.add_commit(commit);
        self
    }
}

impl Repository for MockRepository {
    fn head_commit_hash(&self) -> Result<Option<String>> {
        Ok(self.commits.last().map(|c| c.hash.clone()))
    }

    fn commits_since(&self, since: Option<&str>) -> Result<Vec<Commit>> {
        let start = since
            .and_then(|hash| self.commits.iter().position(|c| c.hash == hash))
            .map_or(0, |index| index + 1);
        Ok(self.commits[start..].to_vec())
    }

    fn contains_commit(&self, hash: &str) -> Result<bool> {
        Ok(self.commits.iter().any(|c| c.hash == hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn commit(hash: &str, message: &str) -> Commit {
        Commit::new(hash, message, "Test Author", Utc::now(), vec![])
    }

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert_eq!(repo.head_commit_hash().unwrap(), None);
        assert!(repo.commits_since(None).unwrap().is_empty());
    }

    #[test]
    fn test_mock_repository_since() {
        let repo = MockRepository::new()
            .with_commit(commit("aaa", "first commit"))
            .with_commit(commit("bbb", "second commit"))
            .with_commit(commit("ccc", "third commit"));

        assert_eq!(repo.head_commit_hash().unwrap(), Some("ccc".to_string()));
        let since = repo.commits_since(Some("aaa")).unwrap();
        assert_eq!(since.len(), 2);
        assert_eq!(since[0].hash, "bbb");
        assert_eq!(repo.commits_since(Some("unknown")).unwrap().len(), 3);
        assert!(repo.contains_commit("bbb").unwrap());
        assert!(!repo.contains_commit("unknown").unwrap());
    }
}
