//! Run-scoped workspace registry.
//!
//! Maps repository names to workspace identifiers so that repeated
//! repositories within one dataset slice reuse the workspace provisioned
//! for them earlier in the run. Entries are append-only and never evicted:
//! a repo present in the map always refers to a workspace that was created
//! successfully during this run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::actions::{ActionClient, ActionError, CloneRepositoryRequest};

/// Create-or-reuse workspace bookkeeping for a single evaluation run.
pub struct WorkspaceRegistry {
    /// Remote action-execution client.
    actions: Arc<dyn ActionClient>,
    /// Repository name -> workspace identifier.
    workspaces: HashMap<String, String>,
}

impl WorkspaceRegistry {
    /// Create an empty registry backed by the given action client.
    pub fn new(actions: Arc<dyn ActionClient>) -> Self {
        Self {
            actions,
            workspaces: HashMap::new(),
        }
    }

    /// Resolve a workspace for `repo`, provisioning one on first sight.
    ///
    /// First occurrence of a repository: create a workspace, clone the
    /// repository into it, record the mapping. Subsequent occurrences:
    /// reset the existing clone to its base commit instead of provisioning
    /// again. Either way the workspace id is returned.
    pub async fn acquire(&mut self, repo: &str) -> Result<String, ActionError> {
        if let Some(workspace_id) = self.workspaces.get(repo) {
            info!(repo = repo, workspace_id = %workspace_id, "Resetting repository to base commit");
            let request = CloneRepositoryRequest::reset(workspace_id.clone(), repo);
            self.actions.clone_repository(&request).await?;
            return Ok(workspace_id.clone());
        }

        let start = Instant::now();
        let created = self.actions.create_workspace().await?;
        info!(
            workspace_id = %created.workspace_id,
            elapsed = ?start.elapsed(),
            "Workspace created"
        );

        let start = Instant::now();
        let request = CloneRepositoryRequest::clone_into(created.workspace_id.clone(), repo);
        self.actions.clone_repository(&request).await?;
        info!(repo = repo, elapsed = ?start.elapsed(), "Git clone completed");

        self.workspaces
            .insert(repo.to_string(), created.workspace_id.clone());
        Ok(created.workspace_id)
    }

    /// Look up the workspace id recorded for a repository, if any.
    pub fn workspace_for(&self, repo: &str) -> Option<&str> {
        self.workspaces.get(repo).map(String::as_str)
    }

    /// Number of repositories provisioned so far.
    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    /// Whether any repository has been provisioned yet.
    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

impl std::fmt::Debug for WorkspaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceRegistry")
            .field("workspaces", &self.workspaces)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::actions::CreateWorkspaceResponse;

    /// In-process action client that records every invocation.
    pub(crate) struct RecordingActionClient {
        pub created: Mutex<usize>,
        pub clones: Mutex<Vec<CloneRepositoryRequest>>,
        pub fail_create: bool,
        pub fail_clone: bool,
    }

    impl RecordingActionClient {
        pub fn new() -> Self {
            Self {
                created: Mutex::new(0),
                clones: Mutex::new(Vec::new()),
                fail_create: false,
                fail_clone: false,
            }
        }
    }

    #[async_trait]
    impl ActionClient for RecordingActionClient {
        async fn create_workspace(&self) -> Result<CreateWorkspaceResponse, ActionError> {
            if self.fail_create {
                return Err(ActionError::ActionFailed {
                    action: "create_workspace".to_string(),
                    message: "no capacity".to_string(),
                });
            }
            let mut created = self.created.lock().unwrap();
            *created += 1;
            Ok(CreateWorkspaceResponse {
                workspace_id: format!("ws-{}", created),
            })
        }

        async fn clone_repository(
            &self,
            request: &CloneRepositoryRequest,
        ) -> Result<(), ActionError> {
            self.clones.lock().unwrap().push(request.clone());
            if self.fail_clone {
                return Err(ActionError::ActionFailed {
                    action: "clone_repository".to_string(),
                    message: "git unreachable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_first_acquire_creates_and_clones() {
        let client = Arc::new(RecordingActionClient::new());
        let mut registry = WorkspaceRegistry::new(client.clone());

        let id = registry.acquire("django/django").await.unwrap();
        assert_eq!(id, "ws-1");
        assert_eq!(*client.created.lock().unwrap(), 1);

        let clones = client.clones.lock().unwrap();
        assert_eq!(clones.len(), 1);
        assert!(!clones[0].just_reset);
        assert_eq!(clones[0].repo_name, "django/django");
    }

    #[tokio::test]
    async fn test_repeated_repo_resets_instead_of_creating() {
        let client = Arc::new(RecordingActionClient::new());
        let mut registry = WorkspaceRegistry::new(client.clone());

        let first = registry.acquire("django/django").await.unwrap();
        let second = registry.acquire("django/django").await.unwrap();
        assert_eq!(first, second);

        // One creation total, and the second clone was reset-only.
        assert_eq!(*client.created.lock().unwrap(), 1);
        let clones = client.clones.lock().unwrap();
        assert_eq!(clones.len(), 2);
        assert!(clones[1].just_reset);
        assert_eq!(clones[1].workspace_id, first);
    }

    #[tokio::test]
    async fn test_distinct_repos_get_distinct_workspaces() {
        let client = Arc::new(RecordingActionClient::new());
        let mut registry = WorkspaceRegistry::new(client.clone());

        let a = registry.acquire("django/django").await.unwrap();
        let b = registry.acquire("sympy/sympy").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.workspace_for("sympy/sympy"), Some(b.as_str()));
    }

    #[tokio::test]
    async fn test_create_failure_leaves_no_entry() {
        let client = Arc::new(RecordingActionClient {
            fail_create: true,
            ..RecordingActionClient::new()
        });
        let mut registry = WorkspaceRegistry::new(client);

        assert!(registry.acquire("django/django").await.is_err());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_reset_failure_keeps_entry() {
        let client = Arc::new(RecordingActionClient::new());
        let mut registry = WorkspaceRegistry::new(client.clone());
        let id = registry.acquire("django/django").await.unwrap();

        // Make the reset path fail; the mapping must survive.
        let failing = Arc::new(RecordingActionClient {
            fail_clone: true,
            ..RecordingActionClient::new()
        });
        registry.actions = failing;
        assert!(registry.acquire("django/django").await.is_err());
        assert_eq!(registry.workspace_for("django/django"), Some(id.as_str()));
    }
}
