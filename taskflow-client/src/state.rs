/// Workspace state: the project list and the current selection
///
/// The selection is explicit state owned by [`Workspace`]. A
/// [`SelectionCache`] remembers the last selected project across runs, but
/// only as a hint: on load the remembered id is used if the server still
/// lists it, otherwise the first project is selected (or none when the
/// list is empty).

use crate::api::{ClientError, ProjectApi};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use taskflow_shared::models::project::Project;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("{0}")]
    Validation(String),

    #[error("Unknown project: {0}")]
    UnknownProject(Uuid),

    #[error(transparent)]
    Api(#[from] ClientError),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Remembers the selected project id between sessions
pub trait SelectionCache: Send + Sync {
    fn load(&self) -> Option<Uuid>;

    fn store(&self, project_id: Option<Uuid>);
}

/// In-memory cache, for tests and short-lived sessions
#[derive(Debug, Default)]
pub struct MemorySelectionCache {
    selected: Mutex<Option<Uuid>>,
}

impl MemorySelectionCache {
    pub fn new(selected: Option<Uuid>) -> Self {
        Self {
            selected: Mutex::new(selected),
        }
    }
}

impl SelectionCache for MemorySelectionCache {
    fn load(&self) -> Option<Uuid> {
        self.selected.lock().ok().and_then(|s| *s)
    }

    fn store(&self, project_id: Option<Uuid>) {
        if let Ok(mut selected) = self.selected.lock() {
            *selected = project_id;
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionFile {
    current_project: Option<Uuid>,
}

/// JSON file cache
///
/// Read and write failures are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct FileSelectionCache {
    path: PathBuf,
}

impl FileSelectionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectionCache for FileSelectionCache {
    fn load(&self) -> Option<Uuid> {
        let bytes = std::fs::read(&self.path).ok()?;
        match serde_json::from_slice::<SelectionFile>(&bytes) {
            Ok(file) => file.current_project,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable selection cache");
                None
            }
        }
    }

    fn store(&self, project_id: Option<Uuid>) {
        let file = SelectionFile {
            current_project: project_id,
        };
        let result = serde_json::to_vec(&file)
            .map_err(std::io::Error::from)
            .and_then(|bytes| std::fs::write(&self.path, bytes));

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write selection cache");
        }
    }
}

/// Projects visible to the signed-in user, plus the current selection
pub struct Workspace {
    api: Arc<dyn ProjectApi>,
    cache: Arc<dyn SelectionCache>,
    projects: Vec<Project>,
    current: Option<Uuid>,
}

impl Workspace {
    pub fn new(api: Arc<dyn ProjectApi>, cache: Arc<dyn SelectionCache>) -> Self {
        Self {
            api,
            cache,
            projects: Vec::new(),
            current: None,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current
    }

    pub fn current(&self) -> Option<&Project> {
        let id = self.current?;
        self.projects.iter().find(|p| p.id == id)
    }

    /// Fetches the project list and resolves the selection
    pub async fn load(&mut self) -> WorkspaceResult<()> {
        self.projects = self.api.list_projects().await?;

        let remembered = self
            .cache
            .load()
            .filter(|id| self.projects.iter().any(|p| p.id == *id));
        let selected = remembered.or_else(|| self.projects.first().map(|p| p.id));

        self.set_current(selected);
        tracing::debug!(count = self.projects.len(), "Workspace loaded");
        Ok(())
    }

    pub fn select(&mut self, project_id: Uuid) -> WorkspaceResult<()> {
        if !self.projects.iter().any(|p| p.id == project_id) {
            return Err(WorkspaceError::UnknownProject(project_id));
        }
        self.set_current(Some(project_id));
        Ok(())
    }

    /// Creates a project, puts it first and selects it
    pub async fn create_project(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> WorkspaceResult<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::Validation(
                "Project name is required".to_string(),
            ));
        }
        let description = description.map(str::trim).filter(|d| !d.is_empty());

        let project = self.api.create_project(name, description).await?;
        tracing::info!(project_id = %project.id, "Project created");

        self.projects.insert(0, project.clone());
        self.set_current(Some(project.id));
        Ok(project)
    }

    /// Deletes a project; when it was selected, the next one takes over
    pub async fn delete_project(&mut self, project_id: Uuid) -> WorkspaceResult<()> {
        self.api.delete_project(project_id).await?;
        tracing::info!(project_id = %project_id, "Project deleted");

        self.projects.retain(|p| p.id != project_id);
        if self.current == Some(project_id) {
            let next = self.projects.first().map(|p| p.id);
            self.set_current(next);
        }
        Ok(())
    }

    fn set_current(&mut self, project_id: Option<Uuid>) {
        self.current = project_id;
        self.cache.store(project_id);
    }
}
