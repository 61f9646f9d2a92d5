//! # TaskFlow Client Library
//!
//! Client-side core of TaskFlow: an HTTP client for the API, the Kanban
//! board projection with optimistic moves, and the workspace state that
//! owns the current project selection.
//!
//! ## Modules
//!
//! - `api`: `ApiClient` plus the `TaskApi` / `ProjectApi` seams
//! - `board`: Board projection, sorting, filtering and bulk operations
//! - `config`: Base URL and timeout
//! - `state`: Project list and selection with a pluggable cache
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskflow_client::api::ApiClient;
//! use taskflow_client::board::Board;
//! use taskflow_client::config::ClientConfig;
//! use taskflow_client::state::{MemorySelectionCache, Workspace};
//! use taskflow_shared::models::task::TaskStatus;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ApiClient::new(&ClientConfig::from_env())?);
//! client.login("ada@example.com", "password123").await?;
//!
//! let mut workspace = Workspace::new(client.clone(), Arc::new(MemorySelectionCache::default()));
//! workspace.load().await?;
//!
//! let mut board = Board::new(client);
//! board.load(workspace.current_id()).await?;
//! let first = board.column(TaskStatus::Todo).first().map(|t| t.id);
//! if let Some(id) = first {
//!     board.move_task(id, TaskStatus::Done, 0).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod board;
pub mod config;
pub mod state;
