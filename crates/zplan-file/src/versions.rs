//! 项目版本存储
//!
//! 每次保存都会生成一个带提交说明的版本；恢复旧版本也会作为新版本保存，
//! 历史本身从不被改写。

use crate::atomic::atomic_write;
use crate::document::ProjectFile;
use crate::error::FileError;
use crate::native;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 提交类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitKind {
    /// 自动保存
    Auto,
    /// 用户手动保存
    Manual,
    /// 从旧版本恢复
    Restore,
}

impl CommitKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommitKind::Auto => "auto",
            CommitKind::Manual => "manual",
            CommitKind::Restore => "restore",
        }
    }
}

/// 版本记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub id: String,
    pub project_id: String,
    pub version_number: u32,
    pub commit_message: String,
    pub kind: CommitKind,
    pub created_at: DateTime<Utc>,
}

/// 保存结果
#[derive(Debug, Clone, PartialEq)]
pub struct SavedProject {
    pub project_id: String,
    pub version: VersionInfo,
}

/// 持久化后端
pub trait Persistence {
    /// 保存当前项目并追加一个版本
    fn save(
        &mut self,
        project: &ProjectFile,
        commit_message: &str,
        kind: CommitKind,
    ) -> Result<SavedProject, FileError>;

    /// 加载项目的当前状态
    fn load(&self, project_id: &str) -> Result<ProjectFile, FileError>;

    /// 按版本号升序列出版本
    fn list_versions(&self, project_id: &str) -> Result<Vec<VersionInfo>, FileError>;

    /// 加载某个版本的内容
    fn load_version(&self, project_id: &str, version: u32) -> Result<ProjectFile, FileError>;

    /// 将旧版本恢复为新的当前版本
    fn restore_version(
        &mut self,
        project_id: &str,
        version: u32,
    ) -> Result<SavedProject, FileError> {
        let project = self.load_version(project_id, version)?;
        self.save(
            &project,
            &format!("Restored from version {}", version),
            CommitKind::Restore,
        )
    }
}

const CURRENT_FILE: &str = "current.zplan";
const INDEX_FILE: &str = "versions.json";
const VERSIONS_DIR: &str = "versions";

/// 本地目录版本存储
///
/// ```text
/// root/<project_id>/current.zplan
/// root/<project_id>/versions.json
/// root/<project_id>/versions/v0001.zplan
/// ```
pub struct LocalVersionStore {
    root: PathBuf,
}

impl LocalVersionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_dir(&self, project_id: &str) -> Result<PathBuf, FileError> {
        let valid = !project_id.is_empty()
            && project_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(FileError::InvalidFormat(format!(
                "Invalid project id: {:?}",
                project_id
            )));
        }
        Ok(self.root.join(project_id))
    }

    fn version_path(dir: &Path, version: u32) -> PathBuf {
        dir.join(VERSIONS_DIR).join(format!("v{:04}.zplan", version))
    }

    fn read_index(dir: &Path) -> Result<Vec<VersionInfo>, FileError> {
        let path = dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Persistence for LocalVersionStore {
    fn save(
        &mut self,
        project: &ProjectFile,
        commit_message: &str,
        kind: CommitKind,
    ) -> Result<SavedProject, FileError> {
        let project_id = project.metadata.id.clone();
        let dir = self.project_dir(&project_id)?;
        let mut index = Self::read_index(&dir)?;
        let version_number = index.last().map_or(1, |v| v.version_number + 1);

        let bytes = native::to_bytes(project)?;
        atomic_write(&Self::version_path(&dir, version_number), &bytes)?;
        atomic_write(&dir.join(CURRENT_FILE), &bytes)?;

        let version = VersionInfo {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.clone(),
            version_number,
            commit_message: commit_message.to_string(),
            kind,
            created_at: Utc::now(),
        };
        index.push(version.clone());
        atomic_write(&dir.join(INDEX_FILE), serde_json::to_string_pretty(&index)?.as_bytes())?;

        tracing::info!(
            "Saved project {} as version {} ({}): {}",
            project_id,
            version_number,
            kind.name(),
            commit_message
        );

        Ok(SavedProject {
            project_id,
            version,
        })
    }

    fn load(&self, project_id: &str) -> Result<ProjectFile, FileError> {
        let path = self.project_dir(project_id)?.join(CURRENT_FILE);
        if !path.exists() {
            return Err(FileError::ProjectNotFound(project_id.to_string()));
        }
        native::load(&path)
    }

    fn list_versions(&self, project_id: &str) -> Result<Vec<VersionInfo>, FileError> {
        let dir = self.project_dir(project_id)?;
        if !dir.exists() {
            return Err(FileError::ProjectNotFound(project_id.to_string()));
        }
        Self::read_index(&dir)
    }

    fn load_version(&self, project_id: &str, version: u32) -> Result<ProjectFile, FileError> {
        let dir = self.project_dir(project_id)?;
        let path = Self::version_path(&dir, version);
        if !path.exists() {
            return Err(FileError::VersionNotFound {
                project_id: project_id.to_string(),
                version,
            });
        }
        native::load(&path)
    }
}
