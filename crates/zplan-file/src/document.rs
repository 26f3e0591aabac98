//! 项目文件内容

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zplan_core::PlanDocument;

/// 项目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectType {
    #[default]
    Building,
    MasterPlan,
}

/// 项目元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project_type: ProjectType,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ProjectMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.into(),
            project_type: ProjectType::Building,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// 保存单元：元数据 + 持久化文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub metadata: ProjectMetadata,
    pub document: PlanDocument,
}

impl ProjectFile {
    pub fn new(metadata: ProjectMetadata, document: PlanDocument) -> Self {
        Self { metadata, document }
    }
}
