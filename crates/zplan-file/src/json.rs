//! 项目数据 JSON 导入/导出
//!
//! 导出格式为扁平的 camelCase 对象：`name`、`projectType` 加上文档的全部字段。
//! 导入时缺失的字段补默认值（缺少楼层时补一个默认楼层）。

use crate::document::{ProjectFile, ProjectType};
use crate::error::FileError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use zplan_core::PlanDocument;

/// 导入时缺省的正北方向
const IMPORT_NORTH: &str = "N";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub project_type: ProjectType,
    #[serde(flatten)]
    pub document: PlanDocument,
}

fn default_name() -> String {
    "Imported Project".to_string()
}

impl ProjectData {
    pub fn from_project(project: &ProjectFile) -> Self {
        Self {
            name: project.metadata.name.clone(),
            project_type: project.metadata.project_type,
            document: project.document.clone(),
        }
    }

    /// 导入成功后的提示
    pub fn import_notice(&self) -> String {
        format!("Imported \"{}\". Please review and save.", self.name)
    }
}

pub fn export_json(project: &ProjectFile) -> Result<String, FileError> {
    Ok(serde_json::to_string_pretty(&ProjectData::from_project(project))?)
}

pub fn import_json(json: &str) -> Result<ProjectData, FileError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(mut object) = value else {
        return Err(FileError::InvalidFormat(
            "Project data must be a JSON object".to_string(),
        ));
    };

    fill_defaults(&mut object)?;

    let mut data: ProjectData = serde_json::from_value(Value::Object(object))?;
    data.document.clamp_active_level();
    tracing::debug!(
        "Imported project data \"{}\" with {} levels",
        data.name,
        data.document.levels.len()
    );
    Ok(data)
}

fn fill_defaults(object: &mut Map<String, Value>) -> Result<(), FileError> {
    let has_levels = object
        .get("levels")
        .and_then(Value::as_array)
        .is_some_and(|levels| !levels.is_empty());
    if !has_levels {
        let levels = serde_json::to_value(PlanDocument::new().levels)?;
        object.insert("levels".to_string(), levels);
    }

    object
        .entry("activeLevelIndex")
        .or_insert_with(|| Value::from(0));
    object
        .entry("planNorthDirection")
        .or_insert_with(|| Value::from(IMPORT_NORTH));
    Ok(())
}

pub fn export_file(project: &ProjectFile, path: &Path) -> Result<(), FileError> {
    let json = export_json(project)?;
    crate::atomic::atomic_write(path, json.as_bytes())?;
    tracing::info!("Exported \"{}\" to {}", project.metadata.name, path.display());
    Ok(())
}

pub fn import_file(path: &Path) -> Result<ProjectData, FileError> {
    let json = std::fs::read_to_string(path)?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ProjectMetadata;
    use zplan_core::model::Level;

    #[test]
    fn test_export_is_flat_camel_case() {
        let project = ProjectFile::new(ProjectMetadata::new("Villa"), PlanDocument::new());
        let json = export_json(&project).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["name"], "Villa");
        assert_eq!(value["projectType"], "building");
        assert!(value["levels"].is_array());
        assert_eq!(value["activeLevelIndex"], 0);
    }

    #[test]
    fn test_import_fills_missing_fields() {
        let data = import_json(r#"{ "name": "Sketch" }"#).unwrap();

        assert_eq!(data.name, "Sketch");
        assert_eq!(data.document.levels.len(), 1);
        assert_eq!(data.document.active_level_index, 0);
        assert_eq!(data.document.plan_north_direction, "N");
        assert!(data.document.zones.is_empty());
        assert_eq!(
            data.import_notice(),
            "Imported \"Sketch\". Please review and save."
        );
    }

    #[test]
    fn test_import_clamps_active_level() {
        let mut doc = PlanDocument::new();
        doc.levels.push(Level::new("level-2", "First Floor", 300.0));
        let mut value = serde_json::to_value(&doc).unwrap();
        value["activeLevelIndex"] = Value::from(7);

        let data = import_json(&value.to_string()).unwrap();
        assert_eq!(data.document.levels.len(), 2);
        assert_eq!(data.document.active_level_index, 1);
        assert_eq!(data.name, "Imported Project");
    }

    #[test]
    fn test_import_rejects_non_object() {
        assert!(matches!(
            import_json("[1, 2, 3]"),
            Err(FileError::InvalidFormat(_))
        ));
        assert!(matches!(import_json("not json"), Err(FileError::Json(_))));
    }

    #[test]
    fn test_export_import_preserves_document() {
        let mut metadata = ProjectMetadata::new("Campus");
        metadata.project_type = ProjectType::MasterPlan;
        let project = ProjectFile::new(metadata, PlanDocument::new());

        let data = import_json(&export_json(&project).unwrap()).unwrap();
        assert_eq!(data.project_type, ProjectType::MasterPlan);
        assert_eq!(data.document, project.document);
    }
}
