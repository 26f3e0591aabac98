//! 自动保存
//!
//! 仅在存在未保存修改时写入；失败只更新保存状态并提示，编辑继续可用。

use crate::document::{ProjectFile, ProjectMetadata};
use crate::versions::{CommitKind, Persistence, VersionInfo};
use zplan_core::PlanStore;

const AUTOSAVE_MESSAGE: &str = "Auto-saved changes";

/// 自动保存结果
#[derive(Debug, Clone, PartialEq)]
pub enum AutosaveOutcome {
    /// 没有未保存修改
    Skipped,
    Saved(VersionInfo),
    Failed(String),
}

pub fn autosave<P: Persistence + ?Sized>(
    store: &mut PlanStore,
    persistence: &mut P,
    metadata: &mut ProjectMetadata,
) -> AutosaveOutcome {
    if !store.has_unsaved_changes() {
        return AutosaveOutcome::Skipped;
    }

    store.mark_saving();
    metadata.touch();
    let project = ProjectFile::new(metadata.clone(), store.document().clone());

    match persistence.save(&project, AUTOSAVE_MESSAGE, CommitKind::Auto) {
        Ok(saved) => {
            store.mark_saved();
            tracing::debug!("autosaved version {}", saved.version.version_number);
            AutosaveOutcome::Saved(saved.version)
        }
        Err(err) => {
            let message = err.to_string();
            store.mark_save_failed(message.clone());
            AutosaveOutcome::Failed(message)
        }
    }
}
