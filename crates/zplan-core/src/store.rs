//! 文档存储（命令归约器）
//!
//! `PlanStore` 持有持久化文档、撤销历史、通知队列与保存状态。
//! 每条命令的处理顺序：
//! 1. 在文档副本上应用；几何拒绝直接返回，结构性违规恢复原状并发出通知
//! 2. 成功时把变更前的状态压入撤销栈
//! 3. 重新计算派生数据（房间面积）并递增修订号

use crate::command::{
    ChangeOrigin, CommandOutcome, IgnoreReason, LayerPatch, PlacedModelPatch, PlacementPatch,
    PlanCommand, RoomPatch, WallPatch,
};
use crate::config::PlanConfig;
use crate::document::PlanDocument;
use crate::error::PlanError;
use crate::geometry::{distance, room_area};
use crate::history::History;
use crate::id::generate_id;
use crate::math::EPSILON;
use crate::model::{
    CameraView, Comment, DimensionKind, DimensionLine, EntityKind, InfrastructureLine, Layer,
    Level, PlacedModel, Placement, PropertyLine, Room, Wall, Zone,
};
use crate::notify::{NotificationKind, Notifications, SaveStatus};

/// 应用过程中产生、待提交的通知
type Notes = Vec<(NotificationKind, String)>;

pub struct PlanStore {
    document: PlanDocument,
    history: History<PlanDocument>,
    config: PlanConfig,
    notifications: Notifications,
    save_status: SaveStatus,
    has_unsaved_changes: bool,
    revision: u64,
}

impl PlanStore {
    pub fn new(config: PlanConfig) -> Self {
        Self::with_document(PlanDocument::new(), config)
    }

    pub fn with_document(mut document: PlanDocument, config: PlanConfig) -> Self {
        document.clamp_active_level();
        recompute_room_areas(&mut document);
        Self {
            document,
            history: History::new(config.history_depth),
            config,
            notifications: Notifications::new(),
            save_status: SaveStatus::Idle,
            has_unsaved_changes: false,
            revision: 0,
        }
    }

    pub fn document(&self) -> &PlanDocument {
        &self.document
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// 每次文档变化（含撤销/重做、远端替换）递增
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn mark_saving(&mut self) {
        self.save_status = SaveStatus::Saving;
    }

    pub fn mark_saved(&mut self) {
        self.save_status = SaveStatus::Saved;
        self.has_unsaved_changes = false;
    }

    /// 保存失败：记录状态并提示，编辑不受影响
    pub fn mark_save_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("save failed: {}", message);
        self.notifications.error(format!("Auto-save failed: {}", message));
        self.save_status = SaveStatus::Error(message);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_len()
    }

    /// 撤销；栈空时为空操作
    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.document);
        if changed {
            self.revision += 1;
            self.has_unsaved_changes = true;
        }
        changed
    }

    /// 重做；栈空时为空操作
    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.document);
        if changed {
            self.revision += 1;
            self.has_unsaved_changes = true;
        }
        changed
    }

    /// 执行一条命令
    pub fn dispatch(&mut self, command: PlanCommand) -> Result<CommandOutcome, PlanError> {
        let name = command.name();
        let recorded = command.is_recorded();
        let origin = command.origin();
        let before = self.document.clone();
        let mut notes = Notes::new();

        match apply(&mut self.document, command, &self.config, &mut notes) {
            Ok(CommandOutcome::Ignored(reason)) => {
                self.document = before;
                tracing::debug!("{} ignored: {:?}", name, reason);
                Ok(CommandOutcome::Ignored(reason))
            }
            Ok(outcome) => {
                if recorded {
                    self.history.record(before);
                }
                recompute_room_areas(&mut self.document);
                self.revision += 1;
                match origin {
                    ChangeOrigin::Remote => self.has_unsaved_changes = false,
                    _ if recorded => self.has_unsaved_changes = true,
                    _ => {}
                }
                for (kind, message) in notes {
                    self.notifications.push(kind, message);
                }
                tracing::debug!("{} applied (revision {})", name, self.revision);
                Ok(outcome)
            }
            Err(err) => {
                self.document = before;
                tracing::warn!("{} refused: {}", name, err);
                self.notifications.error(err.to_string());
                Err(err)
            }
        }
    }
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::new(PlanConfig::default())
    }
}

/// 按引用墙体重新计算所有房间面积，返回发生变化的房间数
pub fn recompute_room_areas(document: &mut PlanDocument) -> usize {
    let mut changed = 0;
    for level in &mut document.levels {
        let areas: Vec<f64> = level
            .rooms
            .iter()
            .map(|room| room_area(&level.room_segments(room)))
            .collect();
        for (room, area) in level.rooms.iter_mut().zip(areas) {
            if room.calculated_area != Some(area) {
                room.calculated_area = Some(area);
                changed += 1;
            }
        }
    }
    changed
}

fn active_level(doc: &mut PlanDocument) -> Result<&mut Level, PlanError> {
    let index = doc.active_level_index;
    let count = doc.levels.len();
    doc.levels
        .get_mut(index)
        .ok_or(PlanError::LevelOutOfRange { index, count })
}

fn ensure_layer(level: &Level, layer_id: &str) -> Result<(), PlanError> {
    if level.layer(layer_id).is_some() {
        Ok(())
    } else {
        Err(PlanError::LayerNotFound(layer_id.to_string()))
    }
}

fn positive(value: f64, what: &str) -> Result<f64, PlanError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PlanError::InvalidValue(format!("{} must be positive, got {}", what, value)))
    }
}

fn ratio(value: f64) -> Result<f64, PlanError> {
    if value.is_finite() {
        Ok(value.clamp(0.0, 1.0))
    } else {
        Err(PlanError::InvalidValue(format!("position ratio {}", value)))
    }
}

/// 同一墙上的门窗区间重叠时给出警告（不阻止）
fn check_overlap(level: &Level, placement: &Placement, notes: &mut Notes) {
    let Some(wall) = level.wall(&placement.wall_id) else {
        return;
    };
    let length = wall.length();
    let overlapping = level
        .placements_on(&wall.id)
        .filter(|other| other.id != placement.id)
        .any(|other| placement.overlaps(other, length));
    if overlapping {
        tracing::warn!(
            "{} overlaps another opening on wall {}",
            placement.id,
            wall.id
        );
        notes.push((
            NotificationKind::Warning,
            format!("The new {} overlaps an existing opening on this wall.", placement.kind.name()),
        ));
    }
}

fn apply(
    doc: &mut PlanDocument,
    command: PlanCommand,
    config: &PlanConfig,
    notes: &mut Notes,
) -> Result<CommandOutcome, PlanError> {
    match command {
        PlanCommand::AddWall { start, end } => {
            if distance(start, end) <= EPSILON {
                return Ok(CommandOutcome::Ignored(IgnoreReason::ZeroLengthWall));
            }
            let level = active_level(doc)?;
            let id = generate_id("wall");
            let layer_id = level.active_layer_id.clone();
            level.walls.push(Wall::new(
                id.clone(),
                start,
                end,
                config.wall_thickness,
                config.wall_height,
                layer_id,
            ));
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::AddPlacement {
            wall_id,
            kind,
            position_ratio,
            width,
            height,
        } => {
            let level = active_level(doc)?;
            if level.wall(&wall_id).is_none() {
                return Err(PlanError::not_found(EntityKind::Wall, wall_id));
            }
            let size = config.opening_size(kind);
            let placement = Placement {
                id: generate_id("placement"),
                wall_id,
                kind,
                position_ratio: ratio(position_ratio)?,
                width: positive(width.unwrap_or(size.width), "width")?,
                height: positive(height.unwrap_or(size.height), "height")?,
                layer_id: level.active_layer_id.clone(),
            };
            check_overlap(level, &placement, notes);
            let id = placement.id.clone();
            level.placements.push(placement);
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::AddPlacedModel {
            model_key,
            name,
            position,
            rotation,
            width,
            depth,
            height3d,
        } => {
            let level = active_level(doc)?;
            let id = generate_id("model");
            level.placed_models.push(PlacedModel {
                id: id.clone(),
                model_key,
                name,
                x: position.x,
                y: position.y,
                width: positive(width, "width")?,
                depth: positive(depth, "depth")?,
                height3d: positive(height3d, "height")?,
                rotation,
                layer_id: level.active_layer_id.clone(),
                brand: None,
                style: None,
            });
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::AddDimensionLine { p1, p2 } => {
            if distance(p1, p2) <= EPSILON {
                return Ok(CommandOutcome::Ignored(IgnoreReason::ZeroLengthDimension));
            }
            let level = active_level(doc)?;
            let id = generate_id("dim");
            level.dimension_lines.push(DimensionLine {
                id: id.clone(),
                kind: DimensionKind::Manual,
                p1: p1.into(),
                p2: p2.into(),
                text_position: None,
                offset_distance: config.dimension_offset,
                is_temporary: false,
                layer_id: level.active_layer_id.clone(),
            });
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::AddComment {
            position,
            text,
            author,
        } => {
            let level = active_level(doc)?;
            let id = generate_id("comment");
            level.comments.push(Comment {
                id: id.clone(),
                user_id: author.user_id,
                user_name: author.user_name,
                text,
                x: position.x,
                y: position.y,
                resolved: false,
                replies: Vec::new(),
                layer_id: level.active_layer_id.clone(),
            });
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::AddRoom {
            name,
            room_type,
            wall_ids,
        } => {
            let level = active_level(doc)?;
            if let Some(missing) = wall_ids.iter().find(|id| level.wall(id).is_none()) {
                return Err(PlanError::not_found(EntityKind::Wall, missing.clone()));
            }
            let id = generate_id("room");
            let layer_id = level.active_layer_id.clone();
            level
                .rooms
                .push(Room::new(id.clone(), name, room_type, wall_ids, layer_id));
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::AddZone {
            name,
            zone_type,
            path,
        } => {
            if path.len() < 3 {
                return Ok(CommandOutcome::Ignored(IgnoreReason::DegeneratePath));
            }
            let layer_id = active_level(doc)?.active_layer_id.clone();
            let id = generate_id("zone");
            doc.zones.push(Zone {
                id: id.clone(),
                name,
                zone_type,
                path,
                layer_id,
            });
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::AddInfrastructure { kind, path, width } => {
            if path.len() < 2 {
                return Ok(CommandOutcome::Ignored(IgnoreReason::DegeneratePath));
            }
            let width = width.map(|w| positive(w, "width")).transpose()?;
            let layer_id = active_level(doc)?.active_layer_id.clone();
            let id = generate_id("infra");
            doc.infrastructure.push(InfrastructureLine {
                id: id.clone(),
                kind,
                path,
                width,
                layer_id,
            });
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::AddPropertyLine { points } => {
            if points.len() < 2 {
                return Ok(CommandOutcome::Ignored(IgnoreReason::DegeneratePath));
            }
            let id = generate_id("prop");
            doc.property_lines.push(PropertyLine {
                id: id.clone(),
                points,
            });
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::SaveCameraView {
            name,
            position,
            target,
        } => {
            let id = generate_id("view");
            doc.saved_camera_views.push(CameraView {
                id: id.clone(),
                name,
                position,
                target,
            });
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::UpdateWall { id, patch } => update_wall(active_level(doc)?, &id, patch),

        PlanCommand::UpdatePlacement { id, patch } => {
            update_placement(active_level(doc)?, &id, patch, notes)
        }

        PlanCommand::UpdateRoom { id, patch } => update_room(active_level(doc)?, &id, patch),

        PlanCommand::UpdatePlacedModel { id, patch } => {
            update_placed_model(active_level(doc)?, &id, patch)
        }

        PlanCommand::ResolveComment { id, resolved } => {
            let level = active_level(doc)?;
            let comment = level
                .comments
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| PlanError::not_found(EntityKind::Comment, id.clone()))?;
            comment.resolved = resolved;
            Ok(CommandOutcome::applied())
        }

        PlanCommand::DeleteEntity { kind, id } => delete_entity(doc, kind, &id),

        PlanCommand::AddLayer { name } => {
            let level = active_level(doc)?;
            let id = generate_id("layer");
            level.layers.push(Layer::new(id.clone(), name));
            level.active_layer_id = id.clone();
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::UpdateLayer { id, patch } => update_layer(active_level(doc)?, &id, patch),

        PlanCommand::DeleteLayer { id } => {
            delete_layer(active_level(doc)?, &id)?;
            notes.push((
                NotificationKind::Success,
                "Layer and its contents deleted.".to_string(),
            ));
            Ok(CommandOutcome::applied())
        }

        PlanCommand::SetActiveLayer { id } => {
            let level = active_level(doc)?;
            ensure_layer(level, &id)?;
            level.active_layer_id = id;
            Ok(CommandOutcome::applied())
        }

        PlanCommand::AddLevel { name, elevation } => {
            if !elevation.is_finite() {
                return Err(PlanError::InvalidValue(format!("elevation {}", elevation)));
            }
            let id = generate_id("level");
            doc.levels.push(Level::new(id.clone(), name, elevation));
            doc.active_level_index = doc.levels.len() - 1;
            Ok(CommandOutcome::created(id))
        }

        PlanCommand::SetActiveLevel { index } => {
            if index >= doc.levels.len() {
                return Err(PlanError::LevelOutOfRange {
                    index,
                    count: doc.levels.len(),
                });
            }
            doc.active_level_index = index;
            Ok(CommandOutcome::applied())
        }

        PlanCommand::SetPlanNorth(direction) => {
            doc.plan_north_direction = direction;
            Ok(CommandOutcome::applied())
        }

        PlanCommand::SetTerrainMesh(mesh) => {
            doc.terrain_mesh = mesh;
            Ok(CommandOutcome::applied())
        }

        PlanCommand::SetStagingSettings(settings) => {
            doc.staging_settings = settings;
            Ok(CommandOutcome::applied())
        }

        PlanCommand::ReplaceLevels { levels, origin } => {
            if levels.is_empty() {
                return Err(PlanError::EmptyLevels);
            }
            tracing::info!("replacing {} level(s) ({:?})", levels.len(), origin);
            doc.levels = levels;
            doc.clamp_active_level();
            Ok(CommandOutcome::applied())
        }

        PlanCommand::NewDocument => {
            *doc = PlanDocument::new();
            Ok(CommandOutcome::applied())
        }

        PlanCommand::ImportDocument(imported) => {
            if imported.levels.is_empty() {
                return Err(PlanError::EmptyLevels);
            }
            *doc = *imported;
            doc.clamp_active_level();
            Ok(CommandOutcome::applied())
        }

        PlanCommand::RecomputeRoomAreas => Ok(CommandOutcome::applied()),
    }
}

fn update_wall(level: &mut Level, id: &str, patch: WallPatch) -> Result<CommandOutcome, PlanError> {
    if let Some(layer_id) = &patch.layer_id {
        ensure_layer(level, layer_id)?;
    }
    let wall = level
        .wall_mut(id)
        .ok_or_else(|| PlanError::not_found(EntityKind::Wall, id))?;

    let start = patch.start.unwrap_or_else(|| wall.start());
    let end = patch.end.unwrap_or_else(|| wall.end());
    if distance(start, end) <= EPSILON {
        return Ok(CommandOutcome::Ignored(IgnoreReason::ZeroLengthWall));
    }
    wall.x1 = start.x;
    wall.y1 = start.y;
    wall.x2 = end.x;
    wall.y2 = end.y;
    if let Some(thickness) = patch.thickness {
        wall.thickness = positive(thickness, "thickness")?;
    }
    if let Some(height) = patch.height {
        wall.height = positive(height, "height")?;
    }
    if let Some(material) = patch.material {
        wall.material = material;
    }
    if let Some(layer_id) = patch.layer_id {
        wall.layer_id = layer_id;
    }
    Ok(CommandOutcome::applied())
}

fn update_placement(
    level: &mut Level,
    id: &str,
    patch: PlacementPatch,
    notes: &mut Notes,
) -> Result<CommandOutcome, PlanError> {
    if let Some(layer_id) = &patch.layer_id {
        ensure_layer(level, layer_id)?;
    }
    let placement = level
        .placements
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| PlanError::not_found(EntityKind::Placement, id))?;
    if let Some(r) = patch.position_ratio {
        placement.position_ratio = ratio(r)?;
    }
    if let Some(width) = patch.width {
        placement.width = positive(width, "width")?;
    }
    if let Some(height) = patch.height {
        placement.height = positive(height, "height")?;
    }
    if let Some(layer_id) = patch.layer_id {
        placement.layer_id = layer_id;
    }
    let updated = placement.clone();
    check_overlap(level, &updated, notes);
    Ok(CommandOutcome::applied())
}

fn update_room(level: &mut Level, id: &str, patch: RoomPatch) -> Result<CommandOutcome, PlanError> {
    if let Some(layer_id) = &patch.layer_id {
        ensure_layer(level, layer_id)?;
    }
    if let Some(wall_ids) = &patch.wall_ids {
        if let Some(missing) = wall_ids.iter().find(|w| level.wall(w).is_none()) {
            return Err(PlanError::not_found(EntityKind::Wall, missing.clone()));
        }
    }
    let room = level
        .rooms
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| PlanError::not_found(EntityKind::Room, id))?;
    if let Some(name) = patch.name {
        room.name = name;
    }
    if let Some(room_type) = patch.room_type {
        room.room_type = room_type;
    }
    if let Some(description) = patch.description {
        room.description = description;
    }
    if let Some(wall_ids) = patch.wall_ids {
        room.wall_ids = wall_ids;
    }
    if let Some(orientation) = patch.orientation {
        room.orientation = orientation;
    }
    if let Some(material) = patch.floor_material {
        room.floor_material = material;
    }
    if let Some(material) = patch.wall_material_override {
        room.wall_material_override = material;
    }
    if let Some(layer_id) = patch.layer_id {
        room.layer_id = layer_id;
    }
    Ok(CommandOutcome::applied())
}

fn update_placed_model(
    level: &mut Level,
    id: &str,
    patch: PlacedModelPatch,
) -> Result<CommandOutcome, PlanError> {
    if let Some(layer_id) = &patch.layer_id {
        ensure_layer(level, layer_id)?;
    }
    let model = level
        .placed_models
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| PlanError::not_found(EntityKind::PlacedModel, id))?;
    if let Some(p) = patch.position {
        model.x = p.x;
        model.y = p.y;
    }
    if let Some(rotation) = patch.rotation {
        model.rotation = rotation.rem_euclid(360.0);
    }
    if let Some(width) = patch.width {
        model.width = positive(width, "width")?;
    }
    if let Some(depth) = patch.depth {
        model.depth = positive(depth, "depth")?;
    }
    if let Some(height) = patch.height3d {
        model.height3d = positive(height, "height")?;
    }
    if let Some(layer_id) = patch.layer_id {
        model.layer_id = layer_id;
    }
    Ok(CommandOutcome::applied())
}

fn update_layer(level: &mut Level, id: &str, patch: LayerPatch) -> Result<CommandOutcome, PlanError> {
    let layer = level
        .layers
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or_else(|| PlanError::LayerNotFound(id.to_string()))?;
    if let Some(name) = patch.name {
        layer.name = name;
    }
    if let Some(visible) = patch.is_visible {
        layer.is_visible = visible;
    }
    if let Some(locked) = patch.is_locked {
        layer.is_locked = locked;
    }
    Ok(CommandOutcome::applied())
}

/// 从 Vec 中按 id 删除，未找到时报错
fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: &str,
    kind: EntityKind,
    item_id: impl Fn(&T) -> &str,
) -> Result<(), PlanError> {
    let before = items.len();
    items.retain(|item| item_id(item) != id);
    if items.len() == before {
        Err(PlanError::not_found(kind, id))
    } else {
        Ok(())
    }
}

fn delete_entity(
    doc: &mut PlanDocument,
    kind: EntityKind,
    id: &str,
) -> Result<CommandOutcome, PlanError> {
    match kind {
        EntityKind::Zone => remove_by_id(&mut doc.zones, id, kind, |z| &z.id)?,
        EntityKind::Infrastructure => remove_by_id(&mut doc.infrastructure, id, kind, |i| &i.id)?,
        EntityKind::PropertyLine => remove_by_id(&mut doc.property_lines, id, kind, |p| &p.id)?,
        EntityKind::Wall => {
            let level = active_level(doc)?;
            if level.wall(id).is_none() {
                return Err(PlanError::not_found(kind, id));
            }
            let rooms = level.rooms_referencing(id);
            if !rooms.is_empty() {
                return Err(PlanError::WallInUse {
                    wall_id: id.to_string(),
                    rooms,
                });
            }
            level.walls.retain(|w| w.id != id);
            level.placements.retain(|p| p.wall_id != id);
        }
        EntityKind::Room => remove_by_id(&mut active_level(doc)?.rooms, id, kind, |r| &r.id)?,
        EntityKind::Placement => {
            remove_by_id(&mut active_level(doc)?.placements, id, kind, |p| &p.id)?
        }
        EntityKind::PlacedModel => {
            remove_by_id(&mut active_level(doc)?.placed_models, id, kind, |m| &m.id)?
        }
        EntityKind::DimensionLine => {
            remove_by_id(&mut active_level(doc)?.dimension_lines, id, kind, |d| &d.id)?
        }
        EntityKind::Comment => {
            remove_by_id(&mut active_level(doc)?.comments, id, kind, |c| &c.id)?
        }
    }
    Ok(CommandOutcome::applied())
}

/// 删除图层并级联删除其上的实体
///
/// 失去宿主墙的门窗一并删除，房间中指向已删除墙的 id 被剔除。
fn delete_layer(level: &mut Level, id: &str) -> Result<(), PlanError> {
    ensure_layer(level, id)?;
    if level.layers.len() <= 1 {
        return Err(PlanError::LastLayer);
    }

    level.walls.retain(|w| w.layer_id != id);
    level.rooms.retain(|r| r.layer_id != id);
    level.placed_models.retain(|m| m.layer_id != id);
    level.dimension_lines.retain(|d| d.layer_id != id);
    level.comments.retain(|c| c.layer_id != id);

    let wall_ids: std::collections::HashSet<String> =
        level.walls.iter().map(|w| w.id.clone()).collect();
    level
        .placements
        .retain(|p| p.layer_id != id && wall_ids.contains(&p.wall_id));
    for room in &mut level.rooms {
        room.wall_ids.retain(|w| wall_ids.contains(w));
    }

    level.layers.retain(|l| l.id != id);
    if level.active_layer_id == id {
        if let Some(first) = level.layers.first() {
            level.active_layer_id = first.id.clone();
        }
    }
    tracing::info!("deleted layer {} with its entities", id);
    Ok(())
}
