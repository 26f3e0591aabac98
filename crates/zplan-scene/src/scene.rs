//! 场景派生与选择高亮

use crate::assets::{AssetLibrary, MaterialParams, HIGHLIGHT_MATERIAL};
use crate::site::{FloorSurface, ModelBlock, RoadRibbon, ZoneSurface};
use crate::wall::WallAssembly;
use rayon::prelude::*;
use serde::Serialize;
use zplan_core::document::PlanDocument;
use zplan_core::model::{EntityKind, Placement, Selection};

/// 场景对象
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SceneObject {
    Wall(WallAssembly),
    Floor(FloorSurface),
    Model(ModelBlock),
    Zone(ZoneSurface),
    Road(RoadRibbon),
}

/// 材质状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MaterialState {
    #[default]
    Default,
    Highlighted,
}

/// 场景节点：携带源实体 id，用于选择匹配
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub id: String,
    pub kind: EntityKind,
    /// 楼层实体所在的楼层索引；场地实体为 None
    pub level_index: Option<usize>,
    pub object: SceneObject,
    pub material: MaterialState,
}

impl SceneNode {
    fn new(id: String, kind: EntityKind, level_index: Option<usize>, object: SceneObject) -> Self {
        Self {
            id,
            kind,
            level_index,
            object,
            material: MaterialState::Default,
        }
    }

    /// 默认材质 key
    pub fn material_key(&self) -> String {
        match &self.object {
            SceneObject::Wall(w) => w.material_key.clone().unwrap_or_else(|| "wall_default".into()),
            SceneObject::Floor(f) => f.material_key.clone().unwrap_or_else(|| "floor_default".into()),
            SceneObject::Model(m) => m.model_key.clone(),
            SceneObject::Zone(_) => "zone_default".into(),
            SceneObject::Road(_) => "asphalt".into(),
        }
    }

    /// 解析当前应使用的材质
    pub fn resolve_material(&self, assets: &dyn AssetLibrary) -> Option<MaterialParams> {
        match self.material {
            MaterialState::Highlighted => assets.material(HIGHLIGHT_MATERIAL),
            MaterialState::Default => match &self.object {
                SceneObject::Zone(z) => Some(MaterialParams::solid(z.color, 1.0)),
                SceneObject::Model(_) => assets
                    .material(&self.material_key())
                    .or_else(|| assets.material("model_default")),
                _ => assets.material(&self.material_key()),
            },
        }
    }
}

/// 派生出的三维场景
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn find(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    pub fn highlighted(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes
            .iter()
            .filter(|n| n.material == MaterialState::Highlighted)
    }
}

/// 由文档派生活动楼层与场地的场景
///
/// 隐藏图层上的实体不生成。墙体组并行构建，输出顺序与文档一致。
pub fn derive_scene(doc: &PlanDocument) -> Scene {
    let mut nodes = Vec::new();
    let level_index = doc.active_level_index;

    if let Some(level) = doc.levels.get(level_index) {
        let elevation = level.elevation;
        let walls: Vec<SceneNode> = level
            .walls
            .par_iter()
            .filter(|w| level.is_layer_visible(&w.layer_id))
            .map(|wall| {
                let openings: Vec<&Placement> = level.placements_on(&wall.id).collect();
                SceneNode::new(
                    wall.id.clone(),
                    EntityKind::Wall,
                    Some(level_index),
                    SceneObject::Wall(WallAssembly::build(wall, &openings, elevation)),
                )
            })
            .collect();
        nodes.extend(walls);

        for room in level.rooms.iter().filter(|r| level.is_layer_visible(&r.layer_id)) {
            let segments = level.room_segments(room);
            if let Some(floor) =
                FloorSurface::build(&room.id, &segments, elevation, room.floor_material.clone())
            {
                nodes.push(SceneNode::new(
                    room.id.clone(),
                    EntityKind::Room,
                    Some(level_index),
                    SceneObject::Floor(floor),
                ));
            }
        }

        for model in level
            .placed_models
            .iter()
            .filter(|m| level.is_layer_visible(&m.layer_id))
        {
            nodes.push(SceneNode::new(
                model.id.clone(),
                EntityKind::PlacedModel,
                Some(level_index),
                SceneObject::Model(ModelBlock::build(model, elevation)),
            ));
        }
    }

    for zone in &doc.zones {
        if let Some(surface) = ZoneSurface::build(zone) {
            nodes.push(SceneNode::new(
                zone.id.clone(),
                EntityKind::Zone,
                None,
                SceneObject::Zone(surface),
            ));
        }
    }

    for line in &doc.infrastructure {
        if let Some(ribbon) = RoadRibbon::build(line) {
            nodes.push(SceneNode::new(
                line.id.clone(),
                EntityKind::Infrastructure,
                None,
                SceneObject::Road(ribbon),
            ));
        }
    }

    tracing::debug!("derived scene with {} nodes", nodes.len());
    Scene { nodes }
}

/// 按当前选择重新标记材质：先全部恢复默认，再高亮 id 匹配的节点
///
/// 选择所在楼层不是活动楼层时不高亮任何节点。
pub fn apply_selection(scene: &mut Scene, selection: Option<&Selection>, active_level_index: usize) {
    for node in &mut scene.nodes {
        node.material = MaterialState::Default;
    }
    let Some(selection) = selection else {
        return;
    };
    if selection.level_index != active_level_index {
        return;
    }
    for node in scene.nodes.iter_mut().filter(|n| n.id == selection.id) {
        node.material = MaterialState::Highlighted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::BuiltinAssets;
    use zplan_core::command::{LayerPatch, PlanCommand};
    use zplan_core::math::Point2;
    use zplan_core::model::{OpeningKind, DEFAULT_LAYER_ID};
    use zplan_core::store::PlanStore;

    fn sample_store() -> (PlanStore, Vec<String>) {
        let mut store = PlanStore::default();
        let pts = [(0.0, 0.0), (400.0, 0.0), (400.0, 300.0), (0.0, 300.0)];
        let mut walls = Vec::new();
        for i in 0..4 {
            let (a, b) = (pts[i], pts[(i + 1) % 4]);
            let id = store
                .dispatch(PlanCommand::AddWall {
                    start: Point2::new(a.0, a.1),
                    end: Point2::new(b.0, b.1),
                })
                .unwrap()
                .created_id()
                .unwrap()
                .to_string();
            walls.push(id);
        }
        store
            .dispatch(PlanCommand::AddPlacement {
                wall_id: walls[0].clone(),
                kind: OpeningKind::Door,
                position_ratio: 0.5,
                width: None,
                height: None,
            })
            .unwrap();
        store
            .dispatch(PlanCommand::AddRoom {
                name: "Living".into(),
                room_type: "living".into(),
                wall_ids: walls.clone(),
            })
            .unwrap();
        (store, walls)
    }

    #[test]
    fn test_derive_scene_counts() {
        let (store, walls) = sample_store();
        let scene = derive_scene(store.document());
        assert_eq!(scene.count(EntityKind::Wall), 4);
        assert_eq!(scene.count(EntityKind::Room), 1);
        // 输出顺序与文档一致
        assert_eq!(scene.nodes[0].id, walls[0]);
        match &scene.nodes[0].object {
            SceneObject::Wall(w) => assert_eq!(w.parts.len(), 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_scene_serializes_to_json() {
        let (store, walls) = sample_store();
        let scene = derive_scene(store.document());
        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["nodes"][0]["id"], walls[0].as_str());
        assert_eq!(value["nodes"][0]["material"], "Default");
        assert!(value["nodes"][0]["object"]["Wall"]["parts"].is_array());
    }

    #[test]
    fn test_hidden_layer_not_derived() {
        let (mut store, _) = sample_store();
        store
            .dispatch(PlanCommand::UpdateLayer {
                id: DEFAULT_LAYER_ID.into(),
                patch: LayerPatch {
                    is_visible: Some(false),
                    ..LayerPatch::default()
                },
            })
            .unwrap();
        let scene = derive_scene(store.document());
        assert_eq!(scene.count(EntityKind::Wall), 0);
    }

    #[test]
    fn test_selection_highlight_is_rederived() {
        let (store, walls) = sample_store();
        let mut scene = derive_scene(store.document());
        let selection = Selection::new(walls[1].clone(), EntityKind::Wall, 0);

        apply_selection(&mut scene, Some(&selection), 0);
        let ids: Vec<&str> = scene.highlighted().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![walls[1].as_str()]);

        // 选择位于其他楼层时不高亮
        apply_selection(&mut scene, Some(&selection), 1);
        assert_eq!(scene.highlighted().count(), 0);

        apply_selection(&mut scene, Some(&selection), 0);
        apply_selection(&mut scene, None, 0);
        assert_eq!(scene.highlighted().count(), 0);
    }

    #[test]
    fn test_resolve_material() {
        let (store, walls) = sample_store();
        let mut scene = derive_scene(store.document());
        let assets = BuiltinAssets::new();
        let node = scene.find(&walls[0]).unwrap();
        assert_eq!(node.resolve_material(&assets).map(|m| m.color), Some(0xe2e8f0));

        let selection = Selection::new(walls[0].clone(), EntityKind::Wall, 0);
        apply_selection(&mut scene, Some(&selection), 0);
        let node = scene.find(&walls[0]).unwrap();
        assert_eq!(node.resolve_material(&assets).map(|m| m.color), Some(0xf59e0b));
    }
}
