//! 子命令实现

use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use zplan_core::math::Point2;
use zplan_core::model::{EntityKind, Selection};
use zplan_core::notify::Notifications;
use zplan_core::presence::Participant;
use zplan_core::snap::EditorMode;
use zplan_core::{PlanCommand, PlanConfig, PlanDocument, PlanStore};
use zplan_file::json::{self, ProjectData};
use zplan_file::{autosave, native, AutosaveOutcome, LocalVersionStore, Persistence};
use zplan_file::{ProjectFile, ProjectMetadata};
use zplan_scene::derive_scene;
use zplan_sync::{Hub, Synchronizer};
use zplan_ui::{Editor, PointerButton, SketchTool, Viewport};

const DEMO_PROJECT: &str = "demo-project";

/// 场景统计时列出的实体类型
const SCENE_KINDS: [EntityKind; 5] = [
    EntityKind::Wall,
    EntityKind::Room,
    EntityKind::PlacedModel,
    EntityKind::Zone,
    EntityKind::Infrastructure,
];

pub fn load_config(path: Option<&Path>) -> Result<PlanConfig> {
    let Some(path) = path else {
        return Ok(PlanConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

fn log_notifications(notifications: &mut Notifications) {
    for note in notifications.drain() {
        info!("[{:?}] {}", note.kind, note.message);
    }
}

// ========== 示例平面 ==========

fn drag_wall(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
    editor.set_tool(SketchTool::Wall);
    editor.pointer_down(Point2::new(from.0, from.1), PointerButton::Primary);
    editor.pointer_move(Point2::new(to.0, to.1));
    editor.pointer_up(Point2::new(to.0, to.1), PointerButton::Primary);
}

fn click_tool(editor: &mut Editor, tool: SketchTool, at: (f64, f64)) {
    editor.set_tool(tool);
    editor.pointer_move(Point2::new(at.0, at.1));
    editor.pointer_down(Point2::new(at.0, at.1), PointerButton::Primary);
    editor.pointer_up(Point2::new(at.0, at.1), PointerButton::Primary);
}

/// 用指针手势绘制两室示例：外框 600×400，中间隔墙带门，东墙开窗
pub fn build_demo(editor: &mut Editor) -> Result<()> {
    editor.set_mode(EditorMode::Precision);

    let outline = [
        ((0.0, 0.0), (300.0, 0.0)),
        ((300.0, 0.0), (300.0, 400.0)),
        ((300.0, 400.0), (0.0, 400.0)),
        ((0.0, 400.0), (0.0, 0.0)),
        ((300.0, 0.0), (600.0, 0.0)),
        ((600.0, 0.0), (600.0, 400.0)),
        ((600.0, 400.0), (300.0, 400.0)),
    ];
    for (from, to) in outline {
        drag_wall(editor, from, to);
    }

    let ids: Vec<String> = editor
        .active_level()
        .map(|level| level.walls.iter().map(|w| w.id.clone()).collect())
        .unwrap_or_default();
    anyhow::ensure!(ids.len() == outline.len(), "expected {} walls, drew {}", outline.len(), ids.len());

    click_tool(editor, SketchTool::Door, (300.0, 200.0));
    click_tool(editor, SketchTool::Window, (600.0, 200.0));

    editor.dispatch(PlanCommand::AddRoom {
        name: "Living Room".to_string(),
        room_type: "living".to_string(),
        wall_ids: vec![ids[0].clone(), ids[1].clone(), ids[2].clone(), ids[3].clone()],
    })?;
    editor.dispatch(PlanCommand::AddRoom {
        name: "Kitchen".to_string(),
        room_type: "kitchen".to_string(),
        wall_ids: vec![ids[4].clone(), ids[5].clone(), ids[6].clone(), ids[1].clone()],
    })?;

    editor.set_tool(SketchTool::Select);
    Ok(())
}

pub fn demo(config: &PlanConfig, out: &Path, store_dir: Option<&Path>) -> Result<()> {
    let mut editor = Editor::new(config.clone(), Participant::new("local", "Local User"));
    build_demo(&mut editor)?;

    let mut metadata = ProjectMetadata::new("Demo House");
    let project = ProjectFile::new(metadata.clone(), editor.document().clone());
    native::save(&project, out).with_context(|| format!("saving {}", out.display()))?;
    println!("Saved demo plan to {}", out.display());

    if let Some(dir) = store_dir {
        let mut versions = LocalVersionStore::new(dir);
        match autosave(editor.store_mut(), &mut versions, &mut metadata) {
            AutosaveOutcome::Saved(version) => println!(
                "Stored project {} version {} in {}",
                metadata.id,
                version.version_number,
                dir.display()
            ),
            AutosaveOutcome::Failed(message) => warn!("version store failed: {}", message),
            AutosaveOutcome::Skipped => {}
        }
    }

    log_notifications(editor.store_mut().notifications_mut());
    Ok(())
}

// ========== 查看 ==========

fn load_project(path: &Path) -> Result<ProjectFile> {
    native::load(path).with_context(|| format!("loading {}", path.display()))
}

pub fn info(path: &Path) -> Result<()> {
    let project = load_project(path)?;
    let doc = &project.document;

    println!("{} ({:?})", project.metadata.name, project.metadata.project_type);
    println!("  id: {}", project.metadata.id);
    println!("  modified: {}", project.metadata.modified_at.to_rfc3339());
    for (index, level) in doc.levels.iter().enumerate() {
        let marker = if index == doc.active_level_index { "*" } else { " " };
        println!(
            "{} {} @ {}: {} walls, {} rooms, {} openings, {} models, {} dimensions, {} comments, {} layers",
            marker,
            level.name,
            level.elevation,
            level.walls.len(),
            level.rooms.len(),
            level.placements.len(),
            level.placed_models.len(),
            level.dimension_lines.len(),
            level.comments.len(),
            level.layers.len()
        );
        for room in &level.rooms {
            // 平面单位为厘米
            let area = room.calculated_area.unwrap_or(0.0) / 10_000.0;
            println!("    {} [{}]: {:.2} m²", room.name, room.room_type, area);
        }
    }
    println!(
        "site: {} zones, {} infrastructure lines, {} property lines",
        doc.zones.len(),
        doc.infrastructure.len(),
        doc.property_lines.len()
    );
    Ok(())
}

pub fn scene(path: &Path, json_out: Option<&Path>) -> Result<()> {
    let project = load_project(path)?;
    let scene = derive_scene(&project.document);

    match json_out {
        Some(out) => {
            let text = serde_json::to_string_pretty(&scene)?;
            std::fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {} scene nodes to {}", scene.nodes.len(), out.display());
        }
        None => {
            println!("{} scene nodes", scene.nodes.len());
            for kind in SCENE_KINDS {
                let count = scene.count(kind);
                if count > 0 {
                    println!("  {}: {}", kind.name(), count);
                }
            }
        }
    }
    Ok(())
}

// ========== JSON 互操作 ==========

pub fn export_json(path: &Path, out: &Path) -> Result<()> {
    let project = load_project(path)?;
    json::export_file(&project, out)?;
    println!("Exported {} to {}", project.metadata.name, out.display());
    Ok(())
}

/// 导入的文档经由存储的导入命令校验后再写出
pub fn import_json(config: &PlanConfig, input: &Path, out: &Path) -> Result<()> {
    let data: ProjectData = json::import_file(input)
        .with_context(|| format!("importing {}", input.display()))?;

    let mut store = PlanStore::new(config.clone());
    store.dispatch(PlanCommand::ImportDocument(Box::new(data.document.clone())))?;
    store.notifications_mut().success(data.import_notice());

    let mut metadata = ProjectMetadata::new(data.name.clone());
    metadata.project_type = data.project_type;
    let document: PlanDocument = store.document().clone();
    native::save(&ProjectFile::new(metadata, document), out)?;

    log_notifications(store.notifications_mut());
    println!("Imported {} into {}", input.display(), out.display());
    Ok(())
}

pub fn versions(store_dir: &Path, project_id: &str) -> Result<()> {
    let store = LocalVersionStore::new(store_dir);
    let versions = store.list_versions(project_id)?;
    if versions.is_empty() {
        println!("No versions for {}", project_id);
    }
    for version in versions {
        println!(
            "v{:<4} {} [{}] {}",
            version.version_number,
            version.created_at.to_rfc3339(),
            version.kind.name(),
            version.commit_message
        );
    }
    Ok(())
}

// ========== 协作演示 ==========

pub fn collab_demo(config: &PlanConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_collab(config.clone()))
}

async fn run_collab(config: PlanConfig) -> Result<()> {
    let hub = Hub::new();
    let mut alice = Editor::new(config.clone(), Participant::new("alice", "Alice"));
    let mut bob = Editor::new(config, Participant::new("bob", "Bob"));
    bob.set_mode(EditorMode::Precision);

    let mut alice_sync = Synchronizer::for_editor(hub.connect("alice"), DEMO_PROJECT, &alice);
    let mut bob_sync = Synchronizer::for_editor(hub.connect("bob"), DEMO_PROJECT, &bob);
    alice_sync.connect(&mut alice)?;
    bob_sync.connect(&mut bob)?;

    // Bob 的几何请求由 Alice 应答
    let now = Instant::now();
    alice_sync.pump(&mut alice, now)?;
    bob_sync.pump(&mut bob, now)?;

    build_demo(&mut alice)?;
    alice_sync.publish(&mut alice, now)?;
    bob_sync.pump(&mut bob, now)?;
    println!(
        "Bob sees {} walls and {} rooms",
        bob.document().wall_count(),
        bob.active_level().map_or(0, |l| l.rooms.len())
    );

    let first_wall = alice
        .active_level()
        .and_then(|l| l.walls.first())
        .map(|w| w.id.clone())
        .context("demo plan has no walls")?;
    alice.select(Some(Selection::new(first_wall.clone(), EntityKind::Wall, 0)));
    alice_sync.publish(&mut alice, now)?;
    bob_sync.pump(&mut bob, now)?;
    println!(
        "Wall {} locked for Bob: {}",
        first_wall,
        bob.locked_ids().contains(&first_wall)
    );

    bob.pointer_move(Point2::new(450.0, 200.0));
    bob_sync.publish(&mut bob, now)?;
    alice_sync.pump(&mut alice, now)?;
    for (user_id, cursor) in alice.presence().cursors() {
        println!(
            "Alice sees {} ({}) at ({}, {}) in {}",
            cursor.user_name, user_id, cursor.position.x, cursor.position.y, cursor.color
        );
    }
    let display = alice.render(Viewport::default());
    println!("Alice display list: {} items, {} remote cursors", display.len(), display.remote_cursors().count());

    bob.set_tool(SketchTool::Dimension);
    bob.pointer_down(Point2::new(0.0, -40.0), PointerButton::Primary);
    bob.pointer_up(Point2::new(600.0, -40.0), PointerButton::Primary);
    bob_sync.publish(&mut bob, Instant::now())?;

    // 等待 Bob 的几何广播
    loop {
        tokio::time::timeout(Duration::from_secs(1), alice_sync.next(&mut alice))
            .await
            .context("timed out waiting for Bob's geometry")??;
        let dims = alice.active_level().map_or(0, |l| l.dimension_lines.len());
        if dims > 0 {
            println!("Alice received Bob's dimension line");
            break;
        }
    }

    bob_sync.disconnect();
    alice_sync.pump(&mut alice, Instant::now())?;
    println!("Collaborators left for Alice: {}", alice.presence().cursors().len());

    log_notifications(alice.store_mut().notifications_mut());
    alice_sync.disconnect();
    Ok(())
}
