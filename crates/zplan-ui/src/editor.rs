//! 编辑器门面
//!
//! `Editor` 把文档存储、会话状态、远端在场信息与当前工具的 Action 组合在一起，
//! 是宿主（窗口、测试、命令行、同步器）驱动草图引擎的唯一入口。
//!
//! 文档只通过 `PlanStore::dispatch` 修改；本地编辑与远端广播共用同一个
//! “替换楼层集合”入口。需要广播的变化写入事件队列，由同步器取走。

use crate::action::{Action, ActionContext, ActionResult, GesturePhase, Key, PointerButton, PreviewShape};
use crate::actions::create_action;
use crate::render::{render_plan, DisplayList, RenderInput, Viewport};
use crate::shortcuts::ShortcutRegistry;
use crate::state::{Session, SketchTool};
use std::collections::HashSet;
use std::time::Duration;
use zplan_core::math::Point2;
use zplan_core::model::{EntityKind, Level, Selection, ZoneType};
use zplan_core::presence::{Participant, Presence};
use zplan_core::snap::{EditorMode, SnapEngine};
use zplan_core::{ChangeOrigin, CommandOutcome, PlanCommand, PlanConfig, PlanDocument, PlanError, PlanStore};

/// 需要向协作者广播的本地变化
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// 文档内容变化（可撤销的本地编辑、撤销/重做）
    DocumentChanged { revision: u64 },
    SelectionChanged(Option<Selection>),
    CursorMoved(Point2),
}

pub struct Editor {
    store: PlanStore,
    session: Session,
    presence: Presence,
    snap: SnapEngine,
    action: Box<dyn Action>,
    shortcuts: ShortcutRegistry,
    events: Vec<EditorEvent>,
}

fn build_context<'a>(
    store: &'a PlanStore,
    session: &'a Session,
    snap: &'a SnapEngine,
    locked: &'a HashSet<String>,
    pointer: Point2,
) -> Option<ActionContext<'a>> {
    let document = store.document();
    Some(ActionContext {
        pointer,
        level: document.active_level()?,
        level_index: document.active_level_index,
        mode: session.mode,
        snap,
        locked_ids: locked,
        config: store.config(),
        user: &session.user,
    })
}

impl Editor {
    pub fn new(config: PlanConfig, user: Participant) -> Self {
        Self::with_document(PlanDocument::new(), config, user)
    }

    pub fn with_document(document: PlanDocument, config: PlanConfig, user: Participant) -> Self {
        let snap = SnapEngine::new(config.snap.clone());
        let presence = Presence::new(Duration::from_secs(config.presence_timeout_secs));
        let session = Session::new(user);
        tracing::info!(
            "editor ready for {} ({} levels)",
            session.user.user_name,
            document.levels.len()
        );
        Self {
            store: PlanStore::with_document(document, config),
            action: create_action(session.tool, session.zone_type),
            session,
            presence,
            snap,
            shortcuts: ShortcutRegistry::new(),
            events: Vec::new(),
        }
    }

    // ========== 访问器 ==========

    pub fn store(&self) -> &PlanStore {
        &self.store
    }

    /// 保存状态等不经过命令的存储操作
    pub fn store_mut(&mut self) -> &mut PlanStore {
        &mut self.store
    }

    pub fn document(&self) -> &PlanDocument {
        self.store.document()
    }

    pub fn active_level(&self) -> Option<&Level> {
        self.store.document().active_level()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user(&self) -> &Participant {
        &self.session.user
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn presence_mut(&mut self) -> &mut Presence {
        &mut self.presence
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutRegistry {
        &mut self.shortcuts
    }

    pub fn tool(&self) -> SketchTool {
        self.session.tool
    }

    pub fn mode(&self) -> EditorMode {
        self.session.mode
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.session.selection.as_ref()
    }

    pub fn phase(&self) -> GesturePhase {
        self.action.phase()
    }

    pub fn prompt(&self) -> &str {
        self.action.get_prompt()
    }

    pub fn locked_ids(&self) -> HashSet<String> {
        self.presence.locked_ids(&self.session.user.user_id)
    }

    /// 取走待广播事件
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// 入队事件；同类事件只保留最新一条
    fn queue(&mut self, event: EditorEvent) {
        let kind = std::mem::discriminant(&event);
        self.events.retain(|queued| std::mem::discriminant(queued) != kind);
        self.events.push(event);
    }

    // ========== 工具与模式 ==========

    /// 切换工具；进行中的手势被丢弃，不修改文档
    pub fn set_tool(&mut self, tool: SketchTool) {
        self.action.reset();
        if tool != self.session.tool {
            self.action = create_action(tool, self.session.zone_type);
            tracing::debug!("tool -> {}", tool.name());
        }
        self.session.set_tool(tool);
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        self.session.mode = mode;
    }

    pub fn set_zone_type(&mut self, zone_type: ZoneType) {
        self.session.zone_type = zone_type;
        if self.session.tool == SketchTool::Zone {
            self.action = create_action(SketchTool::Zone, zone_type);
        }
    }

    /// 切换活动楼层；进行中的手势被丢弃
    pub fn set_active_level(&mut self, index: usize) -> Result<(), PlanError> {
        self.action.reset();
        self.dispatch(PlanCommand::SetActiveLevel { index })?;
        Ok(())
    }

    /// Escape：先取消手势，再回到选择工具，最后清除选择
    pub fn cancel(&mut self) {
        if self.action.phase() == GesturePhase::Drawing {
            self.action.reset();
        } else if self.session.tool != SketchTool::Select {
            self.set_tool(SketchTool::Select);
        } else {
            self.select(None);
        }
    }

    pub fn select(&mut self, selection: Option<Selection>) {
        if self.session.selection == selection {
            return;
        }
        self.session.selection = selection.clone();
        if selection.as_ref().map(|s| s.kind) != Some(EntityKind::Comment) {
            self.session.focused_comment = None;
        }
        self.queue(EditorEvent::SelectionChanged(selection));
    }

    // ========== 指针与键盘 ==========

    fn run_action<R>(
        &mut self,
        pointer: Point2,
        f: impl FnOnce(&mut dyn Action, &ActionContext) -> R,
    ) -> Option<R> {
        let locked = self.presence.locked_ids(&self.session.user.user_id);
        let ctx = build_context(&self.store, &self.session, &self.snap, &locked, pointer)?;
        Some(f(self.action.as_mut(), &ctx))
    }

    pub fn pointer_down(&mut self, point: Point2, button: PointerButton) {
        self.session.pointer = point;
        if let Some(result) = self.run_action(point, |action, ctx| action.on_pointer_down(ctx, button)) {
            self.handle(result);
        }
    }

    pub fn pointer_move(&mut self, point: Point2) {
        self.session.pointer = point;
        self.queue(EditorEvent::CursorMoved(point));
        if let Some(result) = self.run_action(point, |action, ctx| action.on_pointer_move(ctx)) {
            self.handle(result);
        }
    }

    pub fn pointer_up(&mut self, point: Point2, button: PointerButton) {
        self.session.pointer = point;
        if let Some(result) = self.run_action(point, |action, ctx| action.on_pointer_up(ctx, button)) {
            self.handle(result);
        }
    }

    pub fn key(&mut self, key: Key) {
        match key {
            Key::Escape => self.cancel(),
            Key::Delete => {
                if let Err(err) = self.delete_selected() {
                    tracing::debug!("delete refused: {}", err);
                }
            }
            Key::Undo => {
                self.undo();
            }
            Key::Redo => {
                self.redo();
            }
            Key::Char(c) if self.action.phase() == GesturePhase::Idle => {
                if let Some(tool) = self.shortcuts.lookup_key(c) {
                    self.set_tool(tool);
                }
            }
            Key::Enter | Key::Char(_) => {
                let pointer = self.session.pointer;
                if let Some(result) = self.run_action(pointer, |action, ctx| action.on_key(ctx, key)) {
                    self.handle(result);
                }
            }
        }
    }

    fn handle(&mut self, result: ActionResult) {
        match result {
            ActionResult::Continue => {}
            ActionResult::Commit { command, switch_to } => {
                let from_comment_tool = self.session.tool == SketchTool::Comment;
                match self.dispatch(command) {
                    Ok(outcome) => {
                        if let (true, Some(id)) = (from_comment_tool, outcome.created_id()) {
                            let id = id.to_string();
                            let level_index = self.document().active_level_index;
                            self.select(Some(Selection::new(&id, EntityKind::Comment, level_index)));
                            self.session.focused_comment = Some(id);
                        }
                    }
                    Err(err) => tracing::debug!("action command refused: {}", err),
                }
                if let Some(tool) = switch_to {
                    self.set_tool(tool);
                }
            }
            ActionResult::Select(selection) => self.select(selection),
            ActionResult::Cancel => self.cancel(),
            ActionResult::SwitchTo(tool) => self.set_tool(tool),
        }
    }

    // ========== 文档操作 ==========

    /// 执行文档命令（属性面板、外部生成器与工具共用）
    pub fn dispatch(&mut self, command: PlanCommand) -> Result<CommandOutcome, PlanError> {
        let recorded = command.is_recorded();
        let outcome = self.store.dispatch(command)?;
        if outcome.is_applied() {
            if recorded {
                self.queue(EditorEvent::DocumentChanged {
                    revision: self.store.revision(),
                });
            }
            self.validate_selection();
        }
        Ok(outcome)
    }

    /// 外部生成的楼层集合（与手动编辑一样可撤销）
    pub fn apply_generated_levels(&mut self, levels: Vec<Level>) -> Result<(), PlanError> {
        self.dispatch(PlanCommand::ReplaceLevels {
            levels,
            origin: ChangeOrigin::Assistant,
        })?;
        Ok(())
    }

    /// 远端广播的楼层集合：整体替换，不入撤销栈，不回传
    pub fn apply_remote_levels(&mut self, levels: Vec<Level>) -> Result<(), PlanError> {
        self.dispatch(PlanCommand::ReplaceLevels {
            levels,
            origin: ChangeOrigin::Remote,
        })?;
        self.store
            .notifications_mut()
            .info("Project updated in real-time.");
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        self.action.reset();
        let changed = self.store.undo();
        if changed {
            self.after_history_step();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        self.action.reset();
        let changed = self.store.redo();
        if changed {
            self.after_history_step();
        }
        changed
    }

    fn after_history_step(&mut self) {
        self.queue(EditorEvent::DocumentChanged {
            revision: self.store.revision(),
        });
        self.validate_selection();
    }

    /// 删除当前选择的实体；无选择时返回 false
    pub fn delete_selected(&mut self) -> Result<bool, PlanError> {
        let Some(selection) = self.session.selection.clone() else {
            return Ok(false);
        };
        if selection.kind.is_level_scoped()
            && selection.level_index != self.document().active_level_index
        {
            return Ok(false);
        }
        self.dispatch(PlanCommand::DeleteEntity {
            kind: selection.kind,
            id: selection.id,
        })?;
        self.select(None);
        Ok(true)
    }

    /// 选择所指实体消失（撤销、远端替换、级联删除）时清除选择
    fn validate_selection(&mut self) {
        let stale = self
            .session
            .selection
            .as_ref()
            .is_some_and(|s| !self.store.document().contains(s));
        if stale {
            self.select(None);
        }
    }

    // ========== 显示 ==========

    pub fn preview(&self) -> Vec<PreviewShape> {
        let locked = self.locked_ids();
        build_context(&self.store, &self.session, &self.snap, &locked, self.session.pointer)
            .map(|ctx| self.action.get_preview(&ctx))
            .unwrap_or_default()
    }

    pub fn render(&self, viewport: Viewport) -> DisplayList {
        let preview = self.preview();
        render_plan(&RenderInput {
            document: self.store.document(),
            mode: self.session.mode,
            selection: self.session.selection.as_ref(),
            local_user_id: &self.session.user.user_id,
            presence: &self.presence,
            viewport,
            preview: &preview,
            grid_size: self.snap.config().grid_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Style;
    use std::time::Instant;
    use zplan_core::model::OpeningKind;

    fn editor() -> Editor {
        let mut editor = Editor::new(PlanConfig::default(), Participant::new("me", "Me"));
        editor.set_mode(EditorMode::Precision);
        editor
    }

    fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
        editor.pointer_down(Point2::new(from.0, from.1), PointerButton::Primary);
        editor.pointer_move(Point2::new((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0));
        editor.pointer_up(Point2::new(to.0, to.1), PointerButton::Primary);
    }

    fn walls(editor: &Editor) -> &[zplan_core::model::Wall] {
        &editor.active_level().unwrap().walls
    }

    #[test]
    fn test_draw_wall_snaps_and_records() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Wall);
        drag(&mut editor, (1.0, 1.0), (98.0, 3.0));

        let wall = &walls(&editor)[0];
        assert_eq!((wall.x1, wall.y1, wall.x2, wall.y2), (0.0, 0.0, 100.0, 0.0));
        assert_eq!(editor.store().undo_depth(), 1);
        assert_eq!(editor.tool(), SketchTool::Wall);
        assert!(editor
            .drain_events()
            .iter()
            .any(|e| matches!(e, EditorEvent::DocumentChanged { .. })));
    }

    #[test]
    fn test_door_placed_at_quarter_returns_to_select() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Wall);
        drag(&mut editor, (0.0, 0.0), (200.0, 0.0));

        editor.key(Key::Char('d'));
        assert_eq!(editor.tool(), SketchTool::Door);
        editor.pointer_down(Point2::new(50.0, 5.0), PointerButton::Primary);

        let level = editor.active_level().unwrap();
        let placement = &level.placements[0];
        assert_eq!(placement.kind, OpeningKind::Door);
        assert!((placement.position_ratio - 0.25).abs() < 1e-9);
        assert_eq!((placement.width, placement.height), (90.0, 210.0));
        assert_eq!(editor.tool(), SketchTool::Select);
    }

    #[test]
    fn test_switching_tool_mid_draw_discards_gesture() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Wall);
        let revision = editor.store().revision();

        editor.pointer_down(Point2::new(0.0, 0.0), PointerButton::Primary);
        editor.pointer_move(Point2::new(120.0, 0.0));
        assert_eq!(editor.phase(), GesturePhase::Drawing);

        editor.set_tool(SketchTool::Window);
        editor.pointer_up(Point2::new(120.0, 0.0), PointerButton::Primary);

        assert!(walls(&editor).is_empty());
        assert_eq!(editor.store().undo_depth(), 0);
        assert_eq!(editor.store().revision(), revision);
    }

    #[test]
    fn test_switching_level_mid_draw_discards_gesture() {
        let mut editor = editor();
        editor
            .dispatch(PlanCommand::AddLevel {
                name: "First Floor".into(),
                elevation: 300.0,
            })
            .unwrap();
        let depth = editor.store().undo_depth();

        editor.set_tool(SketchTool::Wall);
        editor.pointer_down(Point2::new(0.0, 0.0), PointerButton::Primary);
        editor.set_active_level(0).unwrap();
        editor.pointer_up(Point2::new(200.0, 0.0), PointerButton::Primary);

        assert_eq!(editor.document().wall_count(), 0);
        assert_eq!(editor.store().undo_depth(), depth);
    }

    #[test]
    fn test_remote_selection_locks_entity() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Wall);
        drag(&mut editor, (0.0, 0.0), (200.0, 0.0));
        let wall_id = walls(&editor)[0].id.clone();

        let remote = Selection::new(&wall_id, EntityKind::Wall, 0);
        editor
            .presence_mut()
            .update_selection("them", Some(&remote), Instant::now());

        let list = editor.render(Viewport::default());
        let style = list.style_of(&wall_id).unwrap();
        assert!(!style.interactive);
        assert!(style.dashed);

        editor.set_tool(SketchTool::Select);
        editor.pointer_down(Point2::new(100.0, 2.0), PointerButton::Primary);
        assert!(editor.selection().is_none());

        editor
            .presence_mut()
            .update_selection("them", None, Instant::now());
        editor.pointer_down(Point2::new(100.0, 2.0), PointerButton::Primary);
        assert_eq!(editor.selection().map(|s| s.id.as_str()), Some(wall_id.as_str()));
        assert_eq!(
            editor.render(Viewport::default()).style_of(&wall_id),
            Some(&Style::selected())
        );
    }

    #[test]
    fn test_escape_chain() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Wall);
        drag(&mut editor, (0.0, 0.0), (200.0, 0.0));

        editor.pointer_down(Point2::new(0.0, 100.0), PointerButton::Primary);
        editor.key(Key::Escape);
        assert_eq!(editor.phase(), GesturePhase::Idle);
        assert_eq!(editor.tool(), SketchTool::Wall);

        editor.key(Key::Escape);
        assert_eq!(editor.tool(), SketchTool::Select);

        editor.pointer_down(Point2::new(100.0, 0.0), PointerButton::Primary);
        assert!(editor.selection().is_some());
        editor.key(Key::Escape);
        assert!(editor.selection().is_none());
        assert_eq!(walls(&editor).len(), 1);
    }

    #[test]
    fn test_comment_tool_focuses_new_comment() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Comment);
        editor.pointer_down(Point2::new(33.0, 44.0), PointerButton::Primary);

        let comment = &editor.active_level().unwrap().comments[0];
        assert_eq!(comment.user_id, "me");
        assert_eq!(editor.session().focused_comment.as_deref(), Some(comment.id.as_str()));
        assert_eq!(editor.selection().map(|s| s.kind), Some(EntityKind::Comment));
        assert_eq!(editor.tool(), SketchTool::Select);
    }

    #[test]
    fn test_delete_selected_wall_in_use_is_refused() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Wall);
        drag(&mut editor, (0.0, 0.0), (200.0, 0.0));
        let wall_id = walls(&editor)[0].id.clone();
        editor
            .dispatch(PlanCommand::AddRoom {
                name: "Hall".into(),
                room_type: "hall".into(),
                wall_ids: vec![wall_id.clone()],
            })
            .unwrap();

        editor.select(Some(Selection::new(&wall_id, EntityKind::Wall, 0)));
        editor.key(Key::Delete);

        assert_eq!(walls(&editor).len(), 1);
        assert!(editor.selection().is_some());
        assert!(editor
            .store()
            .notifications()
            .last()
            .is_some_and(|n| n.message.contains(&wall_id)));
    }

    #[test]
    fn test_delete_key_removes_selected_wall() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Wall);
        drag(&mut editor, (0.0, 0.0), (200.0, 0.0));
        editor.key(Key::Escape);
        editor.key(Key::Escape);
        editor.pointer_down(Point2::new(60.0, 1.0), PointerButton::Primary);

        editor.key(Key::Delete);
        assert!(walls(&editor).is_empty());
        assert!(editor.selection().is_none());

        editor.key(Key::Undo);
        assert_eq!(walls(&editor).len(), 1);
    }

    #[test]
    fn test_undo_drops_vanished_selection() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Wall);
        drag(&mut editor, (0.0, 0.0), (200.0, 0.0));
        let wall_id = walls(&editor)[0].id.clone();
        editor.select(Some(Selection::new(&wall_id, EntityKind::Wall, 0)));
        editor.drain_events();

        assert!(editor.undo());
        assert!(editor.selection().is_none());
        let events = editor.drain_events();
        assert!(events.contains(&EditorEvent::SelectionChanged(None)));

        assert!(editor.redo());
        assert_eq!(walls(&editor).len(), 1);
    }

    #[test]
    fn test_pending_events_keep_only_latest_of_each_kind() {
        let mut editor = editor();
        for i in 0..1000 {
            editor.pointer_move(Point2::new(i as f64, 0.0));
        }
        editor.set_tool(SketchTool::Wall);
        drag(&mut editor, (0.0, 0.0), (100.0, 0.0));
        drag(&mut editor, (0.0, 100.0), (100.0, 100.0));

        let events = editor.drain_events();
        let cursors: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, EditorEvent::CursorMoved(_)))
            .collect();
        assert_eq!(cursors, vec![&EditorEvent::CursorMoved(Point2::new(50.0, 100.0))]);
        let revisions: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                EditorEvent::DocumentChanged { revision } => Some(*revision),
                _ => None,
            })
            .collect();
        assert_eq!(revisions, vec![editor.store().revision()]);
    }

    #[test]
    fn test_remote_levels_are_not_recorded_or_echoed() {
        let mut source = editor();
        source.set_tool(SketchTool::Wall);
        drag(&mut source, (0.0, 0.0), (200.0, 0.0));
        let levels = source.document().levels.clone();

        let mut editor = editor();
        editor.apply_remote_levels(levels).unwrap();

        assert_eq!(editor.document().wall_count(), 1);
        assert_eq!(editor.store().undo_depth(), 0);
        assert!(!editor.store().has_unsaved_changes());
        assert!(editor.drain_events().is_empty());
        assert_eq!(
            editor.store().notifications().last().map(|n| n.message.as_str()),
            Some("Project updated in real-time.")
        );
    }

    #[test]
    fn test_render_contains_preview_while_drawing() {
        let mut editor = editor();
        editor.set_tool(SketchTool::Wall);
        editor.pointer_down(Point2::new(0.0, 0.0), PointerButton::Primary);
        editor.pointer_move(Point2::new(80.0, 0.0));

        let list = editor.render(Viewport::default());
        assert!(list.iter().any(|item| matches!(
            item,
            crate::render::DrawItem::Preview {
                shape: PreviewShape::Segment { .. },
                ..
            }
        )));
        assert!(list.find("nothing").is_none());
    }
}
