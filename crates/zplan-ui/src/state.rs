//! 会话状态（易失，不持久化）

use zplan_core::math::Point2;
use zplan_core::model::{Selection, ZoneType};
use zplan_core::presence::Participant;
use zplan_core::snap::EditorMode;

/// 当前草图工具
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SketchTool {
    #[default]
    Select,
    Wall,
    Door,
    Window,
    Dimension,
    Comment,
    Zone,
    Road,
    Property,
}

impl SketchTool {
    pub const ALL: [SketchTool; 9] = [
        SketchTool::Select,
        SketchTool::Wall,
        SketchTool::Door,
        SketchTool::Window,
        SketchTool::Dimension,
        SketchTool::Comment,
        SketchTool::Zone,
        SketchTool::Road,
        SketchTool::Property,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SketchTool::Select => "Select",
            SketchTool::Wall => "Wall",
            SketchTool::Door => "Door",
            SketchTool::Window => "Window",
            SketchTool::Dimension => "Dimension",
            SketchTool::Comment => "Comment",
            SketchTool::Zone => "Zone",
            SketchTool::Road => "Road",
            SketchTool::Property => "Property Line",
        }
    }

    pub fn shortcut(&self) -> &'static str {
        match self {
            SketchTool::Select => "V",
            SketchTool::Wall => "W",
            SketchTool::Door => "D",
            SketchTool::Window => "N",
            SketchTool::Dimension => "M",
            SketchTool::Comment => "C",
            SketchTool::Zone => "Z",
            SketchTool::Road => "R",
            SketchTool::Property => "P",
        }
    }

    /// 是否为点选顶点的路径工具
    pub fn is_path_tool(&self) -> bool {
        matches!(self, SketchTool::Zone | SketchTool::Road | SketchTool::Property)
    }
}

/// 本地用户的会话状态
#[derive(Debug, Clone)]
pub struct Session {
    pub tool: SketchTool,
    pub mode: EditorMode,
    pub selection: Option<Selection>,
    pub user: Participant,
    /// 分区工具新建分区的类型
    pub zone_type: ZoneType,
    /// 刚创建、等待输入文字的批注
    pub focused_comment: Option<String>,
    pub pointer: Point2,
    pub status_message: String,
}

impl Session {
    pub fn new(user: Participant) -> Self {
        Self {
            tool: SketchTool::Select,
            mode: EditorMode::default(),
            selection: None,
            user,
            zone_type: ZoneType::Residential,
            focused_comment: None,
            pointer: Point2::origin(),
            status_message: String::new(),
        }
    }

    pub fn set_tool(&mut self, tool: SketchTool) {
        self.tool = tool;
        self.status_message = format!("{} ({})", tool.name(), tool.shortcut());
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.as_ref().is_some_and(|s| s.id == id)
    }
}
