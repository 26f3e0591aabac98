//! ZPlan 草图交互引擎
//!
//! 工具状态机（每个工具一个 Action）、指针驱动的绘制与门窗定位、
//! 软锁感知的选择，以及可确定重绘的二维显示列表。

pub mod action;
pub mod actions;
pub mod editor;
pub mod hit;
pub mod render;
pub mod shortcuts;
pub mod state;

pub use action::{Action, ActionContext, ActionResult, GesturePhase, Key, PointerButton, PreviewShape};
pub use editor::{Editor, EditorEvent};
pub use render::{render_plan, DisplayList, DrawItem, RenderInput, Style, Viewport};
pub use shortcuts::ShortcutRegistry;
pub use state::{Session, SketchTool};
