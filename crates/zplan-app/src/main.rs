//! ZPlan 命令行入口
//!
//! 在编辑器内核之上提供示例绘制、文件检查、三维派生、JSON 互操作、
//! 版本列表与进程内协作演示。

mod cli;
mod commands;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use clap::Parser;
use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(level).finish(),
    )?;

    info!("Starting ZPlan...");
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Demo { out, store } => commands::demo(&config, &out, store.as_deref()),
        Command::Info { file } => commands::info(&file),
        Command::Scene { file, json } => commands::scene(&file, json.as_deref()),
        Command::ExportJson { file, out } => commands::export_json(&file, &out),
        Command::ImportJson { input, out } => commands::import_json(&config, &input, &out),
        Command::Versions { store, project_id } => commands::versions(&store, &project_id),
        Command::CollabDemo => commands::collab_demo(&config),
    }
}
