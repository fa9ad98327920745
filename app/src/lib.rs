pub mod commands;
pub mod config;
pub mod preview;
pub mod session;
pub mod shell;

pub use commands::{
    add_images, generate_pdf, list_images, reorder_images, remove_image, ImageInfo,
    NOTHING_TO_EXPORT,
};
pub use config::{load_config, save_config, AppConfig};
pub use session::Session;
pub use shell::Shell;

use std::io;

/// 启动：初始化日志与配置，预先加入命令行给出的图片，然后进入交互命令行
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("[Startup] 加载配置失败，使用默认配置: {}", e);
            AppConfig::default()
        }
    };
    log::info!("[Startup] 导出目录: {}", config.output_dir().display());

    let mut session = Session::new(config);
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if !paths.is_empty() {
        if let Err(e) = add_images(&mut session, paths) {
            log::warn!("[Startup] 添加图片失败: {}", e);
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let stdin = io::stdin();
    let mut shell = Shell::new(session, stdin.lock(), io::stdout());
    runtime.block_on(shell.run())?;
    Ok(())
}
