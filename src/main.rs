use log::debug;
use shell::Shell;
use utils::theme::load_theme;

use crate::utils::config::Config;
use crate::utils::log::init_logger;

mod shell;
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    if let Err(e) = init_logger(&config) {
        // 日志不可用时 shell 照常运行
        eprintln!("ripple: failed to initialise logging: {}", e);
    }
    debug!("配置加载成功 {}", config.config_dir.display());
    let theme = load_theme(&config.theme, &config.prompt);

    let shell = Shell::new(&config, &theme)?;
    shell.run()
}
