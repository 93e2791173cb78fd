use async_trait::async_trait;
use clap::{Arg, ArgMatches, Command};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// 命令注册器 trait，各模块实现此 trait 来注册命令
#[async_trait(?Send)]
pub trait CommandModule: Send + Sync {
    /// 获取模块名称
    fn module_name(&self) -> &'static str;

    /// 注册模块的子命令
    fn register_commands(&self) -> Vec<Command>;

    /// 处理模块命令
    async fn handle_command(&self, command_name: &str, matches: &ArgMatches) -> anyhow::Result<()>;
}

/// 命令注册器，使用单例模式
#[derive(Default)]
pub struct CommandRegistry {
    modules: BTreeMap<String, Arc<dyn CommandModule>>,
}

impl CommandRegistry {
    /// 获取全局单例实例
    pub fn instance() -> &'static Mutex<CommandRegistry> {
        static INSTANCE: OnceLock<Mutex<CommandRegistry>> = OnceLock::new();
        INSTANCE.get_or_init(|| Mutex::new(CommandRegistry::default()))
    }

    /// 注册模块
    pub fn register_module(&mut self, module: Arc<dyn CommandModule>) {
        self.modules.insert(module.module_name().to_string(), module);
    }

    /// 构建完整的命令行应用
    pub fn build_app(&self) -> Command {
        let mut app = Command::new("vgo-admin")
            .version(env!("CARGO_PKG_VERSION"))
            .about("多租户后台管理服务")
            .subcommand_required(true)
            .arg_required_else_help(true);

        // 内置的 server 命令，未指定的参数取配置文件
        app = app.subcommand(
            Command::new("server")
                .about("启动 Web 服务器")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("设置服务器主机地址"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("设置服务器端口")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("workers")
                        .short('w')
                        .long("workers")
                        .value_name("WORKERS")
                        .help("设置工作线程数")
                        .value_parser(clap::value_parser!(usize)),
                ),
        );

        // 内置的 version 命令
        app = app.subcommand(Command::new("version").about("显示版本信息"));

        // 各模块注册的命令
        for module in self.modules.values() {
            for command in module.register_commands() {
                app = app.subcommand(command);
            }
        }

        app
    }

    /// 查找处理指定命令的模块
    pub fn find_module(&self, command_name: &str) -> Option<Arc<dyn CommandModule>> {
        self.modules
            .values()
            .find(|module| {
                module
                    .register_commands()
                    .iter()
                    .any(|command| command.get_name() == command_name)
            })
            .cloned()
    }

    /// 获取所有注册的模块名称
    pub fn get_registered_modules(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }
}

/// 便捷函数：注册模块
pub fn register_module(module: Arc<dyn CommandModule>) {
    CommandRegistry::instance().lock().register_module(module);
}

pub fn build_app() -> Command {
    CommandRegistry::instance().lock().build_app()
}

/// 交给注册的模块处理命令
pub async fn handle_command(command_name: &str, matches: &ArgMatches) -> anyhow::Result<()> {
    let module = CommandRegistry::instance().lock().find_module(command_name);
    match module {
        Some(module) => module.handle_command(command_name, matches).await,
        None => Err(anyhow::anyhow!("未找到处理命令 '{}' 的模块", command_name)),
    }
}
