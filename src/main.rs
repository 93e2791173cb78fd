use clap::ArgMatches;

use vgo_admin::{build_app, handle_command, init_commands, AppBootstrap};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 初始化所有模块的命令
    init_commands();

    // 构建命令行应用
    let matches: ArgMatches = build_app().get_matches();

    match matches.subcommand() {
        Some(("server", sub_matches)) => handle_server_command(sub_matches).await,
        Some(("version", _)) => {
            println!("vgo-admin {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some((command_name, sub_matches)) => handle_command(command_name, sub_matches).await,
        // subcommand_required(true) 保证不会走到这里
        None => Err(anyhow::anyhow!("未知命令，请使用 --help 查看可用命令")),
    }
}

/// 命令行参数覆盖配置文件
async fn handle_server_command(matches: &ArgMatches) -> anyhow::Result<()> {
    let mut bootstrap = AppBootstrap::from_global_config()?;
    if let Some(host) = matches.get_one::<String>("host") {
        bootstrap = bootstrap.with_host(host.clone());
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        bootstrap = bootstrap.with_port(*port);
    }
    if let Some(workers) = matches.get_one::<usize>("workers") {
        bootstrap = bootstrap.with_workers(*workers);
    }
    bootstrap.run().await
}
