//! 系统模块命令：init

use anyhow::Context;
use async_trait::async_trait;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::bootstrap::command_registry::CommandModule;
use crate::comm::tracing::init_tracing;
use crate::conf::AppSettings;
use crate::comm::config::get_global_config_manager;
use crate::store::{seed, PgStore, Store, TenantStore};

pub struct SystemCommands;

#[async_trait(?Send)]
impl CommandModule for SystemCommands {
    fn module_name(&self) -> &'static str {
        "system"
    }

    fn register_commands(&self) -> Vec<Command> {
        vec![Command::new("init")
            .about("建表并写入初始数据（可重复执行）")
            .arg(
                Arg::new("skip-schema")
                    .long("skip-schema")
                    .help("跳过建表，只写入初始数据")
                    .action(ArgAction::SetTrue),
            )]
    }

    async fn handle_command(&self, command_name: &str, matches: &ArgMatches) -> anyhow::Result<()> {
        match command_name {
            "init" => {
                let manager = get_global_config_manager()?;
                let settings = AppSettings::load(&manager).context("加载配置失败")?;
                init_tracing(crate::bootstrap::app_bootstrap::APP_NAME, &settings.logging)?;
                run_init(&settings, matches.get_flag("skip-schema")).await
            }
            other => Err(anyhow::anyhow!("system 模块不支持命令 '{}'", other)),
        }
    }
}

async fn run_init(settings: &AppSettings, skip_schema: bool) -> anyhow::Result<()> {
    let url = settings
        .database
        .url
        .as_deref()
        .filter(|url| !url.is_empty())
        .context("init 需要配置 database.url")?;
    let store = PgStore::connect(url, settings.database.max_connections).await?;
    if !skip_schema {
        store.create_schema().await.context("建表失败")?;
        tracing::info!("数据表已就绪");
    }
    seed_all(&store, settings).await
}

/// 租户模式下为每个租户写入初始数据
pub async fn seed_all(store: &dyn Store, settings: &AppSettings) -> anyhow::Result<()> {
    seed::seed(store, settings).await?;
    if settings.tenant.enabled {
        for tenant in store.list_tenants().await? {
            seed::seed_tenant(store, settings, &tenant.schema_name).await?;
        }
    }
    tracing::info!("初始化完成");
    Ok(())
}
