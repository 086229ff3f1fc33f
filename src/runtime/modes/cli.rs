//! CLI mode
//!
//! `stats` 直接读取数据库生成 dashboard 快照，`config generate` 输出示例配置。

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::{OvencraftError, Result};
use crate::runtime::lifetime;
use crate::services::{AnalyticsService, DashboardSnapshot, GroupCount};

/// Run CLI mode
pub async fn run_cli(command: Commands, config: &StaticConfig) -> Result<()> {
    match command {
        Commands::Stats { json } => print_stats(config, json).await,
        Commands::Config {
            action: ConfigCommands::Generate { output },
        } => config_generate(output),
        Commands::Serve => Err(OvencraftError::validation(
            "serve is handled by server mode",
        )),
    }
}

/// 连接失败时报错退出；连接成功后查询失败与 HTTP dashboard 一致，输出全零快照
async fn print_stats(config: &StaticConfig, json: bool) -> Result<()> {
    let service = lifetime::startup::prepare_analytics(config)
        .await
        .map_err(|e| OvencraftError::database_connection(format!("{:#}", e)))?;

    print!("{}", stats_output(&service, Utc::now(), json).await?);
    Ok(())
}

async fn stats_output(service: &AnalyticsService, now: DateTime<Utc>, json: bool) -> Result<String> {
    let snapshot = service.dashboard_or_default(now).await;
    if json {
        Ok(format!("{}\n", serde_json::to_string_pretty(&snapshot)?))
    } else {
        Ok(render_dashboard(&snapshot))
    }
}

fn config_generate(output: Option<String>) -> Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default().save_to_file(&path)?;
            println!(
                "{} {}",
                "Configuration file generated:".green(),
                path.blue()
            );
        }
        None => print!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}

fn render_groups(out: &mut String, title: &str, groups: &[GroupCount]) {
    out.push_str(&format!("{}\n", title.bold()));
    if groups.is_empty() {
        out.push_str(&format!("  {}\n", "(no data)".dimmed()));
    }
    for group in groups {
        out.push_str(&format!(
            "  {:<32} {}\n",
            group.value.cyan(),
            group.count.to_string().green()
        ));
    }
}

/// 终端输出格式
pub fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let v = &snapshot.visitors;

    out.push_str(&format!(
        "{} {}\n\n",
        "OvenCraft dashboard".bold().magenta(),
        snapshot
            .generated_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .dimmed()
    ));
    out.push_str(&format!("{}\n", "Visitors".bold()));
    for (label, count) in [
        ("Today", v.today),
        ("Last 7 days", v.week),
        ("Last 30 days", v.month),
        ("Total", v.total),
    ] {
        out.push_str(&format!("  {:<14} {}\n", label, count.to_string().green()));
    }
    out.push('\n');

    render_groups(&mut out, "Devices", &snapshot.devices);
    render_groups(&mut out, "Browsers", &snapshot.browsers);
    render_groups(&mut out, "Top pages", &snapshot.pages);

    out.push_str(&format!("{}\n", "Daily visitors".bold()));
    for day in &snapshot.trend {
        out.push_str(&format!(
            "  {} {}\n",
            day.date.format("%Y-%m-%d"),
            day.count.to_string().green()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::storage::SeaOrmStorage;
    use chrono::TimeZone;
    use sea_orm::ConnectionTrait;
    use std::sync::Arc;

    #[test]
    fn test_render_empty_dashboard() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let rendered = render_dashboard(&DashboardSnapshot::empty(now));

        assert!(rendered.contains("Today"));
        assert!(rendered.contains("(no data)"));
        assert!(rendered.contains("2026-03-09"));
        assert!(rendered.contains("2026-03-15"));
    }

    #[test]
    fn test_render_groups_lists_values() {
        let mut out = String::new();
        render_groups(
            &mut out,
            "Top pages",
            &[GroupCount {
                value: "/about".to_string(),
                count: 3,
            }],
        );
        assert!(out.contains("/about"));
        assert!(out.contains('3'));
    }

    #[tokio::test]
    async fn test_stats_output_survives_query_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            database_url: format!("sqlite://{}?mode=rwc", dir.path().join("cli.db").display()),
            ..DatabaseConfig::default()
        };
        let storage = Arc::new(SeaOrmStorage::connect(&config).await.unwrap());
        storage
            .get_db()
            .execute_unprepared("DROP TABLE visitor_tracking")
            .await
            .unwrap();

        let service = AnalyticsService::new(storage);
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

        let json = stats_output(&service, now, true).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["visitors"]["total"], 0);
        assert_eq!(value["trend"].as_array().map(Vec::len), Some(7));

        let text = stats_output(&service, now, false).await.unwrap();
        assert!(text.contains("(no data)"));
    }
}
