use crate::presence::notifier::{LogEntry, LogLevel};
use crate::reports::{PlayerSummary, Rankings, WEEKLY_PICO_PRACA_TARGET, WEEKLY_WB_TARGET};
use crate::utils::time::month_name_pt;
use chrono::{Datelike, NaiveDate};
use poise::serenity_prelude as serenity;

const GREEN: u32 = 0x2ecc71;
const ORANGE: u32 = 0xe67e22;
const RED: u32 = 0xe74c3c;
const BLUE: u32 = 0x3498db;
const GOLD: u32 = 0xf1c40f;

pub fn format_ranking(entries: &[(String, usize)]) -> String {
    if entries.is_empty() {
        return "Nenhum registro.".to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, (name, count))| format!("{}. **{}** (`{}`)", i + 1, name, count))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_week_range(week_start: NaiveDate) -> String {
    let week_end = week_start + chrono::Duration::days(6);
    format!("{} a {}", week_start.format("%d/%m"), week_end.format("%d/%m"))
}

pub fn create_log_embed(entry: &LogEntry) -> serenity::CreateEmbed {
    let color = match entry.level {
        LogLevel::Success => GREEN,
        LogLevel::Warning => ORANGE,
        LogLevel::Failure => RED,
    };
    serenity::CreateEmbed::new()
        .title(&entry.title)
        .description(&entry.description)
        .color(color)
        .timestamp(serenity::Timestamp::now())
}

pub fn create_error_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(RED)
        .timestamp(serenity::Timestamp::now())
}

pub fn create_player_report_embed(
    player: &str,
    division: &str,
    summary: &PlayerSummary,
    week_start: NaiveDate,
    today: NaiveDate,
) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("📊 Relatório de Presença - {}", player))
        .description(format!("Dados da divisão: **{}**", division))
        .color(BLUE)
        .field("WB (Semanal)", format!("`{}/{}`", summary.weekly_wb, WEEKLY_WB_TARGET), true)
        .field(
            "Praça/Pico (Semanal)",
            format!("`{}/{}`", summary.weekly_pico_praca, WEEKLY_PICO_PRACA_TARGET),
            true,
        )
        .field("\u{200b}", "\u{200b}", true)
        .field("WB (Mensal)", format!("`{}` presenças", summary.monthly_wb), true)
        .field("Eventos (Mensal)", format!("`{}` presenças", summary.monthly_events), true)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Semana: {} | Mês: {} de {}",
            format_week_range(week_start),
            month_name_pt(today.month()),
            today.year()
        )))
}

pub fn create_rankings_embed(division: &str, rankings: &Rankings, week_start: NaiveDate) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("🏆 Rankings de Presença - {}", division))
        .description(format!("**Período Semanal:** {}", format_week_range(week_start)))
        .color(GOLD)
        .field("WB (Top 10)", format_ranking(&rankings.wb), true)
        .field("Praça/Pico (Top 10)", format_ranking(&rankings.pico_praca), true)
        .field("Eventos (Top 10)", format_ranking(&rankings.events), true)
}
