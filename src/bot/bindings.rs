use crate::catalog::Catalog;
use crate::presence::ChannelBinding;
use anyhow::Result;
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Category,
    Text,
    Other,
}

/// The parts of a guild channel that binding needs.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub id: u64,
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<u64>,
}

#[derive(Debug, Default)]
pub struct BindingReport {
    pub bindings: Vec<ChannelBinding>,
    /// `category` or `category/channel` entries from the catalog with no live counterpart.
    pub missing: Vec<String>,
}

/// Matches catalog divisions against Discord categories and their categories against text
/// channels, by name. Missing entries are reported, never fatal.
pub fn resolve_bindings(catalog: &Catalog, channels: &[ChannelInfo]) -> BindingReport {
    let mut report = BindingReport::default();

    for division in &catalog.divisions {
        let category = channels
            .iter()
            .find(|c| c.kind == ChannelKind::Category && c.name == division.key);
        let Some(category) = category else {
            warn!("Category '{}' not found", division.key);
            report.missing.push(division.key.clone());
            continue;
        };

        for entry in &division.categories {
            let channel = channels.iter().find(|c| {
                c.kind == ChannelKind::Text && c.parent_id == Some(category.id) && c.name == entry.name
            });
            match channel {
                Some(channel) => {
                    info!(
                        "Monitoring channel '{}' -> sheet '{}'",
                        channel.name, division.sheet_target
                    );
                    report.bindings.push(ChannelBinding {
                        channel_id: channel.id,
                        division_key: division.key.clone(),
                        category: entry.name.clone(),
                    });
                }
                None => {
                    warn!("Channel '{}' not found in category '{}'", entry.name, division.key);
                    report.missing.push(format!("{}/{}", division.key, entry.name));
                }
            }
        }
    }

    report
}

pub async fn bind_guild(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    catalog: &Catalog,
) -> Result<Vec<ChannelBinding>> {
    let channels = guild_id.channels(&ctx.http).await?;
    let infos: Vec<ChannelInfo> = channels
        .values()
        .map(|channel| ChannelInfo {
            id: channel.id.get(),
            name: channel.name.clone(),
            kind: match channel.kind {
                serenity::ChannelType::Category => ChannelKind::Category,
                serenity::ChannelType::Text => ChannelKind::Text,
                _ => ChannelKind::Other,
            },
            parent_id: channel.parent_id.map(|id| id.get()),
        })
        .collect();

    let report = resolve_bindings(catalog, &infos);
    info!(
        "Bound {} channels in guild {} ({} catalog entries missing)",
        report.bindings.len(),
        guild_id,
        report.missing.len()
    );
    Ok(report.bindings)
}
