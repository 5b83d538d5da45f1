use crate::bot::{Context, Error};
use crate::reports::roster::MAX_CHOICES;
use crate::reports::{player_summary, weekly_rankings};
use crate::utils::format::{create_error_embed, create_player_report_embed, create_rankings_embed};
use crate::utils::time::{get_current_date, start_of_week};
use poise::serenity_prelude as serenity;

async fn autocomplete_division<'a>(ctx: Context<'_>, partial: &'a str) -> Vec<String> {
    let partial = partial.to_lowercase();
    ctx.data()
        .catalog
        .sheet_targets()
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial))
        .take(MAX_CHOICES)
        .collect()
}

async fn autocomplete_player<'a>(ctx: Context<'_>, partial: &'a str) -> Vec<String> {
    match selected_division(ctx) {
        Some(division) => ctx.data().roster.search(&division, partial),
        None => Vec::new(),
    }
}

/// Value the user has already picked for `servidor` in the command being completed.
fn selected_division(ctx: Context<'_>) -> Option<String> {
    let poise::Context::Application(app) = ctx else {
        return None;
    };
    app.interaction
        .data
        .options
        .iter()
        .find(|option| option.name == "servidor")
        .and_then(|option| match &option.value {
            serenity::CommandDataOptionValue::String(value) => Some(value.clone()),
            serenity::CommandDataOptionValue::Autocomplete { value, .. } => Some(value.clone()),
            _ => None,
        })
}

async fn reply_error(ctx: Context<'_>, description: String) -> Result<(), Error> {
    let embed = create_error_embed("Erro", &description);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Verifica a presença detalhada de um jogador.
#[poise::command(
    slash_command,
    rename = "presenca",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn player(
    ctx: Context<'_>,
    #[description = "Escolha a divisão/servidor."]
    #[autocomplete = "autocomplete_division"]
    servidor: String,
    #[description = "Comece a digitar o nick do jogador."]
    #[autocomplete = "autocomplete_player"]
    jogador: String,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;
    let data = ctx.data();

    if !data.catalog.has_sheet_target(&servidor) {
        return reply_error(ctx, format!("Divisão desconhecida: '{}'.", servidor)).await;
    }

    let rows = match data.store.fetch_records(&servidor).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to load records for '{}': {}", servidor, e);
            return reply_error(ctx, format!("Falha ao buscar os dados da divisão '{}'.", servidor)).await;
        }
    };

    if rows.is_empty() {
        return reply_error(ctx, format!("Não há dados de presença para a divisão '{}'.", servidor)).await;
    }

    let today = get_current_date(data.config.timezone);
    let Some(summary) = player_summary(&rows, &jogador, today) else {
        return reply_error(
            ctx,
            format!(
                "Nenhum registro encontrado para o jogador '{}' na divisão '{}'.",
                jogador, servidor
            ),
        )
        .await;
    };

    let embed = create_player_report_embed(&jogador, &servidor, &summary, start_of_week(today), today);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Mostra os rankings de presença para uma divisão.
#[poise::command(
    slash_command,
    rename = "presencas",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn rankings(
    ctx: Context<'_>,
    #[description = "Escolha a divisão/servidor para ver os rankings."]
    #[autocomplete = "autocomplete_division"]
    servidor: String,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;
    let data = ctx.data();

    if !data.catalog.has_sheet_target(&servidor) {
        return reply_error(ctx, format!("Divisão desconhecida: '{}'.", servidor)).await;
    }

    let rows = match data.store.fetch_records(&servidor).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to load records for '{}': {}", servidor, e);
            return reply_error(ctx, format!("Falha ao buscar os dados da divisão '{}'.", servidor)).await;
        }
    };

    if rows.is_empty() {
        return reply_error(ctx, format!("Não há dados de presença para a divisão '{}'.", servidor)).await;
    }

    let today = get_current_date(data.config.timezone);
    let rankings = weekly_rankings(&rows, today);
    let embed = create_rankings_embed(&servidor, &rankings, start_of_week(today));
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
