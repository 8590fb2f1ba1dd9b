use poise::serenity_prelude as serenity;

use crate::{COMMANDS, CommandMeta};
use sentinel_core::{Context, Error};
use sentinel_utils::embed::DEFAULT_EMBED_COLOR;

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Lists out all available commands.",
    category: "utility",
    usage: "!help",
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("Available Commands")
        .color(DEFAULT_EMBED_COLOR)
        .description(grouped_help_description(COMMANDS));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn grouped_help_description(commands: &[CommandMeta]) -> String {
    let mut sorted: Vec<&CommandMeta> = commands.iter().collect();
    sorted.sort_unstable_by(|left, right| {
        left.category
            .cmp(right.category)
            .then_with(|| left.name.cmp(right.name))
    });

    let mut lines = Vec::new();
    let mut current_category = "";
    for command in sorted {
        if command.category != current_category {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("**{}**", command.category));
            current_category = command.category;
        }
        lines.push(format!("`{}` - {}", command.name, command.desc));
    }

    lines.join("\n")
}
