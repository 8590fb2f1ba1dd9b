use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::trustlist::adapters::{CommandNotifier, display_actor};
use crate::trustlist::embeds::usage_message;
use crate::trustlist::workflow;
use sentinel_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "lookup",
    desc: "Look up a user's trustlist record.",
    category: "trustlist",
    usage: "!lookup <user>",
};

#[poise::command(prefix_command, slash_command, category = "Trustlist")]
pub async fn lookup(
    ctx: Context<'_>,
    #[description = "The user to look up"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let actor = display_actor(&user);
    let notifier = CommandNotifier { ctx };

    workflow::lookup(
        &ctx.data().trustlist,
        &notifier,
        Some(&actor),
        user.id.get(),
        false,
    )
    .await?;

    Ok(())
}
