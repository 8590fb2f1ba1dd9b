use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::trustlist::insert::submit_insertion;
use sentinel_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "ban",
    desc: "Insert a user into the trustlist and ban them immediately.",
    category: "trustlist",
    usage: "!ban <user> <level 0-3> <reason>",
};

#[poise::command(prefix_command, slash_command, category = "Trustlist")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "The user to insert and ban"] user: Option<serenity::User>,
    #[description = "Escalation level (0-3)"]
    #[min = 0]
    #[max = 3]
    level: Option<u8>,
    #[description = "Reason for the record and the ban"]
    #[rest]
    note: Option<String>,
) -> Result<(), Error> {
    submit_insertion(ctx, user, level, note, true, META.usage).await
}
