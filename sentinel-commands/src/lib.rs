pub mod config;
pub mod trustlist;
pub mod utility;

use sentinel_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    utility::usage::META,
    trustlist::lookup::META,
    trustlist::insert::META,
    trustlist::ban::META,
    config::accesskey::META,
    config::autoban::META,
    config::banlogchannel::META,
    config::joinlogchannel::META,
    config::quietjoins::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        utility::usage::usage(),
        trustlist::lookup::lookup(),
        trustlist::insert::insert(),
        trustlist::ban::ban(),
        config::accesskey::accesskey(),
        config::autoban::autoban(),
        config::banlogchannel::banlogchannel(),
        config::joinlogchannel::joinlogchannel(),
        config::quietjoins::quietjoins(),
    ]
}
