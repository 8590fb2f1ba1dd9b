pub mod accesskey;
pub mod autoban;
pub mod banlogchannel;
pub mod joinlogchannel;
pub mod quietjoins;
