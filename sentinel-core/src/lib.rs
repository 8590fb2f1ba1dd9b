use sentinel_database::Database;
use sentinel_trustlist::{AuthService, TrustlistService};

pub type Error = anyhow::Error;

#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    pub trustlist: TrustlistService,
    pub auth: AuthService,
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
