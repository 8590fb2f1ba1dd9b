//! The trustlist escalation-insertion workflow.
//!
//! Shared by the `insert`/`ban` commands and the join-traffic handler. Each
//! collaborator is a trait seam so the guard order and side-effect sequencing
//! can be exercised without a gateway connection; the production bindings
//! live in `adapters`.

#![allow(async_fn_in_trait)]

use anyhow::Context as _;
use tracing::error;

use sentinel_database::model::guild_config::GuildConfig;
use sentinel_trustlist::model::TrustlistEntry;
use sentinel_utils::formatting::user_handle;

/// Records at this escalation level are ban-worthy.
pub const BLACKLIST_LEVEL: u8 = 3;
/// Notes shorter than this are rejected before any remote call.
pub const MIN_NOTE_CHARS: usize = 5;

pub trait TrustlistStore {
    /// Never fails for unknown ids: those come back as clean records.
    async fn lookup(&self, user_id: u64) -> anyhow::Result<TrustlistEntry>;
    async fn insert_or_escalate(&self, record: &TrustlistEntry, token: &str)
    -> anyhow::Result<()>;
}

pub trait TokenProvider {
    async fn get_or_refresh_token(&self, guild_id: u64) -> anyhow::Result<String>;
}

pub trait ConfigSource {
    async fn find_or_create(&self, guild_id: u64) -> anyhow::Result<GuildConfig>;
}

pub trait ModerationSink {
    /// Permanent ban; no message pruning.
    async fn ban(&self, user_id: u64, reason: &str) -> anyhow::Result<()>;
    async fn send_to_channel(&self, channel_id: u64, text: &str) -> anyhow::Result<()>;
}

pub trait Notifier {
    async fn notify(&self, text: &str) -> anyhow::Result<()>;
    async fn render_entry(
        &self,
        entry: &TrustlistEntry,
        actor: Option<&ResolvedActor>,
        user_id: u64,
    ) -> anyhow::Result<()>;
}

/// The insertion target as resolved within the invoking guild.
///
/// Absent when the user is no longer a member; an absent actor skips the
/// identity guards and can never be banned.
#[derive(Clone, Debug)]
pub struct ResolvedActor {
    pub user_id: u64,
    pub is_bot: bool,
    pub manages_guild: bool,
    pub display_name: String,
}

/// Collaborator handles for one invocation.
pub struct Collaborators<'a, T, A, C, M, N> {
    pub trustlist: &'a T,
    pub auth: &'a A,
    pub config: &'a C,
    pub moderation: &'a M,
    pub notifier: &'a N,
}

pub struct InsertRequest<'a> {
    pub guild_id: u64,
    pub invoker_id: u64,
    pub target_id: u64,
    /// Already range-checked by the command layer; not re-validated here.
    pub level: u8,
    pub note: &'a str,
    pub force_ban: bool,
}

/// Insert the target into the trustlist (or escalate their existing record),
/// then report, re-render, and apply the ban decision.
///
/// Guard failures and missing credentials end in a single user-facing
/// message with no remote call. Remote failures are reported the same way
/// at this boundary; debug builds additionally re-propagate them.
pub async fn insert_or_escalate<T, A, C, M, N>(
    collab: &Collaborators<'_, T, A, C, M, N>,
    actor: Option<&ResolvedActor>,
    request: &InsertRequest<'_>,
) -> anyhow::Result<()>
where
    T: TrustlistStore,
    A: TokenProvider,
    C: ConfigSource,
    M: ModerationSink,
    N: Notifier,
{
    if let Some(actor) = actor {
        if actor.user_id == request.invoker_id {
            collab
                .notifier
                .notify("You cannot insert yourself into the trustlist.")
                .await?;
            return Ok(());
        }

        if actor.is_bot {
            collab
                .notifier
                .notify("You cannot insert a bot into the trustlist.")
                .await?;
            return Ok(());
        }

        if actor.manages_guild {
            collab
                .notifier
                .notify("You cannot insert a server operator into the trustlist. Demote them first.")
                .await?;
            return Ok(());
        }
    }

    if request.note.chars().count() < MIN_NOTE_CHARS {
        collab.notifier.notify("Reason is too short.").await?;
        return Ok(());
    }

    let config = collab.config.find_or_create(request.guild_id).await?;
    if !config.has_api_credentials() {
        collab
            .notifier
            .notify(
                "No API credentials set. Use `/accesskey <login> <password>` to link this \
                 server to the trustlist first.",
            )
            .await?;
        return Ok(());
    }

    match run_insertion(collab, actor, request, &config).await {
        Ok(()) => Ok(()),
        Err(source) => {
            error!(?source, "trustlist insertion failed");
            collab
                .notifier
                .notify(&format!("Trustlist update failed: {source:#}"))
                .await?;

            if cfg!(debug_assertions) {
                return Err(source);
            }
            Ok(())
        }
    }
}

async fn run_insertion<T, A, C, M, N>(
    collab: &Collaborators<'_, T, A, C, M, N>,
    actor: Option<&ResolvedActor>,
    request: &InsertRequest<'_>,
    config: &GuildConfig,
) -> anyhow::Result<()>
where
    T: TrustlistStore,
    A: TokenProvider,
    C: ConfigSource,
    M: ModerationSink,
    N: Notifier,
{
    let token = collab.auth.get_or_refresh_token(request.guild_id).await?;
    let record = TrustlistEntry::record(request.target_id, request.level, request.note);
    collab.trustlist.insert_or_escalate(&record, &token).await?;

    let handle = user_handle(actor.map(|a| a.display_name.as_str()), request.target_id);
    collab
        .notifier
        .notify(&format!(
            "User '{handle}' successfully inserted into the trustlist."
        ))
        .await?;

    // Confirm with a fresh read instead of rendering the just-written record.
    lookup(
        collab.trustlist,
        collab.notifier,
        actor,
        request.target_id,
        false,
    )
    .await?;

    let should_ban =
        request.force_ban || (config.auto_ban_blacklisted && request.level >= BLACKLIST_LEVEL);

    // An absent member cannot be banned.
    let Some(actor) = actor else {
        return Ok(());
    };
    if !should_ban {
        return Ok(());
    }

    collab.moderation.ban(actor.user_id, request.note).await?;

    if let Some(channel_id) = config.ban_log_channel {
        let channel_id = u64::try_from(channel_id).context("ban_log_channel out of u64 range")?;
        collab
            .moderation
            .send_to_channel(
                channel_id,
                &format!("Banned user '{}'.", actor.display_name),
            )
            .await?;
    }

    Ok(())
}

/// Fetch and render the current record for a user.
///
/// With `silence_on_clear`, clean records produce no output at all; join
/// traffic uses that mode so quiet guilds only hear about flagged users.
pub async fn lookup<T, N>(
    trustlist: &T,
    notifier: &N,
    actor: Option<&ResolvedActor>,
    target_id: u64,
    silence_on_clear: bool,
) -> anyhow::Result<()>
where
    T: TrustlistStore,
    N: Notifier,
{
    let entry = trustlist.lookup(target_id).await?;

    if silence_on_clear && entry.is_clean() {
        return Ok(());
    }

    notifier.render_entry(&entry, actor, target_id).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use sentinel_database::model::guild_config::GuildConfig;
    use sentinel_trustlist::model::TrustlistEntry;

    use super::{
        Collaborators, ConfigSource, InsertRequest, ModerationSink, Notifier, ResolvedActor,
        TokenProvider, TrustlistStore, insert_or_escalate, lookup,
    };

    const GUILD: u64 = 100;
    const INVOKER: u64 = 11;
    const TARGET: u64 = 22;

    #[derive(Default)]
    struct FakeTrustlist {
        entries: Mutex<HashMap<u64, TrustlistEntry>>,
        lookups: Mutex<Vec<u64>>,
        inserts: Mutex<Vec<(TrustlistEntry, String)>>,
        fail_inserts: bool,
    }

    impl FakeTrustlist {
        fn with_entry(entry: TrustlistEntry) -> Self {
            let fake = Self::default();
            fake.entries.lock().unwrap().insert(entry.id, entry);
            fake
        }

        fn insert_count(&self) -> usize {
            self.inserts.lock().unwrap().len()
        }

        fn lookup_count(&self) -> usize {
            self.lookups.lock().unwrap().len()
        }
    }

    impl TrustlistStore for FakeTrustlist {
        async fn lookup(&self, user_id: u64) -> anyhow::Result<TrustlistEntry> {
            self.lookups.lock().unwrap().push(user_id);
            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(&user_id)
                .cloned()
                .unwrap_or_else(|| TrustlistEntry::clean(user_id)))
        }

        async fn insert_or_escalate(
            &self,
            record: &TrustlistEntry,
            token: &str,
        ) -> anyhow::Result<()> {
            if self.fail_inserts {
                anyhow::bail!("remote service rejected the record");
            }
            self.inserts
                .lock()
                .unwrap()
                .push((record.clone(), token.to_owned()));
            self.entries
                .lock()
                .unwrap()
                .insert(record.id, record.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeTokens {
        calls: Mutex<usize>,
    }

    impl TokenProvider for FakeTokens {
        async fn get_or_refresh_token(&self, _guild_id: u64) -> anyhow::Result<String> {
            *self.calls.lock().unwrap() += 1;
            Ok("token-1".to_owned())
        }
    }

    struct FakeConfig {
        config: GuildConfig,
    }

    impl ConfigSource for FakeConfig {
        async fn find_or_create(&self, _guild_id: u64) -> anyhow::Result<GuildConfig> {
            Ok(self.config.clone())
        }
    }

    #[derive(Default)]
    struct FakeSink {
        bans: Mutex<Vec<(u64, String)>>,
        channel_messages: Mutex<Vec<(u64, String)>>,
    }

    impl ModerationSink for FakeSink {
        async fn ban(&self, user_id: u64, reason: &str) -> anyhow::Result<()> {
            self.bans.lock().unwrap().push((user_id, reason.to_owned()));
            Ok(())
        }

        async fn send_to_channel(&self, channel_id: u64, text: &str) -> anyhow::Result<()> {
            self.channel_messages
                .lock()
                .unwrap()
                .push((channel_id, text.to_owned()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        messages: Mutex<Vec<String>>,
        rendered: Mutex<Vec<TrustlistEntry>>,
    }

    impl Notifier for FakeNotifier {
        async fn notify(&self, text: &str) -> anyhow::Result<()> {
            self.messages.lock().unwrap().push(text.to_owned());
            Ok(())
        }

        async fn render_entry(
            &self,
            entry: &TrustlistEntry,
            _actor: Option<&ResolvedActor>,
            _user_id: u64,
        ) -> anyhow::Result<()> {
            self.rendered.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    struct Harness {
        trustlist: FakeTrustlist,
        tokens: FakeTokens,
        config: FakeConfig,
        sink: FakeSink,
        notifier: FakeNotifier,
    }

    impl Harness {
        fn new(config: GuildConfig) -> Self {
            Self {
                trustlist: FakeTrustlist::default(),
                tokens: FakeTokens::default(),
                config: FakeConfig { config },
                sink: FakeSink::default(),
                notifier: FakeNotifier::default(),
            }
        }

        fn collab(
            &self,
        ) -> Collaborators<'_, FakeTrustlist, FakeTokens, FakeConfig, FakeSink, FakeNotifier>
        {
            Collaborators {
                trustlist: &self.trustlist,
                auth: &self.tokens,
                config: &self.config,
                moderation: &self.sink,
                notifier: &self.notifier,
            }
        }

        fn no_remote_calls(&self) -> bool {
            self.trustlist.insert_count() == 0
                && self.trustlist.lookup_count() == 0
                && *self.tokens.calls.lock().unwrap() == 0
        }
    }

    fn member(user_id: u64) -> ResolvedActor {
        ResolvedActor {
            user_id,
            is_bot: false,
            manages_guild: false,
            display_name: format!("user-{user_id}"),
        }
    }

    fn configured() -> GuildConfig {
        let mut config = GuildConfig::defaults(GUILD as i64);
        config.api_login = Some("svc".to_owned());
        config.api_password = Some("secret".to_owned());
        config
    }

    fn request(level: u8, note: &'static str, force_ban: bool) -> InsertRequest<'static> {
        InsertRequest {
            guild_id: GUILD,
            invoker_id: INVOKER,
            target_id: TARGET,
            level,
            note,
            force_ban,
        }
    }

    #[tokio::test]
    async fn rejects_self_insertion_before_any_remote_call() {
        let harness = Harness::new(configured());
        let actor = member(INVOKER);

        insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(2, "ban evasion", false),
        )
        .await
        .unwrap();

        assert!(harness.no_remote_calls());
        let messages = harness.notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("yourself"));
    }

    #[tokio::test]
    async fn rejects_bot_targets_before_any_remote_call() {
        let harness = Harness::new(configured());
        let mut actor = member(TARGET);
        actor.is_bot = true;

        insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(2, "spam account", false),
        )
        .await
        .unwrap();

        assert!(harness.no_remote_calls());
        assert!(
            harness.notifier.messages.lock().unwrap()[0].contains("bot"),
        );
    }

    #[tokio::test]
    async fn rejects_server_operators_before_any_remote_call() {
        let harness = Harness::new(configured());
        let mut actor = member(TARGET);
        actor.manages_guild = true;

        insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(2, "spam account", false),
        )
        .await
        .unwrap();

        assert!(harness.no_remote_calls());
        assert!(
            harness.notifier.messages.lock().unwrap()[0].contains("operator"),
        );
    }

    #[tokio::test]
    async fn rejects_short_notes_regardless_of_other_fields() {
        for (actor, force_ban) in [(Some(member(TARGET)), true), (None, false)] {
            let harness = Harness::new(configured());

            insert_or_escalate(&harness.collab(), actor.as_ref(), &request(3, "abc", force_ban))
                .await
                .unwrap();

            assert!(harness.no_remote_calls());
            let messages = harness.notifier.messages.lock().unwrap();
            assert_eq!(messages.len(), 1);
            assert!(messages[0].contains("too short"));
        }
    }

    #[tokio::test]
    async fn unresolved_actor_skips_identity_guards() {
        let harness = Harness::new(configured());

        // No actor: the self/bot/operator guards cannot apply.
        insert_or_escalate(&harness.collab(), None, &request(1, "spam account", false))
            .await
            .unwrap();

        assert_eq!(harness.trustlist.insert_count(), 1);
    }

    #[tokio::test]
    async fn no_ban_without_force_or_auto_ban() {
        for level in 0u8..=3 {
            let harness = Harness::new(configured());
            let actor = member(TARGET);

            insert_or_escalate(
                &harness.collab(),
                Some(&actor),
                &request(level, "spam account", false),
            )
            .await
            .unwrap();

            assert!(
                harness.sink.bans.lock().unwrap().is_empty(),
                "level {level} triggered a ban with auto-ban disabled"
            );
        }
    }

    #[tokio::test]
    async fn auto_ban_bans_exactly_once_with_note_as_reason() {
        let mut config = configured();
        config.auto_ban_blacklisted = true;

        let harness = Harness::new(config);
        let actor = member(TARGET);

        insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(3, "spam account", false),
        )
        .await
        .unwrap();

        let bans = harness.sink.bans.lock().unwrap();
        assert_eq!(bans.as_slice(), &[(TARGET, "spam account".to_owned())]);
    }

    #[tokio::test]
    async fn auto_ban_only_applies_at_blacklist_level() {
        let mut config = configured();
        config.auto_ban_blacklisted = true;

        let harness = Harness::new(config);
        let actor = member(TARGET);

        insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(2, "spam account", false),
        )
        .await
        .unwrap();

        assert_eq!(harness.trustlist.insert_count(), 1);
        assert!(harness.sink.bans.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn force_ban_overrides_disabled_auto_ban() {
        let harness = Harness::new(configured());
        let actor = member(TARGET);

        insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(0, "spam account", true),
        )
        .await
        .unwrap();

        assert_eq!(harness.sink.bans.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unresolved_actor_is_never_banned() {
        let mut config = configured();
        config.auto_ban_blacklisted = true;

        let harness = Harness::new(config);

        insert_or_escalate(&harness.collab(), None, &request(3, "spam account", true))
            .await
            .unwrap();

        assert_eq!(harness.trustlist.insert_count(), 1);
        assert!(harness.sink.bans.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ban_log_message_names_the_banned_user() {
        let mut config = configured();
        config.auto_ban_blacklisted = true;
        config.ban_log_channel = Some(555);

        let harness = Harness::new(config);
        let actor = member(TARGET);

        insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(3, "spam account", false),
        )
        .await
        .unwrap();

        let messages = harness.sink.channel_messages.lock().unwrap();
        assert_eq!(
            messages.as_slice(),
            &[(555, format!("Banned user 'user-{TARGET}'."))]
        );
    }

    #[tokio::test]
    async fn missing_credentials_render_one_instruction_and_no_api_calls() {
        let harness = Harness::new(GuildConfig::defaults(GUILD as i64));
        let actor = member(TARGET);

        insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(3, "spam account", false),
        )
        .await
        .unwrap();

        assert!(harness.no_remote_calls());
        let messages = harness.notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("No API credentials"));
    }

    #[tokio::test]
    async fn successful_insertion_reports_then_rerenders_fresh_entry() {
        let harness = Harness::new(configured());
        let actor = member(TARGET);

        insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(2, "spam account", false),
        )
        .await
        .unwrap();

        let messages = harness.notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("successfully inserted"));
        assert!(messages[0].contains(&format!("user-{TARGET}")));

        // The render came from a fresh lookup of the stored record.
        assert_eq!(harness.trustlist.lookup_count(), 1);
        let rendered = harness.notifier.rendered.lock().unwrap();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].escalation_level, 2);
        assert_eq!(rendered[0].escalation_note, "spam account");
    }

    #[tokio::test]
    async fn lookup_is_idempotent_without_intervening_inserts() {
        let trustlist =
            FakeTrustlist::with_entry(TrustlistEntry::record(TARGET, 2, "raid alt"));
        let notifier = FakeNotifier::default();

        lookup(&trustlist, &notifier, None, TARGET, false)
            .await
            .unwrap();
        lookup(&trustlist, &notifier, None, TARGET, false)
            .await
            .unwrap();

        let rendered = notifier.rendered.lock().unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0], rendered[1]);
    }

    #[tokio::test]
    async fn silence_on_clear_suppresses_clean_records() {
        let trustlist = FakeTrustlist::default();
        let notifier = FakeNotifier::default();

        lookup(&trustlist, &notifier, None, TARGET, true)
            .await
            .unwrap();

        assert!(notifier.rendered.lock().unwrap().is_empty());
        assert!(notifier.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn silence_on_clear_still_renders_flagged_records_once() {
        let trustlist =
            FakeTrustlist::with_entry(TrustlistEntry::record(TARGET, 1, "raid alt"));
        let notifier = FakeNotifier::default();

        lookup(&trustlist, &notifier, None, TARGET, true)
            .await
            .unwrap();

        assert_eq!(notifier.rendered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blacklist_insert_of_departed_user_renders_but_never_bans() {
        let mut config = configured();
        config.auto_ban_blacklisted = true;

        let harness = Harness::new(config);

        insert_or_escalate(&harness.collab(), None, &request(3, "spam account", false))
            .await
            .unwrap();

        assert_eq!(harness.trustlist.insert_count(), 1);
        assert_eq!(harness.notifier.rendered.lock().unwrap().len(), 1);
        assert!(harness.sink.bans.lock().unwrap().is_empty());

        // The success message falls back to the raw id.
        assert!(
            harness.notifier.messages.lock().unwrap()[0].contains(&TARGET.to_string()),
        );
    }

    #[cfg(debug_assertions)]
    #[tokio::test]
    async fn remote_failure_is_reported_then_rethrown_in_debug_builds() {
        let mut harness = Harness::new(configured());
        harness.trustlist.fail_inserts = true;
        let actor = member(TARGET);

        let result = insert_or_escalate(
            &harness.collab(),
            Some(&actor),
            &request(2, "spam account", false),
        )
        .await;

        assert!(result.is_err());
        let messages = harness.notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("rejected the record"));
    }
}
