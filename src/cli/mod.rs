//! # Console commands
//!
//! Command-line front end over the library: manage stored credentials,
//! best-bet collections, pinned collections and their items, and look up
//! content to pin. Results are printed as pretty JSON on stdout.

use std::ffi::OsString;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use pinman::auth::Credentials;
use pinman::bestbets::BestBetsService;
use pinman::collections::{Collection, CollectionPatch, PinnedItem, top_ranked};
use pinman::config::AppConfig;
use pinman::content::ContentSearch;
use pinman::pinned::PinnedService;
use pinman::storage::{CredentialSlot, CredentialStore};

#[derive(Debug, Parser)]
#[command(name = "pinman", version, about = "Manage pinned results and best bets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API credentials locally
    Login(LoginArgs),
    /// Remove stored credentials
    Logout {
        #[arg(long, value_enum)]
        slot: Option<SlotArg>,
    },
    /// Show stored credentials as JSON (secret omitted)
    Whoami {
        #[arg(long, value_enum)]
        slot: Option<SlotArg>,
    },
    /// Best-bet collections
    #[command(subcommand)]
    Bestbets(BestBetsCommand),
    /// Pinned collections and items
    #[command(subcommand)]
    Pinned(PinnedCommand),
    /// Content lookup
    #[command(subcommand)]
    Content(ContentCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SlotArg {
    Bestbets,
    Pinned,
}

impl From<SlotArg> for CredentialSlot {
    fn from(slot: SlotArg) -> Self {
        match slot {
            SlotArg::Bestbets => CredentialSlot::BestBets,
            SlotArg::Pinned => CredentialSlot::Pinned,
        }
    }
}

fn slots(slot: Option<SlotArg>) -> Vec<CredentialSlot> {
    match slot {
        Some(slot) => vec![slot.into()],
        None => CredentialSlot::ALL.to_vec(),
    }
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long, env = "PINMAN_ACCESS_KEY")]
    pub access_key: String,
    #[arg(long, env = "PINMAN_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,
    /// Gateway URL, e.g. https://cg.optimizely.com
    #[arg(long, default_value = "")]
    pub endpoint: String,
    /// Only store for one console; both by default
    #[arg(long, value_enum)]
    pub slot: Option<SlotArg>,
}

#[derive(Debug, Subcommand)]
pub enum BestBetsCommand {
    List,
    Get { id: String },
    Create(BestBetFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: BestBetFields,
    },
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct BestBetFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,
    #[arg(long = "url")]
    pub urls: Vec<String>,
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum PinnedCommand {
    #[command(subcommand)]
    Collections(PinnedCollectionsCommand),
    #[command(subcommand)]
    Items(PinnedItemsCommand),
}

#[derive(Debug, Subcommand)]
pub enum PinnedCollectionsCommand {
    List,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        active: Option<bool>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum PinnedItemsCommand {
    List {
        collection: String,
        /// Only show the items the search layer will use
        #[arg(long)]
        ranked: bool,
    },
    Create {
        collection: String,
        #[command(flatten)]
        fields: ItemFields,
    },
    Update {
        collection: String,
        item: String,
        #[command(flatten)]
        fields: ItemFields,
    },
    Delete { collection: String, item: String },
}

#[derive(Debug, Args)]
pub struct ItemFields {
    #[arg(long = "phrase")]
    pub phrases: Vec<String>,
    /// Content GUID to pin
    #[arg(long)]
    pub target: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub priority: Option<u32>,
    #[arg(long)]
    pub active: Option<bool>,
}

impl ItemFields {
    fn apply(self, item: &mut PinnedItem) {
        if !self.phrases.is_empty() {
            item.phrases.clear();
            for phrase in &self.phrases {
                item.add_phrase(phrase);
            }
        }
        if let Some(target) = self.target {
            item.target_key = target.trim().to_string();
        }
        if let Some(language) = self.language {
            item.language = Some(language);
        }
        if let Some(priority) = self.priority {
            item.priority = priority;
        }
        if let Some(active) = self.active {
            item.is_active = active;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ContentCommand {
    Search { term: String },
}

/// Parses arguments, then reads configuration through `lookup`.
///
/// Arguments come first so `--help` and `--version` work even when a
/// `PINMAN_*` variable is invalid. Argument errors are returned as
/// [`clap::Error`] inside the `anyhow` error.
pub fn startup<I, T, F>(args: I, lookup: F) -> Result<(Cli, AppConfig)>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: Fn(&str) -> Option<String>,
{
    let cli = Cli::try_parse_from(args)?;
    let config = AppConfig::from_lookup(lookup)?;
    Ok((cli, config))
}

pub async fn run(cli: Cli, config: &AppConfig) -> Result<()> {
    let store = config.open_store()?;

    match cli.command {
        Command::Login(args) => {
            let credentials = Credentials::new(args.access_key, args.secret_key, args.endpoint);
            credentials.ensure_complete()?;
            for slot in slots(args.slot) {
                store.save(slot, &credentials)?;
                tracing::info!("Saved credentials under `{}`", slot.storage_key());
            }
            Ok(())
        }
        Command::Logout { slot } => {
            for slot in slots(slot) {
                store.clear(slot)?;
            }
            Ok(())
        }
        Command::Whoami { slot } => {
            let mut statuses = Vec::new();
            for slot in slots(slot) {
                statuses.push(SlotStatus::new(slot, store.load(slot)?));
            }
            print_json(&statuses)
        }
        Command::Bestbets(command) => {
            let credentials = stored_credentials(store.as_ref(), CredentialSlot::BestBets)?;
            let service = BestBetsService::new(config.client(&config.best_bets_url, credentials));
            run_best_bets(&service, command).await
        }
        Command::Pinned(command) => {
            let credentials = stored_credentials(store.as_ref(), CredentialSlot::Pinned)?;
            let base_url = credentials.endpoint_or(&config.gateway_url).to_string();
            let service = PinnedService::new(config.client(&base_url, credentials));
            match command {
                PinnedCommand::Collections(command) => run_pinned_collections(&service, command).await,
                PinnedCommand::Items(command) => run_pinned_items(&service, command).await,
            }
        }
        Command::Content(ContentCommand::Search { term }) => {
            let credentials = stored_credentials(store.as_ref(), CredentialSlot::Pinned)?;
            let base_url = credentials.endpoint_or(&config.gateway_url).to_string();
            let search = ContentSearch::new(config.client(&base_url, credentials));
            print_json(&search.search(&term).await?)
        }
    }
}

async fn run_best_bets(service: &BestBetsService, command: BestBetsCommand) -> Result<()> {
    match command {
        BestBetsCommand::List => print_json(&service.list().await?),
        BestBetsCommand::Get { id } => print_json(&service.get(&id).await?),
        BestBetsCommand::Create(fields) => {
            let Some(name) = fields.name else {
                bail!("--name is required");
            };
            let mut draft = Collection::new(name);
            draft.description = fields.description.unwrap_or_default();
            for keyword in &fields.keywords {
                draft.add_keyword(keyword);
            }
            for url in &fields.urls {
                draft.add_url(url);
            }
            draft.is_active = fields.active.unwrap_or(true);
            print_json(&service.create(&draft).await?)
        }
        BestBetsCommand::Update { id, fields } => {
            let patch = CollectionPatch {
                name: fields.name,
                description: fields.description,
                keywords: deduplicated(fields.keywords),
                urls: deduplicated(fields.urls),
                is_active: fields.active,
            };
            if patch.is_empty() {
                bail!("Nothing to update");
            }
            print_json(&service.update(&id, &patch).await?)
        }
        BestBetsCommand::Delete { id } => {
            service.delete(&id).await?;
            Ok(())
        }
    }
}

async fn run_pinned_collections(
    service: &PinnedService,
    command: PinnedCollectionsCommand,
) -> Result<()> {
    match command {
        PinnedCollectionsCommand::List => print_json(&service.list_collections().await?),
        PinnedCollectionsCommand::Create { title, active } => {
            let mut draft = Collection::new(title);
            draft.is_active = active.unwrap_or(true);
            print_json(&service.create_collection(&draft).await?)
        }
        PinnedCollectionsCommand::Update { id, title, active } => {
            let patch = CollectionPatch {
                name: title,
                is_active: active,
                ..Default::default()
            };
            if patch.is_empty() {
                bail!("Nothing to update");
            }
            print_json(&service.update_collection(&id, &patch).await?)
        }
        PinnedCollectionsCommand::Delete { id } => {
            service.delete_collection(&id).await?;
            Ok(())
        }
    }
}

async fn run_pinned_items(service: &PinnedService, command: PinnedItemsCommand) -> Result<()> {
    match command {
        PinnedItemsCommand::List { collection, ranked } => {
            let items = service.list_items(&collection).await?;
            if ranked {
                print_json(&top_ranked(&items))
            } else {
                print_json(&items)
            }
        }
        PinnedItemsCommand::Create { collection, fields } => {
            let mut item = PinnedItem::new(String::new());
            fields.apply(&mut item);
            print_json(&service.create_item(&collection, &item).await?)
        }
        PinnedItemsCommand::Update {
            collection,
            item,
            fields,
        } => {
            let mut existing = service
                .list_items(&collection)
                .await?
                .into_iter()
                .find(|candidate| candidate.id.as_deref() == Some(item.as_str()))
                .with_context(|| format!("Item `{item}` not found in collection `{collection}`"))?;
            fields.apply(&mut existing);
            print_json(&service.update_item(&collection, &item, &existing).await?)
        }
        PinnedItemsCommand::Delete { collection, item } => {
            service.delete_item(&collection, &item).await?;
            Ok(())
        }
    }
}

/// What `whoami` reports for one slot. The secret key is never included.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotStatus {
    slot: &'static str,
    logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
}

impl SlotStatus {
    fn new(slot: CredentialSlot, credentials: Option<Credentials>) -> Self {
        let (access_key, endpoint) = match credentials {
            Some(credentials) => (
                Some(credentials.access_key),
                Some(credentials.endpoint).filter(|endpoint| !endpoint.trim().is_empty()),
            ),
            None => (None, None),
        };
        Self {
            slot: slot.storage_key(),
            logged_in: access_key.is_some(),
            access_key,
            endpoint,
        }
    }
}

fn stored_credentials(store: &dyn CredentialStore, slot: CredentialSlot) -> Result<Credentials> {
    store
        .load(slot)?
        .with_context(|| format!("No credentials stored under `{}`; run `pinman login` first", slot.storage_key()))
}

/// Builds a trimmed, duplicate-free list the same way the collection editor does.
fn deduplicated(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        return None;
    }
    let mut scratch = Collection::new(String::new());
    for value in &values {
        scratch.add_keyword(value);
    }
    Some(scratch.keywords)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_item_create() {
        let cli = Cli::try_parse_from([
            "pinman", "pinned", "items", "create", "col-1", "--phrase", "water", "--phrase",
            "bottled water", "--target", "e4c0", "--priority", "2",
        ])
        .unwrap();

        let Command::Pinned(PinnedCommand::Items(PinnedItemsCommand::Create { collection, fields })) =
            cli.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(collection, "col-1");

        let mut item = PinnedItem::new(String::new());
        fields.apply(&mut item);
        assert_eq!(item.phrases, vec!["water", "bottled water"]);
        assert_eq!(item.target_key, "e4c0");
        assert_eq!(item.priority, 2);
    }

    #[test]
    fn help_is_served_before_a_broken_environment_is_read() {
        let broken = |key: &str| (key == "PINMAN_ENV").then(|| "staging".to_string());

        let err = startup(["pinman", "--help"], broken).unwrap_err();
        let clap_err = err.downcast_ref::<clap::Error>().unwrap();
        assert_eq!(clap_err.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = startup(["pinman", "whoami"], broken).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<pinman::ApiError>(),
            Some(pinman::ApiError::Config(_))
        ));
    }

    #[test]
    fn login_without_slot_targets_both_consoles() {
        assert_eq!(slots(None), CredentialSlot::ALL.to_vec());
        assert_eq!(slots(Some(SlotArg::Bestbets)), vec![CredentialSlot::BestBets]);
    }

    #[test]
    fn whoami_reports_json_without_secret() {
        let status = SlotStatus::new(
            CredentialSlot::Pinned,
            Some(Credentials::new("ak", "very-secret", "https://cg.example.com")),
        );
        let rendered = serde_json::to_value(&status).unwrap();
        assert_eq!(
            rendered,
            serde_json::json!({
                "slot": "optigraph-credentials",
                "loggedIn": true,
                "accessKey": "ak",
                "endpoint": "https://cg.example.com",
            })
        );
        assert!(!rendered.to_string().contains("very-secret"));

        let empty = serde_json::to_value(SlotStatus::new(CredentialSlot::BestBets, None)).unwrap();
        assert_eq!(
            empty,
            serde_json::json!({ "slot": "optimizely-graph-credentials", "loggedIn": false })
        );
    }

    #[test]
    fn deduplicated_trims_and_drops_repeats() {
        assert_eq!(
            deduplicated(vec![" sale".into(), "sale".into(), "".into()]),
            Some(vec!["sale".to_string()])
        );
        assert_eq!(deduplicated(Vec::new()), None);
    }
}
