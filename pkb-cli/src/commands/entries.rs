//! Entry commands: add-entry, list-entries, search, show
//!
//! Arguments are validated into domain types before the database
//! configuration is read, so bad input fails without a connection attempt.

use anyhow::{Context, Result};
use clap::Parser;
use pkb_core::{
    EntryFilter, EntryRepo, EntryType, Error, NewEntry, Page, SearchQuery, Settings, TagName,
};

use crate::output::{self, Renderer};

#[derive(Parser, Debug)]
pub struct AddEntryArgs {
    /// Entry title
    pub title: String,

    /// Entry body
    pub content: String,

    /// Tags (comma-separated, repeatable)
    #[arg(long, short = 't', value_delimiter = ',', value_name = "TAGS")]
    pub tags: Vec<String>,

    /// Entry type (default: settings file, else "note")
    #[arg(long = "type", value_name = "TYPE")]
    pub entry_type: Option<String>,

    /// Creator label (default: settings file, else "user")
    #[arg(long = "by", env = "PKB_AUTHOR", value_name = "LABEL")]
    pub created_by: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ListEntriesArgs {
    /// Only entries carrying this tag (repeatable; all must match)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Only entries of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub entry_type: Option<String>,

    /// Maximum number of entries (default: settings file, else 20)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Number of entries to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Text to look for (case-insensitive substring)
    pub query: String,

    /// Do not search titles
    #[arg(long, conflicts_with = "no_content")]
    pub no_title: bool,

    /// Do not search content
    #[arg(long)]
    pub no_content: bool,

    /// Only entries carrying this tag (repeatable; all must match)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Only entries of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub entry_type: Option<String>,

    /// Maximum number of results
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Number of results to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Exact title of the entry
    pub title: String,
}

fn parse_tags(raw: &[String]) -> Result<Vec<TagName>, Error> {
    Ok(TagName::parse_all(raw.iter().map(String::as_str))?)
}

fn parse_type(raw: Option<&str>) -> Result<Option<EntryType>, Error> {
    Ok(raw.map(EntryType::new).transpose()?)
}

fn load_settings() -> Result<Settings> {
    Ok(Settings::load().map_err(Error::from)?)
}

/// Validate `add-entry` arguments and apply settings defaults.
fn build_new_entry(args: &AddEntryArgs, settings: &Settings) -> Result<NewEntry> {
    let entry_type = match parse_type(args.entry_type.as_deref())? {
        Some(entry_type) => entry_type,
        None => EntryType::new(&settings.defaults.entry_type)
            .map_err(Error::from)
            .context("invalid defaults.entry_type in settings")?,
    };
    let created_by = args
        .created_by
        .as_deref()
        .unwrap_or(&settings.defaults.created_by);

    let new = NewEntry::new(&args.title, &args.content)
        .and_then(|new| new.with_created_by(created_by))
        .map_err(Error::from)?
        .with_type(entry_type)
        .with_tags(parse_tags(&args.tags)?);
    Ok(new)
}

pub async fn run_add_entry(args: AddEntryArgs, renderer: Renderer) -> Result<()> {
    let settings = load_settings()?;
    let new = build_new_entry(&args, &settings)?;

    let pool = super::connect().await?;
    let result = EntryRepo::new(&pool).add(&new).await;
    pool.close().await;

    output::emit(&renderer.created(&result?)?)?;
    Ok(())
}

pub async fn run_list_entries(args: ListEntriesArgs, renderer: Renderer) -> Result<()> {
    let tags = parse_tags(&args.tags)?;
    let entry_type = parse_type(args.entry_type.as_deref())?;

    let limit = match args.limit {
        Some(limit) => limit,
        None => load_settings()?.defaults.list_limit,
    };
    let filter = EntryFilter::new()
        .tags(tags)
        .entry_type(entry_type)
        .page(Page::new(Some(limit), args.offset));

    let pool = super::connect().await?;
    let result = EntryRepo::new(&pool).list(&filter).await;
    pool.close().await;

    output::emit(&renderer.entries(&result?)?)?;
    Ok(())
}

pub async fn run_search(args: SearchArgs, renderer: Renderer) -> Result<()> {
    let search = SearchQuery::new(&args.query)
        .map_err(Error::from)?
        .in_title(!args.no_title)
        .in_content(!args.no_content);
    let filter = EntryFilter::new()
        .tags(parse_tags(&args.tags)?)
        .entry_type(parse_type(args.entry_type.as_deref())?)
        .page(Page::new(args.limit, args.offset));

    let pool = super::connect().await?;
    let result = EntryRepo::new(&pool).search(&search, &filter).await;
    pool.close().await;

    output::emit(&renderer.entries(&result?)?)?;
    Ok(())
}

pub async fn run_show(args: ShowArgs, renderer: Renderer) -> Result<()> {
    let pool = super::connect().await?;
    let result = EntryRepo::new(&pool).get_by_title(&args.title).await;
    pool.close().await;

    output::emit(&renderer.entry(&result?)?)?;
    Ok(())
}
