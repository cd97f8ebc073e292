//! list-tags command

use anyhow::Result;
use clap::{Parser, ValueEnum};
use pkb_core::{TagOrder, TagRepo};

use crate::output::{self, Renderer};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagSort {
    /// Most used first, then by name
    #[default]
    Usage,
    /// Alphabetical
    Name,
}

impl From<TagSort> for TagOrder {
    fn from(sort: TagSort) -> Self {
        match sort {
            TagSort::Usage => TagOrder::Usage,
            TagSort::Name => TagOrder::Name,
        }
    }
}

#[derive(Parser, Debug)]
pub struct ListTagsArgs {
    /// Sort order
    #[arg(long, value_enum, default_value_t = TagSort::Usage)]
    pub sort: TagSort,
}

pub async fn run_list_tags(args: ListTagsArgs, renderer: Renderer) -> Result<()> {
    let pool = super::connect().await?;
    let result = TagRepo::new(&pool).list(args.sort.into()).await;
    pool.close().await;

    output::emit(&renderer.tags(&result?)?)?;
    Ok(())
}
