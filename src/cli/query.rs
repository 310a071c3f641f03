//! Query command implementation.
//!
//! Loads the content tree once and prints the selected posts as JSON.

use std::sync::Arc;

use anyhow::Result;

use crate::blog::Blog;
use crate::cli::args::QueryArgs;
use crate::config::BlogConfig;
use crate::log;
use crate::post::Post;

/// Execute query command
pub fn run_query(args: &QueryArgs, config: BlogConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(query(args, config))
}

async fn query(args: &QueryArgs, config: BlogConfig) -> Result<()> {
    let per_page = config.posts_per_page;
    let blog = Blog::new(config);

    let posts: Vec<Arc<Post>> = if let Some(slug) = &args.slug {
        blog.post_by_slug(slug).await?.into_iter().collect()
    } else if let Some(group) = &args.group {
        blog.posts_by_group(group).await?
    } else if let Some(page) = args.page {
        blog.posts_by_page(page, per_page).await?
    } else {
        blog.all_posts().await?
    };

    log!("query"; "{} posts", posts.len());

    let json = if args.pretty {
        serde_json::to_string_pretty(&posts)?
    } else {
        serde_json::to_string(&posts)?
    };
    println!("{json}");
    Ok(())
}
