//! Check command implementation.
//!
//! One reconciliation pass over the content tree; exits nonzero when
//! any file fails to scan or parse.

use anyhow::Result;

use crate::blog::Blog;
use crate::config::BlogConfig;
use crate::log;

/// Execute check command
pub fn run_check(config: BlogConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(check(config))
}

async fn check(config: BlogConfig) -> Result<()> {
    let blog = Blog::new(config);
    blog.reload().await?;

    let dated = blog.all_posts().await?.len();
    let groups = blog.group_names().await?;
    log!("check"; "ok: {} dated posts, {} groups", dated, groups.len());
    for group in &groups {
        let count = blog.posts_by_group(group).await?.len();
        log!("check"; "  {}: {} posts", group, count);
    }
    Ok(())
}
