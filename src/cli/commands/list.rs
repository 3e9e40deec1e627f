//! List articles command handler

use crate::state::SharedState;

pub async fn cmd_list_articles(state: &SharedState, published_only: bool) -> anyhow::Result<()> {
    let articles = if published_only {
        state.article_service.list_published().await?
    } else {
        state.article_service.list_all().await?
    };

    if articles.is_empty() {
        println!("No articles.");
        return Ok(());
    }

    println!("Articles ({} total)", articles.len());
    println!("{:-<70}", "");

    for article in articles {
        println!(
            "{:<9} {} | {}",
            article.status.as_str(),
            article.slug,
            article.title
        );
        println!("          ID: {} | {}", article.id, article.published_at);
    }

    Ok(())
}
