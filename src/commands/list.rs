//! List posts

use anyhow::Result;

use crate::content::listing::DEFAULT_PAGE_SIZE;
use crate::Publisher;

/// Print one page of posts, newest first
pub fn run(publisher: &Publisher, page: i64, page_size: i64, search: &str) -> Result<()> {
    let result = publisher.repository.list(page, page_size, search)?;

    if search.is_empty() {
        println!("Posts ({}):", result.total);
    } else {
        println!("Posts matching {:?} ({}):", search, result.total);
    }

    for post in &result.posts {
        let date = if post.date.is_empty() {
            "----------"
        } else {
            post.date.as_str()
        };
        if post.tags.is_empty() {
            println!("  {} - {}", date, post.title);
        } else {
            println!("  {} - {} [{}]", date, post.title, post.tags.join(", "));
        }
    }

    let size = if page_size <= 0 {
        DEFAULT_PAGE_SIZE as i64
    } else {
        page_size
    };
    let pages = (result.total as i64 + size - 1) / size;
    if pages > 1 {
        println!("Page {} of {}", page.max(1), pages);
    }

    Ok(())
}

/// Print the filename stem of every post
pub fn titles(publisher: &Publisher) -> Result<()> {
    for title in publisher.repository.list_titles()? {
        println!("{}", title);
    }
    Ok(())
}
