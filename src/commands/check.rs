//! Check whether a title would collide with an existing post

use anyhow::Result;

use crate::Publisher;

/// Returns `true` when a post with the same filename already exists
pub fn run(publisher: &Publisher, title: &str) -> Result<bool> {
    let duplicate = publisher.repository.check_duplicate(title)?;

    match &duplicate.path {
        Some(path) => println!("Duplicate: {:?} already exists", path),
        None => println!("No post named {:?} yet", title),
    }

    Ok(duplicate.found)
}
