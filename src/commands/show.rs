//! Print a post's raw markdown

use anyhow::Result;

use crate::Publisher;

pub fn run(publisher: &Publisher, title: &str) -> Result<()> {
    let content = publisher.repository.load(title)?;
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}
