//! Delete a post and its images

use anyhow::Result;

use crate::Publisher;

pub fn run(publisher: &Publisher, title: &str) -> Result<()> {
    let path = publisher.repository.delete(title)?;
    println!("Deleted: {:?}", path);
    Ok(())
}
