//! Print archived partitions for inspection

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use telem_archive::{Archive, Category, Selector};
use telem_core::PointValue;

#[derive(Args)]
pub struct ShowArgs {
    /// Root directory of the archive
    pub root: PathBuf,

    /// Partition category: raw or stats
    pub category: Category,

    pub location: String,

    pub feed: String,

    /// Partition selector: YYYY, YYYY-MM, or YYYY-MM-DD
    pub selector: String,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let selector = parse_selector(&args.selector)?;
    let archive = Archive::new(&args.root);

    match args.category {
        Category::Raw => {
            let table = archive.read_raw(&args.location, &args.feed, &selector)?;
            for (timestamp, value) in table.iter() {
                match value {
                    PointValue::Number(v) => println!("{timestamp}\t{v}"),
                    PointValue::Text(s) => println!("{timestamp}\t{s}"),
                }
            }
        }
        Category::Stats => {
            let records = archive.read_stats(&args.location, &args.feed, &selector)?;
            for record in records {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }
    }

    Ok(())
}

fn parse_selector(raw: &str) -> Result<Selector> {
    let parts: Vec<&str> = raw.split('-').collect();
    match parts.as_slice() {
        [y] => Ok(Selector::Year(y.parse()?)),
        [y, m] => Ok(Selector::Month(y.parse()?, m.parse()?)),
        [y, m, d] => Ok(Selector::Day(y.parse()?, m.parse()?, d.parse()?)),
        _ => bail!("selector must be YYYY, YYYY-MM, or YYYY-MM-DD"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector() {
        assert_eq!(parse_selector("2024").unwrap(), Selector::Year(2024));
        assert_eq!(parse_selector("2024-03").unwrap(), Selector::Month(2024, 3));
        assert_eq!(
            parse_selector("2024-03-05").unwrap(),
            Selector::Day(2024, 3, 5)
        );
        assert!(parse_selector("2024-03-05-01").is_err());
        assert!(parse_selector("march").is_err());
    }
}
