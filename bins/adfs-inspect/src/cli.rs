use std::path::PathBuf;

use adfs_codec::{ReadQuery, SlotSlice};
use adfs_types::{FeedKey, RoundIndex};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "adfs-inspect", about = "Inspect Aggregated Data Feed Store calldata")]
pub struct Cli {
    /// TOML config; defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON regardless of the configured output format.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode write calldata and resolve its feeds.
    Decode(DecodeArgs),
    /// Build read calldata for a query.
    Query(QueryArgs),
    /// Decode the raw response of a read query.
    Response {
        #[command(flatten)]
        query: QueryArgs,
        /// Response bytes as hex.
        #[arg(long)]
        bytes: String,
    },
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Calldata as hex, `0x` optional.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub calldata: Option<String>,

    /// File holding the calldata as hex.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Force the accumulator header layout.
    #[arg(long)]
    pub accumulator: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    LatestIndex,
    LatestSingleData,
    LatestSingleDataAndIndex,
    LatestData,
    LatestDataAndIndex,
    DataAtIndex,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[arg(long, value_enum)]
    pub kind: QueryKind,

    #[arg(long)]
    pub feed: u128,

    #[arg(long, default_value_t = 0)]
    pub stride: u8,

    /// Round to read, `data-at-index` only.
    #[arg(long)]
    pub round: Option<u16>,

    /// First slot of the slice.
    #[arg(long, requires = "count")]
    pub start: Option<u32>,

    /// Slots in the slice, 0 reads to the end of the round.
    #[arg(long, requires = "start")]
    pub count: Option<u32>,
}

impl QueryArgs {
    pub fn to_query(&self) -> anyhow::Result<ReadQuery> {
        let feed = FeedKey::new(self.feed, self.stride);
        let slice = self.start.zip(self.count).map(|(start, count)| SlotSlice::new(start, count));
        if slice.is_some()
            && !matches!(
                self.kind,
                QueryKind::LatestData | QueryKind::LatestDataAndIndex | QueryKind::DataAtIndex
            )
        {
            anyhow::bail!("{:?} does not take a slot slice", self.kind);
        }

        let query = match self.kind {
            QueryKind::LatestIndex => ReadQuery::LatestIndex(feed),
            QueryKind::LatestSingleData => ReadQuery::LatestSingleData(feed),
            QueryKind::LatestSingleDataAndIndex => ReadQuery::LatestSingleDataAndIndex(feed),
            QueryKind::LatestData => ReadQuery::LatestData { feed, slice },
            QueryKind::LatestDataAndIndex => ReadQuery::LatestDataAndIndex { feed, slice },
            QueryKind::DataAtIndex => {
                let round = self
                    .round
                    .ok_or_else(|| anyhow::anyhow!("data-at-index needs --round"))?;
                ReadQuery::DataAtIndex {
                    feed,
                    round: RoundIndex(round),
                    slice,
                }
            }
        };
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("adfs-inspect").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn builds_sliced_query() {
        let cli = parse(&[
            "query", "--kind", "data-at-index", "--feed", "9", "--stride", "2", "--round", "3",
            "--start", "1", "--count", "2",
        ]);
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(
            args.to_query().unwrap(),
            ReadQuery::DataAtIndex {
                feed: FeedKey::new(9u128, 2),
                round: RoundIndex(3),
                slice: Some(SlotSlice::new(1, 2)),
            }
        );
    }

    #[test]
    fn data_at_index_requires_round() {
        let cli = parse(&["query", "--kind", "data-at-index", "--feed", "1"]);
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert!(args.to_query().is_err());
    }

    #[test]
    fn single_data_rejects_slice() {
        let cli = parse(&[
            "query", "--kind", "latest-single-data", "--feed", "1", "--start", "0", "--count", "1",
        ]);
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert!(args.to_query().is_err());
    }

    #[test]
    fn decode_needs_an_input() {
        assert!(Cli::try_parse_from(["adfs-inspect", "decode"]).is_err());
        let cli = parse(&["decode", "--calldata", "0x00", "--json"]);
        assert!(cli.json);
    }
}
