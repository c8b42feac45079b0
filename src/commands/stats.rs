//! `stats` command.

use super::{local_offset, open_tracker, parse_date};
use crate::libs::messages::Message;
use crate::libs::stats::Period;
use crate::libs::ticker::TokioTicker;
use crate::libs::view::View;
use crate::msg_print;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long, short, value_enum, default_value_t = Period::Week)]
    period: Period,

    /// Anchor date of the period (YYYY-MM-DD or 'today')
    #[arg(long, short, default_value = "today")]
    date: String,
}

pub fn cmd(args: StatsArgs) -> Result<()> {
    let anchor = parse_date(&args.date)?;
    let (ticker, _ticks) = TokioTicker::new();
    let tracker = open_tracker(Box::new(ticker))?;

    let stats = tracker.sessions().stats_for_period(args.period, anchor, local_offset())?;
    msg_print!(Message::StatsHeader(args.period.to_string(), anchor.format("%B %-d, %Y").to_string()), true);
    View::stats(&stats)?;
    Ok(())
}
