use chrono::{Local, NaiveDate};

use crate::catalog::{CostBasis, FeeRule, FeeScheduleEntry, PercentValue, Pool};
use crate::fees::ResolvedEntry;
use crate::simulation::{BranchDay, ComparisonSummary, DailyComparison, Standing};

const WIDTH: usize = 78;

fn banner(title: &str) {
    println!();
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(WIDTH));
    println!("\x1b[1;36m  {}\x1b[0m", title);
    println!("\x1b[1;36m{}\x1b[0m", "═".repeat(WIDTH));
    println!();
}

fn pct(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

/// Human readable fee rule, e.g. `5.00%..20.00%` or `0.1 USD per full stake`
pub fn describe_rule(entry: &FeeScheduleEntry) -> String {
    let rule = match &entry.rule {
        None => match entry.worker_given_percent {
            Some(given) => format!("embedded ({} given to stakers)", pct(given)),
            None => "embedded".to_string(),
        },
        Some(FeeRule::Percent { value: PercentValue::Flat(p) }) => pct(*p),
        Some(FeeRule::Percent { value: PercentValue::Range(min, max) }) => {
            format!("{}..{}", pct(*min), pct(*max))
        }
        Some(FeeRule::Cost { amount, unit, per }) => match per {
            CostBasis::FullStake => format!("{} {} per full stake", amount, unit),
            CostBasis::Stake(stake) => format!("{} {} per {} staked", amount, unit, stake),
        },
    };

    match entry.max_percent {
        Some(max) => format!("{} (max {})", rule, pct(max)),
        None => rule,
    }
}

fn describe_until(until: Option<NaiveDate>) -> String {
    until.map_or_else(|| "open".to_string(), |d| d.to_string())
}

/// Pool catalog listing
pub fn print_pool_list(pools: &[Pool]) {
    banner(&format!("SATORI Pools | {} registered", pools.len()));

    if pools.is_empty() {
        println!("  No pools in catalog.");
        return;
    }

    println!(
        "  \x1b[1m{:<20} │ {:<44} │ {:>10}\x1b[0m",
        "Name", "Address", "Closed"
    );
    println!("  {}", "─".repeat(20 + 3 + 44 + 3 + 10));

    for pool in pools {
        let closed = pool.closed.map_or_else(|| "-".to_string(), |d| d.to_string());
        println!("  {:<20} │ {:<44} │ {:>10}", pool.name, pool.address, closed);

        if let Some(current) = pool.fee_schedule.last() {
            println!(
                "  {:<20} │   latest fee: {}",
                "",
                describe_rule(current)
            );
        }
    }
    println!();
}

/// Full fee history of one pool, highlighting the entry in effect on `date`
pub fn print_schedule(pool: &Pool, date: NaiveDate, resolved: Option<&ResolvedEntry>) {
    banner(&format!("Fee Schedule | {} | {}", pool.name, date));

    println!("  Address: {}", pool.address);
    if let Some(vault) = &pool.vault_address {
        println!("  Vault:   {}", vault);
    }
    if let Some(url) = &pool.url {
        println!("  URL:     {}", url);
    }
    println!();

    println!("  \x1b[1m{:>3} │ {:>10} │ {}\x1b[0m", "#", "Until", "Rule");
    println!("  {}", "─".repeat(WIDTH - 4));
    for (i, entry) in pool.fee_schedule.iter().enumerate() {
        let marker = if resolved.is_some_and(|r| r.index == i) {
            "\x1b[1;32m◀ in effect\x1b[0m"
        } else {
            ""
        };
        println!(
            "  {:>3} │ {:>10} │ {} {}",
            i,
            describe_until(entry.until),
            describe_rule(entry),
            marker
        );
    }
    println!();

    let active: Vec<_> = pool.active_reductions(date).collect();
    if !active.is_empty() {
        println!("  TEMPORARY REDUCTIONS:");
        for r in active {
            println!("    -{} from {} to {} ({})", pct(r.percent), r.from, r.until, r.reason);
        }
        println!();
    }

    match resolved {
        Some(r) => println!("  Effective on {}: \x1b[1m{}\x1b[0m", date, describe_rule(&r.entry)),
        None => println!("  \x1b[1;33mNo entry covers {}; no fee applies\x1b[0m", date),
    }
    println!();
}

fn print_standing(label: &str, standing: &Standing) {
    let color = if standing.roi_pct >= 0.0 { "32" } else { "31" };
    println!(
        "  {:<28} │ {:>16.4} │ {:>14.4} │ \x1b[1;{}m{:>+8.3}%\x1b[0m",
        label, standing.final_amount, standing.total_earnings, color, standing.roi_pct
    );
}

fn branch_cell(branch: &BranchDay) -> String {
    format!("{:.4} ({})", branch.current_amount, pct(branch.fee_percent))
}

/// Day-by-day table followed by the end-of-run standings
pub fn print_comparison(rows: &[DailyComparison], summary: Option<&ComparisonSummary>) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    banner(&format!("SATORI Pool Comparison | {}", timestamp));

    let Some(summary) = summary else {
        println!("\x1b[1;31m  No comparison rows. Check the log for date alignment errors.\x1b[0m");
        println!();
        return;
    };

    println!(
        "  Period: {} to {} ({} days) | Starting amount: {}",
        summary.from, summary.until, summary.days, summary.starting_amount
    );
    println!();

    for row in rows {
        println!(
            "  \x1b[1m{}\x1b[0m  price {:.5}  stake {:.2}  worker {:.4} ({} neurons)",
            row.date, row.price, row.stake, row.worker.current_amount, row.worker.neuron_count
        );
        for (address, day) in &row.pools {
            match &day.max {
                Some(max) => println!(
                    "      {:<44} {} .. {}",
                    address,
                    branch_cell(&day.min),
                    branch_cell(max)
                ),
                None => println!("      {:<44} {}", address, branch_cell(&day.min)),
            }
        }
    }

    banner("FINAL STANDINGS (best min branch first)");
    println!(
        "  \x1b[1m{:<28} │ {:>16} │ {:>14} │ {:>9}\x1b[0m",
        "Strategy", "Final amount", "Earnings", "ROI"
    );
    println!("  {}", "─".repeat(28 + 3 + 16 + 3 + 14 + 3 + 9));

    print_standing("Self-managed worker", &summary.worker);
    for pool in &summary.pools {
        let short: String = pool.address.chars().take(20).collect();
        match &pool.max {
            Some(max) => {
                print_standing(&format!("{} (min)", short), &pool.min);
                print_standing(&format!("{} (max)", short), max);
            }
            None => print_standing(&short, &pool.min),
        }
        if pool.last_day < summary.until {
            println!("  {:<28} │ closed after {}", "", pool.last_day);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CostUnit;

    fn entry(rule: Option<FeeRule>) -> FeeScheduleEntry {
        FeeScheduleEntry {
            rule,
            max_percent: None,
            worker_given_percent: None,
            until: None,
        }
    }

    #[test]
    fn test_describe_rule() {
        let range = entry(Some(FeeRule::Percent { value: PercentValue::Range(0.05, 0.2) }));
        assert_eq!(describe_rule(&range), "5.00%..20.00%");

        let mut cost = entry(Some(FeeRule::Cost {
            amount: 0.1,
            unit: CostUnit::Usd,
            per: CostBasis::FullStake,
        }));
        cost.max_percent = Some(0.25);
        assert_eq!(describe_rule(&cost), "0.1 USD per full stake (max 25.00%)");

        let mut embedded = entry(None);
        embedded.worker_given_percent = Some(0.75);
        assert_eq!(describe_rule(&embedded), "embedded (75.00% given to stakers)");
    }

    #[test]
    fn test_describe_until() {
        assert_eq!(describe_until(None), "open");
        assert_eq!(
            describe_until(NaiveDate::from_ymd_opt(2024, 5, 1)),
            "2024-05-01"
        );
    }
}
