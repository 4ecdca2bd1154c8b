use std::cmp::Ordering;
use std::error::Error;
use std::fmt::Display;
use std::io::{self, BufRead, BufWriter, Write};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, debug, info, warn};
use redblack::{DuplicateKey, Order, RbtreeGeneric};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(clap::Parser)]
#[command(name = "rbwalk", about = "Loads lines from stdin into a red-black tree and walks it.")]
struct Opt {
    #[arg(long)]
    /// Parse every line as a signed integer and order numerically. Lines that fail to parse are
    /// skipped.
    numeric: bool,

    #[arg(long)]
    /// Order from largest to smallest.
    reverse: bool,

    #[arg(long = "delete", value_name = "KEY")]
    /// Remove KEY from the tree after loading. May be repeated.
    deletes: Vec<String>,

    #[arg(short, action = ArgAction::Count)]
    /// Log more. Repeat for more detail, up to -vvv for every rebalancing step.
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every element, one per line, in the given order.
    Walk {
        #[arg(value_enum, default_value_t = OrderArg::In)]
        order: OrderArg,
    },
    /// Print the size, height and extreme elements of the tree.
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    In,
    Pre,
    Post,
    Level,
}

impl From<OrderArg> for Order {
    fn from(o: OrderArg) -> Self {
        match o {
            OrderArg::In => Self::In,
            OrderArg::Pre => Self::Pre,
            OrderArg::Post => Self::Post,
            OrderArg::Level => Self::Level,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::parse();

    let level = match opt.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let lines: Vec<String> = io::stdin().lock().lines().map_while(Result::ok).collect();
    let mut out = BufWriter::new(io::stdout().lock());

    if opt.numeric {
        let items = parse_numbers(lines);
        let deletes = parse_numbers(opt.deletes.clone());
        run(&opt.cmd, comparator(opt.reverse), items, &deletes, &mut out)?;
    } else {
        run(&opt.cmd, comparator(opt.reverse), lines, &opt.deletes, &mut out)?;
    }

    out.flush()?;
    Ok(())
}

fn comparator<T: Ord>(reverse: bool) -> fn(&T, &T) -> Ordering {
    if reverse {
        return |a: &T, b: &T| b.cmp(a);
    }
    T::cmp
}

fn parse_numbers(lines: Vec<String>) -> Vec<i64> {
    lines
        .into_iter()
        .filter_map(|l| match l.trim().parse() {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("Skipping {l:?}: {e}");
                None
            }
        })
        .collect()
}

fn run<T, C, W>(
    cmd: &Command,
    compare: C,
    items: Vec<T>,
    deletes: &[T],
    out: &mut W,
) -> io::Result<()>
where
    T: Display,
    C: Fn(&T, &T) -> Ordering,
    W: Write,
{
    let mut tree = RbtreeGeneric::new(compare);

    for item in items {
        if let Err(DuplicateKey(dup)) = tree.insert(item) {
            debug!("Skipping duplicate {dup}");
        }
    }

    for d in deletes {
        if let Err(e) = tree.delete(d) {
            warn!("Could not delete {d}: {e}");
        }
    }

    info!("Loaded {} elements, height {}", tree.size(), tree.height());

    match cmd {
        Command::Walk { order } => {
            for item in tree.traverse((*order).into()) {
                writeln!(out, "{item}")?;
            }
        }
        Command::Stats => {
            writeln!(out, "size:   {}", tree.size())?;
            writeln!(out, "height: {}", tree.height())?;
            writeln!(out, "first:  {}", or_dash(tree.first()))?;
            writeln!(out, "last:   {}", or_dash(tree.last()))?;
        }
    }

    Ok(())
}

fn or_dash<T: Display>(item: Option<&T>) -> String {
    item.map_or_else(|| "-".to_owned(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output<T: Ord + Display>(cmd: &Command, reverse: bool, items: Vec<T>, deletes: &[T]) -> String {
        let mut out = Vec::new();
        run(cmd, comparator(reverse), items, deletes, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn comparators() {
        let asc = comparator::<i64>(false);
        let desc = comparator::<i64>(true);

        assert_eq!(asc(&1, &2), Ordering::Less);
        assert_eq!(desc(&1, &2), Ordering::Greater);
        assert_eq!(desc(&2, &2), Ordering::Equal);
    }

    #[test]
    fn numbers() {
        let lines = ["10", " -3 ", "ten", "", "7"].map(str::to_owned).to_vec();
        assert_eq!(parse_numbers(lines), [10, -3, 7]);
    }

    #[test]
    fn walk_orders() {
        let items = || vec![10, 5, 15, 5];

        let walk = |order| Command::Walk { order };
        assert_eq!(output(&walk(OrderArg::In), false, items(), &[]), "5\n10\n15\n");
        assert_eq!(output(&walk(OrderArg::Pre), false, items(), &[]), "10\n5\n15\n");
        assert_eq!(output(&walk(OrderArg::Post), false, items(), &[]), "5\n15\n10\n");
        assert_eq!(output(&walk(OrderArg::In), true, items(), &[]), "15\n10\n5\n");
    }

    #[test]
    fn deletes_and_stats() {
        let items: Vec<String> = ["pear", "fig", "apple"].map(str::to_owned).to_vec();
        let deletes = ["fig".to_owned(), "kiwi".to_owned()];

        assert_eq!(
            output(&Command::Walk { order: OrderArg::In }, false, items.clone(), &deletes),
            "apple\npear\n"
        );
        assert_eq!(
            output(&Command::Stats, false, items, &deletes),
            "size:   2\nheight: 2\nfirst:  apple\nlast:   pear\n"
        );
        assert_eq!(
            output::<i64>(&Command::Stats, false, Vec::new(), &[]),
            "size:   0\nheight: 0\nfirst:  -\nlast:   -\n"
        );
    }
}
