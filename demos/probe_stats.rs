use std::collections::hash_map::DefaultHasher;
use std::hash::BuildHasherDefault;

use clap::Parser;
use probe_table::ImmutableSet;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "elements", default_value_t = 1000)]
    elements: usize,

    /// Every `repeat_every`-th input element repeats an earlier one.
    #[arg(short = 'r', long = "repeat_every", default_value_t = 0)]
    repeat_every: usize,
}

fn main() {
    let args = Args::parse();

    println!("Building ImmutableSet from {} input elements", args.elements);

    let input = (0..args.elements as u64)
        .map(|i| {
            if args.repeat_every != 0 && i % args.repeat_every as u64 == 0 && i != 0 {
                i / 2
            } else {
                i
            }
        })
        .collect::<Vec<u64>>();

    let set = ImmutableSet::from_vec_with_hasher(
        input,
        BuildHasherDefault::<DefaultHasher>::default(),
    );

    println!("Distinct elements: {}", set.len());
    println!(
        "Duplicates discarded: {}",
        args.elements.saturating_sub(set.len())
    );

    set.probe_histogram().print();
    set.debug_stats().print();
}
