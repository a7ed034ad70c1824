use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use probe_set::Error;
use probe_set::HashTable;
use probe_set::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    /// Size exponent; the table holds 2^bits slots.
    #[arg(short = 'b', long = "bits", default_value_t = 10)]
    bits: u32,

    /// Fraction of values removed after the table is filled.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.25)]
    remove_fraction: f64,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn insert(table: &mut HashTable<u64>, value: u64) -> Result<bool, Error> {
    match table.entry(hash_u64(value), |&v| v == value)? {
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(true)
        }
        Entry::Occupied(_) => Ok(false),
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    let mut table: HashTable<u64> = HashTable::with_bits(args.bits)?;
    println!(
        "Created table with {} slots (bits = {})",
        table.capacity(),
        table.bits()
    );

    let mut next = 0u64;
    let overflow = loop {
        match insert(&mut table, next) {
            Ok(_) => next += 1,
            Err(err) => break err,
        }
    };
    println!("Inserted {} values before: {}", table.len(), overflow);
    for (distance, count) in table.probe_histogram(|&v| hash_u64(v)).iter().enumerate() {
        println!("  probe distance {distance:>4}: {count}");
    }

    let to_remove = (table.len() as f64 * args.remove_fraction) as u64;
    let mut removed = 0;
    table.retain(|&v| {
        let keep = v >= to_remove;
        if !keep {
            removed += 1;
        }
        keep
    });
    println!("Removed {removed} values");
    table.debug_stats().print();

    let mut reused = 0;
    while insert(&mut table, next).is_ok() {
        next += 1;
        reused += 1;
    }
    println!("Refilled {reused} tombstoned slots");
    table.debug_stats().print();

    Ok(())
}
