use alloc::format;
use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use probe_set::HashTable as ProbeHashTable;
use probe_set::hash_table::Entry as ProbeEntry;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use siphasher::sip::SipHasher;

extern crate alloc;

trait Keyed: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct TestItem {
    key: String,
    _value: u64,
}

impl Keyed for TestItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{:016X}", key),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl Keyed for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

const BITS: &[u32] = &[10, 12, 14, 16];

/// Fixed tables degrade sharply near full, so every workload stops at 7/8.
fn working_set(bits: u32) -> usize {
    ((1usize << bits) * 7) / 8
}

fn items<Item: Keyed>(count: usize, random: bool) -> Vec<(u64, Item)> {
    let mut rng = OsRng;
    (0..count)
        .map(|i| {
            let key = if random {
                rng.try_next_u64().unwrap()
            } else {
                i as u64
            };
            let item = Item::new(key);
            (item.hash_key(), item)
        })
        .collect()
}

fn filled_probe<Item: Keyed>(bits: u32, hash_and_item: &[(u64, Item)]) -> ProbeHashTable<Item> {
    let mut table = ProbeHashTable::with_bits(bits).unwrap();
    for (hash, item) in hash_and_item.iter().cloned() {
        match table.entry(hash, |v: &Item| v.eq_key(&item)).unwrap() {
            ProbeEntry::Vacant(entry) => {
                entry.insert(item);
            }
            ProbeEntry::Occupied(_) => unreachable!(),
        }
    }
    table
}

fn filled_hashbrown<Item: Keyed>(
    capacity: usize,
    hash_and_item: &[(u64, Item)],
) -> HashbrownHashTable<Item> {
    let mut table = HashbrownHashTable::with_capacity(capacity);
    for (hash, item) in hash_and_item.iter().cloned() {
        match table.entry(hash, |v: &Item| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                entry.insert(item);
            }
            HashbrownEntry::Occupied(_) => unreachable!(),
        }
    }
    table
}

fn bench_insert_random<Item: Keyed>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_random_{}",
        core::any::type_name::<Item>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &bits in BITS {
        let count = working_set(bits);
        let hash_and_item = items::<Item>(count, true);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("probe_set/{bits}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| black_box(filled_probe(bits, &hash_and_item)),
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{bits}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| black_box(filled_hashbrown(count, &hash_and_item)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<Item: Keyed>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_hit_miss_{}",
        core::any::type_name::<Item>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &bits in BITS {
        let count = working_set(bits);
        let all = items::<Item>(count * 2, false);
        let (present, absent) = all.split_at(count);

        let mut lookups: Vec<(u64, Item)> = present.iter().chain(absent).cloned().collect();
        lookups.shuffle(&mut SmallRng::from_os_rng());

        let probe = filled_probe(bits, present);
        let hashbrown = filled_hashbrown(count, present);

        group.throughput(Throughput::Elements(lookups.len() as u64));
        group.bench_function(format!("probe_set/{bits}"), |b| {
            b.iter(|| {
                for (hash, item) in lookups.iter() {
                    black_box(probe.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{bits}"), |b| {
            b.iter(|| {
                for (hash, item) in lookups.iter() {
                    black_box(hashbrown.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<Item: Keyed>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<Item>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &bits in BITS {
        let count = working_set(bits);
        let hash_and_item = items::<Item>(count, false);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("probe_set/{bits}"), |b| {
            b.iter_batched(
                || {
                    let table = filled_probe(bits, &hash_and_item);
                    let mut order = hash_and_item.clone();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    (table, order)
                },
                |(mut table, order)| {
                    for (hash, item) in order.iter() {
                        black_box(table.remove(*hash, |v| v.eq_key(item)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{bits}"), |b| {
            b.iter_batched(
                || {
                    let table = filled_hashbrown(count, &hash_and_item);
                    let mut order = hash_and_item.clone();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    (table, order)
                },
                |(mut table, order)| {
                    for (hash, item) in order.iter() {
                        let result = match table.find_entry(*hash, |v| v.eq_key(item)) {
                            Ok(entry) => Some(entry.remove().0),
                            Err(_) => None,
                        };
                        black_box(result);
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Alternating insert/remove of the same keys. For the probing table this
/// fills the ring with tombstones, which is the worst case for misses.
fn bench_churn<Item: Keyed>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<Item>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &bits in BITS {
        let count = working_set(bits);
        let insertions_and_removals = items::<Item>(count, false)
            .into_iter()
            .flat_map(|pair| [pair.clone(), pair])
            .collect::<Vec<(u64, Item)>>();

        group.throughput(Throughput::Elements(insertions_and_removals.len() as u64));
        group.bench_function(format!("probe_set/{bits}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = insertions_and_removals.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table = ProbeHashTable::<Item>::with_bits(bits).unwrap();
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item)).unwrap() {
                            ProbeEntry::Vacant(entry) => {
                                entry.insert(item);
                            }
                            ProbeEntry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{bits}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = insertions_and_removals.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    let mut table = HashbrownHashTable::<Item>::with_capacity(count);
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
                            HashbrownEntry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            HashbrownEntry::Occupied(entry) => {
                                black_box(entry.remove().0);
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<Item: Keyed>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<Item>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &bits in BITS {
        let count = working_set(bits);
        let hash_and_item = items::<Item>(count, true);
        let probe = filled_probe(bits, &hash_and_item);
        let hashbrown = filled_hashbrown(count, &hash_and_item);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("probe_set/{bits}"), |b| {
            b.iter(|| {
                for item in probe.iter() {
                    black_box(item);
                }
            })
        });

        group.bench_function(format!("hashbrown/{bits}"), |b| {
            b.iter(|| {
                for item in hashbrown.iter() {
                    black_box(item);
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem>,
    bench_insert_random::<TestItem>,
    bench_find_hit_miss::<SmallTestItem>,
    bench_find_hit_miss::<TestItem>,
    bench_remove::<SmallTestItem>,
    bench_remove::<TestItem>,
    bench_churn::<SmallTestItem>,
    bench_churn::<TestItem>,
    bench_iteration::<SmallTestItem>,
    bench_iteration::<TestItem>,
);

criterion_main!(benches);
