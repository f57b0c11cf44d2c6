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
use probe_table::ProbeTable;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use siphasher::sip::SipHasher;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct TestItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for TestItem {
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

impl KeyValuePair for SmallTestItem {
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

#[derive(Clone)]
struct LargeTestItem {
    key: String,
    _value: [u8; 256],
}

impl KeyValuePair for LargeTestItem {
    fn new(key: u64) -> Self {
        let mut value = [0u8; 256];
        for (i, byte) in value.iter_mut().enumerate() {
            *byte = ((key >> ((i % 8) * 8)) & 0xFF) as u8;
        }
        black_box(Self {
            key: format!("key_{:064b}", key),
            _value: value,
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

const SIZES: &[usize] = &[
    (1 << 4),
    (1 << 6),
    (1 << 8),
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn random_items<TestItem: KeyValuePair>(count: usize) -> Vec<TestItem> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| TestItem::new(rng.try_next_u64().unwrap()))
        .collect()
}

fn hashbrown_from<TestItem: KeyValuePair>(items: &[TestItem]) -> HashbrownHashTable<TestItem> {
    let mut table = HashbrownHashTable::with_capacity(items.len());
    for item in items.iter().cloned() {
        match table.entry(item.hash_key(), |v| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                entry.insert(item);
            }
            HashbrownEntry::Occupied(_) => {}
        }
    }
    table
}

fn bench_build<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("build_{}", core::any::type_name::<TestItem>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let items = random_items::<TestItem>(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("probe_table/{}", size), |b| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    black_box(ProbeTable::build(
                        items,
                        |v| v.hash_key(),
                        |a, b| a.eq_key(b),
                    ))
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    let mut table = HashbrownHashTable::with_capacity(items.len());
                    for item in items {
                        match table.entry(item.hash_key(), |v: &TestItem| v.eq_key(&item), |v| {
                            v.hash_key()
                        }) {
                            HashbrownEntry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            HashbrownEntry::Occupied(_) => {}
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

fn bench_build_with_duplicates<TestItem: KeyValuePair, const MAX_SIZE: usize>(
    c: &mut Criterion,
) {
    let mut group = c.benchmark_group(format!(
        "build_with_duplicates_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let distinct = random_items::<TestItem>(size.div_ceil(2));
        let mut items = distinct.clone();
        items.extend(distinct.iter().cloned());
        items.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(items.len() as u64));
        group.bench_function(format!("probe_table/{}", size), |b| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    black_box(ProbeTable::build(
                        items,
                        |v| v.hash_key(),
                        |a, b| a.eq_key(b),
                    ))
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| black_box(hashbrown_from(&items)))
        });
    }

    group.finish();
}

fn bench_find_hit<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_{}", core::any::type_name::<TestItem>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let items = random_items::<TestItem>(*size);
        let hash_and_item = items
            .iter()
            .map(|item| (item.hash_key(), item.clone()))
            .collect::<Vec<(u64, TestItem)>>();

        let probe_table = ProbeTable::build(items.clone(), |v| v.hash_key(), |a, b| a.eq_key(b));
        let hashbrown_table = hashbrown_from(&items);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("probe_table/{}", size), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    for (hash, item) in hash_and_item.iter() {
                        black_box(probe_table.find(*hash, |v| v.eq_key(item)));
                    }
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| {
                    for (hash, item) in hash_and_item.iter() {
                        black_box(hashbrown_table.find(*hash, |v| v.eq_key(item)));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_miss<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_miss_{}", core::any::type_name::<TestItem>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let items = (0..*size * 2)
            .step_by(2)
            .map(|key| TestItem::new(key as u64))
            .collect::<Vec<_>>();
        let misses = (1..=*size * 2)
            .step_by(2)
            .map(|key| {
                let item = TestItem::new(key as u64);
                (item.hash_key(), item)
            })
            .collect::<Vec<(u64, TestItem)>>();

        let probe_table = ProbeTable::build(items.clone(), |v| v.hash_key(), |a, b| a.eq_key(b));
        let hashbrown_table = hashbrown_from(&items);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("probe_table/{}", size), |b| {
            b.iter(|| {
                for (hash, item) in misses.iter() {
                    black_box(probe_table.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| {
                for (hash, item) in misses.iter() {
                    black_box(hashbrown_table.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_iteration<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<TestItem>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let items = random_items::<TestItem>(*size);
        let probe_table = ProbeTable::build(items.clone(), |v| v.hash_key(), |a, b| a.eq_key(b));
        let hashbrown_table = hashbrown_from(&items);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("probe_table/{}", size), |b| {
            b.iter(|| {
                for item in probe_table.iter() {
                    black_box(item);
                }
            })
        });

        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| {
                for item in hashbrown_table.iter() {
                    black_box(item);
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build::<SmallTestItem, 7>,
    bench_build::<TestItem, 7>,
    bench_build::<LargeTestItem, 5>,
    bench_build_with_duplicates::<SmallTestItem, 7>,
    bench_build_with_duplicates::<TestItem, 7>,
    bench_build_with_duplicates::<LargeTestItem, 5>,
    bench_find_hit::<SmallTestItem, 7>,
    bench_find_hit::<TestItem, 7>,
    bench_find_hit::<LargeTestItem, 5>,
    bench_find_miss::<SmallTestItem, 7>,
    bench_find_miss::<TestItem, 7>,
    bench_find_miss::<LargeTestItem, 5>,
    bench_iteration::<SmallTestItem, 7>,
    bench_iteration::<TestItem, 7>,
    bench_iteration::<LargeTestItem, 5>,
);

criterion_main!(benches);
