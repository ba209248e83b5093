//! Relief registry benchmark suite.
//!
//! Targets:
//!   graph_load_1000_victims ........ < 5ms
//!   stock_and_hand_out ............. < 200μs
//!   water_sweep_500_allocations .... < 10ms

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use relief_core::config::ReliefConfig;
use relief_core::gateway::{
    AllocationRow, LocationRow, OccupancyRow, PersonRow, Snapshot, SupplyRow,
};
use relief_core::loader::build_graph;
use relief_core::sqlite::SqliteGateway;
use relief_core::{Deadline, LocationId, OpContext, PersonId, ReliefSession, SupplyId};

fn make_snapshot(victims: i64) -> Snapshot {
    let shelters = (victims / 50).max(1);
    Snapshot {
        persons: (1..=victims)
            .map(|i| PersonRow {
                id: i,
                first_name: format!("Victim{i}"),
                last_name: "Bench".to_string(),
                phone: format!("555-{i:04}"),
                disaster_type: Some("Flood".to_string()),
                ..PersonRow::default()
            })
            .collect(),
        locations: (1..=shelters)
            .map(|i| LocationRow {
                id: i,
                name: format!("Shelter {i}"),
                address: format!("{i} Relief Way"),
            })
            .collect(),
        supplies: (1..=victims * 2)
            .map(|i| SupplyRow {
                id: i,
                type_tag: if i % 2 == 0 { "water" } else { "blanket" }.to_string(),
                comments: None,
            })
            .collect(),
        occupancy: (1..=victims)
            .map(|i| OccupancyRow {
                person_id: i,
                location_id: i % shelters + 1,
            })
            .collect(),
        allocations: (1..=victims)
            .map(|i| AllocationRow {
                supply_id: i * 2 - 1,
                person_id: None,
                location_id: Some(i % shelters + 1),
                allocated_at: None,
            })
            .collect(),
        ..Snapshot::default()
    }
}

fn seeded_session(victims: i64) -> ReliefSession<SqliteGateway> {
    let gateway = SqliteGateway::open_in_memory().expect("open");
    let mut script = String::from("BEGIN;\nINSERT INTO Location (location_id, name, address) VALUES (1, 'Shelter', '1 Way');\n");
    for i in 1..=victims {
        script.push_str(&format!(
            "INSERT INTO Person (person_id, first_name, last_name, phone_number) VALUES ({i}, 'V{i}', 'Bench', '555');\n\
             INSERT INTO PersonLocation (person_id, location_id) VALUES ({i}, 1);\n\
             INSERT INTO Supply (supply_id, type) VALUES ({i}, 'water');\n"
        ));
    }
    script.push_str("INSERT INTO Supply (supply_id, type) VALUES (1000000, 'blanket');\nCOMMIT;");
    gateway.import_sql(&script).expect("seed");
    let mut config = ReliefConfig::default();
    config.allocation.sweep_on_load = false;
    ReliefSession::with_gateway(gateway, config).expect("session")
}

/// Benchmark: build the graph for 1000 victims (target: < 5ms).
fn bench_graph_load(c: &mut Criterion) {
    let snapshot = make_snapshot(1000);
    c.bench_function("graph_load_1000_victims", |b| {
        b.iter(|| {
            let (graph, report) = build_graph(black_box(snapshot.clone()));
            black_box((graph, report));
        });
    });
}

/// Benchmark: stock a blanket, hand it out, take it back (target: < 200μs).
fn bench_hand_out(c: &mut Criterion) {
    let session = seeded_session(10);
    let blanket = SupplyId(1_000_000);
    c.bench_function("stock_and_hand_out", |b| {
        b.iter(|| {
            session
                .allocate_to_location(blanket, LocationId(1))
                .expect("stock");
            session
                .allocate_to_person(blanket, black_box(PersonId(3)))
                .expect("hand out");
            session.release_supply(blanket).expect("release");
        });
    });
}

/// Benchmark: sweep 500 expired water allocations (target: < 10ms).
fn bench_water_sweep(c: &mut Criterion) {
    c.bench_function("water_sweep_500_allocations", |b| {
        b.iter_batched(
            || {
                let session = seeded_session(500);
                let old = OpContext::at(Utc::now() - Duration::hours(30));
                for i in 1..=500 {
                    session
                        .allocate_water_to_person_with(SupplyId(i), PersonId(i), old)
                        .expect("water");
                }
                session
            },
            |session| {
                let removed = session
                    .cleanup_expired_water_at(Utc::now(), Deadline::none())
                    .expect("sweep");
                black_box(removed);
            },
            BatchSize::PerIteration,
        );
    });
}

criterion_group!(
    benches,
    bench_graph_load,
    bench_hand_out,
    bench_water_sweep,
);
criterion_main!(benches);
