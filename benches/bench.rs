// Criterion benchmarks for cats-social

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cats_social::core::{
    eligibility::{check_eligibility, MessageBounds, Proposal},
    view::reorient_all,
};
use cats_social::models::{Cat, CatDetail, CatSex, MatchListing, UserSnapshot};
use chrono::Utc;

fn create_cat(id: usize, user_id: i64, sex: CatSex) -> Cat {
    Cat {
        id: format!("cat-{}", id),
        user_id,
        name: format!("Cat {}", id),
        race: "Maine Coon".to_string(),
        sex,
        age_in_month: (id % 120) as i32,
        description: "a very good cat".to_string(),
        image_urls: vec!["https://img.example.com/cat.png".to_string()],
        has_matched: false,
        created_at: Utc::now(),
    }
}

fn create_listings(count: usize) -> Vec<MatchListing> {
    (0..count)
        .map(|i| {
            let issuer = create_cat(i * 2, (i % 7) as i64, CatSex::Male);
            let target = create_cat(i * 2 + 1, (i % 5) as i64 + 10, CatSex::Female);
            MatchListing {
                id: format!("match-{}", i),
                issued_by: UserSnapshot {
                    id: issuer.user_id,
                    name: format!("User {}", issuer.user_id),
                    email: format!("user{}@example.com", issuer.user_id),
                    created_at: Utc::now(),
                },
                issuer_cat: CatDetail::from(&issuer),
                target_cat: CatDetail::from(&target),
                message: "would love to meet".to_string(),
                created_at: Utc::now(),
            }
        })
        .collect()
}

fn bench_eligibility(c: &mut Criterion) {
    let issuer = create_cat(1, 1, CatSex::Male);
    let target = create_cat(2, 2, CatSex::Female);
    let bounds = MessageBounds::default();

    c.bench_function("check_eligibility", |b| {
        b.iter(|| {
            let proposal = Proposal {
                issuer: black_box(&issuer),
                target: black_box(&target),
                message: black_box("would love to meet your cat"),
            };
            check_eligibility(&proposal, &bounds)
        })
    });
}

fn bench_reorient(c: &mut Criterion) {
    let mut group = c.benchmark_group("reorient_all");

    for size in [10, 100, 1000].iter() {
        let listings = create_listings(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &listings, |b, listings| {
            b.iter(|| reorient_all(black_box(listings.clone()), 3))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_eligibility, bench_reorient);
criterion_main!(benches);
