use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use finplan_domain::{
    ExpenseItem, FinancialCalculator, FinancialPlan, FinancialProfile, Goal, GoalType, Money,
    Rate, SavingsItem, SharedPlan, UserId,
};
use tokio::runtime::Runtime;

fn yen(amount: f64) -> Money {
    Money::jpy(amount).unwrap()
}

fn bench_plan(goals: usize) -> FinancialPlan {
    let profile = FinancialProfile::new(
        UserId::new(),
        yen(500_000.0),
        vec![
            ExpenseItem::new("housing", yen(120_000.0)),
            ExpenseItem::new("food", yen(60_000.0)),
            ExpenseItem::new("other", yen(80_000.0)),
        ]
        .into(),
        vec![SavingsItem::new("deposit", yen(3_000_000.0))].into(),
        Rate::from_percentage(5.0).unwrap(),
        Rate::from_percentage(2.0).unwrap(),
    )
    .unwrap();

    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut plan = FinancialPlan::new(profile).unwrap();
    for i in 0..goals {
        let goal = Goal::new_at(
            UserId::new(),
            GoalType::Savings,
            format!("goal {i}"),
            yen(1_000_000.0),
            now + Duration::days(3_650),
            yen(0.0),
            now,
        )
        .unwrap();
        plan.add_goal_at(goal, now).unwrap();
    }
    plan
}

fn benchmark_asset_projection(c: &mut Criterion) {
    let plan = bench_plan(0);
    let mut group = c.benchmark_group("asset_projection");

    for years in [1u32, 10, 30, 50].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(years), years, |b, &years| {
            b.iter(|| plan.profile().project_assets(black_box(years)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_plan_projection(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let mut group = c.benchmark_group("plan_projection");

    for goals in [1usize, 10, 50].iter() {
        let plan = bench_plan(*goals);
        group.bench_with_input(BenchmarkId::from_parameter(goals), goals, |b, _| {
            b.iter(|| plan.generate_projection_at(black_box(10), now).unwrap());
        });
    }

    group.finish();
}

fn benchmark_calculator(c: &mut Criterion) {
    let calc = FinancialCalculator::new();
    let principal = yen(1_000_000.0);
    let payment = yen(50_000.0);
    let rate = Rate::from_percentage(4.0).unwrap();

    c.bench_function("compound_interest_with_regular_payments", |b| {
        b.iter(|| {
            calc.compound_interest_with_regular_payments(&principal, &payment, rate, black_box(30))
                .unwrap()
        });
    });

    c.bench_function("debt_payoff_months", |b| {
        b.iter(|| {
            calc.debt_payoff_months(&yen(5_000_000.0), black_box(&payment), rate)
                .unwrap()
        });
    });
}

fn benchmark_shared_projection(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let shared = SharedPlan::new(bench_plan(10));

    c.bench_function("shared_plan_projection", |b| {
        b.iter(|| rt.block_on(shared.generate_projection(black_box(10))).unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_asset_projection,
    benchmark_plan_projection,
    benchmark_calculator,
    benchmark_shared_projection
);

criterion_main!(benches);
