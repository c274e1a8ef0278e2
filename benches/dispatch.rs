use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diffrules::capability::{HIGHER_ORDER, REVERSE_MODE};
use diffrules::{
    ArgPattern, Callable, Differential, FnId, NamedParamPolicy, NamedParams, Pullback, RuleKey,
    RuleSet, Signature, Value,
};

const MUL: FnId = FnId::from_static("mul");
const EXP: FnId = FnId::from_static("exp");
const SUM: FnId = FnId::from_static("sum");
const UNKNOWN: FnId = FnId::from_static("unknown");

/// A rule set shaped like a small standard library: a few hundred filler
/// operations plus the ones the benchmarks query.
fn rule_set() -> RuleSet {
    let mut builder = RuleSet::builder();
    for idx in 0..256 {
        let op = FnId::new(&format!("filler_{idx}")).expect("interned");
        builder
            .register_forward(RuleKey::new(op, Signature::unary_real()), |call, _| {
                Ok((call.arg(0).cloned().unwrap_or(Value::Real(0.0)), Differential::Zero))
            })
            .expect("filler");
    }
    builder
        .register_forward(RuleKey::new(MUL, Signature::binary_real()), |call, dots| {
            let a = call.real_arg(0).unwrap_or_default();
            let b = call.real_arg(1).unwrap_or_default();
            let da = dots[1].as_real().unwrap_or(0.0);
            let db = dots[2].as_real().unwrap_or(0.0);
            Ok((Value::Real(a * b), Differential::from(da * b + a * db)))
        })
        .expect("mul")
        .register_forward(RuleKey::new(MUL, Signature::any(2)), |_, _| {
            Ok((Value::Real(0.0), Differential::Zero))
        })
        .expect("generic mul")
        .register_reverse(RuleKey::new(EXP, Signature::unary_real()), |call| {
            let y = call.real_arg(0).unwrap_or_default().exp();
            Ok((Value::Real(y), Pullback::new(2, move |dy| Ok(vec![Differential::Zero, dy.scale(y)]))))
        })
        .expect("exp")
        .register_reverse(
            RuleKey::new(EXP, Signature::new([ArgPattern::Number])).with_capability(&REVERSE_MODE),
            |call| Ok((Value::Real(call.real_arg(0).unwrap_or_default()), Pullback::zero(2))),
        )
        .expect("scoped exp")
        .register_forward(
            RuleKey::new(SUM, Signature::variadic([], ArgPattern::REAL))
                .with_named(NamedParamPolicy::Only(&["dims"])),
            |call, _| {
                let total: f64 = call.args().iter().filter_map(Value::as_real).sum();
                Ok((Value::Real(total), Differential::Zero))
            },
        )
        .expect("sum");
    builder.build().expect("rule set")
}

fn bench_forward(c: &mut Criterion) {
    let rules = rule_set();
    let mul = Callable::from(MUL);
    let unknown = Callable::from(UNKNOWN);
    let args = [Value::Real(3.0), Value::Real(4.0)];
    let dots = [Differential::Zero, Differential::from(1.0), Differential::Zero];

    let mut group = c.benchmark_group("forward_rule");
    group.bench_function("hit", |b| {
        b.iter(|| rules.forward_rule(None, black_box(&dots), black_box(&mul), black_box(&args)))
    });
    group.bench_function("miss", |b| {
        b.iter(|| rules.forward_rule(None, black_box(&dots), black_box(&unknown), black_box(&args)))
    });
    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    let rules = rule_set();
    let exp = Callable::from(EXP);
    let args = [Value::Real(0.5)];

    let mut group = c.benchmark_group("reverse_rule");
    group.bench_function("free", |b| {
        b.iter(|| rules.reverse_rule(None, black_box(&exp), black_box(&args)))
    });
    group.bench_function("capability_lineage", |b| {
        b.iter(|| rules.reverse_rule(Some(&HIGHER_ORDER), black_box(&exp), black_box(&args)))
    });
    group.finish();
}

fn bench_named(c: &mut Criterion) {
    let rules = rule_set();
    let sum = Callable::from(SUM);
    let args: Vec<Value> = (0..8).map(|i| Value::Real(f64::from(i))).collect();
    let dots = Differential::zeros(args.len() + 1);
    let named = NamedParams::new().with("dims", 1_i64);

    c.bench_function("forward_rule_kw", |b| {
        b.iter(|| rules.forward_rule_kw(black_box(&named), None, &dots, black_box(&sum), &args))
    });
}

criterion_group!(benches, bench_forward, bench_reverse, bench_named);
criterion_main!(benches);
