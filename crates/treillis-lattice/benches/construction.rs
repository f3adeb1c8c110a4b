use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};
use treillis_lattice::{BijectiveComponents, ClosureSystem, RelationalContext};

const SIZES: [u16; 3] = [8, 12, 16];

fn random_context(size: u16, density: f64, rng: &mut StdRng) -> RelationalContext<u16, u16> {
    let mut ctx = RelationalContext::new();
    for i in 0..size {
        ctx.add_object(i);
        ctx.add_attribute(i);
    }
    for o in 0..size {
        for a in 0..size {
            if rng.gen_bool(density) {
                ctx.add_incidence(&o, &a).expect("both exist");
            }
        }
    }
    ctx
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice.construction");

    for size in SIZES {
        let mut rng = StdRng::seed_from_u64(0x7E11_u64 + u64::from(size));
        let ctx = random_context(size, 0.4, &mut rng);

        group.bench_with_input(BenchmarkId::new("bordat", size), &ctx, |b, ctx| {
            b.iter(|| black_box(ctx.closed_set_lattice(true).expect("lattice")));
        });

        group.bench_with_input(BenchmarkId::new("next_closure", size), &ctx, |b, ctx| {
            b.iter(|| black_box(ctx.closed_set_lattice(false).expect("lattice")));
        });

        group.bench_with_input(BenchmarkId::new("all_closures", size), &ctx, |b, ctx| {
            b.iter(|| black_box(ctx.all_closures().len()));
        });
    }

    group.finish();
}

fn bench_bases(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBA5E);
    let ctx = random_context(10, 0.4, &mut rng);
    c.bench_function("lattice.components_10", |b| {
        b.iter(|| black_box(BijectiveComponents::initialize(&ctx).expect("components")));
    });
}

criterion_group!(benches, bench_construction, bench_bases);
criterion_main!(benches);
