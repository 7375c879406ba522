use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use morphic::{Environment, MemorySurface, Model, RenderOptions, Template};
use serde_json::json;

fn list_template() -> std::rc::Rc<Template> {
    Template::from_json_value(json!([
        { "statements": [
            ["openElement", "li"],
            ["dynamicAttr", "class", ["concat", ["row-", ["get", "index"]]], null],
            ["unknown", "item.label"],
            ["closeElement"]
        ], "locals": ["item", "index"] },
        { "statements": [
            ["openElement", "ul"],
            ["block", "each", [["get", "items"]], [], 0, null],
            ["closeElement"]
        ] }
    ]))
    .expect("benchmark template is valid")
}

fn items(n: usize, label: &str) -> serde_json::Value {
    json!((0..n).map(|i| json!({ "label": format!("{}{}", label, i) })).collect::<Vec<_>>())
}

fn bench_initial_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/initial");
    let template = list_template();
    let env = Environment::new();

    for &size in &[10, 100, 1_000] {
        let data = json!({ "items": items(size, "item") });
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let result = template
                    .render(
                        &env,
                        Model::new(data.clone()),
                        MemorySurface::new(),
                        RenderOptions::default(),
                    )
                    .expect("render succeeds");
                black_box(result);
            });
        });
    }

    group.finish();
}

fn bench_idle_revalidate(c: &mut Criterion) {
    let mut group = c.benchmark_group("revalidate/idle");
    let template = list_template();
    let env = Environment::new();

    for &size in &[10, 100, 1_000] {
        let model = Model::new(json!({ "items": items(size, "item") }));
        let mut result = template
            .render(&env, model, MemorySurface::new(), RenderOptions::default())
            .expect("render succeeds");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(result.revalidate().expect("revalidate succeeds")));
        });
    }

    group.finish();
}

fn bench_changed_revalidate(c: &mut Criterion) {
    let mut group = c.benchmark_group("revalidate/changed");
    let template = list_template();
    let env = Environment::new();

    for &size in &[10, 100, 1_000] {
        let model = Model::new(json!({ "items": items(size, "a") }));
        let mut result = template
            .render(&env, model.clone(), MemorySurface::new(), RenderOptions::default())
            .expect("render succeeds");
        let variants = [items(size, "b"), items(size, "a")];
        let mut flip = 0;

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                flip ^= 1;
                model.set_path("items", variants[flip].clone());
                black_box(result.revalidate().expect("revalidate succeeds"));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_initial_render,
    bench_idle_revalidate,
    bench_changed_revalidate
);
criterion_main!(benches);
