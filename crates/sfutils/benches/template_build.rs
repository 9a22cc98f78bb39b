use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::Value as Json;
use sfutils::{Arguments, CallArgs, RecordClient, Transport, TransportError, Value, escape_list};

struct NoopTransport;

impl Transport for NoopTransport {
    async fn call(&self, _operation: &str, _args: CallArgs) -> Result<Json, TransportError> {
        Ok(Json::Null)
    }
}

/// SELECT Id FROM Account WHERE f0 = :p0 AND f1 = :p1 ...
fn template_with_params(n: usize) -> (String, Arguments) {
    let mut template = String::from("SELECT Id FROM Account WHERE ");
    let mut args = Arguments::new();
    for i in 0..n {
        if i > 0 {
            template.push_str(" AND ");
        }
        template.push_str(&format!("f{i} = :p{i}"));
        args.insert(format!("p{i}"), format!("value '{i}'"));
    }
    (template, args)
}

fn bench_named(c: &mut Criterion) {
    let client = RecordClient::new(NoopTransport);
    let mut group = c.benchmark_group("template/named");

    for n in [1, 5, 10, 50, 100] {
        let (template, args) = template_with_params(n);
        let prepared = client.prepare(template, ());
        group.bench_with_input(BenchmarkId::from_parameter(n), &args, |b, args| {
            b.iter(|| black_box(prepared.build(args)));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let client = RecordClient::new(NoopTransport);
    let prepared = client.prepare("SELECT Id FROM Contact WHERE AccountId IN :ids", ());
    let mut group = c.benchmark_group("template/in_list");

    for n in [10, 100, 1000] {
        let ids: Vec<Value> = (0..n).map(|i| Value::from(format!("001{i:015}"))).collect();
        let args = Arguments::new().set("ids", ids);
        group.bench_with_input(BenchmarkId::from_parameter(n), &args, |b, args| {
            b.iter(|| black_box(prepared.build(args)));
        });
    }

    group.finish();
}

fn bench_escape_list(c: &mut Criterion) {
    let values: Vec<Value> = (0..100)
        .map(|i| Value::from(format!("it's line {i}\n")))
        .collect();
    c.bench_function("escape/list_100", |b| {
        b.iter(|| black_box(escape_list(&values)));
    });
}

criterion_group!(benches, bench_named, bench_in_list, bench_escape_list);
criterion_main!(benches);
