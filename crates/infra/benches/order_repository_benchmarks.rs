use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use storefront_core::{AggregateRoot, CustomerId, OrderId, OrderItemId, ProductId};
use storefront_infra::schema::ensure_schema;
use storefront_infra::{
    connect, CustomerRepository, InMemoryOrderRepository, OrderRepository, ProductRepository,
    SqliteCustomerRepository, SqliteOrderRepository, SqliteProductRepository, StoreConfig,
};
use storefront_parties::Customer;
use storefront_products::Product;
use storefront_sales::{Order, OrderItem};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn setup_sqlite(rt: &Runtime) -> SqliteOrderRepository {
    rt.block_on(async {
        let pool = connect(&StoreConfig::default()).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        SqliteCustomerRepository::new(pool.clone())
            .create(&Customer::new(CustomerId::parse("c1").unwrap(), "Customer 1").unwrap())
            .await
            .unwrap();
        SqliteProductRepository::new(pool.clone())
            .create(&Product::new(ProductId::parse("p1").unwrap(), "Product 1", 100).unwrap())
            .await
            .unwrap();
        SqliteOrderRepository::new(pool)
    })
}

fn build_order(id: &OrderId, item_count: usize) -> Order {
    let items = (0..item_count)
        .map(|n| {
            OrderItem::new(
                OrderItemId::parse(format!("{id}-{n}")).unwrap(),
                "Product 1",
                100,
                ProductId::parse("p1").unwrap(),
                2,
            )
            .unwrap()
        })
        .collect();
    Order::new(id.clone(), CustomerId::parse("c1").unwrap(), items).unwrap()
}

fn bench_create(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("order_create");

    for item_count in [1usize, 10, 50] {
        group.throughput(Throughput::Elements(item_count as u64));

        group.bench_with_input(BenchmarkId::new("sqlite", item_count), &item_count, |b, &n| {
            let repo = setup_sqlite(&rt);
            b.iter(|| {
                let order = build_order(&OrderId::generate(), n);
                rt.block_on(repo.create(black_box(&order))).unwrap();
            });
        });

        group.bench_with_input(BenchmarkId::new("in_memory", item_count), &item_count, |b, &n| {
            let repo = InMemoryOrderRepository::new();
            b.iter(|| {
                let order = build_order(&OrderId::generate(), n);
                rt.block_on(repo.create(black_box(&order))).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_find_one(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("order_find_one");

    for item_count in [1usize, 10, 50] {
        group.bench_with_input(BenchmarkId::new("sqlite", item_count), &item_count, |b, &n| {
            let repo = setup_sqlite(&rt);
            let order = build_order(&OrderId::parse("bench").unwrap(), n);
            rt.block_on(repo.create(&order)).unwrap();

            b.iter(|| {
                let loaded = rt.block_on(repo.find_one(black_box(order.id()))).unwrap();
                assert_eq!(loaded.items().len(), n);
            });
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("order_update_replace_items");

    group.bench_function("sqlite_10_items", |b| {
        let repo = setup_sqlite(&rt);
        let order = build_order(&OrderId::parse("bench").unwrap(), 10);
        rt.block_on(repo.create(&order)).unwrap();

        b.iter(|| {
            rt.block_on(repo.update(black_box(&order))).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_create, bench_find_one, bench_update);
criterion_main!(benches);
