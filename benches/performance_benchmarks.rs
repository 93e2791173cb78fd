use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;

use vgo_admin::modules::system::dispatch::{flatten, lookup, SystemConfigCache};
use vgo_admin::modules::system::models::{
    system_config::FORM_ITEM_ARRAY, Operator, SystemConfigInput, PUBLIC_SCHEMA,
};
use vgo_admin::store::{MemoryStore, Store, SystemConfigStore};

fn input(parent_id: Option<i64>, key: &str, value: serde_json::Value, form_item_type: i32) -> SystemConfigInput {
    SystemConfigInput {
        parent_id,
        title: key.to_string(),
        key: key.to_string(),
        value: Some(value),
        sort: 0,
        status: true,
        data_options: None,
        form_item_type: Some(form_item_type),
        rule: None,
        placeholder: None,
        setting: None,
    }
}

/// 10 个分组，每组 20 个子项，其中一项为数组类型
async fn populated_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let op = Operator::system();
    for g in 0..10 {
        let group = store
            .create_system_config(PUBLIC_SCHEMA, input(None, &format!("group{}", g), json!(null), 0), &op)
            .await
            .expect("create group");
        for c in 0..20 {
            let (value, form_item_type) = if c == 0 {
                (
                    json!([
                        {"key": "b", "title": "B", "value": 2},
                        {"key": "a", "title": "A", "value": 1}
                    ]),
                    FORM_ITEM_ARRAY,
                )
            } else {
                (json!(format!("value-{}", c)), 0)
            };
            store
                .create_system_config(
                    PUBLIC_SCHEMA,
                    input(Some(group.id()), &format!("item{}", c), value, form_item_type),
                    &op,
                )
                .await
                .expect("create item");
        }
    }
    store
}

fn benchmark_config_cache(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let store = rt.block_on(populated_store());
    let dyn_store: Arc<dyn Store> = store.clone();
    let cache = SystemConfigCache::new(false);
    rt.block_on(cache.refresh_all(dyn_store.as_ref()))
        .expect("refresh");

    let rows = rt
        .block_on(store.list_system_configs(PUBLIC_SCHEMA))
        .expect("list");
    c.bench_function("flatten_200_rows", |b| b.iter(|| flatten(black_box(&rows))));

    let snapshot = rt
        .block_on(cache.get_system_config(dyn_store.as_ref(), PUBLIC_SCHEMA))
        .expect("snapshot");
    c.bench_function("lookup_exact_key", |b| {
        b.iter(|| lookup(black_box(&snapshot.values), black_box("group5.item7")))
    });
    c.bench_function("lookup_group_prefix", |b| {
        b.iter(|| lookup(black_box(&snapshot.values), black_box("group5")))
    });

    c.bench_function("cached_get_system_config_values", |b| {
        b.iter(|| {
            rt.block_on(cache.get_system_config_values(
                dyn_store.as_ref(),
                PUBLIC_SCHEMA,
                black_box("group3.item0"),
            ))
            .expect("value")
        })
    });

    c.bench_function("frontend_values_with_prefixes", |b| {
        b.iter(|| snapshot.frontend_values(black_box(Some("group1|group2"))))
    });
}

criterion_group!(benches, benchmark_config_cache);
criterion_main!(benches);
