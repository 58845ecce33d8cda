use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hireboard_core::{
    FieldMapping, OrganizationFilter, PartialUpdate, WhereClause, sql_for_partial_update,
};

const ORGANIZATION_FIELDS: FieldMapping =
    FieldMapping::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

fn bench_set_clause(c: &mut Criterion) {
    let update = PartialUpdate::new()
        .set("name", "Acme")
        .set("description", "Widgets")
        .set("numEmployees", 250_i64)
        .set("logoUrl", "https://acme.test/logo.png");

    c.bench_function("sql_for_partial_update/4_fields", |b| {
        b.iter(|| sql_for_partial_update(black_box(&update), &ORGANIZATION_FIELDS))
    });
}

fn bench_where_clause(c: &mut Criterion) {
    let filter = OrganizationFilter {
        name_like: Some("acme".to_string()),
        min_employees: Some(10),
        max_employees: Some(1_000),
    };

    c.bench_function("organization_filter/all_filters", |b| {
        b.iter(|| black_box(&filter).to_where_clause())
    });
}

criterion_group!(benches, bench_set_clause, bench_where_clause);
criterion_main!(benches);
