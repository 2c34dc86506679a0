// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Wiring and cross-kind lookups through the catalog container.

use std::collections::BTreeSet;
use std::time::Duration;

use marquee::{Backfill, Catalog, CatalogConfig, ServiceConfig};
use marquee_cache::testing::{MockStore, StoreOp};
use marquee_model::{Film, Person, Related};
use marquee_search::testing::{BackendCall, MockBackend};

fn films() -> MockBackend<Film> {
    MockBackend::from_iter([
        Film::new("f1", "Pleasantville").with_actor(Related::new("p1", "Chris Cooper")),
        Film::new("f2", "Seabiscuit").with_actor(Related::new("p1", "Chris Cooper")),
        Film::new("f3", "Heat"),
    ])
}

fn persons() -> MockBackend<Person> {
    MockBackend::from_iter([
        Person::new("p1", "Chris Cooper")
            .with_role("actor")
            .with_film("f1")
            .with_film("f2")
            .with_film("f-gone"),
        Person::new("p2", "June Laverick"),
    ])
}

fn awaited() -> ServiceConfig {
    ServiceConfig::default().backfill(Backfill::Awaited)
}

#[tokio::test(start_paused = true)]
async fn films_of_person_resolves_credits_through_the_cache() {
    let store = MockStore::new();
    let films = films();
    let catalog = Catalog::builder(store.clone())
        .films(films.clone())
        .persons(persons())
        .service_config(awaited())
        .build();

    let credited = catalog.films_of_person(&"p1".into()).await.unwrap().unwrap();
    let titles: BTreeSet<_> = credited.iter().map(|film| film.title.as_str()).collect();
    assert_eq!(titles, BTreeSet::from(["Pleasantville", "Seabiscuit"]));

    let keys: BTreeSet<_> = store
        .operations()
        .into_iter()
        .filter(|op| matches!(op, StoreOp::Set { .. }))
        .map(|op| op.key().to_owned())
        .collect();
    assert_eq!(
        keys,
        BTreeSet::from(["film:f1", "film:f2", "person:p1"].map(str::to_owned))
    );

    // Cached credits are not fetched again; only the unknown one goes back to the backend.
    films.clear_calls();
    catalog.films_of_person(&"p1".into()).await.unwrap();
    assert_eq!(films.calls(), vec![BackendCall::BulkGet(vec!["f-gone".into()])]);
}

#[tokio::test(start_paused = true)]
async fn films_of_unknown_person_is_none() {
    let films = films();
    let catalog = Catalog::builder(MockStore::new())
        .films(films.clone())
        .persons(persons())
        .build();

    assert_eq!(catalog.films_of_person(&"nobody".into()).await.unwrap(), None);
    assert!(films.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn person_without_films_has_an_empty_list() {
    let films = films();
    let catalog = Catalog::builder(MockStore::new())
        .films(films.clone())
        .persons(persons())
        .build();

    assert_eq!(catalog.films_of_person(&"p2".into()).await.unwrap(), Some(Vec::new()));
    assert!(films.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn config_sets_ttl_and_backfill_mode() {
    let store = MockStore::new();
    let config = CatalogConfig {
        cache_ttl_secs: 60,
        backfill: Backfill::Awaited,
        ..CatalogConfig::default()
    };
    let catalog = Catalog::builder(store.clone())
        .films(films())
        .persons(persons())
        .config(&config)
        .build();

    catalog.persons().fetch_by_id(&"p2".into()).await.unwrap();

    assert_eq!(catalog.persons().config().backfill, Backfill::Awaited);
    assert_eq!(
        store.operations().last(),
        Some(&StoreOp::Set {
            key: "person:p2".to_owned(),
            ttl: Duration::from_secs(60),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn clones_share_clients() {
    let store = MockStore::new();
    let films = films();
    let catalog = Catalog::builder(store.clone())
        .films(films.clone())
        .persons(persons())
        .service_config(awaited())
        .build();
    let clone = catalog.clone();

    catalog.films().fetch_by_id(&"f3".into()).await.unwrap();
    clone.films().fetch_by_id(&"f3".into()).await.unwrap();

    assert_eq!(films.calls(), vec![BackendCall::GetById("f3".into())]);
    assert_eq!(store.get_count(), 2);
}
