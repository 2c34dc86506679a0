// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tests for parsing index documents into entities.

use marquee_model::{Entity, EntityId, Film, Person, Related};
use serde_json::json;

#[test]
fn film_parses_sparse_document() {
    let doc = json!({
        "id": "93d538fe-1328-4b4c-a327-f61a80f25a3c",
        "title": "Test Movie",
        "actors_names": [],
        "writers_names": [],
        "directors_names": [],
        "genres_names": [],
        "actors": [],
        "writers": [],
        "directors": [],
        "genres": [],
    });

    let film: Film = serde_json::from_value(doc).unwrap();
    assert_eq!(film.id(), &EntityId::from("93d538fe-1328-4b4c-a327-f61a80f25a3c"));
    assert_eq!(film.title, "Test Movie");
    assert!(film.imdb_rating.is_none());
    assert!(film.description.is_none());
}

#[test]
fn film_parses_nested_references() {
    let doc = json!({
        "id": "f1",
        "title": "Star Trek",
        "imdb_rating": 7.9,
        "genres": [{"id": "g1", "name": "Sci-Fi"}],
    });

    let film: Film = serde_json::from_value(doc).unwrap();
    assert_eq!(film.genres, vec![Related::new("g1", "Sci-Fi")]);
    assert_eq!(film.imdb_rating, Some(7.9));
    assert!(film.actors.is_empty());
}

#[test]
fn film_builders_keep_name_lists_in_sync() {
    let film = Film::new("f1", "Alien")
        .with_genre(Related::new("g1", "Horror"))
        .with_actor(Related::new("p1", "Sigourney Weaver"))
        .with_writer(Related::new("p2", "Dan O'Bannon"))
        .with_director(Related::new("p3", "Ridley Scott"));

    assert_eq!(film.genres_names, vec!["Horror"]);
    assert_eq!(film.actors_names, vec!["Sigourney Weaver"]);
    assert_eq!(film.writers_names, vec!["Dan O'Bannon"]);
    assert_eq!(film.directors_names, vec!["Ridley Scott"]);
}

#[test]
fn person_parses_document() {
    let doc = json!({
        "id": "0040371d-f875-4d42-ab17-ffaf3cacfb92",
        "full_name": "June Laverick2",
        "roles": ["actor"],
        "film_ids": ["93d538fe-1328-4b4c-a327-f61a80f25a3c", "93d538fe-1328-4b4c-a327-f61a80f20000"],
    });

    let person: Person = serde_json::from_value(doc).unwrap();
    assert_eq!(person.full_name, "June Laverick2");
    assert_eq!(person.roles, vec!["actor"]);
    assert_eq!(person.film_ids.len(), 2);
}

#[test]
fn person_serializes_back_to_index_shape() {
    let person = Person::new("p1", "Chris Cooper").with_role("actor").with_film("f1");
    let value = serde_json::to_value(&person).unwrap();

    assert_eq!(
        value,
        json!({"id": "p1", "full_name": "Chris Cooper", "roles": ["actor"], "film_ids": ["f1"]})
    );
}
