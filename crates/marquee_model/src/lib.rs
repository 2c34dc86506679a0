// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]

//! Catalog entity types.
//!
//! Entities are immutable records created by an upstream ingestion system. The lookup
//! services only read them: the search backend returns them as JSON documents and the cache
//! stores them as opaque serialized payloads keyed by [`EntityId`].
//!
//! # Examples
//!
//! ```
//! use marquee_model::{Entity, EntityId, EntityKind, Person};
//!
//! let person = Person::new("0040371d-f875-4d42-ab17-ffaf3cacfb91", "Chris Cooper");
//! assert_eq!(person.id(), &EntityId::from("0040371d-f875-4d42-ab17-ffaf3cacfb91"));
//! assert_eq!(Person::KIND, EntityKind::Person);
//! ```

mod entity;
mod film;
mod id;
mod person;

#[doc(inline)]
pub use entity::{Entity, EntityKind};
#[doc(inline)]
pub use film::{Film, Related};
#[doc(inline)]
pub use id::EntityId;
#[doc(inline)]
pub use person::Person;
