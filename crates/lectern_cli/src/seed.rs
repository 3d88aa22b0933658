//! Idempotent sample data: KJV, Genesis, chapter 1, verses 1-10.

use anyhow::Result;
use lectern_core::service::{
    BulkLeaves, CollectionService, LeafService, LeafSpec, NewCollection, NewSubunit, NewUnit,
    SubunitService, UnitService,
};
use lectern_core::{EntityId, EntityKind, ServiceContext, Store};
use log::info;
use serde::Serialize;

const GENESIS_ONE: [&str; 10] = [
    "In the beginning God created the heaven and the earth.",
    "And the earth was without form, and void; and darkness was upon the face of the deep. And the Spirit of God moved upon the face of the waters.",
    "And God said, Let there be light: and there was light.",
    "And God saw the light, that it was good: and God divided the light from the darkness.",
    "And God called the light Day, and the darkness he called Night. And the evening and the morning were the first day.",
    "And God said, Let there be a firmament in the midst of the waters, and let it divide the waters from the waters.",
    "And God made the firmament, and divided the waters which were under the firmament from the waters which were above the firmament: and it was so.",
    "And God called the firmament Heaven. And the evening and the morning were the second day.",
    "And God said, Let the waters under the heaven be gathered together unto one place, and let the dry land appear: and it was so.",
    "And God called the dry land Earth; and the gathering together of the waters called he Seas: and God saw that it was good.",
];

#[derive(Debug, Serialize)]
pub struct SeedSummary {
    pub collection_id: EntityId,
    pub unit_id: EntityId,
    pub subunit_id: EntityId,
    pub leaves_created: usize,
}

/// Creates whatever part of the sample is missing; existing records are kept.
pub fn run<S: Store>(ctx: ServiceContext<'_, S>) -> Result<SeedSummary> {
    let collection_id = match ctx
        .store
        .find_collection_by_natural_key(None, Some("KJV"), None)?
    {
        Some(existing) => existing.id,
        None => {
            CollectionService::new(ctx)
                .create(&NewCollection {
                    name: "King James Version".to_string(),
                    code: "KJV".to_string(),
                    language: "English".to_string(),
                    description: Some(
                        "The King James Version, published in 1611, is one of the most widely used English translations of the Bible."
                            .to_string(),
                    ),
                })?
                .id
        }
    };

    let unit_id = match ctx
        .store
        .find_by_parent_and_ordinal(EntityKind::Unit, collection_id, 1)?
    {
        Some(id) => id,
        None => {
            UnitService::new(ctx)
                .create(&NewUnit {
                    collection_id,
                    ordinal: 1,
                    name: "Genesis".to_string(),
                    code: "Gen".to_string(),
                    category: "OT".to_string(),
                })?
                .unit
                .id
        }
    };

    let subunit_id = match ctx
        .store
        .find_by_parent_and_ordinal(EntityKind::Subunit, unit_id, 1)?
    {
        Some(id) => id,
        None => {
            SubunitService::new(ctx)
                .create(&NewSubunit { unit_id, ordinal: 1 })?
                .subunit
                .id
        }
    };

    let wanted: Vec<u32> = (1..=GENESIS_ONE.len() as u32).collect();
    let present = ctx.store.existing_leaf_ordinals(subunit_id, &wanted)?;
    let missing: Vec<LeafSpec> = GENESIS_ONE
        .iter()
        .zip(1u32..)
        .filter(|(_, ordinal)| !present.contains(ordinal))
        .map(|(text, ordinal)| LeafSpec::new(ordinal, *text))
        .collect();

    let leaves_created = if missing.is_empty() {
        0
    } else {
        LeafService::new(ctx)
            .bulk_create(&BulkLeaves {
                subunit_id,
                leaves: missing,
            })?
            .count
    };

    info!(
        "event=seed module=cli status=ok collection_id={} leaves_created={}",
        collection_id, leaves_created
    );
    Ok(SeedSummary {
        collection_id,
        unit_id,
        subunit_id,
        leaves_created,
    })
}
