use crate::cart::ResolvedLine;
use uuid::Uuid;

/// The subset of a checkout's lines belonging to one store. Materializes as
/// exactly one order.
#[derive(Debug, Clone)]
pub struct StorePartition {
    pub store_id: Uuid,
    pub lines: Vec<ResolvedLine>,
}

/// Group resolved lines by owning store. Pure; preserves first-seen store
/// order so the fan-out is deterministic. Every partition is non-empty and
/// single-store by construction.
pub fn partition_by_store(lines: Vec<ResolvedLine>) -> Vec<StorePartition> {
    let mut partitions: Vec<StorePartition> = Vec::new();
    for line in lines {
        match partitions.iter_mut().find(|p| p.store_id == line.store_id) {
            Some(partition) => partition.lines.push(line),
            None => partitions.push(StorePartition {
                store_id: line.store_id,
                lines: vec![line],
            }),
        }
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(store_id: Uuid, unit_price_cents: i64, quantity: i32) -> ResolvedLine {
        ResolvedLine {
            product_id: Uuid::new_v4(),
            store_id,
            title: "Widget".into(),
            image_url: None,
            unit_price_cents,
            quantity,
            available_stock: 100,
        }
    }

    #[test]
    fn test_groups_by_store() {
        let store_a = Uuid::new_v4();
        let store_b = Uuid::new_v4();
        let partitions = partition_by_store(vec![
            line(store_a, 1000, 1),
            line(store_b, 2000, 1),
            line(store_a, 3000, 2),
        ]);

        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].store_id, store_a);
        assert_eq!(partitions[0].lines.len(), 2);
        assert_eq!(partitions[1].store_id, store_b);
        assert_eq!(partitions[1].lines.len(), 1);
    }

    #[test]
    fn test_every_partition_is_single_store_and_non_empty() {
        let stores: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let mut lines = Vec::new();
        for (i, store) in stores.iter().enumerate() {
            for _ in 0..=i {
                lines.push(line(*store, 500, 1));
            }
        }

        let partitions = partition_by_store(lines);
        assert_eq!(partitions.len(), stores.len());
        for partition in &partitions {
            assert!(!partition.lines.is_empty());
            assert!(partition.lines.iter().all(|l| l.store_id == partition.store_id));
        }
    }

    #[test]
    fn test_empty_input_yields_no_partitions() {
        assert!(partition_by_store(vec![]).is_empty());
    }
}
