use proptest::prelude::*;
use secidx::{
    BTreeIndex, BufferPoolManager, Datatype, DiskManager, Error, IndexOptions, Operator, PageId,
    RecordId,
};
use std::cmp::Reverse;

#[derive(Debug, Clone)]
struct RangeQuery {
    low: i32,
    low_op: Operator,
    high: i32,
    high_op: Operator,
}

impl RangeQuery {
    fn matches(&self, key: i32) -> bool {
        let above_low = match self.low_op {
            Operator::Gte => key >= self.low,
            _ => key > self.low,
        };
        let below_high = match self.high_op {
            Operator::Lte => key <= self.high,
            _ => key < self.high,
        };
        above_low && below_high
    }
}

fn arb_query() -> impl Strategy<Value = RangeQuery> {
    (
        -60i32..60,
        prop_oneof![Just(Operator::Gt), Just(Operator::Gte)],
        -60i32..60,
        prop_oneof![Just(Operator::Lt), Just(Operator::Lte)],
    )
        .prop_map(|(low, low_op, high, high_op)| RangeQuery {
            low,
            low_op,
            high,
            high_op,
        })
}

fn run_scan(index: &mut BTreeIndex<'_>, query: &RangeQuery) -> Result<Vec<RecordId>, Error> {
    index.start_scan(query.low, query.low_op, query.high, query.high_op)?;
    let mut out = Vec::new();
    loop {
        match index.scan_next() {
            Ok(rid) => out.push(rid),
            Err(e) if e.is_scan_completed() => break,
            Err(e) => return Err(e),
        }
    }
    index.end_scan()?;
    Ok(out)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]
    #[test]
    fn prop_scans_match_sorted_model(
        keys in prop::collection::vec(-50i32..50, 0..400),
        leaf_capacity in 2usize..7,
        internal_capacity in 2usize..6,
        queries in prop::collection::vec(arb_query(), 1..12),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let dm = DiskManager::create(dir.path().join("prop.idx")).unwrap();
        let bpm = BufferPoolManager::new(48, dm);
        let options = IndexOptions::with_capacities(leaf_capacity, internal_capacity);
        let mut index =
            BTreeIndex::create(&bpm, "prop", 0, Datatype::Integer, options, std::iter::empty())
                .unwrap();

        // Each entry gets a unique record id; equal keys scan newest first.
        let mut model: Vec<(i32, u32)> = Vec::new();
        for (seq, &key) in keys.iter().enumerate() {
            let rid = RecordId::new(PageId::new(seq as u32), 0);
            index.insert_entry(key, rid).unwrap();
            model.push((key, seq as u32));
            prop_assert_eq!(bpm.pinned_frame_count(), 0);
        }
        model.sort_by_key(|&(key, seq)| (key, Reverse(seq)));

        for query in &queries {
            let actual = run_scan(&mut index, query);
            if query.low > query.high {
                let is_invalid_range = matches!(actual, Err(Error::InvalidRange { .. }));
                prop_assert!(is_invalid_range);
                continue;
            }
            let expected: Vec<RecordId> = model
                .iter()
                .filter(|&&(key, _)| query.matches(key))
                .map(|&(_, seq)| RecordId::new(PageId::new(seq), 0))
                .collect();
            prop_assert_eq!(actual.unwrap(), expected);
            prop_assert_eq!(bpm.pinned_frame_count(), 0);
        }
    }
}
