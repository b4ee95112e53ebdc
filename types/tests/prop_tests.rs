use proptest::prelude::*;

use bsq_types::{BlockHash, LockupReason, OpReturnType, Satoshis, TxId};

proptest! {
    /// BlockHash roundtrip: new -> as_bytes produces identical bytes.
    #[test]
    fn block_hash_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.as_bytes(), &bytes);
    }

    /// TxId roundtrip: new -> as_bytes produces identical bytes.
    #[test]
    fn tx_id_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = TxId::new(bytes);
        prop_assert_eq!(id.as_bytes(), &bytes);
    }

    /// BlockHash::is_zero is true only for all-zero bytes.
    #[test]
    fn block_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// BlockHash bincode serialization roundtrip.
    #[test]
    fn block_hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: BlockHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.as_bytes(), hash.as_bytes());
    }

    /// TxId bincode serialization roundtrip.
    #[test]
    fn tx_id_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = TxId::new(bytes);
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: TxId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.as_bytes(), id.as_bytes());
    }

    /// Satoshis: raw roundtrip.
    #[test]
    fn satoshis_raw_roundtrip(sats in 0u64..u64::MAX / 2) {
        let amount = Satoshis::new(sats);
        prop_assert_eq!(amount.sats(), sats);
    }

    /// Satoshis: checked_add(a, b) == Some(a + b) when no overflow.
    #[test]
    fn satoshis_checked_add(a in 0u64..u64::MAX / 2, b in 0u64..u64::MAX / 2) {
        let sum = Satoshis::new(a).checked_add(Satoshis::new(b));
        prop_assert_eq!(sum, Some(Satoshis::new(a + b)));
    }

    /// Satoshis: checked_sub returns None exactly when b > a.
    #[test]
    fn satoshis_checked_sub_underflow(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let result = Satoshis::new(a).checked_sub(Satoshis::new(b));
        if b > a {
            prop_assert!(result.is_none());
        } else {
            prop_assert_eq!(result, Some(Satoshis::new(a - b)));
        }
    }

    /// Satoshis: saturating_sub never panics and returns ZERO on underflow.
    #[test]
    fn satoshis_saturating_sub(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let result = Satoshis::new(a).saturating_sub(Satoshis::new(b));
        if b > a {
            prop_assert_eq!(result, Satoshis::ZERO);
        } else {
            prop_assert_eq!(result, Satoshis::new(a - b));
        }
    }

    /// Satoshis: is_zero matches sats == 0.
    #[test]
    fn satoshis_is_zero(sats in 0u64..1_000) {
        let amount = Satoshis::new(sats);
        prop_assert_eq!(amount.is_zero(), sats == 0);
    }

    /// Every byte either decodes to a type whose tag matches, or to none.
    #[test]
    fn op_return_tag_decode_is_consistent(tag in any::<u8>()) {
        match OpReturnType::from_tag(tag) {
            Some(op) => prop_assert_eq!(op.tag(), tag),
            None => {
                // Unknown tags must stay outside the defined range.
                prop_assert!(!(0x10..=0x14).contains(&tag));
            }
        }
    }

    /// Same for lockup reason bytes.
    #[test]
    fn lockup_reason_decode_is_consistent(byte in any::<u8>()) {
        match LockupReason::from_byte(byte) {
            Some(reason) => prop_assert_eq!(reason.byte(), byte),
            None => prop_assert_ne!(byte, 0x01),
        }
    }
}
