//! Field presence rules shared by the Celo transaction codec.
//!
//! On the wire an absent field and an empty field are the same thing: both are
//! encoded as the empty string and both decode back to "absent". Every encoder,
//! decoder and classifier in this workspace asks [`FieldPresence`] instead of
//! deciding on its own what counts as empty.
//!
//! A value is empty when it is:
//! - a numeric zero,
//! - a byte string or address whose bytes are all zero (including the empty string),
//! - a hex string that trims to `0x` or `0x00`, or the strings `""` and `"0"`,
//! - `None`,
//! - [`TxKind::Create`] or an empty [`AccessList`].

use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, FixedBytes, TxKind, U256};

/// Answers whether a transaction field value is present for wire purposes.
pub trait FieldPresence {
    /// Returns `true` if the value is empty and must be treated as absent.
    fn is_empty_field(&self) -> bool;

    /// Returns `true` if the value is present.
    fn is_present_field(&self) -> bool {
        !self.is_empty_field()
    }
}

/// Returns `true` if `value` is empty, see [`FieldPresence`].
pub fn is_empty<T: FieldPresence + ?Sized>(value: &T) -> bool {
    value.is_empty_field()
}

/// Returns `true` if `value` is present, see [`FieldPresence`].
pub fn is_present<T: FieldPresence + ?Sized>(value: &T) -> bool {
    value.is_present_field()
}

macro_rules! impl_numeric_presence {
    ($($t:ty),* $(,)?) => {
        $(
            impl FieldPresence for $t {
                fn is_empty_field(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

impl_numeric_presence!(u8, u16, u32, u64, u128, usize);

impl FieldPresence for U256 {
    fn is_empty_field(&self) -> bool {
        self.is_zero()
    }
}

impl FieldPresence for [u8] {
    fn is_empty_field(&self) -> bool {
        self.iter().all(|b| *b == 0)
    }
}

impl<const N: usize> FieldPresence for FixedBytes<N> {
    fn is_empty_field(&self) -> bool {
        self.as_slice().is_empty_field()
    }
}

impl FieldPresence for Address {
    fn is_empty_field(&self) -> bool {
        self.is_zero()
    }
}

impl FieldPresence for Bytes {
    fn is_empty_field(&self) -> bool {
        self.as_ref().is_empty_field()
    }
}

impl FieldPresence for TxKind {
    fn is_empty_field(&self) -> bool {
        match self {
            Self::Create => true,
            Self::Call(to) => to.is_empty_field(),
        }
    }
}

impl FieldPresence for AccessList {
    fn is_empty_field(&self) -> bool {
        self.0.is_empty()
    }
}

/// Hex strings are trimmed of leading zero nibbles before comparison, so `0x`,
/// `0x0` and `0x0000` are all empty. A string without the `0x` prefix is only
/// empty when it is `""` or `"0"`.
impl FieldPresence for str {
    fn is_empty_field(&self) -> bool {
        if self.is_empty() || self == "0" {
            return true;
        }
        match self.strip_prefix("0x").or_else(|| self.strip_prefix("0X")) {
            Some(digits) => digits.bytes().all(|c| c == b'0'),
            None => false,
        }
    }
}

impl FieldPresence for String {
    fn is_empty_field(&self) -> bool {
        self.as_str().is_empty_field()
    }
}

impl<T: FieldPresence> FieldPresence for Option<T> {
    fn is_empty_field(&self) -> bool {
        self.as_ref().is_none_or(FieldPresence::is_empty_field)
    }
}

impl<T: FieldPresence + ?Sized> FieldPresence for &T {
    fn is_empty_field(&self) -> bool {
        (**self).is_empty_field()
    }
}

/// Returns the value only if it is present.
pub fn present<T: FieldPresence>(value: Option<T>) -> Option<T> {
    value.filter(FieldPresence::is_present_field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_eips::eip2930::AccessListItem;
    use alloy_primitives::{B256, address, bytes};

    #[test]
    fn test_numeric_zero_is_empty() {
        assert!(is_empty(&0u64));
        assert!(is_empty(&0u128));
        assert!(is_empty(&U256::ZERO));
        assert!(is_present(&1u64));
        assert!(is_present(&U256::MAX));
    }

    #[test]
    fn test_option_none_is_empty() {
        assert!(is_empty(&None::<u64>));
        assert!(is_empty(&Some(0u64)));
        assert!(is_present(&Some(7u64)));
        assert!(is_empty(&None::<Address>));
    }

    #[test]
    fn test_zero_bytes_are_empty() {
        assert!(is_empty(&Bytes::new()));
        assert!(is_empty(&bytes!("00")));
        assert!(is_empty(&bytes!("000000")));
        assert!(is_present(&bytes!("0001")));
        assert!(is_empty(&B256::ZERO));
    }

    #[test]
    fn test_zero_address_is_empty() {
        assert!(is_empty(&Address::ZERO));
        assert!(is_present(&address!("0x765DE816845861e75A25fCA122bb6898B8B1282a")));
    }

    #[test]
    fn test_hex_strings() {
        assert!(is_empty(""));
        assert!(is_empty("0"));
        assert!(is_empty("0x"));
        assert!(is_empty("0x00"));
        assert!(is_empty("0x0000000000000000000000000000000000000000"));
        assert!(is_present("0x01"));
        assert!(is_present("0xfee"));
        assert!(is_present("10"));
    }

    #[test]
    fn test_tx_kind_and_access_list() {
        assert!(is_empty(&TxKind::Create));
        assert!(is_empty(&TxKind::Call(Address::ZERO)));
        assert!(is_present(&TxKind::Call(Address::with_last_byte(1))));

        assert!(is_empty(&AccessList::default()));
        let list = AccessList(vec![AccessListItem {
            address: Address::with_last_byte(1),
            storage_keys: vec![],
        }]);
        assert!(is_present(&list));
    }

    #[test]
    fn test_present_filter() {
        assert_eq!(present(Some(0u64)), None);
        assert_eq!(present(Some(3u64)), Some(3));
        assert_eq!(present(Some(Address::ZERO)), None);
    }
}
